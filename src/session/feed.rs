//! The chat feed: an append-only list of fragments.

use crate::render::Fragment;

#[derive(Debug, Default)]
pub struct Feed {
    fragments: Vec<Fragment>,
    /// Bumped on every change so views know to re-layout and scroll
    revision: u64,
    /// Bumped on every clear; earlier fragment indices are meaningless after
    generation: u64,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
        self.revision += 1;
        self.generation += 1;
    }

    /// Remove every typing indicator. Returns whether one was present.
    pub fn remove_typing(&mut self) -> bool {
        let before = self.fragments.len();
        self.fragments.retain(|f| !f.is_typing());
        let removed = self.fragments.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn has_typing(&self) -> bool {
        self.fragments.iter().any(Fragment::is_typing)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn last(&self) -> Option<&Fragment> {
        self.fragments.last()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
