use serde::{Deserialize, Serialize};

/// One command the assistant understands, shown in the command guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideEntry {
    pub description: String,
    pub example: String,
}

impl GuideEntry {
    pub fn new(description: &str, example: &str) -> Self {
        Self {
            description: description.to_string(),
            example: example.to_string(),
        }
    }
}

pub fn builtin_guide() -> Vec<GuideEntry> {
    [
        ("List all containers (running and stopped)", "lihat semua containers"),
        ("List running containers only", "list containers"),
        ("Run a new container (run NAME IMAGE)", "run webku nginx:latest"),
        ("Run a new container (run image IMAGE as NAME)", "run image nginx:latest as webku"),
        ("Start a container (start NAME)", "start webku"),
        ("Start a container (container NAME start)", "container webku start"),
        ("Stop a container (stop NAME)", "stop webku"),
        ("Stop a container (container NAME stop)", "container webku stop"),
        ("Remove a container (rm NAME)", "rm webku_lama"),
        ("Remove a container (container NAME rm)", "container webku_lama rm"),
        ("Show container logs (lihat log NAME)", "lihat log webku"),
        ("Show container logs (lihat container NAME log)", "lihat container webku log"),
        ("Show container stats (lihat stats NAME)", "lihat stats webku"),
        ("Show container stats (lihat container NAME stats)", "lihat container webku stats"),
        ("Pull an image from a registry", "docker pull alpine:latest"),
        ("List local images", "docker images"),
        ("Run 'docker-compose up -d'", "compose-up my_service"),
        ("Run 'docker-compose down'", "compose-down"),
        ("List volumes", "list volumes"),
        ("Remove an unused volume", "rm volume data_lama"),
        ("List networks", "list networks"),
        ("Show the JSON details of an object", "inspect container webku"),
        ("Remove unused containers, images, volumes and networks", "system prune"),
    ]
    .into_iter()
    .map(|(description, example)| GuideEntry::new(description, example))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_guide_examples_are_unique() {
        let guide = builtin_guide();
        let mut examples: Vec<_> = guide.iter().map(|e| e.example.as_str()).collect();
        examples.sort_unstable();
        examples.dedup();
        assert_eq!(examples.len(), guide.len());
    }
}
