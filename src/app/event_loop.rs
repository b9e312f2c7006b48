// Event loop - main run() method

use std::time::{Duration, Instant};

use crossterm::event;
use tokio::sync::mpsc::error::TryRecvError;

use super::App;
use crate::action::Action;
use crate::error::{DockchatError, Result};

impl App {
    pub fn run(&mut self) -> Result<()> {
        let request = self.controller.init();
        self.spawn_request(request);
        self.sync_session();

        loop {
            // ---- 1. Poll non-input sources ----

            loop {
                match self.completion_rx.try_recv() {
                    Ok(completion) => self.dispatch(Action::RequestCompleted(completion))?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return Err(DockchatError::ChannelClosed),
                }
            }

            // Tick (drives animations/timeouts)
            if self.last_tick.elapsed() >= self.tick_interval {
                self.dispatch(Action::Tick)?;
                self.last_tick = Instant::now();
            }

            if self.should_quit {
                break;
            }

            // ---- 2. Poll user input (keys/mouse/resize) ----

            if event::poll(Duration::from_millis(16)).map_err(|e| DockchatError::Terminal(e.to_string()))? {
                let event = event::read().map_err(|e| DockchatError::Terminal(e.to_string()))?;

                // Any user input implies we want to give UI feedback
                self.mark_dirty();

                if let Some(action) = self.handle_event(event) {
                    self.dispatch(action)?;
                }
            }

            if self.should_quit {
                break;
            }

            // ---- 3. Draw once if anything changed ----

            if self.ui.needs_redraw {
                self.draw()?;
                self.ui.needs_redraw = false;
            }
        }

        tracing::info!("Console exiting");
        Ok(())
    }
}
