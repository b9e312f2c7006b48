// App module - split into submodules for maintainability
// - mod.rs: App struct, constructor, request spawning
// - event_loop.rs: Main run() loop
// - rendering.rs: All UI drawing (draw method)
// - handlers/: Event handlers and action dispatch

mod event_loop;
mod handlers;
mod rendering;
mod ui_state;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::api::{Backend, HttpBackend};
use crate::config::{AppConfig, Theme};
use crate::error::{DockchatError, Result};
use crate::render::Dispatcher;
use crate::session::{execute, Completion, Request, SessionController};

use ui_state::UiState;

pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    should_quit: bool,
    ui: UiState,
    controller: SessionController,
    backend: Arc<dyn Backend>,
    /// Shown in the status bar
    server_url: String,
    runtime: Runtime,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    theme: Theme,
    sidebar_width: u16,
    tick_interval: Duration,
    last_tick: Instant,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let base_url = config.server.base_url.clone();
        let backend = HttpBackend::new(&base_url).map_err(|e| DockchatError::InvalidServerUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("dockchat-io")
            .enable_all()
            .build()?;

        enable_raw_mode().map_err(|e| DockchatError::Terminal(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)
            .map_err(|e| DockchatError::Terminal(e.to_string()))?;

        let backend_term = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend_term).map_err(|e| DockchatError::Terminal(e.to_string()))?;

        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let controller = SessionController::new(Dispatcher::default(), config.session_options());
        let ui = UiState::new(
            config.guide(),
            Duration::from_millis(config.ui.toast_duration_ms),
        );

        tracing::info!("Console started against {}", base_url);

        Ok(Self {
            terminal,
            should_quit: false,
            ui,
            controller,
            backend: Arc::new(backend),
            server_url: base_url,
            runtime,
            completion_tx,
            completion_rx,
            theme: config.theme,
            sidebar_width: config.ui.sidebar_width,
            tick_interval: Duration::from_millis(config.general.tick_interval_ms.max(10)),
            last_tick: Instant::now(),
        })
    }

    /// Run `request` on the runtime; its completion comes back through the
    /// event loop.
    fn spawn_request(&self, request: Request) {
        tracing::debug!("Spawning {:?}", request);
        let backend = Arc::clone(&self.backend);
        let tx = self.completion_tx.clone();
        self.runtime.spawn(async move {
            let completion = execute(backend.as_ref(), request).await;
            if tx.send(completion).is_err() {
                tracing::warn!("Completion dropped: event loop has exited");
            }
        });
    }

    /// Bring the widgets in line with the controller after any session change.
    fn sync_session(&mut self) {
        for notice in self.controller.take_notices() {
            self.ui.notifications.notice(notice);
        }
        self.ui.sidebar.set_conversations(self.controller.store().list());
        self.ui.sidebar.set_active(self.controller.active_id());
        self.ui.chat_input.set_disabled(!self.controller.can_submit());
        self.ui.feed_view.sync(self.controller.feed());
        self.mark_dirty();
    }

    #[inline]
    fn mark_dirty(&mut self) {
        self.ui.mark_dirty();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, DisableBracketedPaste);
    }
}
