use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Frame;
use ratatui::widgets::ListState;

use crate::api::IdeasService;
use crate::config::AppConfig;
use crate::internal::controller::ListController;
use crate::internal::location::{Location, MemoryLocation};
use crate::internal::models::Idea;
use crate::internal::notification::Notification;
use crate::internal::prefs::{FilePreferenceStore, PreferenceStore};

const SPINNER_CHARS: [char; 4] = ['|', '/', '-', '\\'];

/// Actions/messages sent through the app action channel.
#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    ToggleSort,
    Reload,
    HistoryBack,
    HistoryForward,
    SelectUp,
    SelectDown,
    OpenImage,
    ToggleHelp,
    ClearNotification,
    PageLoaded {
        seq: u64,
        items: Vec<Idea>,
        total: u64,
    },
    PageFailed {
        seq: u64,
        message: String,
    },
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub app_version: String,
    pub controller: ListController,
    pub api_service: Arc<IdeasService>,
    pub list_state: ListState,
    pub notification: Option<Notification>,
    pub show_help: bool,
    pub spinner_state: usize,
    pub last_spinner_update: Option<tokio::time::Instant>,
    pub config: AppConfig,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl App {
    /// Build the app. `initial_search` seeds the location, exactly like
    /// opening the page with that query string in the address bar.
    pub fn new(initial_search: Option<String>) -> Result<Self> {
        let location = MemoryLocation::new(initial_search.unwrap_or_default());
        Self::with_parts(
            AppConfig::load(),
            Box::new(location),
            Box::new(FilePreferenceStore::new()),
        )
    }

    /// Build the app from explicit collaborators. Tests use this with the
    /// in-memory location and preference store so nothing touches the user's
    /// config directory or CWD.
    pub fn with_parts(
        config: AppConfig,
        location: Box<dyn Location>,
        prefs: Box<dyn PreferenceStore>,
    ) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let api_service = Arc::new(IdeasService::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?);

        let controller = ListController::new(location, prefs);

        tracing::info!(
            query = %controller.location_search(),
            base_url = %config.api_base_url,
            "App initialized"
        );

        Ok(Self {
            running: true,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            controller,
            api_service,
            list_state: ListState::default(),
            notification: None,
            show_help: false,
            spinner_state: 0,
            last_spinner_update: None,
            config,
            action_tx,
            action_rx,
        })
    }

    /// Set an info notification
    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::info(message));
    }

    /// Set an error notification
    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::error(message));
    }

    /// Clear the current notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    pub fn get_spinner_char(&self) -> char {
        SPINNER_CHARS[self.spinner_state % SPINNER_CHARS.len()]
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        // Initial load for the derived query
        let _ = self.action_tx.send(Action::Reload);

        let mut event_interval = tokio::time::interval(std::time::Duration::from_millis(16));

        loop {
            // Update spinner animation every 100ms
            let now = tokio::time::Instant::now();
            match self.last_spinner_update {
                Some(last_update) => {
                    if now.duration_since(last_update).as_millis() >= 100 {
                        self.spinner_state = self.spinner_state.wrapping_add(1);
                        self.last_spinner_update = Some(now);
                    }
                }
                None => {
                    self.last_spinner_update = Some(now);
                }
            }

            // Auto-dismiss expired notifications
            if let Some(notification) = &self.notification
                && notification.should_dismiss()
            {
                self.clear_notification();
            }

            tui.draw(|f| self.ui(f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    // Check for terminal events
                    if event::poll(std::time::Duration::from_millis(0))?
                        && let Event::Key(key) = event::read()?
                            && key.kind == KeyEventKind::Press {
                                self.handle_key_event(key);
                            }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await;
                }
            }

            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub fn ui(&mut self, f: &mut Frame) {
        super::view::draw(self, f);
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        // Help overlay traps input until dismissed
        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => Some(Action::NextPage),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => Some(Action::PrevPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Action::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Action::LastPage),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectDown),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectUp),
            KeyCode::Char('c') => Some(Action::CyclePageSize),
            KeyCode::Char('s') => Some(Action::ToggleSort),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('b') => Some(Action::HistoryBack),
            KeyCode::Char('f') => Some(Action::HistoryForward),
            KeyCode::Char('o') => Some(Action::OpenImage),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            _ => None,
        };

        if let Some(action) = action {
            let _ = self.action_tx.send(action);
        }
    }

    #[tracing::instrument(skip(self, action))]
    async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NextPage => {
                if self.controller.next_page() {
                    self.start_fetch();
                }
            }
            Action::PrevPage => {
                if self.controller.prev_page() {
                    self.start_fetch();
                }
            }
            Action::FirstPage => {
                if self.controller.first_page() {
                    self.start_fetch();
                }
            }
            Action::LastPage => {
                if self.controller.last_page() {
                    self.start_fetch();
                }
            }
            Action::CyclePageSize => {
                if self.controller.cycle_page_size() {
                    self.notify_info(format!(
                        "Showing {} per page",
                        self.controller.query().page_size
                    ));
                    self.start_fetch();
                }
            }
            Action::ToggleSort => {
                if self.controller.toggle_sort() {
                    self.notify_info(format!("Sorted by: {} first", self.controller.query().sort));
                    self.start_fetch();
                }
            }
            Action::Reload => self.start_fetch(),
            Action::HistoryBack => {
                if self.controller.navigate_back() {
                    self.start_fetch();
                } else {
                    self.notify_info("Already at the start of history");
                }
            }
            Action::HistoryForward => {
                if self.controller.navigate_forward() {
                    self.start_fetch();
                } else {
                    self.notify_info("Already at the end of history");
                }
            }
            Action::SelectDown => self.select_next(),
            Action::SelectUp => self.select_prev(),
            Action::OpenImage => self.open_selected_image(),
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ClearNotification => self.clear_notification(),
            Action::PageLoaded { seq, items, total } => {
                if self.controller.complete_fetch(seq, items, total) {
                    tracing::debug!(
                        page = self.controller.query().page,
                        total,
                        "page loaded"
                    );
                    self.reset_selection();
                }
            }
            Action::PageFailed { seq, message } => {
                if self.controller.fail_fetch(seq, message) {
                    tracing::warn!(error = ?self.controller.error(), "fetch failed");
                }
            }
        }
    }

    /// Kick off a fetch for the current query. The sequence number issued
    /// here must come back with the completion; anything older is ignored.
    fn start_fetch(&mut self) {
        let seq = self.controller.begin_fetch();
        let query = self.controller.query().clone();
        let api = self.api_service.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            match api.fetch_page(&query).await {
                Ok(page) => {
                    let _ = tx.send(Action::PageLoaded {
                        seq,
                        items: page.items,
                        total: page.total,
                    });
                }
                Err(e) => {
                    let _ = tx.send(Action::PageFailed {
                        seq,
                        message: e.to_string(),
                    });
                }
            }
        });
    }

    fn reset_selection(&mut self) {
        match self.controller.items().is_empty() {
            true => self.list_state.select(None),
            false => self.list_state.select(Some(0)),
        }
    }

    fn select_next(&mut self) {
        let len = self.controller.items().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        if self.controller.items().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn open_selected_image(&mut self) {
        let url = self
            .list_state
            .selected()
            .and_then(|i| self.controller.items().get(i))
            .and_then(|idea| idea.image_url().map(String::from));

        match url {
            Some(url) => {
                if let Err(e) = open::that(&url) {
                    self.notify_error(format!("Failed to open {}: {}", url, e));
                }
            }
            None => self.notify_info("No image for this idea"),
        }
    }
}
