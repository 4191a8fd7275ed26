//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. The in-flight request is
//! the only background work: `submit` spawns it onto the tokio runtime and
//! the loop picks the outcome up from an mpsc channel on the next tick.

use crate::{
    commands::{execute_command, Command},
    event::{self, AppEvent},
    theme::Theme,
    widgets::{
        category_list::{CategoryList, CategoryListState},
        command_bar::{CommandBar, CommandBarState},
        help::HelpPopup,
        query_form::{QueryForm, QueryFormState},
        results::{Results, ResultsState},
        status_bar::StatusBar,
    },
};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use reco_core::{config::Config, Recommendation, RecommendClient, RequestError};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Result of one backend request, delivered from the spawned task.
type Outcome = Result<Vec<Recommendation>, RequestError>;

// ---------------------------------------------------------------------------
// Focus + phase types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Results,
    QueryForm,
    /// Vim-style `:` command line is active.
    Command,
}

/// UI lifecycle of the one asynchronous call this application makes.
///
/// `Idle → Loading` on submit; `Loading → Success` on a decoded 2xx response;
/// `Loading → Failure` on any transport, status, or decode error. Entering
/// `Loading` discards the previous `Success`/`Failure` value, so stale data
/// is never shown alongside an in-flight request.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Success(Vec<Recommendation>),
    Failure(String),
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub focus: Focus,
    /// Focus state before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub query: QueryFormState,
    pub categories: CategoryListState,
    pub results: ResultsState,
    pub phase: Phase,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    pub quit: bool,
    /// Set when a request is issued; consumed when its outcome lands.
    pub request_started: Option<Instant>,
    /// Duration of the last completed request.
    pub last_elapsed: Option<Duration>,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    client: Arc<RecommendClient>,
    runtime: tokio::runtime::Handle,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(
        config: Config,
        client: Arc<RecommendClient>,
        runtime: tokio::runtime::Handle,
        theme: Theme,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let state = AppState {
            focus: Focus::QueryForm,
            prev_focus: Focus::QueryForm,
            query: QueryFormState::default(),
            categories: CategoryListState::new(config.categorias.clone()),
            results: ResultsState::default(),
            phase: Phase::Idle,
            theme,
            config,
            show_help: false,
            command_bar: CommandBarState::default(),
            quit: false,
            request_started: None,
            last_elapsed: None,
        };

        App {
            state,
            client,
            runtime,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            // Pick up any completed request before drawing.
            while let Ok(outcome) = self.outcome_rx.try_recv() {
                self.apply_outcome(outcome);
            }

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                match ct_event::read()? {
                    Event::Key(key) if key.kind == crossterm::event::KeyEventKind::Press => {
                        let raw = Event::Key(key);
                        // Use insert-mode mapping when a text widget is focused
                        let app_event = if is_insert_mode(self.state.focus) {
                            event::to_app_event_insert(raw)
                        } else {
                            event::to_app_event(raw)
                        };
                        if let Some(ev) = app_event {
                            tracing::debug!(
                                focus = ?self.state.focus,
                                event = ?ev,
                                "key event"
                            );
                            self.handle(ev);
                        }
                    }
                    other => {
                        if let Some(ev) = event::to_app_event(other) {
                            self.handle(ev);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn handle(&mut self, event: AppEvent) {
        // Help popup intercepts all events; only close keys pass through.
        if self.state.show_help {
            match event {
                AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit => {
                    self.state.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Command mode intercepts all events.
        if self.state.focus == Focus::Command {
            match event {
                AppEvent::Escape => {
                    self.state.command_bar.clear();
                    self.state.focus = self.state.prev_focus;
                }
                AppEvent::Enter => {
                    let input = self.state.command_bar.input.clone();
                    match Command::parse(&input) {
                        Ok(cmd) => {
                            tracing::debug!(command = ?cmd, "executing command");
                            self.state.command_bar.clear();
                            self.state.focus = self.state.prev_focus;
                            execute_command(&mut self.state, cmd);
                        }
                        Err(msg) if msg.is_empty() => {
                            // Empty input — just close
                            self.state.command_bar.clear();
                            self.state.focus = self.state.prev_focus;
                        }
                        Err(msg) => {
                            // Show the error; bar stays open
                            self.state.command_bar.error = Some(msg);
                        }
                    }
                }
                other => self.state.command_bar.handle(&other),
            }
            return;
        }

        match event {
            // Toggle help (only when not typing in the query form)
            AppEvent::Char('?') if self.state.focus != Focus::QueryForm => {
                self.state.show_help = true;
            }

            // Enter command mode with `:` (not from the query form)
            AppEvent::Char(':') if self.state.focus != Focus::QueryForm => {
                self.state.prev_focus = self.state.focus;
                self.state.command_bar.clear();
                self.state.focus = Focus::Command;
            }

            AppEvent::Quit => {
                self.state.quit = true;
            }

            // Return focus from the query form
            AppEvent::Escape => {
                if self.state.focus == Focus::QueryForm {
                    self.state.focus = Focus::Categories;
                }
            }

            // Tab-cycle focus: Categories → Results → QueryForm → Categories
            AppEvent::FocusNext => {
                let next = match self.state.focus {
                    Focus::Categories => Focus::Results,
                    Focus::Results => Focus::QueryForm,
                    Focus::QueryForm | Focus::Command => Focus::Categories,
                };
                self.state.focus = next;
            }

            // Jump to the query form
            AppEvent::QueryFocus => {
                self.state.focus = Focus::QueryForm;
            }

            // Enter submits from any pane; from the category pane it first
            // copies the highlighted category into the query form.
            AppEvent::Enter => {
                if self.state.focus == Focus::Categories {
                    if let Some(cat) = self.state.categories.selected_item().map(str::to_string) {
                        self.state.query.set_text(cat);
                    }
                }
                self.submit();
            }

            // Terminal resize is handled automatically by ratatui
            AppEvent::Resize(_, _) => {}

            other => self.dispatch_to_focused(other),
        }
    }

    /// Route an event to the widget that owns the current focus.
    fn dispatch_to_focused(&mut self, event: AppEvent) {
        let s = &mut self.state;
        match s.focus {
            Focus::Categories => s.categories.handle(&event),
            Focus::Results => {
                let total = match &s.phase {
                    Phase::Success(recommendations) => recommendations.len(),
                    _ => 0,
                };
                s.results.handle(&event, total);
            }
            Focus::QueryForm => s.query.handle(&event),
            Focus::Command => {} // handled before dispatch, should not reach here
        }
    }

    /// Issue the pending query, if there is one and nothing is in flight.
    ///
    /// Entering `Loading` discards the previous results/error before the
    /// request goes out; completion (either way) re-enables submission.
    fn submit(&mut self) {
        let s = &mut self.state;

        if matches!(s.phase, Phase::Loading) {
            tracing::debug!("submit ignored: request already in flight");
            return;
        }
        let Some(producto) = s.query.pending_query().map(str::to_string) else {
            tracing::debug!("submit ignored: empty query");
            return;
        };

        s.phase = Phase::Loading;
        s.results.reset();
        s.last_elapsed = None;
        s.request_started = Some(Instant::now());
        tracing::debug!(producto = %producto, "submitting query");

        let client = Arc::clone(&self.client);
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let outcome = client.recommend(&producto).await;
            // The receiver only drops on shutdown; losing the outcome then is fine.
            let _ = tx.send(outcome);
        });
    }

    /// Apply a completed request to the UI state.
    fn apply_outcome(&mut self, outcome: Outcome) {
        let s = &mut self.state;
        s.last_elapsed = s.request_started.take().map(|started| started.elapsed());

        match outcome {
            Ok(recommendations) => {
                tracing::debug!(count = recommendations.len(), "request succeeded");
                s.results.reset();
                s.phase = Phase::Success(recommendations);
            }
            Err(err) => {
                tracing::error!(error = %err, "recommendation request failed");
                s.phase = Phase::Failure(err.user_message().to_string());
            }
        }
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::QueryForm | Focus::Command)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 1-line status bar | body | 3-line query form
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .split(area);

    // Horizontal body split: category pane | results pane
    let pct = state.config.ui.category_pane_width_pct;
    let horiz = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Percentage(pct), Constraint::Fill(1)])
        .split(vert[1]);

    frame.render_widget(
        StatusBar::new(&state.phase, state.last_elapsed, &state.theme),
        vert[0],
    );
    frame.render_widget(
        CategoryList::new(
            &state.categories,
            state.focus == Focus::Categories,
            &state.theme,
        ),
        horiz[0],
    );
    frame.render_widget(
        Results::new(
            &state.results,
            &state.phase,
            state.focus == Focus::Results,
            &state.theme,
        ),
        horiz[1],
    );
    frame.render_widget(
        QueryForm::new(&state.query, state.focus == Focus::QueryForm, &state.theme),
        vert[2],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect { y: area.bottom() - 1, height: 1, ..area };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
        return; // cursor is set; skip query-form cursor below
    }

    // Position the terminal cursor when the query form is focused
    if state.focus == Focus::QueryForm {
        let form = QueryForm::new(&state.query, true, &state.theme);
        let (cx, cy) = form.cursor_position(vert[2]);
        frame.set_cursor_position((cx, cy));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reco_core::client::{StatusCode, USER_ERROR_MESSAGE};

    /// Build an app against a port nothing listens on. Tests that submit
    /// never await the spawned request; they only inspect state transitions.
    fn test_app() -> (tokio::runtime::Runtime, App) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let client = Arc::new(RecommendClient::new("http://127.0.0.1:1/api"));
        let app = App::new(
            Config::defaults(),
            client,
            runtime.handle().clone(),
            Theme::load_default(),
        );
        (runtime, app)
    }

    fn type_query(app: &mut App, text: &str) {
        app.state.focus = Focus::QueryForm;
        for c in text.chars() {
            app.handle(AppEvent::Char(c));
        }
    }

    fn failure_outcome() -> Outcome {
        Err(RequestError::Status(StatusCode::INTERNAL_SERVER_ERROR))
    }

    #[test]
    fn submit_moves_idle_to_loading() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Loading);
        assert!(app.state.request_started.is_some());
    }

    #[test]
    fn empty_query_is_not_submitted() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::QueryForm;
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Idle);
    }

    #[test]
    fn whitespace_query_is_not_submitted() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "   ");
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Idle);
    }

    #[test]
    fn submit_is_ignored_while_loading() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        let started = app.state.request_started;
        app.handle(AppEvent::Enter);
        // Still the first request: the guard left the started marker untouched.
        assert_eq!(app.state.phase, Phase::Loading);
        assert_eq!(app.state.request_started, started);
    }

    #[test]
    fn success_outcome_replaces_loading() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        app.apply_outcome(Ok(vec![Recommendation {
            entidad: "A".to_string(),
            score: 0.87,
        }]));
        match &app.state.phase {
            Phase::Success(recs) => {
                assert_eq!(recs.len(), 1);
                assert_eq!(recs[0].entidad, "A");
            }
            other => panic!("expected Success, got {other:?}"),
        }
        assert!(app.state.last_elapsed.is_some());
        assert!(app.state.request_started.is_none());
    }

    #[test]
    fn failure_outcome_shows_static_message() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        app.apply_outcome(failure_outcome());
        assert_eq!(app.state.phase, Phase::Failure(USER_ERROR_MESSAGE.to_string()));
    }

    #[test]
    fn resubmitting_after_failure_clears_the_error() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        app.apply_outcome(failure_outcome());
        // New submission: the error must be gone before the outcome lands.
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Loading);
    }

    #[test]
    fn resubmitting_after_success_clears_previous_results() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        app.apply_outcome(Ok(vec![Recommendation {
            entidad: "A".to_string(),
            score: 0.5,
        }]));
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Loading);
    }

    #[test]
    fn submission_enabled_again_after_either_outcome() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");

        app.handle(AppEvent::Enter);
        app.apply_outcome(failure_outcome());
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Loading);

        app.apply_outcome(Ok(vec![]));
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.phase, Phase::Loading);
    }

    #[test]
    fn category_enter_fills_query_and_submits() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::Categories;
        app.handle(AppEvent::Enter);
        let expected = Config::defaults().categorias[0].clone();
        assert_eq!(app.state.query.text, expected);
        assert_eq!(app.state.phase, Phase::Loading);
    }

    #[test]
    fn focus_cycles_through_panes() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::Categories;
        app.handle(AppEvent::FocusNext);
        assert_eq!(app.state.focus, Focus::Results);
        app.handle(AppEvent::FocusNext);
        assert_eq!(app.state.focus, Focus::QueryForm);
        app.handle(AppEvent::FocusNext);
        assert_eq!(app.state.focus, Focus::Categories);
    }

    #[test]
    fn help_popup_toggles_and_intercepts() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::Categories;
        app.handle(AppEvent::Char('?'));
        assert!(app.state.show_help);
        // Events other than the close keys are swallowed.
        app.handle(AppEvent::FocusNext);
        assert_eq!(app.state.focus, Focus::Categories);
        app.handle(AppEvent::Escape);
        assert!(!app.state.show_help);
    }

    #[test]
    fn clear_command_returns_to_idle() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        app.apply_outcome(Ok(vec![Recommendation {
            entidad: "A".to_string(),
            score: 0.5,
        }]));
        execute_command(&mut app.state, Command::Clear);
        assert_eq!(app.state.phase, Phase::Idle);
    }

    #[test]
    fn clear_command_does_not_interrupt_loading() {
        let (_rt, mut app) = test_app();
        type_query(&mut app, "computadora");
        app.handle(AppEvent::Enter);
        execute_command(&mut app.state, Command::Clear);
        assert_eq!(app.state.phase, Phase::Loading);
    }

    #[test]
    fn command_bar_parses_on_enter() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::Categories;
        app.handle(AppEvent::Char(':'));
        assert_eq!(app.state.focus, Focus::Command);
        for c in "help".chars() {
            app.handle(AppEvent::Char(c));
        }
        app.handle(AppEvent::Enter);
        assert!(app.state.show_help);
        assert_eq!(app.state.focus, Focus::Categories);
    }

    #[test]
    fn unknown_command_keeps_bar_open_with_error() {
        let (_rt, mut app) = test_app();
        app.state.focus = Focus::Results;
        app.handle(AppEvent::Char(':'));
        for c in "frobnicate".chars() {
            app.handle(AppEvent::Char(c));
        }
        app.handle(AppEvent::Enter);
        assert_eq!(app.state.focus, Focus::Command);
        assert!(app.state.command_bar.error.is_some());
    }
}
