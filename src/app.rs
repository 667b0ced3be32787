// App state and main event loop.
// Maps keys to navigator transitions and keeps widget selection in sync with the screen.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

use crate::state::navigation::ViewKind;
use crate::state::{Body, DialogView, JobAction, Navigator, NodeRef, ResourceClient, Screen};
use crate::ui;

/// Lines moved by PgUp/PgDn.
const PAGE: usize = 10;

/// A navigator transition requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Enter(Option<NodeRef>),
    Back,
    Filter(String),
    ChooseBranch(String),
    JobAction(JobAction),
    ReturnToGroups,
    Refresh,
    SwitchBranch,
}

impl Command {
    /// Text for the loading popup, for commands that fetch.
    fn busy_message(&self) -> Option<&'static str> {
        match self {
            Command::Enter(_) => Some("Loading"),
            Command::Back => Some("Loading"),
            Command::Filter(_) => Some("Loading groups"),
            Command::ChooseBranch(_) => Some("Loading pipelines"),
            Command::JobAction(JobAction::Logs) => Some("Loading logs"),
            Command::JobAction(JobAction::Retry) => Some("Retrying job"),
            Command::JobAction(JobAction::Cancel) => None,
            Command::ReturnToGroups => Some("Loading groups"),
            Command::Refresh => Some("Refreshing"),
            Command::SwitchBranch => Some("Loading branches"),
        }
    }
}

/// Result of a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Quit,
    Run(Command),
    /// Handled locally (selection, scrolling, prompt editing) or ignored.
    Handled,
}

/// Widget state that lives only in the terminal front end.
#[derive(Debug, Default)]
pub struct UiState {
    /// Selection in the tree or list.
    pub list_state: ListState,
    /// Selection in an open dialog.
    pub dialog_state: ListState,
    /// Group filter being typed, if the prompt is open.
    pub filter_input: Option<String>,
    pub log_scroll_x: u16,
    pub log_scroll_y: u16,
    pub show_help: bool,
    /// Loading popup text while a transition is awaited.
    pub busy: Option<&'static str>,
    /// Shown next to the breadcrumbs.
    pub instance_url: String,
    /// Identity of the last synced view: (depth, title).
    seen_view: Option<(usize, String)>,
    /// Saved list selection per stack level, root first.
    selections: Vec<Option<usize>>,
    /// Title of the last synced dialog.
    seen_dialog: Option<String>,
}

impl UiState {
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
            ..Default::default()
        }
    }

    /// Reset or clamp selections after the screen changed.
    pub fn sync(&mut self, screen: &Screen) {
        let depth = screen.depth.max(1);
        let view = (depth, screen.title.clone());
        let row_count = screen.body.rows().len();

        if self.seen_view.as_ref() != Some(&view) {
            let previous_depth = self.seen_view.as_ref().map_or(0, |(d, _)| *d);
            if previous_depth > 0 {
                self.save_selection(previous_depth);
            }
            // Going back restores the cursor of the revealed level
            let restored = if depth < previous_depth {
                self.selections.get(depth - 1).copied().flatten()
            } else {
                None
            };
            self.list_state = ListState::default();
            self.list_state.select(restored);
            self.log_scroll_x = 0;
            self.log_scroll_y = 0;
            self.seen_view = Some(view);
        }
        if row_count == 0 {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0).min(row_count - 1);
            self.list_state.select(Some(selected));
        }
        self.selections.truncate(depth);
        self.save_selection(depth);

        let dialog = screen.dialog.as_ref().map(|d| match d {
            DialogView::BranchSelect { title, .. } | DialogView::JobAction { title } => {
                title.clone()
            }
        });
        if dialog != self.seen_dialog {
            self.dialog_state = ListState::default();
            match &screen.dialog {
                Some(DialogView::BranchSelect {
                    branches,
                    default_index,
                    ..
                }) if !branches.is_empty() => {
                    self.dialog_state.select(Some(default_index.unwrap_or(0)));
                }
                Some(DialogView::JobAction { .. }) => self.dialog_state.select(Some(0)),
                _ => {}
            }
            self.seen_dialog = dialog;
        }
    }

    fn save_selection(&mut self, depth: usize) {
        if self.selections.len() < depth {
            self.selections.resize(depth, None);
        }
        self.selections[depth - 1] = self.list_state.selected();
    }

    /// Translate a key press on `screen` into an outcome.
    pub fn handle_key(&mut self, key: KeyEvent, screen: &Screen) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }
        if self.filter_input.is_some() {
            return self.handle_filter_key(key);
        }
        if self.show_help {
            match key.code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                _ => {}
            }
            return KeyOutcome::Handled;
        }
        if let Some(dialog) = &screen.dialog {
            return self.handle_dialog_key(key, dialog);
        }

        match key.code {
            KeyCode::Char('q') => KeyOutcome::Quit,
            KeyCode::Char('?') => {
                self.show_help = true;
                KeyOutcome::Handled
            }
            KeyCode::Esc | KeyCode::Backspace => KeyOutcome::Run(Command::Back),
            KeyCode::Char('r') => KeyOutcome::Run(Command::Refresh),
            KeyCode::Char('g') => KeyOutcome::Run(Command::ReturnToGroups),
            KeyCode::Char('/') if screen.kind == ViewKind::GroupList => {
                self.filter_input = Some(String::new());
                KeyOutcome::Handled
            }
            KeyCode::Char('b') if screen.kind == ViewKind::PipelineList => {
                KeyOutcome::Run(Command::SwitchBranch)
            }
            _ => match &screen.body {
                Body::Text(text) => self.handle_log_key(key, text.lines().count()),
                body => self.handle_list_key(key, body),
            },
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let Some(input) = self.filter_input.as_mut() else {
            return KeyOutcome::Handled;
        };
        match key.code {
            KeyCode::Enter => {
                let filter = std::mem::take(input);
                self.filter_input = None;
                KeyOutcome::Run(Command::Filter(filter))
            }
            KeyCode::Esc => {
                self.filter_input = None;
                KeyOutcome::Handled
            }
            KeyCode::Backspace => {
                input.pop();
                KeyOutcome::Handled
            }
            KeyCode::Char(c) => {
                input.push(c);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Handled,
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent, dialog: &DialogView) -> KeyOutcome {
        let len = match dialog {
            DialogView::BranchSelect { branches, .. } => branches.len(),
            DialogView::JobAction { .. } => JobAction::ALL.len(),
        };
        match key.code {
            KeyCode::Char('q') => KeyOutcome::Quit,
            KeyCode::Esc => KeyOutcome::Run(Command::Back),
            KeyCode::Up | KeyCode::Char('k') => {
                move_selection(&mut self.dialog_state, len, -1);
                KeyOutcome::Handled
            }
            KeyCode::Down | KeyCode::Char('j') => {
                move_selection(&mut self.dialog_state, len, 1);
                KeyOutcome::Handled
            }
            KeyCode::Enter => {
                let Some(selected) = self.dialog_state.selected() else {
                    return KeyOutcome::Handled;
                };
                match dialog {
                    DialogView::BranchSelect { branches, .. } => branches
                        .get(selected)
                        .map(|b| KeyOutcome::Run(Command::ChooseBranch(b.clone())))
                        .unwrap_or(KeyOutcome::Handled),
                    DialogView::JobAction { .. } => JobAction::ALL
                        .get(selected)
                        .map(|a| KeyOutcome::Run(Command::JobAction(*a)))
                        .unwrap_or(KeyOutcome::Handled),
                }
            }
            _ => KeyOutcome::Handled,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, body: &Body) -> KeyOutcome {
        let rows = body.rows();
        let len = rows.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => move_selection(&mut self.list_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => move_selection(&mut self.list_state, len, 1),
            KeyCode::PageUp => move_selection(&mut self.list_state, len, -(PAGE as isize)),
            KeyCode::PageDown => move_selection(&mut self.list_state, len, PAGE as isize),
            KeyCode::Home if len > 0 => self.list_state.select(Some(0)),
            KeyCode::End if len > 0 => self.list_state.select(Some(len - 1)),
            KeyCode::Enter => {
                // Nothing to activate on an empty list
                return match self.list_state.selected().and_then(|i| rows.get(i)) {
                    Some(row) => KeyOutcome::Run(Command::Enter(row.reference)),
                    None => KeyOutcome::Handled,
                };
            }
            _ => {}
        }
        KeyOutcome::Handled
    }

    fn handle_log_key(&mut self, key: KeyEvent, line_count: usize) -> KeyOutcome {
        let max_y = line_count.saturating_sub(1).min(u16::MAX as usize) as u16;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.log_scroll_y = self.log_scroll_y.saturating_sub(1)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.log_scroll_y = self.log_scroll_y.saturating_add(1).min(max_y)
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.log_scroll_x = self.log_scroll_x.saturating_sub(4)
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.log_scroll_x = self.log_scroll_x.saturating_add(4)
            }
            KeyCode::PageUp => self.log_scroll_y = self.log_scroll_y.saturating_sub(PAGE as u16),
            KeyCode::PageDown => {
                self.log_scroll_y = self.log_scroll_y.saturating_add(PAGE as u16).min(max_y)
            }
            KeyCode::Home => {
                self.log_scroll_y = 0;
                self.log_scroll_x = 0;
            }
            KeyCode::End => self.log_scroll_y = max_y,
            _ => {}
        }
        KeyOutcome::Handled
    }
}

/// Move a selection by `delta`, clamped to `0..len`.
fn move_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    state.select(Some(next as usize));
}

/// Main application state.
pub struct App<C> {
    pub navigator: Navigator<C>,
    pub ui: UiState,
    /// Whether the app should exit.
    pub should_quit: bool,
}

impl<C: ResourceClient> App<C> {
    pub fn new(navigator: Navigator<C>, instance_url: impl Into<String>) -> Self {
        Self {
            navigator,
            ui: UiState::new(instance_url),
            should_quit: false,
        }
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.ui.busy = Some("Loading groups");
        self.draw(terminal)?;
        self.navigator.launch().await;
        self.ui.busy = None;

        while !self.should_quit {
            self.draw(terminal)?;
            if let Some(command) = self.next_command()? {
                // Paint the loading frame before awaiting the transition
                self.ui.busy = command.busy_message();
                if self.ui.busy.is_some() {
                    self.draw(terminal)?;
                }
                self.dispatch(command).await;
                self.ui.busy = None;
            }
        }
        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        let screen = self.navigator.screen();
        self.ui.sync(&screen);
        terminal.draw(|frame| ui::draw(frame, &screen, &mut self.ui))?;
        Ok(())
    }

    /// Wait briefly for a key and turn it into a command.
    fn next_command(&mut self) -> io::Result<Option<Command>> {
        if !event::poll(Duration::from_millis(100))? {
            return Ok(None);
        }
        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }

        let screen = self.navigator.screen();
        match self.ui.handle_key(key, &screen) {
            KeyOutcome::Quit => {
                self.should_quit = true;
                Ok(None)
            }
            KeyOutcome::Run(command) => Ok(Some(command)),
            KeyOutcome::Handled => Ok(None),
        }
    }

    /// Run one navigator transition to completion.
    pub async fn dispatch(&mut self, command: Command) {
        debug!("Dispatching {:?}", command);
        match command {
            Command::Enter(reference) => self.navigator.enter(reference).await,
            Command::Back => self.navigator.back().await,
            Command::Filter(filter) => self.navigator.replace_root(&filter).await,
            Command::ChooseBranch(branch) => self.navigator.choose_branch(&branch).await,
            Command::JobAction(action) => self.navigator.choose_job_action(action).await,
            Command::ReturnToGroups => self.navigator.return_to_groups().await,
            Command::Refresh => self.navigator.refresh().await,
            Command::SwitchBranch => self.navigator.switch_branch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::FakeClient;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app() -> App<FakeClient> {
        let mut navigator = Navigator::new(FakeClient::sample());
        navigator.launch().await;
        let mut app = App::new(navigator, "https://gitlab.example.com");
        app.ui.sync(&app.navigator.screen());
        app
    }

    /// Feed a key through the front end and run any resulting transition.
    async fn key(app: &mut App<FakeClient>, code: KeyCode) -> KeyOutcome {
        let screen = app.navigator.screen();
        let outcome = app.ui.handle_key(press(code), &screen);
        if let KeyOutcome::Run(command) = outcome.clone() {
            app.dispatch(command).await;
        }
        app.ui.sync(&app.navigator.screen());
        outcome
    }

    #[tokio::test]
    async fn test_enter_on_project_row_opens_branches() {
        let mut app = app().await;

        // Group: Alpha, Project: api
        key(&mut app, KeyCode::Down).await;
        let outcome = key(&mut app, KeyCode::Enter).await;

        assert_eq!(
            outcome,
            KeyOutcome::Run(Command::Enter(Some(NodeRef::Project(42))))
        );
        assert_eq!(app.navigator.kind(), ViewKind::BranchSelect);
        // Default branch is preselected
        assert_eq!(app.ui.dialog_state.selected(), Some(1));

        let outcome = key(&mut app, KeyCode::Enter).await;
        assert_eq!(
            outcome,
            KeyOutcome::Run(Command::ChooseBranch("main".to_string()))
        );
        assert_eq!(app.navigator.kind(), ViewKind::PipelineList);
        assert_eq!(app.ui.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_filter_prompt() {
        let mut app = app().await;

        assert_eq!(key(&mut app, KeyCode::Char('/')).await, KeyOutcome::Handled);
        assert_eq!(app.ui.filter_input.as_deref(), Some(""));

        // q is text while the prompt is open
        key(&mut app, KeyCode::Char('q')).await;
        key(&mut app, KeyCode::Backspace).await;
        key(&mut app, KeyCode::Char('a')).await;
        key(&mut app, KeyCode::Char('l')).await;
        let outcome = key(&mut app, KeyCode::Enter).await;

        assert_eq!(outcome, KeyOutcome::Run(Command::Filter("al".to_string())));
        assert!(app.ui.filter_input.is_none());
        assert_eq!(app.navigator.screen().title, "Groups matching \"al\"");
    }

    #[tokio::test]
    async fn test_slash_only_filters_on_group_list() {
        let mut app = app().await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Enter).await;
        key(&mut app, KeyCode::Enter).await;
        assert_eq!(app.navigator.kind(), ViewKind::PipelineList);

        key(&mut app, KeyCode::Char('/')).await;
        assert!(app.ui.filter_input.is_none());

        let outcome = key(&mut app, KeyCode::Char('b')).await;
        assert_eq!(outcome, KeyOutcome::Run(Command::SwitchBranch));
        assert_eq!(app.navigator.kind(), ViewKind::BranchSelect);
    }

    #[tokio::test]
    async fn test_job_actions_and_log_scroll() {
        let mut app = app().await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Enter).await;
        key(&mut app, KeyCode::Enter).await;
        // Pipeline 7 is the first row
        key(&mut app, KeyCode::Enter).await;
        assert_eq!(app.navigator.kind(), ViewKind::JobList);

        key(&mut app, KeyCode::Enter).await;
        assert!(matches!(
            app.navigator.screen().dialog,
            Some(DialogView::JobAction { .. })
        ));
        let outcome = key(&mut app, KeyCode::Enter).await;
        assert_eq!(outcome, KeyOutcome::Run(Command::JobAction(JobAction::Logs)));
        assert_eq!(app.navigator.kind(), ViewKind::JobLogs);

        // Two log lines: scrolling stops at the last one
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Down).await;
        assert_eq!(app.ui.log_scroll_y, 1);
        key(&mut app, KeyCode::Home).await;
        assert_eq!(app.ui.log_scroll_y, 0);

        assert_eq!(key(&mut app, KeyCode::Esc).await, KeyOutcome::Run(Command::Back));
        assert_eq!(app.navigator.kind(), ViewKind::JobList);
    }

    #[tokio::test]
    async fn test_back_restores_cursor_of_revealed_level() {
        let mut app = app().await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Enter).await;
        key(&mut app, KeyCode::Enter).await;
        assert_eq!(app.navigator.kind(), ViewKind::PipelineList);

        // Second row is pipeline 6, which has no jobs
        key(&mut app, KeyCode::Down).await;
        let outcome = key(&mut app, KeyCode::Enter).await;
        assert_eq!(
            outcome,
            KeyOutcome::Run(Command::Enter(Some(NodeRef::Pipeline(6))))
        );
        assert_eq!(app.navigator.kind(), ViewKind::JobList);
        assert_eq!(app.ui.list_state.selected(), None);

        key(&mut app, KeyCode::Esc).await;
        assert_eq!(app.navigator.kind(), ViewKind::PipelineList);
        assert_eq!(app.ui.list_state.selected(), Some(1));

        // And the group tree cursor survives a return to groups
        key(&mut app, KeyCode::Char('g')).await;
        assert_eq!(app.navigator.kind(), ViewKind::GroupList);
        assert_eq!(app.ui.list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn test_enter_on_empty_list_does_nothing() {
        let mut app = app().await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Enter).await;
        key(&mut app, KeyCode::Enter).await;
        key(&mut app, KeyCode::Down).await;
        key(&mut app, KeyCode::Enter).await;
        assert!(matches!(app.navigator.screen().body, Body::Empty(_)));

        let outcome = key(&mut app, KeyCode::Enter).await;

        assert_eq!(outcome, KeyOutcome::Handled);
        assert_eq!(app.navigator.kind(), ViewKind::JobList);
        assert!(app.navigator.status().is_none());
    }

    #[tokio::test]
    async fn test_help_and_quit() {
        let mut app = app().await;

        key(&mut app, KeyCode::Char('?')).await;
        assert!(app.ui.show_help);
        // Navigation keys are swallowed by the overlay
        assert_eq!(key(&mut app, KeyCode::Enter).await, KeyOutcome::Handled);
        key(&mut app, KeyCode::Esc).await;
        assert!(!app.ui.show_help);

        assert_eq!(key(&mut app, KeyCode::Char('q')).await, KeyOutcome::Quit);
    }

    #[test]
    fn test_move_selection_clamps() {
        let mut state = ListState::default();
        move_selection(&mut state, 3, 1);
        assert_eq!(state.selected(), Some(1));
        move_selection(&mut state, 3, 10);
        assert_eq!(state.selected(), Some(2));
        move_selection(&mut state, 3, -10);
        assert_eq!(state.selected(), Some(0));
        move_selection(&mut state, 0, 1);
        assert_eq!(state.selected(), None);
    }
}
