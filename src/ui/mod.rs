// UI module for rendering the TUI.
// Draws a Screen description: breadcrumbs, content, status line, dialogs, and overlays.

mod breadcrumb;
mod list;
mod modal;

use ratatui::{prelude::*, widgets::*};

use crate::app::UiState;
use crate::state::navigation::ViewKind;
use crate::state::{Body, DialogView, Screen};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, screen: &Screen, ui: &mut UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Breadcrumb
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    breadcrumb::draw_breadcrumb(
        frame,
        &screen.breadcrumbs,
        screen.kind,
        &ui.instance_url,
        chunks[0],
    );

    draw_content(frame, screen, ui, chunks[1]);
    draw_status_line(frame, screen, chunks[2]);
    draw_key_hints(frame, screen, chunks[3]);

    match &screen.dialog {
        Some(DialogView::BranchSelect {
            title,
            branches,
            default_index,
        }) => modal::draw_branch_modal(frame, title, branches, *default_index, &mut ui.dialog_state),
        Some(DialogView::JobAction { title }) => {
            modal::draw_job_action_modal(frame, title, &mut ui.dialog_state)
        }
        None => {}
    }

    if let Some(input) = &ui.filter_input {
        modal::draw_filter_input(frame, input);
    }

    // Help overlay (rendered on top of everything but the loading popup)
    if ui.show_help {
        draw_help_overlay(frame);
    }

    if let Some(message) = ui.busy {
        modal::draw_busy(frame, message);
    }
}

/// Draw the main content area.
fn draw_content(frame: &mut Frame, screen: &Screen, ui: &mut UiState, area: Rect) {
    match &screen.body {
        Body::Tree(rows) | Body::List(rows) => list::render_rows(
            frame,
            &screen.title,
            rows,
            screen.stale,
            &mut ui.list_state,
            area,
        ),
        Body::Text(text) => draw_log_viewer(frame, &screen.title, text, ui, area),
        Body::Empty(message) => list::render_empty(frame, area, &screen.title, message),
    }
}

/// Draw the log viewer.
fn draw_log_viewer(frame: &mut Frame, title: &str, logs: &str, ui: &UiState, area: Rect) {
    let line_count = logs.lines().count();
    let scroll_y = ui.log_scroll_y as usize;

    let title = format!(
        " {} [{}-{}/{}] ",
        title,
        (scroll_y + 1).min(line_count),
        (scroll_y + area.height.saturating_sub(2) as usize).min(line_count),
        line_count
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    let numbered_lines: Vec<Line> = logs
        .lines()
        .enumerate()
        .map(|(i, line)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>6} │ ", i + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(line),
            ])
        })
        .collect();

    let text = Paragraph::new(numbered_lines)
        .block(block)
        .scroll((ui.log_scroll_y, ui.log_scroll_x));
    frame.render_widget(text, area);
}

/// Draw the inline status or error line.
fn draw_status_line(frame: &mut Frame, screen: &Screen, area: Rect) {
    let Some(status) = &screen.status else {
        return;
    };
    let (icon, color) = if status.is_error() {
        ("❌", Color::Red)
    } else {
        ("ℹ️", Color::Cyan)
    };
    let line = Line::from(vec![
        Span::raw(format!(" {} ", icon)),
        Span::styled(status.message.as_str(), Style::default().fg(color)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::raw(key),
        Span::styled(label, Style::default().fg(Color::DarkGray)),
    ]
}

/// Draw keybinding hints for the current level.
fn draw_key_hints(frame: &mut Frame, screen: &Screen, area: Rect) {
    let mut hints: Vec<[Span<'static>; 2]> = if screen.dialog.is_some() {
        vec![
            hint(" ↑↓ ", "Navigate"),
            hint("  ↵ ", "Select"),
            hint("  Esc ", "Cancel"),
        ]
    } else if screen.kind == ViewKind::JobLogs {
        vec![
            hint(" ↑↓←→ ", "Scroll"),
            hint("  PgUp/Dn ", "Page"),
            hint("  Home/End ", "Jump"),
            hint("  Esc ", "Back"),
        ]
    } else {
        vec![
            hint(" ↑↓ ", "Navigate"),
            hint("  ↵ ", "Select"),
            hint("  Esc ", "Back"),
        ]
    };

    match screen.kind {
        ViewKind::GroupList if screen.dialog.is_none() => hints.push(hint("  / ", "Filter")),
        ViewKind::PipelineList if screen.dialog.is_none() => hints.push(hint("  b ", "Branch")),
        _ => {}
    }
    if screen.dialog.is_none() {
        hints.push(hint("  r ", "Refresh"));
        hints.push(hint("  g ", "Groups"));
    }
    hints.push(hint("  ? ", "Help"));
    hints.push(hint("  q ", "Quit"));

    let spans: Vec<Span> = hints.into_iter().flatten().collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = modal::centered_rect(frame.area(), 55, 18);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let key = |k: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(text),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        key("  ↑/↓ or j/k    ", "Navigate list / scroll logs"),
        key("  ←/→ or h/l    ", "Horizontal scroll (logs)"),
        key("  Enter         ", "Select / drill down"),
        key("  Esc           ", "Go back / close dialog"),
        key("  PgUp/PgDn     ", "Page up / down"),
        key("  Home/End      ", "Jump to start/end"),
        key("  /             ", "Filter groups by name"),
        key("  b             ", "Switch branch (pipelines)"),
        key("  g             ", "Return to groups"),
        key("  r             ", "Refresh current view"),
        key("  ?             ", "Show/hide this help"),
        key("  q             ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::navigator::Navigator;
    use crate::state::testing::FakeClient;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn test_draw_group_tree_and_error_status() {
        let client = FakeClient::sample();
        let mut navigator = Navigator::new(client);
        navigator.launch().await;
        navigator.client().fail_groups(true);
        navigator.refresh().await;

        let screen = navigator.screen();
        let mut ui = UiState::new("https://gitlab.example.com");
        ui.sync(&screen);

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal
            .draw(|frame| draw(frame, &screen, &mut ui))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("https://gitlab.example.com"));
        assert!(text.contains("Group: Alpha"));
        assert!(text.contains("Project: api"));
        assert!(text.contains("network unreachable"));
        assert!(text.contains("Filter"));
    }

    #[tokio::test]
    async fn test_draw_job_action_dialog() {
        let mut navigator = Navigator::new(FakeClient::sample());
        navigator.launch().await;
        navigator.enter(Some(crate::state::NodeRef::Project(42))).await;
        navigator.choose_branch("main").await;
        navigator.enter(Some(crate::state::NodeRef::Pipeline(7))).await;
        navigator.enter(Some(crate::state::NodeRef::Job(99))).await;

        let screen = navigator.screen();
        let mut ui = UiState::new("https://gitlab.example.com");
        ui.sync(&screen);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|frame| draw(frame, &screen, &mut ui))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Select action for job 99 (test)"));
        assert!(text.contains("Logs"));
        assert!(text.contains("Retry"));
        assert!(text.contains("Cancel"));
    }
}
