// Row rendering for the group tree and the pipeline/job lists.
// Provides styled list views with empty states.

use ratatui::{prelude::*, widgets::*};

use crate::gitlab::Status;
use crate::state::{Hint, Row};

/// Get color for a pipeline or job status.
pub fn status_color(status: Status) -> Color {
    match status {
        Status::Success => Color::Green,
        Status::Failed => Color::Red,
        Status::Running => Color::Yellow,
        Status::Pending
        | Status::Created
        | Status::Preparing
        | Status::WaitingForResource
        | Status::Scheduled => Color::Blue,
        Status::Manual => Color::Magenta,
        Status::Canceled | Status::Skipped => Color::Gray,
        Status::Unknown => Color::White,
    }
}

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✅",
        Status::Failed => "❌",
        Status::Running => "🔄",
        Status::Canceled => "⚪",
        Status::Skipped => "⏭️",
        Status::Manual => "▶️",
        Status::Unknown => "❓",
        _ => "⏳",
    }
}

/// Foreground colour for a row hint.
pub fn hint_color(hint: Hint) -> Color {
    match hint {
        Hint::Group => Color::Cyan,
        Hint::Project => Color::White,
        Hint::Status(status) => status_color(status),
        Hint::RetryFailed => Color::LightRed,
    }
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        );
    frame.render_widget(text, area);
}

fn row_item(row: &Row) -> ListItem<'_> {
    let indent = "  ".repeat(row.depth as usize);
    let mut spans = vec![Span::raw(indent)];

    match row.hint {
        Hint::Group => spans.push(Span::styled(
            row.label.as_str(),
            Style::default()
                .fg(hint_color(row.hint))
                .add_modifier(Modifier::BOLD),
        )),
        Hint::Status(status) => {
            spans.push(Span::raw(format!("{} ", status_icon(status))));
            spans.push(Span::styled(
                row.label.as_str(),
                Style::default().fg(hint_color(row.hint)),
            ));
        }
        Hint::RetryFailed => {
            spans.push(Span::raw("⚠️ "));
            spans.push(Span::styled(
                row.label.as_str(),
                Style::default().fg(hint_color(row.hint)),
            ));
        }
        Hint::Project => spans.push(Span::styled(
            row.label.as_str(),
            Style::default().fg(hint_color(row.hint)),
        )),
    }

    ListItem::new(Line::from(spans))
}

/// Render a selectable tree or list of rows.
pub fn render_rows(
    frame: &mut Frame,
    title: &str,
    rows: &[Row],
    stale: bool,
    list_state: &mut ListState,
    area: Rect,
) {
    let items: Vec<ListItem> = rows.iter().map(row_item).collect();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    if stale {
        block = block.title_bottom(
            Line::from(Span::styled(
                " outdated, press r to refresh ",
                Style::default().fg(Color::Yellow),
            ))
            .right_aligned(),
        );
    }

    let list_widget = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list_widget, area, list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NodeRef;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_hint_colors() {
        assert_eq!(hint_color(Hint::Status(Status::Failed)), Color::Red);
        assert_eq!(hint_color(Hint::Status(Status::Success)), Color::Green);
        assert_eq!(hint_color(Hint::RetryFailed), Color::LightRed);
    }

    #[test]
    fn test_render_rows_indents_projects() {
        let rows = vec![
            Row {
                label: "Group: Alpha".to_string(),
                depth: 0,
                reference: Some(NodeRef::Group(1)),
                hint: Hint::Group,
            },
            Row {
                label: "Project: api".to_string(),
                depth: 1,
                reference: Some(NodeRef::Project(42)),
                hint: Hint::Project,
            },
        ];
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        let mut state = ListState::default();
        state.select(Some(1));

        terminal
            .draw(|frame| render_rows(frame, "Groups", &rows, false, &mut state, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let line = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(line(0).contains("Groups"));
        assert!(line(1).contains("  Group: Alpha"));
        assert!(line(2).contains(">   Project: api"));
    }
}
