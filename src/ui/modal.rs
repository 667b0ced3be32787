// Modal UI components.
// Branch and job action pickers, the group filter prompt, and the loading popup.

use ratatui::{prelude::*, widgets::*};

use crate::state::JobAction;

/// Centered rectangle of at most `width` x `height` inside `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn instructions(action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled(
            format!(" = {}  ", action),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::styled(" = Navigate  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Cancel ", Style::default().fg(Color::DarkGray)),
    ])
}

/// Draw a branch selection modal on top of the current view.
pub fn draw_branch_modal(
    frame: &mut Frame,
    title: &str,
    branches: &[String],
    default_index: Option<usize>,
    list_state: &mut ListState,
) {
    let modal_height = (branches.len() as u16).saturating_add(4).clamp(6, 20);
    let modal_area = centered_rect(frame.area(), 60, modal_height);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Branch list
            Constraint::Length(1), // Instructions
        ])
        .split(modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title));

    if branches.is_empty() {
        let empty_text = Paragraph::new("No branches")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty_text, chunks[0]);
    } else {
        let items: Vec<ListItem> = branches
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let mut spans = vec![Span::styled(
                    branch.as_str(),
                    Style::default().fg(Color::White),
                )];
                if default_index == Some(i) {
                    spans.push(Span::styled(
                        "  (default)",
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list_widget = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list_widget, chunks[0], list_state);
    }

    let instructions_widget = Paragraph::new(instructions("Select"))
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[1]);
}

/// Draw the Logs / Retry / Cancel picker for a job.
pub fn draw_job_action_modal(frame: &mut Frame, title: &str, list_state: &mut ListState) {
    let modal_area = centered_rect(frame.area(), 60, 7);
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(modal_area);

    let items: Vec<ListItem> = JobAction::ALL
        .iter()
        .map(|action| ListItem::new(action.label()))
        .collect();

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", title)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list_widget, chunks[0], list_state);

    let instructions_widget = Paragraph::new(instructions("Run"))
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(instructions_widget, chunks[1]);
}

/// Draw the group filter prompt.
pub fn draw_filter_input(frame: &mut Frame, input: &str) {
    let modal_area = centered_rect(frame.area(), 60, 3);
    frame.render_widget(Clear, modal_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Filter Groups ")
        .title_bottom(
            Line::from(Span::styled(
                " empty = all groups ",
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        );

    let input_line = Line::from(vec![
        Span::styled("Group: ", Style::default().fg(Color::DarkGray)),
        Span::raw(input),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]);

    let input_widget = Paragraph::new(input_line).block(input_block);
    frame.render_widget(input_widget, modal_area);
}

/// Draw the popup shown while a transition is awaited.
pub fn draw_busy(frame: &mut Frame, message: &str) {
    let modal_area = centered_rect(frame.area(), (message.len() as u16).saturating_add(10), 3);
    frame.render_widget(Clear, modal_area);

    let text = Paragraph::new(format!("⏳ {}…", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(text, modal_area);
}
