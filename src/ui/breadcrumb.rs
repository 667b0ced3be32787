// Breadcrumb rendering for navigation trail.
// Shows the current navigation path and the GitLab instance on the right.

use ratatui::{prelude::*, widgets::*};

use crate::state::navigation::{BreadcrumbNode, ViewKind};

/// Spans for the trail, current level highlighted.
fn breadcrumb_spans(breadcrumbs: &[BreadcrumbNode], selecting_branch: bool) -> Vec<Span<'_>> {
    let mut spans = Vec::new();

    for (i, node) in breadcrumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }

        let style = if i == breadcrumbs.len() - 1 && !selecting_branch {
            // Current level is highlighted
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        spans.push(Span::styled(node.label.as_str(), style));
    }

    if selecting_branch {
        spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            "Branch?",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans
}

/// Render the breadcrumb trail.
pub fn draw_breadcrumb(
    frame: &mut Frame,
    breadcrumbs: &[BreadcrumbNode],
    kind: ViewKind,
    instance_url: &str,
    area: Rect,
) {
    let breadcrumb_line = Line::from(breadcrumb_spans(
        breadcrumbs,
        kind == ViewKind::BranchSelect,
    ));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(breadcrumb_line)
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);

    // Instance on the right of the first row
    let instance_para = Paragraph::new(Line::from(Span::styled(
        instance_url,
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Right);
    frame.render_widget(
        instance_para,
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );
}
