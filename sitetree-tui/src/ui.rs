use crate::app::{App, display_label};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine},
    },
};
use sitetree_core::render::Indicator;
use sitetree_core::tree::NodeKind;
use std::time::Instant;

pub fn draw(f: &mut Frame, app: &mut App, now: Instant) {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Tree + details
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Hints bar
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(vertical_chunks[0]);

    render_tree(f, app, main_chunks[0], now);
    render_details(f, app, main_chunks[1]);
    render_status(f, app, vertical_chunks[1]);
    render_hints(f, vertical_chunks[2]);
}

fn render_tree(f: &mut Frame, app: &mut App, area: Rect, now: Instant) {
    let title = format!(" {} ", app.state().tree().root().name);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width < 2 || inner.height < 2 {
        return;
    }
    app.set_tree_area(inner);

    let frame = app.frame(now);
    let camera = app.camera();
    let config = app.state().config().clone();
    let selected = app.selected();

    // Canvas y grows upward while the layout's breadth axis grows downward,
    // so breadth is negated. Bounds span width-1 by height-1 to map one
    // layout unit to one cell.
    let left = camera.y;
    let right = camera.y + f64::from(inner.width - 1);
    let top = -camera.x;
    let bottom = -(camera.x + f64::from(inner.height - 1));

    let mut labels = Vec::with_capacity(frame.nodes.len());
    for frame_node in &frame.nodes {
        let Some(node) = app.frame_node(frame_node.id) else {
            continue;
        };
        let tree_node = &app.state().tree()[frame_node.id];
        let faded = frame_node.opacity < 0.5;

        let mut style = match tree_node.kind {
            NodeKind::Root => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            NodeKind::Internal => Style::default().fg(Color::Cyan),
            NodeKind::Leaf => Style::default().fg(Color::White),
        };
        if faded {
            style = Style::default().fg(Color::DarkGray);
        }
        if frame_node.id == selected && !faded {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }

        let dot_style = match node.indicator {
            Indicator::Collapsed => Style::default().fg(Color::Gray),
            _ => Style::default().fg(Color::DarkGray),
        };

        labels.push((
            frame_node.at,
            display_label(&tree_node.name),
            style,
            dot_style,
            node.indicator.glyph().zip(node.indicator_x),
        ));
    }

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([left, right])
        .y_bounds([bottom, top])
        .paint(move |ctx| {
            for link in &frame.links {
                let (sx, sy) = (link.path.source.x, link.path.source.y);
                let (tx, ty) = (link.path.target.x, link.path.target.y);
                let mid = (sy + ty) / 2.0;
                for (x1, y1, x2, y2) in [(sy, -sx, mid, -sx), (mid, -sx, mid, -tx), (mid, -tx, ty, -tx)] {
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: Color::DarkGray,
                    });
                }
            }

            ctx.layer();

            for (at, label, style, dot_style, indicator) in &labels {
                ctx.print(
                    at.y - config.target_inset,
                    -at.x,
                    Span::styled("•", *dot_style),
                );
                ctx.print(
                    at.y + config.label_offset,
                    -at.x,
                    Span::styled(label.clone(), *style),
                );
                if let Some((glyph, offset)) = indicator {
                    ctx.print(
                        at.y + offset,
                        -at.x,
                        Span::styled(glyph.to_string(), Style::default().fg(Color::Magenta)),
                    );
                }
            }
        });

    f.render_widget(canvas, inner);
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(7)])
        .split(area);

    let tree = app.state().tree();
    let node = &tree[app.selected()];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Node ")
        .border_style(Style::default().fg(Color::Magenta));

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let state = if !node.has_children() {
        "leaf"
    } else if app.state().is_expanded(node.id) {
        "expanded"
    } else {
        "collapsed"
    };

    let text = vec![
        Line::from(Span::styled(
            node.name.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("URL:      ", label), Span::styled(node.url.clone(), value)]),
        Line::from(vec![Span::styled("Depth:    ", label), Span::styled(node.depth.to_string(), value)]),
        Line::from(vec![
            Span::styled("Children: ", label),
            Span::styled(node.children.len().to_string(), value),
        ]),
        Line::from(vec![Span::styled("State:    ", label), Span::styled(state, value)]),
    ];

    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), chunks[0]);

    let stats = tree.stats();
    let site = vec![
        Line::from(vec![Span::styled("Origin:  ", label), Span::styled(tree.origin().to_string(), value)]),
        Line::from(vec![Span::styled("Nodes:   ", label), Span::styled(stats.nodes.to_string(), value)]),
        Line::from(vec![Span::styled("Leaves:  ", label), Span::styled(stats.leaves.to_string(), value)]),
        Line::from(vec![
            Span::styled("Visible: ", label),
            Span::styled(app.state().visible_nodes().len().to_string(), value),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Site ")
        .border_style(Style::default().fg(Color::Green));
    f.render_widget(Paragraph::new(site).block(block).wrap(Wrap { trim: true }), chunks[1]);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let icon = if app.is_animating() { "⠋" } else { "✓" };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", icon), Style::default().fg(Color::Cyan)),
        Span::raw(app.status().to_string()),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::Gray)), area);
}

fn render_hints(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Black).bg(Color::Gray);
    let hints = Line::from(vec![
        Span::styled(" q/ESC ", key),
        Span::raw(" Exit  "),
        Span::styled(" ↑/↓ ", key),
        Span::raw(" Select  "),
        Span::styled(" ←/→ ", key),
        Span::raw(" Fold  "),
        Span::styled(" Space ", key),
        Span::raw(" Toggle  "),
        Span::styled(" Shift/Alt ", key),
        Span::raw(" Slow  "),
        Span::styled(" Enter ", key),
        Span::raw(" Open  "),
        Span::styled(" e/c ", key),
        Span::raw(" Expand/Collapse all"),
    ]);

    let paragraph = Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray));
    f.render_widget(paragraph, area);
}
