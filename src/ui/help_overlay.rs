//! Help overlay showing all keybindings
//!
//! A centered modal listing every binding, grouped by the screen it acts
//! on. Rendered on top of whichever view is active.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::palette;
use crate::app::App;

/// Binding groups shown in the overlay, in display order
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Tracker",
        &[
            ("↑/k, ↓/j", "Move selection up/down"),
            ("Tab, 1-5", "Switch tabs"),
            ("/", "Search by name"),
            ("f", "Save/unsave listing"),
            ("i", "Analyst insight"),
            ("r", "Force refresh (bypasses cache)"),
            ("x", "Dismiss warning banner"),
        ],
    ),
    (
        "Views",
        &[
            ("c", "Calculators"),
            ("a", "Academy & quiz"),
            ("d / Esc", "Back to dashboard"),
        ],
    ),
    (
        "Other",
        &[
            ("t", "Toggle dark/light theme"),
            ("?", "Toggle this help"),
            ("q", "Quit application"),
        ],
    ),
];

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame, app: &App) {
    let colors = palette(app.theme);
    let area = overlay_area(frame.area());

    // Blank out whatever the active view drew underneath
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(colors.info)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (heading, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            *heading,
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        )));
        for (keys, action) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", keys), Style::default().fg(colors.warn)),
                Span::styled(*action, Style::default().fg(colors.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().fg(colors.dim),
    )));

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.info));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Centers the overlay, shrinking it on terminals too small to fit
fn overlay_area(area: Rect) -> Rect {
    // Section rows plus headings, spacers, title, footer, and the border
    let rows: u16 = SECTIONS
        .iter()
        .map(|(_, bindings)| bindings.len() as u16 + 2)
        .sum::<u16>()
        + 5;
    let width = 54.min(area.width);
    let height = rows.min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
