//! Tracker screen rendering
//!
//! Renders the main dashboard: market ticker strip, freshness header with
//! the cache countdown, degradation banner, tab bar, the IPO card list, and
//! a detail pane for the selected record.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{palette, Palette};
use crate::app::{App, Tab};
use crate::data::{IpoRecord, IpoStatus, IpoType, Trend};
use crate::tools::lot_investment;

/// Status to short badge text
fn status_badge(status: IpoStatus) -> &'static str {
    match status {
        IpoStatus::Open => "LIVE",
        IpoStatus::Upcoming => "SOON",
        IpoStatus::Closed => "CLOSED",
        IpoStatus::Listed => "LISTED",
    }
}

/// Color for a signed value (gains green, losses red)
fn signed_color(value: f64, colors: &Palette) -> ratatui::style::Color {
    if value > 0.0 {
        colors.accent
    } else if value < 0.0 {
        colors.danger
    } else {
        colors.dim
    }
}

/// Renders the tracker screen
pub fn render(frame: &mut Frame, app: &App) {
    let colors = palette(app.theme);
    let area = frame.area();

    let mut constraints = vec![
        Constraint::Length(1), // ticker strip
        Constraint::Length(3), // freshness header
    ];
    let has_banner = app.banner.is_some();
    if has_banner {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // tab bar
    constraints.push(Constraint::Min(3)); // card list
    constraints.push(Constraint::Length(9)); // detail pane
    constraints.push(Constraint::Length(1)); // help line

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    let mut take = || {
        let chunk = chunks[next];
        next += 1;
        chunk
    };

    render_ticker(frame, take(), &colors);
    render_header(frame, app, take(), &colors);
    if has_banner {
        render_banner(frame, app, take(), &colors);
    }
    render_tabs(frame, app, take(), &colors);
    render_list(frame, app, take(), &colors);
    render_detail(frame, app, take(), &colors);
    render_help(frame, app, take(), &colors);
}

/// Renders the static market ticker strip
fn render_ticker(frame: &mut Frame, area: Rect, colors: &Palette) {
    let mut spans: Vec<Span> = Vec::new();

    for item in crate::data::ticker_items() {
        let (arrow, color) = match item.trend {
            Trend::Up => ("▲", colors.accent),
            Trend::Down => ("▼", colors.danger),
        };
        spans.push(Span::styled(item.label, Style::default().fg(colors.dim)));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(item.value, Style::default().fg(colors.text)));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{}{}", arrow, item.change),
            Style::default().fg(color),
        ));
        spans.push(Span::styled("  │  ", Style::default().fg(colors.dim)));
    }
    spans.pop();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the title row and the freshness countdown
fn render_header(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let freshness = app.freshness();

    let source_badge = if app.is_refreshing {
        Span::styled("⟳ REFRESHING", Style::default().fg(colors.accent))
    } else if app.data_stale {
        Span::styled("● CACHED", Style::default().fg(colors.warn))
    } else {
        Span::styled("● LIVE", Style::default().fg(colors.accent))
    };

    let title_line = Line::from(vec![
        Span::styled(
            "IPO TERMINAL",
            Style::default()
                .fg(colors.info)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        source_badge,
    ]);

    let countdown_line = Line::from(vec![
        Span::styled("Updated: ", Style::default().fg(colors.dim)),
        Span::styled(
            format!("{}m ago", freshness.minutes_since_update),
            Style::default().fg(colors.accent),
        ),
        Span::styled("   Next in: ", Style::default().fg(colors.dim)),
        Span::styled(
            freshness.format_remaining(),
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let separator = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(colors.dim),
    ));

    frame.render_widget(
        Paragraph::new(vec![title_line, countdown_line, separator]),
        area,
    );
}

/// Renders the dismissible degradation banner
fn render_banner(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let Some(message) = &app.banner else {
        return;
    };
    let line = Line::from(vec![
        Span::styled("⚠ ", Style::default().fg(colors.warn)),
        Span::styled(message.clone(), Style::default().fg(colors.warn)),
        Span::styled("  (x to dismiss)", Style::default().fg(colors.dim)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the tab bar
fn render_tabs(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let mut spans: Vec<Span> = Vec::new();

    for (index, tab) in Tab::all().iter().enumerate() {
        let label = format!(" {} {} ", index + 1, tab.label());
        let style = if *tab == app.active_tab {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.dim)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Builds the list line for a pre-listing record
fn record_line<'a>(
    record: &'a IpoRecord,
    is_selected: bool,
    is_favorite: bool,
    colors: &Palette,
) -> Line<'a> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " };
    let fav = if is_favorite { "♥ " } else { "  " };

    let name_style = if is_selected {
        Style::default()
            .fg(colors.info)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    };

    let type_tag = match record.kind {
        IpoType::Mainboard => "MB ",
        IpoType::Sme => "SME",
    };

    let live_marker = if record.is_live {
        Span::styled("●", Style::default().fg(colors.accent))
    } else {
        Span::styled("○", Style::default().fg(colors.dim))
    };

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(colors.info)),
        Span::styled(fav, Style::default().fg(colors.danger)),
        Span::styled(format!("{:<28}", record.name), name_style),
        Span::styled(format!("[{}] ", type_tag), Style::default().fg(colors.dim)),
        Span::styled(format!("{:<14}", record.price_band), Style::default().fg(colors.text)),
        Span::styled(
            format!("GMP ₹{:<6}", record.gmp),
            Style::default().fg(signed_color(record.gmp as f64, colors)),
        ),
        Span::styled(
            format!("{:<8}", record.subscription),
            Style::default().fg(colors.text),
        ),
        Span::raw(" "),
        live_marker,
    ])
}

/// Builds the list line for a listed record on the Performance tab
fn listed_line<'a>(record: &'a IpoRecord, is_selected: bool, colors: &Palette) -> Line<'a> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " };
    let name_style = if is_selected {
        Style::default()
            .fg(colors.info)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.text)
    };

    let issue = record.issue_price.unwrap_or(0.0);
    let listing = record.listing_price.unwrap_or(0.0);
    let current = record.current_price.unwrap_or(0.0);
    let returns = record.returns.unwrap_or(0.0);

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(colors.info)),
        Span::styled(format!("{:<28}", record.name), name_style),
        Span::styled(
            format!("Issue ₹{:<8.0}", issue),
            Style::default().fg(colors.dim),
        ),
        Span::styled(
            format!("List ₹{:<8.0}", listing),
            Style::default().fg(colors.text),
        ),
        Span::styled(
            format!("Now ₹{:<8.0}", current),
            Style::default().fg(colors.text),
        ),
        Span::styled(
            format!("{:+.1}%", returns),
            Style::default().fg(signed_color(returns, colors)),
        ),
    ])
}

/// Renders the card list for the active tab
fn render_list(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let records = app.filtered_ipos();
    let mut lines: Vec<Line> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let is_selected = index == app.selected_index;
        let line = if app.active_tab == Tab::Listed {
            listed_line(record, is_selected, colors)
        } else {
            let is_favorite = app.favorites.contains(&record.id);
            record_line(record, is_selected, is_favorite, colors)
        };
        lines.push(line);
    }

    if lines.is_empty() {
        let hint = if app.search_query.is_empty() {
            "No listings under this tab right now."
        } else {
            "No matching items found."
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.dim),
        )));
    }

    let block = Block::default()
        .title(format!(" {} ", app.active_tab.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.info));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the detail pane for the selected record
fn render_detail(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.dim));

    let Some(record) = app.selected_record() else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Select a listing to inspect it.",
                Style::default().fg(colors.dim),
            )))
            .block(block),
            area,
        );
        return;
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            record.name.clone(),
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(record.kind.label(), Style::default().fg(colors.dim)),
        Span::raw("  "),
        Span::styled(
            record.sector.clone().unwrap_or_default(),
            Style::default().fg(colors.dim),
        ),
        Span::raw("  "),
        Span::styled(
            status_badge(record.status),
            Style::default().fg(colors.accent),
        ),
    ])];

    if record.status == IpoStatus::Listed {
        lines.push(Line::from(Span::styled(
            format!(
                "Issue ₹{:.0} → Listing ₹{:.0} → Now ₹{:.0}",
                record.issue_price.unwrap_or(0.0),
                record.listing_price.unwrap_or(0.0),
                record.current_price.unwrap_or(0.0),
            ),
            Style::default().fg(colors.text),
        )));
        lines.push(Line::from(Span::styled(
            format!("Post-listing return: {:+.1}%", record.returns.unwrap_or(0.0)),
            Style::default().fg(signed_color(record.returns.unwrap_or(0.0), colors)),
        )));
    } else {
        let (min_price, max_price) = record.price_band_bounds();
        let estimate = lot_investment(record.lot_size, min_price, max_price);

        lines.push(Line::from(vec![
            Span::styled(
                format!("Band {}  ", record.price_band),
                Style::default().fg(colors.text),
            ),
            Span::styled(
                format!("Lot {} shares  ", record.lot_size),
                Style::default().fg(colors.text),
            ),
            Span::styled(
                format!("Subscribed {}", record.subscription),
                Style::default().fg(colors.text),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled(
                format!("Est. listing ₹{:.0}  ", record.estimated_listing()),
                Style::default().fg(colors.text),
            ),
            Span::styled(
                format!("({:+.1}% on GMP ₹{})", record.expected_gain_pct(), record.gmp),
                Style::default().fg(signed_color(record.gmp as f64, colors)),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "One lot: ₹{:.0} – ₹{:.0}",
                estimate.min_amount, estimate.max_amount
            ),
            Style::default().fg(colors.dim),
        )));
    }

    if let Some(sources) = &record.grounding_sources {
        for source in sources.iter().take(2) {
            lines.push(Line::from(vec![
                Span::styled("↗ ", Style::default().fg(colors.accent)),
                Span::styled(source.title.clone(), Style::default().fg(colors.dim)),
            ]));
        }
    }

    match &app.insight {
        Some((id, text)) if *id == record.id => {
            lines.push(Line::from(Span::styled(
                format!("✦ {}", text),
                Style::default().fg(colors.accent),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "Press i for an analyst insight.",
                Style::default().fg(colors.dim),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Renders the key hints and search readout at the bottom
fn render_help(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    if app.search_active || !app.search_query.is_empty() {
        let line = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(colors.dim)),
            Span::styled(
                app.search_query.clone(),
                Style::default().fg(colors.text),
            ),
            Span::styled(
                if app.search_active { "▏  (Enter to keep, Esc to clear)" } else { "  (Esc to clear)" },
                Style::default().fg(colors.dim),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let help = Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(colors.warn)),
        Span::raw(" Navigate  "),
        Span::styled("1-5", Style::default().fg(colors.warn)),
        Span::raw(" Tabs  "),
        Span::styled("/", Style::default().fg(colors.warn)),
        Span::raw(" Search  "),
        Span::styled("f", Style::default().fg(colors.warn)),
        Span::raw(" Save  "),
        Span::styled("i", Style::default().fg(colors.warn)),
        Span::raw(" Analyze  "),
        Span::styled("r", Style::default().fg(colors.warn)),
        Span::raw(" Refresh  "),
        Span::styled("c", Style::default().fg(colors.warn)),
        Span::raw(" Tools  "),
        Span::styled("a", Style::default().fg(colors.warn)),
        Span::raw(" Academy  "),
        Span::styled("?", Style::default().fg(colors.warn)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(colors.warn)),
        Span::raw(" Quit"),
    ]);

    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(colors.dim)),
        area,
    );
}
