//! Tools screen rendering
//!
//! Renders the calculator selector, the focused input fields, and the
//! computed results for the active calculator.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{palette, Palette};
use crate::app::{App, ToolsState};
use crate::tools::{
    allotment_probability, average_price, cagr, capital_gains_tax, graham_number, sip_projection,
    Tool,
};

/// Renders the tools screen
pub fn render(frame: &mut Frame, app: &App) {
    let colors = palette(app.theme);
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title + tool selector
            Constraint::Min(8),    // inputs
            Constraint::Length(7), // results
            Constraint::Length(1), // help line
        ])
        .split(area);

    render_selector(frame, app, chunks[0], &colors);
    render_inputs(frame, app, chunks[1], &colors);
    render_results(frame, app, chunks[2], &colors);
    render_help(frame, chunks[3], &colors);
}

/// Renders the screen title and the calculator selector
fn render_selector(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let title = Line::from(Span::styled(
        "TERMINAL TOOLS",
        Style::default()
            .fg(colors.info)
            .add_modifier(Modifier::BOLD),
    ));

    let mut spans: Vec<Span> = Vec::new();
    for (index, tool) in Tool::all().iter().enumerate() {
        let style = if *tool == app.tools.tool {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.dim)
        };
        spans.push(Span::styled(
            format!(" {} {} ", index + 1, tool.label()),
            style,
        ));
    }

    frame.render_widget(Paragraph::new(vec![title, Line::from(spans)]), area);
}

/// Labeled input rows for the active calculator, in field order
fn input_rows(tools: &ToolsState) -> Vec<(String, String)> {
    match tools.tool {
        Tool::Sip => vec![
            ("Monthly Investment".to_string(), format!("₹{:.0}", tools.sip_monthly)),
            ("Expected Return Rate".to_string(), format!("{}% p.a.", tools.sip_rate)),
            ("Time Period".to_string(), format!("{} years", tools.sip_years)),
        ],
        Tool::StockAverage => {
            let mut rows = Vec::with_capacity(tools.avg_rows.len() * 2);
            for (index, (price, qty)) in tools.avg_rows.iter().enumerate() {
                rows.push((format!("Buy #{} Price", index + 1), format!("₹{:.0}", price)));
                rows.push((format!("Buy #{} Quantity", index + 1), format!("{:.0}", qty)));
            }
            rows
        }
        Tool::Allotment => vec![
            ("Shares Offered".to_string(), format!("{:.0}", tools.offered_shares)),
            ("Shares Applied".to_string(), format!("{:.0}", tools.applied_shares)),
        ],
        Tool::Cagr => vec![
            ("Initial Value".to_string(), format!("₹{:.0}", tools.cagr_initial)),
            ("Final Value".to_string(), format!("₹{:.0}", tools.cagr_final)),
            ("Period".to_string(), format!("{:.0} years", tools.cagr_years)),
        ],
        Tool::CapitalGains => vec![
            ("Buy Price".to_string(), format!("₹{:.0}", tools.cg_buy)),
            ("Sell Price".to_string(), format!("₹{:.0}", tools.cg_sell)),
            ("Quantity".to_string(), format!("{:.0}", tools.cg_qty)),
            ("Holding Period".to_string(), format!("{} days", tools.cg_days)),
        ],
        Tool::Graham => vec![
            ("Earnings Per Share".to_string(), format!("₹{:.1}", tools.graham_eps)),
            ("Book Value Per Share".to_string(), format!("₹{:.1}", tools.graham_bvps)),
        ],
    }
}

/// Renders the input fields with the focused one highlighted
fn render_inputs(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let rows = input_rows(&app.tools);
    let mut lines: Vec<Line> = Vec::with_capacity(rows.len());

    for (index, (label, value)) in rows.into_iter().enumerate() {
        let focused = index == app.tools.field;
        let cursor = if focused { "\u{25B8} " } else { "  " };
        let label_style = if focused {
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.dim)
        };
        let value_style = if focused {
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text)
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, Style::default().fg(colors.info)),
            Span::styled(format!("{:<24}", label), label_style),
            Span::styled(value, value_style),
        ]));
    }

    let block = Block::default()
        .title(format!(" {} ", app.tools.tool.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.info));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the computed results for the active calculator
fn render_results(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let tools = &app.tools;
    let value_style = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);
    let label_style = Style::default().fg(colors.dim);

    let lines: Vec<Line> = match tools.tool {
        Tool::Sip => {
            let result = sip_projection(tools.sip_monthly, tools.sip_rate, tools.sip_years);
            vec![
                Line::from(vec![
                    Span::styled("Invested   ", label_style),
                    Span::styled(format!("₹{:.0}", result.invested), Style::default().fg(colors.text)),
                ]),
                Line::from(vec![
                    Span::styled("Est. Gains ", label_style),
                    Span::styled(format!("₹{:.0}", result.gains), value_style),
                ]),
                Line::from(vec![
                    Span::styled("Total Value", label_style),
                    Span::styled(format!(" ₹{:.0}", result.total), value_style),
                ]),
            ]
        }
        Tool::StockAverage => {
            let result = average_price(&tools.avg_rows);
            vec![
                Line::from(vec![
                    Span::styled("Total Cost ", label_style),
                    Span::styled(format!("₹{:.0}", result.total_cost), Style::default().fg(colors.text)),
                ]),
                Line::from(vec![
                    Span::styled("Total Qty  ", label_style),
                    Span::styled(format!("{:.0}", result.total_qty), Style::default().fg(colors.text)),
                ]),
                Line::from(vec![
                    Span::styled("Avg. Price ", label_style),
                    Span::styled(format!("₹{:.2}", result.average), value_style),
                ]),
            ]
        }
        Tool::Allotment => {
            let prob = allotment_probability(tools.offered_shares, tools.applied_shares);
            vec![Line::from(vec![
                Span::styled("Allotment Probability ", label_style),
                Span::styled(format!("{:.1}%", prob), value_style),
            ])]
        }
        Tool::Cagr => match cagr(tools.cagr_initial, tools.cagr_final, tools.cagr_years) {
            Some(rate) => vec![Line::from(vec![
                Span::styled("CAGR ", label_style),
                Span::styled(format!("{:.2}% p.a.", rate), value_style),
            ])],
            None => vec![Line::from(Span::styled(
                "Enter positive values to compute CAGR.",
                label_style,
            ))],
        },
        Tool::CapitalGains => {
            let result =
                capital_gains_tax(tools.cg_buy, tools.cg_sell, tools.cg_qty, tools.cg_days);
            let regime = if result.is_long_term { "LTCG 12.5%" } else { "STCG 20%" };
            vec![
                Line::from(vec![
                    Span::styled("Realized Gain ", label_style),
                    Span::styled(format!("₹{:.0}", result.gain), Style::default().fg(colors.text)),
                    Span::styled(format!("  ({})", regime), label_style),
                ]),
                Line::from(vec![
                    Span::styled("Taxable Gain  ", label_style),
                    Span::styled(format!("₹{:.0}", result.taxable_gain), Style::default().fg(colors.text)),
                ]),
                Line::from(vec![
                    Span::styled("Tax Due       ", label_style),
                    Span::styled(format!("₹{:.0}", result.tax), value_style),
                ]),
            ]
        }
        Tool::Graham => match graham_number(tools.graham_eps, tools.graham_bvps) {
            Some(value) => vec![Line::from(vec![
                Span::styled("Graham Fair Value ", label_style),
                Span::styled(format!("₹{:.2}", value), value_style),
            ])],
            None => vec![Line::from(Span::styled(
                "Needs positive EPS and book value.",
                label_style,
            ))],
        },
    };

    let block = Block::default()
        .title(" Results ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.dim));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the key hints at the bottom
fn render_help(frame: &mut Frame, area: Rect, colors: &Palette) {
    let help = Line::from(vec![
        Span::styled("1-6", Style::default().fg(colors.warn)),
        Span::raw(" Calculator  "),
        Span::styled("↑/↓", Style::default().fg(colors.warn)),
        Span::raw(" Field  "),
        Span::styled("←/→", Style::default().fg(colors.warn)),
        Span::raw(" Adjust  "),
        Span::styled("n/x", Style::default().fg(colors.warn)),
        Span::raw(" Add/Drop Row  "),
        Span::styled("d", Style::default().fg(colors.warn)),
        Span::raw(" Dashboard  "),
        Span::styled("q", Style::default().fg(colors.warn)),
        Span::raw(" Quit"),
    ]);

    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(colors.dim)),
        area,
    );
}
