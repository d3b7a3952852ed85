//! Academy screen rendering
//!
//! Renders the educational module cards and, when running, the knowledge
//! quiz with per-question feedback and the final score.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{palette, Palette};
use crate::academy::{all_modules, Quiz};
use crate::app::App;

/// Renders the academy screen
pub fn render(frame: &mut Frame, app: &App) {
    let colors = palette(app.theme);
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Min(8),    // modules or quiz
            Constraint::Length(1), // help line
        ])
        .split(area);

    render_title(frame, chunks[0], &colors);

    if let Some(quiz) = &app.quiz {
        render_quiz(frame, quiz, chunks[1], &colors);
    } else {
        render_modules(frame, app, chunks[1], &colors);
    }

    render_help(frame, app.quiz.is_some(), chunks[2], &colors);
}

fn render_title(frame: &mut Frame, area: Rect, colors: &Palette) {
    let lines = vec![
        Line::from(Span::styled(
            "IPO ACADEMY",
            Style::default()
                .fg(colors.info)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Master the mechanics of India's primary market.",
            Style::default().fg(colors.dim),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the module cards; the selected one is expanded to its points
fn render_modules(frame: &mut Frame, app: &App, area: Rect, colors: &Palette) {
    let modules = all_modules();
    let mut lines: Vec<Line> = Vec::new();

    for (index, module) in modules.iter().enumerate() {
        let is_selected = index == app.academy_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " };
        let title_style = if is_selected {
            Style::default()
                .fg(colors.info)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.text)
        };

        lines.push(Line::from(vec![
            Span::styled(cursor, Style::default().fg(colors.info)),
            Span::styled(format!("{:<28}", module.title), title_style),
            Span::styled(
                format!("[{}] ", module.category.label()),
                Style::default().fg(colors.warn),
            ),
            Span::styled(module.summary, Style::default().fg(colors.dim)),
        ]));

        if is_selected {
            for point in module.points {
                lines.push(Line::from(vec![
                    Span::raw("      "),
                    Span::styled("• ", Style::default().fg(colors.accent)),
                    Span::styled(*point, Style::default().fg(colors.text)),
                ]));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Ready for the markets? Press ", Style::default().fg(colors.dim)),
        Span::styled("s", Style::default().fg(colors.warn)),
        Span::styled(
            " to start the certification quiz.",
            Style::default().fg(colors.dim),
        ),
    ]));

    let block = Block::default()
        .title(" Modules ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.info));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Renders the running quiz, or the final score once finished
fn render_quiz(frame: &mut Frame, quiz: &Quiz, area: Rect, colors: &Palette) {
    let block = Block::default()
        .title(" Certification Quiz ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.accent));

    let Some(question) = quiz.current() else {
        // Finished: show the score and the badge verdict
        let verdict = if quiz.passed() {
            Span::styled(
                "Terminal Master badge unlocked!",
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "Review the modules and try again.",
                Style::default().fg(colors.warn),
            )
        };

        let lines = vec![
            Line::from(Span::styled(
                format!("Score: {}/{}", quiz.score, quiz.total()),
                Style::default()
                    .fg(colors.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(verdict),
            Line::from(""),
            Line::from(Span::styled(
                "s restart · Esc back to modules",
                Style::default().fg(colors.dim),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Question {}/{}   Score {}", quiz.index + 1, quiz.total(), quiz.score),
            Style::default().fg(colors.dim),
        )),
        Line::from(""),
        Line::from(Span::styled(
            question.prompt,
            Style::default()
                .fg(colors.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (index, choice) in question.choices.iter().enumerate() {
        let style = match quiz.selected {
            // Before answering every choice is neutral
            None => Style::default().fg(colors.text),
            Some(_) if index == question.answer => Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
            Some(picked) if index == picked => Style::default().fg(colors.danger),
            Some(_) => Style::default().fg(colors.dim),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {}. ", index + 1), Style::default().fg(colors.warn)),
            Span::styled(*choice, style),
        ]));
    }

    if quiz.selected.is_some() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            question.explanation,
            Style::default().fg(colors.dim),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_help(frame: &mut Frame, in_quiz: bool, area: Rect, colors: &Palette) {
    let help = if in_quiz {
        Line::from(vec![
            Span::styled("1-4", Style::default().fg(colors.warn)),
            Span::raw(" Answer  "),
            Span::styled("Enter", Style::default().fg(colors.warn)),
            Span::raw(" Next  "),
            Span::styled("Esc", Style::default().fg(colors.warn)),
            Span::raw(" Exit Quiz  "),
            Span::styled("q", Style::default().fg(colors.warn)),
            Span::raw(" Quit"),
        ])
    } else {
        Line::from(vec![
            Span::styled("↑/↓", Style::default().fg(colors.warn)),
            Span::raw(" Module  "),
            Span::styled("s", Style::default().fg(colors.warn)),
            Span::raw(" Quiz  "),
            Span::styled("d", Style::default().fg(colors.warn)),
            Span::raw(" Dashboard  "),
            Span::styled("q", Style::default().fg(colors.warn)),
            Span::raw(" Quit"),
        ])
    };

    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(colors.dim)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testutil::test_app;
    use crate::app::View;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_string(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_modules_list_renders_titles() {
        let (mut app, _dir) = test_app();
        app.view = View::Academy;
        let backend = TestBackend::new(110, 35);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_string(&terminal);
        assert!(content.contains("IPO ACADEMY"));
        assert!(content.contains("The IPO Lifecycle"));
        assert!(content.contains("Quota Allocation"));
    }

    #[test]
    fn test_selected_module_is_expanded() {
        let (mut app, _dir) = test_app();
        app.view = View::Academy;
        app.academy_index = 0;
        let backend = TestBackend::new(110, 35);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        // The lifecycle module's first point is visible
        assert!(buffer_string(&terminal).contains("DRHP"));
    }

    #[test]
    fn test_quiz_renders_question_and_choices() {
        let (mut app, _dir) = test_app();
        app.view = View::Academy;
        app.quiz = Some(Quiz::new());
        let backend = TestBackend::new(110, 35);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_string(&terminal);
        assert!(content.contains("Certification Quiz"));
        assert!(content.contains("Question 1/"));
        assert!(content.contains("1."));
        assert!(content.contains("4."));
    }

    #[test]
    fn test_answered_question_shows_explanation() {
        let (mut app, _dir) = test_app();
        app.view = View::Academy;
        let mut quiz = Quiz::new();
        let question = quiz.current().unwrap();
        let explanation = question.explanation;
        quiz.answer(question.answer);
        app.quiz = Some(quiz);

        let backend = TestBackend::new(130, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_string(&terminal);
        // A leading fragment of the explanation fits on one row
        assert!(content.contains(&explanation[..20]));
    }

    #[test]
    fn test_finished_quiz_shows_score() {
        let (mut app, _dir) = test_app();
        app.view = View::Academy;
        let mut quiz = Quiz::new();
        while let Some(question) = quiz.current() {
            quiz.answer(question.answer);
            quiz.advance();
        }
        app.quiz = Some(quiz);

        let backend = TestBackend::new(110, 35);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let content = buffer_string(&terminal);
        assert!(content.contains("Score:"));
        assert!(content.contains("Terminal Master badge unlocked!"));
    }
}
