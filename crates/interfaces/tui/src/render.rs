//! Wizard drawing: frame, step sidebar, step body, footer and alert modal.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Flex, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap};

use symcheck_core::{Sex, Step, WizardController};

use crate::app::{App, IntakeField};
use crate::theme::Theme;

const RESULT_NOTE: &str = "Insights are retrieved from medical knowledge sources.";

fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

pub(crate) fn draw_wizard(frame: &mut Frame<'_>, app: &App) {
    let wizard = &app.controller;
    let theme = &app.theme;
    let step = wizard.step();
    let step_total = Step::all().len();

    let area = frame.area();
    let wizard_area = center(area, Constraint::Length(92), Constraint::Length(26));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title_top(
            Line::from(Span::styled(
                " Symptom Checker ",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
        )
        .title_bottom(
            Line::from(Span::styled(
                format!(" Step {}/{step_total} ", step.number()),
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        );
    frame.render_widget(block, wizard_area);

    let inner_area = wizard_area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    });

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(40)])
        .split(inner_area);

    draw_sidebar(frame, columns[0], step, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // progress
            Constraint::Length(2), // title
            Constraint::Min(6),    // body
            Constraint::Length(5), // input
            Constraint::Length(2), // warning / footer
        ])
        .split(columns[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent).bg(theme.background))
        .ratio(step.number() as f64 / step_total as f64)
        .label(format!("Step {} of {step_total}", step.number()));
    frame.render_widget(gauge, chunks[0]);

    let title = Paragraph::new(step_title(step))
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[1]);

    match step {
        Step::Intake => {
            draw_body(frame, chunks[2], intake_description(), theme);
            draw_intake_fields(frame, chunks[3], wizard, app.focus, theme);
        }
        Step::SymptomEntry => {
            draw_body(
                frame,
                chunks[2],
                Text::from("For accurate insights, provide detailed descriptions of your symptoms."),
                theme,
            );
            draw_text_input(frame, chunks[3], wizard.main_symptom(), "Describe Your Symptom", theme);
        }
        Step::Clarification => {
            draw_body(frame, chunks[2], clarification_body(wizard), theme);
            draw_text_input(
                frame,
                chunks[3],
                wizard.refine_answer(),
                "Type your answer here...",
                theme,
            );
        }
        Step::Result => {
            let body = chunks[2].union(chunks[3]);
            let insight = Paragraph::new(result_body(wizard, theme))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(theme.muted)),
                )
                .style(Style::default().fg(theme.foreground))
                .wrap(Wrap { trim: false })
                .scroll((app.scroll, 0));
            frame.render_widget(insight, body);
        }
    }

    let footer = Paragraph::new(footer_line(app))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    if let Some(message) = wizard.alert() {
        draw_alert(frame, area, message, theme);
    }
}

fn draw_sidebar(frame: &mut Frame<'_>, area: Rect, current: Step, theme: &Theme) {
    let sidebar_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.muted))
        .title(" Steps ");
    let sidebar_inner = sidebar_block.inner(area);
    frame.render_widget(sidebar_block, area);

    let labels = Step::all()
        .into_iter()
        .map(|candidate| {
            let label = format!("{}. {}", candidate.number(), candidate.label());
            if candidate == current {
                Line::from(Span::styled(
                    format!("> {label}"),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {label}"),
                    Style::default().fg(theme.foreground),
                ))
            }
        })
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(labels), sidebar_inner);
}

fn step_title(step: Step) -> &'static str {
    match step {
        Step::Intake => "Tell me a little about yourself",
        Step::SymptomEntry => "Describe Your Symptom",
        Step::Clarification => "Answer the following questions",
        Step::Result => "Your Health Insights",
    }
}

fn intake_description() -> Text<'static> {
    Text::from(vec![
        Line::from("Enter your age and choose your sex."),
        Line::from(""),
        Line::from("Tab switches field, Up/Down (or m/f) picks sex."),
    ])
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, text: Text<'_>, theme: &Theme) {
    let widget = Paragraph::new(text)
        .style(Style::default().fg(theme.foreground))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn clarification_body(wizard: &WizardController) -> Text<'static> {
    let mut lines = vec![
        Line::from("Answer a few questions to refine your symptom analysis."),
        Line::from(""),
    ];
    if let Some(questions) = wizard.questions() {
        lines.extend(
            questions
                .iter()
                .enumerate()
                .map(|(index, question)| Line::from(format!("{}. {question}", index + 1))),
        );
    }
    Text::from(lines)
}

fn result_body<'a>(wizard: &'a WizardController, theme: &Theme) -> Text<'a> {
    let mut text = Text::from(wizard.insight().unwrap_or_default());
    text.lines.push(Line::from(""));
    text.lines.push(Line::from(Span::styled(
        RESULT_NOTE,
        Style::default()
            .fg(theme.muted)
            .add_modifier(Modifier::ITALIC),
    )));
    text
}

fn field_block(title: &'static str, focused: bool, theme: &Theme) -> Block<'static> {
    let color = if focused { theme.accent } else { theme.muted };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn draw_intake_fields(
    frame: &mut Frame<'_>,
    area: Rect,
    wizard: &WizardController,
    focus: IntakeField,
    theme: &Theme,
) {
    let [age_area, sex_area] = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(area);

    let age_text = if wizard.age().is_empty() {
        Span::styled("Enter your age", Style::default().fg(theme.muted))
    } else {
        Span::styled(wizard.age().to_string(), Style::default().fg(Color::White))
    };
    let age = Paragraph::new(vec![Line::from(""), Line::from(age_text)])
        .block(field_block(" Age ", focus == IntakeField::Age, theme))
        .alignment(Alignment::Center);
    frame.render_widget(age, age_area);

    let sex_text = match wizard.sex() {
        Sex::Unset => Span::styled("< Select >", Style::default().fg(theme.muted)),
        sex => Span::styled(
            format!("< {} >", sex.as_str()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    };
    let sex = Paragraph::new(vec![Line::from(""), Line::from(sex_text)])
        .block(field_block(" Sex ", focus == IntakeField::Sex, theme))
        .alignment(Alignment::Center);
    frame.render_widget(sex, sex_area);
}

fn draw_text_input(
    frame: &mut Frame<'_>,
    area: Rect,
    value: &str,
    placeholder: &'static str,
    theme: &Theme,
) {
    let content = if value.is_empty() {
        Span::styled(placeholder, Style::default().fg(theme.muted))
    } else {
        Span::styled(value.to_string(), Style::default().fg(Color::White))
    };
    let input = Paragraph::new(Line::from(content))
        .block(field_block(" Your answer ", true, theme))
        .wrap(Wrap { trim: false });
    frame.render_widget(input, area);
}

fn footer_line(app: &App) -> Line<'static> {
    let wizard = &app.controller;
    let theme = &app.theme;

    if wizard.is_loading() {
        let label = match wizard.step() {
            Step::SymptomEntry => "Validating...",
            _ => "Loading...",
        };
        return Line::from(Span::styled(
            format!("{} {label}", app.spinner()),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if wizard.step() == Step::SymptomEntry {
        if let Some(warning) = wizard.warning() {
            return Line::from(Span::styled(
                warning.to_string(),
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    if let Some(hint) = &app.hint {
        return Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            ),
            Span::styled(hint.clone(), Style::default().fg(Color::LightRed)),
        ]);
    }

    let action = match wizard.step() {
        Step::Intake | Step::SymptomEntry => "Enter=Next",
        Step::Clarification => "Enter=Get Health Insights",
        Step::Result => "Enter=Start Over • Up/Down=scroll",
    };
    let style = if wizard.can_advance() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Line::from(Span::styled(format!("{action} • Esc=quit"), style))
}

fn draw_alert(frame: &mut Frame<'_>, area: Rect, message: &str, theme: &Theme) {
    let popup = center(area, Constraint::Length(60), Constraint::Length(7));
    frame.render_widget(Clear, popup);

    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(theme.foreground),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(theme.error))
            .title(" Alert "),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use symcheck_client::{BackendError, ChatResponse, ValidateResponse};
    use symcheck_config::AppConfig;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (_tx, rx) = mpsc::unbounded_channel();
        App::new(
            WizardController::with_rng(StdRng::seed_from_u64(11)),
            rx,
            &AppConfig::default(),
        )
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn to_clarification(app: &mut App) {
        let wizard = &mut app.controller;
        wizard.set_age("29");
        wizard.set_sex(Sex::Male);
        wizard.advance_intake().unwrap();
        wizard.set_main_symptom("upper abdomen pain");
        wizard.begin_validation().unwrap();
        wizard
            .finish_validation(Ok(ValidateResponse::default()))
            .unwrap();
    }

    #[test]
    fn intake_screen_shows_steps_and_fields() {
        let screen = rendered(&app());
        assert!(screen.contains("Symptom Checker"));
        assert!(screen.contains("Tell me a little about yourself"));
        assert!(screen.contains("> 1. About You"));
        assert!(screen.contains("Enter your age"));
        assert!(screen.contains("< Select >"));
        assert!(screen.contains("Step 1 of 4"));
    }

    #[test]
    fn clarification_screen_lists_selected_questions() {
        let mut app = app();
        to_clarification(&mut app);
        let screen = rendered(&app);
        let questions = app.controller.questions().copied().unwrap();
        let first = questions.questions()[0];
        // Long questions wrap; the opening words always fit on one row.
        let prefix: String = first.chars().take(30).collect();
        assert!(screen.contains(&prefix), "missing {prefix:?} in\n{screen}");
        assert!(screen.contains("> 3. Questions"));
    }

    #[test]
    fn insight_failure_draws_alert() {
        let mut app = app();
        to_clarification(&mut app);
        app.controller.set_refine_answer("burning");
        app.controller.begin_insight().unwrap();
        app.controller
            .finish_insight(Err(BackendError::Status {
                endpoint: "http://127.0.0.1:8000/chat".to_string(),
                status: 500,
            }))
            .unwrap();

        let screen = rendered(&app);
        assert!(screen.contains("Alert"));
        assert!(screen.contains("Press Enter to dismiss"));
    }

    #[test]
    fn result_screen_shows_reply_verbatim() {
        let mut app = app();
        to_clarification(&mut app);
        app.controller.set_refine_answer("dull");
        app.controller.begin_insight().unwrap();
        app.controller
            .finish_insight(Ok(ChatResponse {
                reply: Some("Stay hydrated and rest.".to_string()),
            }))
            .unwrap();

        let screen = rendered(&app);
        assert!(screen.contains("Your Health Insights"));
        assert!(screen.contains("Stay hydrated and rest."));
        assert!(screen.contains("Start Over"));
    }

    #[test]
    fn loading_footer_replaces_hint() {
        let mut app = app();
        let wizard = &mut app.controller;
        wizard.set_age("29");
        wizard.set_sex(Sex::Male);
        wizard.advance_intake().unwrap();
        wizard.set_main_symptom("cramps");
        wizard.begin_validation().unwrap();

        let screen = rendered(&app);
        assert!(screen.contains("Validating..."));
    }
}
