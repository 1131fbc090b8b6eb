use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{format_average, format_passage, truncate_text};
use crate::student::StudentRecord;
use crate::tui::app::{App, DetailTab, FormField, InputMode, Screen, ScoringForm};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Title(1) + body(fill) + status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    match app.screen {
        Screen::Students => render_student_table(frame, chunks[1], app),
        Screen::Detail => render_detail(frame, chunks[1], app),
        Screen::Scoring => render_scoring_form(frame, chunks[1], app),
    }
    render_status_bar(frame, chunks[2], app);

    match app.input_mode {
        InputMode::AddStudent => render_add_student_popup(frame, app),
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let left = "Quran Tracker";
    let right = match (app.screen, app.current_student()) {
        (Screen::Students, _) | (_, None) => format!("{} students", app.students().len()),
        (_, Some(student)) => student.name().to_string(),
    };
    let padding = (area.width as usize).saturating_sub(left.len() + right.chars().count());

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(app.theme.title_color).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(app.theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_student_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;
    let students = app.tracker.students();

    if students.is_empty() {
        let empty_msg = Paragraph::new("No students yet. Press 'a' to add one.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted));
        frame.render_widget(empty_msg, area);
        return;
    }

    let rows: Vec<Row> = students
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            let average = student.average_score();
            let mut average_spans = vec![Span::styled(
                format!("{:>6}% ", format_average(average)),
                Style::default().fg(theme.score_color(average)),
            )];
            average_spans.extend(score_bar(average, 10, theme).spans);

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(truncate_text(student.name(), 40)),
                Cell::from(format!("{:>4}", student.sessions().len())),
                Cell::from(Line::from(average_spans)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Name", "Sessions", "Average"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let Some(student) = app.current_student() else {
        return;
    };
    let theme = &app.theme;

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)])
        .split(area);

    let titles: Vec<&str> = DetailTab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .select(app.detail_tab.index())
        .style(theme.tab_inactive_style)
        .highlight_style(theme.tab_active_style.reversed())
        .divider(" | ");
    frame.render_widget(tabs, chunks[0]);

    let body = match app.detail_tab {
        DetailTab::Score => score_summary_lines(student, theme),
        DetailTab::History => history_lines(student, theme),
        DetailTab::Actions => action_lines(app),
    };
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), chunks[2]);
}

fn score_summary_lines(student: &StudentRecord, theme: &ThemeColors) -> Vec<Line<'static>> {
    let average = student.average_score();
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Average  ", Style::default().fg(theme.muted)),
            Span::styled(
                format!("{}%", format_average(average)),
                Style::default().fg(theme.score_color(average)).bold(),
            ),
        ]),
        Line::from(vec![
            Span::styled("Sessions ", Style::default().fg(theme.muted)),
            Span::raw(student.sessions().len().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Points   ", Style::default().fg(theme.muted)),
            Span::raw(student.total_score().to_string()),
        ]),
        Line::from(""),
    ];

    match student.latest_session() {
        Some(latest) => {
            let total = latest.total_score() as f64;
            let mut spans = vec![
                Span::styled("Latest   ", Style::default().fg(theme.muted)),
                Span::styled(
                    format!("{:>3}% ", latest.total_score()),
                    Style::default().fg(theme.score_color(total)),
                ),
            ];
            spans.extend(score_bar(total, 20, theme).spans);
            lines.push(Line::from(spans));
            lines.push(Line::from(format!(
                "         {}  {}  {}",
                latest.date(),
                format_passage(latest),
                latest.review_level()
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "No sessions yet. Press 'n' to score one.",
            Style::default().fg(theme.muted),
        ))),
    }
    lines
}

fn history_lines(student: &StudentRecord, theme: &ThemeColors) -> Vec<Line<'static>> {
    if student.sessions().is_empty() {
        return vec![Line::from(Span::styled(
            "No sessions recorded yet",
            Style::default().fg(theme.muted),
        ))];
    }

    let mut lines = Vec::new();
    for session in student.sessions().iter().rev() {
        lines.push(Line::from(vec![
            Span::styled(
                session.date().to_string(),
                Style::default().fg(theme.muted),
            ),
            Span::raw("  "),
            Span::styled(
                format!("{:>3}%", session.total_score()),
                Style::default().fg(theme.score_color(session.total_score() as f64)),
            ),
            Span::raw("  "),
            Span::raw(format_passage(session)),
            Span::styled(
                format!("  [{}]", session.review_level()),
                Style::default().fg(theme.muted),
            ),
        ]));
        if !session.notes().is_empty() {
            lines.push(Line::from(Span::styled(
                format!("      {}", session.notes()),
                Style::default().fg(theme.muted).italic(),
            )));
        }
    }
    lines
}

fn action_lines(app: &App) -> Vec<Line<'static>> {
    let key = Style::default().fg(app.theme.status_key_color).bold();
    let mut lines = vec![
        Line::from(vec![Span::styled("n  ", key), Span::raw("New scoring session")]),
        Line::from(vec![
            Span::styled("p  ", key),
            Span::raw(format!("Print report card to {}", app.config.report_dir().display())),
        ]),
    ];
    let email = app
        .current_student()
        .and_then(|s| app.config.parent_email(s.name()))
        .map(|e| format!("Email parent ({})", e))
        .unwrap_or_else(|| "Email parent (no address configured)".to_string());
    lines.push(Line::from(vec![Span::styled("e  ", key), Span::raw(email)]));
    lines
}

fn render_scoring_form(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let theme = &app.theme;

    // Fields(4) + level/total(1) + gap(1) + criteria(fill)
    let chunks = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let field_lines: Vec<Line> = [FormField::Date, FormField::Surah, FormField::Ayah, FormField::Notes]
        .iter()
        .map(|field| {
            let focused = form.focus == *field;
            let label_style = if focused {
                theme.field_focused
            } else {
                Style::default().fg(theme.muted)
            };
            let cursor = if focused { "|" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<7}", field.label()), label_style),
                Span::raw(format!("{}{}", form.field_text(*field), cursor)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(field_lines), chunks[0]);

    let total = form.session.total();
    let summary = Line::from(vec![
        Span::styled("Level ", Style::default().fg(theme.muted)),
        Span::styled(form.session.level().to_string(), theme.header_style),
        Span::raw("   "),
        Span::styled("Total ", Style::default().fg(theme.muted)),
        Span::styled(
            format!("{}/{}", total, form.rubric().total_points()),
            Style::default().fg(theme.score_color(total as f64)).bold(),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary), chunks[1]);

    render_criteria_table(frame, chunks[3], form, theme);
}

fn render_criteria_table(frame: &mut Frame, area: Rect, form: &ScoringForm, theme: &ThemeColors) {
    let breakdown = form.session.breakdown();
    let scores_focused = form.focus == FormField::Scores;
    let mut rows = Vec::new();
    let mut flat_index = 0;
    let mut selected_row = None;

    for (category, subtotal) in form.rubric().categories.iter().zip(&breakdown.categories) {
        rows.push(
            Row::new(vec![
                Cell::from(category.title.clone()),
                Cell::from(format!("{:>2}/{}", subtotal.earned, subtotal.max)),
                Cell::from(""),
            ])
            .style(theme.header_style.fg(theme.title_color)),
        );
        for (idx, sub) in category.subcriteria.iter().enumerate() {
            if flat_index == form.selected {
                selected_row = Some(rows.len());
            }
            let value = form.session.score(&category.key, idx);
            rows.push(Row::new(vec![
                Cell::from(format!("  {}", sub.name)),
                Cell::from(format!("{:>2}/{}", value, sub.points)),
                Cell::from(sub.hint.clone()).style(Style::default().fg(theme.muted)),
            ]));
            flat_index += 1;
        }
    }

    let widths = [Constraint::Fill(2), Constraint::Length(6), Constraint::Fill(1)];
    let highlight = if scores_focused {
        theme.row_selected
    } else {
        Style::default()
    };
    let table = Table::new(rows, widths).row_highlight_style(highlight);

    let mut state = ratatui::widgets::TableState::default();
    state.select(selected_row);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Invalid") {
            theme.flash_error
        } else if msg.starts_with("Added")
            || msg.starts_with("Saved")
            || msg.starts_with("Report")
            || msg.starts_with("Opened")
        {
            theme.flash_success
        } else {
            theme.muted
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match app.screen {
            Screen::Students => &[
                ("j/k", ":nav "),
                ("Enter", ":open "),
                ("a", ":add "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            Screen::Detail => &[
                ("Tab", ":tabs "),
                ("n", ":new session "),
                ("p", ":print "),
                ("e", ":email "),
                ("Esc", ":back"),
            ],
            Screen::Scoring => &[
                ("Tab", ":field "),
                ("Up/Down", ":row "),
                ("0-9 +/-", ":score "),
                ("C-l", ":level "),
                ("C-s", ":save "),
                ("Esc", ":cancel"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

fn score_bar(percent: f64, width: usize, theme: &ThemeColors) -> Line<'static> {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(theme.score_color(percent)),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(theme.bar_empty)));
    }
    Line::from(spans)
}

fn render_add_student_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(44, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Add Student ", app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(Paragraph::new(format!("{}|", app.name_input)), chunks[0]);
    frame.render_widget(
        Paragraph::new("Enter: add | Esc: cancel").style(Style::default().fg(app.theme.muted)),
        chunks[1],
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(52, 17, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("a             ", "Add student"),
        ("Enter         ", "Open student"),
        ("Tab           ", "Next tab / next form field"),
        ("n             ", "New scoring session"),
        ("p             ", "Print report card"),
        ("e             ", "Email parent"),
        ("Ctrl-l        ", "Switch basic/advanced rubric"),
        ("Ctrl-s        ", "Save session"),
        ("Esc           ", "Back / cancel"),
        ("q / Ctrl-c    ", "Quit"),
    ];
    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(k, desc)| Line::from(vec![Span::styled(*k, key), Span::raw(*desc)]))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
