use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::rubric::RubricDefinition;
use crate::scoring::ScoreBreakdown;
use crate::session::SessionRecord;
use crate::student::StudentRecord;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Averages are stored raw and always shown with one decimal
pub fn format_average(average: f64) -> String {
    format!("{:.1}", average)
}

/// Score band used for colouring: 2 = strong, 1 = fair, 0 = weak
pub fn score_band(percent: f64) -> u8 {
    if percent >= 85.0 {
        2
    } else if percent >= 60.0 {
        1
    } else {
        0
    }
}

fn colorize_percent(text: String, percent: f64, use_colors: bool) -> String {
    if !use_colors {
        return text;
    }
    match score_band(percent) {
        2 => text.green().bold().to_string(),
        1 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format students as a table: index, id, name, sessions, average.
pub fn format_student_table(students: &[StudentRecord], use_colors: bool) -> String {
    if students.is_empty() {
        return "No students yet. Add one with `recitation-tracker add <name>`.".to_string();
    }

    // Index(3) + id(13) + sessions(8) + average(7) + separators
    let fixed_width = 3 + 1 + 13 + 2 + 2 + 8 + 2 + 7;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => width - fixed_width,
        Some(_) => 20,
        None => usize::MAX,
    };
    let longest = students
        .iter()
        .map(|s| s.name().chars().count())
        .max()
        .unwrap_or(0)
        .min(name_width);

    students
        .iter()
        .enumerate()
        .map(|(idx, student)| {
            let index_str = format!("{:>2}.", idx + 1);
            let id_str = format!("{:>13}", student.id());
            let name = truncate_text(student.name(), name_width);
            let name_padded = format!("{:<width$}", name, width = longest);
            let sessions = format!("{:>3} sess", student.sessions().len());
            let average = format!("{:>6}%", format_average(student.average_score()));

            if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str.dimmed(),
                    id_str.dimmed(),
                    name_padded.bold(),
                    sessions,
                    colorize_percent(average, student.average_score(), true)
                )
            } else {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str, id_str, name_padded, sessions, average
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line student summary (header of `show`)
pub fn format_student_detail(student: &StudentRecord, use_colors: bool) -> String {
    let average = format!("{}%", format_average(student.average_score()));
    let latest = student
        .latest_session()
        .map(|s| format!("{} ({}%)", s.date(), s.total_score()))
        .unwrap_or_else(|| "none".to_string());

    if use_colors {
        format!(
            "{}\n  Id: {}\n  Sessions: {}\n  Total points: {}\n  Average: {}\n  Latest: {}",
            student.name().bold(),
            student.id().dimmed(),
            student.sessions().len(),
            student.total_score(),
            colorize_percent(average, student.average_score(), true),
            latest
        )
    } else {
        format!(
            "{}\n  Id: {}\n  Sessions: {}\n  Total points: {}\n  Average: {}\n  Latest: {}",
            student.name(),
            student.id(),
            student.sessions().len(),
            student.total_score(),
            average,
            latest
        )
    }
}

/// One session as a single line: date, surah | ayahs, level, total
pub fn format_session_line(session: &SessionRecord, use_colors: bool) -> String {
    let date = session.date();
    let passage = format_passage(session);
    let total = format!("{:>3}%", session.total_score());

    if use_colors {
        format!(
            "{}  {}  {:<8}  {}",
            date.dimmed(),
            passage.cyan(),
            session.review_level().as_str(),
            colorize_percent(total, session.total_score() as f64, true)
        )
    } else {
        format!(
            "{}  {}  {:<8}  {}",
            date,
            passage,
            session.review_level().as_str(),
            total
        )
    }
}

pub fn format_passage(session: &SessionRecord) -> String {
    match (session.surah().is_empty(), session.ayah_range().is_empty()) {
        (true, true) => "(no passage)".to_string(),
        (false, true) => session.surah().to_string(),
        (true, false) => format!("ayahs {}", session.ayah_range()),
        (false, false) => format!("{} | {}", session.surah(), session.ayah_range()),
    }
}

/// Session history, newest first, with notes indented under each session
pub fn format_session_history(student: &StudentRecord, use_colors: bool) -> String {
    if student.sessions().is_empty() {
        return "No sessions recorded yet".to_string();
    }

    student
        .sessions()
        .iter()
        .rev()
        .map(|session| {
            let line = format_session_line(session, use_colors);
            if session.notes().is_empty() {
                line
            } else {
                let notes = format!("    {}", session.notes());
                if use_colors {
                    format!("{}\n{}", line, notes.italic())
                } else {
                    format!("{}\n{}", line, notes)
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full rubric listing: categories with their max, each sub-criterion with points and hint
pub fn format_rubric(rubric: &RubricDefinition, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let heading = format!("{} rubric ({} points)", rubric.level, rubric.total_points());
    lines.push(if use_colors {
        heading.bold().to_string()
    } else {
        heading
    });

    for category in &rubric.categories {
        lines.push(String::new());
        let title = format!("{} [{}]  max {}", category.title, category.key, category.max_points);
        lines.push(if use_colors {
            title.cyan().bold().to_string()
        } else {
            title
        });
        for (idx, sub) in category.subcriteria.iter().enumerate() {
            let hint = format!("({})", sub.hint);
            lines.push(format!(
                "  {}. {:>2} pts  {}  {}",
                idx,
                sub.points,
                sub.name,
                if use_colors {
                    hint.dimmed().to_string()
                } else {
                    hint
                }
            ));
        }
    }

    lines.join("\n")
}

/// Per-category subtotals followed by the session total
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let width = breakdown
        .categories
        .iter()
        .map(|c| c.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = breakdown
        .categories
        .iter()
        .map(|c| format!("  {:<width$}  {:>3}/{}", c.title, c.earned, c.max, width = width))
        .collect();

    let total = format!("{}/{}", breakdown.total, breakdown.max_total);
    let label = format!("  {:<width$}  ", "Total", width = width);
    lines.push(if use_colors {
        format!(
            "{}{}",
            label.bold(),
            colorize_percent(total, breakdown.total as f64, true)
        )
    } else {
        format!("{}{}", label, total)
    });

    lines.join("\n")
}
