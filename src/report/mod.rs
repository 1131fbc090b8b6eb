use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::output::{format_average, format_passage};
use crate::student::StudentRecord;

/// Plain-text report card: header, summary, then one line per session
/// oldest first.
pub fn render_report_card(student: &StudentRecord) -> String {
    let mut lines = vec![
        format!("Recitation Report Card: {}", student.name()),
        "=".repeat(24 + student.name().chars().count()),
        String::new(),
        format!("Sessions:      {}", student.sessions().len()),
        format!("Average score: {}%", format_average(student.average_score())),
        String::new(),
    ];

    if student.sessions().is_empty() {
        lines.push("No sessions recorded yet.".to_string());
    } else {
        lines.push(format!(
            "{:<10}  {:<8}  {:>5}  {}",
            "Date", "Level", "Score", "Passage"
        ));
        for session in student.sessions() {
            lines.push(format!(
                "{:<10}  {:<8}  {:>4}%  {}",
                session.date(),
                session.review_level().as_str(),
                session.total_score(),
                format_passage(session)
            ));
            if !session.notes().is_empty() {
                lines.push(format!("            Notes: {}", session.notes()));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// `<sanitised-name>-<id>.txt`; anything but ASCII alphanumerics becomes `-`.
pub fn report_file_name(student: &StudentRecord) -> String {
    let mut slug = String::new();
    for c in student.name().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        format!("student-{}.txt", student.id())
    } else {
        format!("{}-{}.txt", slug, student.id())
    }
}

/// Write the report card into `dir` atomically and return its path.
pub fn print_report_card(student: &StudentRecord, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create report directory {}", dir.display()))?;

    let path = dir.join(report_file_name(student));
    let mut file = AtomicWriteFile::open(&path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    file.write_all(render_report_card(student).as_bytes())
        .context("Failed to write report card")?;
    file.commit()
        .with_context(|| format!("Failed to commit report card to {}", path.display()))?;

    Ok(path)
}

/// Short progress summary used as the email body
pub fn email_summary(student: &StudentRecord) -> String {
    let mut body = format!(
        "Assalamu alaikum,\n\n{} has completed {} recitation session(s) with an average score of {}%.",
        student.name(),
        student.sessions().len(),
        format_average(student.average_score())
    );
    if let Some(latest) = student.latest_session() {
        body.push_str(&format!(
            "\nLatest session: {} ({}), {}%.",
            latest.date(),
            format_passage(latest),
            latest.total_score()
        ));
        if !latest.notes().is_empty() {
            body.push_str(&format!("\nTeacher notes: {}", latest.notes()));
        }
    }
    body
}

/// Build the `mailto:` URL; an unknown recipient leaves the address empty.
pub fn build_mailto(student: &StudentRecord, recipient: Option<&str>) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        urlencoding::encode(recipient.unwrap_or_default()),
        urlencoding::encode(&format!("Recitation progress: {}", student.name())),
        urlencoding::encode(&email_summary(student))
    )
}

/// Open the parent email in the default mail handler. Returns the URL opened.
pub fn send_email_to_parent(student: &StudentRecord, recipient: Option<&str>) -> Result<String> {
    let url = build_mailto(student, recipient);
    webbrowser::open(&url)
        .with_context(|| format!("Failed to open mail client for {}", student.name()))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{select_rubric, ReviewLevel};
    use crate::scoring::ScoreEntry;
    use crate::session::{finalize_session, SessionDraft};
    use std::env;

    fn student_with_sessions() -> StudentRecord {
        let rubric = select_rubric(ReviewLevel::Basic);
        let mut student = StudentRecord::new(1700000000123, "Umm Kulthum");
        for (day, value, notes) in [(1, 8u32, ""), (8, 5, "Review idgham")] {
            let mut scores = ScoreEntry::new();
            scores.set(rubric, "mistakes", 0, value).unwrap();
            let draft = SessionDraft {
                date: format!("2024-03-{:02}", day),
                surah: "Al-Mulk".to_string(),
                ayah_range: "1-10".to_string(),
                notes: notes.to_string(),
            };
            student.append_session(finalize_session(draft, scores, ReviewLevel::Basic));
        }
        student
    }

    #[test]
    fn test_render_report_card() {
        let card = render_report_card(&student_with_sessions());
        let lines: Vec<&str> = card.lines().collect();
        assert_eq!(lines[0], "Recitation Report Card: Umm Kulthum");
        assert_eq!(lines[1].len(), lines[0].len());
        assert!(card.contains("Sessions:      2"));
        assert!(card.contains("Average score: 6.5%"));
        assert!(card.contains("2024-03-01  basic        8%  Al-Mulk | 1-10"));
        assert!(card.contains("            Notes: Review idgham"));
    }

    #[test]
    fn test_render_empty_report() {
        let card = render_report_card(&StudentRecord::new(5, "Zayd"));
        assert!(card.contains("Average score: 0.0%"));
        assert!(card.contains("No sessions recorded yet."));
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(&StudentRecord::new(7, "Umm Kulthum")),
            "umm-kulthum-7.txt"
        );
        assert_eq!(
            report_file_name(&StudentRecord::new(8, "  Ali / Hasan ")),
            "ali-hasan-8.txt"
        );
        assert_eq!(report_file_name(&StudentRecord::new(9, "عمر")), "student-9.txt");
    }

    #[test]
    fn test_print_report_card_writes_file() {
        let dir = env::temp_dir().join("recitation_tracker_reports_test");
        let _ = fs::remove_dir_all(&dir);

        let student = student_with_sessions();
        let path = print_report_card(&student, &dir).unwrap();
        assert_eq!(path, dir.join("umm-kulthum-1700000000123.txt"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_report_card(&student));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_build_mailto() {
        let url = build_mailto(&student_with_sessions(), Some("home@example.com"));
        assert!(url.starts_with("mailto:home%40example.com?subject=Recitation%20progress%3A%20Umm%20Kulthum&body="));
        assert!(url.contains("average%20score%20of%206.5%25"));
        assert!(url.contains("Latest%20session%3A%202024-03-08"));
        assert!(!url.contains(' '));
        assert!(!url.contains('\n'));
        assert!(url.contains("%0ALatest"));
    }

    #[test]
    fn test_build_mailto_without_recipient() {
        let url = build_mailto(&StudentRecord::new(3, "Hind"), None);
        assert!(url.starts_with("mailto:?subject="));
        assert!(!url.contains("Latest"));
    }
}
