use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rubric::{select_rubric, ReviewLevel};
use crate::scoring::{compute_session_total, ScoreEntry};

/// Format dates are entered and displayed in
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// User-entered fields of a session that is still being collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub date: String,
    pub surah: String,
    pub ayah_range: String,
    pub notes: String,
}

impl Default for SessionDraft {
    fn default() -> Self {
        Self {
            date: Utc::now().date_naive().format(DATE_FORMAT).to_string(),
            surah: String::new(),
            ayah_range: String::new(),
            notes: String::new(),
        }
    }
}

/// One graded recitation. Only `finalize_session` builds these and no
/// setter exists, so a saved record cannot change.
///
/// `date` is kept as entered. Input forms check the format, but stored
/// records are not re-validated, so one odd date cannot make the whole
/// collection unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    date: String,
    surah: String,
    ayah_range: String,
    scores: ScoreEntry,
    total_score: u32,
    notes: String,
    review_level: ReviewLevel,
    timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn surah(&self) -> &str {
        &self.surah
    }

    pub fn ayah_range(&self) -> &str {
        &self.ayah_range
    }

    pub fn scores(&self) -> &ScoreEntry {
        &self.scores
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn review_level(&self) -> ReviewLevel {
        self.review_level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Combine the draft fields with the computed total into an immutable record,
/// stamped with the current time.
pub fn finalize_session(draft: SessionDraft, scores: ScoreEntry, level: ReviewLevel) -> SessionRecord {
    finalize_session_at(draft, scores, level, Utc::now())
}

pub fn finalize_session_at(
    draft: SessionDraft,
    scores: ScoreEntry,
    level: ReviewLevel,
    timestamp: DateTime<Utc>,
) -> SessionRecord {
    let total_score = compute_session_total(select_rubric(level), &scores);

    SessionRecord {
        date: draft.date,
        surah: draft.surah,
        ayah_range: draft.ayah_range,
        scores,
        total_score,
        notes: draft.notes,
        review_level: level,
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> SessionDraft {
        SessionDraft {
            date: "2024-03-10".to_string(),
            surah: "Al-Fatiha".to_string(),
            ayah_range: "1-7".to_string(),
            notes: "Good madd".to_string(),
        }
    }

    #[test]
    fn test_finalize_computes_total() {
        let rubric = select_rubric(ReviewLevel::Basic);
        let mut scores = ScoreEntry::new();
        scores.set(rubric, "pronunciation", 1, 10).unwrap();
        scores.set(rubric, "mistakes", 1, 7).unwrap();

        let record = finalize_session(draft(), scores.clone(), ReviewLevel::Basic);
        assert_eq!(record.total_score(), 17);
        assert_eq!(record.scores(), &scores);
        assert_eq!(record.surah(), "Al-Fatiha");
        assert_eq!(record.ayah_range(), "1-7");
        assert_eq!(record.notes(), "Good madd");
        assert_eq!(record.review_level(), ReviewLevel::Basic);
    }

    #[test]
    fn test_finalize_total_uses_level_rubric() {
        let advanced = select_rubric(ReviewLevel::Advanced);
        let mut scores = ScoreEntry::new();
        scores.set(advanced, "makhraj", 1, 8).unwrap();

        // Scored against the advanced rubric, but finalized as basic: makhraj is unknown there
        let record = finalize_session(draft(), scores.clone(), ReviewLevel::Basic);
        assert_eq!(record.total_score(), 0);
        let record = finalize_session(draft(), scores, ReviewLevel::Advanced);
        assert_eq!(record.total_score(), 8);
    }

    #[test]
    fn test_json_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap();
        let record = finalize_session_at(draft(), ScoreEntry::new(), ReviewLevel::Advanced, at);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2024-03-10");
        assert_eq!(value["ayahRange"], "1-7");
        assert_eq!(value["totalScore"], 0);
        assert_eq!(value["reviewLevel"], "advanced");
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-03-10T09:30:00"));
        assert!(value["scores"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let rubric = select_rubric(ReviewLevel::Basic);
        let mut scores = ScoreEntry::new();
        scores.set(rubric, "fluency", 3, 4).unwrap();
        let record = finalize_session(draft(), scores, ReviewLevel::Basic);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_default_draft_date_is_today() {
        let today = Utc::now().date_naive().format(DATE_FORMAT).to_string();
        assert_eq!(SessionDraft::default().date, today);
    }

    #[test]
    fn test_blank_date_decodes() {
        let json = r#"{"date":"","surah":"","ayahRange":"","scores":{},"totalScore":0,"notes":"","reviewLevel":"basic","timestamp":"2024-03-10T09:30:00Z"}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date(), "");
    }
}
