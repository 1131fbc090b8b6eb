use std::fmt;

use super::entry::{RawScore, ScoreEntry};
use crate::rubric::{ReviewLevel, RubricDefinition};

/// Lookup failures. Out-of-range or malformed values are never errors;
/// they are clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    UnknownCategory {
        level: ReviewLevel,
        key: String,
    },
    UnknownSubCriterion {
        level: ReviewLevel,
        key: String,
        index: usize,
    },
}

impl fmt::Display for ScoringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringError::UnknownCategory { level, key } => {
                write!(f, "Unknown category '{}' in {} rubric", key, level)
            }
            ScoringError::UnknownSubCriterion { level, key, index } => write!(
                f,
                "Category '{}' in {} rubric has no sub-criterion {}",
                key, level, index
            ),
        }
    }
}

impl std::error::Error for ScoringError {}

/// Clamp an already-parsed value into `[0, points]`
pub fn clamp_to(points: u32, value: i64) -> u32 {
    value.clamp(0, points as i64) as u32
}

/// Parse `raw` leniently (unparseable -> 0) and clamp it to the
/// sub-criterion's maximum.
pub fn clamp_score<'a>(
    rubric: &RubricDefinition,
    category: &str,
    index: usize,
    raw: impl Into<RawScore<'a>>,
) -> Result<u32, ScoringError> {
    let descriptor = rubric
        .category(category)
        .ok_or_else(|| ScoringError::UnknownCategory {
            level: rubric.level,
            key: category.to_string(),
        })?;
    let sub = descriptor
        .subcriteria
        .get(index)
        .ok_or_else(|| ScoringError::UnknownSubCriterion {
            level: rubric.level,
            key: category.to_string(),
            index,
        })?;

    Ok(clamp_to(sub.points, raw.into().to_integer()))
}

/// Sum every recorded score for the rubric's categories.
///
/// Absent categories and indices count as 0. Entries for keys or indices the
/// rubric does not define are ignored, and each recorded value is capped at
/// its sub-criterion maximum, so the result never exceeds the rubric total.
pub fn compute_session_total(rubric: &RubricDefinition, entry: &ScoreEntry) -> u32 {
    rubric
        .categories
        .iter()
        .map(|category| category_earned(category, entry))
        .sum()
}

fn category_earned(category: &crate::rubric::CategoryDescriptor, entry: &ScoreEntry) -> u32 {
    entry
        .category(&category.key)
        .map(|subs| {
            subs.iter()
                .filter_map(|(i, v)| category.subcriteria.get(*i).map(|s| (*v).min(s.points)))
                .sum()
        })
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryScore {
    pub key: String,
    pub title: String,
    pub earned: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub level: ReviewLevel,
    pub categories: Vec<CategoryScore>,
    pub total: u32,
    pub max_total: u32,
}

/// Per-category subtotals in rubric order
pub fn score_breakdown(rubric: &RubricDefinition, entry: &ScoreEntry) -> ScoreBreakdown {
    let categories: Vec<CategoryScore> = rubric
        .categories
        .iter()
        .map(|category| CategoryScore {
            key: category.key.clone(),
            title: category.title.clone(),
            earned: category_earned(category, entry),
            max: category.max_points,
        })
        .collect();
    let total = categories.iter().map(|c| c.earned).sum();

    ScoreBreakdown {
        level: rubric.level,
        categories,
        total,
        max_total: rubric.total_points(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::select_rubric;

    fn basic() -> &'static RubricDefinition {
        select_rubric(ReviewLevel::Basic)
    }

    #[test]
    fn test_clamp_above_max() {
        // pronunciation[0] is worth 8
        assert_eq!(clamp_score(basic(), "pronunciation", 0, 15).unwrap(), 8);
        assert_eq!(clamp_score(basic(), "pronunciation", 0, "15").unwrap(), 8);
    }

    #[test]
    fn test_clamp_below_zero() {
        assert_eq!(clamp_score(basic(), "pronunciation", 0, -3).unwrap(), 0);
        assert_eq!(clamp_score(basic(), "pronunciation", 0, "-3").unwrap(), 0);
    }

    #[test]
    fn test_clamp_non_numeric() {
        assert_eq!(clamp_score(basic(), "fluency", 1, "abc").unwrap(), 0);
        assert_eq!(clamp_score(basic(), "fluency", 1, "").unwrap(), 0);
    }

    #[test]
    fn test_clamp_in_range_passthrough() {
        assert_eq!(clamp_score(basic(), "fluency", 1, "5").unwrap(), 5);
        assert_eq!(clamp_score(basic(), "fluency", 1, 8).unwrap(), 8);
        assert_eq!(clamp_score(basic(), "fluency", 1, 0).unwrap(), 0);
    }

    #[test]
    fn test_clamp_every_sub_criterion() {
        for rubric in crate::rubric::all_rubrics() {
            for (key, index, sub) in rubric.iter_sub_criteria() {
                for v in [-100_i64, -1, 0, 1, sub.points as i64, sub.points as i64 + 1, 1000] {
                    let clamped = clamp_score(rubric, key, index, v).unwrap();
                    assert!(clamped <= sub.points);
                }
            }
        }
    }

    #[test]
    fn test_clamp_unknown_lookups() {
        let err = clamp_score(basic(), "tarteel", 0, 1).unwrap_err();
        assert!(matches!(err, ScoringError::UnknownCategory { .. }));
        let err = clamp_score(basic(), "mistakes", 2, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Category 'mistakes' in basic rubric has no sub-criterion 2"
        );
    }

    #[test]
    fn test_total_empty_entry() {
        assert_eq!(compute_session_total(basic(), &ScoreEntry::new()), 0);
    }

    #[test]
    fn test_total_pronunciation_maxed() {
        let mut entry = ScoreEntry::new();
        for (i, v) in [8, 10, 7, 5].into_iter().enumerate() {
            entry.set(basic(), "pronunciation", i, v).unwrap();
        }
        assert_eq!(compute_session_total(basic(), &entry), 30);
    }

    #[test]
    fn test_total_all_maxed_is_100() {
        for rubric in crate::rubric::all_rubrics() {
            let mut entry = ScoreEntry::new();
            for (key, index, sub) in rubric.iter_sub_criteria() {
                entry.set(rubric, key, index, sub.points).unwrap();
            }
            assert_eq!(compute_session_total(rubric, &entry), 100);
        }
    }

    #[test]
    fn test_total_ignores_other_rubric_keys() {
        let advanced = select_rubric(ReviewLevel::Advanced);
        let mut entry = ScoreEntry::new();
        entry.set(advanced, "makhraj", 1, 8).unwrap();
        entry.set(advanced, "fluency", 0, 5).unwrap();
        // "makhraj" does not exist in basic; "fluency" does
        assert_eq!(compute_session_total(basic(), &entry), 5);
    }

    #[test]
    fn test_total_caps_tampered_values() {
        let entry: ScoreEntry =
            serde_json::from_str(r#"{"pronunciation":{"0":99,"9":50},"mistakes":{"0":3}}"#)
                .unwrap();
        assert_eq!(compute_session_total(basic(), &entry), 11);
    }

    #[test]
    fn test_breakdown_matches_total() {
        let mut entry = ScoreEntry::new();
        entry.set(basic(), "basicRules", 0, 6).unwrap();
        entry.set(basic(), "basicRules", 3, 7).unwrap();
        entry.set(basic(), "mistakes", 0, 4).unwrap();

        let breakdown = score_breakdown(basic(), &entry);
        assert_eq!(breakdown.total, compute_session_total(basic(), &entry));
        assert_eq!(breakdown.total, 17);
        assert_eq!(breakdown.max_total, 100);
        assert_eq!(breakdown.categories.len(), 4);
        assert_eq!(breakdown.categories[0].earned, 0);
        assert_eq!(breakdown.categories[1].earned, 13);
        assert_eq!(breakdown.categories[1].max, 30);
        assert_eq!(breakdown.categories[3].title, "Error Check");
    }
}
