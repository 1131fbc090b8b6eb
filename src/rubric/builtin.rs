//! The two fixed rubrics. Tables are turned into `RubricDefinition`s once, on
//! first use, and shared for the rest of the process.

use super::definition::{CategoryDescriptor, ReviewLevel, RubricDefinition, SubCriterion};
use std::sync::LazyLock;

type SubTable = &'static [(&'static str, u32, &'static str)];
type CategoryTable = &'static [(&'static str, &'static str, u32, SubTable)];

const BASIC: CategoryTable = &[
    (
        "pronunciation",
        "Letter Pronunciation",
        30,
        &[
            ("Can the student pronounce throat sounds clearly?", 8, "Listen for sounds from throat"),
            ("Are tongue movements correct?", 10, "Watch tongue position"),
            ("Are lip and teeth sounds clear?", 7, "Check lip closure"),
            ("Is nasal sound present when needed?", 5, "Humming through nose"),
        ],
    ),
    (
        "basicRules",
        "Basic Tajweed Rules",
        30,
        &[
            ("Does student hold vowels long enough?", 8, "Count 2 beats"),
            ("Are thick sounds correct?", 8, "Fuller, heavier"),
            ("Are light sounds clear?", 7, "Lighter, softer"),
            ("Does student apply noon rules?", 7, "Watch noon transitions"),
        ],
    ),
    (
        "fluency",
        "Reading Flow",
        25,
        &[
            ("Smooth reading without stops?", 8, "Natural rhythm"),
            ("Vowel marks correct?", 8, "Fatha, kasra, damma"),
            ("Recognizes doubled letters?", 5, "Pronounced twice"),
            ("Stops at right places?", 4, "Meaning preserved"),
        ],
    ),
    (
        "mistakes",
        "Error Check",
        15,
        &[
            ("Major errors avoided", 8, "Wrong letters, vowels"),
            ("Minor errors minimized", 7, "Subtle mistakes"),
        ],
    ),
];

const ADVANCED: CategoryTable = &[
    (
        "makhraj",
        "Articulation Points",
        25,
        &[
            ("Throat letters correct", 4, "Lower, middle, upper throat"),
            ("Tongue points accurate", 8, "Back, center, sides, tip"),
            ("Labial and dental correct", 8, "Lips, teeth positions"),
            ("Nasal sound present", 3, "Al-Khayshum"),
            ("Madd letters extended", 2, "Waw, yaa, alif"),
        ],
    ),
    (
        "sifatLazimah",
        "Permanent Characteristics",
        20,
        &[
            ("Whispered vs voiced", 3, "Hams vs Jahr"),
            ("Strong vs soft", 4, "Shiddah vs Rikhwah"),
            ("Elevated vs lowered", 4, "Istila vs Istifal"),
            ("Covered vs open", 3, "Itbaq vs Infitah"),
            ("Special characteristics", 6, "Safir, Qalqalah, etc"),
        ],
    ),
    (
        "sifatAridah",
        "Temporary Characteristics",
        25,
        &[
            ("Noon and tanween rules", 7, "Ithhar, Idgham, Iqlab, Ikhfa"),
            ("Meem sakinah rules", 4, "Three rules applied"),
            ("Thick vs thin", 5, "Tafkhim vs Tarqiq"),
            ("All madd types", 7, "Six types recognized"),
            ("Stopping rules", 2, "Waqf and Ibtida"),
        ],
    ),
    (
        "fluency",
        "Fluency and Tarteel",
        15,
        &[
            ("Smooth flow maintained", 5, "Beautiful recitation"),
            ("Harakaat correct", 4, "All vowel movements"),
            ("Sukun applied", 3, "Silent letters"),
            ("Tashdid recognized", 3, "Doubled letters"),
        ],
    ),
    (
        "mistakes",
        "Error Classification",
        15,
        &[
            ("Clear errors avoided", 8, "Lahn Jaliy"),
            ("Hidden errors minimized", 7, "Lahn Khafiy"),
        ],
    ),
];

static BASIC_RUBRIC: LazyLock<RubricDefinition> =
    LazyLock::new(|| build(ReviewLevel::Basic, BASIC));
static ADVANCED_RUBRIC: LazyLock<RubricDefinition> =
    LazyLock::new(|| build(ReviewLevel::Advanced, ADVANCED));

fn build(level: ReviewLevel, table: CategoryTable) -> RubricDefinition {
    let categories = table
        .iter()
        .map(|(key, title, max_points, subs)| CategoryDescriptor {
            key: key.to_string(),
            title: title.to_string(),
            max_points: *max_points,
            subcriteria: subs
                .iter()
                .map(|(name, points, hint)| SubCriterion {
                    name: name.to_string(),
                    points: *points,
                    hint: hint.to_string(),
                })
                .collect(),
        })
        .collect();

    RubricDefinition { level, categories }
}

/// Return the fixed rubric for a review level
pub fn select_rubric(level: ReviewLevel) -> &'static RubricDefinition {
    match level {
        ReviewLevel::Basic => &BASIC_RUBRIC,
        ReviewLevel::Advanced => &ADVANCED_RUBRIC,
    }
}

pub fn all_rubrics() -> [&'static RubricDefinition; 2] {
    [
        select_rubric(ReviewLevel::Basic),
        select_rubric(ReviewLevel::Advanced),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_rubric_levels() {
        assert_eq!(select_rubric(ReviewLevel::Basic).level, ReviewLevel::Basic);
        assert_eq!(select_rubric(ReviewLevel::Advanced).level, ReviewLevel::Advanced);
    }

    #[test]
    fn test_select_rubric_is_shared() {
        let a = select_rubric(ReviewLevel::Basic);
        let b = select_rubric(ReviewLevel::Basic);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_basic_layout() {
        let rubric = select_rubric(ReviewLevel::Basic);
        let keys: Vec<_> = rubric.categories.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["pronunciation", "basicRules", "fluency", "mistakes"]);
        assert_eq!(rubric.sub_criterion("pronunciation", 0).unwrap().points, 8);
        assert_eq!(rubric.sub_criterion("pronunciation", 1).unwrap().points, 10);
    }

    #[test]
    fn test_advanced_layout() {
        let rubric = select_rubric(ReviewLevel::Advanced);
        assert_eq!(rubric.categories.len(), 5);
        assert_eq!(rubric.category("sifatLazimah").unwrap().title, "Permanent Characteristics");
        assert_eq!(rubric.sub_criteria_count(), 21);
    }

    #[test]
    fn test_every_rubric_sums_to_100() {
        for rubric in all_rubrics() {
            assert_eq!(rubric.total_points(), 100, "{} rubric", rubric.level);
            for category in &rubric.categories {
                assert_eq!(category.max_points, category.sub_points_total(), "{}", category.key);
            }
        }
    }
}
