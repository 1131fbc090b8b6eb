use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which rubric a session is graded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReviewLevel {
    #[default]
    Basic,
    Advanced,
}

impl ReviewLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewLevel::Basic => "basic",
            ReviewLevel::Advanced => "advanced",
        }
    }

    /// The other level (used by the level toggle in the scoring form)
    pub fn toggled(&self) -> Self {
        match self {
            ReviewLevel::Basic => ReviewLevel::Advanced,
            ReviewLevel::Advanced => ReviewLevel::Basic,
        }
    }
}

impl fmt::Display for ReviewLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ReviewLevel::Basic),
            "advanced" => Ok(ReviewLevel::Advanced),
            other => Err(format!("unknown review level '{}' (expected basic or advanced)", other)),
        }
    }
}

/// Smallest scored unit of a rubric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCriterion {
    pub name: String,
    /// Maximum obtainable points
    pub points: u32,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDescriptor {
    pub key: String,
    pub title: String,
    /// Declared maximum; must equal the sum of the sub-criteria points
    pub max_points: u32,
    pub subcriteria: Vec<SubCriterion>,
}

impl CategoryDescriptor {
    pub fn sub_points_total(&self) -> u32 {
        self.subcriteria.iter().map(|s| s.points).sum()
    }
}

/// A fixed rule set: ordered categories, each with ordered sub-criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricDefinition {
    pub level: ReviewLevel,
    pub categories: Vec<CategoryDescriptor>,
}

impl RubricDefinition {
    pub fn category(&self, key: &str) -> Option<&CategoryDescriptor> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn sub_criterion(&self, key: &str, index: usize) -> Option<&SubCriterion> {
        self.category(key).and_then(|c| c.subcriteria.get(index))
    }

    pub fn total_points(&self) -> u32 {
        self.categories.iter().map(|c| c.max_points).sum()
    }

    /// Number of sub-criteria across all categories
    pub fn sub_criteria_count(&self) -> usize {
        self.categories.iter().map(|c| c.subcriteria.len()).sum()
    }

    /// Flat (category key, sub index, criterion) iteration in display order
    pub fn iter_sub_criteria(&self) -> impl Iterator<Item = (&str, usize, &SubCriterion)> {
        self.categories.iter().flat_map(|c| {
            c.subcriteria
                .iter()
                .enumerate()
                .map(move |(i, s)| (c.key.as_str(), i, s))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_level_parse() {
        assert_eq!("basic".parse::<ReviewLevel>().unwrap(), ReviewLevel::Basic);
        assert_eq!(" Advanced ".parse::<ReviewLevel>().unwrap(), ReviewLevel::Advanced);
        assert!("expert".parse::<ReviewLevel>().is_err());
    }

    #[test]
    fn test_review_level_serde_lowercase() {
        let json = serde_json::to_string(&ReviewLevel::Advanced).unwrap();
        assert_eq!(json, "\"advanced\"");
        let parsed: ReviewLevel = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(parsed, ReviewLevel::Basic);
    }

    #[test]
    fn test_toggled() {
        assert_eq!(ReviewLevel::Basic.toggled(), ReviewLevel::Advanced);
        assert_eq!(ReviewLevel::Advanced.toggled(), ReviewLevel::Basic);
    }

    #[test]
    fn test_lookup_helpers() {
        let rubric = RubricDefinition {
            level: ReviewLevel::Basic,
            categories: vec![CategoryDescriptor {
                key: "fluency".to_string(),
                title: "Reading Flow".to_string(),
                max_points: 5,
                subcriteria: vec![
                    SubCriterion { name: "a".to_string(), points: 2, hint: String::new() },
                    SubCriterion { name: "b".to_string(), points: 3, hint: String::new() },
                ],
            }],
        };
        assert_eq!(rubric.sub_criterion("fluency", 1).unwrap().points, 3);
        assert!(rubric.sub_criterion("fluency", 2).is_none());
        assert!(rubric.category("mistakes").is_none());
        assert_eq!(rubric.total_points(), 5);
        assert_eq!(rubric.sub_criteria_count(), 2);
        let flat: Vec<_> = rubric.iter_sub_criteria().map(|(k, i, _)| (k, i)).collect();
        assert_eq!(flat, vec![("fluency", 0), ("fluency", 1)]);
    }
}
