use super::definition::RubricDefinition;
use std::collections::HashSet;

/// Points every rubric must add up to
pub const RUBRIC_TOTAL: u32 = 100;

/// Validate a rubric's structural invariants.
/// Returns all validation errors at once (not just the first).
pub fn validate_rubric(rubric: &RubricDefinition) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let level = rubric.level;

    if rubric.categories.is_empty() {
        errors.push(format!("rubric.{}: has no categories", level));
    }

    let mut seen = HashSet::new();
    for category in &rubric.categories {
        if category.key.trim().is_empty() {
            errors.push(format!("rubric.{}: category with empty key", level));
        } else if !seen.insert(category.key.as_str()) {
            errors.push(format!("rubric.{}.{}: duplicate category key", level, category.key));
        }

        if category.subcriteria.is_empty() {
            errors.push(format!("rubric.{}.{}: has no sub-criteria", level, category.key));
        }

        let sum = category.sub_points_total();
        if category.max_points != sum {
            errors.push(format!(
                "rubric.{}.{}: max points {} but sub-criteria sum to {}",
                level, category.key, category.max_points, sum
            ));
        }
    }

    let total = rubric.total_points();
    if total != RUBRIC_TOTAL {
        errors.push(format!(
            "rubric.{}: categories sum to {} (expected {})",
            level, total, RUBRIC_TOTAL
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{all_rubrics, CategoryDescriptor, ReviewLevel, SubCriterion};

    fn sub(points: u32) -> SubCriterion {
        SubCriterion {
            name: format!("{} pts", points),
            points,
            hint: String::new(),
        }
    }

    fn category(key: &str, max_points: u32, subs: &[u32]) -> CategoryDescriptor {
        CategoryDescriptor {
            key: key.to_string(),
            title: key.to_uppercase(),
            max_points,
            subcriteria: subs.iter().map(|p| sub(*p)).collect(),
        }
    }

    #[test]
    fn test_builtin_rubrics_valid() {
        for rubric in all_rubrics() {
            assert!(validate_rubric(rubric).is_ok());
        }
    }

    #[test]
    fn test_category_sum_mismatch() {
        let rubric = RubricDefinition {
            level: ReviewLevel::Basic,
            categories: vec![category("a", 60, &[30, 20]), category("b", 50, &[50])],
        };
        let errors = validate_rubric(&rubric).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("rubric.basic.a"));
        assert!(errors[1].contains("sum to 110"));
    }

    #[test]
    fn test_duplicate_and_empty() {
        let rubric = RubricDefinition {
            level: ReviewLevel::Advanced,
            categories: vec![category("a", 100, &[100]), category("a", 0, &[])],
        };
        let errors = validate_rubric(&rubric).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("duplicate category key")));
        assert!(errors.iter().any(|e| e.contains("has no sub-criteria")));
    }

    #[test]
    fn test_empty_rubric() {
        let rubric = RubricDefinition {
            level: ReviewLevel::Basic,
            categories: vec![],
        };
        let errors = validate_rubric(&rubric).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
