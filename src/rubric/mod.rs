pub mod builtin;
pub mod definition;
pub mod validation;

pub use builtin::{all_rubrics, select_rubric};
pub use definition::{CategoryDescriptor, ReviewLevel, RubricDefinition, SubCriterion};
pub use validation::validate_rubric;
