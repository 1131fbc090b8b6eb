pub mod formatter;

pub use formatter::{
    format_average, format_breakdown, format_passage, format_rubric, format_session_history,
    format_session_line, format_student_detail, format_student_table, score_band,
    should_use_colors, truncate_text,
};
