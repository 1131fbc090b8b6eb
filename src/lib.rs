pub mod config;
pub mod output;
pub mod report;
pub mod rubric;
pub mod scoring;
pub mod session;
pub mod stderr_buffer;
pub mod storage;
pub mod student;
pub mod tracker;
pub mod tui;
