pub mod generator;
pub mod grading;

pub use generator::{lesson_chars, newest_char, PracticeGenerator, KOCH_ORDER};
pub use grading::{grade, AlignOp, GradeResult};
