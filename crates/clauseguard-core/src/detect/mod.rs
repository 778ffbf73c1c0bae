pub mod engine;
pub mod locate;
pub mod outcome;

pub use engine::ViolationDetector;
pub use outcome::{AnalysisResult, Finding, FindingSource};
