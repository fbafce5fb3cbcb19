pub mod builder;
pub mod classifier;
pub mod types;

pub use builder::{HistoryBuilder, build_history};
pub use classifier::{classify, is_flaky_candidate};
pub use types::{
    BuildRecord, BuildResult, ChildGroup, JobHistory, JobReport, OutcomeGroup, PayloadShape, Report,
    ResultPayload, TestHistory, TestIdentity, TestOutcome, TestStatus,
};
