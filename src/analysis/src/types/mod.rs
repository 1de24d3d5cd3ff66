pub mod reduced;
pub mod report;
pub mod score;
pub mod tags;
pub mod trace;

pub use reduced::ReducedTask;
pub use report::{
    AnalysisReport, BandViolation, DurationOutlier, GroupSummary, Problem, RankedTask,
    RankingMetric, Recommendation, Resource, RestrictionReason, RunReport, SortOrder,
    WorstOffenders,
};
pub use score::{ProcessScore, RunScore, TaskScore};
pub use tags::TagLabel;
pub use trace::{TaskStatus, TaskTrace};
