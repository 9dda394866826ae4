mod analysis;
mod submission;

pub use analysis::AnalysisGateway;
pub use submission::SubmissionGateway;
