pub mod annotation_session;
pub mod submission_filter;

pub use annotation_session::AnnotationSession;
pub use submission_filter::{RoutingReport, SubmissionFilter};
