pub mod assessment;
pub mod assignment;
pub mod document;
pub mod loaders;
pub mod marker;
pub mod student;

pub use assessment::{DokLevel, QuestionType};
pub use assignment::{
    AssignmentConfig, GradingSection, PointSummary, RubricCriterion, RubricType,
    StoredAssignmentConfig,
};
pub use document::ImportedDocument;
pub use loaders::{list_submission_files, load_all_assignment_configs, load_assignment_config};
pub use marker::{
    ExcludeMarker, HighlightId, HighlightRole, MarkerCategory, MarkerId, RawMarker,
    RawMarkerRecord, SectionMarker,
};
pub use student::Student;
