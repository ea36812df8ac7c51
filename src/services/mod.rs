pub mod allocation;
pub mod file_matcher;
pub mod highlight_renderer;
pub mod marker_model;
pub mod migrator;

pub use allocation::{
    distribute_dok, distribute_point_budget, distribute_points, distribute_questions,
    AllocationMode, AllocationRequest, AllocationResult, TypeBudget,
};
pub use file_matcher::{
    extract_chapter_section, matches_assignment, matches_student, normalize_name,
    normalize_student_query, student_from_query, FileMatcher, MatchStrictness,
};
pub use highlight_renderer::{apply_highlight, reapply_all, remove_all_highlights, remove_highlight};
pub use marker_model::{MarkerAction, MarkerState};
pub use migrator::migrate_legacy;
