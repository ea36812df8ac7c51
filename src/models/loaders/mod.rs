pub mod config_loader;
pub mod submission_loader;

pub use config_loader::{load_all_assignment_configs, load_assignment_config, parse_assignment_config};
pub use submission_loader::list_submission_files;
