//! Utility modules

pub mod file_validation;

pub use file_validation::{filename_for_display, validate_file_for_opening, validate_path_argument};
