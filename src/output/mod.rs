//! Output module for the on-disk run layout and reports
//!
//! This module handles:
//! - Creating the timestamped run root that downloads are written under
//! - Dumping the settled manifest for inspection
//! - Printing the end-of-run summary

mod layout;
pub mod stats;

pub use layout::{create_run_root, write_manifest, RUN_DIR_PREFIX};
pub use stats::print_summary;
