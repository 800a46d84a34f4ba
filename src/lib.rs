//! allure-steps - Business step grouping for Allure results
//!
//! Groups the flat step list of each Allure result file under its
//! `* business step` markers, derives status and timing for every group,
//! attaches a Mermaid flow of the groups, and summarizes a results directory.

pub mod cli;
pub mod commands;
pub mod config;
pub mod diagram;
pub mod error;
pub mod grouping;
pub mod report;
pub mod scan;
pub mod step;
pub mod summary;

// Re-export commonly used types
pub use commands::{BatchReport, FileOutcome, Outcome};
pub use config::{Config, DiagramSettings};
pub use error::ReportError;
pub use grouping::{aggregate, aggregate_status, aggregate_time_bounds, GroupedSteps, GroupingEngine, TimeBounds};
pub use report::{Attachment, ReportDocument};
pub use step::{coerce_millis, StepRecord, StepStatus};
pub use summary::TestCaseSummary;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Default business step marker prefix
    pub const MARKER_PREFIX: &str = crate::grouping::DEFAULT_MARKER_PREFIX;

    /// Default summary filename
    pub const SUMMARY_FILE_NAME: &str = "allure-results-summary.json";

    /// Config directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "allure-steps";

    /// Default config filename
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}
