// Module declarations
pub mod info;
pub mod run;

// Re-export commonly used items for convenience
pub use info::{handle_list_reports, handle_list_strategies, handle_show_report};
pub use run::{handle_run, handle_sample};
