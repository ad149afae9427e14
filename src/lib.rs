//! taskdeck Library
//!
//! Headless management console for projects, tasks, and developers.

pub mod headless;

// Re-export main entry point
pub use headless::runner::run_headless;
