//! CLI commands for Flashdeck.
//!
//! This module provides CLI commands for Flashdeck, organized into:
//! - **Study commands**: schedule, review, due
//! - **Authoring commands**: cloze, generate, preview
//! - **Setup commands**: config

// Study commands
pub mod due;
pub mod review;
pub mod schedule;

// Authoring commands
pub mod cloze;
pub mod generate;
pub mod preview;

// Setup commands
pub mod config;

pub use cloze::ClozeCommand;
pub use config::ConfigCommand;
pub use due::DueCommand;
pub use generate::GenerateCommand;
pub use preview::PreviewCommand;
pub use review::ReviewCommand;
pub use schedule::ScheduleCommand;
