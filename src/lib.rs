//! Flashdeck - SM-2 spaced repetition and card generation
//!
//! Flashdeck schedules flashcard reviews with the SM-2 algorithm and turns
//! notes into cards: one card per template for regular note types, one card
//! per cloze group for cloze note types.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;

pub use config::Config;
pub use core::{
    generate_cards, Card, CardGenerator, CardTemplate, ClozeStyle, DueCard, LapsePolicy, Note,
    NoteType, NoteTypeConfig, Quality, RawNoteType, ReviewRecord, Reviewer, Scheduler,
    SchedulingState, Tags,
};
pub use error::{FlashdeckError, Result};
pub use storage::{FileReviewStore, MemoryReviewStore, ReviewStore};

// CLI commands
pub use cli::{
    ClozeCommand, ConfigCommand, DueCommand, GenerateCommand, PreviewCommand, ReviewCommand,
    ScheduleCommand,
};
