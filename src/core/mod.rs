//! Core types and logic for Flashdeck.
//!
//! This module contains the SM-2 scheduler, cloze parsing, note types and
//! template rendering, card generation, and review bookkeeping.

pub mod cloze;
pub mod generate;
pub mod note;
pub mod review;
pub mod scheduler;
pub mod template;

pub use cloze::{
    cloze_indices, create_cloze, has_cloze, max_cloze_index, next_cloze_index, parse_cloze,
    render_cloze, render_cloze_styled, Cloze, ClozeStyle, BLANK_MARKER, MAX_CLOZE_INDEX,
};
pub use generate::{generate_cards, CardGenerator};
pub use note::{Card, CardTemplate, Note, NoteType, NoteTypeConfig, RawNoteType, Tags};
pub use review::{DueCard, ReviewRecord, Reviewer};
pub use scheduler::{
    next_ease, schedule, LapsePolicy, Quality, ScheduledReview, Scheduler, SchedulingState,
    INITIAL_EASE, MIN_EASE,
};
pub use template::{escape_html, inject_css, preview_html, render_template, RenderOptions};
