//! Card generation from notes.
//!
//! A regular note type yields one card per template (`ord` 0..N-1). A cloze
//! note type yields one card per cloze group up to the highest index found in
//! its first field (`ord` 0..M-1), and none when that field has no clozes.

use crate::config::RenderConfig;
use crate::core::cloze::{max_cloze_index, ClozeStyle};
use crate::core::note::{Card, Note, NoteType};
use crate::core::template::{render_template, RenderOptions};
use crate::error::Result;

/// Generates cards from notes with fixed rendering settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardGenerator {
    escape_fields: bool,
    cloze_style: ClozeStyle,
}

impl CardGenerator {
    /// Create a generator with HTML cloze output and unescaped fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from the render configuration.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            escape_fields: config.escape_fields,
            cloze_style: config.cloze_style,
        }
    }

    pub fn with_escape_fields(mut self, escape_fields: bool) -> Self {
        self.escape_fields = escape_fields;
        self
    }

    pub fn with_cloze_style(mut self, cloze_style: ClozeStyle) -> Self {
        self.cloze_style = cloze_style;
        self
    }

    /// Generate the cards for `note` in `deck_id`.
    ///
    /// Fails only when the note type itself is broken; a cloze note without
    /// deletions produces an empty list.
    pub fn generate(&self, note: &Note, note_type: &NoteType, deck_id: i64) -> Result<Vec<Card>> {
        note_type.validate()?;

        let fields = note_type.field_map(note);
        let templates = note_type.effective_templates();

        // (ordinal, template index) pairs
        let plan: Vec<(u32, usize)> = if note_type.is_cloze() {
            let max_index = max_cloze_index(note.first_field());
            if max_index == 0 || templates.is_empty() {
                tracing::debug!(
                    note_id = ?note.id,
                    "cloze note has no deletions, no cards generated"
                );
                return Ok(Vec::new());
            }
            (1..=max_index).map(|ordinal| (ordinal, 0)).collect()
        } else {
            (0..templates.len())
                .map(|i| (u32::try_from(i + 1).unwrap_or(u32::MAX), i))
                .collect()
        };

        let cards: Vec<Card> = plan
            .into_iter()
            .map(|(ordinal, template_index)| {
                let template = &templates[template_index];
                let front_options = RenderOptions::front(ordinal)
                    .with_escape_fields(self.escape_fields)
                    .with_cloze_style(self.cloze_style);
                let front = render_template(&template.front, &fields, &front_options);

                let back_options = RenderOptions::back(ordinal, &front)
                    .with_escape_fields(self.escape_fields)
                    .with_cloze_style(self.cloze_style);
                let back = render_template(&template.back, &fields, &back_options);

                Card {
                    note_id: note.id,
                    deck_id,
                    ord: ordinal - 1,
                    front,
                    back,
                    source_url: note.source_url.clone(),
                }
            })
            .collect();

        tracing::debug!(
            note_id = ?note.id,
            note_type = %note_type.name,
            deck_id,
            count = cards.len(),
            "generated cards"
        );

        Ok(cards)
    }
}

/// Generate cards with default rendering settings.
pub fn generate_cards(note: &Note, note_type: &NoteType, deck_id: i64) -> Result<Vec<Card>> {
    CardGenerator::new().generate(note, note_type, deck_id)
}
