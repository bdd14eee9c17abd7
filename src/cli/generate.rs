//! Generate command for Flashdeck.
//!
//! Reads a note and its note type as JSON and prints the cards the note
//! produces. Nothing is persisted; storing cards is left to the caller.

use serde::{Deserialize, Serialize};

use crate::core::{Card, CardGenerator, Note, NoteType, RawNoteType};
use crate::error::Result;

/// JSON input shared by the generate and preview commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    /// The note type with its stored configuration blob.
    pub note_type: RawNoteType,
    pub note: Note,
    #[serde(default)]
    pub deck_id: i64,
}

impl NoteInput {
    /// Parse the input document.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolve the typed note type.
    pub fn note_type(&self) -> Result<NoteType> {
        NoteType::try_from(self.note_type.clone())
    }
}

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Override the deck id from the input.
    pub deck_id: Option<i64>,
}

/// Output format for the generate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Generated cards in ordinal order.
    pub cards: Vec<Card>,
    /// Number of cards generated.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub caller_error: bool,
}

impl GenerateOutput {
    /// Create a successful output.
    pub fn success(cards: Vec<Card>) -> Self {
        let count = cards.len();
        Self {
            success: true,
            cards,
            count,
            error: None,
            caller_error: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>, caller_error: bool) -> Self {
        Self {
            success: false,
            cards: vec![],
            count: 0,
            error: Some(error.into()),
            caller_error,
        }
    }
}

/// The generate command implementation.
pub struct GenerateCommand {
    generator: CardGenerator,
}

impl GenerateCommand {
    /// Create a new generate command.
    pub fn new(generator: CardGenerator) -> Self {
        Self { generator }
    }

    /// Run the generate command.
    pub fn run(&self, input: &NoteInput, options: &GenerateOptions) -> GenerateOutput {
        match self.generate(input, options) {
            Ok(cards) => GenerateOutput::success(cards),
            Err(e) => GenerateOutput::failure(
                format!("Failed to generate cards: {}", e),
                e.is_caller_error(),
            ),
        }
    }

    fn generate(&self, input: &NoteInput, options: &GenerateOptions) -> Result<Vec<Card>> {
        let note_type = input.note_type()?;
        let deck_id = options.deck_id.unwrap_or(input.deck_id);
        self.generator.generate(&input.note, &note_type, deck_id)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &GenerateOutput, options: &GenerateOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &GenerateOutput) -> String {
        if !output.success {
            return format!(
                "Generate failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.cards.is_empty() {
            return "No cards generated.".to_string();
        }

        let mut lines = vec![format!("Generated {} card(s):", output.count)];
        for card in &output.cards {
            lines.push(String::new());
            lines.push(format!("[card {}] deck {}", card.ord, card.deck_id));
            lines.push(format!("  front: {}", card.front));
            lines.push(format!("  back:  {}", card.back));
        }
        lines.join("\n")
    }
}
