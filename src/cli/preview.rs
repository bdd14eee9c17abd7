//! Preview command for Flashdeck.
//!
//! Renders one side of one generated card as HTML: either the note type's
//! CSS injected around the card, or a standalone document.

use serde::{Deserialize, Serialize};

use crate::cli::generate::NoteInput;
use crate::core::{inject_css, preview_html, CardGenerator};
use crate::error::{FlashdeckError, Result};

/// Which side of the card to preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

/// Options for the preview command.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Zero-based card ordinal.
    pub ord: u32,
    pub side: Side,
    /// Emit a full HTML document instead of a styled fragment.
    pub document: bool,
}

/// Output format for the preview command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutput {
    /// Whether the command was successful.
    pub success: bool,
    pub ord: u32,
    pub side: Side,
    /// Rendered HTML.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub caller_error: bool,
}

/// The preview command implementation.
pub struct PreviewCommand {
    generator: CardGenerator,
}

impl PreviewCommand {
    /// Create a new preview command.
    pub fn new(generator: CardGenerator) -> Self {
        Self { generator }
    }

    /// Run the preview command.
    pub fn run(&self, input: &NoteInput, options: &PreviewOptions) -> PreviewOutput {
        let mut output = PreviewOutput {
            success: true,
            ord: options.ord,
            side: options.side,
            html: None,
            error: None,
            caller_error: false,
        };

        match self.render(input, options) {
            Ok(html) => output.html = Some(html),
            Err(e) => {
                output.success = false;
                output.caller_error = e.is_caller_error();
                output.error = Some(format!("Failed to render preview: {}", e));
            }
        }

        output
    }

    fn render(&self, input: &NoteInput, options: &PreviewOptions) -> Result<String> {
        let note_type = input.note_type()?;
        let cards = self
            .generator
            .generate(&input.note, &note_type, input.deck_id)?;

        let card = cards
            .iter()
            .find(|c| c.ord == options.ord)
            .ok_or_else(|| {
                FlashdeckError::note_type(format!(
                    "note produces {} card(s), none with ord {}",
                    cards.len(),
                    options.ord
                ))
            })?;

        let content = match options.side {
            Side::Front => &card.front,
            Side::Back => &card.back,
        };

        let css = &note_type.config.css;
        Ok(if options.document {
            preview_html(content, css)
        } else {
            inject_css(content, css)
        })
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PreviewOutput, options: &PreviewOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            output.html.clone().unwrap_or_default()
        } else {
            format!(
                "Preview failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
