//! Cloze command for Flashdeck.
//!
//! Authoring helpers for cloze markup: render a text for one card, wrap a
//! selection in the next cloze, and inspect the clozes in a text.

use serde::{Deserialize, Serialize};

use crate::core::{
    cloze_indices, create_cloze, max_cloze_index, next_cloze_index, parse_cloze,
    render_cloze_styled, ClozeStyle, MAX_CLOZE_INDEX,
};

/// A cloze operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClozeAction {
    /// Render `text` for the card with `ordinal`.
    Render {
        text: String,
        ordinal: u32,
        reveal: bool,
    },
    /// Wrap `content` in cloze markup.
    ///
    /// Without an explicit index, the next free index in `note` is used.
    /// The index must lie in `1..=MAX_CLOZE_INDEX`.
    Create {
        content: String,
        index: Option<u32>,
        hint: Option<String>,
        note: Option<String>,
    },
    /// Report the next free cloze index in `text`.
    Next { text: String },
    /// List the clozes in `text`.
    Parse { text: String },
}

impl ClozeAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Render { .. } => "render",
            Self::Create { .. } => "create",
            Self::Next { .. } => "next",
            Self::Parse { .. } => "parse",
        }
    }
}

/// Options for the cloze command.
#[derive(Debug, Clone, Default)]
pub struct ClozeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One parsed cloze, owned for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeSummary {
    pub index: u32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Byte offset of the markup in the input.
    pub position: usize,
}

/// Output format for the cloze command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClozeOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Which action ran.
    pub action: String,
    /// Rendered or created text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Cloze index produced by `create` or `next`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Clozes found by `parse`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clozes: Vec<ClozeSummary>,
    /// Distinct card ordinals the text would produce, from `parse`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordinals: Vec<u32>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub caller_error: bool,
}

impl ClozeOutput {
    fn new(action: &ClozeAction) -> Self {
        Self {
            success: true,
            action: action.name().to_string(),
            text: None,
            index: None,
            clozes: vec![],
            ordinals: vec![],
            error: None,
            caller_error: false,
        }
    }

    fn fail(&mut self, error: impl Into<String>) {
        self.success = false;
        self.caller_error = true;
        self.error = Some(error.into());
    }
}

/// The cloze command implementation.
pub struct ClozeCommand {
    style: ClozeStyle,
}

impl ClozeCommand {
    /// Create a new cloze command rendering in `style`.
    pub fn new(style: ClozeStyle) -> Self {
        Self { style }
    }

    /// Run the cloze command.
    pub fn run(&self, action: &ClozeAction) -> ClozeOutput {
        let mut output = ClozeOutput::new(action);

        match action {
            ClozeAction::Render {
                text,
                ordinal,
                reveal,
            } => {
                output.text = Some(render_cloze_styled(text, *ordinal, *reveal, self.style));
            }
            ClozeAction::Create {
                content,
                index,
                hint,
                note,
            } => {
                let index =
                    index.unwrap_or_else(|| next_cloze_index(note.as_deref().unwrap_or("")));
                if (1..=MAX_CLOZE_INDEX).contains(&index) {
                    output.text = Some(create_cloze(content, index, hint.as_deref()));
                    output.index = Some(index);
                } else {
                    output.fail(format!(
                        "cloze index {} is out of range 1..={}",
                        index, MAX_CLOZE_INDEX
                    ));
                }
            }
            ClozeAction::Next { text } => {
                output.index = Some(next_cloze_index(text));
            }
            ClozeAction::Parse { text } => {
                output.clozes = parse_cloze(text)
                    .map(|c| ClozeSummary {
                        index: c.index,
                        content: c.content.to_string(),
                        hint: c.visible_hint().map(str::to_string),
                        position: c.position,
                    })
                    .collect();
                output.ordinals = cloze_indices(text);
                output.index = Some(max_cloze_index(text));
            }
        }

        output
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ClozeOutput, options: &ClozeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ClozeOutput) -> String {
        if !output.success {
            return format!(
                "Cloze failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        match output.action.as_str() {
            "render" | "create" => output.text.clone().unwrap_or_default(),
            "next" => output.index.unwrap_or(1).to_string(),
            _ => {
                if output.clozes.is_empty() {
                    return "No clozes found.".to_string();
                }
                let mut lines = vec![format!(
                    "{} cloze(s), {} card(s):",
                    output.clozes.len(),
                    output.ordinals.len()
                )];
                for cloze in &output.clozes {
                    match &cloze.hint {
                        Some(hint) => lines.push(format!(
                            "  c{}: {} (hint: {})",
                            cloze.index, cloze.content, hint
                        )),
                        None => lines.push(format!("  c{}: {}", cloze.index, cloze.content)),
                    }
                }
                lines.join("\n")
            }
        }
    }
}

impl Default for ClozeCommand {
    fn default() -> Self {
        Self::new(ClozeStyle::Plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "{{c1::Paris::city}} is the capital of {{c2::France}}";

    #[test]
    fn test_render_hidden_and_revealed() {
        let cmd = ClozeCommand::default();
        let hidden = cmd.run(&ClozeAction::Render {
            text: TEXT.to_string(),
            ordinal: 1,
            reveal: false,
        });
        assert_eq!(hidden.text.unwrap(), "[city] is the capital of France");

        let revealed = cmd.run(&ClozeAction::Render {
            text: TEXT.to_string(),
            ordinal: 2,
            reveal: true,
        });
        assert_eq!(revealed.text.unwrap(), "Paris is the capital of France");
    }

    #[test]
    fn test_render_html_style() {
        let cmd = ClozeCommand::new(ClozeStyle::Html);
        let output = cmd.run(&ClozeAction::Render {
            text: "{{c1::x}}".to_string(),
            ordinal: 1,
            reveal: false,
        });
        assert_eq!(
            output.text.unwrap(),
            "<span class=\"cloze-blank\">[...]</span>"
        );
    }

    #[test]
    fn test_create_uses_next_index_from_note() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Create {
            content: "Seine".to_string(),
            index: None,
            hint: Some("river".to_string()),
            note: Some(TEXT.to_string()),
        });
        assert_eq!(output.index, Some(3));
        assert_eq!(output.text.unwrap(), "{{c3::Seine::river}}");
    }

    #[test]
    fn test_create_explicit_index_without_note() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Create {
            content: "x".to_string(),
            index: Some(2),
            hint: Some("  ".to_string()),
            note: None,
        });
        assert_eq!(output.text.unwrap(), "{{c2::x}}");

        let first = cmd.run(&ClozeAction::Create {
            content: "y".to_string(),
            index: None,
            hint: None,
            note: None,
        });
        assert_eq!(first.index, Some(1));
    }

    #[test]
    fn test_create_rejects_out_of_range_index() {
        let cmd = ClozeCommand::default();
        for index in [0, MAX_CLOZE_INDEX + 1] {
            let output = cmd.run(&ClozeAction::Create {
                content: "x".to_string(),
                index: Some(index),
                hint: None,
                note: None,
            });
            assert!(!output.success);
            assert!(output.caller_error);
            assert!(output.text.is_none());
            assert!(output.error.unwrap().contains("out of range"));
        }
    }

    #[test]
    fn test_create_fails_when_note_is_full() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Create {
            content: "x".to_string(),
            index: None,
            hint: None,
            note: Some(format!("{{{{c{}::a}}}}", MAX_CLOZE_INDEX)),
        });
        assert!(!output.success);

        let text = cmd.format_output(&output, &ClozeOptions::default());
        assert!(text.starts_with("Cloze failed: cloze index 1001"));
    }

    #[test]
    fn test_next() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Next {
            text: TEXT.to_string(),
        });
        assert_eq!(output.index, Some(3));
    }

    #[test]
    fn test_parse() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Parse {
            text: format!("{} {{{{c1::again}}}}", TEXT),
        });

        assert_eq!(output.clozes.len(), 3);
        assert_eq!(output.clozes[0].hint.as_deref(), Some("city"));
        assert_eq!(output.clozes[0].position, 0);
        assert_eq!(output.ordinals, vec![1, 2]);
        assert_eq!(output.index, Some(2));
    }

    #[test]
    fn test_format_output_parse() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Parse {
            text: TEXT.to_string(),
        });
        let text = cmd.format_output(&output, &ClozeOptions::default());

        assert!(text.starts_with("2 cloze(s), 2 card(s):"));
        assert!(text.contains("c1: Paris (hint: city)"));
        assert!(text.contains("c2: France"));
    }

    #[test]
    fn test_format_output_parse_empty() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Parse {
            text: "plain".to_string(),
        });
        let text = cmd.format_output(&output, &ClozeOptions::default());
        assert_eq!(text, "No clozes found.");
    }

    #[test]
    fn test_format_output_json() {
        let cmd = ClozeCommand::default();
        let output = cmd.run(&ClozeAction::Next {
            text: String::new(),
        });
        let options = ClozeOptions {
            json: true,
            ..Default::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(value["action"], "next");
        assert_eq!(value["index"], 1);
        assert!(value.get("clozes").is_none());
    }
}
