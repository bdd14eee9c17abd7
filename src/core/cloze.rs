//! Cloze deletion parsing and rendering.
//!
//! Markup: `{{c<N>::content}}` or `{{c<N>::content::hint}}`. Content may span
//! lines. The content match is lazy, so the first `::` followed by a hint and
//! a closing `}}` separates content from hint. Anything that does not match,
//! including an index above [`MAX_CLOZE_INDEX`], passes through as literal
//! text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static CLOZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{c(\d+)::(.*?)(?:::(.*?))?\}\}").expect("cloze pattern is valid")
});

/// Highest cloze index recognised. A cloze note yields one card per index up
/// to its maximum, so this also bounds the cards generated from one note.
pub const MAX_CLOZE_INDEX: u32 = 1000;

/// Placeholder shown for a hidden cloze without a hint.
pub const BLANK_MARKER: &str = "...";

/// A single cloze deletion found in a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cloze<'a> {
    /// Cloze group number (`N` in `cN`).
    pub index: u32,
    /// The hidden text.
    pub content: &'a str,
    /// Optional hint shown while hidden.
    pub hint: Option<&'a str>,
    /// Byte offset of the opening `{{`.
    pub position: usize,
    /// The full markup, braces included.
    pub full_match: &'a str,
}

impl Cloze<'_> {
    /// The hint, if present and not blank.
    pub fn visible_hint(&self) -> Option<&str> {
        self.hint.filter(|h| !h.trim().is_empty())
    }
}

/// How clozes are rendered.
///
/// `Plain` is used for live preview and study-time masking; `Html` wraps the
/// output in spans for generated cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClozeStyle {
    Plain,
    #[default]
    Html,
}

/// Valid string values for [`ClozeStyle`].
pub const VALID_CLOZE_STYLES: &[&str] = &["plain", "html"];

impl ClozeStyle {
    /// Parse a style from its configuration name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(Self::Plain),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Html => "html",
        }
    }

    fn revealed(self, content: &str) -> String {
        match self {
            Self::Plain => content.to_string(),
            Self::Html => format!("<span class=\"cloze\">{}</span>", content),
        }
    }

    fn hidden(self, hint: Option<&str>) -> String {
        let label = hint.unwrap_or(BLANK_MARKER);
        match self {
            Self::Plain => format!("[{}]", label),
            Self::Html => format!("<span class=\"cloze-blank\">[{}]</span>", label),
        }
    }
}

fn cloze_from_captures<'a>(caps: &Captures<'a>) -> Option<Cloze<'a>> {
    let whole = caps.get(0)?;
    let index = caps
        .get(1)?
        .as_str()
        .parse::<u32>()
        .ok()
        .filter(|&i| i <= MAX_CLOZE_INDEX)?;
    Some(Cloze {
        index,
        content: caps.get(2).map_or("", |m| m.as_str()),
        hint: caps.get(3).map(|m| m.as_str()),
        position: whole.start(),
        full_match: whole.as_str(),
    })
}

/// Lazily iterate over the clozes in `text`, in order of appearance.
///
/// Each call starts a fresh scan.
pub fn parse_cloze(text: &str) -> impl Iterator<Item = Cloze<'_>> + '_ {
    CLOZE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| cloze_from_captures(&caps))
}

/// Whether `text` contains at least one cloze.
pub fn has_cloze(text: &str) -> bool {
    parse_cloze(text).next().is_some()
}

/// Highest cloze index in `text`, or 0 if there is none.
pub fn max_cloze_index(text: &str) -> u32 {
    parse_cloze(text).map(|c| c.index).max().unwrap_or(0)
}

/// Index to use for the next cloze added to `text`.
pub fn next_cloze_index(text: &str) -> u32 {
    max_cloze_index(text).saturating_add(1)
}

/// Distinct non-zero cloze indices in `text`, ascending.
pub fn cloze_indices(text: &str) -> Vec<u32> {
    parse_cloze(text)
        .map(|c| c.index)
        .filter(|&i| i > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Wrap `text` in cloze markup. An empty or blank hint is omitted.
pub fn create_cloze(text: &str, index: u32, hint: Option<&str>) -> String {
    match hint.filter(|h| !h.trim().is_empty()) {
        Some(hint) => format!("{{{{c{}::{}::{}}}}}", index, text, hint),
        None => format!("{{{{c{}::{}}}}}", index, text),
    }
}

/// Render clozes as plain text for the card with the given ordinal.
///
/// The cloze group matching `ordinal` shows its content when `reveal` is set
/// and `[hint]` or `[...]` otherwise. All other groups show their content.
pub fn render_cloze(text: &str, ordinal: u32, reveal: bool) -> String {
    render_cloze_styled(text, ordinal, reveal, ClozeStyle::Plain)
}

/// Render clozes with an explicit output style.
pub fn render_cloze_styled(text: &str, ordinal: u32, reveal: bool, style: ClozeStyle) -> String {
    CLOZE_PATTERN
        .replace_all(text, |caps: &Captures| match cloze_from_captures(caps) {
            Some(cloze) if cloze.index == ordinal => {
                if reveal {
                    style.revealed(cloze.content)
                } else {
                    style.hidden(cloze.visible_hint())
                }
            }
            Some(cloze) => cloze.content.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
