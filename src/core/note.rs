//! Notes, note types, and generated cards.
//!
//! A note type's configuration arrives as a JSON blob (either an object or a
//! string containing one). It is parsed into [`NoteTypeConfig`] at the
//! boundary so the rendering code only ever sees typed data.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FlashdeckError, Result};

/// Name that marks a note type as cloze regardless of its templates.
pub const CLOZE_NOTE_TYPE_NAME: &str = "Cloze";

/// Placeholder prefix that marks a template as cloze.
pub const CLOZE_PLACEHOLDER_PREFIX: &str = "{{cloze:";

/// Separator between hierarchical tag segments.
pub const TAG_SEPARATOR: &str = "::";

// =============================================================================
// Note types
// =============================================================================

/// A front/back template pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTemplate {
    pub front: String,
    pub back: String,
}

impl CardTemplate {
    /// Create a template pair.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// Whether either side references a cloze field.
    pub fn references_cloze(&self) -> bool {
        self.front.contains(CLOZE_PLACEHOLDER_PREFIX)
            || self.back.contains(CLOZE_PLACEHOLDER_PREFIX)
    }
}

/// Typed note-type configuration: field names, templates and stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteTypeConfig {
    /// Ordered field names, unique within the note type.
    pub fields: Vec<String>,
    /// Ordered templates. Empty for cloze types using the implicit template.
    pub templates: Vec<CardTemplate>,
    /// Stylesheet applied when previewing cards.
    pub css: String,
}

impl NoteTypeConfig {
    /// Parse a configuration from a JSON value.
    ///
    /// Accepts an object or a string holding a JSON object.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Self = match value {
            serde_json::Value::String(raw) => Self::from_json(&raw)?,
            other => serde_json::from_value(other)
                .map_err(|e| FlashdeckError::note_type(format!("unparsable config: {}", e)))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| FlashdeckError::note_type(format!("unparsable config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that field names are unique and non-empty.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.fields {
            if name.trim().is_empty() {
                return Err(FlashdeckError::note_type("field name must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(FlashdeckError::note_type(format!(
                    "duplicate field name: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A note type: a named schema of fields and templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub config: NoteTypeConfig,
}

impl NoteType {
    /// Create a note type from an already-typed configuration.
    pub fn new(name: impl Into<String>, config: NoteTypeConfig) -> Self {
        Self {
            id: None,
            name: name.into(),
            config,
        }
    }

    /// Whether cards are generated per cloze group rather than per template.
    pub fn is_cloze(&self) -> bool {
        self.name == CLOZE_NOTE_TYPE_NAME
            || self.config.templates.iter().any(CardTemplate::references_cloze)
    }

    /// Field names in order.
    pub fn field_names(&self) -> &[String] {
        &self.config.fields
    }

    /// Name of the field that holds cloze text.
    pub fn cloze_field_name(&self) -> Option<&str> {
        self.config.fields.first().map(String::as_str)
    }

    /// Templates used for card generation.
    ///
    /// A cloze type without templates gets one implicit template rendering
    /// its first field on both sides.
    pub fn effective_templates(&self) -> Vec<CardTemplate> {
        if self.is_cloze() && self.config.templates.is_empty() {
            let placeholder = format!(
                "{}{}}}}}",
                CLOZE_PLACEHOLDER_PREFIX,
                self.cloze_field_name().unwrap_or_default()
            );
            return vec![CardTemplate::new(placeholder.clone(), placeholder)];
        }
        self.config.templates.clone()
    }

    /// Check that the fields and templates can be determined.
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.is_cloze() && self.config.fields.is_empty() {
            return Err(FlashdeckError::note_type(format!(
                "cloze note type '{}' declares no fields",
                self.name
            )));
        }
        Ok(())
    }

    /// Map field names to the note's values by position.
    ///
    /// Missing values default to the empty string; extra values are ignored.
    pub fn field_map<'a>(&'a self, note: &'a Note) -> HashMap<&'a str, &'a str> {
        self.config
            .fields
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    name.as_str(),
                    note.fields.get(i).map_or("", String::as_str),
                )
            })
            .collect()
    }
}

/// A note type as stored: its configuration is an untyped JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNoteType {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl TryFrom<RawNoteType> for NoteType {
    type Error = FlashdeckError;

    fn try_from(raw: RawNoteType) -> Result<Self> {
        let config = if raw.config.is_null() {
            NoteTypeConfig::default()
        } else {
            NoteTypeConfig::from_value(raw.config)?
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            config,
        })
    }
}

// =============================================================================
// Notes
// =============================================================================

/// Whitespace-separated note tags. Segments within a tag are joined by `::`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parse a tag string, dropping duplicates while keeping first-seen order.
    pub fn parse(raw: &str) -> Self {
        let mut seen = HashSet::new();
        Self(
            raw.split_whitespace()
                .filter(|t| seen.insert(*t))
                .map(str::to_string)
                .collect(),
        )
    }

    /// Tags in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Add a tag unless already present. Whitespace inside the tag is dropped.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag: String = tag.split_whitespace().collect();
        if tag.is_empty() || self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Whether any tag equals `pattern` or sits beneath it in the hierarchy.
    ///
    /// `lang::ja` matches `lang::ja` and `lang::ja::verbs`, not `lang::javanese`.
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.trim_end_matches(TAG_SEPARATOR);
        if pattern.is_empty() {
            return false;
        }
        self.0.iter().any(|tag| {
            tag == pattern
                || tag
                    .strip_prefix(pattern)
                    .is_some_and(|rest| rest.starts_with(TAG_SEPARATOR))
        })
    }
}

/// Segments of a hierarchical tag.
pub fn tag_segments(tag: &str) -> Vec<&str> {
    tag.split(TAG_SEPARATOR).collect()
}

impl From<String> for Tags {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Tags> for String {
    fn from(tags: Tags) -> Self {
        tags.to_string()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// An authored note: field values aligned with its note type's field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_type_id: Option<i64>,
    pub fields: Vec<String>,
    pub tags: Tags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Note {
    /// Create a note with the given field values.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the tags from a whitespace-separated string.
    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = Tags::parse(tags);
        self
    }

    /// Set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Value of the first field, used for duplicate detection.
    pub fn first_field(&self) -> &str {
        self.fields.first().map_or("", String::as_str)
    }

    /// Whether `other` duplicates this note: same note type and first field.
    ///
    /// A note is never its own duplicate.
    pub fn is_duplicate_of(&self, other: &Note) -> bool {
        if self.id.is_some() && self.id == other.id {
            return false;
        }
        self.note_type_id == other.note_type_id && self.first_field() == other.first_field()
    }
}

// =============================================================================
// Cards
// =============================================================================

/// A card generated from a note, ready for the caller to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Owning note. `None` for legacy cards created without one.
    pub note_id: Option<i64>,
    pub deck_id: i64,
    /// Zero-based template or cloze ordinal.
    pub ord: u32,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}
