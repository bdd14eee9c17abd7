//! Card template rendering.
//!
//! Placeholders:
//! - `{{FrontSide}}` becomes the rendered front (empty on the front itself)
//! - `{{cloze:Field}}` becomes the field value with clozes rendered for the
//!   card's ordinal
//! - `{{Field}}` becomes the raw field value
//!
//! The template is scanned once, so text inserted for one placeholder is
//! never read as another. A field holding `{{Back}}` shows that text
//! literally on both sides.
//!
//! Unknown fields resolve to the empty string. Field values are inserted
//! as-is unless `escape_fields` is set.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::cloze::{render_cloze_styled, ClozeStyle};

const FRONT_SIDE: &str = "FrontSide";

// Group 1: cloze field name. Group 2: plain field name or FrontSide.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(?:cloze:(.*?)|([^}:]+))\}\}").expect("placeholder pattern is valid")
});

/// Options for rendering one side of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions<'a> {
    /// 1-based template or cloze ordinal.
    pub ordinal: u32,
    /// Whether the back side is being rendered (reveals the active cloze).
    pub is_back: bool,
    /// Rendered front, substituted for `{{FrontSide}}`.
    pub front_content: &'a str,
    /// HTML-escape field values before insertion.
    pub escape_fields: bool,
    /// Output style for cloze placeholders.
    pub cloze_style: ClozeStyle,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            ordinal: 1,
            is_back: false,
            front_content: "",
            escape_fields: false,
            cloze_style: ClozeStyle::Html,
        }
    }
}

impl<'a> RenderOptions<'a> {
    /// Options for the front side of the card with `ordinal`.
    pub fn front(ordinal: u32) -> Self {
        Self {
            ordinal,
            ..Default::default()
        }
    }

    /// Options for the back side, given the rendered front.
    pub fn back(ordinal: u32, front_content: &'a str) -> Self {
        Self {
            ordinal,
            is_back: true,
            front_content,
            ..Default::default()
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
}

/// HTML-escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Render a template against a field map.
pub fn render_template(
    template: &str,
    fields: &HashMap<&str, &str>,
    options: &RenderOptions<'_>,
) -> String {
    let lookup = |name: &str| -> String {
        let value = fields.get(name).copied().unwrap_or("");
        if options.escape_fields {
            escape_html(value)
        } else {
            value.to_string()
        }
    };

    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures| match (caps.get(1), caps.get(2)) {
            (Some(cloze_field), _) => render_cloze_styled(
                &lookup(cloze_field.as_str()),
                options.ordinal,
                options.is_back,
                options.cloze_style,
            ),
            (None, Some(name)) if name.as_str() == FRONT_SIDE => {
                options.front_content.to_string()
            }
            (None, Some(name)) => lookup(name.as_str()),
            (None, None) => String::new(),
        })
        .into_owned()
}

/// Wrap card HTML in a style block and card container.
pub fn inject_css(card_html: &str, css: &str) -> String {
    format!("<style>{}</style><div class=\"card\">{}</div>", css, card_html)
}

/// Build a standalone HTML document previewing one card side.
pub fn preview_html(content: &str, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n  <style>\n    {}\n  </style>\n</head>\n<body>\n  <div class=\"card\">\n    {}\n  </div>\n</body>\n</html>",
        css, content
    )
}
