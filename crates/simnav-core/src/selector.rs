//! Match criteria and selector parsing
//!
//! Syntax:
//!   type:Button              - exact element type
//!   id:submitButton          - exact accessibility identifier
//!   text:Log In              - label or value equals text
//!   text~:log                - label + value contains text (case-insensitive)
//!   index:1                  - pick the second match in document order
//!   type:Button AND text~:ok - compound selector

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to look for in a flattened tree. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub index: usize,
    #[serde(default = "fuzzy_default")]
    pub fuzzy: bool,
}

fn fuzzy_default() -> bool {
    true
}

impl MatchCriteria {
    pub fn new() -> Self {
        Self {
            fuzzy: true,
            ..Default::default()
        }
    }

    /// Fuzzy text match: case-insensitive substring of label + value.
    pub fn text(text: &str) -> Self {
        Self::new().with_text(text)
    }

    /// Exact text match against label or value.
    pub fn exact(text: &str) -> Self {
        Self::new().with_text(text).fuzzy(false)
    }

    pub fn element_type(kind: &str) -> Self {
        Self::new().with_type(kind)
    }

    pub fn identifier(id: &str) -> Self {
        Self::new().with_identifier(id)
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_type(mut self, kind: &str) -> Self {
        self.element_type = Some(kind.to_string());
        self
    }

    pub fn with_identifier(mut self, id: &str) -> Self {
        self.identifier = Some(id.to_string());
        self
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Fill in the element type only when none was given.
    pub fn or_type(mut self, kind: &str) -> Self {
        if self.element_type.is_none() {
            self.element_type = Some(kind.to_string());
        }
        self
    }

    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::selector_invalid(s, "empty selector"));
        }

        let mut criteria = Self::new();
        for part in s.split(" AND ") {
            criteria.apply(part.trim())?;
        }
        Ok(criteria)
    }

    fn apply(&mut self, cond: &str) -> Result<()> {
        let (attr, rest) = cond.split_once(':').ok_or_else(|| {
            Error::selector_invalid(cond, "expected format 'attr:value' or 'attr~:value'")
        })?;

        let (attr, contains) = match attr.strip_suffix('~') {
            Some(attr) => (attr, true),
            None => (attr, false),
        };

        match attr.to_lowercase().as_str() {
            "text" | "label" => {
                self.text = Some(rest.to_string());
                self.fuzzy = contains;
            }
            "type" | "role" => self.element_type = Some(rest.to_string()),
            "id" | "identifier" => self.identifier = Some(rest.to_string()),
            "index" | "idx" => {
                self.index = rest.trim().parse().map_err(|_| {
                    Error::selector_invalid(cond, "index must be a non-negative integer")
                })?;
            }
            _ => {
                return Err(Error::selector_invalid(
                    cond,
                    &format!("unknown attribute '{}'", attr),
                ))
            }
        }
        Ok(())
    }
}

/// Criteria echo used in "Not found" messages.
impl fmt::Display for MatchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text='{}'", text));
        }
        if let Some(kind) = &self.element_type {
            parts.push(format!("type={}", kind));
        }
        if let Some(id) = &self.identifier {
            parts.push(format!("id={}", id));
        }
        if self.index > 0 {
            parts.push(format!("index={}", self.index));
        }
        if parts.is_empty() {
            return f.write_str("any element");
        }
        f.write_str(&parts.join(", "))
    }
}
