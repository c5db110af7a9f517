//! Compact summaries of the current screen

use crate::element::ElementKind;
use crate::tree::RawNode;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_BUTTONS_SHOWN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFieldInfo {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub label: String,
    pub has_value: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
    pub total_elements: usize,
    pub interactive_elements: usize,
    pub focusable: usize,
    pub buttons: Vec<String>,
    pub text_fields: Vec<TextFieldInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_count: Option<usize>,
}

impl ScreenSummary {
    pub fn analyze(root: &RawNode) -> Self {
        let mut summary = Self::default();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if let Some(element) = node.to_element() {
                summary.total_elements += 1;

                if element.kind.is_interactive() {
                    summary.interactive_elements += 1;
                    if element.enabled {
                        summary.focusable += 1;
                    }

                    let name = element.name().unwrap_or("Unnamed").to_string();
                    match &element.kind {
                        ElementKind::Button => summary.buttons.push(name),
                        kind if kind.is_text_input() => summary.text_fields.push(TextFieldInfo {
                            kind: kind.clone(),
                            label: name,
                            has_value: element.value.as_deref().is_some_and(|v| !v.is_empty()),
                        }),
                        ElementKind::NavigationBar => {
                            summary.nav_title = Some(
                                element
                                    .label
                                    .clone()
                                    .filter(|l| !l.is_empty())
                                    .unwrap_or_else(|| "Navigation".to_string()),
                            );
                        }
                        ElementKind::TabBar => summary.tab_count = Some(node.children.len()),
                        _ => {}
                    }
                }
            }

            if summary.screen_name.is_none() {
                if let Some(id) = node.identifier.as_deref() {
                    if id.contains("ViewController") || id.contains("Screen") {
                        summary.screen_name = Some(id.to_string());
                    }
                }
            }

            stack.extend(node.children.iter().rev());
        }

        summary
    }

    pub fn filled_text_fields(&self) -> usize {
        self.text_fields.iter().filter(|f| f.has_value).count()
    }

    /// Suggestions for what to do next on this screen.
    pub fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();

        if self.buttons.iter().any(|b| b.contains("Login")) {
            hints.push("Login screen detected - find TextFields for credentials".to_string());
        }

        let unfilled = self.text_fields.len() - self.filled_text_fields();
        if unfilled > 0 {
            hints.push(format!("{} empty text field(s) - may need input", unfilled));
        }

        if self.buttons.is_empty() && self.text_fields.is_empty() {
            hints.push("No interactive elements - try swiping or going back".to_string());
        }

        if let Some(tabs) = self.tab_count {
            hints.push(format!("Tab bar available with {} tabs", tabs));
        }

        hints
    }
}

impl fmt::Display for ScreenSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Screen: {} ({} elements, {} interactive)",
            self.screen_name.as_deref().unwrap_or("Unknown Screen"),
            self.total_elements,
            self.interactive_elements
        )?;

        if !self.buttons.is_empty() {
            let mut list = self
                .buttons
                .iter()
                .take(MAX_BUTTONS_SHOWN)
                .map(|b| format!("\"{}\"", b))
                .collect::<Vec<_>>()
                .join(", ");
            if self.buttons.len() > MAX_BUTTONS_SHOWN {
                list.push_str(&format!(" +{} more", self.buttons.len() - MAX_BUTTONS_SHOWN));
            }
            writeln!(f, "Buttons: {}", list)?;
        }

        if !self.text_fields.is_empty() {
            writeln!(
                f,
                "TextFields: {} ({} filled)",
                self.text_fields.len(),
                self.filled_text_fields()
            )?;
        }

        let mut nav = Vec::new();
        if let Some(title) = &self.nav_title {
            nav.push(format!("NavBar: \"{}\"", title));
        }
        if let Some(tabs) = self.tab_count {
            nav.push(format!("TabBar: {} tabs", tabs));
        }
        if !nav.is_empty() {
            writeln!(f, "Navigation: {}", nav.join(", "))?;
        }

        write!(f, "Focusable: {} elements", self.focusable)
    }
}
