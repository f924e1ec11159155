//! Atlassian Document Format, reduced to what plain-text bodies need.

use serde::{Deserialize, Serialize};

use crate::model::null_as_default;

const DOC: &str = "doc";
const PARAGRAPH: &str = "paragraph";
const TEXT: &str = "text";

/// One node of an ADF tree. Attributes and marks are dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocNode {
    /// Node type (`doc`, `paragraph`, `text`, ...).
    #[serde(rename = "type")]
    pub node_type: String,
    /// Document format version; only set on the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Text of a `text` node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child nodes.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<DocNode>,
}

impl DocNode {
    /// Builds a document with one paragraph per blank-line separated chunk
    /// of `text`. Chunks that are only whitespace are skipped.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let content = text
            .split("\n\n")
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| Self {
                node_type: PARAGRAPH.to_string(),
                content: vec![Self {
                    node_type: TEXT.to_string(),
                    text: Some(chunk.to_string()),
                    ..Self::default()
                }],
                ..Self::default()
            })
            .collect();
        Self { node_type: DOC.to_string(), version: Some(1), text: None, content }
    }

    /// Extracts the text of the tree depth-first. Paragraphs directly under
    /// a `doc` node are separated by a blank line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        if self.node_type == TEXT {
            if let Some(text) = &self.text {
                out.push_str(text);
            }
        }
        for (i, child) in self.content.iter().enumerate() {
            if i > 0 && self.node_type == DOC && child.node_type == PARAGRAPH {
                out.push_str("\n\n");
            }
            child.write_text(out);
        }
    }
}
