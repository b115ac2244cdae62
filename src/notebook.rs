//! Jupyter notebook model and the line-oriented markdown renderer used by
//! the file viewer.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Notebook text fields are either one string or a list of lines
fn multiline<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        One(String),
        Lines(Vec<String>),
    }
    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::One(s)) => s,
        Some(Text::Lines(lines)) => lines.concat(),
        None => String::new(),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
    },
    Code {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
        #[serde(default)]
        execution_count: Option<u64>,
        #[serde(default)]
        outputs: Vec<RawOutput>,
    },
    Raw {
        #[serde(default, deserialize_with = "multiline")]
        source: String,
    },
    #[serde(other)]
    Unknown,
}

/// Output as stored in the notebook; classify with [`RawOutput::kind`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutput {
    #[serde(default)]
    pub output_type: String,
    #[serde(default, deserialize_with = "multiline")]
    pub text: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub ename: String,
    #[serde(default)]
    pub evalue: String,
    #[serde(default)]
    pub traceback: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Error {
        name: String,
        message: String,
        traceback: String,
    },
    /// Base64 PNG payload
    Image(String),
    Html(String),
    Text(String),
    Empty,
}

fn mime_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .concat(),
        ),
        _ => None,
    }
}

impl RawOutput {
    /// First match wins: error, image, html, then plain text or stream.
    pub fn kind(&self) -> Output {
        if self.output_type == "error" {
            return Output::Error {
                name: self.ename.clone(),
                message: self.evalue.clone(),
                traceback: strip_ansi(&self.traceback.join("\n")),
            };
        }
        if let Some(png) = self.data.get("image/png").and_then(mime_text) {
            // Payloads are often line-wrapped
            return Output::Image(png.split_whitespace().collect());
        }
        if let Some(html) = self.data.get("text/html").and_then(mime_text) {
            return Output::Html(html);
        }
        if !self.text.is_empty() {
            return Output::Text(self.text.clone());
        }
        match self.data.get("text/plain").and_then(mime_text) {
            Some(plain) if !plain.is_empty() => Output::Text(plain),
            _ => Output::Empty,
        }
    }
}

pub fn strip_ansi(text: &str) -> String {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let re = ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI regex"));
    re.replace_all(text, "").into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Plain(String),
    Bold(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(u8, String),
    Paragraph(Vec<Span>),
    ListItem(String),
    Spacer,
}

/// Split on `**` pairs; odd segments are bold. An unmatched trailing `**`
/// stays literal.
fn bold_spans(line: &str) -> Vec<Span> {
    let parts: Vec<&str> = line.split("**").collect();
    let paired = if parts.len() % 2 == 0 {
        parts.len() - 1
    } else {
        parts.len()
    };
    let mut spans = Vec::new();
    for (i, part) in parts[..paired].iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i % 2 == 1 {
            spans.push(Span::Bold(part.to_string()));
        } else {
            spans.push(Span::Plain(part.to_string()));
        }
    }
    if paired < parts.len() {
        let tail = format!("**{}", parts[paired..].join("**"));
        match spans.last_mut() {
            Some(Span::Plain(prev)) => prev.push_str(&tail),
            _ => spans.push(Span::Plain(tail)),
        }
    }
    spans
}

/// Minimal markdown: one block per source line
pub fn render_markdown(source: &str) -> Vec<Block> {
    source
        .split('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix("# ") {
                Block::Heading(1, rest.to_string())
            } else if let Some(rest) = line.strip_prefix("## ") {
                Block::Heading(2, rest.to_string())
            } else if let Some(rest) = line.strip_prefix("### ") {
                Block::Heading(3, rest.to_string())
            } else if line.contains("**") {
                Block::Paragraph(bold_spans(line))
            } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
                Block::ListItem(rest.to_string())
            } else if line.trim().is_empty() {
                Block::Spacer
            } else {
                Block::Paragraph(vec![Span::Plain(line.to_string())])
            }
        })
        .collect()
}

/// Fetched file content, ready for display
#[derive(Debug, Clone)]
pub enum Document {
    Notebook(Notebook),
    Code(String),
}

pub fn is_notebook(path: &str) -> bool {
    path.ends_with(".ipynb")
}

impl Document {
    pub fn parse(path: &str, content: &str) -> Result<Self, String> {
        if is_notebook(path) {
            serde_json::from_str::<Notebook>(content)
                .map(Document::Notebook)
                .map_err(|_| "Failed to parse notebook JSON".to_string())
        } else {
            Ok(Document::Code(content.to_string()))
        }
    }
}
