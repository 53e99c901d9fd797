//! Implementor data files: the per-trait publisher scripts rustdoc writes under
//! `implementors/`.
//!
//! A data file assigns the payload to a local `implementors` variable and hands it
//! to `window.register_implementors` if the registrar is already installed, or
//! parks it in `window.pending_implementors` otherwise. Reading accepts every
//! shape rustdoc has emitted over time:
//!
//! - `var implementors = {"krate": [...]};`
//! - `var implementors = Object.fromEntries([["krate", [...]]]);`
//! - `var implementors = {};` followed by `implementors["krate"] = [...];` lines,
//!   whose array is a JavaScript literal (bare keys, trailing commas)
//!
//! Individual entries may be plain strings, `[html, synthetic, types]` arrays, or
//! `{"text": html, ...}` objects.

use crate::error::{DataFileError, Result};
use crate::types::{CrateName, Implementor, Payload};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Page-global name of the registrar's acceptance function.
pub const REGISTER_FN: &str = "register_implementors";

/// Page-global name of the slot holding a payload staged before the registrar exists.
pub const PENDING_SLOT: &str = "pending_implementors";

static ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+implementors\s*=\s*(.*?);\s*(?:if\s*\(\s*window\.register_implementors|implementors\[)")
        .expect("valid assignment regex")
});

static LEGACY_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*implementors\["([^"]+)"\]\s*=\s*(\[.*\]);\s*$"#)
        .expect("valid legacy line regex")
});

static FROM_ENTRIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^Object\.fromEntries\((.*)\)$").expect("valid fromEntries regex")
});

/// One implementor entry as it appears in any rustdoc version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Html(String),
    Tuple(Vec<Value>),
    Object { text: String },
}

impl RawEntry {
    fn into_implementor(self, crate_name: &str) -> std::result::Result<Implementor, DataFileError> {
        match self {
            Self::Html(html) | Self::Object { text: html } => Ok(Implementor::from(html)),
            Self::Tuple(values) => match values.into_iter().next() {
                Some(Value::String(html)) => Ok(Implementor::from(html)),
                other => Err(DataFileError::UnsupportedEntry {
                    crate_name: crate_name.to_string(),
                    entry: other.map_or_else(|| "[]".to_string(), |v| v.to_string()),
                }),
            },
        }
    }
}

fn convert_entries(
    crate_name: String,
    entries: Vec<RawEntry>,
) -> std::result::Result<(CrateName, Vec<Implementor>), DataFileError> {
    let implementors = entries
        .into_iter()
        .map(|entry| entry.into_implementor(&crate_name))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((CrateName::new(crate_name)?, implementors))
}

/// Rewrite a JavaScript array or object literal as JSON: bare object keys are
/// quoted and trailing commas dropped. String contents pass through untouched.
fn relax_literal(source: &str) -> String {
    let bytes = source.as_bytes();
    let skip_whitespace = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        i
    };

    let mut out = String::with_capacity(source.len() + 16);
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i = (i + 1).min(bytes.len());
                out.push_str(&source[start..i]);
            }
            b',' => {
                if !matches!(bytes.get(skip_whitespace(i + 1)), Some(b']' | b'}')) {
                    out.push(',');
                }
                i += 1;
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while bytes.get(i).is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') {
                    i += 1;
                }
                let word = &source[start..i];
                if bytes.get(skip_whitespace(i)) == Some(&b':') {
                    out.push('"');
                    out.push_str(word);
                    out.push('"');
                } else {
                    out.push_str(word);
                }
            }
            _ => {
                let Some(ch) = source[i..].chars().next() else {
                    break;
                };
                out.push(ch);
                i += ch.len_utf8();
            }
        }
    }
    out
}

/// Decode the payload carried by a data file's script text.
pub fn parse_script(source: &str) -> std::result::Result<Payload, DataFileError> {
    let legacy: Vec<_> = LEGACY_LINE_RE.captures_iter(source).collect();
    if !legacy.is_empty() {
        let mut payload = Payload::new();
        for caps in legacy {
            let entries: Vec<RawEntry> = serde_json::from_str(&relax_literal(&caps[2]))?;
            let (name, implementors) = convert_entries(caps[1].to_string(), entries)?;
            payload.insert(name, implementors);
        }
        return Ok(payload);
    }

    let expr = ASSIGNMENT_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .ok_or(DataFileError::MissingAssignment)?
        .as_str()
        .trim();

    let pairs: Vec<(String, Vec<RawEntry>)> = match FROM_ENTRIES_RE.captures(expr) {
        Some(caps) => serde_json::from_str(&caps[1])?,
        None => serde_json::from_str::<BTreeMap<String, Vec<RawEntry>>>(expr)?
            .into_iter()
            .collect(),
    };

    pairs
        .into_iter()
        .map(|(name, entries)| convert_entries(name, entries))
        .collect()
}

/// Encode a payload as a publisher script.
pub fn to_script(payload: &Payload) -> Result<String> {
    let json = serde_json::to_string(payload).context("Failed to serialize implementor payload")?;
    Ok(format!(
        "(function() {{\n    \
         var implementors = {json};\n    \
         if (window.{register}) {{\n        \
         window.{register}(implementors);\n    \
         }} else {{\n        \
         window.{pending} = implementors;\n    \
         }}\n\
         }})()\n",
        json = json,
        register = REGISTER_FN,
        pending = PENDING_SLOT,
    ))
}

/// Read and decode a data file.
pub async fn read_data_file(path: &Path) -> Result<Payload> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read implementor data file {}", path.display()))?;
    parse_script(&source)
        .with_context(|| format!("Failed to parse implementor data file {}", path.display()))
}

/// Write a payload as a data file, creating parent directories as needed.
pub async fn write_data_file(path: &Path, payload: &Payload) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let script = to_script(payload)?;
    tokio::fs::write(path, script)
        .await
        .with_context(|| format!("Failed to write implementor data file {}", path.display()))?;

    tracing::debug!(path = %path.display(), crates = payload.len(), "Wrote implementor data file");
    Ok(())
}
