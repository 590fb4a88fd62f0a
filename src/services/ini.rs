//! Line-oriented codec for the game's `config.ini`.
//!
//! Unlike a map-based INI loader, this keeps every line as an [`IniElement`]
//! in file order, so a file can be read, edited by inserting or removing
//! single elements, and written back without reordering or dropping
//! entries the launcher does not understand.
//!
//! Writes go through a temporary file in the target directory that is then
//! renamed over the destination. A reader sees either the old file or the
//! new one, never a half-written sentinel.

use crate::models::IniElement;
use camino::Utf8Path;
use encoding_rs::GBK;
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while reading or writing a configuration file
#[derive(Error, Debug)]
pub enum IniError {
    #[error("Malformed line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    #[error("Cannot write {element:?}: {reason}")]
    Unrepresentable {
        element: IniElement,
        reason: &'static str,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parses configuration text into elements.
///
/// Blank lines are dropped. A line starting with `[` must end with `]` and
/// name a section. A line starting with `;` or `#` is a comment; the marker
/// is stripped and the rest is kept verbatim. A parameter must have a
/// non-empty key; its key is trimmed, its value is everything after the
/// first `=`. Remaining free text is kept as a trimmed comment.
pub fn deserialize(content: &str) -> Result<Vec<IniElement>, IniError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut elements = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_start();
        if line.trim_end().is_empty() {
            continue;
        }

        let malformed = || IniError::Malformed {
            line: index + 1,
            content: raw.to_string(),
        };

        if let Some(text) = line.strip_prefix([';', '#']) {
            elements.push(IniElement::comment(text));
            continue;
        }

        if line.starts_with('[') {
            let name = line
                .trim_end()
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .map(str::trim)
                .ok_or_else(malformed)?;
            if name.is_empty() {
                return Err(malformed());
            }
            elements.push(IniElement::section(name));
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim_end();
            if key.is_empty() {
                return Err(malformed());
            }
            elements.push(IniElement::parameter(key, value));
            continue;
        }

        elements.push(IniElement::comment(line.trim_end()));
    }

    Ok(elements)
}

/// Renders elements back into configuration text, one element per line.
///
/// Fails with [`IniError::Unrepresentable`] for an element that would not
/// read back as itself, such as a key with surrounding whitespace or any
/// text containing a line break.
pub fn serialize(elements: &[IniElement]) -> Result<String, IniError> {
    let mut content = String::new();
    for element in elements {
        if let Err(reason) = check_representable(element) {
            return Err(IniError::Unrepresentable {
                element: element.clone(),
                reason,
            });
        }
        content.push_str(&element.to_string());
        content.push('\n');
    }
    Ok(content)
}

fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

fn check_representable(element: &IniElement) -> Result<(), &'static str> {
    match element {
        IniElement::Section { name } => {
            if name.is_empty() {
                return Err("empty section name");
            }
            if name.trim() != name {
                return Err("section name has surrounding whitespace");
            }
            if has_line_break(name) {
                return Err("section name contains a line break");
            }
        }
        IniElement::Parameter { key, value } => {
            if key.is_empty() {
                return Err("empty key");
            }
            if key.trim() != key {
                return Err("key has surrounding whitespace");
            }
            if key.contains('=') {
                return Err("key contains '='");
            }
            if key.starts_with(['[', ';', '#', '\u{feff}']) {
                return Err("key starts with a section or comment marker");
            }
            if has_line_break(key) || has_line_break(value) {
                return Err("parameter contains a line break");
            }
        }
        IniElement::Comment { text } => {
            if has_line_break(text) {
                return Err("comment contains a line break");
            }
        }
    }
    Ok(())
}

/// Reads and parses a configuration file.
///
/// The file is expected to be UTF-8; files that are not are decoded as GBK,
/// the code page CN Windows installs write with.
pub fn deserialize_from_file(path: &Utf8Path) -> Result<Vec<IniElement>, IniError> {
    let bytes = fs::read(path).map_err(|source| IniError::Read {
        path: path.to_string(),
        source,
    })?;

    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!("{} is not valid UTF-8, decoding as GBK", path);
            let (decoded, _, _) = GBK.decode(err.as_bytes());
            decoded.into_owned()
        }
    };

    deserialize(&content)
}

/// Serializes elements to `path` atomically (temporary file + rename).
pub fn serialize_to_file(path: &Utf8Path, elements: &[IniElement]) -> Result<(), IniError> {
    let write_err = |source: std::io::Error| IniError::Write {
        path: path.to_string(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };

    let content = serialize(elements)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(content.as_bytes())
        .map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|err| write_err(err.error))?;

    tracing::debug!("Wrote {} elements to {}", elements.len(), path);
    Ok(())
}

/// Collects parameters into an ordered map. The first occurrence of a
/// duplicated key wins.
pub fn parameters(elements: &[IniElement]) -> IndexMap<&str, &str> {
    let mut map = IndexMap::new();
    for element in elements {
        if let IniElement::Parameter { key, value } = element {
            map.entry(key.as_str()).or_insert(value.as_str());
        }
    }
    map
}

/// Counts the parameters named `key`
pub fn count_parameter(elements: &[IniElement], key: &str) -> usize {
    elements.iter().filter(|e| e.is_parameter(key)).count()
}

pub fn contains_parameter(elements: &[IniElement], key: &str) -> bool {
    elements.iter().any(|e| e.is_parameter(key))
}
