//! # Field Paths
//!
//! Reads and writes values inside schemaless resource documents using
//! field path strings such as `status.importResources.openIdProviderArn`,
//! `spec.forProvider.tags[0]` or `metadata.labels['crossplane.io/claim-namespace']`.
//!
//! Writes create missing intermediate objects and arrays, so a patch can
//! target a field that does not exist yet on the desired resource.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure to read or write a field path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldPathError {
    /// The path string itself cannot be parsed
    #[error("invalid field path {path:?}: {reason}")]
    Invalid { path: String, reason: String },
    /// No value exists at the path
    #[error("{path}: no such field")]
    NotFound { path: String },
    /// A value exists but has the wrong type
    #[error("{path}: expected {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
    },
}

/// One step of a parsed field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Field(String),
    Index(usize),
}

/// Split a field path into segments
pub(crate) fn parse(path: &str) -> Result<Vec<Segment>, FieldPathError> {
    let invalid = |reason: &str| FieldPathError::Invalid {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    // `a[0].b` leaves nothing pending before the dot
    let mut after_bracket = false;
    let mut expect_field = false;
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut current)));
                } else if !after_bracket {
                    return Err(invalid("empty field name"));
                }
                after_bracket = false;
                expect_field = true;
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut current)));
                } else if expect_field {
                    return Err(invalid("empty field name"));
                }
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(invalid("unterminated '['"));
                }
                let quoted = inner.len() >= 2
                    && ((inner.starts_with('\'') && inner.ends_with('\''))
                        || (inner.starts_with('"') && inner.ends_with('"')));
                if quoted {
                    segments.push(Segment::Field(inner[1..inner.len() - 1].to_string()));
                } else {
                    let index = inner
                        .trim()
                        .parse::<usize>()
                        .map_err(|e| invalid(&format!("bad index {inner:?}: {e}")))?;
                    segments.push(Segment::Index(index));
                }
                after_bracket = true;
                expect_field = false;
            }
            ']' => return Err(invalid("unexpected ']'")),
            c => {
                if after_bracket {
                    return Err(invalid("expected '.' or '[' after ']'"));
                }
                current.push(c);
                expect_field = false;
            }
        }
    }

    if expect_field {
        return Err(invalid("empty field name"));
    }
    if !current.is_empty() {
        segments.push(Segment::Field(current));
    }
    if segments.is_empty() {
        return Err(invalid("path has no segments"));
    }
    Ok(segments)
}

/// Read the value at `path`
pub fn get_value<'a>(object: &'a Value, path: &str) -> Result<&'a Value, FieldPathError> {
    let segments = parse(path)?;
    let not_found = || FieldPathError::NotFound {
        path: path.to_string(),
    };

    let mut current = object;
    for segment in &segments {
        current = match (segment, current) {
            (Segment::Field(name), Value::Object(map)) => map.get(name).ok_or_else(not_found)?,
            (Segment::Index(index), Value::Array(items)) => {
                items.get(*index).ok_or_else(not_found)?
            }
            _ => return Err(not_found()),
        };
    }
    if current.is_null() {
        return Err(not_found());
    }
    Ok(current)
}

/// Read the string at `path`
pub fn get_string(object: &Value, path: &str) -> Result<String, FieldPathError> {
    match get_value(object, path)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(FieldPathError::WrongType {
            path: path.to_string(),
            expected: "string",
        }),
    }
}

/// Read the string to string mapping at `path`
pub fn get_string_map(
    object: &Value,
    path: &str,
) -> Result<BTreeMap<String, String>, FieldPathError> {
    let wrong_type = || FieldPathError::WrongType {
        path: path.to_string(),
        expected: "map of strings",
    };
    let Value::Object(map) = get_value(object, path)? else {
        return Err(wrong_type());
    };
    map.iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k.clone(), s.clone())),
            _ => Err(wrong_type()),
        })
        .collect()
}

/// Write `value` at `path`, creating intermediate containers as required
///
/// Fails when an existing intermediate value has a type that cannot hold the
/// next segment (for example indexing into a string).
pub fn set_value(object: &mut Value, path: &str, value: Value) -> Result<(), FieldPathError> {
    let segments = parse(path)?;
    let wrong_type = |expected| FieldPathError::WrongType {
        path: path.to_string(),
        expected,
    };

    let mut current = object;
    for (position, segment) in segments.iter().enumerate() {
        let last = position + 1 == segments.len();
        // Null placeholders are replaced by the container the segment needs
        if current.is_null() {
            *current = match segment {
                Segment::Field(_) => Value::Object(Map::new()),
                Segment::Index(_) => Value::Array(Vec::new()),
            };
        }

        current = match segment {
            Segment::Field(name) => {
                let Value::Object(map) = current else {
                    return Err(wrong_type("object"));
                };
                if last {
                    map.insert(name.clone(), value);
                    return Ok(());
                }
                map.entry(name.clone()).or_insert(Value::Null)
            }
            Segment::Index(index) => {
                let Value::Array(items) = current else {
                    return Err(wrong_type("array"));
                };
                // Arrays grow by appending, never by padding
                if *index > items.len() {
                    return Err(FieldPathError::Invalid {
                        path: path.to_string(),
                        reason: format!(
                            "index {index} is past the end of an array of length {}",
                            items.len()
                        ),
                    });
                }
                if *index == items.len() {
                    items.push(Value::Null);
                }
                if last {
                    items[*index] = value;
                    return Ok(());
                }
                &mut items[*index]
            }
        };
    }

    Ok(())
}
