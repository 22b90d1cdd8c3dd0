//! Dotted and indexed field paths for editing JSON values.
//!
//! Accepts `title`, `colors.principal`, `cards[2].title` and `cards.2.title`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<key>[A-Za-z_][A-Za-z0-9_-]*)?(?P<indices>(?:\[\d+\])*)$")
        .expect("segment pattern is valid")
});

static INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("index pattern is valid"));

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The first key of the path, if the path starts with one.
    pub fn root_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// Write `value` at this path inside `target`.
    ///
    /// Missing object keys along the way are created. An index equal to the
    /// array length appends; anything past it is an error.
    pub fn set(&self, target: &mut Value, value: Value) -> Result<(), PathError> {
        let mut current = target;

        for (i, segment) in self.segments.iter().enumerate() {
            let is_last = i + 1 == self.segments.len();
            let next_is_index = matches!(self.segments.get(i + 1), Some(Segment::Index(_)));

            match segment {
                Segment::Key(key) => {
                    if current.is_null() {
                        *current = Value::Object(Map::new());
                    }
                    let object = current
                        .as_object_mut()
                        .ok_or_else(|| PathError::NotAnObject(self.prefix(i)))?;

                    if is_last {
                        object.insert(key.clone(), value);
                        return Ok(());
                    }

                    current = object.entry(key.clone()).or_insert_with(|| {
                        if next_is_index {
                            Value::Array(Vec::new())
                        } else {
                            Value::Object(Map::new())
                        }
                    });
                }
                Segment::Index(index) => {
                    let array = current
                        .as_array_mut()
                        .ok_or_else(|| PathError::NotAnArray(self.prefix(i)))?;

                    let len = array.len();
                    if *index > len {
                        return Err(PathError::IndexOutOfRange { index: *index, len });
                    }
                    if *index == len {
                        array.push(Value::Null);
                    }

                    if is_last {
                        array[*index] = value;
                        return Ok(());
                    }

                    current = &mut array[*index];
                }
            }
        }

        Ok(())
    }

    fn prefix(&self, upto: usize) -> String {
        FieldPath {
            segments: self.segments[..upto].to_vec(),
        }
        .to_string()
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part
                    .parse()
                    .map_err(|_| PathError::InvalidSegment(part.to_string()))?;
                segments.push(Segment::Index(index));
                continue;
            }

            let caps = SEGMENT
                .captures(part)
                .filter(|c| c.name("key").is_some() || !c["indices"].is_empty())
                .ok_or_else(|| PathError::InvalidSegment(part.to_string()))?;

            if let Some(key) = caps.name("key") {
                segments.push(Segment::Key(key.as_str().to_string()));
            }
            for index in INDEX.captures_iter(&caps["indices"]) {
                let index = index[1]
                    .parse()
                    .map_err(|_| PathError::InvalidSegment(part.to_string()))?;
                segments.push(Segment::Index(index));
            }
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Field path is empty")]
    Empty,

    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),

    #[error("Not an object at '{0}'")]
    NotAnObject(String),

    #[error("Not a list at '{0}'")]
    NotAnArray(String),

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
