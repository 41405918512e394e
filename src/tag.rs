use std::collections::HashMap;
use std::fmt;

/// A metadata tag, identified by its DICOM-style keyword (e.g. `SeriesInstanceUID`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagElement {
    keyword: String,
}

impl TagElement {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

impl fmt::Display for TagElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(value) => f.write_str(value),
            TagValue::Int(value) => write!(f, "{value}"),
            TagValue::Float(value) => write!(f, "{value}"),
            TagValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TagStore {
    values: HashMap<TagElement, TagValue>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tag: &TagElement) -> Option<&TagValue> {
        self.values.get(tag)
    }

    /// Stores `value` under `tag`; `None` removes the entry.
    pub fn set(&mut self, tag: TagElement, value: Option<TagValue>) {
        match value {
            Some(value) => {
                self.values.insert(tag, value);
            }
            None => {
                self.values.remove(&tag);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(TagElement, TagValue)> for TagStore {
    fn from_iter<I: IntoIterator<Item = (TagElement, TagValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Identity of a series: the identifying tag, its value, and the tag used for labels.
#[derive(Debug, Clone)]
pub struct SeriesIdentity {
    pub tag_id: TagElement,
    pub identifier: TagValue,
    pub display_tag: TagElement,
}

impl SeriesIdentity {
    pub fn new(
        tag_id: TagElement,
        identifier: impl Into<TagValue>,
        display_tag: TagElement,
    ) -> Self {
        Self {
            tag_id,
            identifier: identifier.into(),
            display_tag,
        }
    }
}

impl PartialEq for SeriesIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.tag_id == other.tag_id && self.identifier == other.identifier
    }
}
