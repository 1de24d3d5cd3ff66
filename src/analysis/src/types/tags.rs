use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of a task tag string: either `key:value` or a bare value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagLabel {
    pub key: Option<String>,
    pub value: String,
}

impl TagLabel {
    /// Splits `"sample:S1, lane:2, paired"` into labels. Empty entries are dropped.
    pub fn parse_all(tag: &str) -> Vec<TagLabel> {
        tag.split(',').filter_map(TagLabel::parse).collect()
    }

    pub fn parse(entry: &str) -> Option<TagLabel> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        match entry.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => Some(TagLabel {
                key: Some(key.trim().to_string()),
                value: value.trim().to_string(),
            }),
            _ => Some(TagLabel {
                key: None,
                value: entry.to_string(),
            }),
        }
    }
}

impl fmt::Display for TagLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}:{}", key, self.value),
            None => f.write_str(&self.value),
        }
    }
}
