use compact_str::CompactString;
use serde::{Serialize, Serializer};

/// Telegram chat identifier: a numeric id or an `@channel` username
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct ChatId {
    value: CompactString,
}

impl ChatId {
    pub fn new<S: Into<CompactString>>(id: S) -> Self {
        Self { value: id.into() }
    }
}

impl Serialize for ChatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Bot API accepts both forms, canonical numeric ids go out as integers
        match self.value.parse::<i64>() {
            Ok(id) if self.value == id.to_string() => serializer.serialize_i64(id),
            _ => serializer.serialize_str(&self.value),
        }
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
