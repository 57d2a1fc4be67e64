//! The unit of emitted build metadata.

use serde::Serialize;

/// One tag, custom value or link written to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    Tag { label: String },
    Value { key: String, value: String },
    Link { label: String, url: String },
}

impl Fact {
    pub fn tag(label: impl Into<String>) -> Self {
        Fact::Tag {
            label: label.into(),
        }
    }

    pub fn value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Fact::Value {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Fact::Link {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Short kind name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Fact::Tag { .. } => "tag",
            Fact::Value { .. } => "value",
            Fact::Link { .. } => "link",
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fact::Tag { label } => write!(f, "tag   {label}"),
            Fact::Value { key, value } => write!(f, "value {key} = {value}"),
            Fact::Link { label, url } => write!(f, "link  {label} -> {url}"),
        }
    }
}
