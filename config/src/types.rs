use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::CloudEnvError;

pub const VERSION_KEY: &str = "version";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// `name -> { searchPatterns }`
    #[default]
    V1,
    /// `name -> sub-key -> { searchPatterns }`
    V2,
}

impl SchemaVersion {
    /// Reads the `version` member of a mapping document. A missing member
    /// means version 1; integral floats such as `2.0` count as integers.
    pub fn detect(document: &Map<String, Value>) -> Result<Self, CloudEnvError> {
        let Some(v) = document.get(VERSION_KEY) else {
            return Ok(Self::V1);
        };
        match v.as_f64() {
            Some(f) if f == 1.0 => Ok(Self::V1),
            Some(f) if f == 2.0 => Ok(Self::V2),
            _ => Err(CloudEnvError::UnsupportedVersion(v.to_string())),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PatternList {
    #[serde(default, rename = "searchPatterns")]
    pub search_patterns: Vec<String>,
}

impl PatternList {
    /// Malformed entries read as an empty list.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.search_patterns.is_empty()
    }
}

/// A parsed mapping document with its schema version split out.
#[derive(Debug, Clone, Default)]
pub struct MappingDocument {
    pub version: SchemaVersion,
    pub mappings: IndexMap<String, Value>,
}

impl MappingDocument {
    pub fn from_path(path: &Path) -> Result<Self, CloudEnvError> {
        let content = std::fs::read_to_string(path).map_err(|e| CloudEnvError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        content.parse()
    }

    pub fn from_value(value: Value) -> Result<Self, CloudEnvError> {
        let Value::Object(document) = value else {
            return Err(CloudEnvError::NotAnObject);
        };
        let version = SchemaVersion::detect(&document)?;
        let mappings = document
            .into_iter()
            .filter(|(name, _)| name != VERSION_KEY)
            .collect();
        Ok(Self { version, mappings })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl std::str::FromStr for MappingDocument {
    type Err = CloudEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(serde_json::from_str(s)?)
    }
}

/// What a mapping name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    Scalar(String),
    /// Sub-key results of a version 2 mapping, in document order.
    Group(IndexMap<String, String>),
}

impl ResolvedValue {
    /// The value as JSON. Group members holding JSON object or array text
    /// are embedded as nested values, everything else stays a string.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(s) => Value::String(s.clone()),
            Self::Group(members) => Value::Object(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), embed(v)))
                    .collect(),
            ),
        }
    }

    /// The value as text: scalars verbatim, groups as a JSON object.
    pub fn to_text(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::Group(_) => self.to_json().to_string(),
        }
    }
}

fn embed(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ (Value::Object(_) | Value::Array(_))) => v,
        _ => Value::String(text.to_string()),
    }
}
