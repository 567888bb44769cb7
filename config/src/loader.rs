use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::pattern;
use crate::source::SourceContext;
use crate::types::{MappingDocument, PatternList, ResolvedValue, SchemaVersion};

/// Resolves every mapping of a document against one source context.
pub struct MappingLoader<'a> {
    ctx: SourceContext<'a>,
}

impl<'a> MappingLoader<'a> {
    pub fn new(ctx: SourceContext<'a>) -> Self {
        Self { ctx }
    }

    /// Names that resolved, with their values. Names whose patterns all
    /// failed are absent; for version 2 so are failed sub-keys, and a name
    /// with no resolved sub-key is absent altogether.
    pub fn load(&self, document: &MappingDocument) -> IndexMap<String, ResolvedValue> {
        let mut resolved = IndexMap::new();

        for (name, config) in &document.mappings {
            let value = match document.version {
                SchemaVersion::V1 => self.process_mapping(name, config).map(ResolvedValue::Scalar),
                SchemaVersion::V2 => self.process_mapping_v2(name, config).map(ResolvedValue::Group),
            };
            if let Some(value) = value {
                resolved.insert(name.clone(), value);
            }
        }

        info!(
            version = document.version.as_u8(),
            declared = document.len(),
            resolved = resolved.len(),
            "processed mapping document"
        );
        resolved
    }

    fn process_mapping(&self, name: &str, config: &Value) -> Option<String> {
        let patterns = PatternList::from_value(config);
        if patterns.is_empty() {
            warn!(mapping = %name, "no searchPatterns found for mapping");
            return None;
        }
        self.first_match(name, &patterns)
    }

    fn process_mapping_v2(&self, name: &str, config: &Value) -> Option<IndexMap<String, String>> {
        let Some(sub_keys) = config.as_object() else {
            warn!(mapping = %name, "version 2 mapping is not an object of sub-keys");
            return None;
        };

        let mut group = IndexMap::new();
        for (sub_key, sub_config) in sub_keys {
            let label = format!("{name}[{sub_key}]");
            let patterns = PatternList::from_value(sub_config);
            if patterns.is_empty() {
                warn!(mapping = %label, "no searchPatterns found for sub-key");
                continue;
            }
            if let Some(value) = self.first_match(&label, &patterns) {
                group.insert(sub_key.clone(), value);
            }
        }

        (!group.is_empty()).then_some(group)
    }

    fn first_match(&self, label: &str, patterns: &PatternList) -> Option<String> {
        for raw in &patterns.search_patterns {
            match pattern::resolve(raw, &self.ctx) {
                Ok(value) => {
                    debug!(mapping = %label, pattern = %raw, "resolved");
                    return Some(value);
                }
                Err(err) if err.is_misconfiguration() => {
                    warn!(mapping = %label, pattern = %raw, error = %err, "unsupported search pattern");
                }
                Err(err) if err.is_invalid_json_path() => {
                    warn!(
                        mapping = %label,
                        pattern = %raw,
                        error = %err,
                        "invalid JSONPath; keys with dashes need bracket notation, e.g. $['user-provided']"
                    );
                }
                Err(err) => {
                    debug!(mapping = %label, pattern = %raw, error = %err, "search pattern did not resolve");
                }
            }
        }
        debug!(mapping = %label, "no search pattern resolved");
        None
    }
}
