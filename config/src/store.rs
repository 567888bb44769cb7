use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::loader::MappingLoader;
use crate::source::{strip_leading_separator, Environment, ProcessEnv, SourceContext};
use crate::types::{MappingDocument, ResolvedValue};
use crate::CloudEnvError;

/// Resolved configuration values, keyed by mapping name.
///
/// Built up by one or more [`CloudEnv::initialize`] calls and read through
/// the accessors. Safe to share between threads.
pub struct CloudEnv {
    base_dir: PathBuf,
    env: Box<dyn Environment>,
    table: RwLock<HashMap<String, ResolvedValue>>,
}

impl Default for CloudEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CloudEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudEnv")
            .field("base_dir", &self.base_dir)
            .field("names", &self.names())
            .finish_non_exhaustive()
    }
}

impl CloudEnv {
    /// A store reading the process environment, with file patterns
    /// resolved against the current working directory.
    pub fn new() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|e| {
            error!(error = %e, "cannot determine working directory");
            PathBuf::from(".")
        });

        Self {
            base_dir,
            env: Box::new(ProcessEnv),
            table: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Loads the mapping document at `mapping_file` (relative to the base
    /// directory) and stores every name that resolves. Returns the
    /// effective path of the document.
    ///
    /// A missing or malformed document is logged and contributes nothing.
    /// Only an unsupported `version` is reported as an error.
    pub fn initialize(&self, mapping_file: impl AsRef<Path>) -> Result<PathBuf, CloudEnvError> {
        let path = self.mapping_path(mapping_file.as_ref());

        let document = match MappingDocument::from_path(&path) {
            Ok(document) => document,
            Err(e @ CloudEnvError::UnsupportedVersion(_)) => return Err(e),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot load mapping document");
                MappingDocument::default()
            }
        };

        let ctx = SourceContext::new(&self.base_dir, &*self.env);
        let resolved = MappingLoader::new(ctx).load(&document);
        self.merge(resolved);

        Ok(path)
    }

    fn mapping_path(&self, mapping_file: &Path) -> PathBuf {
        match mapping_file.to_str() {
            Some(s) => self.base_dir.join(strip_leading_separator(s)),
            None => self.base_dir.join(mapping_file),
        }
    }

    fn merge(&self, resolved: IndexMap<String, ResolvedValue>) {
        let mut table = self.write();
        for (name, value) in resolved {
            if let (Some(ResolvedValue::Group(existing)), ResolvedValue::Group(members)) =
                (table.get_mut(&name), &value)
            {
                existing.extend(members.clone());
                continue;
            }
            table.insert(name, value);
        }
    }

    /// The value stored under `name`; version 2 groups come back as JSON
    /// object text.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.read().get(name).map(ResolvedValue::to_text)
    }

    /// The value stored under `name` as JSON.
    ///
    /// Values that are valid JSON text are returned parsed. Anything else,
    /// including a missing name, is wrapped as `{"value": ...}` so callers
    /// can always index into `value`.
    pub fn get_dictionary(&self, name: &str) -> Value {
        let Some(value) = self.read().get(name).map(ResolvedValue::to_json) else {
            warn!(mapping = %name, "mapping does not exist");
            return json!({ "value": "" });
        };

        match value {
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed) => parsed,
                Err(_) => json!({ "value": text }),
            },
            structured => structured,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Resolved names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A copy of the current table.
    pub fn snapshot(&self) -> HashMap<String, ResolvedValue> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ResolvedValue>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ResolvedValue>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}
