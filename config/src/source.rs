use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Bound service credentials, keyed by service type.
pub const VCAP_SERVICES: &str = "VCAP_SERVICES";

/// Metadata describing the running application.
pub const VCAP_APPLICATION: &str = "VCAP_APPLICATION";

/// Read access to environment variables.
pub trait Environment: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.remove(name)
    }
}

impl Environment for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Everything a search pattern may read from.
pub struct SourceContext<'a> {
    pub base_dir: &'a Path,
    pub env: &'a dyn Environment,
}

impl<'a> SourceContext<'a> {
    pub fn new(base_dir: &'a Path, env: &'a dyn Environment) -> Self {
        Self { base_dir, env }
    }

    pub fn var(&self, name: &str) -> Option<String> {
        self.env.var(name)
    }

    /// Joins a path fragment onto the base directory. A leading separator
    /// on the fragment is ignored so that `/a.txt` stays under the base.
    pub fn resolve_path(&self, fragment: &str) -> PathBuf {
        self.base_dir.join(strip_leading_separator(fragment))
    }
}

pub(crate) fn strip_leading_separator(path: &str) -> &str {
    path.strip_prefix(['/', '\\']).unwrap_or(path)
}
