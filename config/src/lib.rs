//! cloudenv
//!
//! Resolves named configuration values from a prioritized list of sources,
//! driven by a JSON mapping document.
//!
//! # Search patterns
//!
//! Each mapping lists `searchPatterns`; the first one that resolves wins.
//!
//! - `file:/path[:jsonpath]` - a file under the base directory
//! - `env:NAME[:jsonpath]` - an environment variable
//! - `cloudfoundry:$.jsonpath` - a query over `VCAP_SERVICES`, then `VCAP_APPLICATION`
//! - `cloudfoundry:instance` - credentials of a bound service instance
//! - `user-provided:instance:key` - a key anywhere inside a user-provided service
//!
//! # Example Mapping (version 1)
//!
//! ```json
//! {
//!   "db_password": {
//!     "searchPatterns": [
//!       "user-provided:postgres:password",
//!       "env:DB_PASSWORD",
//!       "file:/secrets/db.json:$.password"
//!     ]
//!   }
//! }
//! ```
//!
//! Version 2 documents (`"version": 2`) add one level of sub-keys per
//! mapping; resolved sub-keys are merged into a single JSON object.

#![allow(missing_docs)]

mod credentials;
mod error;
pub mod extract;
mod loader;
pub mod pattern;
pub mod source;
mod store;
mod types;

use std::path::Path;

pub use credentials::get_credentials_for_service;
pub use error::{CloudEnvError, PatternError, ResolveError, ResolveResult};
pub use loader::MappingLoader;
pub use pattern::{CloudFoundryTarget, SearchPattern};
pub use source::{Environment, MapEnv, ProcessEnv, SourceContext};
pub use store::CloudEnv;
pub use types::*;

/// Resolve a mapping document against the process environment and the
/// current working directory.
pub fn initialize(mapping_file: impl AsRef<Path>) -> Result<CloudEnv, CloudEnvError> {
    let env = CloudEnv::new();
    env.initialize(mapping_file)?;
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_with_missing_document_is_empty() {
        let env = initialize("/cloudenv-no-such-mapping-file.json").unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn parse_version_two_document() {
        let doc: MappingDocument = r#"{
            "version": 2,
            "var1": {
                "file_var1": {"searchPatterns": ["file:/x.txt"]},
                "cf_var1": {"searchPatterns": ["cloudfoundry:service1-name1"]}
            }
        }"#
        .parse()
        .unwrap();
        assert_eq!(doc.version, SchemaVersion::V2);
        assert_eq!(doc.mappings["var1"].as_object().map(|m| m.len()), Some(2));
    }
}
