//! Search pattern grammar: `prefix:argument[:selector]`.
//!
//! | prefix          | argument              | selector                 |
//! |-----------------|-----------------------|--------------------------|
//! | `file`          | path under base dir   | optional JSONPath        |
//! | `env`           | variable name         | optional JSONPath        |
//! | `cloudfoundry`  | JSONPath or instance  | -                        |
//! | `user-provided` | instance name         | credential key, required |

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{PatternError, ResolveError, ResolveResult};
use crate::extract;
use crate::source::{SourceContext, VCAP_APPLICATION, VCAP_SERVICES};

pub const PREFIX_FILE: &str = "file";
pub const PREFIX_ENV: &str = "env";
pub const PREFIX_CLOUDFOUNDRY: &str = "cloudfoundry";
pub const PREFIX_USER_PROVIDED: &str = "user-provided";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPattern {
    File {
        path: String,
        json_path: Option<String>,
    },
    Env {
        name: String,
        json_path: Option<String>,
    },
    CloudFoundry(CloudFoundryTarget),
    UserProvided {
        service: String,
        credential_key: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudFoundryTarget {
    /// Queried against `VCAP_SERVICES`, then `VCAP_APPLICATION`.
    JsonPath(String),
    /// A bound service instance whose credentials are returned.
    ServiceInstance(String),
}

impl FromStr for SearchPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let prefix = parts.next().unwrap_or_default();
        let argument = parts.next().filter(|a| !a.is_empty());
        let selector = parts.next().map(str::to_string);

        let missing = |argument: &'static str| PatternError::MissingArgument {
            pattern: s.to_string(),
            argument,
        };

        match prefix {
            PREFIX_FILE => Ok(Self::File {
                path: argument.ok_or_else(|| missing("file path"))?.to_string(),
                json_path: selector,
            }),
            PREFIX_ENV => Ok(Self::Env {
                name: argument.ok_or_else(|| missing("variable name"))?.to_string(),
                json_path: selector,
            }),
            PREFIX_CLOUDFOUNDRY => {
                let argument = argument.ok_or_else(|| missing("JSONPath or service name"))?;
                let target = if argument.starts_with('$') {
                    CloudFoundryTarget::JsonPath(argument.to_string())
                } else {
                    CloudFoundryTarget::ServiceInstance(argument.to_string())
                };
                Ok(Self::CloudFoundry(target))
            }
            PREFIX_USER_PROVIDED => Ok(Self::UserProvided {
                service: argument.ok_or_else(|| missing("service name"))?.to_string(),
                credential_key: selector
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| missing("credential key"))?,
            }),
            other => Err(PatternError::UnknownPrefix(other.to_string())),
        }
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, json_path } => {
                write!(f, "{PREFIX_FILE}:{path}")?;
                json_path.iter().try_for_each(|p| write!(f, ":{p}"))
            }
            Self::Env { name, json_path } => {
                write!(f, "{PREFIX_ENV}:{name}")?;
                json_path.iter().try_for_each(|p| write!(f, ":{p}"))
            }
            Self::CloudFoundry(CloudFoundryTarget::JsonPath(arg))
            | Self::CloudFoundry(CloudFoundryTarget::ServiceInstance(arg)) => {
                write!(f, "{PREFIX_CLOUDFOUNDRY}:{arg}")
            }
            Self::UserProvided {
                service,
                credential_key,
            } => write!(f, "{PREFIX_USER_PROVIDED}:{service}:{credential_key}"),
        }
    }
}

impl SearchPattern {
    pub fn resolve(&self, ctx: &SourceContext<'_>) -> ResolveResult<String> {
        match self {
            Self::File { path, json_path } => resolve_file(ctx, path, json_path.as_deref()),
            Self::Env { name, json_path } => resolve_env(ctx, name, json_path.as_deref()),
            Self::CloudFoundry(target) => resolve_cloudfoundry(ctx, target),
            Self::UserProvided {
                service,
                credential_key,
            } => resolve_user_provided(ctx, service, credential_key),
        }
    }
}

/// Parses and resolves a raw pattern string in one step.
pub fn resolve(raw: &str, ctx: &SourceContext<'_>) -> ResolveResult<String> {
    raw.parse::<SearchPattern>()?.resolve(ctx)
}

fn resolve_file(
    ctx: &SourceContext<'_>,
    fragment: &str,
    json_path: Option<&str>,
) -> ResolveResult<String> {
    let full_path = ctx.resolve_path(fragment);
    let content = std::fs::read_to_string(&full_path)
        .map_err(|e| ResolveError::unavailable(format!("{}: {e}", full_path.display())))?;

    match json_path {
        Some(path) => extract::extract(&content, path),
        None => Ok(content),
    }
}

fn resolve_env(
    ctx: &SourceContext<'_>,
    name: &str,
    json_path: Option<&str>,
) -> ResolveResult<String> {
    let value = ctx
        .var(name)
        .ok_or_else(|| ResolveError::unavailable(format!("environment variable {name} is not set")))?;

    match json_path {
        Some(path) => extract::extract(&value, path),
        None => Ok(value),
    }
}

fn resolve_cloudfoundry(
    ctx: &SourceContext<'_>,
    target: &CloudFoundryTarget,
) -> ResolveResult<String> {
    let services = ctx.var(VCAP_SERVICES);
    let application = ctx.var(VCAP_APPLICATION);
    if services.is_none() && application.is_none() {
        return Err(ResolveError::unavailable(format!(
            "neither {VCAP_SERVICES} nor {VCAP_APPLICATION} is set"
        )));
    }

    match target {
        CloudFoundryTarget::JsonPath(path) => {
            let from_services = services
                .as_deref()
                .ok_or_else(|| ResolveError::unavailable(VCAP_SERVICES))
                .and_then(|text| extract::extract(text, path));

            from_services.or_else(|err| {
                debug!(json_path = %path, error = %err, "falling back to {}", VCAP_APPLICATION);
                application
                    .as_deref()
                    .ok_or_else(|| ResolveError::unavailable(VCAP_APPLICATION))
                    .and_then(|text| extract::extract(text, path))
            })
        }
        CloudFoundryTarget::ServiceInstance(name) => {
            let text = services.ok_or_else(|| ResolveError::unavailable(VCAP_SERVICES))?;
            let tree = extract::parse(&text)?;
            extract::find_service_instance(&tree, name)
                .and_then(|instance| instance.get("credentials"))
                .map(extract::normalize)
                .ok_or_else(|| {
                    ResolveError::not_found(format!("credentials for service instance {name}"))
                })
        }
    }
}

fn resolve_user_provided(
    ctx: &SourceContext<'_>,
    service: &str,
    credential_key: &str,
) -> ResolveResult<String> {
    let text = ctx
        .var(VCAP_SERVICES)
        .ok_or_else(|| ResolveError::unavailable(VCAP_SERVICES))?;
    let tree = extract::parse(&text)?;

    let instance = extract::find_in_service_type(&tree, PREFIX_USER_PROVIDED, service)
        .ok_or_else(|| ResolveError::not_found(format!("user-provided service {service}")))?;

    extract::deep_search(instance, credential_key)
        .map(extract::normalize)
        .ok_or_else(|| {
            ResolveError::not_found(format!("key {credential_key} in user-provided service {service}"))
        })
}
