#![allow(dead_code)]

use std::path::PathBuf;

use cloudenv::source::{VCAP_APPLICATION, VCAP_SERVICES};
use cloudenv::{CloudEnv, MapEnv};

pub const SERVICES: &str = r#"{
    "service1": [
        {
            "name": "service1-name1",
            "credentials": {
                "username": "service1-username1"
            }
        },
        {
            "name": "service1-name2",
            "credentials": {
                "username": "service1-username2"
            }
        }
    ],
    "user-provided": [
        {
            "credentials": {
                "apikey": "apikey1"
            },
            "name": "servicename1"
        },
        {
            "credentials": {
                "writer": {
                    "apikey": "apikey2"
                }
            },
            "name": "servicename2"
        },
        {
            "credentials": {
                "apikey": "apikey3",
                "nestedCreds": {
                    "nestedKey1": "nestedValue1",
                    "nestedKey2": {
                        "nestedKey3": "nestedValue3"
                    }
                }
            },
            "name": "servicename3"
        }
    ]
}"#;

pub const APPLICATION: &str = r#"{"application_name": "test-application"}"#;

pub const ENV_VAR_JSON: &str = r#"{"credentials": {
        "username": "env-var-json-username"
    }}"#;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn platform_env() -> MapEnv {
    MapEnv::new()
        .with(VCAP_SERVICES, SERVICES)
        .with(VCAP_APPLICATION, APPLICATION)
        .with("ENV_VAR_STRING", "test-12345")
        .with("ENV_VAR_JSON", ENV_VAR_JSON)
}

/// A store over the fixture tree, initialized the way an application
/// would: a bogus document first, then the real one.
pub fn load(mappings: &str) -> CloudEnv {
    let env = CloudEnv::new()
        .with_base_dir(fixtures_dir())
        .with_environment(platform_env());
    env.initialize("/invalid-file-name").unwrap();
    env.initialize(mappings).unwrap();
    env
}
