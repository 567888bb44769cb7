mod common;

use std::fs;

use cloudenv::{CloudEnv, MapEnv};
use common::load;
use tempfile::TempDir;

const MAPPINGS: &str = "server/config/mappings.json";

#[test]
fn unversioned_document_is_version_one() {
    let env = load(MAPPINGS);
    assert_eq!(env.get_string("file_var1").as_deref(), Some("plain-text-string"));
    assert_eq!(env.get_dictionary("file_var2")["level2"], 12345);
    assert_eq!(env.get_string("cf_var2").as_deref(), Some("service1-username1"));
    assert_eq!(env.get_string("cf_var3").as_deref(), Some("test-application"));
    assert_eq!(env.get_string("env_var3").as_deref(), Some("env-var-json-username"));
    assert_eq!(env.len(), 7);
}

#[test]
fn file_patterns_follow_the_base_dir() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("conf/token.txt"), "s3cr3t").unwrap();
    fs::write(
        dir.path().join("conf/mappings.json"),
        r#"{"token": {"searchPatterns": ["file:/conf/token.txt"]}}"#,
    )
    .unwrap();

    let env = CloudEnv::new()
        .with_base_dir(dir.path())
        .with_environment(MapEnv::new());
    env.initialize("conf/mappings.json").unwrap();
    assert_eq!(env.get_string("token").as_deref(), Some("s3cr3t"));
}

#[test]
fn platform_variables_absent() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("mappings.json"),
        r#"{
            "cf": {"searchPatterns": ["cloudfoundry:$.application_name"]},
            "up": {"searchPatterns": ["user-provided:svc:apikey"]}
        }"#,
    )
    .unwrap();

    let env = CloudEnv::new()
        .with_base_dir(dir.path())
        .with_environment(MapEnv::new());
    env.initialize("mappings.json").unwrap();
    assert!(env.is_empty());
}
