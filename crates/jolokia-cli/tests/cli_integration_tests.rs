#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI integration tests
//!
//! These tests run the `jolokia` binary against a fixture file and check the
//! printed response envelope.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const FIXTURE: &str = r#"{
  "mbeans": [
    {
      "name": "java.lang:type=Memory",
      "info": {
        "className": "sun.management.MemoryImpl",
        "description": "Memory system",
        "attributes": [
          {"name": "Verbose", "type": "boolean", "writable": true},
          {"name": "ObjectPendingFinalizationCount", "type": "int"}
        ],
        "operations": [{"name": "gc", "returnType": "void"}]
      },
      "attributes": {"Verbose": false, "ObjectPendingFinalizationCount": 0},
      "interfaces": ["java.lang.management.MemoryMXBean"]
    },
    {
      "name": "java.lang:type=MemoryPool,name=Eden Space",
      "info": {
        "className": "sun.management.MemoryPoolImpl",
        "attributes": [{"name": "Name", "type": "java.lang.String"}]
      },
      "attributes": {"Name": "Eden Space"}
    },
    {
      "name": "java.lang:type=MemoryPool,name=Old Gen",
      "info": {
        "className": "sun.management.MemoryPoolImpl",
        "attributes": [{"name": "Name", "type": "java.lang.String"}]
      },
      "attributes": {"Name": "Old Gen"}
    }
  ]
}"#;

fn setup(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("fixture.json");
    fs::write(&path, FIXTURE).unwrap();
    path
}

fn run(fixture: &PathBuf, args: &[&str]) -> (Output, Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_jolokia"))
        .arg(fixture)
        .args(args)
        .output()
        .expect("Failed to execute CLI");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let envelope = serde_json::from_str(&stdout).unwrap_or(Value::Null);
    (output, envelope)
}

#[test]
fn test_cli_list_path() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (output, envelope) = run(&fixture, &["list", "--path", "java.lang/type=Memory/op"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(envelope["status"], 200);
    assert_eq!(envelope["value"]["gc"]["ret"], "void");
}

#[test]
fn test_cli_list_cache_and_depth() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (_, cached) = run(&fixture, &["list", "--cache"]);
    assert_eq!(
        cached["value"]["domains"]["java.lang"]["name=Old Gen,type=MemoryPool"],
        "java.lang:type=MemoryPool"
    );

    let (_, shallow) = run(&fixture, &["list", "--max-depth", "1"]);
    assert_eq!(shallow["value"], serde_json::json!({"java.lang": 1}));
}

#[test]
fn test_cli_list_interfaces() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (_, envelope) = run(
        &fixture,
        &["list", "--interfaces", "--path", "java.lang/type=Memory/interfaces"],
    );
    assert_eq!(
        envelope["value"],
        serde_json::json!(["java.lang.management.MemoryMXBean"])
    );
}

#[test]
fn test_cli_read_and_write() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (_, read) = run(&fixture, &["read", "java.lang:type=MemoryPool,*", "Name"]);
    assert_eq!(read["value"].as_object().unwrap().len(), 2);

    let (output, written) = run(&fixture, &["write", "java.lang:type=Memory", "Verbose", "true"]);
    assert!(output.status.success());
    assert_eq!(written["value"], false);
}

#[test]
fn test_cli_search_and_exec() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (_, found) = run(&fixture, &["search", "*:type=MemoryPool,*"]);
    assert_eq!(found["value"].as_array().unwrap().len(), 2);

    let (output, invoked) = run(&fixture, &["exec", "java.lang:type=Memory", "gc"]);
    assert!(output.status.success());
    assert_eq!(invoked["value"], Value::Null);
}

#[test]
fn test_cli_error_envelope_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);

    let (output, envelope) = run(&fixture, &["read", "java.lang:type=Missing"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(envelope["status"], 404);
    assert_eq!(envelope["error_type"], "ERR_INSTANCE_NOT_FOUND");
}

#[test]
fn test_cli_policy_file() {
    let temp_dir = TempDir::new().unwrap();
    let fixture = setup(&temp_dir);
    let policy = temp_dir.path().join("policy.toml");
    fs::write(
        &policy,
        "[[rules]]\nmbean = \"java.lang:type=Memory\"\ndenyWrite = [\"*\"]\n",
    )
    .unwrap();

    let (_, envelope) = run(
        &fixture,
        &[
            "--policy",
            policy.to_str().unwrap(),
            "write",
            "java.lang:type=Memory",
            "Verbose",
            "true",
        ],
    );
    assert_eq!(envelope["status"], 403);
}

#[test]
fn test_cli_missing_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.json");

    let (output, _) = run(&missing, &["list"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read fixture"));
}
