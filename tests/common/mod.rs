#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// A temporary allure-results directory
pub struct ResultsDir {
    pub temp_dir: TempDir,
}

impl ResultsDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub async fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        self.write_raw(name, &serde_json::to_string(value)?).await
    }

    pub async fn write_raw(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, contents).await?;
        Ok(path)
    }

    pub async fn read_raw(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.file(name)).await?)
    }

    pub async fn read_json(&self, name: &str) -> Result<Value> {
        Ok(serde_json::from_str(&self.read_raw(name).await?)?)
    }
}

/// The checkout scenario: two business steps, the second one only skipped work.
pub fn checkout_result() -> Value {
    json!({
        "uuid": "6b7c0e0a",
        "testCaseId": "tc-checkout",
        "name": "Customer checks out",
        "description": "Login then pay",
        "status": "failed",
        "statusDetails": {"message": "wrong password", "trace": "at LoginPage"},
        "stage": "finished",
        "steps": [
            {"name": "* business step 'Login'", "status": "passed", "start": 99, "stop": 99},
            {"name": "enter user", "status": "passed", "start": 100, "stop": 110},
            {"name": "enter pass", "status": "failed", "start": "110", "stop": "130.0"},
            {"name": "* Business Step \"Checkout\""},
            {"name": "pay", "status": "skipped", "start": 200, "stop": 205}
        ],
        "attachments": [
            {"name": "screenshot", "source": "shot.png", "type": "image/png"}
        ],
        "start": 90,
        "stop": 210
    })
}

/// A result whose steps carry no business step markers.
pub fn plain_result() -> Value {
    json!({
        "uuid": "0f3d",
        "name": "Health check",
        "status": "passed",
        "steps": [
            {"name": "ping", "status": "passed", "start": 1, "stop": 2},
            {"name": "pong", "status": "passed", "start": 2, "stop": 3}
        ]
    })
}
