//! In-memory collaborators shared by the routing integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use notify_core::{Recipients, ResolverSettings, TransportError};
use notify_routing::{ChangeBuilder, ContentReader, Dispatcher, MessagePayload, MessageSender, Notifier};
use tempfile::TempDir;

pub const RULE_FILE: &str = ".action-notify-on-change.yaml";

/// Rule files keyed by repository path, with optional per-path latency.
#[derive(Default)]
pub struct FakeRepo {
    files: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    broken: Option<String>,
    pub fetches: Mutex<Vec<String>>,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule file for `dir` (`""` for the repository root).
    pub fn rule(mut self, dir: &str, yaml: &str) -> Self {
        self.files.insert(rule_path(dir), yaml.to_string());
        self
    }

    pub fn delay(mut self, dir: &str, millis: u64) -> Self {
        self.delays.insert(rule_path(dir), Duration::from_millis(millis));
        self
    }

    /// Make every fetch of `dir`'s rule file fail.
    pub fn broken(mut self, dir: &str) -> Self {
        self.broken = Some(rule_path(dir));
        self
    }
}

pub fn rule_path(dir: &str) -> String {
    if dir.is_empty() {
        RULE_FILE.to_string()
    } else {
        format!("{dir}/{RULE_FILE}")
    }
}

#[async_trait]
impl ContentReader for FakeRepo {
    async fn get_contents(
        &self,
        path: &str,
        _revision: &str,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        self.fetches.lock().expect("lock").push(path.to_string());
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        if self.broken.as_deref() == Some(path) {
            return Err(TransportError::Status {
                target: path.to_string(),
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.files.get(path).map(|s| s.clone().into_bytes()))
    }
}

/// Records every message instead of delivering it.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(String, MessagePayload, Recipients)>>,
}

impl RecordingSender {
    pub fn destinations(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .sent
            .lock()
            .expect("lock")
            .iter()
            .map(|(d, _, _)| d.clone())
            .collect();
        out.sort();
        out
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(
        &self,
        destination: &str,
        payload: &MessagePayload,
        recipients: &Recipients,
    ) -> Result<(), TransportError> {
        self.sent.lock().expect("lock").push((
            destination.to_string(),
            payload.clone(),
            recipients.clone(),
        ));
        Ok(())
    }
}

/// A workspace whose root carries the stop marker.
pub fn workspace() -> TempDir {
    let dir = TempDir::new().expect("workspace");
    fs::create_dir_all(dir.path().join(".git")).expect("marker");
    dir
}

pub struct Harness {
    pub workspace: TempDir,
    pub repo: Arc<FakeRepo>,
    pub sender: Arc<RecordingSender>,
    pub notifier: Notifier,
}

pub fn harness(repo: FakeRepo) -> Harness {
    let workspace = workspace();
    let repo = Arc::new(repo);
    let sender = Arc::new(RecordingSender::default());
    let builder = ChangeBuilder::new(repo.clone(), ResolverSettings::new(workspace.path()));
    let notifier = Notifier::new(builder, Dispatcher::new(sender.clone()));
    Harness {
        workspace,
        repo,
        sender,
        notifier,
    }
}

pub fn files(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
