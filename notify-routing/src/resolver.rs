//! Ancestor walk and concurrent rule-file loading for one changed path.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use notify_core::{ResolverSettings, RuleFile};

use crate::error::RoutingError;
use crate::fan_out;
use crate::node::{display_path, ConfigChain, ConfigNode};
use crate::transport::ContentReader;

/// Builds a [`ConfigChain`] per changed path, reading rule files at one
/// fixed revision. Cheap to clone.
#[derive(Clone)]
pub struct ConfigResolver {
    reader: Arc<dyn ContentReader>,
    settings: Arc<ResolverSettings>,
    revision: Arc<str>,
}

impl ConfigResolver {
    pub fn new(
        reader: Arc<dyn ContentReader>,
        settings: Arc<ResolverSettings>,
        revision: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            reader,
            settings,
            revision: revision.into(),
        }
    }

    /// Directories to consult for `path`, innermost (the path itself) first.
    ///
    /// Ascent stops after the first directory containing the stop marker, or
    /// when there is no parent left.
    pub async fn levels(&self, path: &str) -> Vec<PathBuf> {
        let mut levels = Vec::new();
        let mut current = normalize(path);
        loop {
            levels.push(current.clone());
            if self.has_stop_marker(&current).await {
                break;
            }
            match current.parent() {
                Some(parent) if parent != current => current = parent.to_path_buf(),
                _ => break,
            }
        }
        levels
    }

    /// Fetch every level concurrently and link the results into a chain.
    ///
    /// Any level failing fails the whole resolution; the other fetches are
    /// cancelled.
    pub async fn resolve(&self, path: &str) -> Result<ConfigChain, RoutingError> {
        let levels = self.levels(path).await;
        debug!(path, levels = levels.len(), "resolving rule chain");

        let nodes = fan_out::ordered(levels, |level, directory| {
            let resolver = self.clone();
            async move { resolver.load_level(level, directory).await }
        })
        .await?;

        Ok(ConfigChain::from_levels(display_path(&normalize(path)), nodes))
    }

    async fn load_level(&self, level: usize, directory: PathBuf) -> Result<ConfigNode, RoutingError> {
        let rule_path = directory.join(&self.settings.config_file_name);
        let key = display_path(&rule_path);
        let contents = self
            .reader
            .get_contents(&key, &self.revision)
            .await
            .map_err(|source| RoutingError::Fetch {
                path: rule_path.clone(),
                level,
                source,
            })?;

        let rule = match contents {
            Some(bytes) => {
                debug!(path = %key, level, "loaded rule file");
                RuleFile::parse(&rule_path, &bytes)
                    .map_err(|source| RoutingError::Config { level, source })?
            }
            None => {
                debug!(path = %key, level, "no rule file");
                RuleFile::default()
            }
        };
        Ok(ConfigNode::new(directory, rule_path, rule))
    }

    async fn has_stop_marker(&self, directory: &Path) -> bool {
        let marker = self
            .settings
            .workspace_root
            .join(directory)
            .join(&self.settings.stop_marker);
        match tokio::fs::try_exists(&marker).await {
            Ok(found) => found,
            Err(err) => {
                debug!(path = %marker.display(), error = %err, "stop marker probe failed");
                false
            }
        }
    }
}

/// Lexically clean a changed path: drop `.` segments and trailing
/// separators, fold `..` into its predecessor where one exists.
pub fn normalize(path: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use notify_core::{ChangeKind, TransportError};
    use tempfile::TempDir;

    use super::*;

    /// Serves rule files from memory; deeper paths answer faster so that
    /// completion order is the reverse of level order.
    #[derive(Default)]
    struct MemoryReader {
        files: HashMap<String, String>,
        failing: Option<String>,
        requested: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ContentReader for MemoryReader {
        async fn get_contents(
            &self,
            path: &str,
            revision: &str,
        ) -> Result<Option<Vec<u8>>, TransportError> {
            self.requested
                .lock()
                .expect("lock")
                .push((path.to_string(), revision.to_string()));
            let depth = path.matches('/').count() as u64;
            tokio::time::sleep(Duration::from_millis(100 - depth * 10)).await;
            if self.failing.as_deref() == Some(path) {
                return Err(TransportError::Status {
                    target: path.to_string(),
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(self.files.get(path).map(|s| s.clone().into_bytes()))
        }
    }

    fn workspace_with_git() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join(".git")).expect("mkdir .git");
        dir
    }

    fn resolver(reader: MemoryReader, root: &Path) -> (ConfigResolver, Arc<MemoryReader>) {
        let reader = Arc::new(reader);
        let resolver = ConfigResolver::new(
            reader.clone(),
            Arc::new(ResolverSettings::new(root)),
            "abc123",
        );
        (resolver, reader)
    }

    #[test]
    fn normalize_cleans_paths() {
        assert_eq!(normalize("./a//b/../c/"), PathBuf::from("a/c"));
        assert_eq!(normalize("a/b/f.txt"), PathBuf::from("a/b/f.txt"));
        assert_eq!(normalize("."), PathBuf::new());
        assert_eq!(normalize("../x"), PathBuf::from("../x"));
        assert_eq!(normalize("/a/../.."), PathBuf::from("/"));
    }

    #[tokio::test]
    async fn levels_stop_at_marker() {
        let ws = workspace_with_git();
        fs::create_dir_all(ws.path().join("a/.git")).expect("nested marker");
        let (resolver, _) = resolver(MemoryReader::default(), ws.path());
        assert_eq!(
            resolver.levels("a/b/f.txt").await,
            vec![
                PathBuf::from("a/b/f.txt"),
                PathBuf::from("a/b"),
                PathBuf::from("a"),
            ]
        );
    }

    #[tokio::test]
    async fn levels_include_workspace_root() {
        let ws = workspace_with_git();
        let (resolver, _) = resolver(MemoryReader::default(), ws.path());
        assert_eq!(
            resolver.levels("a/f.txt").await,
            vec![PathBuf::from("a/f.txt"), PathBuf::from("a"), PathBuf::new()]
        );
    }

    #[tokio::test]
    async fn levels_stop_at_fixed_point_without_marker() {
        let ws = TempDir::new().expect("tempdir");
        let (resolver, _) = resolver(MemoryReader::default(), ws.path());
        assert_eq!(resolver.levels("f.txt").await, vec![PathBuf::from("f.txt"), PathBuf::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn chain_is_in_level_order_despite_completion_order() {
        let ws = workspace_with_git();
        let reader = MemoryReader {
            files: HashMap::from([
                (
                    ".action-notify-on-change.yaml".to_string(),
                    "commit:\n  destination: '#root'\n  users: [r]\n".to_string(),
                ),
                (
                    "a/.action-notify-on-change.yaml".to_string(),
                    "commit:\n  users: [a]\n".to_string(),
                ),
                (
                    "a/b/.action-notify-on-change.yaml".to_string(),
                    "commit:\n  users: [b]\n".to_string(),
                ),
            ]),
            ..MemoryReader::default()
        };
        let (resolver, reader) = resolver(reader, ws.path());

        let chain = resolver.resolve("a/b/f.txt").await.expect("resolve");
        let dirs: Vec<_> = chain.nodes().iter().map(|n| n.directory.clone()).collect();
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("a/b/f.txt"),
                PathBuf::from("a/b"),
                PathBuf::from("a"),
                PathBuf::new(),
            ]
        );
        assert_eq!(chain.head().all_users(ChangeKind::Commit), vec!["b", "a", "r"]);
        assert_eq!(chain.head().destination(ChangeKind::Commit), "#root");

        let requested = reader.requested.lock().expect("lock");
        assert_eq!(requested.len(), 4);
        assert!(requested.iter().all(|(_, rev)| rev == "abc123"));
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_level_fails_the_resolution() {
        let ws = workspace_with_git();
        let reader = MemoryReader {
            failing: Some("a/.action-notify-on-change.yaml".to_string()),
            ..MemoryReader::default()
        };
        let (resolver, _) = resolver(reader, ws.path());

        let err = resolver.resolve("a/b/f.txt").await.unwrap_err();
        match err {
            RoutingError::Fetch { level, path, .. } => {
                assert_eq!(level, 2);
                assert_eq!(path, PathBuf::from("a/.action-notify-on-change.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_rule_file_is_a_config_error() {
        let ws = workspace_with_git();
        let reader = MemoryReader {
            files: HashMap::from([(
                "a/.action-notify-on-change.yaml".to_string(),
                "commit: [oops".to_string(),
            )]),
            ..MemoryReader::default()
        };
        let (resolver, _) = resolver(reader, ws.path());
        let err = resolver.resolve("a/f.txt").await.unwrap_err();
        assert!(matches!(err, RoutingError::Config { level: 1, .. }), "got: {err}");
    }

    #[tokio::test(start_paused = true)]
    async fn custom_file_name_is_used() {
        let ws = workspace_with_git();
        let reader = Arc::new(MemoryReader {
            files: HashMap::from([(
                "notify.yaml".to_string(),
                "pullRequest:\n  destination: '#custom'\n".to_string(),
            )]),
            ..MemoryReader::default()
        });
        let settings = ResolverSettings::new(ws.path()).with_config_file_name("notify.yaml");
        let resolver = ConfigResolver::new(reader, Arc::new(settings), "rev");
        let chain = resolver.resolve("./x.md").await.expect("resolve");
        assert_eq!(chain.changed_file(), "x.md");
        assert_eq!(chain.head().destination(ChangeKind::PullRequest), "#custom");
    }
}
