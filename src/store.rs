//! Persisted button configurations.
//!
//! The store is a JSON file mapping button ids to their last accepted
//! config. It is loaded at startup, updated on every config POST, and
//! optionally watched for external edits so a hand-edited file shows up in
//! connected viewers without a restart.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::protocol::ButtonConfig;

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON-file backed map of button id -> last accepted config.
#[derive(Debug)]
pub struct ButtonStore {
    /// Backing file
    path: PathBuf,
    /// Configs by button id
    configs: HashMap<String, ButtonConfig>,
}

impl ButtonStore {
    /// Load the store from `path`. A missing file yields an empty store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let configs = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, configs })
    }

    /// Write the current contents back to disk, pretty-printed.
    pub async fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.configs)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Insert or replace the config stored under its id.
    pub fn upsert(&mut self, config: ButtonConfig) {
        self.configs.insert(config.id.clone(), config);
    }

    /// Look up the stored config for a button id.
    pub fn get(&self, id: &str) -> Option<&ButtonConfig> {
        self.configs.get(id)
    }

    /// All stored configs by id.
    pub fn configs(&self) -> &HashMap<String, ButtonConfig> {
        &self.configs
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory contents with a fresh read of the file,
    /// returning the configs that are new or changed since the last load.
    pub async fn reload(&mut self) -> Result<Vec<ButtonConfig>, StoreError> {
        let fresh = Self::load(&self.path).await?;
        let changed = fresh
            .configs
            .values()
            .filter(|c| self.configs.get(&c.id) != Some(*c))
            .cloned()
            .collect();
        self.configs = fresh.configs;
        Ok(changed)
    }
}

// ============================================================================
// Store Hot-Reload
// ============================================================================

/// Watches the store file for external edits and signals when a reload is due.
pub struct StoreWatcher {
    /// The file watcher (kept alive to maintain watch)
    _watcher: RecommendedWatcher,
    /// Receiver for file change events
    receiver: Receiver<Result<Event, notify::Error>>,
    /// Name of the watched file within its directory
    file_name: Option<OsString>,
    /// Last time we detected a change (for debouncing)
    last_change: Option<Instant>,
    /// Debounce duration (ignore rapid successive changes)
    debounce: Duration,
    /// Whether a change is waiting for the debounce window to pass
    pending: bool,
}

impl StoreWatcher {
    /// Watch the directory containing `store_path` for changes to the file.
    ///
    /// The directory is watched rather than the file itself so that editors
    /// replacing the file atomically are still observed.
    pub fn new(store_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        let dir = store_path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.unwrap_or(Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        log::info!(
            "Button store hot-reload enabled, watching: {}",
            store_path.display()
        );

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_name: store_path.file_name().map(OsString::from),
            last_change: None,
            debounce: Duration::from_millis(200),
            pending: false,
        })
    }

    /// Poll for a debounced change to the store file.
    ///
    /// Returns true once per burst of changes, after the debounce window has
    /// passed. Returns false otherwise.
    pub fn poll(&mut self) -> bool {
        // Drain all pending events
        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    let matches = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == self.file_name.as_deref());
                    if matches {
                        self.last_change = Some(Instant::now());
                        self.pending = true;
                    }
                }
                Ok(Err(e)) => {
                    log::warn!("Store watcher error: {:?}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::error!("Store watcher channel disconnected");
                    break;
                }
            }
        }

        if self.pending {
            if let Some(last) = self.last_change {
                if last.elapsed() >= self.debounce {
                    self.pending = false;
                    self.last_change = None;
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Vec3Data;

    fn config(id: &str, scale: f32) -> ButtonConfig {
        ButtonConfig {
            id: id.to_string(),
            position: Vec3Data {
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            rotation: Vec3Data::default(),
            scale,
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ButtonStore::load(dir.path().join("button_config.json"))
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("button_config.json");

        let mut store = ButtonStore::load(&path).await.unwrap();
        store.upsert(config("exampleButton", 2.0));
        store.save().await.unwrap();

        let reloaded = ButtonStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("exampleButton"), Some(&config("exampleButton", 2.0)));
    }

    #[tokio::test]
    async fn test_upsert_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ButtonStore::load(dir.path().join("button_config.json"))
            .await
            .unwrap();

        store.upsert(config("exampleButton", 1.0));
        store.upsert(config("exampleButton", 2.0));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("exampleButton").unwrap().scale, 2.0);
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("button_config.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert!(matches!(
            ButtonStore::load(&path).await,
            Err(StoreError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_reload_reports_changed_configs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("button_config.json");

        let mut store = ButtonStore::load(&path).await.unwrap();
        store.upsert(config("a", 1.0));
        store.upsert(config("b", 1.0));
        store.save().await.unwrap();

        // Rewrite the file out of band: "a" changed, "b" unchanged, "c" new.
        let mut other = ButtonStore::load(&path).await.unwrap();
        other.upsert(config("a", 2.0));
        other.upsert(config("c", 1.0));
        other.save().await.unwrap();

        let mut changed = store.reload().await.unwrap();
        changed.sort_by(|x, y| x.id.cmp(&y.id));
        let ids: Vec<&str> = changed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.len(), 3);
    }
}
