//! Follow-up copy obligations for static frameworks.
//!
//! A static framework cannot carry its resources into the app by itself; an
//! external packaging step copies them after the app is linked. Each static
//! framework link registers its copy task against one entry-point task per
//! (platform, configuration). Registration is idempotent: asking for the same
//! key again returns the existing task.

use crate::bundler::{
    BuildConfiguration, Platform,
    error::{Error, ErrorExt, Result},
    utils::lock::FileLock,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Base name of the entry-point task the packaging step runs.
pub const ENTRY_POINT_TASK_NAME: &str = "copyFrameworkResourcesToApp";

/// Identifies one follow-up entry point.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FollowUpKey {
    /// Target platform of the framework.
    pub platform: Platform,
    /// Build configuration of the framework.
    pub configuration: BuildConfiguration,
}

impl FollowUpKey {
    /// Creates a key.
    pub fn new(platform: Platform, configuration: BuildConfiguration) -> Self {
        Self {
            platform,
            configuration,
        }
    }

    /// Entry-point task name for this key, e.g. `copyFrameworkResourcesToAppReleaseIosArm64`.
    pub fn task_name(&self) -> String {
        format!(
            "{ENTRY_POINT_TASK_NAME}{}{}",
            self.configuration,
            self.platform.task_suffix()
        )
    }
}

/// An entry-point follow-up task and the copy tasks it depends on.
#[derive(Debug)]
pub struct FollowUpTask {
    key: FollowUpKey,
    depends_on: Mutex<BTreeSet<String>>,
}

impl FollowUpTask {
    fn new(key: FollowUpKey) -> Self {
        Self {
            key,
            depends_on: Mutex::new(BTreeSet::new()),
        }
    }

    fn dependencies_guard(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.depends_on.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The key this task was registered under.
    pub fn key(&self) -> FollowUpKey {
        self.key
    }

    /// Task name.
    pub fn name(&self) -> String {
        self.key.task_name()
    }

    /// Records a dependency. Returns `false` if it was already recorded.
    pub fn depends_on(&self, task_id: impl Into<String>) -> bool {
        self.dependencies_guard().insert(task_id.into())
    }

    /// Dependencies in sorted order.
    pub fn dependencies(&self) -> Vec<String> {
        self.dependencies_guard().iter().cloned().collect()
    }
}

/// Serialized form of one registry entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FollowUpEntry {
    /// Target platform.
    pub platform: Platform,
    /// Build configuration.
    pub configuration: BuildConfiguration,
    /// Entry-point task name.
    pub task: String,
    /// Copy tasks the entry point depends on.
    pub depends_on: Vec<String>,
}

/// Registry of follow-up entry points, at most one per (platform, configuration).
#[derive(Debug, Default)]
pub struct FollowUpRegistry {
    tasks: Mutex<BTreeMap<FollowUpKey, Arc<FollowUpTask>>>,
}

impl FollowUpRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn tasks_guard(&self) -> MutexGuard<'_, BTreeMap<FollowUpKey, Arc<FollowUpTask>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the task for `key`, creating it on first use.
    pub fn register(&self, key: FollowUpKey) -> Arc<FollowUpTask> {
        let mut tasks = self.tasks_guard();
        Arc::clone(tasks.entry(key).or_insert_with(|| {
            log::debug!("Registered follow-up task {}", key.task_name());
            Arc::new(FollowUpTask::new(key))
        }))
    }

    /// Returns the task for `key` if registered.
    pub fn get(&self, key: FollowUpKey) -> Option<Arc<FollowUpTask>> {
        self.tasks_guard().get(&key).cloned()
    }

    /// Number of registered entry points.
    pub fn len(&self) -> usize {
        self.tasks_guard().len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.tasks_guard().is_empty()
    }

    /// Entries sorted by key.
    pub fn snapshot(&self) -> Vec<FollowUpEntry> {
        self.tasks_guard()
            .values()
            .map(|task| FollowUpEntry {
                platform: task.key.platform,
                configuration: task.key.configuration,
                task: task.name(),
                depends_on: task.dependencies(),
            })
            .collect()
    }

    /// Rebuilds a registry from serialized entries, merging duplicates.
    pub fn from_entries(entries: impl IntoIterator<Item = FollowUpEntry>) -> Self {
        let registry = Self::new();
        registry.merge_entries(entries);
        registry
    }

    fn merge_entries(&self, entries: impl IntoIterator<Item = FollowUpEntry>) {
        for entry in entries {
            let task = self.register(FollowUpKey::new(entry.platform, entry.configuration));
            for dependency in entry.depends_on {
                task.depends_on(dependency);
            }
        }
    }

    /// Loads a registry persisted by [`FollowUpRegistry::save`].
    ///
    /// A missing file yields an empty registry.
    pub async fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_entries(read_entries(path).await?))
    }

    /// Merges the registry into the JSON file at `path`.
    ///
    /// Entries already in the file are kept and folded into `self`, so
    /// processes saving the same file concurrently accumulate instead of
    /// overwriting each other. The read-merge-write cycle runs under an
    /// exclusive lock on `<path>.lock`, and the file is replaced in one
    /// rename.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating follow-up registry directory", parent)?;

        let mut lock_path = path.as_os_str().to_os_string();
        lock_path.push(".lock");
        let _lock = FileLock::acquire(Path::new(&lock_path)).await?;

        self.merge_entries(read_entries(path).await?);

        let json = serde_json::to_vec_pretty(&self.snapshot()).map_err(|error| Error::Json {
            path: path.to_path_buf(),
            error,
        })?;

        let staged = tempfile::Builder::new()
            .prefix(".follow-ups-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .fs_context("creating follow-up registry", parent)?;
        tokio::fs::write(staged.path(), json)
            .await
            .fs_context("writing follow-up registry", staged.path())?;
        staged
            .persist(path)
            .map_err(|e| e.error)
            .fs_context("replacing follow-up registry", path)?;
        Ok(())
    }
}

async fn read_entries(path: &Path) -> Result<Vec<FollowUpEntry>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).fs_context("reading follow-up registry", path),
    };

    serde_json::from_slice(&bytes).map_err(|error| Error::Json {
        path: path.to_path_buf(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn release_arm64() -> FollowUpKey {
        FollowUpKey::new(Platform::IosArm64, BuildConfiguration::Release)
    }

    #[test]
    fn register_returns_existing_task() {
        let registry = FollowUpRegistry::new();
        let first = registry.register(release_arm64());
        let second = registry.register(release_arm64());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_keys_get_distinct_tasks() {
        let registry = FollowUpRegistry::new();
        registry.register(release_arm64());
        registry.register(FollowUpKey::new(Platform::IosArm64, BuildConfiguration::Debug));
        registry.register(FollowUpKey::new(Platform::IosX64, BuildConfiguration::Release));

        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let task = FollowUpRegistry::new().register(release_arm64());
        assert!(task.depends_on("copyResourcesReleaseFrameworkIosArm64"));
        assert!(!task.depends_on("copyResourcesReleaseFrameworkIosArm64"));
        assert_eq!(task.dependencies().len(), 1);
    }

    #[test]
    fn task_name_includes_configuration_and_platform() {
        assert_eq!(
            release_arm64().task_name(),
            "copyFrameworkResourcesToAppReleaseIosArm64"
        );
    }

    #[tokio::test]
    async fn save_and_load_accumulate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state/follow-ups.json");

        let registry = FollowUpRegistry::load(&path).await.unwrap();
        assert!(registry.is_empty());
        registry.register(release_arm64()).depends_on("copyResourcesA");
        registry.save(&path).await.unwrap();

        let reloaded = FollowUpRegistry::load(&path).await.unwrap();
        reloaded.register(release_arm64()).depends_on("copyResourcesB");
        reloaded.save(&path).await.unwrap();

        let entries = FollowUpRegistry::load(&path).await.unwrap().snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].depends_on, ["copyResourcesA", "copyResourcesB"]);
        assert_eq!(entries[0].task, "copyFrameworkResourcesToAppReleaseIosArm64");
    }

    #[tokio::test]
    async fn corrupt_registry_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("follow-ups.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = FollowUpRegistry::load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert!(err.to_string().contains("follow-ups.json"));
    }

    #[tokio::test]
    async fn save_keeps_entries_written_by_others() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("follow-ups.json");

        let first = FollowUpRegistry::new();
        first.register(release_arm64()).depends_on("copyResourcesA");
        let second = FollowUpRegistry::new();
        second
            .register(FollowUpKey::new(Platform::IosX64, BuildConfiguration::Debug))
            .depends_on("copyResourcesB");

        first.save(&path).await.unwrap();
        second.save(&path).await.unwrap();

        assert_eq!(FollowUpRegistry::load(&path).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_lose_no_dependencies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("follow-ups.json");

        let saves: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                tokio::spawn(async move {
                    let registry = FollowUpRegistry::load(&path).await?;
                    registry
                        .register(release_arm64())
                        .depends_on(format!("copyResourcesReleaseFrameworkIosArm64Module{i}"));
                    registry.save(&path).await
                })
            })
            .collect();
        for save in saves {
            save.await.unwrap().unwrap();
        }

        let entries = FollowUpRegistry::load(&path).await.unwrap().snapshot();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].depends_on.len(), 8);
    }
}
