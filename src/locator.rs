use futures::future;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

/// Default filename suffix marking a file as a component declaration site.
pub const DEFAULT_COMPONENT_SUFFIX: &str = ".component.ts";

/// Number of directories listed concurrently per traversal wave.
const DIRECTORY_BATCH_SIZE: usize = 50;

/// Configuration for component file discovery behavior
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Filename suffix a file must end with (exact, case-sensitive)
    pub component_suffix: String,
    /// Upper bound on directories listed concurrently in one wave
    pub batch_size: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            component_suffix: DEFAULT_COMPONENT_SUFFIX.to_string(),
            batch_size: DIRECTORY_BATCH_SIZE,
        }
    }
}

/// What a stat'ed directory entry turned out to be.
enum LocatedEntry {
    Subdirectory(PathBuf),
    ComponentFile(PathBuf),
    Other,
}

/// Finds every file under a root directory whose name ends with the
/// configured component suffix.
pub struct ComponentLocator {
    config: LocatorConfig,
}

impl ComponentLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Breadth-first traversal of `root_dir` driven by an explicit work
    /// queue, so arbitrarily deep trees never grow the call stack. The queue
    /// is drained in waves of at most `batch_size` directories; every
    /// directory in a wave is listed concurrently and the whole wave
    /// completes before the next one is dequeued.
    ///
    /// A directory whose listing fails is logged and contributes nothing;
    /// sibling and already-queued directories are unaffected.
    pub async fn locate(&self, root_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root_dir.as_ref();
        debug!("Starting component file discovery in: {}", root.display());

        let mut results = Vec::new();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();
        queue.push_back(root.to_path_buf());

        while !queue.is_empty() {
            let wave_len = queue.len().min(self.config.batch_size);
            let batch: Vec<PathBuf> = queue.drain(..wave_len).collect();

            let listings =
                future::join_all(batch.iter().map(|dir| self.list_directory(dir))).await;

            // Queue and result mutation happens here, on the coordinating
            // task, after the whole wave has settled.
            for (dir, listing) in batch.iter().zip(listings) {
                match listing {
                    Ok(entries) => {
                        for entry in entries {
                            match entry {
                                LocatedEntry::Subdirectory(path) => queue.push_back(path),
                                LocatedEntry::ComponentFile(path) => results.push(path),
                                LocatedEntry::Other => {}
                            }
                        }
                    }
                    Err(e) => {
                        error!("Error reading directory {}: {}", dir.display(), e);
                    }
                }
            }
        }

        info!(
            "Located {} component files under {}",
            results.len(),
            root.display()
        );
        results
    }

    /// Count of component files under `dir`; used for "N files checked"
    /// reporting when a run finds no duplicates.
    pub async fn file_count(&self, dir: impl AsRef<Path>) -> usize {
        self.locate(dir).await.len()
    }

    /// List one directory and classify each entry. Entries are stat'ed
    /// concurrently; a failed stat fails the directory as a whole, matching
    /// the per-directory failure policy of `locate`.
    async fn list_directory(&self, dir: &Path) -> std::io::Result<Vec<LocatedEntry>> {
        let mut read_dir = fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            paths.push(entry.path());
        }

        // fs::metadata follows symlinks, so a link to a directory is
        // traversed and a link to a matching file is collected.
        let stats = future::try_join_all(paths.iter().map(fs::metadata)).await?;

        let entries = paths
            .into_iter()
            .zip(stats)
            .map(|(path, stat)| {
                if stat.is_dir() {
                    LocatedEntry::Subdirectory(path)
                } else if stat.is_file() && self.matches_suffix(&path) {
                    LocatedEntry::ComponentFile(path)
                } else {
                    LocatedEntry::Other
                }
            })
            .collect();
        Ok(entries)
    }

    fn matches_suffix(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&self.config.component_suffix))
    }
}
