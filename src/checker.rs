use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::detector::{DuplicateDetector, DuplicateGroup, SelectorPattern};
use crate::locator::{ComponentLocator, LocatorConfig};

/// Configuration for a selector check run.
#[derive(Debug, Clone, Default)]
pub struct CheckerConfig {
    pub locator: LocatorConfig,
    pub selector_pattern: SelectorPattern,
}

/// Facade composing the locator and the detector: verifies each requested
/// root, locates its component files, detects duplicates, and merges the
/// per-root groups into one result keyed by selector.
pub struct SelectorChecker {
    locator: ComponentLocator,
    detector: DuplicateDetector,
}

impl SelectorChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            locator: ComponentLocator::new(config.locator),
            detector: DuplicateDetector::new(config.selector_pattern),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CheckerConfig::default())
    }

    /// Check every requested root and return one group per selector declared
    /// in two or more files across the whole request, instance paths
    /// rewritten relative to the working directory.
    ///
    /// Missing roots and roots with no matching files are warned about and
    /// skipped; they never fail the call. Per-directory and per-file I/O
    /// failures are already swallowed by the locator and detector, so only
    /// unexpected failures propagate.
    pub async fn check(&self, paths: &[PathBuf]) -> Result<Vec<DuplicateGroup>> {
        let mut merged: Vec<DuplicateGroup> = Vec::new();
        let mut merged_index: HashMap<String, usize> = HashMap::new();

        for root in paths {
            if fs::metadata(root).await.is_err() {
                warn!("Path not found: {}", root.display());
                continue;
            }

            let files = self.locator.locate(root).await;
            if files.is_empty() {
                warn!("No component files found in {}", root.display());
                continue;
            }

            info!(
                "Checking {} component files under {}",
                files.len(),
                root.display()
            );
            for group in self.detector.detect(&files).await {
                match merged_index.get(&group.selector) {
                    // Same selector under an earlier root: one request-wide
                    // group, earlier roots' instances first.
                    Some(&index) => merged[index].instances.extend(group.instances),
                    None => {
                        merged_index.insert(group.selector.clone(), merged.len());
                        merged.push(group);
                    }
                }
            }
        }

        let cwd = std::env::current_dir()?;
        for group in &mut merged {
            for instance in &mut group.instances {
                *instance = relative_to(&cwd, instance);
            }
        }
        Ok(merged)
    }

    /// Count of component files under `dir`, for the presentation layer.
    pub async fn file_count(&self, dir: impl AsRef<Path>) -> usize {
        self.locator.file_count(dir).await
    }
}

/// Rewrite `path` relative to `base`. A relative `path` is resolved against
/// `base` first; a path outside `base` comes back `..`-prefixed.
fn relative_to(base: &Path, path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    if let Ok(stripped) = absolute.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let base_components: Vec<_> = base.components().collect();
    let path_components: Vec<_> = absolute.components().collect();
    let shared = base_components
        .iter()
        .zip(&path_components)
        .take_while(|(b, p)| b == p)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[shared..] {
        relative.push(component);
    }
    relative
}
