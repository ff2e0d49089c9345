use anyhow::Result;
use futures::future;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error};

/// Default extraction pattern: the quoted value following a `selector:` key.
pub const DEFAULT_SELECTOR_PATTERN: &str = r#"selector:\s*['"]([^'"]+)['"]"#;

/// Compiled extraction pattern carrying exactly one capture group.
#[derive(Debug, Clone)]
pub struct SelectorPattern {
    regex: Regex,
}

impl SelectorPattern {
    /// Compile `pattern` and validate that it captures exactly one group.
    /// A wrong group count is a configuration error, not a per-file one.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        // captures_len() includes the implicit whole-match group 0.
        if regex.captures_len() != 2 {
            anyhow::bail!(
                "selector pattern must contain exactly one capture group, got {}: {}",
                regex.captures_len() - 1,
                pattern
            );
        }
        Ok(Self { regex })
    }

    /// First match only; a file with several declarations contributes only
    /// its first. An empty capture is treated as no selector at all.
    pub fn extract<'c>(&self, content: &'c str) -> Option<&'c str> {
        let captures = self.regex.captures(content)?;
        let selector = captures.get(1)?.as_str();
        if selector.is_empty() {
            None
        } else {
            Some(selector)
        }
    }
}

impl Default for SelectorPattern {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTOR_PATTERN).expect("default selector pattern is valid")
    }
}

/// A selector declared by two or more files, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub selector: String,
    pub instances: Vec<PathBuf>,
}

/// Groups candidate files by the selector each declares, keeping only
/// selectors declared in more than one file.
pub struct DuplicateDetector {
    pattern: SelectorPattern,
}

impl DuplicateDetector {
    pub fn new(pattern: SelectorPattern) -> Self {
        Self { pattern }
    }

    /// Read every file concurrently, extract its selector, and fold the
    /// completed reads into duplicate groups. The fold runs on the
    /// coordinating task after the joined reads settle, so the first-seen
    /// map and the group list have a single writer and need no locking.
    pub async fn detect(&self, files: &[PathBuf]) -> Vec<DuplicateGroup> {
        let selectors =
            future::join_all(files.iter().map(|file| self.read_selector(file))).await;

        let mut first_seen: HashMap<String, &Path> = HashMap::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for (file, selector) in files.iter().zip(selectors) {
            let Some(selector) = selector else { continue };

            if let Some(&index) = group_index.get(&selector) {
                groups[index].instances.push(file.clone());
            } else if let Some(first) = first_seen.get(&selector) {
                let seed = vec![first.to_path_buf(), file.clone()];
                group_index.insert(selector.clone(), groups.len());
                groups.push(DuplicateGroup {
                    selector,
                    instances: seed,
                });
            } else {
                first_seen.insert(selector, file.as_path());
            }
        }

        debug!("Detected {} duplicate selector groups", groups.len());
        groups
    }

    /// Read one file and extract its selector. A failed read is logged and
    /// yields `None`, the same as a file with no selector declaration.
    async fn read_selector(&self, file: &Path) -> Option<String> {
        match fs::read_to_string(file).await {
            Ok(content) => self.pattern.extract(&content).map(str::to_string),
            Err(e) => {
                error!("Error reading file {}: {}", file.display(), e);
                None
            }
        }
    }
}
