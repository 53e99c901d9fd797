//! Doc output layout: where each trait's implementor data file lives.

use crate::error::{InvalidTraitPath, Result};
use anyhow::Context;
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory under a doc root that holds implementor data files.
pub const IMPLEMENTORS_DIR: &str = "implementors";

/// Fully qualified trait path such as `core::clone::Clone`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraitPath {
    segments: Vec<String>,
}

impl TraitPath {
    /// The trait's own name (last segment).
    pub fn name(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Data file location relative to a doc root,
    /// e.g. `implementors/core/clone/trait.Clone.js`.
    pub fn data_file(&self) -> PathBuf {
        let mut path = PathBuf::from(IMPLEMENTORS_DIR);
        if let Some((name, modules)) = self.segments.split_last() {
            path.extend(modules);
            path.push(format!("trait.{}.js", name));
        }
        path
    }

    /// Recover the trait path from a data file path relative to `implementors/`.
    pub fn from_data_file(relative: &Path) -> Option<Self> {
        let file_name = relative.file_name()?.to_str()?;
        let name = file_name.strip_prefix("trait.")?.strip_suffix(".js")?;

        let mut segments = relative
            .parent()?
            .components()
            .map(|c| c.as_os_str().to_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        segments.push(name.to_string());

        segments
            .iter()
            .all(|s| is_identifier(s))
            .then_some(Self { segments })
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl FromStr for TraitPath {
    type Err = InvalidTraitPath;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let segments: Vec<String> = s.split("::").map(str::to_string).collect();
        if segments.iter().all(|s| is_identifier(s)) {
            Ok(Self { segments })
        } else {
            Err(InvalidTraitPath(s.to_string()))
        }
    }
}

impl fmt::Display for TraitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

/// A documentation site spread over one or more doc output directories.
#[derive(Debug, Clone)]
pub struct Site {
    roots: Vec<PathBuf>,
}

impl Site {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Data files a trait's page loads, one per doc root that has one, in root order.
    pub fn data_files(&self, trait_path: &TraitPath) -> Vec<PathBuf> {
        let relative = trait_path.data_file();
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Every data file under every root, sorted within each root.
    pub fn all_data_files(&self) -> Result<Vec<(TraitPath, PathBuf)>> {
        let mut found = Vec::new();
        for root in &self.roots {
            let dir = root.join(IMPLEMENTORS_DIR);
            if !dir.is_dir() {
                tracing::debug!(root = %root.display(), "No implementors directory under doc root");
                continue;
            }

            // Doc output usually sits in an ignored target/ directory.
            let mut entries: Vec<_> = WalkBuilder::new(&dir)
                .standard_filters(false)
                .build()
                .filter_map(|e| {
                    e.inspect_err(|err| tracing::warn!("Skipping unreadable entry: {}", err))
                        .ok()
                })
                .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
                .filter_map(|e| {
                    let relative = e.path().strip_prefix(&dir).ok()?;
                    let trait_path = TraitPath::from_data_file(relative)?;
                    Some((trait_path, e.into_path()))
                })
                .collect();
            entries.sort();
            found.extend(entries);
        }
        Ok(found)
    }

    /// [`Site::data_files`] on the blocking pool, for use from async code.
    pub async fn scan_data_files(&self, trait_path: &TraitPath) -> Result<Vec<PathBuf>> {
        let site = self.clone();
        let trait_path = trait_path.clone();
        tokio::task::spawn_blocking(move || site.data_files(&trait_path))
            .await
            .context("Data file lookup task failed")
    }

    /// [`Site::all_data_files`] on the blocking pool, for use from async code.
    pub async fn scan_all_data_files(&self) -> Result<Vec<(TraitPath, PathBuf)>> {
        let site = self.clone();
        tokio::task::spawn_blocking(move || site.all_data_files())
            .await
            .context("Doc root scan task failed")?
    }

    /// Every trait with implementor data, deduplicated and sorted.
    pub fn traits(&self) -> Result<Vec<TraitPath>> {
        let traits: BTreeSet<TraitPath> = self
            .all_data_files()
            .context("Failed to scan doc roots for implementor data")?
            .into_iter()
            .map(|(trait_path, _)| trait_path)
            .collect();
        Ok(traits.into_iter().collect())
    }
}
