//! Configuration file discovery and loading.

use crate::error::Result;
use crate::logging::LogFormat;
use crate::page::InstallPoint;
use crate::registry::StagingPolicy;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "rustdoc-implementors.toml";

/// Doc root used when neither the config file nor the command line names one.
pub const DEFAULT_DOC_ROOT: &str = "target/doc";

/// Output format for rendered implementor lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub doc_roots: Vec<PathBuf>,
    pub staging: StagingPolicy,
    pub install: InstallPoint,
    pub format: OutputFormat,
    pub log_format: LogFormat,
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load a config file, resolving relative doc roots against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            for root in &mut config.doc_roots {
                if root.is_relative() {
                    *root = base.join(&*root);
                }
            }
        }

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load the explicit file if given, else the first config file found, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Doc roots to scan, falling back to [`DEFAULT_DOC_ROOT`].
    pub fn effective_doc_roots(&self) -> Vec<PathBuf> {
        if self.doc_roots.is_empty() {
            vec![PathBuf::from(DEFAULT_DOC_ROOT)]
        } else {
            self.doc_roots.clone()
        }
    }
}

/// Config file locations in lookup order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("rustdoc-implementors").join("config.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        check!(config == Config::default());
        check!(config.staging == StagingPolicy::Queue);
        check!(config.install == InstallPoint::AfterData);
        check!(config.effective_doc_roots() == vec![PathBuf::from(DEFAULT_DOC_ROOT)]);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            doc_roots = ["/srv/docs/a", "/srv/docs/b"]
            staging = "latest-only"
            install = "after-files:2"
            format = "html"
            log_format = "json"
            "#,
        )
        .unwrap();

        check!(config.doc_roots == vec![PathBuf::from("/srv/docs/a"), PathBuf::from("/srv/docs/b")]);
        check!(config.staging == StagingPolicy::LatestOnly);
        check!(config.install == InstallPoint::AfterFiles(2));
        check!(config.format == OutputFormat::Html);
        check!(config.log_format == LogFormat::Json);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        check!(Config::from_toml("stagging = \"queue\"").is_err());
    }

    #[test]
    fn test_bad_install_point_rejected() {
        let_assert!(Err(e) = Config::from_toml("install = \"whenever\""));
        check!(format!("{:#}", e).contains("whenever"));
    }

    #[test]
    fn test_load_resolves_relative_roots() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&path, "doc_roots = [\"target/doc\", \"/abs/doc\"]\n").unwrap();

        let config = Config::load(&path).unwrap();
        check!(config.doc_roots[0] == dir.path().join("target/doc"));
        check!(config.doc_roots[1] == PathBuf::from("/abs/doc"));
    }

    #[test]
    fn test_discover_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        check!(Config::discover(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
