//! Loading one trait page: every data file it references plus the registrar, in a
//! chosen order.
//!
//! Data files are read concurrently and published in completion order, so the
//! interleaving of publishes relative to each other is decided by I/O. The
//! registrar is installed at the requested [`InstallPoint`], and always before the
//! page counts as loaded.

use crate::datafile::read_data_file;
use crate::error::InvalidInstallPoint;
use crate::registry::{ImplementorSink, Registry};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// When the registrar is installed relative to the page's data files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallPoint {
    /// Registrar first; every publish is delivered directly.
    BeforeData,
    /// Registrar last; every publish is staged and drained at install.
    #[default]
    AfterData,
    /// Registrar right after the Nth data file was published.
    AfterFiles(usize),
}

impl FromStr for InstallPoint {
    type Err = InvalidInstallPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "before-data" => Ok(Self::BeforeData),
            "after-data" => Ok(Self::AfterData),
            other => other
                .strip_prefix("after-files:")
                .and_then(|n| n.parse().ok())
                .map(Self::AfterFiles)
                .ok_or_else(|| InvalidInstallPoint(s.to_string())),
        }
    }
}

impl fmt::Display for InstallPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeData => f.write_str("before-data"),
            Self::AfterData => f.write_str("after-data"),
            Self::AfterFiles(n) => write!(f, "after-files:{}", n),
        }
    }
}

impl<'de> Deserialize<'de> for InstallPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of a page load.
#[derive(Debug, Default)]
pub struct PageReport {
    /// Data files that were read and published.
    pub published: usize,
    /// Data files that could not be read or decoded, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Whether this load installed the registrar (false if one was already installed).
    pub installed: bool,
}

/// Load a page's data files into `registry`, installing `registrar` at `install`.
pub async fn load_page(
    registry: &Registry,
    registrar: Arc<dyn ImplementorSink>,
    files: Vec<PathBuf>,
    install: InstallPoint,
) -> PageReport {
    let mut report = PageReport::default();
    let mut registrar = Some(registrar);

    let mut install_now = |report: &mut PageReport| {
        if let Some(sink) = registrar.take() {
            match registry.install(sink) {
                Ok(()) => report.installed = true,
                Err(e) => tracing::warn!("Registrar not installed: {}", e),
            }
        }
    };

    if matches!(install, InstallPoint::BeforeData | InstallPoint::AfterFiles(0)) {
        install_now(&mut report);
    }

    let mut reads: FuturesUnordered<_> = files
        .into_iter()
        .map(|path| async move {
            let result = read_data_file(&path).await;
            (path, result)
        })
        .collect();

    while let Some((path, result)) = reads.next().await {
        match result {
            Ok(payload) => {
                tracing::debug!(path = %path.display(), crates = payload.len(), "Publishing data file");
                registry.publish(payload);
                report.published += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Skipping data file: {:#}", e);
                report.failed.push((path, format!("{:#}", e)));
            }
        }

        if install == InstallPoint::AfterFiles(report.published) {
            install_now(&mut report);
        }
    }

    // Whatever the requested point, the page is not loaded until the registrar is.
    install_now(&mut report);

    tracing::info!(
        published = report.published,
        failed = report.failed.len(),
        install = %install,
        "Page loaded"
    );
    report
}
