//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test gets its own temporary doc site and its own `Registry`, so tests
//! can run in parallel without sharing registrar state. The process-wide
//! `Registry::global()` is never touched from integration tests.
//!
//! # Available Fixtures
//!
//! - `doc_site`: two doc roots (`crate_a/doc`, `crate_b/doc`) that each carry a data
//!   file for `demo::Render`, plus `crate_a`-only data for `core::clone::Clone`
//! - `recorder`: a sink that records every accepted payload

use rstest::fixture;
use rustdoc_implementors::datafile::to_script;
use rustdoc_implementors::{CrateName, ImplementorSink, Payload, Site, TraitPath};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A temporary directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Writes a trait's data file under `doc_root` (relative to this workspace).
    pub fn create_data_file(&self, doc_root: &str, trait_path: &str, payload: &Payload) {
        let trait_path: TraitPath = trait_path.parse().expect("valid trait path");
        let relative = Path::new(doc_root).join(trait_path.data_file());
        let script = to_script(payload).expect("Failed to encode payload");
        self.create_file(&relative.to_string_lossy(), &script);
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a validated crate name.
pub fn krate(name: &str) -> CrateName {
    CrateName::new(name).expect("valid crate name")
}

/// Shorthand for a single-crate payload.
pub fn payload(name: &str, implementors: &[&str]) -> Payload {
    Payload::new().with(krate(name), implementors.iter().copied())
}

/// A doc site spread over two doc roots.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct DocSite {
    pub workspace: TempWorkspace,
    pub site: Site,
}

#[allow(dead_code)]
impl DocSite {
    pub fn root(&self, name: &str) -> PathBuf {
        self.workspace.path().join(name)
    }
}

/// Creates a doc site with two roots publishing implementors of the same trait.
#[allow(dead_code)] // Used in page_test.rs
#[fixture]
pub fn doc_site() -> DocSite {
    let workspace = TempWorkspace::new();

    workspace.create_data_file(
        "crate_a/doc",
        "demo::Render",
        &payload(
            "crate_a",
            &[
                r#"impl <a class="trait" href="demo/trait.Render.html">Render</a> for <a class="struct">Circle</a>"#,
                r#"impl <a class="trait" href="demo/trait.Render.html">Render</a> for <a class="struct">Square</a>"#,
            ],
        ),
    );
    workspace.create_data_file("crate_b/doc", "demo::Render", &payload("crate_b", &[]));
    workspace.create_data_file(
        "crate_a/doc",
        "core::clone::Clone",
        &payload("crate_a", &["impl Clone for Circle"]),
    );

    let site = Site::new(vec![
        workspace.path().join("crate_a/doc"),
        workspace.path().join("crate_b/doc"),
    ]);
    DocSite { workspace, site }
}

/// A sink that records every payload it accepts, in order.
#[allow(dead_code)] // Used in handoff_test.rs
#[derive(Default)]
pub struct Recorder {
    accepted: Mutex<Vec<Payload>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn accepted(&self) -> Vec<Payload> {
        self.accepted.lock().unwrap().clone()
    }
}

impl ImplementorSink for Recorder {
    fn accept(&self, payload: Payload) {
        self.accepted.lock().unwrap().push(payload);
    }
}

#[allow(dead_code)] // Used in handoff_test.rs
#[fixture]
pub fn recorder() -> Arc<Recorder> {
    Arc::new(Recorder::default())
}
