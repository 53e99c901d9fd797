//! The registrar's display model and its acceptance operation.

use crate::registry::ImplementorSink;
use crate::render::Renderer;
use crate::types::{CrateName, Implementor, Payload};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use xxhash_rust::xxh3::Xxh3;

/// Implementor lists currently shown on the page, keyed by crate.
///
/// Each list carries an xxh3 digest of its fragments so that re-accepting an
/// identical list is recognized as a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    sections: BTreeMap<CrateName, Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    implementors: Vec<Implementor>,
    digest: u64,
}

impl Section {
    fn new(implementors: Vec<Implementor>) -> Self {
        let digest = digest(&implementors);
        Self {
            implementors,
            digest,
        }
    }
}

/// Hash the fragment list, length-prefixing each fragment so that
/// `["ab", "c"]` and `["a", "bc"]` differ.
fn digest(implementors: &[Implementor]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&(implementors.len() as u64).to_le_bytes());
    for implementor in implementors {
        let html = implementor.html().as_bytes();
        hasher.update(&(html.len() as u64).to_le_bytes());
        hasher.update(html);
    }
    hasher.digest()
}

impl DisplayModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a payload, last write wins per crate.
    ///
    /// Returns the crates whose lists were added or changed, in key order.
    pub fn merge(&mut self, payload: Payload) -> Vec<CrateName> {
        let mut changed = Vec::new();
        for (crate_name, implementors) in payload {
            let section = Section::new(implementors);
            match self.sections.get(&crate_name) {
                Some(existing)
                    if existing.digest == section.digest
                        && existing.implementors == section.implementors => {}
                _ => {
                    self.sections.insert(crate_name.clone(), section);
                    changed.push(crate_name);
                }
            }
        }
        changed
    }

    /// The list shown for a crate. `Some(&[])` means "present, no implementors".
    pub fn get(&self, crate_name: &str) -> Option<&[Implementor]> {
        self.sections
            .get(crate_name)
            .map(|section| section.implementors.as_slice())
    }

    pub fn contains(&self, crate_name: &str) -> bool {
        self.sections.contains_key(crate_name)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total implementors across every crate.
    pub fn implementor_count(&self) -> usize {
        self.sections.values().map(|s| s.implementors.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CrateName, &[Implementor])> {
        self.sections
            .iter()
            .map(|(name, section)| (name, section.implementors.as_slice()))
    }
}

/// The page registrar: a display model plus the renderer that draws it.
#[derive(Debug)]
pub struct ImplementorList<R> {
    model: Mutex<DisplayModel>,
    renderer: R,
}

impl<R: Renderer> ImplementorList<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            model: Mutex::new(DisplayModel::new()),
            renderer,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// A copy of the current display model.
    pub fn snapshot(&self) -> DisplayModel {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, DisplayModel> {
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Renderer> ImplementorSink for ImplementorList<R> {
    fn accept(&self, payload: Payload) {
        let mut model = self.lock();
        let changed = model.merge(payload);
        if changed.is_empty() {
            tracing::debug!("Accepted payload changed nothing; skipping render");
            return;
        }

        tracing::debug!(
            crates = ?changed.iter().map(CrateName::as_str).collect::<Vec<_>>(),
            "Rendering updated implementor sections"
        );
        self.renderer.render(&model, &changed);
    }
}
