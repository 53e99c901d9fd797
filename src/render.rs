//! Render passes for the implementor list.

use crate::model::DisplayModel;
use crate::types::CrateName;
use regex::Regex;
use std::fmt::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, PoisonError};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Text shown for a crate that is present with zero implementors.
pub const NO_IMPLEMENTORS: &str = "No implementors";

/// Draws the display model after the registrar accepted a change.
pub trait Renderer: Send + Sync {
    /// `changed` lists the crates whose sections were added or replaced.
    fn render(&self, model: &DisplayModel, changed: &[CrateName]);
}

/// Keeps the latest rendered `#implementors-list` section and counts render passes.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    html: Mutex<String>,
    passes: AtomicUsize,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The section produced by the most recent pass, empty if nothing rendered yet.
    pub fn html(&self) -> String {
        self.html
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of render passes so far.
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, model: &DisplayModel, _changed: &[CrateName]) {
        let html = render_html(model);
        *self.html.lock().unwrap_or_else(PoisonError::into_inner) = html;
        self.passes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Render the whole model as the `#implementors-list` section.
pub fn render_html(model: &DisplayModel) -> String {
    let mut out = String::from("<div id=\"implementors-list\">\n");
    for (crate_name, implementors) in model.iter() {
        // Crate names are restricted to [A-Za-z0-9_-]; no escaping needed.
        let _ = writeln!(
            out,
            "<details class=\"toggle implementors-toggle\" data-crate=\"{0}\" open>\
             <summary><h3 class=\"crate\">{0}</h3></summary>",
            crate_name
        );
        if implementors.is_empty() {
            let _ = writeln!(out, "<p class=\"no-implementors\">{}</p>", NO_IMPLEMENTORS);
        }
        for implementor in implementors {
            let _ = writeln!(out, "<section class=\"impl\">{}</section>", implementor.html());
        }
        out.push_str("</details>\n");
    }
    out.push_str("</div>\n");
    out
}

/// Render the model as indented plain text for terminals.
pub fn render_text(title: &str, model: &DisplayModel) -> String {
    let mut out = format!("Implementors of {}\n", title);
    if model.is_empty() {
        out.push_str("  (no implementor data)\n");
        return out;
    }

    for (crate_name, implementors) in model.iter() {
        if implementors.is_empty() {
            let _ = writeln!(out, "  {} ({})", crate_name, NO_IMPLEMENTORS.to_lowercase());
            continue;
        }
        let _ = writeln!(out, "  {} ({})", crate_name, implementors.len());
        for implementor in implementors {
            let _ = writeln!(out, "    {}", html_to_text(implementor.html()));
        }
    }
    out
}

/// Strip tags and decode the handful of entities rustdoc emits.
pub fn html_to_text(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
