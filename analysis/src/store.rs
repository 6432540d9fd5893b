//! Diagnostics store — per-file replacement of published diagnostics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::types::{Diagnostic, DiagnosticsSnapshot};

pub(crate) struct DiagnosticsStore {
    data: HashMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticsStore {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Replace all diagnostics for a path. An empty set removes the path.
    pub fn update(&mut self, path: PathBuf, items: Vec<Diagnostic>) {
        if items.is_empty() {
            self.data.remove(&path);
        } else {
            self.data.insert(path, items);
        }
    }

    /// Diagnostics currently published for one path.
    pub fn get(&self, path: &Path) -> Option<&[Diagnostic]> {
        self.data.get(path).map(Vec::as_slice)
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let mut files: Vec<(PathBuf, Vec<Diagnostic>)> = self
            .data
            .iter()
            .map(|(path, items)| (path.clone(), items.clone()))
            .collect();

        // Sort: files with errors first, then alphabetically
        files.sort_by(|a, b| {
            let a_has_errors = a.1.iter().any(|d| d.severity().is_error());
            let b_has_errors = b.1.iter().any(|d| d.severity().is_error());
            b_has_errors.cmp(&a_has_errors).then_with(|| a.0.cmp(&b.0))
        });

        DiagnosticsSnapshot::new(files)
    }
}
