//! The static course-code catalog.
//!
//! The catalog is a read-only mapping from uppercase course code to a display
//! name and an optional reference URL. It is loaded once and then shared by
//! reference; nothing mutates it after construction.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A resolved catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// Canonical uppercase code.
    pub code: String,
    /// Display name.
    pub full_name: String,
    /// Reference URL, if the course still has a page.
    pub url: Option<String>,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, full_name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            code: code.into(),
            full_name: full_name.into(),
            url,
        }
    }
}

/// Anything that can resolve an uppercase code to a [`CodeEntry`].
///
/// A miss is a normal outcome and is reported as `None`.
pub trait CodeLookup {
    /// Look up a code. Callers pass the uppercased form.
    fn lookup(&self, code: &str) -> Option<CodeEntry>;
}

impl<T: CodeLookup + ?Sized> CodeLookup for &T {
    fn lookup(&self, code: &str) -> Option<CodeEntry> {
        (**self).lookup(code)
    }
}

impl<T: CodeLookup + ?Sized> CodeLookup for Arc<T> {
    fn lookup(&self, code: &str) -> Option<CodeEntry> {
        (**self).lookup(code)
    }
}

/// On-disk record: `[full_name, url-or-null]`.
#[derive(Debug, Clone, Deserialize)]
struct CatalogRecord(String, Option<String>);

/// The immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct CodeCatalog {
    entries: HashMap<String, (String, Option<String>)>,
}

impl CodeCatalog {
    /// Build a catalog from `(code, full_name, url)` triples.
    ///
    /// Codes are normalized to uppercase.
    pub fn from_entries<I, C, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, N, Option<String>)>,
        C: AsRef<str>,
        N: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(code, name, url)| (code.as_ref().to_ascii_uppercase(), (name.into(), url)))
            .collect();
        Self { entries }
    }

    /// Parse the JSON catalog source.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let records: HashMap<String, CatalogRecord> =
            serde_json::from_str(json).map_err(|e| CoreError::Catalog(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    /// Parse the JSON catalog source from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CoreError> {
        let records: HashMap<String, CatalogRecord> =
            serde_json::from_reader(reader).map_err(|e| CoreError::Catalog(e.to_string()))?;
        Ok(Self::from_records(records))
    }

    /// Load the catalog from a JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| CoreError::Catalog(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    fn from_records(records: HashMap<String, CatalogRecord>) -> Self {
        Self::from_entries(
            records
                .into_iter()
                .map(|(code, CatalogRecord(name, url))| (code, name, url)),
        )
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a code is present, in any case.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(&code.to_ascii_uppercase())
    }
}

impl CodeLookup for CodeCatalog {
    fn lookup(&self, code: &str) -> Option<CodeEntry> {
        self.entries
            .get(code)
            .map(|(name, url)| CodeEntry::new(code, name.clone(), url.clone()))
    }
}
