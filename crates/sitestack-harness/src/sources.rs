// crates/sitestack-harness/src/sources.rs
// ============================================================================
// Module: Configuration Source Aggregator
// Description: Recursive aggregation of configuration-language source files.
// Purpose: Support text-based structural assertions over a module tree.
// Dependencies: walkdir
// ============================================================================

//! ## Overview
//! [`read_config_sources`] concatenates every `.tf` file below a root into one
//! buffer, each file followed by a newline. Traversal is sorted by file name.
//! Any read or walk failure aborts the aggregation; partial text is never
//! returned. [`SourceTree`] answers block-header queries over the buffer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File suffix of configuration-language sources.
pub const CONFIG_SOURCE_SUFFIX: &str = ".tf";

// ============================================================================
// SECTION: Aggregation
// ============================================================================

/// Reads and concatenates every `.tf` file below `root`.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] when the tree cannot be walked or a file cannot be read.
pub fn read_config_sources(root: &Path) -> Result<String, HarnessError> {
    read_config_sources_with_suffix(root, CONFIG_SOURCE_SUFFIX)
}

/// Reads and concatenates every file below `root` whose name ends with `suffix`.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] when the tree cannot be walked or a file cannot be read.
pub fn read_config_sources_with_suffix(root: &Path, suffix: &str) -> Result<String, HarnessError> {
    let mut buffer = String::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            HarnessError::Io {
                path,
                message: err.to_string(),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry.file_name().to_str().is_some_and(|name| name.ends_with(suffix));
        if !matches {
            continue;
        }
        let content =
            fs::read_to_string(entry.path()).map_err(|err| HarnessError::io(entry.path(), &err))?;
        buffer.push_str(&content);
        buffer.push('\n');
    }
    Ok(buffer)
}

// ============================================================================
// SECTION: Source Tree
// ============================================================================

/// Aggregated configuration text with block-header queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// Concatenated source text.
    text: String,
}

impl SourceTree {
    /// Loads every `.tf` file below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] when aggregation fails.
    pub fn load(root: &Path) -> Result<Self, HarnessError> {
        Ok(Self::from_text(read_config_sources(root)?))
    }

    /// Wraps already aggregated text.
    #[must_use]
    pub const fn from_text(text: String) -> Self {
        Self {
            text,
        }
    }

    /// Returns the aggregated text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true when the raw text contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    /// Returns true when a `resource "<type>" "<name>"` block is declared.
    #[must_use]
    pub fn declares_resource(&self, resource_type: &str, name: &str) -> bool {
        self.block_headers("resource")
            .any(|(found_type, found_name)| found_type == resource_type && found_name == Some(name))
    }

    /// Returns true when a `data "<type>" "<name>"` block is declared.
    #[must_use]
    pub fn declares_data(&self, data_type: &str, name: &str) -> bool {
        self.block_headers("data")
            .any(|(found_type, found_name)| found_type == data_type && found_name == Some(name))
    }

    /// Returns true when a data source of `data_type` is declared under any name.
    #[must_use]
    pub fn declares_data_type(&self, data_type: &str) -> bool {
        self.block_headers("data").any(|(found_type, _)| found_type == data_type)
    }

    /// Counts resource blocks of `resource_type`.
    #[must_use]
    pub fn count_resource_type(&self, resource_type: &str) -> usize {
        self.block_headers("resource").filter(|(found_type, _)| *found_type == resource_type).count()
    }

    /// Yields `(type, name)` pairs for block headers of the given keyword.
    fn block_headers<'a>(
        &'a self,
        keyword: &'a str,
    ) -> impl Iterator<Item = (&'a str, Option<&'a str>)> + 'a {
        self.text.lines().filter_map(move |line| {
            let mut tokens = line.split_whitespace();
            if tokens.next()? != keyword {
                return None;
            }
            let block_type = unquote(tokens.next()?)?;
            let block_name = tokens.next().and_then(unquote);
            Some((block_type, block_name))
        })
    }
}

/// Strips surrounding quotes from a block label.
fn unquote(token: &str) -> Option<&str> {
    token.trim_end_matches('{').strip_prefix('"')?.strip_suffix('"')
}

#[cfg(test)]
#[path = "sources_tests.rs"]
mod sources_tests;
