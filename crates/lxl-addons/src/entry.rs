//! Relevance filtering for fetched directory trees
//!
//! Repository boilerplate (readme, license, the catalog itself, VCS metadata
//! and test folders) is never copied into the config root.

use std::fs;

const IRRELEVANT_NAMES: [&str; 5] = [
    "readme",
    "readme.md",
    "license",
    "license.md",
    "manifest.json",
];

/// Minimal view of a directory entry
pub trait EntryInfo {
    fn is_dir(&self) -> bool;
    fn name(&self) -> String;
}

impl EntryInfo for fs::DirEntry {
    fn is_dir(&self) -> bool {
        self.file_type().map(|t| t.is_dir()).unwrap_or(false)
    }

    fn name(&self) -> String {
        self.file_name().to_string_lossy().into_owned()
    }
}

impl EntryInfo for walkdir::DirEntry {
    fn is_dir(&self) -> bool {
        self.file_type().is_dir()
    }

    fn name(&self) -> String {
        self.file_name().to_string_lossy().into_owned()
    }
}

/// Whether an entry should be installed
pub fn is_relevant(entry: &impl EntryInfo) -> bool {
    let name = entry.name().to_lowercase();

    if IRRELEVANT_NAMES.contains(&name.as_str()) {
        return false;
    }
    if entry.is_dir() && name == ".git" {
        return false;
    }
    !name.starts_with("test")
}
