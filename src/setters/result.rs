//! The structured record of every substitution the setter engine performed.
//!
//! Ordering is deterministic by construction: files are walked in
//! lexicographic path order (`screening::screen` already returns them that
//! way) and changes within a file are pushed in document order as the walk
//! encounters them. The commit templater depends on this.

use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectId {
    pub api_version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}/{}", self.api_version, self.kind, ns, self.name),
            None => write!(f, "{}/{}/{}", self.api_version, self.kind, self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub old_value: String,
    pub new_value: String,
    pub setter_name: String,
}

/// Every (file, object, field) mutation the engine performed during one
/// run, plus whether each screened file changed at all.
#[derive(Debug, Clone, Default)]
pub struct SetterResult {
    /// file path -> (did this file's bytes change, object -> changes)
    files: BTreeMap<PathBuf, FileResult>,
    object_ids: BTreeMap<ObjectKey, ObjectId>,
}

#[derive(Debug, Clone, Default)]
struct FileResult {
    changed: bool,
    objects: BTreeMap<ObjectKey, Vec<Change>>,
}

/// A `BTreeMap`-friendly, totally-ordered stand-in for `ObjectId` so that
/// `Objects()` iterates deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey(String);

impl SetterResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as screened. A file with no recorded changes and no
    /// explicit `mark_unchanged` call is simply absent from `files()`.
    pub fn mark_unchanged(&mut self, path: PathBuf) {
        self.files.entry(path).or_default();
    }

    pub fn record_change(&mut self, path: PathBuf, object: ObjectId, change: Change) {
        let entry = self.files.entry(path).or_default();
        entry.changed = true;
        entry
            .objects
            .entry(ObjectKey(object.to_string()))
            .or_insert_with(Vec::new)
            .push(change);
        self.object_ids.insert(ObjectKey(object.to_string()), object);
    }

    /// Paths of every file that had at least one change applied.
    pub fn changed_files(&self) -> Vec<&PathBuf> {
        self.files
            .iter()
            .filter(|(_, r)| r.changed)
            .map(|(p, _)| p)
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.files.values().any(|r| r.changed)
    }

    /// Unique image references written across the whole run, in the order
    /// their owning file/object/change were recorded.
    pub fn images(&self) -> Vec<String> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for file in self.files.values() {
            for changes in file.objects.values() {
                for change in changes {
                    if seen.insert(change.new_value.clone()) {
                        out.push(change.new_value.clone());
                    }
                }
            }
        }
        out
    }

    /// Per-object change sets, across all files, in `ObjectId`-string
    /// (lexicographic) key order — the iteration order of the underlying
    /// `BTreeMap`, not first-appearance order.
    pub fn objects(&self) -> Vec<(ObjectId, Vec<Change>)> {
        let mut out = Vec::new();
        for file in self.files.values() {
            for (key, changes) in &file.objects {
                if let Some(id) = self.object_ids.get(key) {
                    out.push((id.clone(), changes.clone()));
                }
            }
        }
        out
    }

    /// Every change, flattened, in file/document order.
    pub fn changes(&self) -> Vec<Change> {
        self.files
            .values()
            .flat_map(|f| f.objects.values().flatten().cloned())
            .collect()
    }

    pub fn changed_file_count(&self) -> usize {
        self.files.values().filter(|r| r.changed).count()
    }
}
