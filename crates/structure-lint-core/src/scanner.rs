//! Filesystem scanner producing the observed repository tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::ScannerConfig;
use crate::rules::GlobPattern;
use crate::types::EntryKind;

/// Errors that abort a scan before it starts.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// The root does not exist, is not a directory, or cannot be listed.
    #[error("unreadable root {path}: {reason}")]
    #[diagnostic(
        code(structure_lint::unreadable_root),
        help("pass an existing, readable directory as the scan root")
    )]
    UnreadableRoot {
        /// The root that was requested.
        path: PathBuf,
        /// Why it cannot be scanned.
        reason: String,
    },

    /// Scanner settings are invalid.
    #[error("invalid scanner configuration: {reason}")]
    #[diagnostic(code(structure_lint::scanner_config))]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },
}

/// One observed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    /// Path relative to the scan root, `/`-separated.
    pub path: String,
    /// File or directory.
    pub kind: EntryKind,
    /// False only for dangling symbolic links.
    pub exists: bool,
    /// File size in bytes (0 for directories).
    pub size: u64,
}

impl ScanEntry {
    /// Creates an existing entry.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: EntryKind, size: u64) -> Self {
        Self {
            path: path.into(),
            kind,
            exists: true,
            size,
        }
    }

    /// Creates an entry for a dangling symbolic link.
    #[must_use]
    pub fn dangling(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            exists: false,
            size: 0,
        }
    }
}

/// A WARN-level note about a path the scanner skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanNote {
    /// Path relative to the scan root.
    pub path: String,
    /// Why it was skipped.
    pub message: String,
}

/// Item produced by [`ScanIter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// An observed path.
    Entry(ScanEntry),
    /// A skipped path.
    Skipped(ScanNote),
}

/// Walks a repository tree.
///
/// Construction validates the root. Every call to [`Scanner::iter`] starts a
/// fresh walk, so the sequence can be restarted any number of times.
pub struct Scanner {
    root: PathBuf,
    exclude: Vec<GlobPattern>,
    gitignore: Option<Gitignore>,
    follow_links: bool,
    max_depth: Option<usize>,
}

impl Scanner {
    /// Creates a scanner for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::UnreadableRoot`] if the root is missing, not a
    /// directory, or not listable, and [`ScanError::InvalidConfig`] for bad
    /// exclude patterns or an unparseable `.gitignore`.
    pub fn new(root: &Path, config: &ScannerConfig) -> Result<Self, ScanError> {
        let unreadable = |reason: String| ScanError::UnreadableRoot {
            path: root.to_path_buf(),
            reason,
        };

        let canonical = std::fs::canonicalize(root).map_err(|e| unreadable(e.to_string()))?;
        if !canonical.is_dir() {
            return Err(unreadable("not a directory".to_string()));
        }
        std::fs::read_dir(&canonical).map_err(|e| unreadable(e.to_string()))?;

        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                GlobPattern::new(p).map_err(|e| ScanError::InvalidConfig {
                    reason: format!("exclude pattern: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let gitignore = if config.respect_gitignore {
            load_gitignore(&canonical)?
        } else {
            None
        };

        Ok(Self {
            root: canonical,
            exclude,
            gitignore,
            follow_links: config.follow_links,
            max_depth: config.max_depth,
        })
    }

    /// Returns the canonical scan root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a new lazy walk of the tree.
    #[must_use]
    pub fn iter(&self) -> ScanIter<'_> {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        let inner = walker.into_iter().filter_entry(move |e| !self.skips(e));
        ScanIter {
            scanner: self,
            inner: Box::new(inner),
        }
    }

    /// Walks the whole tree once and collects the result.
    #[must_use]
    pub fn scan(&self) -> ScanSnapshot {
        let snapshot: ScanSnapshot = self.iter().collect();
        debug!(
            "Scanned {} entries ({} skipped) under {}",
            snapshot.len(),
            snapshot.notes().len(),
            self.root.display()
        );
        snapshot
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn skips(&self, entry: &walkdir::DirEntry) -> bool {
        let rel = self.relative(entry.path());
        if self.exclude.iter().any(|p| p.matches_subtree(&rel)) {
            debug!("Excluding: {rel}");
            return true;
        }
        if let Some(gitignore) = &self.gitignore {
            let is_dir = entry.file_type().is_dir();
            if gitignore.matched(entry.path(), is_dir).is_ignore() {
                debug!("Ignored by .gitignore: {rel}");
                return true;
            }
        }
        false
    }

    fn entry_event(&self, entry: &walkdir::DirEntry) -> ScanEvent {
        let path = self.relative(entry.path());
        // Unfollowed links are classified by their target, and must resolve
        // to count as present.
        let metadata = if entry.path_is_symlink() {
            std::fs::metadata(entry.path())
        } else {
            entry.metadata().map_err(std::io::Error::from)
        };
        let Ok(metadata) = metadata else {
            if entry.path_is_symlink() {
                debug!("Dangling symlink: {path}");
                return ScanEvent::Entry(ScanEntry::dangling(path));
            }
            let kind = if entry.file_type().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            return ScanEvent::Entry(ScanEntry::new(path, kind, 0));
        };
        let event = if metadata.is_dir() {
            ScanEntry::new(path, EntryKind::Directory, 0)
        } else {
            ScanEntry::new(path, EntryKind::File, metadata.len())
        };
        ScanEvent::Entry(event)
    }

    fn error_event(&self, err: &walkdir::Error) -> ScanEvent {
        let path = err.path().map(|p| self.relative(p)).unwrap_or_default();

        if let Some(ancestor) = err.loop_ancestor() {
            let message = format!(
                "symbolic link cycle back to `{}` skipped",
                self.relative(ancestor)
            );
            warn!("{path}: {message}");
            return ScanEvent::Skipped(ScanNote { path, message });
        }

        let dangling = err
            .io_error()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
            && err
                .path()
                .and_then(|p| p.symlink_metadata().ok())
                .is_some_and(|m| m.file_type().is_symlink());
        if dangling {
            debug!("Dangling symlink: {path}");
            return ScanEvent::Entry(ScanEntry::dangling(path));
        }

        let message = format!("unreadable entry skipped: {err}");
        warn!("{path}: {message}");
        ScanEvent::Skipped(ScanNote { path, message })
    }
}

fn load_gitignore(root: &Path) -> Result<Option<Gitignore>, ScanError> {
    let file = root.join(".gitignore");
    if !file.is_file() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(&file) {
        return Err(ScanError::InvalidConfig {
            reason: format!(".gitignore: {err}"),
        });
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| ScanError::InvalidConfig {
            reason: format!(".gitignore: {e}"),
        })
}

type WalkItems<'a> = Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + 'a>;

/// Lazy sequence of scan events for one walk.
pub struct ScanIter<'a> {
    scanner: &'a Scanner,
    inner: WalkItems<'a>,
}

impl Iterator for ScanIter<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| match item {
            Ok(entry) => self.scanner.entry_event(&entry),
            Err(err) => self.scanner.error_event(&err),
        })
    }
}

/// Collected result of one walk, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSnapshot {
    entries: BTreeMap<String, ScanEntry>,
    notes: Vec<ScanNote>,
}

impl ScanSnapshot {
    /// Builds a snapshot from entries, e.g. for an in-memory tree.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ScanEntry>) -> Self {
        entries.into_iter().map(ScanEvent::Entry).collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in path order.
    pub fn entries(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.values()
    }

    /// Looks up an entry by relative path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ScanEntry> {
        self.entries.get(path)
    }

    /// Notes for skipped paths, in walk order.
    #[must_use]
    pub fn notes(&self) -> &[ScanNote] {
        &self.notes
    }
}

impl FromIterator<ScanEvent> for ScanSnapshot {
    fn from_iter<I: IntoIterator<Item = ScanEvent>>(iter: I) -> Self {
        let mut snapshot = Self::default();
        for event in iter {
            match event {
                ScanEvent::Entry(entry) => {
                    snapshot.entries.insert(entry.path.clone(), entry);
                }
                ScanEvent::Skipped(note) => snapshot.notes.push(note),
            }
        }
        snapshot
    }
}
