//! File selection model
//!
//! Mirrors the platform file-list (the `<input type="file">` in the browser)
//! and keeps the two in sync. Every mutation goes through a
//! [`SelectionStrategy`] chosen once at start-up:
//!
//! - [`MutableMerge`]: the platform can build file-lists programmatically, so
//!   new files are appended and single files can be removed.
//! - [`ReplaceOnUnsupported`]: it cannot, so each pick or drop replaces the
//!   selection and removing a file clears everything.
//!
//! When a strategy cannot keep the platform list intact, the selection is
//! cleared on both sides instead of drifting apart.

use crate::error::SelectionError;
use crate::format::{format_bytes, FileKind};
use serde::Serialize;
use tracing::{debug, warn};

/// A file handle provided by the platform
pub trait FileHandle: Clone {
    fn name(&self) -> String;
    fn size(&self) -> u64;
}

/// The platform-side file-list the selection mirrors
pub trait FileListTarget {
    type File: FileHandle;
    /// The platform's own list object, as delivered by a picker or drop
    type Native;

    /// Replace the platform list with `files`, in order.
    fn assign(&mut self, files: &[Self::File]) -> Result<(), SelectionError>;

    /// Replace the platform list with a list it produced itself. Cannot fail.
    fn adopt(&mut self, native: &Self::Native);

    /// Empty the platform list. Cannot fail.
    fn clear(&mut self);
}

/// Files delivered by one picker change or drop event
#[derive(Debug, Clone)]
pub struct FileBatch<N, F> {
    pub native: N,
    pub files: Vec<F>,
}

impl<N, F> FileBatch<N, F> {
    pub fn new(native: N, files: Vec<F>) -> Self {
        Self { native, files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// How additions and removals reach the platform file-list
pub trait SelectionStrategy<T: FileListTarget> {
    fn name(&self) -> &'static str;

    /// Apply `batch` on top of `current`; returns the new selection.
    fn add(
        &self,
        target: &mut T,
        current: &[T::File],
        batch: FileBatch<T::Native, T::File>,
    ) -> Vec<T::File>;

    /// Drop `current[index]`; `index` is known to be in range.
    fn remove(
        &self,
        target: &mut T,
        current: &[T::File],
        index: usize,
    ) -> Result<Vec<T::File>, SelectionError>;
}

/// Append to and remove from the platform list by rebuilding it
#[derive(Debug, Clone, Copy, Default)]
pub struct MutableMerge;

impl<T: FileListTarget> SelectionStrategy<T> for MutableMerge {
    fn name(&self) -> &'static str {
        "mutable-merge"
    }

    fn add(
        &self,
        target: &mut T,
        current: &[T::File],
        batch: FileBatch<T::Native, T::File>,
    ) -> Vec<T::File> {
        let mut merged = current.to_vec();
        merged.extend(batch.files.iter().cloned());

        match target.assign(&merged) {
            Ok(()) => merged,
            Err(e) => {
                warn!(error = %e, "merging files failed, keeping only the new batch");
                target.adopt(&batch.native);
                batch.files
            }
        }
    }

    fn remove(
        &self,
        target: &mut T,
        current: &[T::File],
        index: usize,
    ) -> Result<Vec<T::File>, SelectionError> {
        let remaining: Vec<T::File> = current
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, f)| f.clone())
            .collect();

        target.assign(&remaining)?;
        Ok(remaining)
    }
}

/// Replace the selection on every pick; removal is not possible
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceOnUnsupported;

impl<T: FileListTarget> SelectionStrategy<T> for ReplaceOnUnsupported {
    fn name(&self) -> &'static str {
        "replace-on-unsupported"
    }

    fn add(
        &self,
        target: &mut T,
        _current: &[T::File],
        batch: FileBatch<T::Native, T::File>,
    ) -> Vec<T::File> {
        target.adopt(&batch.native);
        batch.files
    }

    fn remove(
        &self,
        _target: &mut T,
        _current: &[T::File],
        _index: usize,
    ) -> Result<Vec<T::File>, SelectionError> {
        Err(SelectionError::RemovalUnsupported)
    }
}

/// Strategy selector, resolved once from a platform capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    MutableMerge,
    ReplaceOnUnsupported,
}

impl StrategyKind {
    /// Pick the strategy for a platform that can (or cannot) construct
    /// file-lists programmatically
    pub fn detect(can_build_file_list: bool) -> Self {
        if can_build_file_list {
            StrategyKind::MutableMerge
        } else {
            StrategyKind::ReplaceOnUnsupported
        }
    }

    pub fn build<T: FileListTarget>(self) -> Box<dyn SelectionStrategy<T>> {
        match self {
            StrategyKind::MutableMerge => Box::new(MutableMerge),
            StrategyKind::ReplaceOnUnsupported => Box::new(ReplaceOnUnsupported),
        }
    }
}

/// One visible entry of the selected-files list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRow {
    /// Position of the file in the platform list (what removal targets)
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub kind: FileKind,
    pub icon: &'static str,
}

/// The files the user intends to upload
pub struct FileSelection<T: FileListTarget> {
    target: T,
    files: Vec<T::File>,
    strategy: Box<dyn SelectionStrategy<T>>,
}

impl<T: FileListTarget> FileSelection<T> {
    pub fn new(target: T, kind: StrategyKind) -> Self {
        Self::with_strategy(target, kind.build())
    }

    pub fn with_strategy(target: T, strategy: Box<dyn SelectionStrategy<T>>) -> Self {
        Self {
            target,
            files: Vec::new(),
            strategy,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Files in platform order
    pub fn files(&self) -> &[T::File] {
        &self.files
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(FileHandle::size).sum()
    }

    /// Merge a picked or dropped batch into the selection
    ///
    /// Returns the number of files now selected. An empty batch is a no-op.
    pub fn add(&mut self, batch: FileBatch<T::Native, T::File>) -> usize {
        if batch.is_empty() {
            return self.files.len();
        }

        let incoming = batch.len();
        self.files = self.strategy.add(&mut self.target, &self.files, batch);
        debug!(
            incoming,
            selected = self.files.len(),
            strategy = self.strategy.name(),
            "files added"
        );
        self.files.len()
    }

    /// Remove the file at `index` (platform order)
    ///
    /// An out-of-range index changes nothing. Any other failure clears the
    /// whole selection so the platform list and this model stay equal.
    pub fn remove(&mut self, index: usize) -> Result<(), SelectionError> {
        if index >= self.files.len() {
            return Err(SelectionError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }

        match self.strategy.remove(&mut self.target, &self.files, index) {
            Ok(remaining) => {
                debug!(index, remaining = remaining.len(), "file removed");
                self.files = remaining;
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "file removal failed, clearing selection");
                self.clear();
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.target.clear();
        self.files.clear();
    }

    /// Write the selection back to the platform list
    ///
    /// Used when the platform emptied its list on its own (a cancelled
    /// picker). If the list cannot be rebuilt the selection is cleared.
    pub fn resync(&mut self) -> Result<(), SelectionError> {
        if let Err(e) = self.target.assign(&self.files) {
            debug!(error = %e, "cannot restore file list, clearing selection");
            self.clear();
            return Err(e);
        }
        Ok(())
    }

    /// Rows for display, sorted by file name
    pub fn rows(&self) -> Vec<FileRow> {
        let mut rows: Vec<FileRow> = self
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let name = file.name();
                let size = file.size();
                let kind = FileKind::from_name(&name);
                FileRow {
                    index,
                    size_label: format_bytes(size),
                    icon: kind.icon(),
                    kind,
                    name,
                    size,
                }
            })
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }
}
