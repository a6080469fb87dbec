//! Browser file-list target
//!
//! Binds the selection model to an `<input type="file">`. Rebuilding the
//! input's `FileList` requires the `DataTransfer` constructor; browsers
//! without it get the replace strategy.

use crate::http::describe;
use docconvert_core::{FileBatch, FileHandle, FileListTarget, SelectionError};
use web_sys::{DataTransfer, File, FileList, HtmlInputElement};

/// A browser `File`
#[derive(Debug, Clone)]
pub struct WebFile(pub File);

impl FileHandle for WebFile {
    fn name(&self) -> String {
        self.0.name()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }
}

pub type WebBatch = FileBatch<Option<FileList>, WebFile>;

/// The page's file input
pub struct InputFileList {
    input: HtmlInputElement,
}

impl InputFileList {
    pub fn new(input: HtmlInputElement) -> Self {
        Self { input }
    }
}

impl FileListTarget for InputFileList {
    type File = WebFile;
    type Native = Option<FileList>;

    fn assign(&mut self, files: &[WebFile]) -> Result<(), SelectionError> {
        let transfer = DataTransfer::new().map_err(|e| SelectionError::Platform(describe(&e)))?;
        let items = transfer.items();
        for file in files {
            items
                .add_with_file(&file.0)
                .map_err(|e| SelectionError::Platform(describe(&e)))?;
        }
        self.input.set_files(transfer.files().as_ref());
        Ok(())
    }

    fn adopt(&mut self, native: &Option<FileList>) {
        self.input.set_files(native.as_ref());
    }

    fn clear(&mut self) {
        self.input.set_value("");
    }
}

/// Collect a picker or drop `FileList` into a batch
pub fn batch_from_list(list: Option<FileList>) -> WebBatch {
    let files = list
        .as_ref()
        .map(|list| {
            (0..list.length())
                .filter_map(|i| list.get(i))
                .map(WebFile)
                .collect()
        })
        .unwrap_or_default();
    FileBatch::new(list, files)
}

/// Whether this browser can build a `FileList` programmatically
pub fn can_build_file_list() -> bool {
    DataTransfer::new().is_ok()
}
