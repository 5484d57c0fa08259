use std::path::PathBuf;
use thiserror::Error;

/// Why a parsed page set could not be turned into pages to copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No valid pages parsed from your input.")]
    EmptySelection,

    #[error("Pages out of range (PDF has {total} pages): {}", join_pages(.pages))]
    PagesOutOfRange { pages: Vec<u32>, total: u32 },

    #[error("No pages to write after applying your selection.")]
    NoPagesRemaining,
}

/// Everything that can stop a slice before its output is persisted.
#[derive(Debug, Error)]
pub enum SliceError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Please select a PDF file first.")]
    NoDocumentLoaded,

    #[error("Password required to open this PDF.")]
    PasswordRequired,

    #[error("Incorrect password for encrypted PDF.")]
    IncorrectPassword,

    #[error("{0}")]
    DestinationInvalid(String),

    #[error("Failed to open PDF: {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("Malformed PDF structure: {0}")]
    Malformed(#[from] lopdf::Error),

    #[error("Failed to save PDF: {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Slicing was cancelled; no output was written.")]
    Cancelled,
}

/// List pages for a message, collapsing consecutive runs of three or more into "a-b".
fn join_pages(pages: &[u32]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;
    while i < pages.len() {
        let start = pages[i];
        let mut end = start;
        while i + 1 < pages.len() && end.checked_add(1) == Some(pages[i + 1]) {
            end = pages[i + 1];
            i += 1;
        }
        match end - start {
            0 => parts.push(start.to_string()),
            1 => parts.extend([start.to_string(), end.to_string()]),
            _ => parts.push(format!("{}-{}", start, end)),
        }
        i += 1;
    }
    parts.join(", ")
}
