use crate::error::SliceError;
use crate::page_range::{PageOrder, PageSet};
use crate::pdf::Progress;
use crate::selection::{select, SelectionMode};
use crate::session::Session;
use log::{debug, info};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const DEFAULT_OUTPUT_NAME: &str = "sliced_output.pdf";

pub const PAGE_SPEC_HINT: &str = "e.g., 1-3, 8, 10-12";

pub struct SliceOptions {
    pub mode: SelectionMode,
    pub order: PageOrder,
    pub copy_metadata: bool,
    /// Checked between page copies; setting it abandons the slice without writing anything.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SliceOptions {
    fn default() -> Self {
        SliceOptions {
            mode: SelectionMode::Extract,
            order: PageOrder::Numeric,
            copy_metadata: true,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceReport {
    pub output: PathBuf,
    pub pages: Vec<u32>,
    pub source_pages: u32,
}

/// Fill in the default output name and make sure it ends in `.pdf`.
pub fn normalize_output_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return DEFAULT_OUTPUT_NAME.to_string();
    }
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{}.pdf", name)
    }
}

/// Reject an output that would overwrite the source or land in a missing or unwritable
/// directory.
///
/// Writability is checked by creating (and dropping) a staging file in the directory, the same
/// way the output is later written.
pub fn validate_destination(source: &Path, output: &Path) -> Result<(), SliceError> {
    let dir = output_dir(output);
    if !dir.is_dir() {
        return Err(SliceError::DestinationInvalid(format!(
            "Directory does not exist: {}",
            dir.display()
        )));
    }
    if let Err(e) = staging_file(dir) {
        debug!("Cannot create a file in {}: {}", dir.display(), e);
        return Err(SliceError::DestinationInvalid(format!(
            "Directory is not writable: {}",
            dir.display()
        )));
    }

    let output_file = output.file_name().ok_or_else(|| {
        SliceError::DestinationInvalid(format!("Not a file path: {}", output.display()))
    })?;
    let resolved_output = fs::canonicalize(dir)?.join(output_file);
    let same = match fs::canonicalize(source) {
        Ok(source) => source == resolved_output,
        Err(_) => source == output,
    };
    if same {
        return Err(SliceError::DestinationInvalid(
            "Output path cannot be the same as the source PDF.".to_string(),
        ));
    }

    Ok(())
}

fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(".pdfslice-")
        .suffix(".pdf")
        .tempfile_in(dir)
}

fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Slice the session's document into `output`.
///
/// The destination is checked before anything is read, the document is reopened with the
/// session's cached password, and the page count is re-read so a changed file is caught.
/// Output is written to a temporary file next to `output` and renamed into place only once
/// complete; on any failure or cancellation no file is left behind.
pub fn slice<F>(
    session: &Session,
    page_spec: &str,
    output: &Path,
    options: &SliceOptions,
    progress: F,
) -> Result<SliceReport, SliceError>
where
    F: FnMut(Progress),
{
    let source = session.path().ok_or(SliceError::NoDocumentLoaded)?;
    validate_destination(source, output)?;

    let pages = PageSet::parse(page_spec, options.order);
    debug!("Parsed {:?} into {} page(s)", page_spec, pages.len());

    let pdf = session.open_document()?;
    let total = pdf.page_count();
    let targets = select(&pages, total, options.mode)?;
    info!(
        "{:?}: writing {} of {} page(s) to {}",
        options.mode,
        targets.len(),
        total,
        output.display()
    );

    let mut doc = pdf.slice_pages(
        &targets,
        options.copy_metadata,
        options.cancel.as_deref(),
        progress,
    )?;
    drop(pdf);

    let mut staged = staging_file(output_dir(output))?;
    let save_error = |source: io::Error| SliceError::Save {
        path: output.to_path_buf(),
        source,
    };
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        doc.save_to(&mut writer)
            .map_err(|e| save_error(io::Error::other(e.to_string())))?;
        writer.flush().map_err(save_error)?;
    }
    staged.persist(output).map_err(|e| save_error(e.error))?;
    info!("Saved {}", output.display());

    Ok(SliceReport {
        output: output.to_path_buf(),
        pages: targets.into_vec(),
        source_pages: total,
    })
}
