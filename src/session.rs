use crate::error::SliceError;
use crate::pdf::PdfDocument;
use log::{debug, info};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Asks the user for a document password.
pub trait PasswordPrompt {
    /// Returns `None` when the user cancels or no one can be asked.
    fn prompt(&mut self, path: &Path) -> Option<String>;
}

/// Never prompts; encrypted documents need a password up front.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl PasswordPrompt for NoPrompt {
    fn prompt(&mut self, _path: &Path) -> Option<String> {
        None
    }
}

/// Reads the password from the controlling terminal with echo off, when stdin is a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&mut self, path: &Path) -> Option<String> {
        if !io::stdin().is_terminal() {
            return None;
        }

        let password =
            rpassword::prompt_password(format!("Enter password for {}: ", path.display()))
                .map_err(|e| debug!("Password prompt failed: {}", e))
                .ok()?;
        (!password.is_empty()).then_some(password)
    }
}

#[derive(Debug, Clone)]
struct LoadedDocument {
    path: PathBuf,
    page_count: u32,
    password: Option<String>,
}

/// The document a user is working on, and the password that unlocked it.
///
/// The password is cached on the first successful unlock, reused for every later open of
/// the same document, and forgotten when another document is loaded or the session is reset.
#[derive(Debug, Default, Clone)]
pub struct Session {
    loaded: Option<LoadedDocument>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` to learn its page count, replacing whatever was loaded before.
    ///
    /// If the document is encrypted, `password` is tried first; without one the prompt is
    /// asked once. A rejected password is reported, never retried.
    pub fn load<P: AsRef<Path>>(
        &mut self,
        path: P,
        password: Option<&str>,
        prompt: &mut dyn PasswordPrompt,
    ) -> Result<u32, SliceError> {
        let path = path.as_ref();
        self.loaded = None;

        let mut pdf = PdfDocument::open(path)?;
        let mut accepted = None;
        if pdf.is_locked() {
            let password = match password {
                Some(password) => password.to_string(),
                None => prompt.prompt(path).ok_or(SliceError::PasswordRequired)?,
            };
            if let Err(e) = pdf.unlock(&password) {
                info!("Password rejected for {}", path.display());
                return Err(e);
            }
            accepted = Some(password);
        }

        let page_count = pdf.page_count();
        info!("Loaded {} ({} pages)", path.display(), page_count);
        self.loaded = Some(LoadedDocument {
            path: path.to_path_buf(),
            page_count,
            password: accepted,
        });
        Ok(page_count)
    }

    /// Reopen the loaded document, unlocking it with the cached password.
    pub fn open_document(&self) -> Result<PdfDocument, SliceError> {
        let loaded = self.loaded.as_ref().ok_or(SliceError::NoDocumentLoaded)?;
        debug!(
            "Reopening {} (cached password: {})",
            loaded.path.display(),
            loaded.password.is_some()
        );
        PdfDocument::open_with_password(&loaded.path, loaded.password.as_deref())
    }

    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    /// Page count as of the last load; stale if the file changed since.
    pub fn page_count(&self) -> Option<u32> {
        self.loaded.as_ref().map(|l| l.page_count)
    }

    pub fn has_password(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.password.is_some())
    }

    pub fn reset(&mut self) {
        self.loaded = None;
    }
}
