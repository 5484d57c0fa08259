use crate::error::{SelectionError, SliceError};
use crate::selection::TargetPageList;
use log::{debug, warn};
use lopdf::encryption::{decrypt_object, PasswordAlgorithm};
use lopdf::xref::XrefEntry;
use lopdf::{Dictionary, Document, EncryptionState, Object, ObjectId, ObjectStream, Reader};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// Copy-loop progress: `completed` pages appended out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

pub struct PdfDocument {
    pub doc: Document,
    pub path: PathBuf,
    encrypted: bool,
    /// File contents, kept only while the document is locked so `unlock` can re-read them.
    locked_bytes: Option<Vec<u8>>,
}

impl PdfDocument {
    /// Load a PDF. An encrypted document that needs a password loads locked; see
    /// [`PdfDocument::unlock`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SliceError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|e| SliceError::Open {
            path: path.clone(),
            source: lopdf::Error::IO(e),
        })?;
        Self::from_bytes(bytes, path)
    }

    /// Load a PDF from memory; `path` is only used for reporting.
    pub fn from_bytes(bytes: Vec<u8>, path: PathBuf) -> Result<Self, SliceError> {
        let mut doc = Document::load_mem(&bytes).map_err(|source| SliceError::Open {
            path: path.clone(),
            source,
        })?;

        // lopdf decrypts on load when the user password is empty; otherwise only the
        // encryption dictionary is read and the objects wait for a password.
        let encrypted = doc.is_encrypted();
        let locked = encrypted && doc.encryption_state.is_none();
        if encrypted && !locked {
            strip_encryption(&mut doc);
        }

        debug!(
            "Opened {} ({} pages, encrypted: {}, locked: {})",
            path.display(),
            doc.get_pages().len(),
            encrypted,
            locked
        );
        Ok(PdfDocument {
            doc,
            path,
            encrypted,
            locked_bytes: locked.then_some(bytes),
        })
    }

    /// Load a PDF and unlock it with `password` if it needs one.
    pub fn open_with_password<P: AsRef<Path>>(
        path: P,
        password: Option<&str>,
    ) -> Result<Self, SliceError> {
        let mut pdf = Self::open(path)?;
        if pdf.is_locked() {
            match password {
                Some(password) => pdf.unlock(password)?,
                None => return Err(SliceError::PasswordRequired),
            }
        }
        Ok(pdf)
    }

    /// Whether the document still needs a password before its pages can be read.
    pub fn is_locked(&self) -> bool {
        self.locked_bytes.is_some()
    }

    /// Whether the source file was encrypted, even if it opened without a password.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Decrypt a locked document with its user password. A document that is not locked is
    /// left alone.
    pub fn unlock(&mut self, password: &str) -> Result<(), SliceError> {
        let Some(bytes) = self.locked_bytes.as_deref() else {
            return Ok(());
        };

        let algorithm = PasswordAlgorithm::try_from(&self.doc)?;
        let password = algorithm
            .sanitize_password(password)
            .map_err(|_| SliceError::IncorrectPassword)?;
        algorithm
            .authenticate_user_password(&self.doc, &password)
            .map_err(|e| {
                debug!("Password rejected for {}: {}", self.path.display(), e);
                SliceError::IncorrectPassword
            })?;
        let state = EncryptionState::decode(&self.doc, &password)?;

        let mut doc = read_decrypted(bytes, &self.doc, state);
        strip_encryption(&mut doc);
        debug!(
            "Unlocked {} ({} pages)",
            self.path.display(),
            doc.get_pages().len()
        );

        self.doc = doc;
        self.locked_bytes = None;
        Ok(())
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get metadata from the document info dictionary
    pub fn get_info(&self) -> PdfInfo {
        let mut info = PdfInfo::default();

        if let Some(dict) = self.info_dictionary() {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.mod_date = get_string_from_dict(dict, b"ModDate");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.keywords = get_string_from_dict(dict, b"Keywords");
        }

        info.page_count = self.page_count();
        info.encrypted = self.encrypted;
        info
    }

    fn info_dictionary(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Build a new document holding exactly `targets`, in that order.
    ///
    /// `progress` is called after each page is appended. When `cancel` becomes true the loop
    /// stops before the next page and the partial document is dropped.
    pub fn slice_pages<F>(
        &self,
        targets: &TargetPageList,
        copy_metadata: bool,
        cancel: Option<&AtomicBool>,
        mut progress: F,
    ) -> Result<Document, SliceError>
    where
        F: FnMut(Progress),
    {
        let page_ids = self.doc.get_pages();
        let mut out = self.doc.clone();
        let pages_root = out.catalog()?.get(b"Pages")?.as_reference()?;

        let total = targets.len();
        let mut kids = Vec::with_capacity(total);

        for (i, page) in targets.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!("Cancelled after {} of {} pages", i, total);
                return Err(SliceError::Cancelled);
            }

            let page_id = *page_ids.get(&page).ok_or_else(|| {
                SelectionError::PagesOutOfRange {
                    pages: vec![page],
                    total: page_ids.len() as u32,
                }
            })?;
            let inherited = self.inherited_attributes(page_id);

            let page_dict = out.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                if !page_dict.has(&key) {
                    page_dict.set(key, value);
                }
            }
            page_dict.set("Parent", Object::Reference(pages_root));
            kids.push(Object::Reference(page_id));

            progress(Progress {
                completed: i + 1,
                total,
            });
        }

        let root = out.get_dictionary_mut(pages_root)?;
        root.set("Kids", Object::Array(kids));
        root.set("Count", Object::Integer(total as i64));
        root.remove(b"Parent");

        // Outlines and labels describe the source numbering.
        let catalog = out.catalog_mut()?;
        catalog.remove(b"Outlines");
        catalog.remove(b"PageLabels");

        if copy_metadata {
            carry_metadata(&mut out);
        } else {
            out.trailer.remove(b"Info");
        }

        let pruned = out.prune_objects();
        debug!("Pruned {} unreachable objects", pruned.len());
        out.compress();

        Ok(out)
    }

    /// Collect attributes `page_id` inherits from its ancestors and does not set itself.
    fn inherited_attributes(&self, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
        let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
        let Ok(page) = self.doc.get_dictionary(page_id) else {
            return found;
        };

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(node_id) = parent {
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                warn!("Page tree above {:?} is too deep; stopped inheriting", page_id);
                break;
            }
            let Ok(node) = self.doc.get_dictionary(node_id) else {
                break;
            };
            for key in INHERITABLE {
                if !page.has(key) && !found.iter().any(|(k, _)| k.as_slice() == key) {
                    if let Ok(value) = node.get(key) {
                        found.push((key.to_vec(), value.clone()));
                    }
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        found
    }
}

/// Keep the Info dictionary only when it resolves; a dangling reference is dropped.
fn carry_metadata(doc: &mut Document) {
    let resolves = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).is_ok(),
        Ok(Object::Dictionary(_)) => true,
        Ok(_) => false,
        Err(_) => return,
    };
    if !resolves {
        warn!("Document metadata could not be copied; continuing without it");
        doc.trailer.remove(b"Info");
    }
}

/// Re-read every object of an encrypted file and decrypt it with `state`.
///
/// `locked` is the document as lopdf loaded it without a password: trailer, cross-reference
/// table and encryption dictionary only. Objects that fail to parse or decrypt are skipped
/// with a warning, as lopdf does for the empty-password case.
fn read_decrypted(bytes: &[u8], locked: &Document, state: EncryptionState) -> Document {
    // Offsets are relative to the header, as in `Reader::read`.
    let header = bytes.windows(5).position(|w| w == b"%PDF-").unwrap_or(0);
    let reader = Reader {
        buffer: &bytes[header..],
        document: locked.clone(),
        encryption_state: None,
        raw_objects: BTreeMap::new(),
    };
    let encrypt_id = locked
        .trailer
        .get(b"Encrypt")
        .and_then(Object::as_reference)
        .ok();

    let mut objects = BTreeMap::new();
    let mut containers = BTreeSet::new();
    for (&number, entry) in &reader.document.reference_table.entries {
        match *entry {
            XrefEntry::Normal { generation, .. } => {
                let id = (number, generation);
                if Some(id) == encrypt_id {
                    continue;
                }
                let mut object = match reader.get_object(id, &mut HashSet::new()) {
                    Ok(object) => object,
                    Err(e) => {
                        warn!("Skipping unreadable object {} {}: {}", number, generation, e);
                        continue;
                    }
                };
                if let Err(e) = decrypt_object(&state, id, &mut object) {
                    warn!("Skipping undecryptable object {} {}: {}", number, generation, e);
                    continue;
                }
                objects.insert(id, object);
            }
            XrefEntry::Compressed { container, .. } => {
                containers.insert(container);
            }
            XrefEntry::Free | XrefEntry::UnusableFree => {}
        }
    }

    let mut doc = reader.document;
    doc.objects.extend(objects);

    // Object streams are decrypted as a whole; their members are plain text.
    for container in containers {
        let Some(Ok(stream)) = doc.objects.get_mut(&(container, 0)).map(Object::as_stream_mut)
        else {
            continue;
        };
        match ObjectStream::new(stream) {
            Ok(object_stream) => {
                for (id, object) in object_stream.objects {
                    doc.objects.entry(id).or_insert(object);
                }
            }
            Err(e) => warn!("Skipping object stream {}: {}", container, e),
        }
    }

    doc.encryption_state = Some(state);
    doc
}

/// Drop the encryption dictionary from a decrypted document so it is saved in the clear.
fn strip_encryption(doc: &mut Document) {
    if let Some(Object::Reference(id)) = doc.trailer.remove(b"Encrypt") {
        doc.objects.remove(&id);
    }
}

#[derive(Debug, Default, Clone)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub page_count: u32,
    pub encrypted: bool,
}

fn get_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    })
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    } else {
        // PDFDocEncoding, approximated as Latin-1
        Some(bytes.iter().map(|&b| b as char).collect())
    }
}
