mod common;

use common::{page_numbers, stray_files, write_encrypted_fixture};
use lopdf::Document;
use pdfslice::{
    slice, NoPrompt, PageOrder, PasswordPrompt, SelectionMode, Session, SliceError, SliceOptions,
};
use std::path::Path;
use tempfile::TempDir;

/// Answers every prompt with the same reply and counts how often it was asked.
struct ScriptedPrompt {
    reply: Option<&'static str>,
    asked: usize,
}

impl ScriptedPrompt {
    fn new(reply: Option<&'static str>) -> Self {
        ScriptedPrompt { reply, asked: 0 }
    }
}

impl PasswordPrompt for ScriptedPrompt {
    fn prompt(&mut self, _path: &Path) -> Option<String> {
        self.asked += 1;
        self.reply.map(str::to_string)
    }
}

fn input_order() -> SliceOptions {
    SliceOptions {
        mode: SelectionMode::Extract,
        order: PageOrder::InputOrder,
        ..Default::default()
    }
}

#[test]
fn test_password_required_without_prompt() {
    let dir = TempDir::new().unwrap();
    let source = write_encrypted_fixture(dir.path(), "locked.pdf", 5, "secret", "owner");

    let mut session = Session::new();
    let err = session.load(&source, None, &mut NoPrompt).unwrap_err();
    assert!(matches!(err, SliceError::PasswordRequired));
    assert!(session.path().is_none());
}

#[test]
fn test_wrong_password_is_asked_once() {
    let dir = TempDir::new().unwrap();
    let source = write_encrypted_fixture(dir.path(), "locked.pdf", 5, "secret", "owner");

    let mut prompt = ScriptedPrompt::new(Some("guess"));
    let mut session = Session::new();
    let err = session.load(&source, None, &mut prompt).unwrap_err();
    assert!(matches!(err, SliceError::IncorrectPassword));
    assert_eq!(prompt.asked, 1);
    assert!(!session.has_password());
}

#[test]
fn test_prompted_password_is_cached_for_slice() {
    let dir = TempDir::new().unwrap();
    let source = write_encrypted_fixture(dir.path(), "locked.pdf", 5, "secret", "owner");
    let output = dir.path().join("out.pdf");

    let mut prompt = ScriptedPrompt::new(Some("secret"));
    let mut session = Session::new();
    assert_eq!(session.load(&source, None, &mut prompt).unwrap(), 5);
    assert_eq!(prompt.asked, 1);
    assert!(session.has_password());

    let report = slice(&session, "4, 2", &output, &input_order(), |_| {}).unwrap();
    assert_eq!(report.pages, vec![4, 2]);
    assert_eq!(report.source_pages, 5);
    assert_eq!(page_numbers(&output), vec![4, 2]);
    assert!(!Document::load(&output).unwrap().is_encrypted());
    assert_eq!(prompt.asked, 1);
}

#[test]
fn test_password_argument_skips_prompt() {
    let dir = TempDir::new().unwrap();
    let source = write_encrypted_fixture(dir.path(), "locked.pdf", 3, "secret", "owner");

    let mut prompt = ScriptedPrompt::new(None);
    let mut session = Session::new();
    assert_eq!(session.load(&source, Some("secret"), &mut prompt).unwrap(), 3);
    assert_eq!(prompt.asked, 0);

    let info = session.open_document().unwrap().get_info();
    assert!(info.encrypted);
    assert_eq!(info.title.as_deref(), Some("Fixture"));
}

#[test]
fn test_owner_only_document_opens_without_prompt() {
    let dir = TempDir::new().unwrap();
    let source = write_encrypted_fixture(dir.path(), "restricted.pdf", 4, "", "owner");
    let output = dir.path().join("out.pdf");

    let mut prompt = ScriptedPrompt::new(None);
    let mut session = Session::new();
    assert_eq!(session.load(&source, None, &mut prompt).unwrap(), 4);
    assert_eq!(prompt.asked, 0);
    assert!(!session.has_password());
    assert!(session.open_document().unwrap().get_info().encrypted);

    let options = SliceOptions {
        mode: SelectionMode::Delete,
        ..Default::default()
    };
    slice(&session, "1", &output, &options, |_| {}).unwrap();
    assert_eq!(page_numbers(&output), vec![2, 3, 4]);
    assert!(!Document::load(&output).unwrap().is_encrypted());
    assert!(stray_files(dir.path(), &[&source, &output]).is_empty());
}
