#![allow(dead_code)]

use lopdf::{
    dictionary, Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream,
};
use std::path::{Path, PathBuf};

/// Write a `pages`-page PDF whose page `n` has a MediaBox `600 + n` units wide.
pub fn write_fixture(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let mut doc = fixture_document(pages);
    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Like [`write_fixture`], but RC4-encrypted. An empty `user_password` gives a file that opens
/// without a password and only restricts permissions.
pub fn write_encrypted_fixture(
    dir: &Path,
    name: &str,
    pages: u32,
    user_password: &str,
    owner_password: &str,
) -> PathBuf {
    let mut doc = fixture_document(pages);
    let id = Object::string_literal(b"pdfslice-fixture".to_vec());
    doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    })
    .unwrap();
    doc.encrypt(&state).unwrap();

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

fn fixture_document(pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", n);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), Object::Integer(600 + i64::from(n)), 800.into()],
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => i64::from(pages),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal("Fixture"),
        "Author" => Object::string_literal("pdfslice tests"),
    });
    doc.trailer.set("Info", info_id);
    doc
}

/// Recover the page numbers of a fixture-derived PDF from its MediaBox widths.
pub fn page_numbers(path: &Path) -> Vec<u32> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let page = doc.get_dictionary(id).unwrap();
            let width = page.get(b"MediaBox").unwrap().as_array().unwrap()[2]
                .as_i64()
                .unwrap();
            (width - 600) as u32
        })
        .collect()
}

/// Files left in `dir` other than `keep`.
pub fn stray_files(dir: &Path, keep: &[&Path]) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| !keep.contains(&path.as_path()))
        .collect()
}
