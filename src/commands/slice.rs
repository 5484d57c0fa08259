use crate::cli::SliceArgs;
use anyhow::{Context, Result};
use log::warn;
use pdfslice::page_range::{all_pages_spec, even_pages_spec, odd_pages_spec, PageOrder};
use pdfslice::slice::{normalize_output_name, slice, SliceOptions};
use pdfslice::{SelectionMode, Session, TerminalPrompt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub fn run(args: &SliceArgs, cancel: Arc<AtomicBool>) -> Result<()> {
    let mut session = Session::new();
    let total = session.load(&args.path, args.password.as_deref(), &mut TerminalPrompt)?;

    let page_spec = if args.all {
        all_pages_spec(total)
    } else if args.odd {
        odd_pages_spec(total)
    } else if args.even {
        even_pages_spec(total)
    } else {
        args.pages.clone().unwrap_or_default()
    };

    let output = PathBuf::from(normalize_output_name(&args.output));
    let options = SliceOptions {
        mode: if args.delete {
            SelectionMode::Delete
        } else {
            SelectionMode::Extract
        },
        order: if args.keep_order {
            PageOrder::InputOrder
        } else {
            PageOrder::Numeric
        },
        copy_metadata: !args.no_metadata,
        cancel: Some(cancel),
    };

    let report = slice(&session, &page_spec, &output, &options, |progress| {
        eprint!("\rCopying pages: {}/{}", progress.completed, progress.total);
        let _ = std::io::stderr().flush();
    });
    eprintln!();
    let report =
        report.with_context(|| format!("Failed to slice {}", args.path.display()))?;

    println!(
        "Wrote {} of {} page(s) to {}",
        report.pages.len(),
        report.source_pages,
        report.output.display()
    );

    if args.open {
        open_file(&report.output);
    }

    Ok(())
}

/// Hand `path` to the platform's default viewer. Failures are only logged.
fn open_file(path: &Path) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    if let Err(e) = command.arg(path).spawn() {
        warn!("Could not open {}: {}", path.display(), e);
    }
}
