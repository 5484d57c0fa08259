//! Slice a PDF down to a subset of its pages.
//!
//! A page spec like `"1-3, 8, 10-12"` is parsed into a [`PageSet`], turned into a
//! [`TargetPageList`] by [`select`] under an extract or delete [`SelectionMode`], and the
//! [`slice`] workflow copies those pages into a new document.

pub mod error;
pub mod page_range;
pub mod pdf;
pub mod selection;
pub mod session;
pub mod slice;

pub use error::{SelectionError, SliceError};
pub use page_range::{PageOrder, PageSet};
pub use selection::{select, SelectionMode, TargetPageList};
pub use session::{NoPrompt, PasswordPrompt, Session, TerminalPrompt};
pub use slice::{slice, SliceOptions, SliceReport};
