use crate::error::SelectionError;
use crate::page_range::PageSet;
use std::collections::HashSet;

/// What to do with the pages a user named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Keep exactly the named pages, in page-set order
    #[default]
    Extract,
    /// Keep every page except the named ones, in document order
    Delete,
}

/// The validated, ordered, non-empty list of 1-based pages to copy into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPageList(Vec<u32>);

impl TargetPageList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty selection is rejected by [`select`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

/// Derive the pages to copy from a parsed page set and the document's page count.
///
/// Named pages are bounds-checked against `total_pages` in both modes. Extract keeps the
/// page set's order; Delete always yields the remaining pages in ascending document order.
pub fn select(
    pages: &PageSet,
    total_pages: u32,
    mode: SelectionMode,
) -> Result<TargetPageList, SelectionError> {
    if pages.is_empty() {
        return Err(SelectionError::EmptySelection);
    }

    let out_of_range: Vec<u32> = pages
        .iter()
        .filter(|&p| p < 1 || p > total_pages)
        .collect();
    if !out_of_range.is_empty() {
        return Err(SelectionError::PagesOutOfRange {
            pages: out_of_range,
            total: total_pages,
        });
    }

    let targets: Vec<u32> = match mode {
        SelectionMode::Extract => pages.as_slice().to_vec(),
        SelectionMode::Delete => {
            let removed: HashSet<u32> = pages.iter().collect();
            (1..=total_pages).filter(|p| !removed.contains(p)).collect()
        }
    };

    if targets.is_empty() {
        return Err(SelectionError::NoPagesRemaining);
    }

    Ok(TargetPageList(targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::PageOrder;

    fn set(pages: &[u32]) -> PageSet {
        PageSet::from_pages(pages.iter().copied(), PageOrder::Numeric)
    }

    #[test]
    fn test_extract_single() {
        let targets = select(&set(&[2]), 5, SelectionMode::Extract).unwrap();
        assert_eq!(targets.as_slice(), &[2]);
    }

    #[test]
    fn test_delete_single() {
        let targets = select(&set(&[2]), 5, SelectionMode::Delete).unwrap();
        assert_eq!(targets.as_slice(), &[1, 3, 4, 5]);
    }

    #[test]
    fn test_out_of_range_extract() {
        let err = select(&set(&[2, 5]), 4, SelectionMode::Extract).unwrap_err();
        assert_eq!(
            err,
            SelectionError::PagesOutOfRange {
                pages: vec![5],
                total: 4
            }
        );
    }

    #[test]
    fn test_out_of_range_checked_in_delete_mode() {
        let err = select(&set(&[1, 7, 9]), 4, SelectionMode::Delete).unwrap_err();
        assert_eq!(
            err,
            SelectionError::PagesOutOfRange {
                pages: vec![7, 9],
                total: 4
            }
        );
    }

    #[test]
    fn test_delete_everything() {
        let err = select(&set(&[1, 2, 3]), 3, SelectionMode::Delete).unwrap_err();
        assert_eq!(err, SelectionError::NoPagesRemaining);
    }

    #[test]
    fn test_empty_selection() {
        let empty = PageSet::parse("abc", PageOrder::Numeric);
        assert_eq!(
            select(&empty, 3, SelectionMode::Extract).unwrap_err(),
            SelectionError::EmptySelection
        );
        assert_eq!(
            select(&empty, 3, SelectionMode::Delete).unwrap_err(),
            SelectionError::EmptySelection
        );
    }

    #[test]
    fn test_zero_page_document() {
        let err = select(&set(&[1]), 0, SelectionMode::Extract).unwrap_err();
        assert!(matches!(err, SelectionError::PagesOutOfRange { total: 0, .. }));
    }

    #[test]
    fn test_extract_keeps_input_order() {
        let pages = PageSet::parse("8, 1-3, 8, 2", PageOrder::InputOrder);
        let targets = select(&pages, 10, SelectionMode::Extract).unwrap();
        assert_eq!(targets.as_slice(), &[8, 1, 2, 3]);
    }

    #[test]
    fn test_delete_ignores_input_order() {
        let pages = PageSet::parse("5, 2", PageOrder::InputOrder);
        let targets = select(&pages, 6, SelectionMode::Delete).unwrap();
        assert_eq!(targets.as_slice(), &[1, 3, 4, 6]);
    }

    #[test]
    fn test_select_is_repeatable() {
        let pages = PageSet::parse("3, 1", PageOrder::InputOrder);
        let first = select(&pages, 4, SelectionMode::Extract).unwrap();
        let second = select(&pages, 4, SelectionMode::Extract).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_all_is_full_copy() {
        let pages = PageSet::parse("1-6", PageOrder::Numeric);
        let targets = select(&pages, 6, SelectionMode::Extract).unwrap();
        assert_eq!(targets.into_vec(), (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_huge_range_reported_out_of_range() {
        let pages = PageSet::parse("1-4000000000", PageOrder::Numeric);
        let err = select(&pages, 10, SelectionMode::Extract).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Pages out of range (PDF has 10 pages): 11-1000000"
        );
    }
}
