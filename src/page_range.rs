use std::collections::HashSet;

/// Highest page a range expands to. "1-4000000000" stops here instead of materializing
/// billions of pages; single page numbers are kept as typed so they can be reported out of
/// range.
pub const MAX_RANGE_END: u32 = 1_000_000;

/// How a parsed page set orders its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageOrder {
    /// Ascending by page number, independent of how the pages were typed
    #[default]
    Numeric,
    /// First-occurrence order as the pages appeared in the text
    InputOrder,
}

/// A single comma-separated segment of a page spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Single(i64),
    Range(i64, i64),
}

impl Segment {
    /// Parse one trimmed segment like "5", "1-3" or "9-6".
    ///
    /// Returns `None` for anything that is not a number or a pair of numbers; such segments
    /// contribute no pages. A `-` in the very first position is a sign, not a separator, so
    /// "-2-3" is the range -2..=3 while "1-3-5" splits into "1" and "3-5" and is rejected.
    fn parse(s: &str) -> Option<Self> {
        let separator = s
            .char_indices()
            .skip(1)
            .find(|&(_, c)| c == '-')
            .map(|(i, _)| i);

        match separator {
            Some(dash_pos) => {
                let start = s[..dash_pos].trim().parse::<i64>().ok()?;
                let end = s[dash_pos + 1..].trim().parse::<i64>().ok()?;
                if start > end {
                    Some(Segment::Range(end, start))
                } else {
                    Some(Segment::Range(start, end))
                }
            }
            None => s.parse::<i64>().ok().map(Segment::Single),
        }
    }

    /// Expand into 1-based page numbers, low to high. Values below 1 (or too large to be
    /// a page number) are skipped, and ranges stop at [`MAX_RANGE_END`].
    fn pages(self) -> impl Iterator<Item = u32> {
        let (start, end) = match self {
            Segment::Single(n) => (n, n),
            Segment::Range(start, end) => (start, end.min(i64::from(MAX_RANGE_END))),
        };
        let start = start.max(1);
        let end = end.min(i64::from(u32::MAX));
        (start..=end).filter_map(|p| u32::try_from(p).ok())
    }
}

/// A deduplicated collection of strictly positive page numbers with a fixed ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<u32>,
    order: PageOrder,
}

impl PageSet {
    /// Parse a page spec like "1-3, 8, 10-12".
    ///
    /// Parsing is best-effort per segment: empty segments, non-numeric text, trailing dashes
    /// and chained ranges contribute nothing, and zero or negative pages are dropped even in
    /// the middle of a range. Reversed bounds ("5-2") are accepted. Never fails; an input with
    /// no usable segment yields an empty set.
    pub fn parse(text: &str, order: PageOrder) -> Self {
        let pages = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(Segment::parse)
            .flat_map(Segment::pages);
        Self::from_pages(pages, order)
    }

    /// Build a set from already-numeric pages, applying the same invariants as [`PageSet::parse`].
    pub fn from_pages<I: IntoIterator<Item = u32>>(pages: I, order: PageOrder) -> Self {
        let mut seen = HashSet::new();
        let mut pages: Vec<u32> = pages
            .into_iter()
            .filter(|&p| p > 0 && seen.insert(p))
            .collect();

        if order == PageOrder::Numeric {
            pages.sort_unstable();
        }

        PageSet { pages, order }
    }

    pub fn order(&self) -> PageOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.pages
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }
}

/// Page spec covering every page: "1-N".
pub fn all_pages_spec(total_pages: u32) -> String {
    match total_pages {
        0 => String::new(),
        1 => "1".to_string(),
        n => format!("1-{}", n),
    }
}

/// Page spec listing the odd pages: "1,3,5,...".
pub fn odd_pages_spec(total_pages: u32) -> String {
    stepped_spec(1, total_pages)
}

/// Page spec listing the even pages: "2,4,6,...".
pub fn even_pages_spec(total_pages: u32) -> String {
    stepped_spec(2, total_pages)
}

fn stepped_spec(first: u32, total_pages: u32) -> String {
    (first..=total_pages)
        .step_by(2)
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
