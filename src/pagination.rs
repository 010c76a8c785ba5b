/// Pagination primitives for the list endpoints.
///
/// A `Page` is a normalized window over an ordered collection. Callers hand it
/// raw query-string values; anything that does not parse as a positive integer
/// falls back to the defaults, matching the permissive behavior expected of
/// user-facing list endpoints. Ordering is never decided here: the repository
/// orders first, then applies `limit()`/`offset()`.
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 25;

/// A 1-based page number and page size, both guaranteed positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub number: i64,
    pub per_page: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Page {
    pub fn new(number: i64, per_page: i64) -> Self {
        Self {
            number: normalize(Some(number), DEFAULT_PAGE),
            per_page: normalize(Some(per_page), DEFAULT_PER_PAGE),
        }
    }

    /// Builds a page from raw query-string values. `None`, non-numeric text,
    /// zero, and negatives all normalize to the defaults instead of erroring.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            number: normalize(page.and_then(|raw| raw.trim().parse().ok()), DEFAULT_PAGE),
            per_page: normalize(
                per_page.and_then(|raw| raw.trim().parse().ok()),
                DEFAULT_PER_PAGE,
            ),
        }
    }

    /// Offset of the first element of this window within the full collection.
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    /// Maximum number of elements in this window.
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Slices an in-memory collection into this window. Elements beyond the
    /// end of the collection are simply omitted.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.per_page as usize).min(items.len());
        &items[start..end]
    }
}

fn normalize(value: Option<i64>, default: i64) -> i64 {
    match value {
        Some(v) if v > 0 => v,
        _ => default,
    }
}
