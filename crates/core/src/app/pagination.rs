//! Client-side paging over the filtered event list.

/// One page of a slice. Pages are 1-based.
#[derive(Debug, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// Index of `items[0]` in the full list
    pub offset: usize,
}

impl<T> Page<'_, T> {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Number of pages needed for `total_count` items; never less than one
pub fn total_pages(total_count: usize, per_page: usize) -> usize {
    total_count.div_ceil(per_page.max(1)).max(1)
}

/// Slice out `page`, clamping it into the valid range
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let total_count = items.len();
    let total_pages = total_pages(total_count, per_page);
    let page = page.clamp(1, total_pages);

    let offset = (page - 1) * per_page;
    let end = (offset + per_page).min(total_count);

    Page {
        items: &items[offset.min(total_count)..end],
        page,
        total_pages,
        total_count,
        offset,
    }
}

/// Entry in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
    Number(usize),
    Gap,
}

const MAX_VISIBLE_PAGES: usize = 7;

/// Page numbers to show around `current`: all of them when they fit,
/// otherwise first, last, and the neighbours of `current` with gaps.
pub fn page_markers(current: usize, total: usize) -> Vec<PageMarker> {
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(PageMarker::Number).collect();
    }

    let current = current.clamp(1, total);
    let mut markers = vec![PageMarker::Number(1)];

    if current > 4 {
        markers.push(PageMarker::Gap);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total - 1);
    markers.extend((start..=end).map(PageMarker::Number));

    if current + 3 < total {
        markers.push(PageMarker::Gap);
    }

    markers.push(PageMarker::Number(total));
    markers
}
