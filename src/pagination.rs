//! This modules defines the common functionality for paging data.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{Error, Record};

/// Which page of a collection to show.
///
/// `page` is zero-based. The page size is guaranteed to be non-zero: a zero
/// page size is a caller bug and is rejected by [PageRequest::new].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// The zero-based page index.
    pub page: usize,
    /// The maximum number of rows on a page.
    pub page_size: NonZeroUsize,
}

impl PageRequest {
    /// Create a page request.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `page_size` is zero.
    pub fn new(page: usize, page_size: usize) -> Result<Self, Error> {
        let page_size = NonZeroUsize::new(page_size).ok_or(Error::InvalidPageSize)?;

        Ok(Self { page, page_size })
    }

    /// The index of the first row on the page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size.get())
    }
}

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// The rows on this page, at most `page_size` of them.
    pub rows: Vec<Record>,
    /// The length of the whole filtered collection.
    pub total_count: usize,
    /// The zero-based page index that was requested.
    pub page: usize,
    /// The page size that was requested.
    pub page_size: usize,
}

impl PageResult {
    /// The number of pages needed to show every row; zero for an empty collection.
    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    /// Whether there are rows after this page.
    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.page_count()
    }

    /// Whether there is a page before this one.
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

/// Slice `records` into the page described by `request`.
///
/// A page past the end of the collection is not an error: it yields no rows
/// while still reporting the true `total_count`.
pub fn paginate(records: &[Record], request: PageRequest) -> PageResult {
    let start = request.offset().min(records.len());
    let end = start.saturating_add(request.page_size.get()).min(records.len());

    PageResult {
        rows: records[start..end].to_vec(),
        total_count: records.len(),
        page: request.page,
        page_size: request.page_size.get(),
    }
}

/// The page a table view is on, with the transitions the table controls allow.
///
/// Changing the page size jumps back to the first page since the old offset
/// no longer points anywhere meaningful. Changing the filter does not touch
/// the page, so a narrower filter can leave the view on a page past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    request: PageRequest,
}

impl PageState {
    /// Start on the first page.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `page_size` is zero.
    pub fn new(page_size: usize) -> Result<Self, Error> {
        Ok(Self {
            request: PageRequest::new(0, page_size)?,
        })
    }

    /// The current request.
    pub fn request(&self) -> PageRequest {
        self.request
    }

    /// Go to `page`.
    pub fn set_page(&mut self, page: usize) {
        self.request.page = page;
    }

    /// Change the page size and go back to the first page.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `page_size` is zero, leaving the state unchanged.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), Error> {
        self.request = PageRequest::new(0, page_size)?;
        Ok(())
    }
}
