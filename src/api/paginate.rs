/// Depagination: walk a search result set one page at a time.
///
/// Offsets advance by the page size regardless of how many businesses a
/// page actually held. Iteration ends on the first empty page; the server's
/// `total` is never used as a bound. Any failure is yielded once and ends
/// the iteration.
use std::vec::IntoIter;

use super::errors::YelpError;
use super::params::SearchQuery;
use crate::types::{Business, SearchPage};

/// Page size used when the query has no `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default ceiling on requests per depagination run.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Anything that can fetch one page of search results.
pub trait PageSource {
    /// Fetch the page described by `query` (its `limit`/`offset` are set).
    ///
    /// # Errors
    ///
    /// Whatever the underlying transport reports.
    fn fetch_page(&self, query: &SearchQuery) -> Result<SearchPage, YelpError>;
}

enum State {
    Fetching,
    Yielding(IntoIter<Business>),
    Done,
    Failed,
}

/// Lazy iterator over every business in a result set.
pub struct Depaginator<'a, S: PageSource + ?Sized> {
    source: &'a S,
    query: SearchQuery,
    page_size: u32,
    next_offset: u32,
    pages_fetched: u32,
    max_pages: Option<u32>,
    state: State,
}

impl<'a, S: PageSource + ?Sized> Depaginator<'a, S> {
    /// Start at offset 0. The page size is `query.limit`, or
    /// [`DEFAULT_PAGE_SIZE`]; any `query.offset` is ignored.
    #[must_use]
    pub fn new(source: &'a S, query: &SearchQuery, max_pages: Option<u32>) -> Self {
        Self {
            source,
            page_size: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            query: query.clone(),
            next_offset: 0,
            pages_fetched: 0,
            max_pages,
            state: State::Fetching,
        }
    }

    /// Rewind to the first page. The next pull issues a new request.
    ///
    /// The CLI makes a single pass; library callers can re-walk a result set.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn restart(&mut self) {
        self.next_offset = 0;
        self.pages_fetched = 0;
        self.state = State::Fetching;
    }

    /// Number of page requests issued so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetch the next page and pick the state that follows it.
    fn advance(&mut self) -> Result<State, YelpError> {
        if let Some(max) = self.max_pages {
            if self.pages_fetched >= max {
                tracing::warn!(
                    max_pages = max,
                    offset = self.next_offset,
                    "page ceiling reached, stopping"
                );
                return Ok(State::Done);
            }
        }

        let query = self.query.page(self.page_size, self.next_offset);
        let page = self.source.fetch_page(&query)?;
        tracing::debug!(
            offset = self.next_offset,
            count = page.businesses.len(),
            total = page.total,
            "page fetched"
        );

        self.pages_fetched += 1;
        self.next_offset = self.next_offset.saturating_add(self.page_size);

        if page.businesses.is_empty() {
            Ok(State::Done)
        } else {
            Ok(State::Yielding(page.businesses.into_iter()))
        }
    }
}

impl<S: PageSource + ?Sized> Iterator for Depaginator<'_, S> {
    type Item = Result<Business, YelpError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Yielding(mut page) => {
                    if let Some(business) = page.next() {
                        self.state = State::Yielding(page);
                        return Some(Ok(business));
                    }
                    self.state = State::Fetching;
                }
                State::Fetching => match self.advance() {
                    Ok(next) => self.state = next,
                    Err(err) => {
                        self.state = State::Failed;
                        return Some(Err(err));
                    }
                },
                State::Done => return None,
                State::Failed => {
                    self.state = State::Failed;
                    return None;
                }
            }
        }
    }
}
