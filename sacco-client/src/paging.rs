//! Paginated list state
//!
//! A list is `{page, per_page, filter}`; every change yields exactly one
//! [`ListRequest`]. Requests carry a token and only the response to the latest
//! token is applied, so a slow earlier fetch can never overwrite a newer one.

use shared::client::{
    CorrectionFilter, CorrectionQuery, MemberQuery, SearchLogQuery, SuccessFilter,
    VerificationQuery,
};
use shared::pagination::PageResponse;

/// One fetch to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest<F> {
    pub token: u64,
    pub page: u32,
    pub per_page: u32,
    pub filter: F,
}

#[derive(Debug, Clone)]
pub struct ListState<F> {
    page: u32,
    per_page: u32,
    filter: F,
    total: Option<u64>,
    total_pages: u32,
    latest: u64,
}

impl<F: Clone + PartialEq> ListState<F> {
    pub fn new(per_page: u32, filter: F) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            filter,
            total: None,
            total_pages: 1,
            latest: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// A request for the current state
    pub fn request(&mut self) -> ListRequest<F> {
        self.latest += 1;
        ListRequest {
            token: self.latest,
            page: self.page,
            per_page: self.per_page,
            filter: self.filter.clone(),
        }
    }

    /// `None` (and no state change) outside `1..=total_pages`
    pub fn go_to_page(&mut self, page: u32) -> Option<ListRequest<F>> {
        if page < 1 || page > self.total_pages {
            return None;
        }
        self.page = page;
        Some(self.request())
    }

    pub fn first(&mut self) -> Option<ListRequest<F>> {
        if !self.has_previous() {
            return None;
        }
        self.go_to_page(1)
    }

    pub fn previous(&mut self) -> Option<ListRequest<F>> {
        if !self.has_previous() {
            return None;
        }
        self.go_to_page(self.page - 1)
    }

    pub fn next(&mut self) -> Option<ListRequest<F>> {
        if !self.has_next() {
            return None;
        }
        self.go_to_page(self.page + 1)
    }

    pub fn last(&mut self) -> Option<ListRequest<F>> {
        if !self.has_next() {
            return None;
        }
        self.go_to_page(self.total_pages)
    }

    /// First/Previous enabled
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Next/Last enabled
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// New filter: back to page 1 before the fetch
    pub fn set_filter(&mut self, filter: F) -> ListRequest<F> {
        self.filter = filter;
        self.page = 1;
        self.request()
    }

    pub fn is_latest(&self, token: u64) -> bool {
        token == self.latest
    }

    /// Record paging info from a response
    ///
    /// When the list shrank below the current page (rows deleted on the last
    /// page), the page is pulled back to the new last page and the request for
    /// it is returned instead of showing an empty page past the end.
    pub fn accept<P: PageResponse>(&mut self, token: u64, response: &P) -> Accept<F> {
        if !self.is_latest(token) {
            tracing::debug!(token, latest = self.latest, "Ignoring stale list response");
            return Accept::Stale;
        }
        self.total = response.total();
        self.total_pages = response.total_pages(self.per_page);
        if self.page > self.total_pages {
            tracing::debug!(
                page = self.page,
                total_pages = self.total_pages,
                "Page past the end, moving to the last page"
            );
            self.page = self.total_pages;
            return Accept::Refetch(self.request());
        }
        Accept::Applied
    }
}

/// What to do with a list response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accept<F> {
    /// A newer request is outstanding; the response was dropped
    Stale,
    Applied,
    /// The current page no longer exists; fetch this one instead
    Refetch(ListRequest<F>),
}

/// Pager buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    First,
    Previous,
    Next,
    Last,
    Page(u32),
}

impl Nav {
    pub fn apply<F: Clone + PartialEq>(self, state: &mut ListState<F>) -> Option<ListRequest<F>> {
        match self {
            Nav::First => state.first(),
            Nav::Previous => state.previous(),
            Nav::Next => state.next(),
            Nav::Last => state.last(),
            Nav::Page(page) => state.go_to_page(page),
        }
    }
}

/// List state plus the rows currently shown
#[derive(Debug, Clone)]
pub struct PagedList<F, T> {
    pub state: ListState<F>,
    items: Vec<T>,
    loading: bool,
}

impl<F: Clone + PartialEq, T> PagedList<F, T> {
    pub fn new(per_page: u32, filter: F) -> Self {
        Self {
            state: ListState::new(per_page, filter),
            items: Vec::new(),
            loading: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin(&mut self, request: &ListRequest<F>) {
        self.loading = self.state.is_latest(request.token);
    }

    /// Replace the rows if `token` is still the latest request
    ///
    /// On [`Accept::Refetch`] the old rows stay and the list keeps loading
    /// until the follow-up request lands.
    pub fn apply<P: PageResponse<Item = T>>(&mut self, token: u64, response: P) -> Accept<F> {
        let outcome = self.state.accept(token, &response);
        if outcome == Accept::Applied {
            self.items = response.into_items();
            self.loading = false;
        }
        outcome
    }

    /// A failed fetch keeps the rows already shown
    pub fn fail(&mut self, token: u64) {
        if self.state.is_latest(token) {
            self.loading = false;
        }
    }
}

impl ListRequest<String> {
    fn search(&self) -> Option<String> {
        let text = self.filter.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn member_query(&self) -> MemberQuery {
        MemberQuery {
            page: Some(self.page),
            per_page: Some(self.per_page),
            search: self.search(),
        }
    }

    pub fn verification_query(&self) -> VerificationQuery {
        VerificationQuery {
            page: Some(self.page),
            per_page: Some(self.per_page),
            search: self.search(),
        }
    }
}

/// Corrections are filtered by status and free text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionListFilter {
    pub status: CorrectionFilter,
    pub search: String,
}

impl ListRequest<CorrectionListFilter> {
    pub fn correction_query(&self) -> CorrectionQuery {
        let search = self.filter.search.trim();
        CorrectionQuery {
            page: Some(self.page),
            per_page: Some(self.per_page),
            status: self.filter.status,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }
}

impl ListRequest<SuccessFilter> {
    pub fn search_log_query(&self) -> SearchLogQuery {
        SearchLogQuery {
            page: Some(self.page),
            per_page: Some(self.per_page),
            success: self.filter,
        }
    }
}
