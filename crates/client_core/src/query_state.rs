use std::num::NonZeroU64;

use shared::{
    error::QueryError,
    protocol::{GeoFilter, PageWindow, QueryParams},
};

/// Rows per page.
pub const PAGE_SIZE: u64 = 10;

const PAGE_SIZE_NON_ZERO: NonZeroU64 = match NonZeroU64::new(PAGE_SIZE) {
    Some(size) => size,
    None => panic!("PAGE_SIZE must be positive"),
};

/// Filter selection and pending offset, next to the query that produced the
/// page on screen.
///
/// Selection changes only touch the pending side. Paging, the result window
/// and `total` follow the displayed page until a fetch commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    filter: GeoFilter,
    window: PageWindow,
    shown: ShownPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShownPage {
    filter: GeoFilter,
    window: PageWindow,
    total: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            filter: GeoFilter::All,
            window: first_page(),
            shown: ShownPage {
                filter: GeoFilter::All,
                window: first_page(),
                total: 0,
            },
        }
    }
}

fn first_page() -> PageWindow {
    PageWindow::start(PAGE_SIZE_NON_ZERO)
}

impl QueryState {
    pub fn selected_state(&self) -> Option<&str> {
        self.filter.state()
    }

    pub fn selected_district(&self) -> Option<&str> {
        self.filter.district()
    }

    pub fn filter(&self) -> &GeoFilter {
        &self.filter
    }

    /// Offset the next apply will request.
    pub fn offset(&self) -> u64 {
        self.window.offset()
    }

    pub fn limit(&self) -> u64 {
        self.window.limit()
    }

    /// Offset of the page on screen.
    pub fn shown_offset(&self) -> u64 {
        self.shown.window.offset()
    }

    pub fn shown_limit(&self) -> u64 {
        self.shown.window.limit()
    }

    /// Total of the last committed query.
    pub fn total(&self) -> u64 {
        self.shown.total
    }

    /// Whether the selection differs from the query behind the page on screen.
    pub fn has_unapplied_filter(&self) -> bool {
        self.filter != self.shown.filter
    }

    /// Selects a state (empty for "all states"); clears district and offset.
    pub fn set_state(&mut self, state: &str) {
        self.filter = if state.is_empty() {
            GeoFilter::All
        } else {
            GeoFilter::State(state.to_string())
        };
        self.window = first_page();
    }

    /// Selects a district within the current state; empty clears it.
    pub fn set_district(&mut self, district: &str) -> Result<(), QueryError> {
        let state = self.filter.state().map(str::to_string);
        self.filter = GeoFilter::from_parts(state.as_deref(), Some(district))?;
        Ok(())
    }

    /// Bounds against `total` are the caller's concern.
    pub fn set_offset(&mut self, offset: u64) -> Result<(), QueryError> {
        self.window = self.window.with_offset(offset)?;
        Ok(())
    }

    pub fn to_query_params(&self) -> QueryParams {
        QueryParams::new(self.filter.clone(), self.window)
    }

    /// Current selection at an explicit target offset.
    pub fn params_at(&self, offset: u64) -> Result<QueryParams, QueryError> {
        Ok(QueryParams::new(
            self.filter.clone(),
            self.window.with_offset(offset)?,
        ))
    }

    /// Records a successful fetch as the page on screen.
    pub fn commit(&mut self, params: &QueryParams, total: u64) {
        self.window = params.window;
        self.shown = ShownPage {
            filter: params.filter.clone(),
            window: params.window,
            total,
        };
    }

    pub fn has_previous(&self) -> bool {
        self.shown.window.previous().is_some()
    }

    pub fn has_next(&self) -> bool {
        self.shown_offset().saturating_add(self.shown_limit()) < self.shown.total
    }

    /// Previous page of the displayed result set.
    pub fn previous_page(&self) -> Option<QueryParams> {
        let window = self.shown.window.previous()?;
        Some(QueryParams::new(self.shown.filter.clone(), window))
    }

    /// Next page of the displayed result set.
    pub fn next_page(&self) -> Option<QueryParams> {
        self.has_next()
            .then(|| QueryParams::new(self.shown.filter.clone(), self.shown.window.next()))
    }
}
