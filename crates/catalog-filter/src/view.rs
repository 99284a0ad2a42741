//! Catalog view model.
//!
//! Holds what one catalog page shows: the fetched listing, the four
//! controls, and the filtered result. The result is memoized and only
//! recomputed when the listing or a control actually changed.
//!
//! Fetches are ticketed. Each new fetch supersedes every earlier one, so a
//! slow response that arrives after a newer fetch started is discarded
//! rather than overwriting fresher data.

use std::fmt;

use phone_records::Phone;
use tracing::{debug, warn};

use crate::criteria::{BrandFilter, ConditionFilter, FilterCriteria, PriceRange};
use crate::filter_pipeline::FilterPipeline;

/// Where the source listing is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingState {
    /// A fetch is in flight and nothing has been loaded yet
    Loading,
    /// The listing finished loading (it may be empty)
    Ready(Vec<Phone>),
    /// The last fetch failed with this message
    Failed(String),
}

/// Identifies one fetch started with [`CatalogView::begin_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// What the page should render right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visible<'a> {
    Loading,
    Failed(&'a str),
    /// Loaded, but nothing passes the current criteria
    Empty,
    Phones(&'a [Phone]),
}

pub struct CatalogView {
    listing: ListingState,
    criteria: FilterCriteria,
    latest_ticket: u64,
    /// Memoized filter output; `None` when inputs changed since last run
    filtered: Option<Vec<Phone>>,
    recomputations: usize,
}

impl CatalogView {
    /// A fresh view: loading, with every control at "all".
    pub fn new() -> Self {
        Self {
            listing: ListingState::Loading,
            criteria: FilterCriteria::new(),
            latest_ticket: 0,
            filtered: None,
            recomputations: 0,
        }
    }

    pub fn listing(&self) -> &ListingState {
        &self.listing
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.listing, ListingState::Loading)
    }

    /// How many times the filter pipeline has actually run.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    // -------------------------------------------------------------------------
    // Fetch lifecycle
    // -------------------------------------------------------------------------

    /// Start a fetch. Every earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.listing = ListingState::Loading;
        self.invalidate();
        FetchTicket(self.latest_ticket)
    }

    /// Deliver the outcome of a fetch.
    ///
    /// Returns `false` and leaves the view untouched when `ticket` is not the
    /// most recent one.
    pub fn finish_fetch<E: fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Phone>, E>,
    ) -> bool {
        if ticket.0 != self.latest_ticket {
            warn!(
                "Discarding stale catalog fetch {} (latest is {})",
                ticket.0, self.latest_ticket
            );
            return false;
        }
        self.listing = match result {
            Ok(phones) => ListingState::Ready(phones),
            Err(e) => ListingState::Failed(e.to_string()),
        };
        self.invalidate();
        true
    }

    /// Replace the listing directly, outside the ticketed flow.
    ///
    /// Also supersedes any fetch still in flight.
    pub fn set_phones(&mut self, phones: Vec<Phone>) {
        self.latest_ticket += 1;
        self.listing = ListingState::Ready(phones);
        self.invalidate();
    }

    // -------------------------------------------------------------------------
    // Controls
    // -------------------------------------------------------------------------

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.criteria.search_text != text {
            self.criteria.search_text = text;
            self.invalidate();
        }
    }

    pub fn set_brand(&mut self, brand: BrandFilter) {
        if self.criteria.brand != brand {
            self.criteria.brand = brand;
            self.invalidate();
        }
    }

    pub fn set_condition(&mut self, condition: ConditionFilter) {
        if self.criteria.condition != condition {
            self.criteria.condition = condition;
            self.invalidate();
        }
    }

    pub fn set_price(&mut self, price: PriceRange) {
        if self.criteria.price != price {
            self.criteria.price = price;
            self.invalidate();
        }
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if self.criteria != criteria {
            self.criteria = criteria;
            self.invalidate();
        }
    }

    /// Put every control back to "all".
    pub fn reset_filters(&mut self) {
        self.set_criteria(FilterCriteria::new());
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// The current render state, recomputing the filter if inputs changed.
    pub fn visible(&mut self) -> Visible<'_> {
        let phones = match &self.listing {
            ListingState::Loading => return Visible::Loading,
            ListingState::Failed(message) => return Visible::Failed(message),
            ListingState::Ready(phones) => phones,
        };

        if self.filtered.is_none() {
            let pipeline = FilterPipeline::for_criteria(&self.criteria);
            let result = pipeline.apply(phones.clone());
            debug!(
                "Recomputed catalog view: {} of {} phones visible",
                result.len(),
                phones.len()
            );
            self.recomputations += 1;
            self.filtered = Some(result);
        }

        match self.filtered.as_deref() {
            Some([]) | None => Visible::Empty,
            Some(phones) => Visible::Phones(phones),
        }
    }

    /// Number of phones currently visible (zero while loading or failed).
    pub fn visible_count(&mut self) -> usize {
        match self.visible() {
            Visible::Phones(phones) => phones.len(),
            _ => 0,
        }
    }

    /// One-line status for the top of the listing.
    pub fn summary(&mut self) -> String {
        match self.visible() {
            Visible::Loading => "Loading phones...".to_string(),
            Visible::Failed(message) => format!("Could not load phones: {}", message),
            Visible::Empty => "No phones found matching your criteria".to_string(),
            Visible::Phones([_]) => "Showing 1 phone".to_string(),
            Visible::Phones(phones) => format!("Showing {} phones", phones.len()),
        }
    }

    fn invalidate(&mut self) {
        self.filtered = None;
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}
