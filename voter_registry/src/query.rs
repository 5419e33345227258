//! Search, filters and pagination over the voter collection.
//!
//! Everything here is a pure function of its inputs and is recomputed on
//! every change of the collection, the search term, the filters or the page.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::str::FromStr;

use log::debug;
use serde::Serialize;
use snafu::{prelude::*, Snafu};

use crate::config::Voter;
use crate::schema::Field;

/// Page size of the voter list.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Number of page buttons shown around the current page.
pub const MAX_VISIBLE_PAGES: usize = 5;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum QueryError {
    #[snafu(display("Unknown age range {label:?}, expected one of 18-25, 26-35, 36-50, 51+"))]
    UnknownAgeBracket { label: String },
    #[snafu(display("The page size must be at least 1"))]
    InvalidPageSize {},
    #[snafu(display("The voter list cannot be filtered by {}", field.label()))]
    NotFilterable { field: Field },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A named age range used as a filter. Bounds are inclusive.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-50")]
    From36To50,
    #[serde(rename = "51+")]
    From51,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::From18To25,
        AgeBracket::From26To35,
        AgeBracket::From36To50,
        AgeBracket::From51,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From26To35 => "26-35",
            AgeBracket::From36To50 => "36-50",
            AgeBracket::From51 => "51+",
        }
    }

    pub fn contains(self, age: u32) -> bool {
        match self {
            AgeBracket::From18To25 => (18..=25).contains(&age),
            AgeBracket::From26To35 => (26..=35).contains(&age),
            AgeBracket::From36To50 => (36..=50).contains(&age),
            AgeBracket::From51 => age >= 51,
        }
    }
}

impl FromStr for AgeBracket {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeBracket::ALL
            .iter()
            .copied()
            .find(|b| b.label() == s)
            .context(UnknownAgeBracketSnafu { label: s })
    }
}

/// The discrete filters of the voter list. `None` (or an empty string)
/// means the filter is not active.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct VoterFilters {
    pub gender: Option<String>,
    pub age_range: Option<AgeBracket>,
    pub caste: Option<String>,
    pub district: Option<String>,
    /// Compared with the assembly constituency name.
    pub assembly_constituency: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn equals(filter: &Option<String>, value: &str) -> bool {
    active(filter).map_or(true, |f| f == value)
}

impl VoterFilters {
    pub fn matches(&self, voter: &Voter) -> bool {
        equals(&self.gender, &voter.gender)
            && self.age_range.map_or(true, |b| b.contains(voter.age))
            && equals(&self.caste, &voter.caste)
            && equals(&self.district, &voter.district)
            && equals(
                &self.assembly_constituency,
                &voter.assembly_constituency_name,
            )
    }

    /// Number of active filters.
    pub fn active_count(&self) -> usize {
        [
            active(&self.gender).is_some(),
            self.age_range.is_some(),
            active(&self.caste).is_some(),
            active(&self.district).is_some(),
            active(&self.assembly_constituency).is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

/// True if the search term is empty or found in the full name or voter id
/// (ignoring case), or in the mobile number (as typed).
pub fn matches_search(voter: &Voter, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    voter.full_name.to_lowercase().contains(&needle)
        || voter.voter_id.to_lowercase().contains(&needle)
        || voter.mobile_number.contains(term)
}

/// The voters matching both the search term and every active filter, in
/// collection order.
pub fn filter_voters<'a>(
    voters: &'a [Voter],
    search: &str,
    filters: &VoterFilters,
) -> Vec<&'a Voter> {
    let res: Vec<&Voter> = voters
        .iter()
        .filter(|v| matches_search(v, search) && filters.matches(v))
        .collect();
    debug!(
        "filter_voters: {} of {} voters match search {:?} and filters {:?}",
        res.len(),
        voters.len(),
        search,
        filters
    );
    res
}

/// Number of search criteria and filters in use.
pub fn active_filter_count(search: &str, filters: &VoterFilters) -> usize {
    filters.active_count() + usize::from(!search.is_empty())
}

/// Distinct non-empty values of a field, in order of first appearance.
pub fn facet(voters: &[Voter], field: Field) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for (idx, v) in voters.iter().enumerate() {
        let value = field.value(v, idx + 1);
        if !value.is_empty() && seen.insert(value.clone()) {
            res.push(value);
        }
    }
    res
}

/// One page of a sequence.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page_number: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based position of the first item of the page, 0 if the page is empty.
    pub fn first_shown(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page_number - 1) * self.page_size + 1
        }
    }

    /// 1-based position of the last item of the page, 0 if the page is empty.
    pub fn last_shown(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_shown() + self.items.len() - 1
        }
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Cuts the 1-based page `page_number` out of `items`.
///
/// A page beyond the end (or page 0) is empty, not an error.
pub fn paginate<T: Clone>(
    items: &[T],
    page_size: usize,
    page_number: usize,
) -> QueryResult<Page<T>> {
    let page_size = NonZeroUsize::new(page_size).context(InvalidPageSizeSnafu {})?;
    Ok(cut_page(items, page_size, page_number))
}

fn cut_page<T: Clone>(items: &[T], page_size: NonZeroUsize, page_number: usize) -> Page<T> {
    let page_size = page_size.get();
    let start = page_number.saturating_sub(1).saturating_mul(page_size);
    let slice: &[T] = if page_number == 0 || start >= items.len() {
        &[]
    } else {
        let end = start.saturating_add(page_size).min(items.len());
        &items[start..end]
    };
    Page {
        items: slice.to_vec(),
        page_number,
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

/// The page numbers offered as buttons: all of them when there are at most
/// `max_visible` pages, otherwise a window starting two pages before the
/// current one.
pub fn page_window(current: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }
    let start = current.saturating_sub(max_visible / 2).max(1);
    let end = total_pages.min(start + max_visible - 1);
    (start..=end).collect()
}

/// What the voter table shows for the current state.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ListSummary<'a> {
    pub page: Page<&'a Voter>,
    /// Voters matching the search and filters.
    pub shown_count: usize,
    /// Voters in the collection.
    pub total_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_buttons: Vec<usize>,
    pub active_filters: usize,
}

/// State of the voter table: search term, filters and current page.
///
/// Any change of the search term or of the filters moves back to page 1.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoterListView {
    search: String,
    filters: VoterFilters,
    page: usize,
    page_size: NonZeroUsize,
}

impl VoterListView {
    pub fn new(page_size: usize) -> QueryResult<VoterListView> {
        let page_size = NonZeroUsize::new(page_size).context(InvalidPageSizeSnafu {})?;
        Ok(VoterListView {
            search: String::new(),
            filters: VoterFilters::default(),
            page: 1,
            page_size,
        })
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &VoterFilters {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    pub fn set_filters(&mut self, filters: VoterFilters) {
        self.filters = filters;
        self.page = 1;
    }

    /// Sets one of the filters by its column, an empty value clearing it.
    ///
    /// Only gender, age, caste, district and assembly constituency name have
    /// a filter; other columns are rejected and leave the view unchanged.
    pub fn set_filter(&mut self, field: Field, value: &str) -> QueryResult<()> {
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        match field {
            Field::Gender => self.filters.gender = value,
            Field::Caste => self.filters.caste = value,
            Field::District => self.filters.district = value,
            Field::AssemblyConstituencyName => self.filters.assembly_constituency = value,
            Field::Age => {
                self.filters.age_range = value.map(|s| s.parse::<AgeBracket>()).transpose()?
            }
            field => return NotFilterableSnafu { field }.fail(),
        }
        self.page = 1;
        Ok(())
    }

    /// Clears the search term and all the filters.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.filters = VoterFilters::default();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Moves one page forward. Past the last page, the next [VoterListView::render]
    /// brings the view back to the last page.
    pub fn next_page(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Filters and paginates the collection.
    ///
    /// If the current page no longer exists (the result set shrank), the
    /// view moves to the last page and reports that page.
    pub fn render<'a>(&mut self, voters: &'a [Voter]) -> ListSummary<'a> {
        let matching = filter_voters(voters, &self.search, &self.filters);
        let pages = total_pages(matching.len(), self.page_size.get());
        if self.page > pages.max(1) {
            debug!(
                "render: page {} out of range ({} pages), moving to page {}",
                self.page,
                pages,
                pages.max(1)
            );
            self.page = pages.max(1);
        }
        let page = cut_page(&matching, self.page_size, self.page);
        ListSummary {
            shown_count: matching.len(),
            total_count: voters.len(),
            current_page: self.page,
            total_pages: pages,
            page_buttons: page_window(self.page, pages, MAX_VISIBLE_PAGES),
            active_filters: active_filter_count(&self.search, &self.filters),
            page,
        }
    }
}
