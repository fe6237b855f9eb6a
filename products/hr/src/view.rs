//! Derived list view: filter, then paginate, never sort.
//!
//! Everything here is a pure function of the cached collection and the current
//! filter state, recomputed on every change instead of being stored.

use std::{fmt, ops::Range, str::FromStr};

use entity::{Employee, Gender};

/// Rows per page.
pub const PAGE_SIZE: usize = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(self, active: bool) -> bool {
        (self == StatusFilter::Active) == active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            other => Err(format!("unknown status `{other}` (expected active or inactive)")),
        }
    }
}

/// Search box plus the two dropdowns. `None` means "any".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub gender: Option<Gender>,
    pub status: Option<StatusFilter>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.gender.is_none() && self.status.is_none()
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        Matcher::new(self).matches(employee)
    }
}

// Lowercases the search term once per pass instead of once per row.
struct Matcher<'f> {
    needle: String,
    filter: &'f FilterState,
}

impl<'f> Matcher<'f> {
    fn new(filter: &'f FilterState) -> Self {
        Self {
            needle: filter.search.to_lowercase(),
            filter,
        }
    }

    fn matches(&self, employee: &Employee) -> bool {
        let profile = &employee.profile;
        profile.full_name.to_lowercase().contains(&self.needle)
            && self.filter.gender.is_none_or(|gender| gender == profile.gender)
            && self
                .filter
                .status
                .is_none_or(|status| status.matches(profile.active))
    }
}

/// Rows matching every active filter, in collection order.
pub fn filter_employees<'a>(employees: &'a [Employee], filter: &FilterState) -> Vec<&'a Employee> {
    let matcher = Matcher::new(filter);
    employees
        .iter()
        .filter(|employee| matcher.matches(employee))
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: usize,
    pub total_pages: usize,
    /// 1-based position of the first row shown, 0 when nothing matches.
    pub window_start: usize,
    /// 1-based position of the last row shown, 0 when nothing matches.
    pub window_end: usize,
    pub total_count: usize,
    pub page_size: usize,
}

impl PageMeta {
    /// Clamps `requested_page` into `1..=total_pages`; there is always at least
    /// one (possibly empty) page.
    pub fn compute(total_count: usize, requested_page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size).max(1);
        let current_page = requested_page.clamp(1, total_pages);
        let start = (current_page - 1) * page_size;
        let end = (start + page_size).min(total_count);
        let (window_start, window_end) = if total_count == 0 {
            (0, 0)
        } else {
            (start + 1, end)
        };
        Self {
            current_page,
            total_pages,
            window_start,
            window_end,
            total_count,
            page_size,
        }
    }

    /// 0-based slice range of the filtered rows on this page.
    pub fn range(&self) -> Range<usize> {
        if self.total_count == 0 {
            return 0..0;
        }
        (self.window_start - 1)..self.window_end
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Employee>,
    pub meta: PageMeta,
}

pub fn paginate<'a>(filtered: &[&'a Employee], requested_page: usize, page_size: usize) -> PageView<'a> {
    let meta = PageMeta::compute(filtered.len(), requested_page, page_size);
    PageView {
        rows: filtered[meta.range()].to_vec(),
        meta,
    }
}

pub fn derive_view<'a>(
    employees: &'a [Employee],
    filter: &FilterState,
    requested_page: usize,
) -> PageView<'a> {
    paginate(&filter_employees(employees, filter), requested_page, PAGE_SIZE)
}
