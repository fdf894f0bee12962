use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Category, Job};
use super::repository::BoardRepository;
use super::service::{BoardError, JobBoardService};

/// Postings per page on the home/search listing.
pub const SEARCH_PAGE_SIZE: usize = 12;

/// Columns a free-text query can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Description,
    CompanyName,
    Skills,
}

/// The web search matches skills too; the REST search does not.
pub const WEB_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::Title,
    SearchField::Description,
    SearchField::CompanyName,
    SearchField::Skills,
];

pub const API_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::Title,
    SearchField::Description,
    SearchField::CompanyName,
];

/// Case-insensitive substring search OR-ed across `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub needle: String,
    pub fields: &'static [SearchField],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationMatch {
    Contains(String),
    Exact(String),
}

/// Conjunctive predicate set over the job table. `None` means "no filter";
/// every entry of `text` must match.
///
/// Enum filters carry the raw wire value so an unknown value still filters
/// (and therefore matches nothing) instead of being dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilters {
    pub active_only: bool,
    pub text: Vec<TextSearch>,
    pub location: Option<LocationMatch>,
    pub category_slug: Option<String>,
    pub employment_type: Option<String>,
    pub work_mode: Option<String>,
    pub experience_level: Option<String>,
    pub salary_at_least: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    SalaryAscending,
    SalaryDescending,
}

impl JobOrdering {
    /// Parse an `ordering` parameter; unknown values fall back to newest first.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("created_at") => Self::OldestFirst,
            Some("salary_min") => Self::SalaryAscending,
            Some("-salary_min") => Self::SalaryDescending,
            _ => Self::NewestFirst,
        }
    }
}

/// Raw query-string parameters of the home/search page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub work_mode: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub salary_min: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl SearchParams {
    pub fn filters(&self) -> JobFilters {
        JobFilters {
            active_only: true,
            text: non_empty(&self.q)
                .map(|needle| TextSearch {
                    needle,
                    fields: WEB_SEARCH_FIELDS,
                })
                .into_iter()
                .collect(),
            location: non_empty(&self.location).map(LocationMatch::Contains),
            category_slug: non_empty(&self.category),
            employment_type: non_empty(&self.employment_type),
            work_mode: non_empty(&self.work_mode),
            experience_level: non_empty(&self.experience_level),
            salary_at_least: non_empty(&self.salary_min)
                .and_then(|raw| raw.trim().parse::<i64>().ok()),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

/// Fixed-size paginator that clamps out-of-range requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub const fn new(per_page: usize) -> Self {
        let per_page = if per_page == 0 { 1 } else { per_page };
        Self { per_page }
    }

    pub const fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn num_pages(&self, total: usize) -> usize {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw page parameter: missing or non-numeric selects page 1,
    /// anything past the end selects the last page, anything below 1 selects 1.
    pub fn window(&self, requested: Option<&str>, total: usize) -> PageWindow {
        let num_pages = self.num_pages(total);
        let number = match requested.map(str::trim).and_then(|raw| raw.parse::<i64>().ok()) {
            None => 1,
            Some(value) if value < 1 => 1,
            Some(value) => usize::try_from(value).unwrap_or(usize::MAX).min(num_pages),
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
}

impl PageWindow {
    pub fn offset(&self) -> usize {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> usize {
        self.per_page
    }

    pub fn into_page<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            per_page: self.per_page,
            total: self.total,
            has_previous: self.number > 1,
            has_next: self.number < self.num_pages,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            per_page: self.per_page,
            total: self.total,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

/// Everything the home page renders.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub jobs: Page<Job>,
    pub categories: Vec<Category>,
    pub params: SearchParams,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    /// Filter active postings, newest first, one fixed-size page at a time.
    pub fn search(&self, params: SearchParams) -> Result<SearchResults, BoardError> {
        let filters = params.filters();
        let total = self.repository.count_jobs(&filters)?;
        let window = Paginator::new(SEARCH_PAGE_SIZE).window(params.page.as_deref(), total);
        let jobs = self.repository.find_jobs(
            &filters,
            JobOrdering::NewestFirst,
            window.limit(),
            window.offset(),
        )?;
        let categories = self.repository.categories()?;

        debug!(total, page = window.number, "job search executed");

        Ok(SearchResults {
            jobs: window.into_page(jobs),
            categories,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginator_clamps_to_valid_pages() {
        let paginator = Paginator::new(12);
        assert_eq!(paginator.window(None, 30).number, 1);
        assert_eq!(paginator.window(Some("2"), 30).number, 2);
        assert_eq!(paginator.window(Some("99"), 30).number, 3);
        assert_eq!(paginator.window(Some("0"), 30).number, 1);
        assert_eq!(paginator.window(Some("-4"), 30).number, 1);
        assert_eq!(paginator.window(Some("abc"), 30).number, 1);
    }

    #[test]
    fn empty_listing_has_a_single_page() {
        let window = Paginator::new(12).window(Some("5"), 0);
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.offset(), 0);
        let page = window.into_page(Vec::<u8>::new());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn last_page_offset_skips_full_pages() {
        let window = Paginator::new(12).window(Some("3"), 25);
        assert_eq!(window.offset(), 24);
        let page = window.into_page(vec![25]);
        assert!(page.has_previous);
        assert!(!page.has_next);
    }

    #[test]
    fn non_numeric_salary_filter_is_ignored() {
        let params = SearchParams {
            salary_min: Some("lots".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(params.filters().salary_at_least, None);

        let params = SearchParams {
            salary_min: Some(" 90000 ".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(params.filters().salary_at_least, Some(90000));
    }

    #[test]
    fn empty_parameters_do_not_filter() {
        let params = SearchParams {
            q: Some(String::new()),
            employment_type: Some(String::new()),
            ..SearchParams::default()
        };
        let filters = params.filters();
        assert!(filters.active_only);
        assert!(filters.text.is_empty());
        assert!(filters.employment_type.is_none());
    }

    #[test]
    fn ordering_parameter_falls_back_to_newest_first() {
        assert_eq!(JobOrdering::from_param(Some("salary_min")), JobOrdering::SalaryAscending);
        assert_eq!(JobOrdering::from_param(Some("-salary_min")), JobOrdering::SalaryDescending);
        assert_eq!(JobOrdering::from_param(Some("created_at")), JobOrdering::OldestFirst);
        assert_eq!(JobOrdering::from_param(Some("title")), JobOrdering::NewestFirst);
        assert_eq!(JobOrdering::from_param(None), JobOrdering::NewestFirst);
    }
}
