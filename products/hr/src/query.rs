//! List filtering and page windows.

use platform_api::FieldErrors;

/// Fixed number of employees per list page.
pub const PAGE_SIZE: u64 = 10;

const PAGE: &str = "page";
const INVALID_PAGE: &str = "A valid integer greater than or equal to 1 is required.";

/// Raw `?department=&role=&page=` query string values.
#[derive(Clone, Debug, Default)]
pub struct ListParams {
    pub department: Option<String>,
    pub role: Option<String>,
    pub page: Option<String>,
}

/// Exact-match filters, ANDed together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub role: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Window for a 1-based page index.
    pub fn for_page(page: u32) -> Self {
        let index = u64::from(page.max(1)) - 1;
        Self {
            offset: index * PAGE_SIZE,
            limit: PAGE_SIZE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeQuery {
    pub filter: EmployeeFilter,
    pub page: u32,
}

impl Default for EmployeeQuery {
    fn default() -> Self {
        Self {
            filter: EmployeeFilter::default(),
            page: 1,
        }
    }
}

impl EmployeeQuery {
    pub fn window(&self) -> PageWindow {
        PageWindow::for_page(self.page)
    }
}

/// Collects decoded query pairs. A repeated key keeps its last value and
/// unknown keys are ignored.
impl FromIterator<(String, String)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "department" => params.department = Some(value),
                "role" => params.role = Some(value),
                PAGE => params.page = Some(value),
                _ => {}
            }
        }
        params
    }
}

impl ListParams {
    /// Empty values count as absent; `page` must be an integer >= 1.
    pub fn parse(self) -> Result<EmployeeQuery, FieldErrors> {
        let page = match non_empty(self.page) {
            None => 1,
            Some(raw) => parse_page(&raw)?,
        };
        Ok(EmployeeQuery {
            filter: EmployeeFilter {
                department: non_empty(self.department),
                role: non_empty(self.role),
            },
            page,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_page(raw: &str) -> Result<u32, FieldErrors> {
    let page: i64 = raw
        .trim()
        .parse()
        .map_err(|_| FieldErrors::single(PAGE, INVALID_PAGE))?;
    if page < 1 {
        return Err(FieldErrors::single(PAGE, INVALID_PAGE));
    }
    u32::try_from(page).map_err(|_| {
        FieldErrors::single(
            PAGE,
            format!("Ensure this value is less than or equal to {}.", u32::MAX),
        )
    })
}
