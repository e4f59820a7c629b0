use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl PageQuery {
    /// `None` means pagination is off and the whole collection is returned.
    pub fn resolve(&self, default_page_size: Option<u64>, max_page_size: u64) -> Option<PageRequest> {
        if self.page.is_none() && self.page_size.is_none() && default_page_size.is_none() {
            return None;
        }
        let page_size = self
            .page_size
            .or(default_page_size)
            .unwrap_or(max_page_size)
            .clamp(1, max_page_size.max(1));

        Some(PageRequest {
            page: self.page.unwrap_or(1),
            page_size,
        })
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        // Saturates so absurd page numbers land past the end instead of wrapping.
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// The first page always exists; later pages must start inside the collection.
    pub fn check(&self, total: u64) -> Result<(), AppError> {
        if self.page == 0 || (self.page > 1 && self.offset() >= total) {
            return Err(AppError::NotFound("Página inválida.".to_string()));
        }
        Ok(())
    }

    /// `base` is the absolute URL of the collection, without a query string.
    pub fn wrap<T>(&self, base: &str, total: u64, results: Vec<T>) -> Paginated<T> {
        let link = |page: u64| format!("{}?page={}&page_size={}", base, page, self.page_size);
        let next = (self.offset().saturating_add(self.page_size) < total)
            .then(|| link(self.page + 1));
        let previous = (self.page > 1).then(|| link(self.page - 1));

        Paginated {
            count: total,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_without_params_or_default() {
        assert_eq!(PageQuery::default().resolve(None, 100), None);
    }

    #[test]
    fn default_size_turns_pagination_on() {
        let request = PageQuery::default().resolve(Some(10), 100).unwrap();
        assert_eq!(request, PageRequest { page: 1, page_size: 10 });
    }

    #[test]
    fn page_size_is_capped() {
        let query = PageQuery {
            page: Some(2),
            page_size: Some(500),
        };
        let request = query.resolve(None, 50).unwrap();
        assert_eq!(request.page_size, 50);
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn pages_past_the_end_are_invalid() {
        let request = PageRequest { page: 3, page_size: 5 };
        assert!(request.check(10).is_err());
        assert!(request.check(11).is_ok());
        assert!(PageRequest { page: 1, page_size: 5 }.check(0).is_ok());
        assert!(PageRequest { page: 0, page_size: 5 }.check(10).is_err());
    }

    #[test]
    fn links_point_to_neighbours() {
        let request = PageRequest { page: 2, page_size: 2 };
        let page = request.wrap("http://localhost:8080/api/v1/employees/", 5, vec![3, 4]);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:8080/api/v1/employees/?page=3&page_size=2")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:8080/api/v1/employees/?page=1&page_size=2")
        );

        let last = PageRequest { page: 3, page_size: 2 }.wrap("/e/", 5, vec![5]);
        assert!(last.next.is_none());
    }

    #[test]
    fn huge_page_numbers_are_invalid_not_overflowing() {
        let request = PageRequest {
            page: u64::MAX,
            page_size: 100,
        };
        assert_eq!(request.offset(), u64::MAX);
        assert!(request.check(10).is_err());

        let paged = request.wrap("/e/", 10, Vec::<u8>::new());
        assert!(paged.next.is_none());
        assert_eq!(
            paged.previous.as_deref(),
            Some("/e/?page=18446744073709551614&page_size=100")
        );
    }
}
