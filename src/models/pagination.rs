//! Paging parameters and the list envelope

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{favorite::FavoriteResponse, rating::RatingResponse, recipe::FoodRecipeResponse};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Apply defaults and bounds to raw query values
    pub fn new(page: Option<i64>, limit: Option<i64>) -> AppResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if limit < 1 || limit > MAX_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::Validation("page is out of range".to_string()));
        }

        Ok(Self { page, limit })
    }

    /// Rows to skip; saturates for windows built without [`Pagination::new`]
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// List envelope: `{ "total": n, "results": [...] }`, total omitted when zero
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    FoodRecipeList = ListResponse<FoodRecipeResponse>,
    RatingList = ListResponse<RatingResponse>,
    FavoriteList = ListResponse<FavoriteResponse>
)]
pub struct ListResponse<T> {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total: i64,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(results: Vec<T>, total: i64) -> Self {
        Self { total, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(Some(1), Some(10)).unwrap().offset(), 0);
        assert_eq!(Pagination::new(Some(3), Some(5)).unwrap().offset(), 10);
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination::default());
    }

    #[test]
    fn test_bounds() {
        assert!(Pagination::new(Some(0), Some(10)).is_err());
        assert!(Pagination::new(Some(1), Some(0)).is_err());
        assert!(Pagination::new(Some(1), Some(MAX_LIMIT + 1)).is_err());
        assert!(Pagination::new(Some(1), Some(MAX_LIMIT)).is_ok());
    }

    #[test]
    fn test_huge_page_is_rejected() {
        let err = Pagination::new(Some(i64::MAX), Some(10)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Largest page whose offset still fits
        let last = i64::MAX / MAX_LIMIT + 1;
        let page = Pagination::new(Some(last), Some(MAX_LIMIT)).unwrap();
        assert!(page.offset() > 0);

        let raw = Pagination { page: i64::MAX, limit: 10 };
        assert_eq!(raw.offset(), i64::MAX);
    }

    #[test]
    fn test_total_omitted_when_zero() {
        let json = serde_json::to_string(&ListResponse::new(vec!["a", "b"], 0)).unwrap();
        assert_eq!(json, r#"{"results":["a","b"]}"#);

        let json = serde_json::to_string(&ListResponse::new(vec![1, 2, 3], 10)).unwrap();
        assert!(json.contains(r#""total":10"#));

        let back: ListResponse<i32> = serde_json::from_str(r#"{"results":[]}"#).unwrap();
        assert_eq!(back.total, 0);
        assert!(back.results.is_empty());
    }
}
