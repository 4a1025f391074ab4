use serde::Deserialize;

use crate::utils::AppError;

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Price,
    Rating,
    Reviews,
    #[default]
    Date,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Inc,
    #[default]
    Dec,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub free_delivery: Option<bool>,
    pub available: Option<bool>,
    pub category: Option<i32>,
    /// Comma-separated tag ids.
    pub tags: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub sort_type: SortDirection,
    pub current_page: Option<i64>,
    pub limit: Option<i64>,
}

impl CatalogQuery {
    pub fn tag_ids(&self) -> Result<Vec<i32>, AppError> {
        let Some(raw) = self.tags.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse()
                    .map_err(|_| AppError::BadRequest(format!("invalid tag id {part:?}")))
            })
            .collect()
    }

    /// Case-insensitive substring pattern for the `name` filter.
    pub fn name_pattern(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        let escaped = name
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub current_page: Option<i64>,
}

/// One-based page window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(current: Option<i64>, limit: Option<i64>, default_limit: i64) -> Result<Self, AppError> {
        let number = current.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if number < 1 {
            return Err(AppError::BadRequest("currentPage must be at least 1".into()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if (number - 1).checked_mul(limit).is_none() {
            return Err(AppError::BadRequest("currentPage is out of range".into()));
        }

        Ok(Self { number, limit })
    }

    /// Cannot overflow: `new` rejects pages whose offset does not fit.
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.limit
    }

    pub fn last_page(&self, total: i64) -> i64 {
        ((total + self.limit - 1) / self.limit).max(1)
    }
}
