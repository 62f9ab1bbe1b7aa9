use sea_orm::Order;
use serde::{Deserialize, Serialize};

use crate::entities::{movie, review};

pub const MAX_REVIEW_TEXT_LEN: usize = 1000;

/// Allow-listed movie sort keys. Anything else is ignored rather than
/// rejected, so an unknown `sortBy` falls back to unspecified order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortKey {
    Title,
    Year,
    ImdbRating,
    CreatedAt,
}

impl SortKey {
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "title" => Some(SortKey::Title),
            "year" => Some(SortKey::Year),
            "imdb_rating" => Some(SortKey::ImdbRating),
            "created_at" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }

    pub fn column(self) -> movie::Column {
        match self {
            SortKey::Title => movie::Column::Title,
            SortKey::Year => movie::Column::Year,
            SortKey::ImdbRating => movie::Column::ImdbRating,
            SortKey::CreatedAt => movie::Column::CreatedAt,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Some(SortOrder::Asc),
            "DESC" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn order(self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl MovieListQuery {
    /// Resolved ORDER BY clause. Both the key and the direction must be in
    /// the allow-list; otherwise no explicit ordering is applied.
    pub fn ordering(&self) -> Option<(movie::Column, Order)> {
        let key = SortKey::from_param(self.sort_by.as_deref().unwrap_or("title"))?;
        let order = SortOrder::from_param(self.order.as_deref().unwrap_or("ASC"))?;
        Some((key.column(), order.order()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self { page, limit, total, pages: total.div_ceil(limit) }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewPage<T> {
    pub reviews: Vec<T>,
    pub pagination: Pagination,
}

/// Read-time aggregate over a movie's reviews; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub review_count: u64,
}

/// Outcome of a review submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReviewWrite {
    Created,
    Updated,
}

#[derive(Debug, Serialize)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    pub review: review::Model,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewWithMovie {
    #[serde(flatten)]
    pub review: review::Model,
    pub title: String,
    pub poster_url: Option<String>,
}
