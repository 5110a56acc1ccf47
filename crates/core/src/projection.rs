//! Filtered, sorted views over the catalog snapshot.
//!
//! Projections borrow from the store and never reorder or copy the
//! underlying collections.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::price::PriceRecord;
use crate::domain::product::ProductRecord;
use crate::domain::timestamp::parse_timestamp;
use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(ValidationError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    #[default]
    CreatedAt,
    ProductName,
    Brand,
    Weight,
    Status,
}

impl ProductSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ProductName => "productName",
            Self::Brand => "brand",
            Self::Weight => "weight",
            Self::Status => "status",
        }
    }
}

impl FromStr for ProductSortField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_key(value).as_str() {
            "createdat" | "date" => Ok(Self::CreatedAt),
            "productname" | "name" | "product" => Ok(Self::ProductName),
            "brand" => Ok(Self::Brand),
            "weight" => Ok(Self::Weight),
            "status" | "active" => Ok(Self::Status),
            _ => Err(ValidationError::UnknownSortField(value.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSortField {
    #[default]
    CreatedAt,
    ProductName,
    Brand,
    Market,
    Price,
}

impl PriceSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ProductName => "productRelName",
            Self::Brand => "brandRelName",
            Self::Market => "market",
            Self::Price => "price",
        }
    }
}

impl FromStr for PriceSortField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_key(value).as_str() {
            "createdat" | "date" => Ok(Self::CreatedAt),
            "productrelname" | "productname" | "name" | "product" => Ok(Self::ProductName),
            "brandrelname" | "brand" => Ok(Self::Brand),
            "market" => Ok(Self::Market),
            "price" => Ok(Self::Price),
            _ => Err(ValidationError::UnknownSortField(value.to_string())),
        }
    }
}

impl fmt::Display for ProductSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PriceSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().chars().filter(|ch| *ch != '_' && *ch != '-').collect::<String>().to_lowercase()
}

/// Active sort key and direction. Defaults to newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortSpec<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Header click: the same key flips direction, a new key starts ascending.
    pub fn select(&mut self, field: F) {
        if self.field == field {
            self.direction = self.direction.toggled();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Case-insensitive substring predicates. Empty means match-all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub product: String,
    pub market: String,
}

impl FilterSpec {
    pub fn new(product: impl Into<String>, market: impl Into<String>) -> Self {
        Self { product: product.into(), market: market.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty() && self.market.is_empty()
    }

    pub fn matches<R: Projectable>(&self, record: &R) -> bool {
        let product_ok =
            self.product.is_empty() || contains_folded(record.display_name(), &self.product);
        let market_ok = match (self.market.is_empty(), record.market()) {
            (true, _) | (false, None) => true,
            (false, Some(market)) => contains_folded(market, &self.market),
        };
        product_ok && market_ok
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A record the projection can filter and sort.
pub trait Projectable {
    type Field: Copy + PartialEq;

    fn display_name(&self) -> &str;

    /// `None` for records that carry no market; the market predicate skips them.
    fn market(&self) -> Option<&str>;

    fn compare_by(&self, other: &Self, field: Self::Field) -> Ordering;
}

impl Projectable for ProductRecord {
    type Field = ProductSortField;

    fn display_name(&self) -> &str {
        &self.product_name
    }

    fn market(&self) -> Option<&str> {
        None
    }

    fn compare_by(&self, other: &Self, field: ProductSortField) -> Ordering {
        match field {
            ProductSortField::CreatedAt => compare_timestamps(&self.created_at, &other.created_at),
            ProductSortField::ProductName => compare_text(&self.product_name, &other.product_name),
            ProductSortField::Brand => compare_text(&self.brand, &other.brand),
            ProductSortField::Weight => compare_numbers(self.weight, other.weight),
            ProductSortField::Status => compare_flags(self.status, other.status),
        }
    }
}

impl Projectable for PriceRecord {
    type Field = PriceSortField;

    fn display_name(&self) -> &str {
        &self.product_rel_name
    }

    fn market(&self) -> Option<&str> {
        Some(&self.market)
    }

    fn compare_by(&self, other: &Self, field: PriceSortField) -> Ordering {
        match field {
            PriceSortField::CreatedAt => compare_timestamps(&self.created_at, &other.created_at),
            PriceSortField::ProductName => {
                compare_text(&self.product_rel_name, &other.product_rel_name)
            }
            PriceSortField::Brand => compare_text(&self.brand_rel_name, &other.brand_rel_name),
            PriceSortField::Market => compare_text(&self.market, &other.market),
            PriceSortField::Price => compare_numbers(self.price, other.price),
        }
    }
}

/// Filters then stably sorts `records`.
pub fn project<'a, R: Projectable>(
    records: &'a [R],
    filter: &FilterSpec,
    sort: &SortSpec<R::Field>,
) -> Vec<&'a R> {
    let mut rows: Vec<&R> = if filter.is_empty() {
        records.iter().collect()
    } else {
        records.iter().filter(|record| filter.matches(*record)).collect()
    };

    rows.sort_by(|left, right| sort.direction.apply(left.compare_by(right, sort.field)));
    rows
}

/// Unparseable timestamps order before every valid one.
fn compare_timestamps(left: &str, right: &str) -> Ordering {
    parse_timestamp(left).cmp(&parse_timestamp(right))
}

fn compare_numbers(left: Decimal, right: Decimal) -> Ordering {
    left.cmp(&right)
}

fn compare_flags(left: bool, right: bool) -> Ordering {
    right.cmp(&left)
}

fn compare_text(left: &str, right: &str) -> Ordering {
    collation_key(left).cmp(&collation_key(right)).then_with(|| left.cmp(right))
}

/// Lowercases and drops the diacritics common in Portuguese and Spanish names.
fn collation_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
