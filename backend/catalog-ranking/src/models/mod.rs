use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PRICE_COLUMN: &str = "Price_IDR";

/// Stable positional identity of an item. `ItemId(i)` always addresses
/// `Catalog::items()[i]` and row `i` of the feature index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub product_name: String,
    pub brand: String,
    pub category: String,
    pub skin_type: String,
    pub gender: String,
    pub usage_frequency: String,
    pub ingredients: String,
    pub country_of_origin: String,
    pub price_idr: f64,
    pub rating: f64,
    pub number_of_reviews: u64,
    pub combined_features: String,
}

/// Which optional source columns were present when the catalog was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSchema {
    pub has_category: bool,
    pub has_skin_type: bool,
    pub has_gender: bool,
    pub has_usage_frequency: bool,
    pub has_price: bool,
}

impl CatalogSchema {
    pub fn complete() -> Self {
        Self {
            has_category: true,
            has_skin_type: true,
            has_gender: true,
            has_usage_frequency: true,
            has_price: true,
        }
    }
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self::complete()
    }
}

/// Immutable catalog snapshot: an arena of items addressed by `ItemId`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    schema: CatalogSchema,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self::with_schema(items, CatalogSchema::complete())
    }

    pub fn with_schema(items: Vec<CatalogItem>, schema: CatalogSchema) -> Self {
        Self { items, schema }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn schema(&self) -> CatalogSchema {
        self.schema
    }

    pub fn get(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items.get(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len()).map(ItemId)
    }

    /// Every item as a candidate, in catalog order.
    pub fn all(&self) -> CandidateSet<'_> {
        CandidateSet {
            catalog: self,
            ids: self.ids().collect(),
        }
    }

    /// Observed `(min, max)` price, `None` for an empty catalog.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.items.iter().map(|item| item.price_idr).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }
}

/// The catalog subset surviving the filter stage. Ids keep their global
/// meaning so index lookups stay correct after subsetting.
#[derive(Debug, Clone)]
pub struct CandidateSet<'a> {
    catalog: &'a Catalog,
    ids: Vec<ItemId>,
}

impl<'a> CandidateSet<'a> {
    /// Builds a candidate set from explicit ids, rejecting ids outside the catalog.
    pub fn from_ids(catalog: &'a Catalog, ids: Vec<ItemId>) -> Result<Self> {
        if let Some(bad) = ids.iter().find(|id| id.0 >= catalog.len()) {
            return Err(crate::error::DataError::UnknownItem(*bad).into());
        }
        Ok(Self { catalog, ids })
    }

    pub(crate) fn from_ids_unchecked(catalog: &'a Catalog, ids: Vec<ItemId>) -> Self {
        Self { catalog, ids }
    }

    pub fn empty(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            ids: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// `(id, item)` pairs in candidate order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &'a CatalogItem)> + '_ {
        let catalog = self.catalog;
        self.ids.iter().map(move |&id| (id, &catalog.items[id.0]))
    }
}

/// Blend weights for rating, popularity and similarity. Not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            beta: 0.2,
            gamma: 0.4,
        }
    }
}

impl RankingWeights {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        let weights = Self { alpha, beta, gamma };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::config(format!(
                    "weight {} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Same alpha/beta with the similarity contribution removed.
    pub fn without_similarity(&self) -> Self {
        Self { gamma: 0.0, ..*self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub item_id: ItemId,
    pub rating_norm: f64,
    pub popularity_norm: f64,
    pub similarity_norm: f64,
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact match after trim + lowercase
    pub category: Option<String>,
    /// Substring match
    pub skin_type: Option<String>,
    /// Substring match
    pub gender: Option<String>,
    /// Substring match
    pub usage_frequency: Option<String>,
    /// Inclusive; `None` means the catalog's observed min/max
    pub price_range: Option<PriceRange>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn skin_type(mut self, value: impl Into<String>) -> Self {
        self.skin_type = Some(value.into());
        self
    }

    pub fn gender(mut self, value: impl Into<String>) -> Self {
        self.gender = Some(value.into());
        self
    }

    pub fn usage_frequency(mut self, value: impl Into<String>) -> Self {
        self.usage_frequency = Some(value.into());
        self
    }

    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub precision: f64,
    pub recall: f64,
    pub ndcg: f64,
    pub ground_truth: Vec<ItemId>,
    pub recommended: Vec<ItemId>,
}

impl EvaluationReport {
    pub fn empty() -> Self {
        Self {
            precision: 0.0,
            recall: 0.0,
            ndcg: 0.0,
            ground_truth: Vec::new(),
            recommended: Vec::new(),
        }
    }
}
