use crate::error::{DataError, Result};
use crate::models::{CandidateSet, Catalog, CatalogItem, FilterCriteria, ItemId, PriceRange, PRICE_COLUMN};
use tracing::{debug, warn};

/// Filter Layer - narrows the catalog to a candidate set
///
/// Stages run in a fixed order (category → skin type → gender → usage
/// frequency → price); each stage only sees the survivors of the previous
/// one and an empty intermediate result stops the pipeline.
pub struct FilterLayer;

impl Default for FilterLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Category,
    SkinType,
    Gender,
    UsageFrequency,
}

impl TextField {
    fn name(self) -> &'static str {
        match self {
            TextField::Category => "category",
            TextField::SkinType => "skin_type",
            TextField::Gender => "gender",
            TextField::UsageFrequency => "usage_frequency",
        }
    }

    /// Column value, or "" when the column is absent from the schema
    fn read<'a>(self, catalog: &Catalog, item: &'a CatalogItem) -> &'a str {
        let schema = catalog.schema();
        let (present, value) = match self {
            TextField::Category => (schema.has_category, &item.category),
            TextField::SkinType => (schema.has_skin_type, &item.skin_type),
            TextField::Gender => (schema.has_gender, &item.gender),
            TextField::UsageFrequency => (schema.has_usage_frequency, &item.usage_frequency),
        };
        if present {
            value
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Match {
    Exact,
    Substring,
}

impl FilterLayer {
    pub fn new() -> Self {
        Self
    }

    pub fn filter<'a>(&self, catalog: &'a Catalog, criteria: &FilterCriteria) -> Result<CandidateSet<'a>> {
        let mut ids: Vec<ItemId> = catalog.ids().collect();

        let stages = [
            (TextField::Category, criteria.category.as_deref(), Match::Exact),
            (TextField::SkinType, criteria.skin_type.as_deref(), Match::Substring),
            (TextField::Gender, criteria.gender.as_deref(), Match::Substring),
            (TextField::UsageFrequency, criteria.usage_frequency.as_deref(), Match::Substring),
        ];

        for (field, value, mode) in stages {
            if ids.is_empty() {
                debug!(stage = field.name(), "Candidate set empty; skipping remaining filters");
                return Ok(CandidateSet::empty(catalog));
            }
            let Some(value) = value else { continue };
            let wanted = value.trim().to_lowercase();
            ids.retain(|&id| {
                let actual = field
                    .read(catalog, &catalog.items()[id.index()])
                    .trim()
                    .to_lowercase();
                match mode {
                    Match::Exact => actual == wanted,
                    Match::Substring => actual.contains(&wanted),
                }
            });
            debug!(stage = field.name(), remaining = ids.len(), "Filter stage applied");
        }

        if ids.is_empty() {
            return Ok(CandidateSet::empty(catalog));
        }

        if !catalog.schema().has_price {
            warn!("Catalog has no {} column; price filter cannot run", PRICE_COLUMN);
            return Err(DataError::MissingColumn(PRICE_COLUMN).into());
        }

        let range = match criteria.price_range {
            Some(range) => range,
            None => match catalog.price_bounds() {
                Some((min, max)) => PriceRange::new(min, max),
                None => return Ok(CandidateSet::empty(catalog)),
            },
        };
        ids.retain(|&id| range.contains(catalog.items()[id.index()].price_idr));

        debug!(
            min_price = range.min,
            max_price = range.max,
            remaining = ids.len(),
            "Price filter applied"
        );

        Ok(CandidateSet::from_ids_unchecked(catalog, ids))
    }
}

/// Convenience wrapper around [`FilterLayer::filter`].
pub fn filter<'a>(catalog: &'a Catalog, criteria: &FilterCriteria) -> Result<CandidateSet<'a>> {
    FilterLayer::new().filter(catalog, criteria)
}
