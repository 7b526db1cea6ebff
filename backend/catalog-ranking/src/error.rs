use crate::models::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Problems with the catalog snapshot or the index built from it.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("cannot build a feature index from an empty corpus")]
    EmptyCorpus,

    #[error("empty vocabulary; documents contain only stop words or single characters")]
    EmptyVocabulary,

    #[error("required column missing from catalog: {0}")]
    MissingColumn(&'static str),

    #[error("feature index has {rows} rows but catalog has {items} items; rebuild the index")]
    StaleIndex { rows: usize, items: usize },

    #[error("item {0} is not part of the catalog")]
    UnknownItem(ItemId),
}

impl CatalogError {
    pub fn config(msg: impl Into<String>) -> Self {
        CatalogError::Config(msg.into())
    }

    /// True when the error is the missing `Price_IDR` column, which callers
    /// treat as an empty filter result.
    pub fn is_missing_price(&self) -> bool {
        matches!(
            self,
            CatalogError::Data(DataError::MissingColumn(col)) if *col == crate::models::PRICE_COLUMN
        )
    }
}
