// ============================================
// Catalog Loader
// ============================================
//
// Reads the normalized catalog CSV and performs the single schema
// validation step. Every column has a documented default:
//
//   column              | absent                       | malformed
//   --------------------+------------------------------+-----------
//   text columns        | ""                           | n/a
//   Price_IDR           | schema.has_price = false     | 0.0
//   Rating              | 0.0                          | 0.0
//   Number_of_Reviews   | 0                            | 0
//   combined_features   | derived from category,       | n/a
//                       | skin type, usage, ingredients|
//
// A missing Price_IDR column is not recovered here: the filter stage
// fails on it instead. Everything else is recovered locally.

use crate::error::Result;
use crate::models::{Catalog, CatalogItem, CatalogSchema, PRICE_COLUMN};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// How a column is recovered when it is absent or unparsable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Lower-cased and trimmed text, empty when absent
    NormalizedText,
    /// Trimmed text, empty when absent
    Text,
    /// Numeric, coerced to 0 when malformed
    Zero,
    /// Built from other columns when absent
    Derived,
    /// Absence is recorded in the schema and reported by the filter stage
    Required,
}

pub const FIELD_DEFAULTS: &[(&str, FieldDefault)] = &[
    ("Product_Name", FieldDefault::NormalizedText),
    ("Brand", FieldDefault::NormalizedText),
    ("Category", FieldDefault::NormalizedText),
    ("Skin_Type", FieldDefault::NormalizedText),
    ("Gender", FieldDefault::NormalizedText),
    ("Usage_Frequency", FieldDefault::NormalizedText),
    ("Ingredients", FieldDefault::NormalizedText),
    ("Country_of_Origin", FieldDefault::Text),
    (PRICE_COLUMN, FieldDefault::Required),
    ("Rating", FieldDefault::Zero),
    ("Number_of_Reviews", FieldDefault::Zero),
    ("combined_features", FieldDefault::Derived),
];

#[derive(Debug, Default)]
struct CoercionStats {
    price: usize,
    rating: usize,
    reviews: usize,
}

/// Load a catalog from a CSV file on disk.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let catalog = read_catalog(file)?;
    info!(
        path = %path.display(),
        items = catalog.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

impl Catalog {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        read_catalog(source)
    }
}

/// Load a catalog from any CSV source with a header row.
pub fn read_catalog<R: Read>(source: R) -> Result<Catalog> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::new(&headers);

    for (name, default) in FIELD_DEFAULTS {
        if !columns.has(name) {
            match default {
                FieldDefault::Required => {
                    warn!(column = *name, "Required column missing; filtering will fail")
                }
                _ => info!(column = *name, "Column missing; using default"),
            }
        }
    }

    let schema = CatalogSchema {
        has_category: columns.has("Category"),
        has_skin_type: columns.has("Skin_Type"),
        has_gender: columns.has("Gender"),
        has_usage_frequency: columns.has("Usage_Frequency"),
        has_price: columns.has(PRICE_COLUMN),
    };

    let mut stats = CoercionStats::default();
    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        items.push(columns.item(&record, &mut stats));
    }

    if stats.price + stats.rating + stats.reviews > 0 {
        warn!(
            price = stats.price,
            rating = stats.rating,
            reviews = stats.reviews,
            "Malformed numeric values coerced to 0"
        );
    }

    Ok(Catalog::with_schema(items, schema))
}

struct ColumnMap {
    positions: HashMap<String, usize>,
}

impl ColumnMap {
    fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { positions }
    }

    fn has(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    fn raw<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions.get(column).and_then(|&i| record.get(i))
    }

    fn text(&self, record: &StringRecord, column: &str) -> String {
        normalize_text(self.raw(record, column).unwrap_or(""))
    }

    fn item(&self, record: &StringRecord, stats: &mut CoercionStats) -> CatalogItem {
        let category = self.text(record, "Category");
        let skin_type = self.text(record, "Skin_Type");
        let usage_frequency = self.text(record, "Usage_Frequency");
        let ingredients = self.text(record, "Ingredients");

        let combined_features = match self.raw(record, "combined_features") {
            Some(raw) => raw.to_string(),
            None => combine_features(&category, &skin_type, &usage_frequency, &ingredients),
        };

        let price_idr = match self.raw(record, PRICE_COLUMN) {
            Some(raw) => parse_price(raw).unwrap_or_else(|| {
                stats.price += 1;
                0.0
            }),
            None => 0.0,
        };

        let rating = match self.raw(record, "Rating") {
            Some(raw) => parse_finite(raw).unwrap_or_else(|| {
                stats.rating += 1;
                0.0
            }),
            None => 0.0,
        };

        let number_of_reviews = match self.raw(record, "Number_of_Reviews") {
            Some(raw) => parse_count(raw).unwrap_or_else(|| {
                stats.reviews += 1;
                0
            }),
            None => 0,
        };

        CatalogItem {
            product_name: self.text(record, "Product_Name"),
            brand: self.text(record, "Brand"),
            category,
            skin_type,
            gender: self.text(record, "Gender"),
            usage_frequency,
            ingredients,
            country_of_origin: self
                .raw(record, "Country_of_Origin")
                .unwrap_or("")
                .trim()
                .to_string(),
            price_idr,
            rating,
            number_of_reviews,
            combined_features,
        }
    }
}

pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Concatenation used when the catalog carries no `combined_features` column.
pub fn combine_features(
    category: &str,
    skin_type: &str,
    usage_frequency: &str,
    ingredients: &str,
) -> String {
    format!("{} {} {} {}", category, skin_type, usage_frequency, ingredients)
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_price(raw: &str) -> Option<f64> {
    parse_finite(raw).filter(|v| *v >= 0.0)
}

fn parse_count(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    trimmed.parse::<u64>().ok().or_else(|| {
        parse_finite(trimmed)
            .filter(|v| *v >= 0.0)
            .map(|v| v.trunc() as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CSV: &str = "\
Product_Name,Brand,Category,Skin_Type,Gender,Usage_Frequency,Ingredients,Price_IDR,Rating,Number_of_Reviews,Country_of_Origin,combined_features
 Hydra Gel ,Acme,Moisturizer,Dry,Female,Daily,Hyaluronic Acid,150000,4.5,120,Korea,moisturizer dry daily hyaluronic acid
Clay Mask,Bloom,Mask,Oily,Unisex,Weekly,Kaolin,abc,n/a,12.0,France,mask oily weekly kaolin
";

    #[test]
    fn test_read_full_catalog() {
        let catalog = read_catalog(FULL_CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.schema().has_price);

        let first = &catalog.items()[0];
        assert_eq!(first.product_name, "hydra gel");
        assert_eq!(first.category, "moisturizer");
        assert_eq!(first.price_idr, 150_000.0);
        assert_eq!(first.number_of_reviews, 120);
        assert_eq!(first.country_of_origin, "Korea");
    }

    #[test]
    fn test_malformed_numbers_coerced_to_zero() {
        let catalog = read_catalog(FULL_CSV.as_bytes()).unwrap();
        let second = &catalog.items()[1];
        assert_eq!(second.price_idr, 0.0);
        assert_eq!(second.rating, 0.0);
        assert_eq!(second.number_of_reviews, 12);
    }

    #[test]
    fn test_missing_optional_columns_default() {
        let csv = "Product_Name,Category,Ingredients,Price_IDR,Rating,Number_of_Reviews\n\
                   Toner A,Toner,Rose Water,50000,4.0,10\n";
        let catalog = read_catalog(csv.as_bytes()).unwrap();
        let item = &catalog.items()[0];

        assert_eq!(item.skin_type, "");
        assert_eq!(item.gender, "");
        assert!(!catalog.schema().has_gender);
        assert!(catalog.schema().has_price);
        // Derived from normalized fields when the column is absent
        assert_eq!(item.combined_features, "toner   rose water");
    }

    #[test]
    fn test_missing_price_column_recorded_in_schema() {
        let csv = "Product_Name,Category,Rating,Number_of_Reviews\nSerum,Serum,4.0,3\n";
        let catalog = read_catalog(csv.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.schema().has_price);
    }

    #[test]
    fn test_parse_count_variants() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7.0 "), Some(7));
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("many"), None);
    }
}
