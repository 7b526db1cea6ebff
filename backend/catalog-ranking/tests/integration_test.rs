use catalog_ranking::{
    build_feature_index, evaluate, filter, load_catalog, rank, tune, Catalog, CatalogError, DataError,
    Evaluator, FilterCriteria, ItemId, RankingWeights, WeightGrid,
};
use std::io::Write;
use std::sync::Arc;
use std::thread;

const CATALOG_CSV: &str = "\
Product_Name,Brand,Category,Skin_Type,Gender,Usage_Frequency,Ingredients,Price_IDR,Rating,Number_of_Reviews,Country_of_Origin,combined_features
Gentle Foam,Brand A,Cleanser,Oily,Female,Daily,Salicylic Acid,85000,4.6,120,Korea,cleanser oily daily salicylic acid
Rose Mist,Brand B,Toner,Dry,Female,Daily,Rose Water,65000,4.1,300,France,toner dry daily rose water
Green Tea Toner,Brand C,Toner,Oily,Unisex,Daily,Green Tea,72000,3.9,45,Japan,toner oily daily green tea
Hydra Toner,Brand D,Toner,Combination,Male,Weekly,Hyaluronic Acid,99000,4.8,12,Korea,toner combination weekly hyaluronic acid
Night Toner,Brand E,Toner,Sensitive,Female and Male,Monthly,Centella,not-a-price,4.4,80,Indonesia,toner sensitive monthly centella
";

fn write_catalog(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("catalog.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(CATALOG_CSV.as_bytes()).unwrap();
    path
}

fn load() -> Catalog {
    let dir = tempfile::tempdir().unwrap();
    load_catalog(write_catalog(&dir)).unwrap()
}

#[test]
fn test_basic_workflow() {
    let catalog = load();
    assert_eq!(catalog.len(), 5);
    // unparseable price coerced to 0
    assert_eq!(catalog.items()[4].price_idr, 0.0);

    let index = build_feature_index(&catalog).unwrap();
    assert_eq!(index.len(), catalog.len());

    let criteria = FilterCriteria::new().category("toner").usage_frequency("daily");
    let candidates = filter(&catalog, &criteria).unwrap();
    assert_eq!(candidates.ids(), &[ItemId(1), ItemId(2)]);

    let ranked = rank(&candidates, &index, &RankingWeights::default(), 10, None).unwrap();
    assert_eq!(ranked.len(), 2);
    assert!(ranked[0].weighted_score >= ranked[1].weighted_score);
    assert!(ranked.iter().all(|r| candidates.contains(r.item_id)));

    let report = evaluate(&candidates, &index, &RankingWeights::default(), 2).unwrap();
    assert_eq!(report.recommended.len(), 2);
    assert!((0.0..=1.0).contains(&report.ndcg));

    let grid = WeightGrid::new(vec![0.1, 0.2], vec![0.1, 0.2], vec![0.4]).unwrap();
    let table = tune(&grid, &catalog, &index, 3).unwrap();
    assert_eq!(table.len(), 4);
}

#[test]
fn test_cleanser_scenario() {
    let catalog = load();

    let cleansers = filter(&catalog, &FilterCriteria::new().category(" Cleanser ")).unwrap();
    assert_eq!(cleansers.len(), 1);
    assert_eq!(catalog.get(cleansers.ids()[0]).unwrap().product_name, "gentle foam");

    let missing = filter(&catalog, &FilterCriteria::new().category("missing")).unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_gender_substring_matches_combined_values() {
    let catalog = load();
    let male = filter(&catalog, &FilterCriteria::new().gender("male")).unwrap();
    // "female" and "female and male" contain "male"
    assert_eq!(male.len(), 4);
}

#[test]
fn test_explicit_price_range_is_inclusive() {
    let catalog = load();
    let set = filter(&catalog, &FilterCriteria::new().price_range(65000.0, 85000.0)).unwrap();
    assert_eq!(set.ids(), &[ItemId(0), ItemId(1), ItemId(2)]);
}

#[test]
fn test_anchor_ranking_prefers_similar_products() {
    let catalog = load();
    let index = build_feature_index(&catalog).unwrap();
    let weights = RankingWeights::new(0.0, 0.0, 1.0).unwrap();

    let ranked = rank(&catalog.all(), &index, &weights, 3, Some(ItemId(0))).unwrap();
    assert_eq!(ranked[0].item_id, ItemId(0));
    assert!((ranked[0].similarity_norm - 1.0).abs() < 1e-9);
}

#[test]
fn test_scenarios_over_loaded_catalog() {
    let catalog = load();
    let index = build_feature_index(&catalog).unwrap();
    let scenarios = vec![
        FilterCriteria::new().category("toner"),
        FilterCriteria::new().category("serum"),
        FilterCriteria::new(),
    ];

    let summary = Evaluator::new()
        .evaluate_scenarios(&catalog, &index, &RankingWeights::default(), &scenarios, 10)
        .unwrap();
    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.outcomes[0].candidates, 4);
    assert_eq!(summary.outcomes[1].k, 5);
}

#[test]
fn test_missing_price_column_surfaces_error() {
    let csv = "Product_Name,Category,combined_features,Rating,Number_of_Reviews\n\
               Foam,cleanser,cleanser foam,4.0,10\n";
    let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();

    let result = filter(&catalog, &FilterCriteria::new().category("cleanser"));
    assert!(matches!(
        result,
        Err(CatalogError::Data(DataError::MissingColumn("Price_IDR")))
    ));
}

#[test]
fn test_concurrent_readers_share_index() {
    let catalog = Arc::new(load());
    let index = Arc::new(build_feature_index(&catalog).unwrap());
    let expected = rank(&catalog.all(), &index, &RankingWeights::default(), 5, None).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let index = Arc::clone(&index);
            thread::spawn(move || rank(&catalog.all(), &index, &RankingWeights::default(), 5, None).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
