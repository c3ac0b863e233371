use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use discovery_catalog::interaction_log::{DISCOVERY_FILE, PERSONALIZATION_FILE};
use discovery_catalog::{load_products, read_log, sample, write_products, CatalogPool, CatalogSearch, InteractionLog};
use discovery_core::traits::{DiscoveryPool, InteractionTracker};
use discovery_core::types::{
    DiscoveryPercentage, InspirationReason, InteractionEvent, InteractionKind, InteractionSource, Product,
    ProductWithContext, SearchQuery,
};
use discovery_mix::{DiscoveryMixer, DiscoveryService, InteractionRecorder, MixerOptions};

#[test]
fn load_directory_mixes_single_and_array_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("shoes")).unwrap();
    write_products(&dir.join("a.json"), &[Product::new("1", "Lamp", 20.0), Product::new("2", "Rug", 35.0)]).unwrap();
    fs::write(dir.join("shoes/b.json"), r#"{"id": "3", "name": "Boots", "price": 120.0, "categories": ["shoes"]}"#).unwrap();
    fs::write(dir.join("shoes/c.json"), r#"[{"id": "1", "name": "Duplicate Lamp", "price": 1.0}]"#).unwrap();
    fs::write(dir.join("notes.txt"), "not a catalog").unwrap();

    let products = load_products(dir).expect("load");

    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(products[0].name, "Lamp", "first occurrence wins");
    assert_eq!(products[2].categories, vec!["shoes".to_string()]);
}

#[test]
fn load_single_file_and_missing_dir() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("catalog.json");
    write_products(&file, &sample::products(12, 1)).unwrap();
    assert_eq!(load_products(&file).expect("load").len(), 12);
    assert!(load_products(&tmp.path().join("missing")).expect("load").is_empty());
}

#[test]
fn malformed_catalog_is_an_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();
    assert!(load_products(tmp.path()).is_err());
}

#[tokio::test]
async fn pool_respects_exclusions_and_count() {
    let catalog = Arc::new(sample::products(30, 5));
    let exclude: HashSet<String> = catalog.iter().take(25).map(|p| p.id.clone()).collect();
    let pool = CatalogPool::new(Arc::clone(&catalog));

    let picked = pool.fetch(4, &exclude, Some("lamp")).await.expect("fetch");
    assert_eq!(picked.len(), 4);
    assert!(picked.iter().all(|p| !exclude.contains(&p.id)));

    let short = pool.fetch(10, &exclude, None).await.expect("fetch");
    assert_eq!(short.len(), 5, "only five products are outside the exclusion set");
}

#[tokio::test]
async fn seeded_pools_agree() {
    let catalog = Arc::new(sample::products(50, 5));
    let a = CatalogPool::new(Arc::clone(&catalog)).with_seed(11);
    let b = CatalogPool::new(Arc::clone(&catalog)).with_seed(11);
    let none = HashSet::new();
    assert_eq!(a.fetch(6, &none, None).await.unwrap(), b.fetch(6, &none, None).await.unwrap());
}

#[test]
fn interaction_log_separates_channels() {
    let tmp = TempDir::new().unwrap();
    let log = InteractionLog::open(tmp.path()).expect("open");
    let personalized = ProductWithContext::personalized(Product::new("p-1", "Lamp", 20.0));
    let inspiration = ProductWithContext::inspiration(Product::new("x-1", "Rug", 35.0), InspirationReason::Trending);

    log.record(InteractionEvent::for_item(&personalized, InteractionKind::View, None));
    log.record(InteractionEvent::for_item(&inspiration, InteractionKind::Click, None));
    log.record(InteractionEvent::for_item(&personalized, InteractionKind::Click, None));

    let training: Vec<InteractionEvent> = read_log(&tmp.path().join(PERSONALIZATION_FILE)).unwrap();
    let discovery: Vec<InteractionEvent> = read_log(&tmp.path().join(DISCOVERY_FILE)).unwrap();
    assert_eq!(training.len(), 2);
    assert!(training.iter().all(|e| e.source() == InteractionSource::Personalized && e.product_id() == "p-1"));
    assert_eq!(discovery.len(), 1);
    assert_eq!(discovery[0].product_id(), "x-1");
    assert_eq!(discovery[0].reason(), Some(InspirationReason::Trending));
}

#[tokio::test]
async fn catalog_search_mix_and_log_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let catalog = Arc::new(sample::products(400, 7));
    let log = Arc::new(InteractionLog::open(tmp.path()).expect("open"));
    let mixer = DiscoveryMixer::new(CatalogPool::new(Arc::clone(&catalog)).with_seed(3))
        .with_options(MixerOptions { seed: Some(3), ..MixerOptions::default() })
        .with_tracker(log.clone());
    let service = DiscoveryService::new(CatalogSearch::new(Arc::clone(&catalog), 40), mixer);

    let results = service.search(&SearchQuery::text("home"), DiscoveryPercentage::Ten).await.expect("search");

    assert_eq!(results.len(), 40, "a third of the sample catalog is homeware");
    let inspiration: Vec<&str> =
        results.items().iter().filter(|s| s.item().is_inspiration()).map(|s| s.item().id()).collect();
    assert_eq!(inspiration.len(), 4);
    let unique: HashSet<&str> = results.items().iter().map(|s| s.item().id()).collect();
    assert_eq!(unique.len(), 40);

    let recorder = InteractionRecorder::new(log.clone());
    recorder.record_all(results.items(), InteractionKind::View).await;

    let training: Vec<InteractionEvent> = read_log(&tmp.path().join(PERSONALIZATION_FILE)).unwrap();
    let discovery: Vec<InteractionEvent> = read_log(&tmp.path().join(DISCOVERY_FILE)).unwrap();
    assert_eq!((training.len(), discovery.len()), (36, 4));
    assert!(discovery.iter().all(|e| inspiration.contains(&e.product_id())));
    assert!(training.iter().all(|e| !inspiration.contains(&e.product_id())));
}
