//! Deterministic sample catalog for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use discovery_core::types::Product;

const ADJECTIVES: [&str; 10] =
    ["Red", "Blue", "Vintage", "Minimal", "Velvet", "Leather", "Linen", "Golden", "Rustic", "Classic"];

const NOUNS: [(&str, &str); 12] = [
    ("Sneakers", "shoes"),
    ("Boots", "shoes"),
    ("Sandals", "shoes"),
    ("Lamp", "home/lighting"),
    ("Armchair", "home/furniture"),
    ("Sofa", "home/furniture"),
    ("Rug", "home/decor"),
    ("Jacket", "apparel"),
    ("Shirt", "apparel"),
    ("Backpack", "bags"),
    ("Watch", "accessories"),
    ("Sunglasses", "accessories"),
];

const BRANDS: [&str; 6] = ["Northwind", "Fieldhouse", "Atelier Nine", "Kestrel", "Morrow & Co", "Plainweave"];

/// `count` products with ids `sample-0000`, `sample-0001`, ...; same seed,
/// same catalog. Prices range from 5.00 to 899.99.
pub fn products(count: usize, seed: u64) -> Vec<Product> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
            let (noun, category) = NOUNS[rng.gen_range(0..NOUNS.len())];
            let brand = BRANDS[rng.gen_range(0..BRANDS.len())];
            let price = f64::from(rng.gen_range(500u32..90_000)) / 100.0;
            Product::new(format!("sample-{i:04}"), format!("{adjective} {noun}"), price)
                .with_description(format!("{adjective} {} by {brand}", noun.to_lowercase()))
                .with_image(format!("https://images.example.com/sample/{i:04}.jpg"))
                .with_categories([category])
                .with_brand(brand)
                .with_url(format!("https://shop.example.com/p/sample-{i:04}"))
        })
        .collect()
}
