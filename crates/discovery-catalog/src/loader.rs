use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use discovery_core::types::Product;

/// A catalog file holds either one product or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Many(Vec<Product>),
    One(Box<Product>),
}

impl CatalogFile {
    fn into_products(self) -> Vec<Product> {
        match self {
            Self::Many(products) => products,
            Self::One(product) => vec![*product],
        }
    }
}

/// Load every product under `path`: a single `.json` file or a directory
/// walked for `.json` files in path order. Later duplicates of an id are
/// skipped.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let files = if path.is_file() { vec![path.to_path_buf()] } else { list_json_files(path) };
    if files.is_empty() {
        warn!(path = %path.display(), "no catalog files found");
        return Ok(vec![]);
    }
    let mut seen = HashSet::new();
    let mut products = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let parsed: CatalogFile =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", file.display()))?;
        for product in parsed.into_products() {
            if !seen.insert(product.id.clone()) {
                warn!(id = %product.id, file = %file.display(), "duplicate product id skipped");
                continue;
            }
            products.push(product);
        }
    }
    info!(files = files.len(), products = products.len(), "catalog loaded");
    Ok(products)
}

pub fn write_products(path: &Path, products: &[Product]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(products)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            json_files.push(path.to_path_buf());
        }
    }
    json_files.sort();
    json_files
}
