use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use discovery_catalog::{load_products, sample, write_products, CatalogPool, CatalogSearch, InteractionLog};
use discovery_core::config::{Config, Settings};
use discovery_core::types::{DiscoveryPercentage, InteractionKind, Product, SearchQuery};
use discovery_mix::{classify, DiscoveryMixer, DiscoveryService, InteractionRecorder, MixerOptions};

const USAGE: &str = "<search|classify|sample> [args...]
  search <query...> [--pct 0|5|10] [--image kw1,kw2]
  classify <price> <name> [query]
  sample <count> <out_file> [seed]";

const FALLBACK_SAMPLE_SIZE: usize = 500;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} {}", prog, USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[derive(Debug, Default)]
struct SearchArgs {
    words: Vec<String>,
    image_keywords: Vec<String>,
    pct: Option<DiscoveryPercentage>,
}

impl SearchArgs {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut out = Self::default();
        let mut it = args.iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--pct" => {
                    let value = it.next().ok_or_else(|| anyhow!("--pct needs a value"))?;
                    out.pct = Some(value.parse()?);
                }
                "--image" => {
                    let value = it.next().ok_or_else(|| anyhow!("--image needs a comma separated list"))?;
                    out.image_keywords =
                        value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
                }
                other => out.words.push(other.to_string()),
            }
        }
        Ok(out)
    }

    fn query(&self) -> SearchQuery {
        let text = self.words.join(" ");
        let query = if text.trim().is_empty() { SearchQuery::default() } else { SearchQuery::text(text) };
        query.with_image_keywords(self.image_keywords.iter().cloned())
    }
}

fn load_catalog(config: &Config, settings: &Settings) -> anyhow::Result<Vec<Product>> {
    let dir = config.resolve_path(&settings.catalog.dir);
    let products = load_products(&dir)?;
    if products.is_empty() {
        info!(dir = %dir.display(), size = FALLBACK_SAMPLE_SIZE, "catalog empty, using generated sample");
        return Ok(sample::products(FALLBACK_SAMPLE_SIZE, 42));
    }
    Ok(products)
}

async fn run_search(config: &Config, settings: &Settings, args: &[String]) -> anyhow::Result<()> {
    let args = SearchArgs::parse(args)?;
    let query = args.query();
    let pct = args.pct.unwrap_or(settings.discovery.percentage);

    let catalog = Arc::new(load_catalog(config, settings)?);
    let log = Arc::new(InteractionLog::open(&config.resolve_path(&settings.tracking.log_dir))?);

    let mut pool = CatalogPool::new(Arc::clone(&catalog));
    if let Some(seed) = settings.discovery.seed {
        pool = pool.with_seed(seed);
    }
    let mixer = DiscoveryMixer::new(pool)
        .with_options(MixerOptions::from(&settings.discovery))
        .with_tracker(log.clone());
    let service = DiscoveryService::new(CatalogSearch::new(Arc::clone(&catalog), settings.catalog.search_limit), mixer);

    let results = service.search(&query, pct).await?;
    println!(
        "session {} ({:?}, {} results, discovery {})",
        results.session().session_id,
        results.session().search_type,
        results.len(),
        pct
    );
    for (rank, stamped) in results.items().iter().enumerate() {
        let item = stamped.item();
        let tag = item.inspiration_reason().map(|r| format!("[{}] ", r.label())).unwrap_or_default();
        println!("{:>3}. {}{} ({}) ${:.2}", rank + 1, tag, item.product().name, item.id(), item.product().price);
    }

    InteractionRecorder::new(log.clone()).record_all(results.items(), InteractionKind::View).await;
    info!(dir = %log.dir().display(), "recorded views");
    Ok(())
}

fn run_classify(args: &[String]) -> anyhow::Result<()> {
    let price: f64 = args
        .first()
        .ok_or_else(|| anyhow!("Usage: discovery-cli classify <price> <name> [query]"))?
        .parse()
        .context("price must be a number")?;
    let name = args.get(1).ok_or_else(|| anyhow!("Usage: discovery-cli classify <price> <name> [query]"))?;
    let query = args.get(2).map(String::as_str);
    let reason = classify(&Product::new("adhoc", name.as_str(), price), query);
    println!("{} ({})", reason, reason.label());
    Ok(())
}

fn run_sample(args: &[String]) -> anyhow::Result<()> {
    let count: usize = args
        .first()
        .ok_or_else(|| anyhow!("Usage: discovery-cli sample <count> <out_file> [seed]"))?
        .parse()
        .context("count must be a positive integer")?;
    let out = args.get(1).map(PathBuf::from).ok_or_else(|| anyhow!("missing <out_file>"))?;
    let seed: u64 = args.get(2).map(|s| s.parse()).transpose().context("seed must be an integer")?.unwrap_or(42);
    let products = sample::products(count, seed);
    write_products(&out, &products)?;
    println!("✅ Wrote {} products to {}", products.len(), out.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "search" => run_search(&config, &settings, &args).await?,
        "classify" => run_classify(&args)?,
        "sample" => run_sample(&args)?,
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use discovery_core::types::SearchType;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn search_args_collect_words_and_flags() {
        let args = SearchArgs::parse(&strings(&["blue", "--pct", "10", "sofa", "--image", "velvet, ,teal"])).unwrap();
        assert_eq!(args.words, strings(&["blue", "sofa"]));
        assert_eq!(args.pct, Some(DiscoveryPercentage::Ten));
        assert_eq!(args.image_keywords, strings(&["velvet", "teal"]));
        assert_eq!(args.query().search_type(), SearchType::Mixed);
    }

    #[test]
    fn search_args_reject_bad_percentage() {
        assert!(SearchArgs::parse(&strings(&["lamp", "--pct", "7"])).is_err());
        assert!(SearchArgs::parse(&strings(&["lamp", "--pct"])).is_err());
    }

    #[test]
    fn image_only_query() {
        let args = SearchArgs::parse(&strings(&["--image", "rug"])).unwrap();
        assert_eq!(args.query().search_type(), SearchType::Image);
    }
}
