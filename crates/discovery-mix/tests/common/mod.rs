#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use discovery_core::traits::{DiscoveryPool, InteractionTracker, SearchProvider};
use discovery_core::types::{InteractionEvent, MixComposition, Product, ProductId, SearchQuery, SearchResponse};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub fn products(prefix: &str, n: usize, price: f64) -> Vec<Product> {
    (0..n)
        .map(|i| Product::new(format!("{prefix}-{i}"), format!("{prefix} item {i}"), price))
        .collect()
}

pub fn ids<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Product>,
{
    items.into_iter().map(|p| p.id.clone()).collect()
}

/// Hands out the first `count` of a fixed list and remembers what it was asked.
#[derive(Default)]
pub struct StaticPool {
    products: Vec<Product>,
    calls: AtomicUsize,
    last_count: AtomicUsize,
    last_exclude: Mutex<HashSet<ProductId>>,
    last_query: Mutex<Option<String>>,
}

impl StaticPool {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products, ..Self::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_count(&self) -> usize {
        self.last_count.load(Ordering::SeqCst)
    }

    pub fn last_exclude(&self) -> HashSet<ProductId> {
        self.last_exclude.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoveryPool for StaticPool {
    async fn fetch(
        &self,
        count: usize,
        exclude_ids: &HashSet<ProductId>,
        context_query: Option<&str>,
    ) -> anyhow::Result<Vec<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_count.store(count, Ordering::SeqCst);
        *self.last_exclude.lock().unwrap() = exclude_ids.clone();
        *self.last_query.lock().unwrap() = context_query.map(str::to_string);
        Ok(self.products.iter().take(count).cloned().collect())
    }
}

#[derive(Default)]
pub struct FailingPool {
    calls: AtomicUsize,
}

impl FailingPool {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryPool for FailingPool {
    async fn fetch(&self, _: usize, _: &HashSet<ProductId>, _: Option<&str>) -> anyhow::Result<Vec<Product>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("discovery backend refused the connection"))
    }
}

/// Never answers in any reasonable time.
pub struct HangingPool;

#[async_trait]
impl DiscoveryPool for HangingPool {
    async fn fetch(&self, _: usize, _: &HashSet<ProductId>, _: Option<&str>) -> anyhow::Result<Vec<Product>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(products("late", 10, 10.0))
    }
}

/// Panics on every fetch.
pub struct PanickingPool;

#[async_trait]
impl DiscoveryPool for PanickingPool {
    async fn fetch(&self, _: usize, _: &HashSet<ProductId>, _: Option<&str>) -> anyhow::Result<Vec<Product>> {
        panic!("discovery backend crashed");
    }
}

pub struct RecordingTracker {
    compositions: UnboundedSender<MixComposition>,
    events: UnboundedSender<InteractionEvent>,
}

pub struct TrackerFeed {
    pub compositions: UnboundedReceiver<MixComposition>,
    pub events: UnboundedReceiver<InteractionEvent>,
}

impl RecordingTracker {
    pub fn new() -> (Self, TrackerFeed) {
        let (ctx, crx) = unbounded_channel();
        let (etx, erx) = unbounded_channel();
        (Self { compositions: ctx, events: etx }, TrackerFeed { compositions: crx, events: erx })
    }
}

impl InteractionTracker for RecordingTracker {
    fn record(&self, event: InteractionEvent) {
        let _ = self.events.send(event);
    }

    fn record_composition(&self, composition: &MixComposition) {
        let _ = self.compositions.send(composition.clone());
    }
}

/// Forwards events after blocking its thread, like a sink doing slow disk I/O.
pub struct SlowTracker {
    pub delay: Duration,
    events: UnboundedSender<InteractionEvent>,
}

impl SlowTracker {
    pub fn new(delay: Duration) -> (Self, UnboundedReceiver<InteractionEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { delay, events: tx }, rx)
    }
}

impl InteractionTracker for SlowTracker {
    fn record(&self, event: InteractionEvent) {
        std::thread::sleep(self.delay);
        let _ = self.events.send(event);
    }
}

pub struct PanickingTracker;

impl InteractionTracker for PanickingTracker {
    fn record(&self, _event: InteractionEvent) {
        panic!("telemetry sink exploded");
    }

    fn record_composition(&self, _composition: &MixComposition) {
        panic!("telemetry sink exploded");
    }
}

pub struct StubSearch {
    pub response: SearchResponse,
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, _query: &SearchQuery) -> anyhow::Result<SearchResponse> {
        Ok(self.response.clone())
    }
}

pub struct BrokenSearch;

#[async_trait]
impl SearchProvider for BrokenSearch {
    async fn search(&self, _query: &SearchQuery) -> anyhow::Result<SearchResponse> {
        Err(anyhow::anyhow!("search backend returned 503"))
    }
}
