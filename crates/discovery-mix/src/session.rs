//! Search sessions: identity and timestamp for one query/response unit.

use std::sync::Arc;

use chrono::Utc;
use discovery_core::types::{ProductWithContext, SearchQuery, SearchSession, SearchType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTracker;

impl SessionTracker {
    pub fn new() -> Self {
        Self
    }

    /// Fresh id and timestamp on every call.
    pub fn create_session(&self, query: impl Into<String>, search_type: SearchType) -> SearchSession {
        SearchSession {
            session_id: Uuid::new_v4(),
            search_query: query.into(),
            search_type,
            timestamp: Utc::now(),
            image_analysis_keywords: None,
            result_count: 0,
        }
    }

    pub fn session_for(&self, query: &SearchQuery) -> SearchSession {
        self.create_session(query.context().unwrap_or_default(), query.search_type())
            .with_image_keywords(query.image_keywords.clone())
    }

    /// Freeze `session` with its result count and attach it to every item.
    pub fn stamp(&self, session: SearchSession, items: Vec<ProductWithContext>) -> StampedResults {
        let session = Arc::new(SearchSession { result_count: items.len(), ..session });
        let items = items
            .into_iter()
            .map(|item| StampedItem { session: Arc::clone(&session), item })
            .collect();
        StampedResults { session, items }
    }
}

/// A mixed item attributed to the session that produced it.
#[derive(Debug, Clone)]
pub struct StampedItem {
    session: Arc<SearchSession>,
    item: ProductWithContext,
}

impl StampedItem {
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn item(&self) -> &ProductWithContext {
        &self.item
    }

    pub fn into_item(self) -> ProductWithContext {
        self.item
    }
}

#[derive(Debug, Clone)]
pub struct StampedResults {
    session: Arc<SearchSession>,
    items: Vec<StampedItem>,
}

impl StampedResults {
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn items(&self) -> &[StampedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<StampedItem> {
        self.items
    }
}
