//! News repository
//!
//! Fetches news from the remote API and normalizes it for the screens:
//! - paginated, filterable listing with promotional-item augmentation
//! - canned single-item fallback when the listing fetch fails
//! - CRUD passthrough and flat search
//! - last-results cache for the listing screen

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock};

use crate::client::{ApiError, NewsApi, NewsPayload, NewsQuery};
use crate::models::{CategoryFilter, NewsDraft, NewsItem, PagedNews};

/// Reserved id of the pinned promotional item. Never issued by the API.
pub const PROMO_NEWS_ID: i64 = 9999;

/// The pinned community item shown at the top of unfiltered listings.
/// Stamped with the current time so it always sorts as fresh.
pub fn promotional_item() -> NewsItem {
    NewsItem {
        id: PROMO_NEWS_ID,
        title: "Posada Navideña en Facultad de Agronomía Juan José Ríos".to_string(),
        description: "Celebración navideña para niños de la \"escuelita\" con diferentes \
                      actividades y regalos."
            .to_string(),
        body: "Se realizó una emotiva posada navideña para los niños de la \"escuelita\" en \
               las instalaciones de la Facultad de Agronomía Juan José Ríos. Durante el \
               evento, se llevaron a cabo diversas actividades recreativas y juegos para la \
               diversión de los pequeños. El momento más esperado fue la entrega de regalos, \
               donde cada niño recibió un presente navideño, llenando de alegría y sonrisas \
               el lugar. Fue una jornada llena de espíritu navideño y convivencia comunitaria."
            .to_string(),
        category: "Comunidad".to_string(),
        image: "images/posada_1.jpg".to_string(),
        published_at: Utc::now(),
        author: "Administrador".to_string(),
    }
}

/// News access as the controllers see it.
///
/// `fetch_page` never fails in the reqwest-backed implementation (it falls
/// back to a canned page); the `Result` stays in the signature so substitute
/// repositories can exercise the listing screen's error path.
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// One listing page, augmented and normalized
    async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
        filter: CategoryFilter,
        search: &str,
    ) -> Result<PagedNews, ApiError>;

    /// One item by id; not-found and transport failure both yield `None`
    async fn fetch_by_id(&self, id: i64) -> Option<NewsItem>;

    /// Create a news item, returning the stored record
    async fn create(&self, draft: &NewsDraft) -> Result<NewsItem, ApiError>;

    /// Update a news item, returning the stored record
    async fn update(&self, id: i64, draft: &NewsDraft) -> Result<NewsItem, ApiError>;

    /// Delete a news item; false on any failure
    async fn delete(&self, id: i64) -> bool;

    /// Flat search across all pages; empty on failure
    async fn search(&self, term: &str) -> Vec<NewsItem>;

    /// Items from the most recent successful `fetch_page`
    fn last_results(&self) -> Vec<NewsItem>;
}

/// The filter labels the UI populates its category bar from
pub fn categories() -> &'static [CategoryFilter] {
    &CategoryFilter::ALL_FILTERS
}

/// API-backed repository
pub struct NewsService {
    api: Arc<dyn NewsApi>,
    last_results: RwLock<Vec<NewsItem>>,
}

impl NewsService {
    pub fn new(api: Arc<dyn NewsApi>) -> Self {
        Self {
            api,
            last_results: RwLock::new(Vec::new()),
        }
    }

    /// The promotional item rides along only on unfiltered community-visible
    /// listings without an active search.
    fn promo_applies(filter: CategoryFilter, search: &str) -> bool {
        if !search.trim().is_empty() {
            return false;
        }
        matches!(
            filter.as_str(),
            "Todos" | "Comunidad"
        )
    }

    fn fallback_page(per_page: u32) -> PagedNews {
        PagedNews {
            items: vec![promotional_item()],
            total_items: 1,
            total_pages: 1,
            current_page: 1,
            per_page,
        }
    }
}

#[async_trait]
impl NewsRepository for NewsService {
    async fn fetch_page(
        &self,
        page: u32,
        per_page: u32,
        filter: CategoryFilter,
        search: &str,
    ) -> Result<PagedNews, ApiError> {
        let trimmed = search.trim();
        let query = NewsQuery {
            pagina: Some(page),
            items_por_pagina: Some(per_page),
            categoria: filter.query_value().map(str::to_string),
            busqueda: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        };
        let dto = match self.api.list(&query).await {
            Ok(dto) => dto,
            Err(err) => {
                tracing::warn!(error = %err, "news listing fetch failed, serving fallback");
                return Ok(Self::fallback_page(per_page));
            }
        };

        let mut items: Vec<NewsItem> = dto.items.into_iter().map(NewsItem::from).collect();
        let mut total_items = dto.total_items;
        if Self::promo_applies(filter, search) {
            items.insert(0, promotional_item());
            total_items += 1;
        }

        *self.last_results.write().unwrap_or_else(|e| e.into_inner()) = items.clone();

        Ok(PagedNews {
            items,
            total_items,
            total_pages: dto.total_paginas,
            current_page: dto.pagina_actual,
            per_page: dto.items_por_pagina,
        })
    }

    async fn fetch_by_id(&self, id: i64) -> Option<NewsItem> {
        if id == PROMO_NEWS_ID {
            return Some(promotional_item());
        }
        match self.api.get(id).await {
            Ok(dto) => Some(NewsItem::from(dto)),
            Err(err) => {
                tracing::debug!(id, error = %err, "news item lookup failed");
                None
            }
        }
    }

    async fn create(&self, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
        let dto = self.api.create(&NewsPayload::from(draft)).await?;
        Ok(NewsItem::from(dto))
    }

    async fn update(&self, id: i64, draft: &NewsDraft) -> Result<NewsItem, ApiError> {
        let dto = self.api.update(id, &NewsPayload::from(draft)).await?;
        Ok(NewsItem::from(dto))
    }

    async fn delete(&self, id: i64) -> bool {
        match self.api.delete(id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(id, error = %err, "news item delete failed");
                false
            }
        }
    }

    async fn search(&self, term: &str) -> Vec<NewsItem> {
        let query = NewsQuery {
            busqueda: Some(term.to_string()),
            ..NewsQuery::default()
        };
        match self.api.list(&query).await {
            Ok(dto) => dto.items.into_iter().map(NewsItem::from).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "news search failed");
                Vec::new()
            }
        }
    }

    fn last_results(&self) -> Vec<NewsItem> {
        self.last_results
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
