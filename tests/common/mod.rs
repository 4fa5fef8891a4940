#![allow(dead_code)]

use axum_test::TestServer;
use linkhub::application::services::{
    AccessPolicy, LinkService, ProjectService, ResolutionEngine,
};
use linkhub::config::CacheTtls;
use linkhub::domain::click_event::ClickEvent;
use linkhub::domain::entities::{Link, NewLink};
use linkhub::domain::repositories::LinkStore;
use linkhub::infrastructure::cache::MemoryCache;
use linkhub::infrastructure::persistence::{MemoryLinkStore, MemoryProjectStore};
use linkhub::routes::router;
use linkhub::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Full application wired against in-process stores and cache.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub links: Arc<MemoryLinkStore>,
    pub projects: Arc<MemoryProjectStore>,
    pub cache: Arc<MemoryCache>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_queue_capacity(100)
}

pub fn spawn_app_with_queue_capacity(capacity: usize) -> TestApp {
    let links = Arc::new(MemoryLinkStore::new());
    let projects = Arc::new(MemoryProjectStore::new());
    let cache = Arc::new(MemoryCache::new());
    let ttls = CacheTtls::default();

    let policy = Arc::new(AccessPolicy::new(
        projects.clone(),
        cache.clone(),
        ttls.acl,
    ));
    let (click_tx, click_rx) = mpsc::channel(capacity);

    let state = AppState {
        resolution: Arc::new(ResolutionEngine::new(
            links.clone(),
            cache.clone(),
            policy.clone(),
            click_tx,
            ttls,
        )),
        link_service: Arc::new(LinkService::new(
            links.clone(),
            projects.clone(),
            cache.clone(),
            policy.clone(),
            ttls,
        )),
        project_service: Arc::new(ProjectService::new(projects.clone(), policy)),
        cache: cache.clone(),
        cache_enabled: true,
        base_url: "http://localhost:3000".to_string(),
    };

    let server = TestServer::new(router(state.clone())).unwrap();

    TestApp {
        server,
        state,
        links,
        projects,
        cache,
        click_rx,
    }
}

/// Inserts a link directly into the store, bypassing the API.
pub async fn seed_link(
    links: &MemoryLinkStore,
    code: &str,
    url: &str,
    is_public: bool,
    owner_id: Option<Uuid>,
) -> Link {
    links
        .create(NewLink {
            short_code: code.to_string(),
            original_url: url.to_string(),
            project_id: 1,
            owner_id,
            is_public,
            expires_at: None,
        })
        .await
        .unwrap()
}

pub async fn seed_expired_link(links: &MemoryLinkStore, code: &str) -> Link {
    links
        .create(NewLink {
            short_code: code.to_string(),
            original_url: "https://example.com/expired".to_string(),
            project_id: 1,
            owner_id: None,
            is_public: true,
            expires_at: Some(chrono::Utc::now() - chrono::Duration::minutes(1)),
        })
        .await
        .unwrap()
}

/// Polls the store until the link's click count reaches `expected`, or
/// panics after a short deadline. Used when a background worker applies the
/// increments.
pub async fn wait_for_clicks(links: &MemoryLinkStore, code: &str, expected: i64) {
    for _ in 0..100 {
        let link = links.find_by_code(code).await.unwrap().unwrap();
        if link.clicks_count >= expected {
            assert_eq!(link.clicks_count, expected);
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let link = links.find_by_code(code).await.unwrap().unwrap();
    panic!(
        "clicks for {} stuck at {}, expected {}",
        code, link.clicks_count, expected
    );
}
