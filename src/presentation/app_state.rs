// Application state for HTTP handlers
use crate::application::dashboard_store::DashboardStore;
use crate::application::explore_repository::ExploreRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub repository: Arc<dyn ExploreRepository>,
    stores: Mutex<HashMap<String, DashboardStore>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ExploreRepository>) -> Self {
        Self {
            repository,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Store for `name`, started on first use.
    pub async fn store_for(&self, name: &str) -> anyhow::Result<DashboardStore> {
        let existing = self.stores.lock().await.get(name).cloned();
        if let Some(store) = existing {
            return Ok(store);
        }

        // Fetch unlocked; a concurrent caller may win the insert below.
        let context = self.repository.get_explore(name).await?;
        let mut stores = self.stores.lock().await;
        let store = stores
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::info!("Started dashboard store for {}", name);
                DashboardStore::spawn(Arc::new(context))
            })
            .clone();
        Ok(store)
    }
}
