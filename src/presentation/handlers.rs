// HTTP request handlers
use crate::application::dashboard_store::DashboardAction;
use crate::application::explore_repository::ExploreNotFound;
use crate::application::url_state::{ExploreStateResult, UrlStateError, explore_state_from_url};
use crate::application::url_writer::{baseline_state, to_url_params};
use crate::domain::dashboard::{DashboardState, ExploreStatePatch};
use crate::infrastructure::search_params::SearchParams;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Upstream(anyhow::Error),
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast_ref::<ExploreNotFound>() {
            Some(not_found) => ApiError::NotFound(not_found.to_string()),
            None => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Upstream(e) => {
                tracing::error!("Error loading explore: {:#}", e);
                (StatusCode::BAD_GATEWAY, format!("{:#}", e))
            }
            ApiError::Internal(message) => {
                tracing::error!("{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
pub struct RestoreResponse {
    pub state: DashboardState,
    pub errors: Vec<UrlStateError>,
}

fn search_params(query: Option<String>) -> SearchParams {
    query.as_deref().map(SearchParams::parse).unwrap_or_default()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_explores(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.repository.list_explores().await?))
}

/// Partial dashboard entity plus recoverable errors for the given URL params
pub async fn explore_state(
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExploreStateResult>, ApiError> {
    let context = state.repository.get_explore(&name).await?;
    let params = search_params(query);
    Ok(Json(explore_state_from_url(
        &params,
        &context.metrics_view,
        &context.explore,
        &context.preset,
    )))
}

/// Canonical query string for the state the given URL params restore to
pub async fn canonical_url(
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> Result<String, ApiError> {
    let context = state.repository.get_explore(&name).await?;
    let params = search_params(query);
    let result = explore_state_from_url(
        &params,
        &context.metrics_view,
        &context.explore,
        &context.preset,
    );
    let restored = baseline_state(&context.metrics_view, &context.explore, &context.preset)
        .with_patch(result.entity);

    Ok(to_url_params(&restored, &context.metrics_view, &context.explore, &context.preset)
        .to_query_string())
}

pub async fn get_dashboard(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardState>, ApiError> {
    let store = state.store_for(&name).await?;
    Ok(Json(store.snapshot().as_ref().clone()))
}

/// Restores the stored dashboard from the given URL params
pub async fn restore_dashboard(
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let store = state.store_for(&name).await?;
    let errors = store
        .dispatch(DashboardAction::RestoreFromUrl(search_params(query)))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RestoreResponse {
        state: store.snapshot().as_ref().clone(),
        errors,
    }))
}

/// Applies a partial entity on top of the stored dashboard
pub async fn patch_dashboard(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ExploreStatePatch>,
) -> Result<Json<DashboardState>, ApiError> {
    dispatch_and_snapshot(&state, &name, DashboardAction::ApplyPatch(patch)).await
}

/// Puts the stored dashboard back on its preset
pub async fn reset_dashboard(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardState>, ApiError> {
    dispatch_and_snapshot(&state, &name, DashboardAction::Reset).await
}

async fn dispatch_and_snapshot(
    state: &AppState,
    name: &str,
    action: DashboardAction,
) -> Result<Json<DashboardState>, ApiError> {
    let store = state.store_for(name).await?;
    store
        .dispatch(action)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(store.snapshot().as_ref().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::catalog_repository::CatalogRepository;
    use crate::infrastructure::config::parse_catalog_config;
    use crate::domain::dashboard::SortDirection;

    fn app_state() -> Arc<AppState> {
        let catalog = parse_catalog_config(
            r#"
            [[explores]]
            name = "bids_explore"
            [explores.metrics_view]
            measures = [{ name = "revenue" }, { name = "impressions" }]
            dimensions = [{ name = "publisher" }]
            [explores.explore]
            metrics_view = "bids"
            measures = ["revenue", "impressions"]
            dimensions = ["publisher"]
            "#,
        )
        .unwrap();
        Arc::new(AppState::new(Arc::new(CatalogRepository::new(catalog))))
    }

    #[tokio::test]
    async fn test_explore_state_reports_filter_errors() {
        let Json(result) = explore_state(
            Path("bids_explore".to_string()),
            RawQuery(Some("f=publisher%20IN&o.sd=ASC".to_string())),
            State(app_state()),
        )
        .await
        .unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.entity.sort_direction, Some(SortDirection::Ascending));
    }

    #[tokio::test]
    async fn test_unknown_explore_is_404() {
        let response = explore_state(
            Path("missing".to_string()),
            RawQuery(None),
            State(app_state()),
        )
        .await
        .unwrap_err()
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_canonical_url_drops_defaults() {
        let url = canonical_url(
            Path("bids_explore".to_string()),
            RawQuery(Some("tz=UTC&o.m=*&o.sd=ASC&p.c=bogus".to_string())),
            State(app_state()),
        )
        .await
        .unwrap();
        assert_eq!(url, "o.sd=ASC");
    }

    #[tokio::test]
    async fn test_restore_dashboard_updates_store() {
        let state = app_state();
        let Json(restored) = restore_dashboard(
            Path("bids_explore".to_string()),
            RawQuery(Some("o.sb=impressions".to_string())),
            State(state.clone()),
        )
        .await
        .unwrap();
        assert_eq!(restored.state.leaderboard_measure_name, "impressions");

        let Json(current) = get_dashboard(Path("bids_explore".to_string()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(current, restored.state);

        let Json(patched) = patch_dashboard(
            Path("bids_explore".to_string()),
            State(state.clone()),
            Json(ExploreStatePatch {
                selected_timezone: Some("Asia/Kolkata".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(patched.selected_timezone, "Asia/Kolkata");
        assert_eq!(patched.leaderboard_measure_name, "impressions");

        let Json(reset) = reset_dashboard(Path("bids_explore".to_string()), State(state))
            .await
            .unwrap();
        assert_eq!(reset.selected_timezone, "UTC");
        assert_eq!(reset.leaderboard_measure_name, "revenue");
    }
}
