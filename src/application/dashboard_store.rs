// Dashboard store - one task owns the state, everyone else dispatches
use crate::application::explore_repository::ExploreContext;
use crate::application::url_state::{UrlStateError, explore_state_from_url};
use crate::application::url_writer::baseline_state;
use crate::domain::dashboard::{ActivePage, DashboardState, ExploreStatePatch};
use crate::domain::expression::Expression;
use crate::domain::schema::ExploreWebView;
use crate::infrastructure::search_params::SearchParams;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

const ACTION_BUFFER: usize = 32;

#[derive(Debug, Clone)]
pub enum DashboardAction {
    RestoreFromUrl(SearchParams),
    ApplyPatch(ExploreStatePatch),
    Reset,
}

#[derive(Debug, Error)]
#[error("dashboard store for {0} has shut down")]
pub struct StoreClosed(pub String);

struct Envelope {
    action: DashboardAction,
    reply: oneshot::Sender<Vec<UrlStateError>>,
}

#[derive(Clone)]
pub struct DashboardStore {
    name: String,
    tx: mpsc::Sender<Envelope>,
    state: watch::Receiver<Arc<DashboardState>>,
}

impl DashboardStore {
    /// Starts the owning task with the state an empty URL restores to.
    pub fn spawn(context: Arc<ExploreContext>) -> Self {
        let initial = baseline_state(&context.metrics_view, &context.explore, &context.preset);
        let (state_tx, state_rx) = watch::channel(Arc::new(initial));
        let (tx, mut rx) = mpsc::channel::<Envelope>(ACTION_BUFFER);
        let name = context.name.clone();

        tokio::spawn(async move {
            while let Some(Envelope { action, reply }) = rx.recv().await {
                let current = state_tx.borrow().clone();
                let (next, errors) = reduce(&current, action, &context);
                state_tx.send_replace(Arc::new(next));
                let _ = reply.send(errors);
            }
            tracing::debug!("Dashboard store for {} stopped", context.name);
        });

        Self {
            name,
            tx,
            state: state_rx,
        }
    }

    /// Applies `action` and returns the recoverable errors it produced.
    pub async fn dispatch(&self, action: DashboardAction) -> Result<Vec<UrlStateError>, StoreClosed> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { action, reply })
            .await
            .map_err(|_| StoreClosed(self.name.clone()))?;
        response.await.map_err(|_| StoreClosed(self.name.clone()))
    }

    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.state.borrow().clone()
    }
}

fn reduce(
    state: &DashboardState,
    action: DashboardAction,
    context: &ExploreContext,
) -> (DashboardState, Vec<UrlStateError>) {
    match action {
        DashboardAction::RestoreFromUrl(params) => {
            let result = explore_state_from_url(
                &params,
                &context.metrics_view,
                &context.explore,
                &context.preset,
            );
            if !result.errors.is_empty() {
                tracing::warn!(
                    "Restored {} with {} recoverable errors",
                    context.name,
                    result.errors.len()
                );
            }
            // Start from the baseline so fields the URL leaves unset do not
            // leak in from the previous state.
            let base = baseline_state(&context.metrics_view, &context.explore, &context.preset);
            (base.with_patch(result.entity), result.errors)
        }
        DashboardAction::ApplyPatch(mut patch) => {
            patch.where_filter = patch.where_filter.map(Expression::into_logical_root);
            let page = patch.active_page;
            let mut next = state.with_patch(patch);
            if let Some(page) = page {
                next.pivot.active = page == ActivePage::Pivot
                    || context.preset.view == Some(ExploreWebView::Pivot);
            }
            (next, Vec::new())
        }
        DashboardAction::Reset => (
            baseline_state(&context.metrics_view, &context.explore, &context.preset),
            Vec::new(),
        ),
    }
}
