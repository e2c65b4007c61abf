//! Admin dashboard and new-transaction notifications

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt};
use utoipa::IntoParams;

use crate::{
    models::ReportPeriod,
    services::{dashboard::Dashboard, notifications::watch_transactions},
    AppState,
};

use super::AdminSession;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Report shown in the chart (`daily`, `monthly` or `yearly`)
    #[serde(default)]
    pub period: ReportPeriod,
    /// First transaction id the page displayed last time
    pub last_seen: Option<i64>,
}

/// Counts, recent transactions, borrowing reports and the new-transaction banner
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 303, description = "Not logged in as admin")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Query(query): Query<DashboardQuery>,
) -> Json<Dashboard> {
    let dashboard = state
        .services
        .dashboard
        .load(&session.token, query.period, query.last_seen)
        .await;
    Json(dashboard)
}

/// Server-sent `transaction` events, one per new head of the transaction list
#[utoipa::path(
    get,
    path = "/admin/notifications",
    tag = "admin",
    responses(
        (status = 200, description = "Event stream of NewTransaction payloads", body = String, content_type = "text/event-stream")
    )
)]
pub async fn notifications(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let interval = state.services.dashboard.polling().interval();
    tracing::debug!("Admin {:?} subscribed to notifications", session.user_id);

    let stream = watch_transactions(state.services.gateway.clone(), session.token, interval)
        .map(|banner| {
            let event = Event::default().event("transaction");
            Ok(match event.json_data(&banner) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Failed to encode notification: {}", e);
                    Event::default().event("transaction").data(banner.message)
                }
            })
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
