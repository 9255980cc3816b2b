use axum::extract::State;
use axum::Json;
use pilgrim_core::DashboardSnapshot;

use crate::state::AppState;

pub async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    tracing::info!("Authenticated request received for dashboard data.");
    Json(state.metrics.snapshot())
}
