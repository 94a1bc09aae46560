//! Axum route handlers for the Layout API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::layout::descriptor::Placeable;
use crate::layout::grid::GridConfig;
use crate::layout::panel::{compose_panel, PanelLayout, PanelPlan};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ComposePanelRequest {
    /// Overrides the service's default grid for this panel only.
    #[serde(default)]
    pub grid: Option<GridConfig>,
    pub plan: PanelPlan,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeDescriptorsRequest {
    pub descriptors: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct NormalizeDescriptorsResponse {
    pub placeables: Vec<Placeable>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/layout/config
pub async fn handle_get_config(State(state): State<AppState>) -> Json<GridConfig> {
    Json(state.config.grid.clone())
}

/// POST /api/v1/layout/panel
///
/// Lays out one panel. An allocation failure rejects this panel only.
pub async fn handle_compose_panel(
    State(state): State<AppState>,
    payload: Result<Json<ComposePanelRequest>, JsonRejection>,
) -> Result<Json<PanelLayout>, AppError> {
    let Json(request) = payload?;
    let config = request.grid.unwrap_or_else(|| state.config.grid.clone());
    let plan = request.plan;

    let layout = tokio::task::spawn_blocking(move || compose_panel(&config, &plan))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed composing panel: {e}"))
        })?
        .inspect_err(|e| warn!("Panel layout rejected: {e}"))?;

    Ok(Json(layout))
}

/// POST /api/v1/layout/descriptors
///
/// Normalizes raw item/fluid descriptors into canonical placeables.
pub async fn handle_normalize_descriptors(
    payload: Result<Json<NormalizeDescriptorsRequest>, JsonRejection>,
) -> Result<Json<NormalizeDescriptorsResponse>, AppError> {
    let Json(request) = payload?;
    if request.descriptors.is_empty() {
        return Err(AppError::Validation(
            "descriptors cannot be empty".to_string(),
        ));
    }

    let placeables = request
        .descriptors
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            Placeable::from_value(value)
                .map_err(|e| AppError::Validation(format!("descriptor {i}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(NormalizeDescriptorsResponse { placeables }))
}
