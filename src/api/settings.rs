//! Settings API endpoints.

use axum::{extract::State, Json};

use super::{success, success_with_message, ApiResult};
use crate::models::{SettingsInput, SettingsView};
use crate::AppState;

/// GET /api/settings - Public settings view; never fails for an unconfigured shop.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsView> {
    success(state.settings.view().await?)
}

/// PUT /api/admin/settings - Update the settings row.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<SettingsInput>,
) -> ApiResult<SettingsView> {
    let updated = state.settings.update_settings(input).await?;
    success_with_message(state.settings.render(Some(&updated)), "Settings updated")
}
