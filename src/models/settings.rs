//! Shop-wide settings row.

use serde::{Deserialize, Serialize};

/// The single settings row of a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub shop_name: String,
    pub logo_url: String,
    pub whatsapp_number: String,
    pub presentation_video_url: String,
    pub primary_color: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for updating the settings row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub shop_name: String,
    #[serde(default)]
    pub logo_url: String,
    pub whatsapp_number: String,
    #[serde(default)]
    pub presentation_video_url: String,
    pub primary_color: String,
}

/// Settings as rendered by public views, with fallbacks applied.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    /// False when no settings row exists yet
    pub configured: bool,
    pub shop_name: String,
    pub logo_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub presentation_video_url: Option<String>,
    pub primary_color: String,
    /// Space-separated `H S% L%` triple for the `--primary` CSS variable
    pub theme_hsl: String,
    pub checkout_available: bool,
}
