//! Shop settings: cached read, validated update and public view with fallbacks.

mod theme;

pub use theme::*;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::checkout::{availability, Availability};
use crate::db::Gateway;
use crate::errors::AppError;
use crate::models::{Settings, SettingsInput, SettingsView};
use crate::notify::{Notification, Notifier};

/// Primary colour used until the shop is configured.
pub const DEFAULT_PRIMARY_COLOR: &str = "#32CD32";

pub fn validate_settings(input: &SettingsInput) -> Result<(), AppError> {
    let required = [
        ("shopName", &input.shop_name, "Shop name is required"),
        ("logoUrl", &input.logo_url, "Logo URL is required"),
        ("whatsappNumber", &input.whatsapp_number, "WhatsApp number is required"),
        (
            "presentationVideoUrl",
            &input.presentation_video_url,
            "Presentation video URL is required",
        ),
        ("primaryColor", &input.primary_color, "Primary colour is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            return Err(AppError::validation(field, message));
        }
    }
    parse_hex(&input.primary_color)
        .map_err(|e| AppError::validation("primaryColor", e.to_string()))?;
    Ok(())
}

pub struct SettingsService {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
    fallback_shop_name: String,
    generation: AtomicU64,
    cache: Cache<u64, Option<Settings>>,
}

impl SettingsService {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
        fallback_shop_name: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            notifier,
            fallback_shop_name: fallback_shop_name.into(),
            generation: AtomicU64::new(0),
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// The settings row, or `None` when the shop is not configured.
    pub async fn get_settings(&self) -> Result<Option<Settings>, AppError> {
        let gateway = self.gateway.clone();
        self.cache
            .try_get_with(self.generation.load(Ordering::Acquire), async move {
                tracing::debug!("Fetching settings");
                gateway.get_settings().await
            })
            .await
            .map_err(|e| (*e).clone())
    }

    pub async fn view(&self) -> Result<SettingsView, AppError> {
        let settings = self.get_settings().await?;
        Ok(self.render(settings.as_ref()))
    }

    pub fn render(&self, settings: Option<&Settings>) -> SettingsView {
        let checkout_available = matches!(availability(settings), Availability::Ready(_));
        let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.trim().is_empty());

        match settings {
            None => SettingsView {
                configured: false,
                shop_name: self.fallback_shop_name.clone(),
                logo_url: None,
                whatsapp_number: None,
                presentation_video_url: None,
                primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
                theme_hsl: theme_of(DEFAULT_PRIMARY_COLOR),
                checkout_available,
            },
            Some(s) => {
                let primary_color = non_empty(&s.primary_color)
                    .unwrap_or_else(|| DEFAULT_PRIMARY_COLOR.to_string());
                SettingsView {
                    configured: true,
                    shop_name: non_empty(&s.shop_name)
                        .unwrap_or_else(|| self.fallback_shop_name.clone()),
                    logo_url: non_empty(&s.logo_url),
                    whatsapp_number: non_empty(&s.whatsapp_number),
                    presentation_video_url: non_empty(&s.presentation_video_url),
                    theme_hsl: theme_of(&primary_color),
                    primary_color,
                    checkout_available,
                }
            }
        }
    }

    /// Replace the settings row. Fails with `NotFound` when the shop was never configured.
    pub async fn update_settings(&self, input: SettingsInput) -> Result<Settings, AppError> {
        validate_settings(&input)?;
        let input = SettingsInput {
            shop_name: input.shop_name.trim().to_string(),
            logo_url: input.logo_url.trim().to_string(),
            whatsapp_number: input.whatsapp_number.trim().to_string(),
            presentation_video_url: input.presentation_video_url.trim().to_string(),
            primary_color: input.primary_color.trim().to_string(),
        };

        let result = match self.gateway.get_settings().await {
            Ok(Some(current)) => self.gateway.update_settings(&current.id, &input).await,
            Ok(None) => Err(AppError::NotFound("Settings are not configured".to_string())),
            Err(e) => Err(e),
        };

        match result {
            Ok(settings) => {
                self.invalidate();
                self.notifier.notify(Notification::success("Settings updated"));
                Ok(settings)
            }
            Err(e) => {
                tracing::error!("Could not update the settings: {}", e);
                self.notifier.notify(Notification::error(format!(
                    "Could not update the settings: {}",
                    e.message()
                )));
                Err(e)
            }
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
    }
}

fn theme_of(color: &str) -> String {
    hex_to_hsl(color).unwrap_or_else(|e| {
        tracing::warn!("Stored primary colour is unusable, using default: {}", e);
        hex_to_hsl(DEFAULT_PRIMARY_COLOR).unwrap_or_default()
    })
}
