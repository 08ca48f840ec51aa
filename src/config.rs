//! Export configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Tunables shared by both export targets.
///
/// Every field has a default, so a configuration file only needs the values
/// it overrides:
///
/// ```
/// use folio::ExportConfig;
///
/// let config = ExportConfig::from_json(r#"{ "brand_color": "C00000" }"#).unwrap();
/// assert_eq!(config.brand_color, "C00000");
/// assert_eq!(config.page_height_mm, 297.0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output page width in millimetres (A4 portrait).
    pub page_width_mm: f64,
    /// Output page height in millimetres (A4 portrait).
    pub page_height_mm: f64,
    /// Width of the virtual page the paginated document is laid out at.
    pub virtual_page_width_px: u32,
    /// Device pixel ratio used when capturing the composed surface.
    pub capture_scale: f32,
    /// Emphasis colour for headings, 6-digit hex without `#`.
    pub brand_color: String,
    /// Upper bound on waiting for a single embedded image.
    pub image_timeout_ms: u64,
    /// Fixed delay between forced layout reads.
    pub settle_delay_ms: u64,
    /// Forced layout reads attempted before capturing anyway.
    pub max_reflow_attempts: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            virtual_page_width_px: 794,
            capture_scale: 2.0,
            brand_color: "1F3864".to_string(),
            image_timeout_ms: 5000,
            settle_delay_ms: 150,
            max_reflow_attempts: 5,
        }
    }
}

impl ExportConfig {
    /// Parse a JSON configuration, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ExportConfig = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(Error::InvalidInput(
                "page dimensions must be positive".to_string(),
            ));
        }
        if self.virtual_page_width_px == 0 || self.capture_scale <= 0.0 {
            return Err(Error::InvalidInput(
                "virtual page width and capture scale must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
