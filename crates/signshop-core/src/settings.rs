//! # Quote Settings
//!
//! Shop-wide pricing settings: currency, default IVA and the area pricing
//! convention.
//!
//! The core never reads the environment itself. Callers pass a lookup
//! function, which is `std::env::var` in binaries and a map in tests.
//!
//! ## Environment Keys
//! | Key                         | Default    | Example      |
//! |-----------------------------|------------|--------------|
//! | `SIGNSHOP_CURRENCY_CODE`    | `PYG`      | `PYG`        |
//! | `SIGNSHOP_CURRENCY_SYMBOL`  | `₲`        | `Gs.`        |
//! | `SIGNSHOP_DEFAULT_IVA_BPS`  | `1000`     | `500`        |
//! | `SIGNSHOP_AREA_PRICING`     | `rescaled` | `billable`   |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{AreaPricing, TaxRate};

pub const ENV_CURRENCY_CODE: &str = "SIGNSHOP_CURRENCY_CODE";
pub const ENV_CURRENCY_SYMBOL: &str = "SIGNSHOP_CURRENCY_SYMBOL";
pub const ENV_DEFAULT_IVA_BPS: &str = "SIGNSHOP_DEFAULT_IVA_BPS";
pub const ENV_AREA_PRICING: &str = "SIGNSHOP_AREA_PRICING";

/// Pricing settings applied to new budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettings {
    pub currency_code: String,
    pub currency_symbol: String,
    /// Fractional digits of the currency. Guaraníes have none.
    pub currency_decimals: u8,
    /// IVA applied to new budgets.
    pub default_iva: TaxRate,
    /// Convention applied to new lines.
    pub area_pricing: AreaPricing,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        QuoteSettings {
            currency_code: "PYG".to_string(),
            currency_symbol: "₲".to_string(),
            currency_decimals: 0,
            default_iva: TaxRate::STANDARD,
            area_pricing: AreaPricing::default(),
        }
    }
}

impl QuoteSettings {
    /// Builds settings from a key lookup, falling back to the defaults for
    /// missing or blank keys.
    ///
    /// ## Example
    /// ```rust
    /// use signshop_core::settings::QuoteSettings;
    /// use signshop_core::types::{AreaPricing, TaxRate};
    ///
    /// let settings = QuoteSettings::from_lookup(|key| match key {
    ///     "SIGNSHOP_AREA_PRICING" => Some("billable".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(settings.area_pricing, AreaPricing::PerBillableArea);
    /// assert_eq!(settings.default_iva, TaxRate::from_fraction(0.1).unwrap());
    ///
    /// // In a binary:
    /// let _ = QuoteSettings::from_lookup(|key| std::env::var(key).ok());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = QuoteSettings::default();

        if let Some(code) = get(ENV_CURRENCY_CODE) {
            settings.currency_code = code.trim().to_string();
        }

        if let Some(symbol) = get(ENV_CURRENCY_SYMBOL) {
            settings.currency_symbol = symbol.trim().to_string();
        }

        if let Some(raw) = get(ENV_DEFAULT_IVA_BPS) {
            let bps: u32 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(ENV_DEFAULT_IVA_BPS, &raw))?;
            settings.default_iva =
                TaxRate::from_bps(bps).map_err(|_| invalid(ENV_DEFAULT_IVA_BPS, &raw))?;
        }

        if let Some(raw) = get(ENV_AREA_PRICING) {
            settings.area_pricing =
                AreaPricing::from_setting(&raw).ok_or_else(|| invalid(ENV_AREA_PRICING, &raw))?;
        }

        Ok(settings)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
