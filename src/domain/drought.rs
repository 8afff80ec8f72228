use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};

/// Highest value on the 0-4 drought severity scale
pub const MAX_DROUGHT_SEVERITY: u8 = 4;

// Basin lag-12 defaults: a moderate drought across the tracked basins.
pub const DEFAULT_CHINO_EDDI90D: f64 = -0.5;
pub const DEFAULT_MOJAVE_PDSI: f64 = -1.0;
pub const DEFAULT_CA_SPI180D: f64 = -0.8;
pub const DEFAULT_CENTRAL_EDDI1Y: f64 = -0.6;
pub const DEFAULT_CA_SPI90D: f64 = -0.7;
pub const DEFAULT_CA_SPEI1Y: f64 = -0.9;

/// Current drought indicators for the California water market.
///
/// SPI, SPEI and PDSI are standardized indices (more negative = drier),
/// severity follows the 0-4 drought monitor scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroughtMetrics {
    pub spi: f64,
    pub spei: f64,
    pub pdsi: f64,
    pub severity: u8,
    pub trend_4w: f64,
    pub trend_8w: f64,
}

impl DroughtMetrics {
    pub fn new(
        spi: f64,
        spei: f64,
        pdsi: f64,
        severity: u8,
        trend_4w: f64,
        trend_8w: f64,
    ) -> Result<Self, ForecastError> {
        let metrics = Self {
            spi,
            spei,
            pdsi,
            severity,
            trend_4w,
            trend_8w,
        };
        metrics.validate()?;
        Ok(metrics)
    }

    /// Checks severity range and that every index is finite
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.severity > MAX_DROUGHT_SEVERITY {
            return Err(ForecastError::InvalidDroughtMetrics {
                reason: format!(
                    "severity {} outside 0-{}",
                    self.severity, MAX_DROUGHT_SEVERITY
                ),
            });
        }

        let indices = [
            ("spi", self.spi),
            ("spei", self.spei),
            ("pdsi", self.pdsi),
            ("trend_4w", self.trend_4w),
            ("trend_8w", self.trend_8w),
        ];
        if let Some((name, value)) = indices.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::InvalidDroughtMetrics {
                reason: format!("{} is not finite: {}", name, value),
            });
        }

        Ok(())
    }

    pub fn is_severe(&self) -> bool {
        self.severity >= 2
    }

    pub fn is_extreme(&self) -> bool {
        self.severity >= 3
    }

    pub fn severity_label(&self) -> &'static str {
        match self.severity {
            0 => "no drought",
            1 => "mild drought",
            2 => "severe drought",
            3 => "extreme drought",
            _ => "exceptional drought",
        }
    }

    /// Percentage price impact relative to the moderate (level 3) baseline
    pub fn price_impact_pct(&self) -> f64 {
        (self.severity as f64 - 3.0) * 2.5
    }
}

/// Basin-level lag-12 drought readings consumed by the hosted model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasinData {
    pub chino_eddi90d: f64,
    pub mojave_pdsi: f64,
    pub ca_spi180d: f64,
    pub central_eddi1y: f64,
    pub ca_spi90d: f64,
    pub ca_spei1y: f64,
}

impl Default for BasinData {
    fn default() -> Self {
        Self {
            chino_eddi90d: DEFAULT_CHINO_EDDI90D,
            mojave_pdsi: DEFAULT_MOJAVE_PDSI,
            ca_spi180d: DEFAULT_CA_SPI180D,
            central_eddi1y: DEFAULT_CENTRAL_EDDI1Y,
            ca_spi90d: DEFAULT_CA_SPI90D,
            ca_spei1y: DEFAULT_CA_SPEI1Y,
        }
    }
}
