//! Whale signal classification.
//!
//! Two independent axes are derived from an alert:
//! - `badge`: from the upstream label (badge text and category)
//! - `severity`: from the local volume-ratio threshold (bar and badge colour intensity)
//!
//! They can disagree, e.g. an upstream "Whale" label at a ratio of 1.8. Such alerts are
//! reported through [`SignalClass::is_inconsistent`] and rendered as-is.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::types::WhaleAlert;

/// Volume ratio above which an alert gets elevated styling.
pub const ELEVATED_RATIO: f64 = 2.0;

/// Bar fill percentage per 1x of volume ratio.
pub const BAR_FILL_PER_RATIO: f64 = 30.0;

/// Upstream label fragment that marks a whale badge.
const WHALE_LABEL: &str = "Whale";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
pub enum SignalTier {
    #[display("normal")]
    Normal,
    #[display("elevated")]
    Elevated,
    #[display("whale")]
    Whale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Badge {
    Whale,
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Severity {
    Normal,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SignalClass {
    pub tier: SignalTier,
    pub badge: Badge,
    pub severity: Severity,
    /// Progress bar fill in `[0, 100]`
    pub bar_fill_percent: f64,
}

impl SignalClass {
    /// Badge text and bar colour point in different directions.
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            (self.badge, self.severity),
            (Badge::Whale, Severity::Normal) | (Badge::Standard, Severity::Elevated)
        )
    }
}

/// Usable volume ratio of an alert, `None` when undefined upstream.
pub fn usable_ratio(alert: &WhaleAlert) -> Option<f64> {
    if alert.avg_volume <= 0.0 {
        return None;
    }
    alert
        .volume_ratio
        .filter(|ratio| ratio.is_finite() && *ratio >= 0.0)
}

pub fn bar_fill_percent(volume_ratio: f64) -> f64 {
    (volume_ratio * BAR_FILL_PER_RATIO).min(100.0)
}

pub fn classify(alert: &WhaleAlert) -> SignalClass {
    let badge = if alert.signal.contains(WHALE_LABEL) {
        Badge::Whale
    } else {
        Badge::Standard
    };

    let Some(ratio) = usable_ratio(alert) else {
        return SignalClass {
            tier: SignalTier::Normal,
            badge,
            severity: Severity::Normal,
            bar_fill_percent: 0.0,
        };
    };

    let severity = if ratio > ELEVATED_RATIO {
        Severity::Elevated
    } else {
        Severity::Normal
    };

    let tier = match (badge, severity) {
        (Badge::Whale, _) => SignalTier::Whale,
        (Badge::Standard, Severity::Elevated) => SignalTier::Elevated,
        (Badge::Standard, Severity::Normal) => SignalTier::Normal,
    };

    SignalClass {
        tier,
        badge,
        severity,
        bar_fill_percent: bar_fill_percent(ratio),
    }
}
