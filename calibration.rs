//! Display/viewing calibration, shared read-only across an engine instance
//! and its stimulus mode.

use serde::{Deserialize, Serialize};

use crate::error::QcsfError;

/// One degree of visual angle, in radians, used to derive pixels-per-degree.
const ONE_DEGREE_TAN: f64 = 0.017_455;

/// Immutable per-session display/viewing calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Physical display resolution, pixels per millimeter.
    pub px_per_mm: f64,
    /// Observer viewing distance, millimeters.
    pub dist_mm: f64,
    /// Gamma-corrected mid-grey background level, 0-255.
    pub mid_point: u8,
    /// Whether the presented frame should be mirrored (e.g. for a
    /// second paired device held up to a mirror).
    pub mirror: bool,
}

impl Calibration {
    /// Validates and constructs a calibration record.
    ///
    /// `px_per_mm` must be positive and `dist_mm` must fall in
    /// `[200, 30000]` — outside this range the derived pixels-per-degree
    /// value no longer corresponds to a plausible human viewing setup.
    pub fn new(px_per_mm: f64, dist_mm: f64, mid_point: u8, mirror: bool) -> Result<Self, QcsfError> {
        if !(px_per_mm > 0.0) {
            return Err(QcsfError::Configuration {
                message: format!("px_per_mm must be positive, got {px_per_mm}"),
            });
        }
        if !(200.0..=30000.0).contains(&dist_mm) {
            return Err(QcsfError::CalibrationOutOfBounds {
                message: format!("dist_mm {dist_mm} outside plausible range [200, 30000]"),
            });
        }
        Ok(Self { px_per_mm, dist_mm, mid_point, mirror })
    }

    /// Derived pixels-per-degree of visual angle at this viewing distance.
    pub fn pix_per_deg(&self) -> f64 {
        self.dist_mm * ONE_DEGREE_TAN * self.px_per_mm
    }
}
