//! Error types for the qCSF engine and stimulus synthesis pipeline.
//!
//! Three kinds of failure are distinguished, matching the three classes the
//! embedder must react to differently: a bad configuration (fatal to the
//! session), a broken calling convention (fatal to the trial), and a
//! calibration that is technically valid but degrades result quality
//! (non-fatal, must be recorded alongside results).
//!
//! Numerical degeneracy (posterior collapse, non-finite expected entropy) is
//! deliberately *not* a variant here: it is recovered locally by the engine
//! and surfaced as a warning string, not an error. See `QcsfEngine::select_stimulus`
//! and `QcsfEngine::update`.

use thiserror::Error;

/// Errors the qCSF core can return.
#[derive(Debug, Error)]
pub enum QcsfError {
    /// Construction-time error: empty grids, non-power-of-two FFT size,
    /// incompatible calibration. Fatal for the session.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Calling convention violated: out-of-range stimulus index, or
    /// `update` called without a preceding `select_stimulus`. Fatal for
    /// the trial; the embedder decides whether to abort or reset.
    #[error("precondition violated: {message}")]
    Precondition { message: String },

    /// Calibration is structurally valid but outside plausible human
    /// viewing conditions (distance too close/far, implausible
    /// pixels-per-degree). Not fatal, but must be recorded.
    #[error("calibration out of bounds: {message}")]
    CalibrationOutOfBounds { message: String },
}

pub type Result<T> = std::result::Result<T, QcsfError>;
