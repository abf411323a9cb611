//! A Bayesian adaptive quick-CSF (contrast sensitivity function) testing
//! engine, after Lesmes, Lu, Baek & Albright (2010), plus the stimulus
//! synthesis pipeline that renders the Gabor, Sloan-letter, and
//! tumbling-E optotypes it adaptively selects.
//!
//! The engine ([`qcsf_engine`]) maintains a posterior over a four-parameter
//! CSF model, picks the next stimulus by one-step-ahead expected-entropy
//! minimization, and updates on each response. [`result`] turns a
//! finished (or in-progress) session into a derived summary: AULCSF,
//! acuity rank, predicted Snellen equivalent, and landmark pass/fail
//! checks. [`fft`], [`bandpass`], [`optotypes`], and [`rendering`]
//! implement the pixel pipeline that turns a selected stimulus into a
//! calibrated grayscale frame; [`stimulus_mode`] binds a stimulus family
//! to rendering and answer checking.
#![forbid(unsafe_code)]

pub mod bandpass;
pub mod calibration;
pub mod error;
pub mod fft;
pub mod numeric;
pub mod optotypes;
pub mod qcsf_engine;
pub mod rendering;
pub mod result;
pub mod stimulus_mode;
pub mod types;

pub use calibration::Calibration;
pub use error::{QcsfError, Result};
pub use qcsf_engine::{CsfModel, EngineConfig, QcsfEngine};
pub use result::{derive as derive_result, Landmark, LandmarkResult, ResultConfig, SessionResult};
pub use stimulus_mode::StimulusMode;
pub use types::{CsfPoint, ParamPoint, Stimulus, StimulusChoice, TrialRecord};
