//! The qCSF Bayesian adaptive engine: grids, likelihood, CSF model, and
//! the engine itself.

pub mod csf_model;
pub mod engine;
pub mod grid;
pub mod likelihood;

pub use csf_model::CsfModel;
pub use engine::{EngineConfig, QcsfEngine};
