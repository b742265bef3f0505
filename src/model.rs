//! The seam between the sweep and the simulation model.
//!
//! The sweep only needs to construct a model from a [`ParameterSet`], run it
//! to completion and read back its takeoff metrics.

use thiserror::Error;

use crate::params::ParameterSet;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model input missing: {0}")]
    MissingInput(String),

    #[error("invalid model input {name}={value}: {message}")]
    InvalidInput {
        name: String,
        value: f64,
        message: String,
    },

    #[error("simulation reached t={t_end} without full automation")]
    HorizonExceeded { t_end: f64 },

    #[error("simulation diverged at t={t}: {message}")]
    Diverged { t: f64, message: String },

    #[error("{0}")]
    Other(String),
}

/// A metric as reported by the model. `value` feeds the CSV and the console
/// tables; `year` is carried into [`Metric`](crate::scenario::Metric) and
/// only shows up in the JSON bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub value: f64,
    /// Simulation year the reading refers to, when the model tracks one
    pub year: Option<f64>,
}

impl MetricReading {
    pub fn new(value: f64) -> Self {
        Self { value, year: None }
    }

    pub fn at(value: f64, year: f64) -> Self {
        Self {
            value,
            year: Some(year),
        }
    }
}

pub trait TakeoffModel {
    /// Run until the model's own termination criteria are met.
    fn run_simulation(&mut self) -> Result<(), ModelError>;

    /// Metrics of a completed run, in a stable order.
    fn takeoff_metrics(&self) -> Vec<(String, MetricReading)>;
}

/// Constructs a model instance for one bounding run.
pub trait ModelFactory {
    type Model: TakeoffModel;

    fn build(&self, params: &ParameterSet) -> Result<Self::Model, ModelError>;
}

impl<M, F> ModelFactory for F
where
    M: TakeoffModel,
    F: Fn(&ParameterSet) -> Result<M, ModelError>,
{
    type Model = M;

    fn build(&self, params: &ParameterSet) -> Result<M, ModelError> {
        self(params)
    }
}
