//! Reference takeoff model
//!
//! A small deterministic stand-in for the full takeoff model so the sweep can
//! be run end to end. Log10 training compute grows at a base rate that is
//! amplified as tasks get automated; the automated fraction rises linearly in
//! log-compute between `requirements / flop_gap` (0%) and `requirements`
//! (100%). Integration is explicit Euler on a fixed step.

use serde::{Deserialize, Serialize};

use crate::model::{MetricReading, ModelError, ModelFactory, TakeoffModel};
use crate::params::ParameterSet;
use crate::timeline::{FLOP_GAP_TRAINING, TRAINING_REQUIREMENTS};

pub const INITIAL_TRAINING_RUN: &str = "initial_biggest_training_run";
pub const TRAINING_COMPUTE_GROWTH: &str = "training_compute_growth";
pub const AUTOMATION_FEEDBACK: &str = "automation_feedback";

pub const METRIC_AUTOMATION_20PCT: &str = "automation_20pct_year";
pub const METRIC_FULL_AUTOMATION: &str = "full_automation_year";
pub const METRIC_RAMPUP: &str = "rampup_years";
pub const METRIC_PEAK_GROWTH: &str = "peak_compute_growth";

/// Integration horizon of the reference model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Horizon {
    #[serde(default = "default_t_start")]
    pub t_start: f64,
    /// End year used when the run does not pick its own horizon
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    #[serde(default = "default_t_step")]
    pub t_step: f64,
    /// Hard stop for runs with a dynamic end time
    #[serde(default = "default_max_t_end")]
    pub max_t_end: f64,
}

fn default_t_start() -> f64 { 2022.0 }
fn default_t_end() -> f64 { 2100.0 }
fn default_t_step() -> f64 { 0.1 }
fn default_max_t_end() -> f64 { 2300.0 }

impl Default for Horizon {
    fn default() -> Self {
        Self {
            t_start: 2022.0,
            t_end: 2100.0,
            t_step: 0.1,
            max_t_end: 2300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Milestones {
    automation_20pct: Option<f64>,
    full_automation: Option<f64>,
    peak_growth: f64,
    peak_growth_year: f64,
}

#[derive(Debug, Clone)]
pub struct ReferenceModel {
    horizon: Horizon,
    dynamic_end_time: bool,
    log_requirements: f64,
    log_gap: f64,
    log_initial_run: f64,
    growth: f64,
    feedback: f64,
    milestones: Option<Milestones>,
}

fn input(params: &ParameterSet, name: &str) -> Result<f64, ModelError> {
    let value = params
        .get(name)
        .ok_or_else(|| ModelError::MissingInput(name.to_string()))?;
    if !value.is_finite() {
        return Err(invalid(name, value, "must be finite"));
    }
    Ok(value)
}

fn invalid(name: &str, value: f64, message: &str) -> ModelError {
    ModelError::InvalidInput {
        name: name.to_string(),
        value,
        message: message.to_string(),
    }
}

impl Horizon {
    /// The integration loop only terminates on a finite, forward-stepping horizon.
    pub fn check(&self) -> Result<(), ModelError> {
        if !(self.t_step > 0.0) || !self.t_step.is_finite() {
            return Err(invalid("t_step", self.t_step, "must be positive and finite"));
        }
        for (name, value) in [
            ("t_start", self.t_start),
            ("t_end", self.t_end),
            ("max_t_end", self.max_t_end),
        ] {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }
        Ok(())
    }
}

impl ReferenceModel {
    pub fn new(params: &ParameterSet, horizon: Horizon) -> Result<Self, ModelError> {
        horizon.check()?;
        let requirements = input(params, TRAINING_REQUIREMENTS)?;
        if requirements <= 0.0 {
            return Err(invalid(TRAINING_REQUIREMENTS, requirements, "must be positive"));
        }
        let gap = input(params, FLOP_GAP_TRAINING)?;
        if gap <= 1.0 {
            return Err(invalid(FLOP_GAP_TRAINING, gap, "must be greater than 1"));
        }
        let initial_run = input(params, INITIAL_TRAINING_RUN)?;
        if initial_run <= 0.0 {
            return Err(invalid(INITIAL_TRAINING_RUN, initial_run, "must be positive"));
        }
        let growth = input(params, TRAINING_COMPUTE_GROWTH)?;
        let feedback = input(params, AUTOMATION_FEEDBACK)?;
        if feedback < 0.0 {
            return Err(invalid(AUTOMATION_FEEDBACK, feedback, "must be non-negative"));
        }

        Ok(Self {
            horizon,
            dynamic_end_time: params.dynamic_end_time(),
            log_requirements: requirements.log10(),
            log_gap: gap.log10(),
            log_initial_run: initial_run.log10(),
            growth,
            feedback,
            milestones: None,
        })
    }

    fn automated_fraction(&self, log_compute: f64) -> f64 {
        let start = self.log_requirements - self.log_gap;
        ((log_compute - start) / self.log_gap).clamp(0.0, 1.0)
    }
}

impl TakeoffModel for ReferenceModel {
    fn run_simulation(&mut self) -> Result<(), ModelError> {
        let h = self.horizon;
        let mut m = Milestones {
            peak_growth: f64::NEG_INFINITY,
            peak_growth_year: h.t_start,
            ..Default::default()
        };
        let mut log_compute = self.log_initial_run;
        let mut step: u64 = 0;

        loop {
            let t = h.t_start + step as f64 * h.t_step;
            let fraction = self.automated_fraction(log_compute);

            if fraction >= 0.2 && m.automation_20pct.is_none() {
                m.automation_20pct = Some(t);
            }
            if fraction >= 1.0 && m.full_automation.is_none() {
                m.full_automation = Some(t);
            }

            let growth = self.growth * (1.0 + self.feedback * fraction);
            if !growth.is_finite() {
                return Err(ModelError::Diverged {
                    t,
                    message: format!("compute growth {growth}"),
                });
            }
            if growth > m.peak_growth {
                m.peak_growth = growth;
                m.peak_growth_year = t;
            }

            if self.dynamic_end_time {
                if m.full_automation.is_some() {
                    break;
                }
                if t >= h.max_t_end {
                    return Err(ModelError::HorizonExceeded { t_end: t });
                }
            } else if t >= h.t_end {
                break;
            }

            log_compute += growth * h.t_step;
            step += 1;
        }

        self.milestones = Some(m);
        Ok(())
    }

    fn takeoff_metrics(&self) -> Vec<(String, MetricReading)> {
        let m = self.milestones.unwrap_or_default();
        let t20 = m.automation_20pct.unwrap_or(f64::NAN);
        let t100 = m.full_automation.unwrap_or(f64::NAN);

        vec![
            (METRIC_AUTOMATION_20PCT.to_string(), MetricReading::at(t20, t20)),
            (METRIC_FULL_AUTOMATION.to_string(), MetricReading::at(t100, t100)),
            (METRIC_RAMPUP.to_string(), MetricReading::at(t100 - t20, t100)),
            (
                METRIC_PEAK_GROWTH.to_string(),
                MetricReading::at(m.peak_growth, m.peak_growth_year),
            ),
        ]
    }
}

/// Builds [`ReferenceModel`]s sharing one horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceFactory {
    pub horizon: Horizon,
}

impl ReferenceFactory {
    pub fn new(horizon: Horizon) -> Self {
        Self { horizon }
    }
}

impl ModelFactory for ReferenceFactory {
    type Model = ReferenceModel;

    fn build(&self, params: &ParameterSet) -> Result<ReferenceModel, ModelError> {
        ReferenceModel::new(params, self.horizon)
    }
}
