//! FTM scenario sweeps
//!
//! Runs the takeoff model three times (Conservative, Best guess, Aggressive)
//! over a parameter table, once as authored and once per timeline variant,
//! and collects the resulting metrics into scenario groups.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod params;
pub mod reference;
pub mod runner;
pub mod scenario;
pub mod table;
pub mod timeline;


pub use error::{Error, Result};
pub use model::{MetricReading, ModelError, ModelFactory, TakeoffModel};
pub use params::{ParameterSet, ParameterSetBuilder, Stage, SweepMode, DYNAMIC_END_TIME};
pub use runner::{ScenarioGroupRunner, ScenarioRunner};
pub use scenario::{
    Metric, MetricCatalogue, MetricDescription, Scenario, ScenarioGroup, ScenarioSweep,
};
pub use table::{Column, ParameterRow, ParameterTable};
pub use timeline::{apply_timeline_override, TimelineKind, TimelineOverride, TimelineOverrideSet};
