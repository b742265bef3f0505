//! Result records of a sweep

use serde::Serialize;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::model::TakeoffModel;
use crate::params::ParameterSet;
use crate::table::ParameterTable;

pub const NORMAL_GROUP: &str = "normal";

/// Catalogue entry for a metric reported by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescription {
    pub name: String,
    pub meaning: String,
}

impl MetricDescription {
    pub fn new(name: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meaning: meaning.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    /// Simulation year of the reading, kept for the JSON bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<f64>,
}

/// One completed model run.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = ""))]
pub struct Scenario<M> {
    pub name: String,
    #[serde(skip)]
    pub model: M,
    pub params: ParameterSet,
    pub metrics: Vec<Metric>,
}

impl<M: TakeoffModel> Scenario<M> {
    /// Wrap a finished run; keeps the value and year of each reported metric.
    pub fn new(name: impl Into<String>, model: M, params: ParameterSet) -> Self {
        let metrics = model
            .takeoff_metrics()
            .into_iter()
            .map(|(name, reading)| Metric {
                name,
                value: reading.value,
                year: reading.year,
            })
            .collect();
        Self {
            name: name.into(),
            model,
            params,
            metrics,
        }
    }
}

impl<M> Scenario<M> {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }

    fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|m| m.name.clone()).collect()
    }
}

/// The three bounding runs over one parameter table.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ScenarioGroup<M> {
    pub name: String,
    pub scenarios: [Scenario<M>; 3],
    pub parameter_table: ParameterTable,
    pub full_automation_reqs: Option<f64>,
}

impl<M> ScenarioGroup<M> {
    pub fn new(
        name: impl Into<String>,
        scenarios: [Scenario<M>; 3],
        parameter_table: ParameterTable,
        full_automation_reqs: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            scenarios,
            parameter_table,
            full_automation_reqs,
        }
    }

    /// Short label for the requirements, e.g. `1e31`, or `--` when unset.
    pub fn reqs_label(&self) -> String {
        self.full_automation_reqs
            .map(reqs_label)
            .unwrap_or_else(|| "--".to_string())
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scenario<M>> {
        self.scenarios.iter()
    }
}

impl<M> Index<usize> for ScenarioGroup<M> {
    type Output = Scenario<M>;

    fn index(&self, index: usize) -> &Scenario<M> {
        &self.scenarios[index]
    }
}

/// Zero-decimal scientific notation with a signed two-digit exponent and
/// no `+` sign: 1e31, 3e05, 1e-05.
pub fn reqs_label(value: f64) -> String {
    let formatted = format!("{:.0e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) if exp < 0 => format!("{}e-{:02}", mantissa, -exp),
            Ok(exp) => format!("{}e{:02}", mantissa, exp),
            Err(_) => formatted,
        },
        // inf / NaN
        None => formatted,
    }
}

/// The ordered metric names every scenario of a sweep must report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricCatalogue {
    entries: Vec<MetricDescription>,
}

impl MetricCatalogue {
    /// Derive the catalogue from a scenario's metrics; meaning is the name.
    pub fn from_scenario<M>(scenario: &Scenario<M>) -> Self {
        Self {
            entries: scenario
                .metrics
                .iter()
                .map(|m| MetricDescription::new(m.name.clone(), m.name.clone()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[MetricDescription] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every scenario must report exactly the catalogue's names, in order.
    pub fn check<M>(&self, group: &ScenarioGroup<M>) -> Result<()> {
        for scenario in group.iter() {
            let same = scenario.metrics.len() == self.entries.len()
                && scenario
                    .metrics
                    .iter()
                    .zip(&self.entries)
                    .all(|(m, d)| m.name == d.name);
            if !same {
                return Err(Error::MetricCatalogueMismatch {
                    group: group.name.clone(),
                    scenario: scenario.name.clone(),
                    expected: self.names(),
                    found: scenario.metric_names(),
                });
            }
        }
        Ok(())
    }
}

/// Everything produced by one `simulate_all_scenarios` call.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ScenarioSweep<M> {
    pub groups: Vec<ScenarioGroup<M>>,
    pub metrics: MetricCatalogue,
}

impl<M> ScenarioSweep<M> {
    pub fn group(&self, name: &str) -> Option<&ScenarioGroup<M>> {
        self.groups.iter().find(|g| g.name == name)
    }
}
