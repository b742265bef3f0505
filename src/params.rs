//! Bounding parameter sets
//!
//! Turns a parameter table into the three concrete inputs (low, med, high)
//! handed to the model for one scenario group.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::table::{Column, ParameterTable};

/// Key under which the synthetic end-time flag is listed.
pub const DYNAMIC_END_TIME: &str = "dynamic_end_time";

/// Which of the three bounding runs of a group.
pub type Stage = Column;

/// How the three parameter sets of a group are derived.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Every compared parameter moves to its bound together
    #[default]
    Compare,
    /// Only `target` moves; everything else stays at best guess
    Explore { target: String },
}

/// Resolved model inputs for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    values: Vec<(String, f64)>,
    dynamic_end_time: bool,
}

impl ParameterSet {
    fn from_values(values: Vec<(String, f64)>) -> Self {
        Self {
            values,
            dynamic_end_time: true,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// When set, the model picks its own horizon instead of a fixed end time.
    pub fn dynamic_end_time(&self) -> bool {
        self.dynamic_end_time
    }

    /// Same inputs with a fixed (`false`) or model-chosen (`true`) horizon.
    pub fn with_dynamic_end_time(mut self, dynamic: bool) -> Self {
        self.dynamic_end_time = dynamic;
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn set(&mut self, name: &str, value: f64) {
        if let Some(slot) = self.values.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value;
        }
    }
}

impl Serialize for ParameterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(DYNAMIC_END_TIME, &self.dynamic_end_time)?;
        map.end()
    }
}

pub struct ParameterSetBuilder;

impl ParameterSetBuilder {
    /// Derive the (low, med, high) inputs for one group.
    pub fn build(
        table: &ParameterTable,
        mode: &SweepMode,
    ) -> Result<(ParameterSet, ParameterSet, ParameterSet)> {
        if table.is_empty() {
            return Err(Error::missing("<empty parameter table>"));
        }

        let med = ParameterSet::from_values(
            table
                .rows()
                .iter()
                .map(|row| (row.name.clone(), row.best_guess))
                .collect(),
        );

        match mode {
            SweepMode::Compare => {
                let bounded = |column: Column| {
                    let values = table
                        .rows()
                        .iter()
                        .map(|row| {
                            let value = match row.bound(column) {
                                Some(v) if row.compare => v,
                                _ => row.best_guess,
                            };
                            (row.name.clone(), value)
                        })
                        .collect();
                    ParameterSet::from_values(values)
                };
                let low = bounded(Column::Conservative);
                let high = bounded(Column::Aggressive);
                Ok((low, med, high))
            }
            SweepMode::Explore { target } => {
                let row = table.row(explore_target(target)?)?;

                let mut low = med.clone();
                low.set(&row.name, row.conservative.unwrap_or(f64::NAN));
                let mut high = med.clone();
                high.set(&row.name, row.aggressive.unwrap_or(f64::NAN));
                Ok((low, med, high))
            }
        }
    }
}

fn explore_target(target: &str) -> Result<&str> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::Configuration(
            "exploration mode requires a target parameter".to_string(),
        ));
    }
    Ok(target)
}
