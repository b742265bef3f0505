use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::{Column, ParameterTable};

pub const TRAINING_REQUIREMENTS: &str = "full_automation_requirements_training";
pub const RUNTIME_REQUIREMENTS: &str = "full_automation_requirements_runtime";
pub const FLOP_GAP_TRAINING: &str = "flop_gap_training";

/// The timeline assumptions the sweep knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    VeryShort,
    Med,
    VeryLong,
}

impl TimelineKind {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "Very short timelines" => Ok(TimelineKind::VeryShort),
            "Med timelines" => Ok(TimelineKind::Med),
            "Very long timelines" => Ok(TimelineKind::VeryLong),
            _ => Err(Error::UnknownTimeline {
                name: name.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimelineKind::VeryShort => "Very short timelines",
            TimelineKind::Med => "Med timelines",
            TimelineKind::VeryLong => "Very long timelines",
        }
    }

    /// Column of the base runtime-requirements row broadcast by this timeline.
    pub fn runtime_column(&self) -> Column {
        match self {
            TimelineKind::VeryShort => Column::Aggressive,
            TimelineKind::Med => Column::BestGuess,
            TimelineKind::VeryLong => Column::Conservative,
        }
    }
}

/// Values substituted into the parameter table for one timeline.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimelineOverride {
    pub name: String,
    pub full_automation_requirements: f64,
    pub long_flop_gap: f64,
    pub med_flop_gap: f64,
    pub short_flop_gap: f64,
}

/// Timeline overrides in the order they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimelineOverrideSet {
    timelines: Vec<TimelineOverride>,
}

impl TimelineOverrideSet {
    pub fn new(timelines: Vec<TimelineOverride>) -> Self {
        Self { timelines }
    }

    pub fn get(&self, name: &str) -> Option<&TimelineOverride> {
        self.timelines.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

impl<'a> IntoIterator for &'a TimelineOverrideSet {
    type Item = &'a TimelineOverride;
    type IntoIter = std::slice::Iter<'a, TimelineOverride>;

    fn into_iter(self) -> Self::IntoIter {
        self.timelines.iter()
    }
}

/// Build the timeline variant of `base`. `base` itself is left untouched.
///
/// The runtime requirements are not taken from the override: the base
/// table's own runtime row is read at the column matching the timeline
/// (Aggressive for very short, Best guess for med, Conservative for very
/// long) and that value is written to all three columns.
pub fn apply_timeline_override(
    base: &ParameterTable,
    timeline: &TimelineOverride,
) -> Result<ParameterTable> {
    let kind = TimelineKind::from_name(&timeline.name)?;

    let column = kind.runtime_column();
    let runtime_requirements = base
        .row(RUNTIME_REQUIREMENTS)?
        .bound(column)
        .ok_or_else(|| Error::missing_bound(RUNTIME_REQUIREMENTS, column))?;

    let mut table = base.clone();

    table
        .row_mut(TRAINING_REQUIREMENTS)?
        .set_all(timeline.full_automation_requirements);

    table
        .row_mut(RUNTIME_REQUIREMENTS)?
        .set_all(runtime_requirements);

    let gap = table.row_mut(FLOP_GAP_TRAINING)?;
    gap.conservative = Some(timeline.long_flop_gap);
    gap.best_guess = timeline.med_flop_gap;
    gap.aggressive = Some(timeline.short_flop_gap);

    Ok(table)
}
