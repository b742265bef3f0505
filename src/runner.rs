//! Scenario sweep orchestration
//!
//! [`ScenarioGroupRunner`] runs the three bounding simulations for one
//! parameter table. [`ScenarioRunner`] does that for the unmodified table and
//! then once per timeline variant.

use tracing::{debug, info, info_span};

use crate::error::{Error, Result};
use crate::model::{ModelFactory, TakeoffModel};
use crate::params::{ParameterSet, ParameterSetBuilder, Stage, SweepMode};
use crate::scenario::{MetricCatalogue, Scenario, ScenarioGroup, ScenarioSweep, NORMAL_GROUP};
use crate::table::ParameterTable;
use crate::timeline::{apply_timeline_override, TimelineOverrideSet};

pub struct ScenarioGroupRunner<'a, F> {
    factory: &'a F,
}

impl<'a, F: ModelFactory> ScenarioGroupRunner<'a, F> {
    pub fn new(factory: &'a F) -> Self {
        Self { factory }
    }

    /// Run Conservative, Best guess and Aggressive in that order.
    ///
    /// Scenarios are named after their stage in both sweep modes; the
    /// explored values are in each scenario's `params`. `group` only names
    /// the failing group in errors.
    pub fn run(
        &self,
        group: &str,
        table: &ParameterTable,
        mode: &SweepMode,
    ) -> Result<[Scenario<F::Model>; 3]> {
        let (low, med, high) = ParameterSetBuilder::build(table, mode)?;

        info!("Running simulations...");

        let low_model = self.simulate(group, Stage::Conservative, &low)?;
        let med_model = self.simulate(group, Stage::BestGuess, &med)?;
        let high_model = self.simulate(group, Stage::Aggressive, &high)?;

        Ok([
            Scenario::new(Stage::Conservative.as_str(), low_model, low),
            Scenario::new(Stage::BestGuess.as_str(), med_model, med),
            Scenario::new(Stage::Aggressive.as_str(), high_model, high),
        ])
    }

    fn simulate(
        &self,
        group: &str,
        stage: Stage,
        params: &ParameterSet,
    ) -> Result<F::Model> {
        let _span = info_span!("stage", stage = stage.as_str()).entered();
        info!("{} simulation", stage);

        let failure = |cause| Error::ScenarioRunFailure {
            group: group.to_string(),
            stage,
            cause,
        };

        let mut model = self.factory.build(params).map_err(failure)?;
        model.run_simulation().map_err(failure)?;
        debug!("{} simulation complete", stage);
        Ok(model)
    }
}

/// Runs the normal group and one group per timeline.
pub struct ScenarioRunner<F: ModelFactory> {
    factory: F,
    parameter_table: ParameterTable,
    timelines: TimelineOverrideSet,
    sweep: Option<ScenarioSweep<F::Model>>,
}

impl<F: ModelFactory> ScenarioRunner<F> {
    pub fn new(factory: F, parameter_table: ParameterTable, timelines: TimelineOverrideSet) -> Self {
        Self {
            factory,
            parameter_table,
            timelines,
            sweep: None,
        }
    }

    pub fn parameter_table(&self) -> &ParameterTable {
        &self.parameter_table
    }

    pub fn timelines(&self) -> &TimelineOverrideSet {
        &self.timelines
    }

    /// Result of the last successful [`simulate_all_scenarios`](Self::simulate_all_scenarios).
    pub fn sweep(&self) -> Option<&ScenarioSweep<F::Model>> {
        self.sweep.as_ref()
    }

    /// Rebuild every group from scratch.
    ///
    /// Either all groups complete or nothing is stored. The metric catalogue
    /// is taken from the normal group's Best guess run and every scenario
    /// of every group is checked against it.
    pub fn simulate_all_scenarios(&mut self) -> Result<&ScenarioSweep<F::Model>> {
        let runner = ScenarioGroupRunner::new(&self.factory);
        let mode = SweepMode::Compare;
        let mut groups = Vec::with_capacity(1 + self.timelines.len());

        let normal = {
            let _span = info_span!("group", name = NORMAL_GROUP).entered();
            info!("Simulating {} scenario group", NORMAL_GROUP);
            let scenarios = runner.run(NORMAL_GROUP, &self.parameter_table, &mode)?;
            ScenarioGroup::new(NORMAL_GROUP, scenarios, self.parameter_table.clone(), None)
        };
        let metrics = MetricCatalogue::from_scenario(&normal[1]);
        metrics.check(&normal)?;
        groups.push(normal);

        for timeline in &self.timelines {
            let _span = info_span!("group", name = timeline.name.as_str()).entered();
            info!("Simulating {} scenario group", timeline.name);

            let table = apply_timeline_override(&self.parameter_table, timeline)?;
            let scenarios = runner.run(&timeline.name, &table, &mode)?;
            let group = ScenarioGroup::new(
                timeline.name.clone(),
                scenarios,
                table,
                Some(timeline.full_automation_requirements),
            );
            metrics.check(&group)?;
            groups.push(group);
        }

        info!(groups = groups.len(), metrics = metrics.len(), "sweep complete");
        Ok(&*self.sweep.insert(ScenarioSweep { groups, metrics }))
    }
}
