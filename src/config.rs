use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::reference::Horizon;
use crate::table::{ParameterRow, ParameterTable};
use crate::timeline::{TimelineKind, TimelineOverride, TimelineOverrideSet};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Root {
    pub ftm: Program,
    #[serde(default)]
    pub model: Horizon,
    pub parameters: Vec<ParameterRow>,
    #[serde(default)]
    pub timelines: Vec<TimelineOverride>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Program {
    pub program: String,
    #[serde(default)]
    pub module: String,
    pub version: String,
}

/// Read, parse and validate a run configuration.
pub fn load(path: impl AsRef<Path>) -> Result<(Root, String)> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: Root = toml::from_str(&text)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok((cfg, text))
}

impl Root {
    pub fn validate(&self) -> Result<()> {
        if self.ftm.program != "ftm" {
            bail!("ftm.program must be ftm");
        }

        let m = &self.model;
        if !(m.t_step > 0.0) {
            bail!("model.t_step must be positive");
        }
        if !(m.t_start < m.t_end) {
            bail!("model.t_start must be < model.t_end");
        }
        if !(m.t_end <= m.max_t_end) {
            bail!("model.t_end must be <= model.max_t_end");
        }

        if self.parameters.is_empty() {
            bail!("at least one [[parameters]] entry is required");
        }
        for (i, row) in self.parameters.iter().enumerate() {
            if row.name.trim().is_empty() {
                bail!("parameters[{}].name must not be empty", i);
            }
            if !row.best_guess.is_finite() {
                bail!("parameters.{}.best_guess must be finite", row.name);
            }
            if self.parameters[..i].iter().any(|r| r.name == row.name) {
                bail!("duplicate parameter: {}", row.name);
            }
        }

        for (i, t) in self.timelines.iter().enumerate() {
            TimelineKind::from_name(&t.name)?;
            if self.timelines[..i].iter().any(|o| o.name == t.name) {
                bail!("duplicate timeline: {}", t.name);
            }
            let values = [
                ("full_automation_requirements", t.full_automation_requirements),
                ("long_flop_gap", t.long_flop_gap),
                ("med_flop_gap", t.med_flop_gap),
                ("short_flop_gap", t.short_flop_gap),
            ];
            for (field, value) in values {
                if !(value.is_finite() && value > 0.0) {
                    bail!("timelines.\"{}\".{} must be positive", t.name, field);
                }
            }
        }

        Ok(())
    }

    pub fn parameter_table(&self) -> Result<ParameterTable> {
        Ok(ParameterTable::new(self.parameters.clone())?)
    }

    pub fn timeline_overrides(&self) -> TimelineOverrideSet {
        TimelineOverrideSet::new(self.timelines.clone())
    }
}
