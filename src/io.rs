use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config;
use crate::scenario::{MetricCatalogue, ScenarioGroup, ScenarioSweep};

pub const SCHEMA_VERSION: &str = "1.0.0";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct CsvWriter {
    w: BufWriter<File>,
}

impl CsvWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let f = File::create(path)?;
        Ok(Self { w: BufWriter::new(f) })
    }

    pub fn write_header(&mut self) -> Result<()> {
        writeln!(self.w, "group,reqs,scenario,metric,value")?;
        Ok(())
    }

    pub fn write_group<M>(&mut self, group: &ScenarioGroup<M>) -> Result<()> {
        let reqs = group.reqs_label();
        for scenario in group.iter() {
            for metric in &scenario.metrics {
                writeln!(
                    self.w,
                    "{},{},{},{},{:.6}",
                    quote(&group.name),
                    reqs,
                    quote(&scenario.name),
                    quote(&metric.name),
                    metric.value
                )?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub tool_version: String,
    pub timestamp_utc: String,
    pub platform: String,
    pub config_hash: String,
    pub config_snapshot: config::Root,
}

impl Manifest {
    pub fn new(cfg: &config::Root, cfg_text: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            tool_version: TOOL_VERSION.to_string(),
            timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            platform: std::env::consts::OS.to_string(),
            config_hash: config_hash(cfg_text),
            config_snapshot: cfg.clone(),
        }
    }
}

pub fn config_hash(cfg_text: &str) -> String {
    hex::encode(Sha256::digest(cfg_text.as_bytes()))
}

#[derive(Serialize)]
#[serde(bound(serialize = ""))]
pub struct ResultBundle<'a, M> {
    pub manifest: Manifest,
    pub metrics: &'a MetricCatalogue,
    pub groups: Vec<GroupSummary<'a, M>>,
}

/// A group plus its rendered requirements label.
#[derive(Serialize)]
#[serde(bound(serialize = ""))]
pub struct GroupSummary<'a, M> {
    pub reqs_label: String,
    #[serde(flatten)]
    pub group: &'a ScenarioGroup<M>,
}

impl<'a, M> ResultBundle<'a, M> {
    pub fn new(manifest: Manifest, sweep: &'a ScenarioSweep<M>) -> Self {
        Self {
            manifest,
            metrics: &sweep.metrics,
            groups: sweep
                .groups
                .iter()
                .map(|group| GroupSummary {
                    reqs_label: group.reqs_label(),
                    group,
                })
                .collect(),
        }
    }
}

/// JSON bundle path next to a CSV output: `out.csv` gives `out.json`.
/// Never returns the CSV path itself.
pub fn json_path_for(csv_path: impl AsRef<Path>) -> PathBuf {
    let csv_path = csv_path.as_ref();
    let json_path = csv_path.with_extension("json");
    if json_path == csv_path {
        let mut name = csv_path.as_os_str().to_os_string();
        name.push(".json");
        PathBuf::from(name)
    } else {
        json_path
    }
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
