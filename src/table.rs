use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// One of the three value columns of the parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Column {
    Conservative,
    #[serde(rename = "Best guess")]
    BestGuess,
    Aggressive,
}

impl Column {
    /// Sweep order: low, med, high
    pub const ALL: [Column; 3] = [Column::Conservative, Column::BestGuess, Column::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Conservative => "Conservative",
            Column::BestGuess => "Best guess",
            Column::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named model input with its three sensitivity values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterRow {
    pub name: String,
    /// Absent (or NaN) means no conservative bound was authored
    #[serde(default)]
    pub conservative: Option<f64>,
    pub best_guess: f64,
    #[serde(default)]
    pub aggressive: Option<f64>,
    /// Whether the row takes part in the Conservative/Aggressive comparison
    #[serde(default, deserialize_with = "deserialize_compare_flag")]
    pub compare: bool,
}

impl ParameterRow {
    pub fn new(
        name: impl Into<String>,
        conservative: Option<f64>,
        best_guess: f64,
        aggressive: Option<f64>,
        compare: bool,
    ) -> Self {
        Self {
            name: name.into(),
            conservative,
            best_guess,
            aggressive,
            compare,
        }
    }

    /// Raw column value; an unauthored bound is `None`.
    pub fn get(&self, column: Column) -> Option<f64> {
        match column {
            Column::Conservative => self.conservative,
            Column::BestGuess => Some(self.best_guess),
            Column::Aggressive => self.aggressive,
        }
    }

    /// Column value only if it is authored and not NaN.
    pub fn bound(&self, column: Column) -> Option<f64> {
        self.get(column).filter(|v| !v.is_nan())
    }

    /// Overwrite all three columns with one value.
    pub fn set_all(&mut self, value: f64) {
        self.conservative = Some(value);
        self.best_guess = value;
        self.aggressive = Some(value);
    }
}

// Accepts `true`/`false` or the spreadsheet-style "Y"/"N".
fn deserialize_compare_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim() {
            "Y" | "y" | "yes" | "Yes" => Ok(true),
            "N" | "n" | "no" | "No" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "compare flag must be a boolean or \"Y\"/\"N\", got \"{}\"",
                other
            ))),
        },
    }
}

/// Ordered parameter rows, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterTable {
    rows: Vec<ParameterRow>,
}

impl ParameterTable {
    pub fn new(rows: Vec<ParameterRow>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if rows[..i].iter().any(|r| r.name == row.name) {
                return Err(Error::Configuration(format!(
                    "duplicate parameter row: {}",
                    row.name
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ParameterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Like [`get`](Self::get) but a missing row is an error.
    pub fn row(&self, name: &str) -> Result<&ParameterRow> {
        self.get(name).ok_or_else(|| Error::missing(name))
    }

    pub(crate) fn row_mut(&mut self, name: &str) -> Result<&mut ParameterRow> {
        self.rows
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::missing(name))
    }
}
