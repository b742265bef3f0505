//! Scenario sweep errors

use thiserror::Error;

use crate::model::ModelError;
use crate::params::Stage;
use crate::table::Column;

/// Sweep result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building parameter sets or running scenario groups.
///
/// Nothing is retried: every variant aborts the whole sweep.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing parameter: {name}{}", .column.map(|c| format!(" ({c} value)")).unwrap_or_default())]
    MissingParameter {
        name: String,
        column: Option<Column>,
    },

    #[error("unknown timeline: \"{name}\"")]
    UnknownTimeline { name: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{stage} simulation failed in group '{group}'")]
    ScenarioRunFailure {
        group: String,
        stage: Stage,
        #[source]
        cause: ModelError,
    },

    #[error("metric mismatch in group '{group}', scenario '{scenario}': expected {expected:?}, found {found:?}")]
    MetricCatalogueMismatch {
        group: String,
        scenario: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl Error {
    pub(crate) fn missing(name: &str) -> Self {
        Error::MissingParameter {
            name: name.to_string(),
            column: None,
        }
    }

    pub(crate) fn missing_bound(name: &str, column: Column) -> Self {
        Error::MissingParameter {
            name: name.to_string(),
            column: Some(column),
        }
    }
}
