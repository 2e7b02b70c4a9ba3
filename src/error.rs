#![warn(missing_docs)]
//! Interferometer specific error structures
use std::{error::Error, fmt::Display};

/// Crate specific Result type
pub type OpticsResult<T> = std::result::Result<T, OpticsError>;

/// Errors that can be returned by the fallible (construction and I/O) functions of this crate.
///
/// The solver itself never returns these. Numerical anomalies during a solve are turned into
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum OpticsError {
    /// error while setting up a [`Scene`](crate::scene::Scene)
    Scene(String),
    /// invalid component parameters (orientation tag, reflectivity, kind name)
    Component(String),
    /// errors in connection with the solver configuration
    Config(String),
    /// errors console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for OpticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scene(m) => write!(f, "Scene:{m}"),
            Self::Component(m) => write!(f, "Component:{m}"),
            Self::Config(m) => write!(f, "Config:{m}"),
            Self::Console(m) => write!(f, "Console:{m}"),
            Self::Other(m) => write!(f, "Interfero Error:Other:{m}"),
        }
    }
}
impl Error for OpticsError {}

impl std::convert::From<String> for OpticsError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
