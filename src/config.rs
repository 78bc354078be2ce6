//! Loading of the shared run parameters.
//!
//! The parameter file is a single JSON object handed to every test case before it
//! runs. A missing or malformed file is never fatal: the run proceeds with an empty
//! parameter set.

use crate::errors::ConfigError;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Shared configuration injected into fixtures and test cases.
pub type Params = Map<String, Value>;

/// Default location of the parameter file.
pub const DEFAULT_PARAMS_PATH: &str = "system_params.json";

/// Reads and parses the parameter file at `path`.
pub fn load_params(path: &Path) -> Result<Params, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(params) => Ok(params),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Like [`load_params`], but degrades to an empty parameter set with a warning.
pub fn load_params_or_default(path: &Path) -> Params {
    match load_params(path) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("{e}. So no parameters will be passed!");
            Params::new()
        }
    }
}
