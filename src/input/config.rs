use std::path::Path;

use crate::input::InputError;
use crate::model::config::EngineConfig;

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| InputError::Config {
        path: path.to_path_buf(),
        source,
    })
}
