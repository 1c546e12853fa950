use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::collections::Collection;
use crate::environment::Variables;
use crate::error::{Error, Result};
use crate::testing::RunReport;

pub fn load_collection(path: &Path) -> Result<Collection> {
    let collection: Collection = read_json(path)?;
    collection.validate()?;
    info!(
        path = %path.display(),
        scenarios = collection.scenarios.len(),
        "loaded collection"
    );
    Ok(collection)
}

/// A variables file is a flat JSON object of strings.
pub fn load_variables(path: &Path) -> Result<Variables> {
    read_json(path)
}

pub fn save_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let raw = serde_json::to_string_pretty(report)?;
    fs::write(path, raw).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
