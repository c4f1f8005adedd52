use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::Builder;
use tracing::info;

use crate::config::ArtifactPaths;
use crate::domain::{InstrumentId, InstrumentRecord};
use crate::error::CatalogError;

/// The three JSON artifacts of a run. Every write replaces the whole file.
#[derive(Debug, Clone)]
pub struct Store {
    paths: ArtifactPaths,
}

impl Store {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn in_dir(root: &Utf8Path) -> Self {
        let defaults = ArtifactPaths::default();
        Self::new(ArtifactPaths {
            ids: root.join(defaults.ids),
            catalog: root.join(defaults.catalog),
            sorted_catalog: root.join(defaults.sorted_catalog),
        })
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn write_ids(&self, ids: &[InstrumentId]) -> Result<(), CatalogError> {
        write_json_atomic(&self.paths.ids, ids)
    }

    pub fn read_ids(&self) -> Result<Vec<InstrumentId>, CatalogError> {
        let raw: Vec<String> = read_json(&self.paths.ids)?;
        raw.iter().map(|value| value.parse()).collect()
    }

    pub fn write_catalog(&self, records: &[InstrumentRecord]) -> Result<(), CatalogError> {
        write_json_atomic(&self.paths.catalog, records)
    }

    pub fn read_catalog(&self) -> Result<Vec<InstrumentRecord>, CatalogError> {
        read_json(&self.paths.catalog)
    }

    pub fn write_sorted_catalog(&self, records: &[InstrumentRecord]) -> Result<(), CatalogError> {
        write_json_atomic(&self.paths.sorted_catalog, records)
    }

    pub fn read_sorted_catalog(&self) -> Result<Vec<InstrumentRecord>, CatalogError> {
        read_json(&self.paths.sorted_catalog)
    }
}

pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Utf8Path,
    value: &T,
) -> Result<(), CatalogError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| CatalogError::Filesystem(format!("create {parent}: {err}")))?;

    let content = serde_json::to_vec_pretty(value)
        .map_err(|err| CatalogError::Filesystem(err.to_string()))?;
    let mut temp = Builder::new()
        .prefix("fund-catalog")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| CatalogError::Filesystem(err.to_string()))?;
    temp.write_all(&content)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|err| CatalogError::Filesystem(err.to_string()))?;
    // Renames over the target, so readers see either the old or the new file.
    temp.persist(path.as_std_path())
        .map_err(|err| CatalogError::Filesystem(format!("write {path}: {err}")))?;

    info!(%path, "written");
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path.as_std_path())
        .map_err(|err| CatalogError::Filesystem(format!("read {path}: {err}")))?;
    serde_json::from_str(&content).map_err(|err| CatalogError::ArtifactParse {
        path: path.to_string(),
        reason: err.to_string(),
    })
}
