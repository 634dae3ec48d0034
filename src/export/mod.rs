mod obj;
mod summary;

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{city::City, config::GeneratorSettings};

pub use obj::{city_mesh, Mesh, GREEN_PAD_HEIGHT, ROAD_THICKNESS};
pub use summary::CitySummary;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    fn io(path: &Path, source: io::Error) -> Self {
        ExportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Record of one export run, written last as `{prefix}_manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub generated_at: DateTime<Utc>,
    pub seed: u32,
    pub settings: GeneratorSettings,
    pub files: Vec<String>,
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| ExportError::io(path, err))
}

fn write_json<T: Serialize>(
    path: &Path,
    what: &'static str,
    value: &T,
) -> Result<(), ExportError> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, value)
        .map_err(|source| ExportError::Json { what, source })?;
    out.flush().map_err(|err| ExportError::io(path, err))
}

/// Writes the mesh, summary, full city model and manifest into `dir`.
pub fn export_city(
    city: &City,
    settings: &GeneratorSettings,
    dir: impl AsRef<Path>,
    prefix: &str,
) -> Result<ExportManifest, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|err| ExportError::io(dir, err))?;

    let obj_name = format!("{prefix}.obj");
    let obj_path = dir.join(&obj_name);
    let out = create(&obj_path)?;
    city_mesh(city)
        .write_to(out)
        .map_err(|err| ExportError::io(&obj_path, err))?;

    let summary_name = format!("{prefix}_summary.json");
    write_json(
        &dir.join(&summary_name),
        "summary",
        &CitySummary::from_city(city),
    )?;

    let city_name = format!("{prefix}_city.json");
    write_json(&dir.join(&city_name), "city", city)?;

    let manifest = ExportManifest {
        generated_at: Utc::now(),
        seed: settings.seed,
        settings: settings.clone(),
        files: vec![obj_name, summary_name, city_name],
    };
    write_json(
        &dir.join(format!("{prefix}_manifest.json")),
        "manifest",
        &manifest,
    )?;

    info!(dir = %dir.display(), prefix, "city exported");
    Ok(manifest)
}
