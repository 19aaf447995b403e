//! The batch run: fetch, load, then one map per hazard definition.

use std::path::{Path, PathBuf};

use alert_common::{AlertMapError, AlertMapResult, HazardDefinition, LayerSet, PlanarBounds};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use composer::{artifact_file_name, HazardMapComposer};
use projection::CrsNormalizer;
use renderer::SceneRasterizer;
use tracing::{error, info, warn};

use crate::config::{AppConfig, OutputConfig};
use crate::fetch::{extract, ArchiveFetcher};
use crate::layers::LayerStore;

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    /// Definition name and failure reason
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders and writes the maps of one run, sequentially.
pub struct MapRun {
    composer: HazardMapComposer,
    rasterizer: SceneRasterizer,
    output: OutputConfig,
}

impl MapRun {
    pub fn new(composer: HazardMapComposer, rasterizer: SceneRasterizer, output: OutputConfig) -> Self {
        Self {
            composer,
            rasterizer,
            output,
        }
    }

    /// Render every definition in order.
    ///
    /// `clock` is read once per map. A failed map is logged with the
    /// definition name; the run continues or stops per
    /// `output.continue_on_error`.
    pub fn render_all(
        &self,
        layers: &LayerSet,
        definitions: &[HazardDefinition],
        bounds: PlanarBounds,
        clock: impl Fn() -> NaiveDateTime,
    ) -> AlertMapResult<RunSummary> {
        std::fs::create_dir_all(&self.output.directory).map_err(|e| {
            AlertMapError::Io(format!(
                "cannot create output directory {}: {}",
                self.output.directory.display(),
                e
            ))
        })?;

        let mut summary = RunSummary::default();
        for definition in definitions {
            match self.render_one(layers, definition, bounds, clock()) {
                Ok(path) => summary.written.push(path),
                Err(e) => {
                    error!(
                        hazard = %definition.name,
                        error = %e,
                        scope = ?e.scope(),
                        "Failed to produce map"
                    );
                    if !self.output.continue_on_error {
                        return Err(e);
                    }
                    summary.failed.push((definition.name.clone(), e.to_string()));
                }
            }
        }

        info!(
            written = summary.written.len(),
            failed = summary.failed.len(),
            "Run complete"
        );
        Ok(summary)
    }

    /// Compose, rasterize and write one map. The canvas is freed on return.
    pub fn render_one(
        &self,
        layers: &LayerSet,
        definition: &HazardDefinition,
        bounds: PlanarBounds,
        now: NaiveDateTime,
    ) -> AlertMapResult<PathBuf> {
        let scene = self.composer.compose(layers, definition, bounds, now)?;
        let png = self.rasterizer.render(&scene)?;

        let path = self.artifact_path(&definition.name);
        write_artifact(&path, &png)?;

        info!(
            hazard = %definition.name,
            outcome = ?scene.outcome,
            path = %path.display(),
            bytes = png.len(),
            "Map saved"
        );
        Ok(path)
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output
            .directory
            .join(artifact_file_name(&self.output.file_pattern, name))
    }
}

fn write_artifact(path: &Path, png: &[u8]) -> AlertMapResult<()> {
    std::fs::write(path, png)
        .map_err(|e| AlertMapError::Io(format!("cannot write {}: {}", path.display(), e)))
}

/// The whole pipeline for one configuration.
pub async fn run(config: &AppConfig, skip_download: bool) -> Result<RunSummary> {
    if skip_download {
        warn!(
            directory = %config.layers.directory.display(),
            "Skipping download, using previously extracted alerts"
        );
    } else {
        let fetcher = ArchiveFetcher::new(&config.source)?;
        let archive = fetcher.fetch().await?;
        extract(&archive, &config.layers.directory)?;
    }

    let normalizer = CrsNormalizer::new(config.projection.target_crs)
        .context("Unsupported projection settings")?;
    let bounds = normalizer
        .to_planar(&config.bounds)
        .context("Cannot project view bounds")?;
    info!(
        x_min = bounds.x_min,
        y_min = bounds.y_min,
        x_max = bounds.x_max,
        y_max = bounds.y_max,
        crs = %normalizer.target(),
        "View bounds"
    );

    let layers = LayerStore::new(config.layers.clone()).load_all(&normalizer)?;

    let map_run = MapRun::new(
        HazardMapComposer::new(config.map.style.clone()),
        SceneRasterizer::new(config.map.raster_options()),
        config.output.clone(),
    );
    let summary = map_run.render_all(&layers, &config.hazards, bounds, || {
        Local::now().naive_local()
    })?;

    Ok(summary)
}
