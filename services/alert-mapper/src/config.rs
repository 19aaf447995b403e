//! Run configuration.
//!
//! Loaded from a single YAML file. Every section is optional; omitted
//! values fall back to the New York State defaults.

use std::path::{Path, PathBuf};

use alert_common::hazard::validate_table;
use alert_common::{CrsCode, GeographicBox, HazardDefinition, LayerKind};
use anyhow::{bail, Context, Result};
use composer::ComposerConfig;
use renderer::RasterOptions;
use serde::Deserialize;
use tracing::debug;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub layers: LayersConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// Geographic view extent (degrees, lon/lat order)
    #[serde(default = "default_bounds")]
    pub bounds: GeographicBox,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Hazard table, rendered in declaration order
    #[serde(default = "default_hazards")]
    pub hazards: Vec<HazardDefinition>,
}

/// Where the alert archive comes from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url() -> String {
    "https://tgftp.nws.noaa.gov/SL.us008001/DF.sha/DC.cap/DS.WWA/current_all.tar.gz".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// One shapefile and, optionally, its coordinate reference system.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerSource {
    pub file: PathBuf,
    /// Source CRS; detected from the `.prj` sidecar when omitted
    #[serde(default)]
    pub crs: Option<CrsCode>,
}

impl LayerSource {
    fn named(file: &str) -> Self {
        Self {
            file: PathBuf::from(file),
            crs: None,
        }
    }
}

/// Shapefile locations. Relative files resolve against `directory`.
#[derive(Debug, Clone, Deserialize)]
pub struct LayersConfig {
    /// Where the archive is extracted and the boundary files live
    #[serde(default = "default_layer_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_hazard_layer")]
    pub hazards: LayerSource,
    #[serde(default = "default_region_layer")]
    pub target_region: LayerSource,
    #[serde(default = "default_county_layer")]
    pub counties: LayerSource,
    #[serde(default = "default_neighbor_layer")]
    pub neighbor_states: LayerSource,
    #[serde(default = "default_world_layer")]
    pub world: LayerSource,
    /// Attribute holding the hazard phenomenon code
    #[serde(default = "default_phenomenon_field")]
    pub phenomenon_field: String,
    /// Attribute holding the significance code
    #[serde(default = "default_significance_field")]
    pub significance_field: String,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            directory: default_layer_dir(),
            hazards: default_hazard_layer(),
            target_region: default_region_layer(),
            counties: default_county_layer(),
            neighbor_states: default_neighbor_layer(),
            world: default_world_layer(),
            phenomenon_field: default_phenomenon_field(),
            significance_field: default_significance_field(),
        }
    }
}

impl LayersConfig {
    pub fn source(&self, kind: LayerKind) -> &LayerSource {
        match kind {
            LayerKind::Hazards => &self.hazards,
            LayerKind::TargetRegion => &self.target_region,
            LayerKind::Counties => &self.counties,
            LayerKind::NeighborStates => &self.neighbor_states,
            LayerKind::World => &self.world,
        }
    }

    /// Full path of a layer's `.shp` file.
    pub fn path(&self, kind: LayerKind) -> PathBuf {
        self.directory.join(&self.source(kind).file)
    }
}

fn default_layer_dir() -> PathBuf {
    PathBuf::from("MappingElements")
}

fn default_hazard_layer() -> LayerSource {
    LayerSource::named("current_all.shp")
}

fn default_region_layer() -> LayerSource {
    LayerSource::named("NYS Shorline.shp")
}

fn default_county_layer() -> LayerSource {
    LayerSource::named("NYS Counties.shp")
}

fn default_neighbor_layer() -> LayerSource {
    LayerSource::named("US StatesCoastlines.shp")
}

fn default_world_layer() -> LayerSource {
    LayerSource::named("Worlds-32116.shp")
}

fn default_phenomenon_field() -> String {
    "PHENOM".to_string()
}

fn default_significance_field() -> String {
    "SIG".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_target_crs")]
    pub target_crs: CrsCode,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            target_crs: default_target_crs(),
        }
    }
}

fn default_target_crs() -> CrsCode {
    CrsCode::Epsg32116
}

fn default_bounds() -> GeographicBox {
    GeographicBox::new(-80.0, 40.4, -71.2, 45.6)
}

/// Map text, colors and image size.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(flatten)]
    pub style: ComposerConfig,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default = "default_dpi")]
    pub dpi: f32,
    /// TrueType font for map text; system fonts are tried when unset
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: ComposerConfig::default(),
            width: default_size(),
            height: default_size(),
            dpi: default_dpi(),
            font_path: None,
        }
    }
}

impl MapConfig {
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            width: self.width,
            height: self.height,
            dpi: self.dpi,
            font_path: self.font_path.clone(),
        }
    }
}

fn default_size() -> u32 {
    1000
}

fn default_dpi() -> f32 {
    100.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// File name pattern; `{name}` is replaced by the hazard's display name
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    /// Keep going after a hazard fails to render
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            file_pattern: default_file_pattern(),
            continue_on_error: default_continue_on_error(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_pattern() -> String {
    "Current_NY_{name}_Alert.png".to_string()
}

fn default_continue_on_error() -> bool {
    true
}

fn default_hazards() -> Vec<HazardDefinition> {
    vec![
        HazardDefinition::sentinel("None"),
        HazardDefinition::new("Rip Current", "RP", "S", "Statement", "#40E0D0"),
        HazardDefinition::new("Beach Hazards", "BH", "S", "Statement", "#40E0D0"),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            layers: LayersConfig::default(),
            projection: ProjectionConfig::default(),
            bounds: default_bounds(),
            map: MapConfig::default(),
            output: OutputConfig::default(),
            hazards: default_hazards(),
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(
            path = %path.display(),
            hazards = config.hazards.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that do not need the filesystem.
    pub fn validate(&self) -> Result<()> {
        validate_table(&self.hazards).map_err(anyhow::Error::msg)?;
        self.bounds.validate().map_err(anyhow::Error::msg)?;

        if self.map.width == 0 || self.map.height == 0 {
            bail!("map size must be non-zero, got {}x{}", self.map.width, self.map.height);
        }
        if !(self.map.dpi > 0.0) {
            bail!("map dpi must be positive, got {}", self.map.dpi);
        }
        if self.output.file_pattern.trim().is_empty() {
            bail!("output file_pattern must not be empty");
        }
        if self.source.timeout_secs == 0 {
            bail!("source timeout_secs must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();

        assert_eq!(config.hazards.len(), 3);
        assert!(config.hazards[0].is_sentinel());
        assert_eq!(config.projection.target_crs, CrsCode::Epsg32116);
        assert_eq!(config.bounds, GeographicBox::new(-80.0, 40.4, -71.2, 45.6));
        assert_eq!(config.output.file_pattern, "Current_NY_{name}_Alert.png");
        assert!(config.output.continue_on_error);
        assert_eq!(config.layers.phenomenon_field, "PHENOM");
        assert_eq!(
            config.layers.path(LayerKind::Counties),
            PathBuf::from("MappingElements").join("NYS Counties.shp")
        );
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r##"
source:
  url: "http://localhost:8080/current_all.tar.gz"
  timeout_secs: 30

layers:
  directory: /data/layers
  hazards:
    file: current_all.shp
    crs: "EPSG:4326"
  world:
    file: world.shp
    crs: "EPSG:32116"

bounds:
  min_lon: -75.0
  min_lat: 41.0
  max_lon: -72.0
  max_lat: 42.0

map:
  title: "Long Island Weather Alerts"
  region_name: "Long Island"
  background: "#a6cee3"
  width: 800
  height: 600

output:
  directory: /tmp/maps
  continue_on_error: false

hazards:
  - name: None
    phenomenon: None
  - name: Rip Current
    phenom: RP
    sig: S
    sig_type: Statement
    color: "#40E0D0"
"##;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.layers.hazards.crs, Some(CrsCode::Epsg4326));
        assert_eq!(config.layers.world.file, PathBuf::from("world.shp"));
        assert_eq!(config.layers.counties.crs, None);
        assert_eq!(config.map.style.region_name, "Long Island");
        assert_eq!(config.map.style.legend_title, "Alert Type");
        assert_eq!(config.map.raster_options().width, 800);
        assert!(!config.output.continue_on_error);
        assert_eq!(config.hazards[1].phenomenon.as_deref(), Some("RP"));
        assert_eq!(config.hazards[1].significance_label.as_deref(), Some("Statement"));
    }

    #[test]
    fn test_duplicate_code_pair_rejected() {
        let yaml = r##"
hazards:
  - { name: Rip Current, phenomenon: RP, significance: S, significance_label: Statement, color: "#40E0D0" }
  - { name: Rip Again, phenomenon: RP, significance: S, significance_label: Statement, color: "#000000" }
"##;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let yaml = r#"
bounds: { min_lon: -71.2, min_lat: 40.4, max_lon: -80.0, max_lat: 45.6 }
"#;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(AppConfig::from_yaml("map: { width: 0 }").is_err());
    }

    #[test]
    fn test_shipped_config_parses() {
        let path = test_utils::workspace_root().join("config/alert-mapper.yaml");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.hazards[1].name, "Rip Current");
        assert_eq!(config.hazards.len(), 3);
    }
}
