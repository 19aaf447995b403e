//! Alert features and boundary layers, the read-only inputs of every map.

use std::collections::BTreeMap;
use std::fmt;

use geo::MultiPolygon;

/// The five geometry layers a run loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// NWS watch/warning/advisory polygons
    Hazards,
    /// Outline of the jurisdiction being mapped
    TargetRegion,
    Counties,
    /// Outlines of the surrounding US states
    NeighborStates,
    World,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Hazards => "hazards",
            LayerKind::TargetRegion => "target_region",
            LayerKind::Counties => "counties",
            LayerKind::NeighborStates => "neighbor_states",
            LayerKind::World => "world",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One NWS alert polygon with its identifying codes.
///
/// The geometry may be empty (a null shape in the source file); such a
/// feature never intersects anything.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertFeature {
    pub geometry: MultiPolygon<f64>,
    /// PHENOM code, e.g. "RP"
    pub phenomenon: String,
    /// SIG code, e.g. "S"
    pub significance: String,
    /// Remaining attribute columns, passed through untouched
    pub attributes: BTreeMap<String, String>,
}

impl AlertFeature {
    pub fn new(
        geometry: MultiPolygon<f64>,
        phenomenon: impl Into<String>,
        significance: impl Into<String>,
    ) -> Self {
        Self {
            geometry,
            phenomenon: phenomenon.into(),
            significance: significance.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn has_geometry(&self) -> bool {
        !self.geometry.0.is_empty()
    }
}

/// A backdrop layer: polygons only, no attributes the pipeline reads.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    pub kind: LayerKind,
    pub geometries: Vec<MultiPolygon<f64>>,
}

impl BoundaryLayer {
    pub fn new(kind: LayerKind, geometries: Vec<MultiPolygon<f64>>) -> Self {
        Self { kind, geometries }
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}

/// All layers of a run, loaded once and shared read-only by every map.
#[derive(Debug, Clone)]
pub struct LayerSet {
    pub hazards: Vec<AlertFeature>,
    pub target_region: BoundaryLayer,
    pub counties: BoundaryLayer,
    pub neighbor_states: BoundaryLayer,
    pub world: BoundaryLayer,
}

impl LayerSet {
    /// Boundary layers in backdrop draw order.
    pub fn backdrop(&self) -> [&BoundaryLayer; 4] {
        [
            &self.world,
            &self.neighbor_states,
            &self.counties,
            &self.target_region,
        ]
    }

    /// Feature count per layer, for logging.
    pub fn counts(&self) -> [(LayerKind, usize); 5] {
        [
            (LayerKind::Hazards, self.hazards.len()),
            (LayerKind::TargetRegion, self.target_region.len()),
            (LayerKind::Counties, self.counties.len()),
            (LayerKind::NeighborStates, self.neighbor_states.len()),
            (LayerKind::World, self.world.len()),
        ]
    }
}
