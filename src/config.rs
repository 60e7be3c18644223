//! Engine configuration.
//!
//! Configuration is fixed per scenario: build it once, validate it, and hand
//! it to the planner. All types load from JSON (and TOML with the `toml`
//! feature) with sensible defaults for every omitted field.

use crate::error::{ClusterError, Result};
use crate::network::EdgePolicy;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// Highest zoom level the cluster hierarchy may be built up to.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Parameters of the spatial clustering hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Merge radius in pixels, relative to `extent`.
    #[serde(default = "ClusterConfig::default_radius_pixels")]
    pub radius_pixels: f64,

    /// Tile extent in pixels the radius is measured against.
    #[serde(default = "ClusterConfig::default_extent")]
    pub extent: f64,

    /// Lowest zoom level that gets its own clustering pass.
    #[serde(default)]
    pub min_zoom: u8,

    /// At and above this zoom every point is returned individually.
    #[serde(default = "ClusterConfig::default_max_cluster_zoom")]
    pub max_cluster_zoom: u8,

    /// Minimum number of points needed to form a cluster.
    #[serde(default = "ClusterConfig::default_min_points")]
    pub min_points: usize,
}

impl ClusterConfig {
    const fn default_radius_pixels() -> f64 {
        40.0
    }

    const fn default_extent() -> f64 {
        512.0
    }

    const fn default_max_cluster_zoom() -> u8 {
        16
    }

    const fn default_min_points() -> usize {
        2
    }

    pub fn with_radius_pixels(mut self, radius: f64) -> Self {
        self.radius_pixels = radius;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_cluster_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_cluster_zoom = max_cluster_zoom;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Merge radius in unit Web-Mercator space at `zoom`.
    pub(crate) fn radius_at(&self, zoom: u8) -> f64 {
        self.radius_pixels / (self.extent * 2f64.powi(i32::from(zoom)))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.radius_pixels.is_finite() || self.radius_pixels <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Cluster radius must be finite and positive, got: {}",
                self.radius_pixels
            )));
        }

        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Tile extent must be finite and positive, got: {}",
                self.extent
            )));
        }

        if self.max_cluster_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ClusterError::InvalidConfig(format!(
                "Max cluster zoom must be at most {}, got: {}",
                MAX_SUPPORTED_ZOOM, self.max_cluster_zoom
            )));
        }

        if self.min_zoom > self.max_cluster_zoom {
            return Err(ClusterError::InvalidConfig(format!(
                "Min zoom {} exceeds max cluster zoom {}",
                self.min_zoom, self.max_cluster_zoom
            )));
        }

        if self.min_points < 2 {
            return Err(ClusterError::InvalidConfig(
                "A cluster needs at least two points".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            radius_pixels: Self::default_radius_pixels(),
            extent: Self::default_extent(),
            min_zoom: 0,
            max_cluster_zoom: Self::default_max_cluster_zoom(),
            min_points: Self::default_min_points(),
        }
    }
}

/// Parameters of the render planner's update policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Fraction of the viewport span queried beyond each edge, so small pans
    /// reuse the previous primitive list.
    #[serde(default = "PlannerConfig::default_viewport_padding")]
    pub viewport_padding: f64,
}

impl PlannerConfig {
    const fn default_viewport_padding() -> f64 {
        0.5
    }

    pub fn with_viewport_padding(mut self, padding: f64) -> Self {
        self.viewport_padding = padding;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.viewport_padding.is_finite() || self.viewport_padding < 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "Viewport padding must be finite and non-negative, got: {}",
                self.viewport_padding
            )));
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            viewport_padding: Self::default_viewport_padding(),
        }
    }
}

/// Complete engine configuration.
///
/// # Example
///
/// ```rust
/// use geocluster::Config;
///
/// let json = r#"{
///     "cluster": { "radius_pixels": 60, "max_cluster_zoom": 14 },
///     "edges": "merge_unordered"
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cluster.max_cluster_zoom, 14);
/// assert_eq!(config.cluster.extent, 512.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// How repeated relationship rows between the same pair are drawn.
    #[serde(default)]
    pub edges: EdgePolicy,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Config {
    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.edges = policy;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.cluster.validate()?;
        self.planner.validate()
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
