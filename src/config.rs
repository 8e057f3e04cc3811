//! Pipeline configuration
//!
//! Defaults match the classic 6502 die dump: unit scale, six layers and a
//! 128x128 picking grid. A JSON file can override any field and command line
//! flags are applied on top of that.

use crate::draw::geometry::NodeIndex;
use crate::error::{Result, SegmeshError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default picking grid resolution along each axis
pub const DEFAULT_GRID_CELLS: u32 = 128;

/// Largest accepted picking grid resolution along each axis
pub const MAX_GRID_CELLS: u32 = 4096;

/// Upper bound on `grid_cells^2 * max_layers`, the number of per-cell
/// stacks the grid builder allocates
pub const MAX_GRID_STACKS: u64 = 1 << 26;

/// Default number of rendering layers
pub const DEFAULT_MAX_LAYERS: usize = 6;

/// Output table format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Binary,
    Json,
    MsgPack,
    C,
}

impl std::str::FromStr for OutputFormat {
    type Err = SegmeshError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(OutputFormat::Binary),
            "json" => Ok(OutputFormat::Json),
            "msgpack" | "mp" => Ok(OutputFormat::MsgPack),
            "c" => Ok(OutputFormat::C),
            other => Err(SegmeshError::InvalidConfig {
                reason: format!("unknown output format '{}'", other),
            }),
        }
    }
}

/// Folds a sparse range of source node indices down: every index at or
/// above `from` (up to the next rule) has `offset` subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRemap {
    pub from: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Multiplier applied to raw coordinates before flooring
    pub scale: f64,
    /// Picking grid cells along each axis
    pub grid_cells: u32,
    /// Records on layers at or above this index are rejected
    pub max_layers: usize,
    /// Triangulate segments on the rayon pool
    pub parallel: bool,
    pub format: OutputFormat,
    /// Node index remapping, applied before indices are narrowed to 16 bits
    pub node_remap: Vec<NodeRemap>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            grid_cells: DEFAULT_GRID_CELLS,
            max_layers: DEFAULT_MAX_LAYERS,
            parallel: true,
            format: OutputFormat::Binary,
            node_remap: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SegmeshError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let config: PipelineConfig =
            serde_json::from_str(&text).map_err(|e| SegmeshError::InvalidConfig {
                reason: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SegmeshError::InvalidConfig {
                reason: format!("scale must be a positive number, got {}", self.scale),
            });
        }
        if self.grid_cells == 0 || self.grid_cells > MAX_GRID_CELLS {
            return Err(SegmeshError::InvalidConfig {
                reason: format!("grid_cells must be in 1..={}, got {}", MAX_GRID_CELLS, self.grid_cells),
            });
        }
        if self.max_layers == 0 || self.max_layers > 256 {
            return Err(SegmeshError::InvalidConfig {
                reason: format!("max_layers must be in 1..=256, got {}", self.max_layers),
            });
        }
        let stacks = u64::from(self.grid_cells).pow(2) * self.max_layers as u64;
        if stacks > MAX_GRID_STACKS {
            return Err(SegmeshError::InvalidConfig {
                reason: format!(
                    "grid_cells {} with {} layers needs {} cell stacks, limit is {}",
                    self.grid_cells, self.max_layers, stacks, MAX_GRID_STACKS
                ),
            });
        }
        if let Some(rule) = self.node_remap.iter().find(|r| r.offset > r.from) {
            return Err(SegmeshError::InvalidConfig {
                reason: format!("node_remap offset {} exceeds its start index {}", rule.offset, rule.from),
            });
        }
        Ok(())
    }

    /// Map a source node index through `node_remap`. The rule with the
    /// highest `from` not above the index wins. `None` when the result does
    /// not fit a 16-bit node index.
    pub fn remap_node(&self, source: u32) -> Option<NodeIndex> {
        let offset = self
            .node_remap
            .iter()
            .filter(|r| r.from <= source)
            .max_by_key(|r| r.from)
            .map_or(0, |r| r.offset);
        u16::try_from(source.checked_sub(offset)?).ok().map(NodeIndex)
    }
}
