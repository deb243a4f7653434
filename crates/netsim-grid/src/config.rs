//! Grid construction parameters.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, GridDims};

/// Upper bound on pre-allocated cells; every cell is a list header.
const MAX_CELLS: f64 = (1_u64 << 32) as f64;

/// Deployment volume and cell size.
///
/// `depth: None` builds a planar grid. `cell_side` must be the maximum
/// connectivity range of the simulation; anything smaller breaks the
/// candidate superset guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub cell_side: Option<f64>,
    /// Keep a node's slot reserved in the cell it left most recently, for a
    /// later return. Leaving another cell releases the earlier reservation.
    #[serde(default)]
    pub keep_cell_tokens: bool,
}

impl GridConfig {
    /// Planar deployment area of `width` × `height`.
    #[must_use]
    pub const fn planar(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            depth: None,
            cell_side: None,
            keep_cell_tokens: false,
        }
    }

    /// Deployment volume of `width` × `height` × `depth`.
    #[must_use]
    pub const fn volumetric(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth: Some(depth),
            cell_side: None,
            keep_cell_tokens: false,
        }
    }

    #[must_use]
    pub const fn with_cell_side(mut self, cell_side: f64) -> Self {
        self.cell_side = Some(cell_side);
        self
    }

    #[must_use]
    pub const fn with_keep_cell_tokens(mut self, keep: bool) -> Self {
        self.keep_cell_tokens = keep;
        self
    }

    #[must_use]
    pub const fn is_planar(&self) -> bool {
        self.depth.is_none()
    }

    /// Check the parameters and derive the grid shape.
    pub fn validate(&self) -> Result<GridShape, ConfigError> {
        let cell_side = self.cell_side.ok_or(ConfigError::MissingCellSide)?;
        if !(cell_side.is_finite() && cell_side > 0.0) {
            return Err(ConfigError::InvalidCellSide(cell_side));
        }

        let width = positive_extent('x', self.width)?;
        let height = positive_extent('y', self.height)?;
        let depth = match self.depth {
            Some(depth) => positive_extent('z', depth)?,
            None => 0.0,
        };

        // A tiny extent over a huge side can underflow to zero cells.
        let cells_x = (width / cell_side).ceil().max(1.0);
        let cells_y = (height / cell_side).ceil().max(1.0);
        let cells_z = if self.is_planar() {
            1.0
        } else {
            (depth / cell_side).ceil().max(1.0)
        };
        let cells = cells_x * cells_y * cells_z;
        if cells > MAX_CELLS {
            return Err(ConfigError::TooManyCells { cells });
        }

        Ok(GridShape {
            dims: GridDims::new(cells_x as u32, cells_y as u32, cells_z as u32),
            extent: [width, height, depth],
            cell_side,
            planar: self.is_planar(),
        })
    }
}

fn positive_extent(axis: char, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidExtent { axis, value })
    }
}

/// Validated grid geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridShape {
    pub dims: GridDims,
    /// Extent per axis; `0.0` on z for planar grids.
    pub extent: [f64; 3],
    pub cell_side: f64,
    pub planar: bool,
}
