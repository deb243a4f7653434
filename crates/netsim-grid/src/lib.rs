//! Netsim Spatial Grid
//!
//! Uniform grid index for connectivity evaluation. With cells as wide as the
//! maximum radio range, every node in range of `A` lives in `A`'s cell or one
//! of the cells around it, so link evaluation only has to look at those
//! candidates instead of at all `n²` pairs.
//!
//! ```
//! use netsim_grid::{GridConfig, GridIndex, NodeId, Position, SimNode};
//!
//! let config = GridConfig::planar(100.0, 100.0).with_cell_side(10.0);
//! let mut grid = GridIndex::new(&config)?;
//!
//! let a = SimNode::new(NodeId(1), Position::planar(5.0, 5.0));
//! let b = SimNode::new(NodeId(2), Position::planar(95.0, 95.0));
//! grid.insert(&a)?;
//! grid.insert(&b)?;
//!
//! let candidates: Vec<NodeId> = grid.possible_neighbors(&a)?.collect();
//! assert_eq!(candidates, [NodeId(1)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod grid;
pub mod neighbors;
pub mod node;
pub mod positions;
pub mod sorted;

pub use cell::{CellCoord, GridDims, NeighborMask};
pub use config::{GridConfig, GridShape};
pub use connectivity::{ConnectivityModel, LinkStats, Links, UnitDiskGraph};
pub use error::{CapacityError, ConfigError, GridError, GridResult};
pub use grid::GridIndex;
pub use neighbors::{Candidates, NeighborCursor, PossibleNeighbors};
pub use node::{Locatable, NodeId, Position, SimNode};
pub use positions::{POSITION_SLOTS, PositionBuffer};
pub use sorted::SortedView;
