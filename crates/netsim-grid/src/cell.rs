//! Cell coordinates, grid dimensions and the neighbourhood boundary mask.

/// Integer index of a cell along each axis. Planar grids keep `z` at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CellCoord {
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn planar(x: u32, y: u32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Neighbouring coordinate. The caller guarantees it stays in bounds.
    #[must_use]
    pub(crate) const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add_signed(dx),
            y: self.y.wrapping_add_signed(dy),
            z: self.z.wrapping_add_signed(dz),
        }
    }

    #[must_use]
    pub const fn axis(self, axis: usize) -> u32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Number of cells along each axis. Planar grids have `z == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridDims {
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn axis(self, axis: usize) -> u32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    #[must_use]
    pub const fn contains(self, coord: CellCoord) -> bool {
        coord.x < self.x && coord.y < self.y && coord.z < self.z
    }

    /// Dense index of `coord`, x fastest.
    #[must_use]
    pub const fn index_of(self, coord: CellCoord) -> usize {
        (coord.z as usize * self.y as usize + coord.y as usize) * self.x as usize
            + coord.x as usize
    }

    /// Inverse of [`GridDims::index_of`].
    #[must_use]
    pub const fn coord_of(self, index: usize) -> CellCoord {
        let x = index % self.x as usize;
        let rest = index / self.x as usize;
        CellCoord {
            x: x as u32,
            y: (rest % self.y as usize) as u32,
            z: (rest / self.y as usize) as u32,
        }
    }

    /// Offsets of the 3×3×3 neighbourhood of `coord` that stay in bounds.
    #[must_use]
    pub const fn boundary_mask(self, coord: CellCoord) -> NeighborMask {
        let mut bits = NeighborMask::FULL.0;
        let mut axis = 0;
        while axis < 3 {
            let c = coord.axis(axis);
            if c == 0 {
                bits &= !half_space(axis, -1);
            }
            if c + 1 >= self.axis(axis) {
                bits &= !half_space(axis, 1);
            }
            axis += 1;
        }
        NeighborMask(bits)
    }
}

/// Offset of neighbourhood bit `bit` along `axis`, in `-1..=1`.
///
/// ```text
/// bit = (dz + 1) * 9 + (dy + 1) * 3 + (dx + 1)
/// ```
const fn offset_of(bit: u32, axis: usize) -> i32 {
    let digit = match axis {
        0 => bit % 3,
        1 => (bit / 3) % 3,
        _ => bit / 9,
    };
    digit as i32 - 1
}

/// All neighbourhood bits lying on one side (`-1` or `1`) of `axis`.
const fn half_space(axis: usize, side: i32) -> u32 {
    let mut bits = 0;
    let mut bit = 0;
    while bit < NeighborMask::CELLS {
        if offset_of(bit, axis) == side {
            bits |= 1 << bit;
        }
        bit += 1;
    }
    bits
}

/// 27-bit set over the 3×3×3 neighbourhood of a cell, centre included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborMask(u32);

impl NeighborMask {
    const CELLS: u32 = 27;
    const LAYER_BITS: u32 = 9;

    /// Every cell of the neighbourhood.
    pub const FULL: Self = Self((1 << Self::CELLS) - 1);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Number of cells in the mask.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// The 3×3 slice at `dz` (`-1..=1`), bit `(dy + 1) * 3 + (dx + 1)`.
    #[must_use]
    pub const fn layer(self, dz: i32) -> u16 {
        let shift = (dz + 1) as u32 * Self::LAYER_BITS;
        ((self.0 >> shift) & ((1 << Self::LAYER_BITS) - 1)) as u16
    }

    /// In-plane offsets `(dx, dy)` of layer bit `bit`.
    #[must_use]
    pub const fn layer_offset(bit: u32) -> (i32, i32) {
        (offset_of(bit, 0), offset_of(bit, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip_covers_grid() {
        let dims = GridDims::new(4, 3, 2);
        for index in 0..dims.cell_count() {
            let coord = dims.coord_of(index);
            assert!(dims.contains(coord));
            assert_eq!(dims.index_of(coord), index);
        }
    }

    #[test]
    fn test_half_spaces() {
        // Nine cells on each face of the cube.
        for axis in 0..3 {
            assert_eq!(half_space(axis, -1).count_ones(), 9);
            assert_eq!(half_space(axis, 1).count_ones(), 9);
            assert_eq!(half_space(axis, -1) & half_space(axis, 1), 0);
        }
        assert_eq!(half_space(0, -1) & 1, 1);
    }

    #[test]
    fn test_interior_cell_keeps_full_mask() {
        let dims = GridDims::new(5, 5, 5);
        assert_eq!(dims.boundary_mask(CellCoord::new(2, 2, 2)), NeighborMask::FULL);
        assert_eq!(NeighborMask::FULL.count(), 27);
    }

    #[test]
    fn test_planar_masks() {
        let dims = GridDims::new(10, 10, 1);

        let interior = dims.boundary_mask(CellCoord::planar(4, 4));
        assert_eq!(interior.count(), 9);
        assert_eq!(interior.layer(-1), 0);
        assert_eq!(interior.layer(1), 0);
        assert_eq!(interior.layer(0), 0x1FF);

        let corner = dims.boundary_mask(CellCoord::planar(0, 0));
        assert_eq!(corner.count(), 4);
        // (dx, dy) in {0, 1}²: bits 4, 5, 7, 8.
        assert_eq!(corner.layer(0), (1 << 4) | (1 << 5) | (1 << 7) | (1 << 8));

        let far_corner = dims.boundary_mask(CellCoord::planar(9, 9));
        assert_eq!(far_corner.layer(0), (1 << 0) | (1 << 1) | (1 << 3) | (1 << 4));

        let edge = dims.boundary_mask(CellCoord::planar(0, 5));
        assert_eq!(edge.count(), 6);
    }

    #[test]
    fn test_volumetric_corner_and_edge() {
        let dims = GridDims::new(3, 3, 3);
        assert_eq!(dims.boundary_mask(CellCoord::new(0, 0, 0)).count(), 8);
        assert_eq!(dims.boundary_mask(CellCoord::new(2, 2, 2)).count(), 8);
        assert_eq!(dims.boundary_mask(CellCoord::new(1, 0, 0)).count(), 12);
        assert_eq!(dims.boundary_mask(CellCoord::new(1, 1, 0)).count(), 18);
    }

    #[test]
    fn test_single_cell_grid() {
        let dims = GridDims::new(1, 1, 1);
        let mask = dims.boundary_mask(CellCoord::default());
        assert_eq!(mask.count(), 1);
        assert_eq!(mask.layer(0), 1 << 4);
    }

    #[test]
    fn test_layer_offsets() {
        assert_eq!(NeighborMask::layer_offset(0), (-1, -1));
        assert_eq!(NeighborMask::layer_offset(4), (0, 0));
        assert_eq!(NeighborMask::layer_offset(5), (1, 0));
        assert_eq!(NeighborMask::layer_offset(7), (0, 1));
    }
}
