//! Tower layout
//!
//! Rows alternate between blocks lying along X and blocks lying along Z, so
//! each row rests crosswise on the one below. Columns are spread symmetrically
//! around the tower axis.

use glam::{Quat, Vec3};

use crate::config::TowerConfig;
use crate::error::{Result, SimError};

/// Where one block of the tower goes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockPlacement {
    pub row: u32,
    pub column: u32,
    /// Center relative to the scene root
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    /// Even rows lie along X, odd rows along Z
    pub is_even_row: bool,
}

impl BlockPlacement {
    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.half_extents * 2.0
    }
}

/// Placement of the block at `(row, column)`
pub fn place(tower: &TowerConfig, row: u32, column: u32) -> Result<BlockPlacement> {
    if row >= tower.rows || column >= tower.columns {
        return Err(SimError::OutOfBounds {
            row,
            column,
            rows: tower.rows,
            columns: tower.columns,
        });
    }
    Ok(place_unchecked(tower, row, column))
}

fn place_unchecked(tower: &TowerConfig, row: u32, column: u32) -> BlockPlacement {
    let is_even_row = row % 2 == 0;
    let breadth = tower.block_breadth();

    let y = (tower.block_height + tower.gap) * (row + 1) as f32;
    let centered = column as f32 - (tower.columns as f32 - 1.0) / 2.0;
    let offset = (tower.block_width + tower.gap) * centered;

    let (position, half_extents) = if is_even_row {
        (
            Vec3::new(0.0, y, offset),
            Vec3::new(breadth, tower.block_height, tower.block_width) * 0.5,
        )
    } else {
        (
            Vec3::new(offset, y, 0.0),
            Vec3::new(tower.block_width, tower.block_height, breadth) * 0.5,
        )
    };

    BlockPlacement {
        row,
        column,
        position,
        rotation: Quat::IDENTITY,
        half_extents,
        is_even_row,
    }
}

/// Every placement of the tower in row-major order
pub fn placements(tower: &TowerConfig) -> Placements<'_> {
    Placements {
        tower,
        row: 0,
        column: 0,
    }
}

/// Row-major iterator over a tower's placements
#[derive(Clone, Debug)]
pub struct Placements<'a> {
    tower: &'a TowerConfig,
    row: u32,
    column: u32,
}

impl Iterator for Placements<'_> {
    type Item = BlockPlacement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tower.columns == 0 || self.row >= self.tower.rows {
            return None;
        }
        let placement = place_unchecked(self.tower, self.row, self.column);
        self.column += 1;
        if self.column == self.tower.columns {
            self.column = 0;
            self.row += 1;
        }
        Some(placement)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.tower.columns == 0 || self.row >= self.tower.rows {
            0
        } else {
            let rows_left = (self.tower.rows - self.row) as usize;
            rows_left * self.tower.columns as usize - self.column as usize
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Placements<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_row_lies_along_x() {
        let tower = TowerConfig::default();
        let placement = place(&tower, 0, 0).unwrap();

        assert!(placement.is_even_row);
        assert_relative_eq!(placement.position.y, 3.07, epsilon = 1e-5);
        assert_eq!(placement.position.x, 0.0);
        assert_relative_eq!(placement.position.z, -5.07, epsilon = 1e-5);
        assert_eq!(placement.size(), Vec3::new(15.0, 3.0, 5.0));
        assert_eq!(placement.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_second_row_lies_along_z() {
        let tower = TowerConfig::default();
        let placement = place(&tower, 1, 2).unwrap();

        assert!(!placement.is_even_row);
        assert_relative_eq!(placement.position.y, 6.14, epsilon = 1e-5);
        assert_relative_eq!(placement.position.x, 5.07, epsilon = 1e-5);
        assert_eq!(placement.position.z, 0.0);
        assert_eq!(placement.size(), Vec3::new(5.0, 3.0, 15.0));
    }

    #[test]
    fn test_height_depends_only_on_row() {
        let tower = TowerConfig::default();
        let mut previous = f32::NEG_INFINITY;
        for row in 0..tower.rows {
            let y = place(&tower, row, 0).unwrap().position.y;
            for column in 1..tower.columns {
                assert_eq!(place(&tower, row, column).unwrap().position.y, y);
            }
            assert!(y > previous);
            previous = y;
        }
    }

    #[test]
    fn test_orientation_alternates_by_parity() {
        let tower = TowerConfig::default();
        for placement in placements(&tower) {
            assert_eq!(placement.is_even_row, placement.row % 2 == 0);
        }
    }

    #[test]
    fn test_horizontal_offset_depends_on_column_and_parity() {
        let tower = TowerConfig::default();
        let even = place(&tower, 0, 1).unwrap();
        let even_higher = place(&tower, 4, 1).unwrap();
        let odd = place(&tower, 3, 1).unwrap();

        assert_eq!((even.position.x, even.position.z), (even_higher.position.x, even_higher.position.z));
        assert_eq!(even.position.z, odd.position.x);
    }

    #[test]
    fn test_even_column_count_is_symmetric() {
        let tower = TowerConfig::grid(2, 2);
        let left = place(&tower, 0, 0).unwrap();
        let right = place(&tower, 0, 1).unwrap();

        assert_relative_eq!(left.position.z, -right.position.z, epsilon = 1e-6);
        assert_relative_eq!(right.position.z, 2.535, epsilon = 1e-5);
        assert_eq!(left.size(), Vec3::new(10.0, 3.0, 5.0));
    }

    #[test]
    fn test_out_of_bounds() {
        let tower = TowerConfig::grid(2, 3);
        assert!(matches!(place(&tower, 2, 0), Err(SimError::OutOfBounds { row: 2, .. })));
        assert!(matches!(place(&tower, 0, 3), Err(SimError::OutOfBounds { column: 3, .. })));
    }

    #[test]
    fn test_placements_are_row_major() {
        let tower = TowerConfig::grid(3, 2);
        let iter = placements(&tower);
        assert_eq!(iter.len(), 6);

        let order: Vec<(u32, u32)> = iter.map(|p| (p.row, p.column)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }
}
