//! Core type definitions for the simulation.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row/column coordinate of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shift by a signed offset, returning `None` if either axis leaves `[0, size)`
    pub fn offset(&self, dr: isize, dc: isize, size: usize) -> Option<Self> {
        let row = self.row.checked_add_signed(dr).filter(|r| *r < size)?;
        let col = self.col.checked_add_signed(dc).filter(|c| *c < size)?;
        Some(Self { row, col })
    }

    /// Shift by a signed offset with toroidal wrapping.
    ///
    /// For `size < 3` different offsets can land on the same cell.
    pub fn wrap(&self, dr: isize, dc: isize, size: usize) -> Self {
        let n = size as isize;
        Self {
            row: ((self.row as isize + dr) % n + n) as usize % size,
            col: ((self.col as isize + dc) % n + n) as usize % size,
        }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The eight Moore-neighborhood offsets, `(0, 0)` excluded
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// How neighbor lookups treat positions past the grid edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Out-of-range neighbors count as dead
    #[default]
    Bounded,
    /// Opposite edges are adjacent
    Toroidal,
}

impl FromStr for EdgePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" | "clamped" => Ok(EdgePolicy::Bounded),
            "toroidal" | "wrap" => Ok(EdgePolicy::Toroidal),
            other => Err(Error::InvalidConfig(format!("unknown edge policy: {}", other))),
        }
    }
}

/// RGBA8 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);
    pub const PURPLE: Rgba = Rgba([0x80, 0x00, 0x80, 0xff]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_bounds() {
        let corner = CellPos::new(0, 0);
        assert_eq!(corner.offset(-1, 0, 5), None);
        assert_eq!(corner.offset(0, -1, 5), None);
        assert_eq!(corner.offset(1, 1, 5), Some(CellPos::new(1, 1)));

        let far = CellPos::new(4, 4);
        assert_eq!(far.offset(1, 0, 5), None);
        assert_eq!(far.offset(-1, -1, 5), Some(CellPos::new(3, 3)));
    }

    #[test]
    fn test_wrap() {
        let corner = CellPos::new(0, 0);
        assert_eq!(corner.wrap(-1, -1, 10), CellPos::new(9, 9));

        let far = CellPos::new(9, 9);
        assert_eq!(far.wrap(1, 1, 10), CellPos::new(0, 0));
        assert_eq!(far.wrap(-1, 0, 10), CellPos::new(8, 9));
    }

    #[test]
    fn test_edge_policy_parse() {
        assert_eq!("bounded".parse::<EdgePolicy>().unwrap(), EdgePolicy::Bounded);
        assert_eq!("Toroidal".parse::<EdgePolicy>().unwrap(), EdgePolicy::Toroidal);
        assert!("spherical".parse::<EdgePolicy>().is_err());
        assert_eq!(EdgePolicy::default(), EdgePolicy::Bounded);
    }

    #[test]
    fn test_neighbor_offsets_exclude_center() {
        assert!(!NEIGHBOR_OFFSETS.contains(&(0, 0)));
        assert_eq!(NEIGHBOR_OFFSETS.len(), 8);
    }
}
