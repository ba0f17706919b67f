//! Geography parsing: a rectangular block of terrain codes enclosed by water.
//!
//! ```
//! use biosim_logic::geography::Geography;
//! use biosim_logic::terrain::Terrain;
//!
//! let geo = Geography::parse("WWW\nWLW\nWWW").unwrap();
//! assert_eq!(geo.rows(), 3);
//! assert_eq!(geo.terrain_at(2, 2), Some(Terrain::Lowland));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeographyError {
    #[error("geography is empty")]
    Empty,
    #[error("unknown terrain code {code:?} at ({row}, {col})")]
    UnknownTerrain { code: char, row: usize, col: usize },
    #[error("row {row} has length {found}, expected {expected}")]
    UnevenRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("border cell ({row}, {col}) is not water")]
    OpenBorder { row: usize, col: usize },
}

/// Validated terrain grid. Coordinates are 1-based: `(1, 1)` is the top-left
/// character of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
    grid: Vec<Vec<Terrain>>,
}

impl Geography {
    /// Parse and validate a geography string.
    ///
    /// Blank lines before the first row and after the last are dropped, and
    /// the indentation shared by every row is removed, so indented
    /// multi-line literals work as-is. Anything else, including a blank line
    /// between rows or a row indented differently from the rest, is part of
    /// the map and fails validation.
    pub fn parse(text: &str) -> Result<Self, GeographyError> {
        let lines = dedent(text);
        if lines.is_empty() {
            return Err(GeographyError::Empty);
        }

        let width = lines[0].chars().count();
        for (r, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GeographyError::UnevenRows {
                    row: r + 1,
                    expected: width,
                    found,
                });
            }
        }

        let mut grid = Vec::with_capacity(lines.len());
        for (r, line) in lines.iter().enumerate() {
            let row = line
                .chars()
                .enumerate()
                .map(|(c, code)| {
                    Terrain::from_code(code).ok_or(GeographyError::UnknownTerrain {
                        code,
                        row: r + 1,
                        col: c + 1,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            grid.push(row);
        }

        let height = grid.len();
        for (r, row) in grid.iter().enumerate() {
            for (c, terrain) in row.iter().enumerate() {
                let on_border = r == 0 || r + 1 == height || c == 0 || c + 1 == width;
                if on_border && *terrain != Terrain::Water {
                    return Err(GeographyError::OpenBorder {
                        row: r + 1,
                        col: c + 1,
                    });
                }
            }
        }

        Ok(Self { grid })
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Terrain at a 1-based coordinate, `None` outside the grid.
    pub fn terrain_at(&self, row: usize, col: usize) -> Option<Terrain> {
        let r = row.checked_sub(1)?;
        let c = col.checked_sub(1)?;
        self.grid.get(r)?.get(c).copied()
    }

    /// All coordinates with their terrain, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), Terrain)> + '_ {
        self.grid.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, terrain)| ((r + 1, c + 1), *terrain))
        })
    }
}

/// Map rows with outer blank lines dropped and the common indentation
/// removed. Whitespace-only rows inside the map come back empty.
fn dedent(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let Some(first) = lines.iter().position(|line| !line.is_empty()) else {
        return Vec::new();
    };
    let last = lines.iter().rposition(|line| !line.is_empty()).unwrap_or(first);
    let rows = &lines[first..=last];

    let margin = rows
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    rows.iter()
        .map(|&line| line.get(margin..).unwrap_or(line))
        .collect()
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.grid.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for terrain in row {
                write!(f, "{}", terrain.code())?;
            }
        }
        Ok(())
    }
}
