//! Builds road schemas from tile maps. A tile map is a grid where every tile is empty or carries
//! a piece of road, as drawn in a city builder. Straight runs of road tiles become roads, and a
//! crossing tile shared by a horizontal and a vertical run becomes a shared graph point.
use roads_api::{RoadDesc, RoadSchema, SchemaUnits};

use glam::Vec2;
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Empty,
    Horizontal,
    Vertical,
    Crossing,
}

impl Tile {
    fn connects_horizontally(self) -> bool {
        matches!(self, Tile::Horizontal | Tile::Crossing)
    }

    fn connects_vertically(self) -> bool {
        matches!(self, Tile::Vertical | Tile::Crossing)
    }

    fn as_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Horizontal => '-',
            Tile::Vertical => '|',
            Tile::Crossing => '+',
        }
    }
}

impl TryFrom<char> for Tile {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '.' => Ok(Tile::Empty),
            '-' => Ok(Tile::Horizontal),
            '|' => Ok(Tile::Vertical),
            '+' => Ok(Tile::Crossing),
            other => Err(other),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileMapError {
    #[error("unknown tile '{tile}' at row {row}, column {col}")]
    UnknownTile { tile: char, row: usize, col: usize },
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    lanes_f: u8,
    lanes_b: u8,
}

impl TileMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
            lanes_f: 1,
            lanes_b: 1,
        }
    }

    /// Sets the lane counts of every road traced from this map.
    pub fn with_lanes(mut self, lanes_f: u8, lanes_b: u8) -> Self {
        self.lanes_f = lanes_f;
        self.lanes_b = lanes_b;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `Tile::Empty` outside of the map.
    pub fn get(&self, col: usize, row: usize) -> Tile {
        if col < self.width && row < self.height {
            self.tiles[row * self.width + col]
        } else {
            Tile::Empty
        }
    }

    /// Ignored outside of the map.
    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.width && row < self.height {
            self.tiles[row * self.width + col] = tile;
        }
    }

    /// Walks one line of tiles and returns the maximal runs of at least two connecting tiles.
    /// Each run is given as its tile positions along the line.
    fn runs(len: usize, connects: impl Fn(usize) -> bool) -> Vec<(usize, usize)> {
        let mut runs = vec![];
        let mut start = None;
        for i in 0..=len {
            match (start, i < len && connects(i)) {
                (None, true) => start = Some(i),
                (Some(s), false) => {
                    if i - s >= 2 {
                        runs.push((s, i - 1));
                    }
                    start = None;
                }
                _ => {}
            }
        }
        runs
    }

    fn center(col: usize, row: usize) -> Vec2 {
        Vec2::new(col as f32 + 0.5, row as f32 + 0.5)
    }

    /// Traces all roads of the map. Positions are tile centers in tile units.
    pub fn to_schema(&self) -> RoadSchema {
        let mut schema = RoadSchema::new().with_units(SchemaUnits::Tiles);

        for row in 0..self.height {
            for (first, last) in Self::runs(self.width, |col| {
                self.get(col, row).connects_horizontally()
            }) {
                let path = (first..=last)
                    .filter(|col| {
                        *col == first || *col == last || self.get(*col, row) == Tile::Crossing
                    })
                    .map(|col| Self::center(col, row));
                schema = schema.with_road(RoadDesc::new(
                    format!("h{}", row),
                    self.lanes_f,
                    self.lanes_b,
                    path,
                ));
            }
        }
        for col in 0..self.width {
            for (first, last) in Self::runs(self.height, |row| {
                self.get(col, row).connects_vertically()
            }) {
                let path = (first..=last)
                    .filter(|row| {
                        *row == first || *row == last || self.get(col, *row) == Tile::Crossing
                    })
                    .map(|row| Self::center(col, row));
                schema = schema.with_road(RoadDesc::new(
                    format!("v{}", col),
                    self.lanes_f,
                    self.lanes_b,
                    path,
                ));
            }
        }
        log::debug!(
            "traced {} roads from a {}x{} tile map",
            schema.roads.len(),
            self.width,
            self.height
        );
        schema
    }
}

impl FromStr for TileMap {
    type Err = TileMapError;

    /// Parses one line per row. Blank lines and surrounding whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        let mut map = TileMap::new(width, lines.len());
        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(TileMapError::Ragged {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, c) in line.chars().enumerate() {
                let tile = Tile::try_from(c)
                    .map_err(|tile| TileMapError::UnknownTile { tile, row, col })?;
                map.set(col, row, tile);
            }
        }
        Ok(map)
    }
}

impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            let line: String = (0..self.width).map(|col| self.get(col, row).as_char()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
