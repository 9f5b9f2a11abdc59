//! The road schema is the input of the compute engine: a set of roads, each a polyline with lane
//! counts. It is never mutated by the engine.
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Defines in which units the positions of a schema are given.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaUnits {
    /// Positions are world positions relative to the settings origin.
    #[default]
    World,
    /// Positions are given in tiles and are scaled by the tile size of the settings.
    Tiles,
}

/// A named point that roads can reference by id, such that several roads can share it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchemaPoint {
    pub id: u32,
    pub pos: Vec2,
}

/// One entry of a road polyline: either an inline position or a reference to a [`SchemaPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathRef {
    Point(u32),
    Pos(Vec2),
}

impl From<Vec2> for PathRef {
    fn from(value: Vec2) -> Self {
        PathRef::Pos(value)
    }
}

/// Describes a single road of the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadDesc {
    pub tag: String,
    /// Number of lanes driving in the direction of the polyline.
    pub lanes_f: u8,
    /// Number of lanes driving against the direction of the polyline.
    pub lanes_b: u8,
    pub path: Vec<PathRef>,
}

impl RoadDesc {
    pub fn new<P: Into<PathRef>>(
        tag: impl Into<String>,
        lanes_f: u8,
        lanes_b: u8,
        path: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            tag: tag.into(),
            lanes_f,
            lanes_b,
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadSchema {
    pub units: SchemaUnits,
    pub points: Vec<SchemaPoint>,
    pub roads: Vec<RoadDesc>,
    /// Positions where junctions are wanted even when automatic junction creation is off.
    pub junction_tags: Vec<Vec2>,
}

impl RoadSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: SchemaUnits) -> Self {
        self.units = units;
        self
    }

    pub fn with_point(mut self, id: u32, pos: Vec2) -> Self {
        self.points.push(SchemaPoint { id, pos });
        self
    }

    pub fn with_road(mut self, road: RoadDesc) -> Self {
        self.roads.push(road);
        self
    }

    pub fn with_junction_tag(mut self, pos: Vec2) -> Self {
        self.junction_tags.push(pos);
        self
    }
}
