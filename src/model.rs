use crate::error::RulesError;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable identity of a fish for its whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FishId(pub u64);

impl fmt::Display for FishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl<'de> Deserialize<'de> for FishId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        uint64::deserialize(d).map(FishId)
    }
}

/// Contract integers arrive either as JSON numbers or as decimal strings
/// (cosmwasm `Uint64`).
mod uint64 {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Num(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }

    pub(super) fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Num(n)) => Ok(Some(n)),
            Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
        }
    }
}

/// One fish as reported by the contract. Two records describe the same fish
/// when their ids match, whatever the other fields say.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FishRecord {
    pub id: FishId,
    pub name: String,
    #[serde(alias = "colour", default)]
    pub colour_hue: u16,
    #[serde(default)]
    pub dead: bool,
    #[serde(default, deserialize_with = "uint64::option", skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, deserialize_with = "uint64::option", skip_serializing_if = "Option::is_none")]
    pub seconds_since_fed: Option<u64>,
}

impl FishRecord {
    pub fn new(id: u64, name: impl Into<String>, colour_hue: u16) -> Self {
        Self {
            id: FishId(id),
            name: name.into(),
            colour_hue,
            dead: false,
            age: None,
            seconds_since_fed: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggedSnapshot {
    AllFishStatus(Vec<FishRecord>),
    MyFishStatus(Vec<FishRecord>),
}

/// Accepted payload shapes for a snapshot.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum Snapshot {
    Bare(Vec<FishRecord>),
    Tagged(TaggedSnapshot),
}

impl Snapshot {
    pub fn parse(text: &str) -> serde_json::Result<Vec<FishRecord>> {
        serde_json::from_str::<Snapshot>(text).map(Snapshot::into_records)
    }

    pub fn into_records(self) -> Vec<FishRecord> {
        match self {
            Snapshot::Bare(v) => v,
            Snapshot::Tagged(TaggedSnapshot::AllFishStatus(v))
            | Snapshot::Tagged(TaggedSnapshot::MyFishStatus(v)) => v,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::LeftToRight => 1.0,
            Direction::RightToLeft => -1.0,
        }
    }

    pub fn faces_left(self) -> bool {
        matches!(self, Direction::RightToLeft)
    }
}

/// Immutable per-actor draws made at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub direction: Direction,
    pub lane_pct: u8,
    pub speed: u32,
    pub size: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankRules {
    pub tick_ms: u64,
    pub lane_min_pct: u8,
    pub lane_max_pct: u8,
    pub speed_min: u32, // px per tick
    pub speed_max: u32,
    pub size_min: u32, // px
    pub size_max: u32,
    pub initial_offset_px: u32,
    pub exit_margin_px: u32,
    pub retire_dead: bool,
}

impl Default for TankRules {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            lane_min_pct: 15,
            lane_max_pct: 85,
            speed_min: 2,
            speed_max: 6,
            size_min: 13,
            size_max: 112,
            initial_offset_px: 100,
            exit_margin_px: 200,
            retire_dead: true,
        }
    }
}

impl TankRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.tick_ms == 0 {
            return Err(RulesError::ZeroTick);
        }
        if self.lane_max_pct > 100 {
            return Err(RulesError::LaneOutOfBounds(self.lane_max_pct));
        }
        let ranges = [
            ("lane", self.lane_min_pct as u32, self.lane_max_pct as u32),
            ("speed", self.speed_min, self.speed_max),
            ("size", self.size_min, self.size_max),
        ];
        for (field, min, max) in ranges {
            if min > max {
                return Err(RulesError::EmptyRange { field, min, max });
            }
        }
        if self.initial_offset_px >= self.exit_margin_px {
            return Err(RulesError::OffsetNotInsideMargin {
                offset: self.initial_offset_px,
                margin: self.exit_margin_px,
            });
        }
        if self.exit_margin_px <= self.size_max {
            return Err(RulesError::MarginTooNarrow {
                margin: self.exit_margin_px,
                size_max: self.size_max,
            });
        }
        Ok(())
    }
}
