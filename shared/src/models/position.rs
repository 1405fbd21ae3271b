//! Warehouse position (slot) models and the range generator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::UnknownVariant;

/// Default cap on the number of positions one range request may create
pub const DEFAULT_MAX_POSITIONS_PER_RANGE: usize = 10_000;

/// Occupancy state of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionState {
    #[default]
    Available,
    Occupied,
}

impl PositionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionState::Available => "AVAILABLE",
            PositionState::Occupied => "OCCUPIED",
        }
    }
}

impl std::str::FromStr for PositionState {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(PositionState::Available),
            "OCCUPIED" => Ok(PositionState::Occupied),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Coordinate of a slot inside a warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotCoordinate {
    pub rack: char,
    pub column: char,
    pub level: i32,
    pub depth: i32,
}

impl SlotCoordinate {
    /// Compact code used in pickers and stock listings (e.g. `AC21`)
    pub fn code(&self) -> String {
        format!("{}{}{}{}", self.rack, self.column, self.level, self.depth)
    }

    /// Zero-based column index (`A` is 0)
    pub fn column_index(&self) -> i32 {
        self.column as i32 - 'A' as i32
    }
}

/// An addressable storage location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub rack: String,
    pub column: String,
    pub level: i32,
    pub depth: i32,
    pub state: PositionState,
    pub pallet_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Position {
    pub fn coordinate(&self) -> SlotCoordinate {
        SlotCoordinate {
            rack: first_letter(&self.rack),
            column: first_letter(&self.column),
            level: self.level,
            depth: self.depth,
        }
    }

    pub fn code(&self) -> String {
        format_position_code(&self.rack, &self.column, self.level, self.depth)
    }

    /// Full label shown on the rack view: `warehouse-rack-column-level-depth`
    pub fn label(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.warehouse_id, self.rack, self.column, self.level, self.depth
        )
    }
}

fn first_letter(s: &str) -> char {
    s.chars().next().unwrap_or('A')
}

/// Format a compact slot code from its parts
pub fn format_position_code(rack: &str, column: &str, level: i32, depth: i32) -> String {
    format!("{}{}{}{}", rack, column, level, depth)
}

/// A position row ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPosition {
    pub warehouse_id: Uuid,
    pub rack: String,
    pub column: String,
    pub level: i32,
    pub depth: i32,
    pub state: PositionState,
}

/// Input for editing a single position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePositionInput {
    pub rack: Option<String>,
    pub column: Option<String>,
    pub level: Option<i32>,
    pub depth: Option<i32>,
    pub state: Option<PositionState>,
}

/// Input for assigning a pallet to a position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPalletInput {
    pub pallet_id: Uuid,
}

/// Range of slots to create in one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRange {
    pub warehouse_id: Uuid,
    pub rack_start: String,
    pub rack_end: String,
    pub column_start: String,
    pub column_end: String,
    pub level_start: i32,
    pub level_end: i32,
    pub depth_start: i32,
    pub depth_end: i32,
    #[serde(default)]
    pub state: PositionState,
}

/// Why a range cannot be expanded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("{field} must be a single letter A-Z, got {value:?}")]
    NotALetter { field: &'static str, value: String },
    #[error("{field} must be at least 1, got {value}")]
    BelowOne { field: &'static str, value: i32 },
    #[error("{dimension} range is reversed: start is after end")]
    Reversed { dimension: &'static str },
    #[error("range would create {requested} positions, limit is {limit}")]
    TooLarge { requested: usize, limit: usize },
}

impl RangeError {
    pub fn field(&self) -> &'static str {
        match self {
            RangeError::NotALetter { field, .. } | RangeError::BelowOne { field, .. } => field,
            RangeError::Reversed { dimension } => dimension,
            RangeError::TooLarge { .. } => "range",
        }
    }
}

fn parse_letter(field: &'static str, value: &str) -> Result<char, RangeError> {
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(RangeError::NotALetter {
            field,
            value: value.to_string(),
        }),
    }
}

fn check_at_least_one(field: &'static str, value: i32) -> Result<i32, RangeError> {
    if value < 1 {
        return Err(RangeError::BelowOne { field, value });
    }
    Ok(value)
}

fn span<T: Ord>(dimension: &'static str, start: T, end: T) -> Result<(), RangeError> {
    if start > end {
        return Err(RangeError::Reversed { dimension });
    }
    Ok(())
}

impl PositionRange {
    /// Parse and check the bounds, returning them upper-cased
    fn bounds(&self) -> Result<((char, char), (char, char), (i32, i32), (i32, i32)), RangeError> {
        let racks = (
            parse_letter("rack_start", &self.rack_start)?,
            parse_letter("rack_end", &self.rack_end)?,
        );
        let columns = (
            parse_letter("column_start", &self.column_start)?,
            parse_letter("column_end", &self.column_end)?,
        );
        let levels = (
            check_at_least_one("level_start", self.level_start)?,
            check_at_least_one("level_end", self.level_end)?,
        );
        let depths = (
            check_at_least_one("depth_start", self.depth_start)?,
            check_at_least_one("depth_end", self.depth_end)?,
        );

        span("rack", racks.0, racks.1)?;
        span("column", columns.0, columns.1)?;
        span("level", levels.0, levels.1)?;
        span("depth", depths.0, depths.1)?;

        Ok((racks, columns, levels, depths))
    }

    /// Number of positions the range describes
    pub fn position_count(&self) -> Result<usize, RangeError> {
        let (racks, columns, levels, depths) = self.bounds()?;
        let count = (racks.1 as usize - racks.0 as usize + 1)
            .saturating_mul(columns.1 as usize - columns.0 as usize + 1)
            .saturating_mul((levels.1 - levels.0) as usize + 1)
            .saturating_mul((depths.1 - depths.0) as usize + 1);
        Ok(count)
    }

    /// Expand the Cartesian product rack x column x level x depth.
    ///
    /// Output is ordered rack, column, level, depth ascending and every
    /// coordinate appears exactly once.
    pub fn expand(&self, limit: usize) -> Result<Vec<NewPosition>, RangeError> {
        let requested = self.position_count()?;
        if requested > limit {
            return Err(RangeError::TooLarge { requested, limit });
        }
        let (racks, columns, levels, depths) = self.bounds()?;

        let mut positions = Vec::with_capacity(requested);
        for rack in racks.0..=racks.1 {
            for column in columns.0..=columns.1 {
                for level in levels.0..=levels.1 {
                    for depth in depths.0..=depths.1 {
                        positions.push(NewPosition {
                            warehouse_id: self.warehouse_id,
                            rack: rack.to_string(),
                            column: column.to_string(),
                            level,
                            depth,
                            state: self.state,
                        });
                    }
                }
            }
        }
        Ok(positions)
    }

    /// Form defaults: rack A, columns A-O, levels 1-3, depths 1-3
    pub fn with_defaults(warehouse_id: Uuid) -> Self {
        Self {
            warehouse_id,
            rack_start: "A".to_string(),
            rack_end: "A".to_string(),
            column_start: "A".to_string(),
            column_end: "O".to_string(),
            level_start: 1,
            level_end: 3,
            depth_start: 1,
            depth_end: 3,
            state: PositionState::Available,
        }
    }
}

/// Outcome of a bulk range insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCreationSummary {
    pub requested: usize,
    pub created: usize,
    /// Coordinates that already existed and were left untouched
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn range(racks: (&str, &str), cols: (&str, &str), levels: (i32, i32), depths: (i32, i32)) -> PositionRange {
        PositionRange {
            warehouse_id: Uuid::nil(),
            rack_start: racks.0.to_string(),
            rack_end: racks.1.to_string(),
            column_start: cols.0.to_string(),
            column_end: cols.1.to_string(),
            level_start: levels.0,
            level_end: levels.1,
            depth_start: depths.0,
            depth_end: depths.1,
            state: PositionState::Available,
        }
    }

    #[test]
    fn test_default_form_expands_to_135() {
        let positions = PositionRange::with_defaults(Uuid::nil())
            .expand(DEFAULT_MAX_POSITIONS_PER_RANGE)
            .unwrap();
        // 1 rack x 15 columns x 3 levels x 3 depths
        assert_eq!(positions.len(), 135);
        assert_eq!(positions[0].column, "A");
        assert_eq!(positions[134].column, "O");
    }

    #[test]
    fn test_expansion_order_and_uniqueness() {
        let positions = range(("A", "B"), ("A", "B"), (1, 2), (1, 1))
            .expand(DEFAULT_MAX_POSITIONS_PER_RANGE)
            .unwrap();
        let codes: Vec<String> = positions
            .iter()
            .map(|p| format_position_code(&p.rack, &p.column, p.level, p.depth))
            .collect();
        assert_eq!(
            codes,
            vec!["AA11", "AA21", "AB11", "AB21", "BA11", "BA21", "BB11", "BB21"]
        );
        let unique: HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_lowercase_letters_are_uppercased() {
        let positions = range(("b", "b"), ("c", "c"), (1, 1), (2, 2))
            .expand(DEFAULT_MAX_POSITIONS_PER_RANGE)
            .unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].rack, "B");
        assert_eq!(positions[0].column, "C");
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = range(("C", "A"), ("A", "A"), (1, 1), (1, 1))
            .expand(DEFAULT_MAX_POSITIONS_PER_RANGE)
            .unwrap_err();
        assert_eq!(err, RangeError::Reversed { dimension: "rack" });

        let err = range(("A", "A"), ("A", "A"), (3, 1), (1, 1)).position_count().unwrap_err();
        assert_eq!(err, RangeError::Reversed { dimension: "level" });
    }

    #[test]
    fn test_non_letter_rejected() {
        for bad in ["1", "", "AB", "ñ", "-"] {
            let err = range((bad, "A"), ("A", "A"), (1, 1), (1, 1)).position_count().unwrap_err();
            assert_eq!(err.field(), "rack_start", "input {:?}", bad);
        }
    }

    #[test]
    fn test_zero_level_rejected() {
        let err = range(("A", "A"), ("A", "A"), (0, 2), (1, 1)).position_count().unwrap_err();
        assert_eq!(err, RangeError::BelowOne { field: "level_start", value: 0 });
    }

    #[test]
    fn test_limit_enforced() {
        let full = range(("A", "Z"), ("A", "Z"), (1, 10), (1, 10));
        assert_eq!(full.position_count().unwrap(), 26 * 26 * 100);
        let err = full.expand(DEFAULT_MAX_POSITIONS_PER_RANGE).unwrap_err();
        assert_eq!(
            err,
            RangeError::TooLarge {
                requested: 67_600,
                limit: DEFAULT_MAX_POSITIONS_PER_RANGE,
            }
        );
    }

    #[test]
    fn test_position_code_and_label() {
        let position = Position {
            id: Uuid::new_v4(),
            warehouse_id: Uuid::nil(),
            rack: "A".to_string(),
            column: "C".to_string(),
            level: 2,
            depth: 1,
            state: PositionState::Occupied,
            pallet_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(position.code(), "AC21");
        assert_eq!(position.coordinate().column_index(), 2);
        assert_eq!(
            position.label(),
            "00000000-0000-0000-0000-000000000000-A-C-2-1"
        );
    }
}
