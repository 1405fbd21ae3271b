//! Rack layout for the 3D warehouse view
//!
//! Only geometry and colours are computed here; drawing is left to the client.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Position, PositionState};

/// Horizontal gap between consecutive racks
pub const RACK_SPACING: f64 = 30.0;
/// Distance between column centres
pub const COLUMN_SPACING: f64 = 3.5;
/// Distance between level floors
pub const LEVEL_HEIGHT: f64 = 2.0;
/// Distance between depth rows
pub const DEPTH_SPACING: f64 = 4.0;
/// Width, height, length of one cell box
pub const CELL_SIZE: [f64; 3] = [2.8, 1.5, 2.0];

pub const COLOR_OCCUPIED: &str = "#ef4444";
pub const COLOR_AVAILABLE: &str = "#22c55e";
pub const COLOR_SELECTED: &str = "#0088ff";

/// Colour for a position's occupancy state
pub fn position_color(state: PositionState) -> &'static str {
    match state {
        PositionState::Occupied => COLOR_OCCUPIED,
        PositionState::Available => COLOR_AVAILABLE,
    }
}

/// Filters applied before laying out the scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionFilter {
    pub warehouse_id: Option<Uuid>,
    pub rack: Option<String>,
    pub column: Option<String>,
    pub level: Option<i32>,
}

impl PositionFilter {
    pub fn matches(&self, position: &Position) -> bool {
        self.warehouse_id.map_or(true, |w| position.warehouse_id == w)
            && self.rack.as_deref().map_or(true, |r| position.rack == r)
            && self.column.as_deref().map_or(true, |c| position.column == c)
            && self.level.map_or(true, |l| position.level == l)
    }
}

/// One cell box in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellBox {
    pub position_id: Uuid,
    pub center: [f64; 3],
    pub size: [f64; 3],
    pub color: String,
    pub label: String,
    pub pallet_id: Option<Uuid>,
}

/// All cells belonging to one rack, already offset along x
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackGroup {
    pub rack: String,
    pub offset_x: f64,
    pub cells: Vec<CellBox>,
}

/// Scene handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RackScene {
    pub racks: Vec<RackGroup>,
    /// Distinct values for the filter pickers
    pub rack_options: Vec<String>,
    pub column_options: Vec<String>,
    pub level_options: Vec<i32>,
}

/// Lay out the filtered positions as coloured boxes grouped by rack
pub fn layout_racks(
    positions: &[Position],
    filter: &PositionFilter,
    selected: Option<Uuid>,
) -> RackScene {
    let mut groups: BTreeMap<&str, Vec<&Position>> = BTreeMap::new();
    for position in positions.iter().filter(|p| filter.matches(p)) {
        groups.entry(position.rack.as_str()).or_default().push(position);
    }

    let racks = groups
        .into_iter()
        .enumerate()
        .map(|(index, (rack, members))| RackGroup {
            rack: rack.to_string(),
            offset_x: index as f64 * RACK_SPACING,
            cells: members
                .into_iter()
                .map(|p| cell_for(p, selected == Some(p.id)))
                .collect(),
        })
        .collect();

    let rack_options: BTreeSet<&str> = positions.iter().map(|p| p.rack.as_str()).collect();
    let column_options: BTreeSet<&str> = positions.iter().map(|p| p.column.as_str()).collect();
    let level_options: BTreeSet<i32> = positions.iter().map(|p| p.level).collect();

    RackScene {
        racks,
        rack_options: rack_options.into_iter().map(String::from).collect(),
        column_options: column_options.into_iter().map(String::from).collect(),
        level_options: level_options.into_iter().collect(),
    }
}

fn cell_for(position: &Position, is_selected: bool) -> CellBox {
    let coordinate = position.coordinate();
    let color = if is_selected {
        COLOR_SELECTED
    } else {
        position_color(position.state)
    };
    CellBox {
        position_id: position.id,
        center: [
            coordinate.column_index() as f64 * COLUMN_SPACING,
            (position.level - 1) as f64 * LEVEL_HEIGHT + 1.0,
            (position.depth - 1) as f64 * DEPTH_SPACING,
        ],
        size: CELL_SIZE,
        color: color.to_string(),
        label: position.label(),
        pallet_id: position.pallet_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn position(warehouse_id: Uuid, rack: &str, column: &str, level: i32, depth: i32, state: PositionState) -> Position {
        Position {
            id: Uuid::new_v4(),
            warehouse_id,
            rack: rack.to_string(),
            column: column.to_string(),
            level,
            depth,
            state,
            pallet_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cell_geometry() {
        let w = Uuid::new_v4();
        let positions = vec![position(w, "A", "C", 2, 3, PositionState::Occupied)];
        let scene = layout_racks(&positions, &PositionFilter::default(), None);

        let cell = &scene.racks[0].cells[0];
        assert_eq!(cell.center, [7.0, 3.0, 8.0]);
        assert_eq!(cell.size, CELL_SIZE);
        assert_eq!(cell.color, COLOR_OCCUPIED);
    }

    #[test]
    fn test_racks_are_offset_in_order() {
        let w = Uuid::new_v4();
        let positions = vec![
            position(w, "B", "A", 1, 1, PositionState::Available),
            position(w, "A", "A", 1, 1, PositionState::Available),
        ];
        let scene = layout_racks(&positions, &PositionFilter::default(), None);
        assert_eq!(scene.racks.len(), 2);
        assert_eq!(scene.racks[0].rack, "A");
        assert_eq!(scene.racks[0].offset_x, 0.0);
        assert_eq!(scene.racks[1].rack, "B");
        assert_eq!(scene.racks[1].offset_x, RACK_SPACING);
    }

    #[test]
    fn test_filter_and_selection() {
        let w1 = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let positions = vec![
            position(w1, "A", "A", 1, 1, PositionState::Available),
            position(w1, "A", "B", 2, 1, PositionState::Available),
            position(w2, "A", "A", 1, 1, PositionState::Occupied),
        ];
        let selected = positions[1].id;
        let filter = PositionFilter {
            warehouse_id: Some(w1),
            ..Default::default()
        };
        let scene = layout_racks(&positions, &filter, Some(selected));

        let cells = &scene.racks[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].color, COLOR_AVAILABLE);
        assert_eq!(cells[1].color, COLOR_SELECTED);

        // Picker options come from the unfiltered list
        assert_eq!(scene.column_options, vec!["A", "B"]);
        assert_eq!(scene.level_options, vec![1, 2]);

        let by_level = PositionFilter {
            level: Some(2),
            ..Default::default()
        };
        assert_eq!(layout_racks(&positions, &by_level, None).racks[0].cells.len(), 1);
    }
}
