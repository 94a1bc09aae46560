//! Panel Composer: lays out one recipe display panel on a fresh grid.
//!
//! Order of operations:
//! 1. Fixed chrome (fuel slot, energy bar, ...) at caller-given cells.
//! 2. `top_row_slots` cells along row 0.
//! 3. `reserved_columns` leading columns, for every grid row.
//! 4. Each placement group in turn, packed with `next_available` from index 0.
//!
//! The panel is sized to the grid's bounding box once everything is placed.
//! Any allocation failure aborts the whole panel.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::layout::descriptor::{Placeable, PlaceableKind};
use crate::layout::grid::{Cell, Grid, GridConfig, LayoutError, Reservation};

// ────────────────────────────────────────────────────────────────────────────
// Plan types
// ────────────────────────────────────────────────────────────────────────────

/// A chrome element pinned at a known cell. `span > 1` claims cells above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedElement {
    pub label: String,
    pub x: u32,
    pub y: u32,
    #[serde(default = "default_span")]
    pub span: u32,
}

/// Entries placed as one left-to-right sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementGroup {
    pub label: String,
    #[serde(default)]
    pub entries: Vec<Placeable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelPlan {
    pub fixed: Vec<FixedElement>,
    pub top_row_slots: u32,
    pub reserved_columns: u32,
    pub groups: Vec<PlacementGroup>,
    /// Tiles a fluid occupies. Fluids render at item size, so this is 1 unless a
    /// panel draws fluids as tanks.
    pub fluid_span: u32,
    /// Where the progress arrow is drawn. Defaults to the canvas center.
    pub progress: Option<Cell>,
}

impl Default for PanelPlan {
    fn default() -> Self {
        PanelPlan {
            fixed: Vec::new(),
            top_row_slots: 0,
            reserved_columns: 0,
            groups: Vec::new(),
            fluid_span: default_span(),
            progress: None,
        }
    }
}

fn default_span() -> u32 {
    1
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub group: String,
    pub placeable: Placeable,
    /// Bottom cell when `span > 1`.
    pub cell: Cell,
    pub span: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
    pub progress: Cell,
    pub placements: Vec<Placement>,
    pub reservations: Vec<Reservation>,
}

// ────────────────────────────────────────────────────────────────────────────
// Composition
// ────────────────────────────────────────────────────────────────────────────

pub fn compose_panel(config: &GridConfig, plan: &PanelPlan) -> Result<PanelLayout, LayoutError> {
    let mut grid = Grid::new(config.clone())?;
    let tile = grid.tile_size();

    for element in &plan.fixed {
        if element.span > 1 {
            grid.reserve_run(element.x, element.y, &element.label, element.span)?;
        } else {
            grid.reserve(element.x, element.y, &element.label)?;
        }
    }

    for slot in 0..plan.top_row_slots {
        grid.reserve(slot.saturating_mul(tile), 0, "top row")?;
    }

    for column in 0..plan.reserved_columns {
        let label = format!("column {column}");
        for row in 0..grid.rows() {
            grid.reserve(column.saturating_mul(tile), row * tile, &label)?;
        }
    }

    let fluid_span = plan.fluid_span.max(1);
    let mut placements = Vec::new();

    for group in &plan.groups {
        for (index, placeable) in group.entries.iter().enumerate() {
            let label = format!("{} {}", group.label, placeable);
            let (cell, span) = if placeable.kind == PlaceableKind::Fluid && fluid_span > 1 {
                (grid.next_available_run(index, &label, fluid_span)?, fluid_span)
            } else {
                (grid.next_available(index, &label)?, 1)
            };
            placements.push(Placement {
                group: group.label.clone(),
                placeable: placeable.clone(),
                cell,
                span,
            });
        }
    }

    let bounds = grid.bounding_box();
    debug!(
        width = bounds.width,
        height = bounds.height,
        placements = placements.len(),
        reservations = grid.reservations().len(),
        "composed panel"
    );

    if config.dump_reservations {
        for r in grid.reservations() {
            info!(x = r.cell.x, y = r.cell.y, label = %r.label, "reserved position");
        }
    }

    Ok(PanelLayout {
        width: bounds.width,
        height: bounds.height,
        columns: grid.columns(),
        rows: grid.rows(),
        progress: plan
            .progress
            .unwrap_or_else(|| Cell::new(config.width().center(), config.height().center())),
        placements,
        reservations: grid.reservations().to_vec(),
    })
}
