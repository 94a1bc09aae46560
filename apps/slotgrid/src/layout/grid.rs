//! Slot Grid Allocator: non-overlapping tile placement for recipe display panels.
//!
//! A `Grid` is a square-tiled canvas. Callers pin fixed chrome with `reserve` /
//! `reserve_run`, then place free elements with `tile_position` (row-major over the
//! grid's own columns) or `next_available` (left-to-right packing over the whole
//! canvas width, anchored at the first free cell).
//!
//! # Placement rules
//! - A coordinate is reserved at most once; the first label wins.
//! - Probing only moves forward. It never revisits a lower index.
//! - Any cell at or past `canvas_ceiling` (or negative) is a fatal `AllocationOverflow`.
//!
//! A grid lives for one panel: build it, fill it, read `bounding_box`, drop it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Failures raised while building or filling a grid. Neither kind is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The grid parameters cannot describe a positive number of rows and columns.
    #[error("invalid grid configuration: {reason}")]
    Configuration { reason: String },

    /// A reservation or probe landed outside `[0, ceiling)` on some axis.
    #[error("cell ({x}, {y}) lies outside the {ceiling}px canvas")]
    AllocationOverflow { x: i64, y: i64, ceiling: u32 },
}

impl LayoutError {
    fn configuration(reason: impl Into<String>) -> Self {
        LayoutError::Configuration {
            reason: reason.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_TILE_SIZE: u32 = 20;
pub const DEFAULT_CANVAS_CEILING: u32 = 256;
pub const DEFAULT_WIDTH: u32 = 80;
pub const DEFAULT_HEIGHT: u32 = 60;

/// Largest accepted `canvas_ceiling`, in pixels.
pub const MAX_CANVAS_CEILING: u32 = 4096;
/// Largest accepted canvas area, in tiles (a 256px canvas of 1px tiles).
pub const MAX_CANVAS_CELLS: u64 = 65_536;

/// Grid parameters, passed explicitly to every layout pass.
///
/// `width`/`height` are nominal canvas extents; their offsets are folded in through
/// [`Dimension::real`]. `dump_reservations` makes the panel composer log the final
/// reservation table at info level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub tile_size: u32,
    pub canvas_ceiling: u32,
    pub width: u32,
    pub width_offset: u32,
    pub height: u32,
    pub height_offset: u32,
    pub dump_reservations: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            tile_size: DEFAULT_TILE_SIZE,
            canvas_ceiling: DEFAULT_CANVAS_CEILING,
            width: DEFAULT_WIDTH,
            width_offset: 0,
            height: DEFAULT_HEIGHT,
            height_offset: 0,
            dump_reservations: false,
        }
    }
}

impl GridConfig {
    pub fn width(&self) -> Dimension {
        Dimension::new(self.width, self.width_offset)
    }

    pub fn height(&self) -> Dimension {
        Dimension::new(self.height, self.height_offset)
    }

    /// Whole tiles that fit along one canvas axis. Zero when `tile_size` is zero.
    pub fn canvas_columns(&self) -> u32 {
        self.canvas_ceiling.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Checks that the config yields a usable grid and returns `(columns, rows)`.
    ///
    /// The grid's columns must fit inside the canvas row `next_available` wraps on,
    /// and the canvas itself is capped at [`MAX_CANVAS_CEILING`] px and
    /// [`MAX_CANVAS_CELLS`] tiles.
    pub fn validate(&self) -> Result<(u32, u32), LayoutError> {
        if self.tile_size == 0 {
            return Err(LayoutError::configuration("tile size must be positive"));
        }
        if self.canvas_ceiling > MAX_CANVAS_CEILING {
            return Err(LayoutError::configuration(format!(
                "canvas ceiling {} exceeds the {MAX_CANVAS_CEILING}px limit",
                self.canvas_ceiling
            )));
        }
        if self.canvas_ceiling < self.tile_size {
            return Err(LayoutError::configuration(format!(
                "canvas ceiling {} cannot hold a single {}px tile",
                self.canvas_ceiling, self.tile_size
            )));
        }

        let canvas_columns = self.canvas_columns();
        let cells = u64::from(canvas_columns) * u64::from(canvas_columns);
        if cells > MAX_CANVAS_CELLS {
            return Err(LayoutError::configuration(format!(
                "{}px tiles on a {}px canvas make {cells} cells, over the {MAX_CANVAS_CELLS} limit",
                self.tile_size, self.canvas_ceiling
            )));
        }

        let columns = self.width().real().div_ceil(self.tile_size);
        if columns == 0 {
            return Err(LayoutError::configuration(format!(
                "width {} (offset {}) resolves to zero columns",
                self.width, self.width_offset
            )));
        }
        if columns > canvas_columns {
            return Err(LayoutError::configuration(format!(
                "{columns} columns do not fit the {canvas_columns} tiles across the canvas"
            )));
        }

        let rows = self.height().real().div_ceil(self.tile_size);
        if rows == 0 {
            return Err(LayoutError::configuration(format!(
                "height {} (offset {}) resolves to zero rows",
                self.height, self.height_offset
            )));
        }

        Ok((columns, rows))
    }
}

/// One canvas axis: a nominal extent and an offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub value: u32,
    pub offset: u32,
}

impl Dimension {
    pub fn new(value: u32, offset: u32) -> Self {
        Dimension { value, offset }
    }

    /// Usable extent: `max(value - offset, offset)`.
    pub fn real(&self) -> u32 {
        self.value.saturating_sub(self.offset).max(self.offset)
    }

    pub fn center(&self) -> u32 {
        self.real() / 2
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cells and reservations
// ────────────────────────────────────────────────────────────────────────────

/// Top-left pixel coordinate of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub fn new(x: u32, y: u32) -> Self {
        Cell { x, y }
    }
}

/// A claimed cell and the label of whatever claimed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(flatten)]
    pub cell: Cell,
    pub label: String,
}

/// Smallest origin-anchored panel size covering every reservation plus one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Grid
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    columns: u32,
    rows: u32,
    reservations: Vec<Reservation>,
    /// Cell → index into `reservations`.
    occupied: HashMap<Cell, usize>,
    /// Starting cell of the current `next_available` sequence.
    anchor: Option<Cell>,
}

impl Grid {
    pub fn new(config: GridConfig) -> Result<Self, LayoutError> {
        let (columns, rows) = config.validate()?;
        debug!(
            columns,
            rows,
            tile = config.tile_size,
            ceiling = config.canvas_ceiling,
            "grid created"
        );
        Ok(Grid {
            config,
            columns,
            rows,
            reservations: Vec::new(),
            occupied: HashMap::new(),
            anchor: None,
        })
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn tile_size(&self) -> u32 {
        self.config.tile_size
    }

    /// Columns that fit across the whole canvas; `next_available` wraps here.
    pub fn canvas_columns(&self) -> u32 {
        self.config.canvas_columns()
    }

    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    pub fn is_reserved(&self, cell: Cell) -> bool {
        self.occupied.contains_key(&cell)
    }

    #[cfg(test)]
    pub fn label_at(&self, cell: Cell) -> Option<&str> {
        self.occupied
            .get(&cell)
            .map(|&i| self.reservations[i].label.as_str())
    }

    /// Marks `(x, y)` as occupied. Re-reserving a taken coordinate is a no-op.
    pub fn reserve(&mut self, x: u32, y: u32, label: &str) -> Result<(), LayoutError> {
        let cell = self.checked_cell(i64::from(x), i64::from(y))?;
        self.insert(cell, label);
        Ok(())
    }

    /// Reserves `(x, y)` plus `length - 1` cells stacked above it (decreasing `y`).
    ///
    /// The run is checked against the canvas as a whole before any cell is claimed,
    /// so a failing run leaves the grid untouched. Grid `rows` are not consulted.
    pub fn reserve_run(
        &mut self,
        x: u32,
        y: u32,
        label: &str,
        length: u32,
    ) -> Result<(), LayoutError> {
        let cells = self.run_cells(Cell::new(x, y), length)?;
        for cell in cells {
            self.insert(cell, label);
        }
        Ok(())
    }

    /// Row-major cell for `index` over the grid's columns, probed forward past
    /// reserved cells. Claims the result when `reserve` is set.
    pub fn tile_position(
        &mut self,
        index: usize,
        label: &str,
        reserve: bool,
    ) -> Result<Cell, LayoutError> {
        let (found, cell) = self.probe(index as u64, self.columns, |grid, cell| {
            !grid.is_reserved(cell)
        })?;
        trace!(label, requested = index, found, x = cell.x, y = cell.y, "tile position");

        if reserve {
            self.insert(cell, label);
        }
        Ok(cell)
    }

    /// Sequential placement: index 0 anchors at the first free cell, later indices
    /// start `index` cells past the anchor across the full canvas width. Always
    /// claims the returned cell.
    pub fn next_available(&mut self, index: usize, label: &str) -> Result<Cell, LayoutError> {
        let start = self.sequence_start(index, label)?;
        let (_, cell) = self.probe(start, self.canvas_columns(), |grid, cell| {
            !grid.is_reserved(cell)
        })?;
        self.insert(cell, label);
        Ok(cell)
    }

    /// Like [`Grid::next_available`], but claims a vertical run of `length` cells.
    ///
    /// A candidate is accepted only when it and the cells above it are free and on
    /// the canvas. The returned cell is the bottom of the run.
    pub fn next_available_run(
        &mut self,
        index: usize,
        label: &str,
        length: u32,
    ) -> Result<Cell, LayoutError> {
        if length == 0 {
            return Err(LayoutError::configuration("run length must be at least one tile"));
        }

        let start = self.sequence_start(index, label)?;
        let (_, cell) = self.probe(start, self.canvas_columns(), |grid, cell| {
            grid.run_cells(cell, length)
                .map(|cells| cells.iter().all(|c| !grid.is_reserved(*c)))
                .unwrap_or(false)
        })?;
        self.reserve_run(cell.x, cell.y, label, length)?;
        Ok(cell)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let tile = self.config.tile_size;
        let ceiling = self.config.canvas_ceiling;
        let max_x = self.reservations.iter().map(|r| r.cell.x).max().unwrap_or(0);
        let max_y = self.reservations.iter().map(|r| r.cell.y).max().unwrap_or(0);

        BoundingBox {
            width: tile.saturating_add(max_x).min(ceiling),
            height: tile.saturating_add(max_y).min(ceiling),
        }
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn insert(&mut self, cell: Cell, label: &str) {
        if self.occupied.contains_key(&cell) {
            trace!(x = cell.x, y = cell.y, label, "cell already reserved");
            return;
        }
        debug!(x = cell.x, y = cell.y, label, "reserved cell");
        self.occupied.insert(cell, self.reservations.len());
        self.reservations.push(Reservation {
            cell,
            label: label.to_string(),
        });
    }

    fn checked_cell(&self, x: i64, y: i64) -> Result<Cell, LayoutError> {
        let ceiling = self.config.canvas_ceiling;
        let limit = i64::from(ceiling);
        if x < 0 || y < 0 || x >= limit || y >= limit {
            return Err(LayoutError::AllocationOverflow { x, y, ceiling });
        }
        Ok(Cell::new(x as u32, y as u32))
    }

    fn cell_for_index(&self, index: u64, columns: u32) -> Result<Cell, LayoutError> {
        let tile = u64::from(self.config.tile_size);
        let columns = u64::from(columns);
        let x = (index % columns).saturating_mul(tile);
        let y = (index / columns).saturating_mul(tile);
        self.checked_cell(
            i64::try_from(x).unwrap_or(i64::MAX),
            i64::try_from(y).unwrap_or(i64::MAX),
        )
    }

    /// Walks indices upward from `start` until `accept` holds. Ends in an overflow
    /// error once the row-major walk leaves the canvas.
    fn probe<F>(&self, start: u64, columns: u32, accept: F) -> Result<(u64, Cell), LayoutError>
    where
        F: Fn(&Grid, Cell) -> bool,
    {
        let mut index = start;
        loop {
            let cell = self.cell_for_index(index, columns)?;
            if accept(self, cell) {
                return Ok((index, cell));
            }
            index = index.saturating_add(1);
        }
    }

    fn run_cells(&self, bottom: Cell, length: u32) -> Result<Vec<Cell>, LayoutError> {
        if length == 0 {
            return Err(LayoutError::configuration("run length must be at least one tile"));
        }
        let tile = i64::from(self.config.tile_size);
        (0..i64::from(length))
            .map(|step| self.checked_cell(i64::from(bottom.x), i64::from(bottom.y) - step * tile))
            .collect()
    }

    /// Linear canvas index where a `next_available` sequence resumes.
    fn sequence_start(&mut self, index: usize, label: &str) -> Result<u64, LayoutError> {
        let anchor = match self.anchor {
            Some(anchor) if index > 0 => anchor,
            _ => {
                let anchor = self.tile_position(0, label, false)?;
                self.anchor = Some(anchor);
                anchor
            }
        };

        // The anchor's column is below `columns`, which never exceeds `canvas_columns`.
        let tile = self.config.tile_size;
        let canvas_columns = u64::from(self.canvas_columns());
        let anchor_index = u64::from(anchor.y / tile) * canvas_columns + u64::from(anchor.x / tile);
        Ok(anchor_index.saturating_add(index as u64))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
