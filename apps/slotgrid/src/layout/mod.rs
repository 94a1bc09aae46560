// Slot layout for recipe display panels.
// Implements: grid allocator, placeable descriptors, panel composition, HTTP handlers.
// Composition is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod descriptor;
pub mod grid;
pub mod handlers;
pub mod panel;

// Re-export the public API consumed by other modules (config, errors).
pub use grid::{GridConfig, LayoutError};
