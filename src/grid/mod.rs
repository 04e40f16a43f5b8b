// Grid module - pad addressing, palette and LED rendering for the 8x8 surface

pub mod addressing;
pub mod palette;
pub mod renderer;

pub use addressing::{Axis, GRID_SIZE, GridPosition, PadId, Viewport, pad_for, parse_pad};
pub use palette::{Color, LedMode, LedState, Role};
pub use renderer::{ColumnView, LedFrame, render_collection, render_column};
