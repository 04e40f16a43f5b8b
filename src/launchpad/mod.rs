// Launchpad Mini MK3 protocol

pub mod controls;
pub mod device;
pub mod input;
pub mod sysex;
pub mod text;

pub use controls::Control;
pub use device::{Launchpad, RecordingSink};
pub use input::{SurfaceEvent, decode};
pub use sysex::SysEx;
