pub mod dock;
pub mod error;
pub mod icon;
pub mod launcher;
pub mod logging;
pub mod raster;
pub mod remote;
pub mod render;
pub mod settings;
pub mod tile;
pub mod title_pattern;
pub mod window_manager;
#[cfg(feature = "x11")]
pub mod x11;

pub use dock::{Button, ClickOutcome, Dock};
pub use error::{DockError, Result};
pub use tile::{Activation, FadeLevel, Tile, TileState};
pub use window_manager::{WindowHandle, WindowResolver, WindowSystem};
