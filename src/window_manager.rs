use hashlink::LinkedHashMap;

use crate::error::Result;
use crate::render::PixelSurface;
use crate::title_pattern;

/// Window identifier issued by the windowing system. Values may be reused
/// after a window is destroyed, so validity is checked before every use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u32);

/// How much of a tile's window is currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Unobscured,
    PartiallyObscured,
    FullyObscured,
}

/// Queries and requests the dock sends to the windowing system.
///
/// Every call is best effort. Callers treat an `Err` as "no such window" and
/// never surface it to the user.
pub trait WindowSystem {
    /// Bits per pixel of an image compatible with the screen.
    fn bits_per_pixel(&self) -> u32;

    fn is_valid(&self, window: WindowHandle) -> bool;

    /// Window title; an untitled window yields an empty string.
    fn window_title(&self, window: WindowHandle) -> Result<String>;

    /// Managed client windows in lookup order.
    fn client_list(&self) -> Result<Vec<WindowHandle>>;

    fn active_window(&self) -> Result<Option<WindowHandle>>;

    /// Switch to the window's workspace, raise and focus it.
    fn activate(&self, window: WindowHandle) -> Result<()>;

    fn iconify(&self, window: WindowHandle) -> Result<()>;

    fn lower(&self, window: WindowHandle) -> Result<()>;

    /// Politely ask the window to close.
    fn close(&self, window: WindowHandle) -> Result<()>;

    /// Copy the pixels currently shown at `(x, y)` of `window` into
    /// `surface`. Fails while the window is unmapped or off-screen.
    fn sample_background(
        &self,
        window: WindowHandle,
        x: i32,
        y: i32,
        surface: &mut PixelSurface,
    ) -> Result<()>;

    /// Blit `surface` to `(x, y)` of `window`.
    fn put_image(&self, window: WindowHandle, x: i32, y: i32, surface: &PixelSurface) -> Result<()>;
}

/// Resolves title patterns to live windows, remembering the last hit per
/// pattern.
#[derive(Debug, Default)]
pub struct WindowResolver {
    cache: LinkedHashMap<String, WindowHandle>,
}

impl WindowResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// First live window whose title matches `pattern`.
    pub fn find_by_title(
        &mut self,
        ws: &dyn WindowSystem,
        pattern: &str,
        case_sensitive: bool,
    ) -> Option<WindowHandle> {
        if let Some(&window) = self.cache.get(pattern) {
            if ws.is_valid(window) {
                tracing::trace!(pattern, window = window.0, "title cache hit");
                return Some(window);
            }
            tracing::debug!(pattern, window = window.0, "dropping stale title cache entry");
            self.cache.remove(pattern);
        }

        let clients = match ws.client_list() {
            Ok(clients) => clients,
            Err(e) => {
                tracing::debug!(error = %e, "client list unavailable");
                return None;
            }
        };

        for window in clients {
            if !ws.is_valid(window) {
                continue;
            }
            let title = match ws.window_title(window) {
                Ok(title) => title,
                Err(e) => {
                    tracing::debug!(window = window.0, error = %e, "could not read window title");
                    continue;
                }
            };
            if title_pattern::matches(&title, pattern, case_sensitive) {
                tracing::debug!(pattern, window = window.0, %title, "resolved window");
                self.cache.insert(pattern.to_owned(), window);
                return Some(window);
            }
        }
        None
    }

    /// Cached handle for `pattern`, without checking that it is still alive.
    pub fn cached(&self, pattern: &str) -> Option<WindowHandle> {
        self.cache.get(pattern).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}
