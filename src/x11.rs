//! [`WindowSystem`] on top of an X11 connection.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

use crate::error::{DockError, Result};
use crate::render::PixelSurface;
use crate::window_manager::{WindowHandle, WindowSystem};

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        UTF8_STRING,
        WM_CHANGE_STATE,
        _NET_WM_NAME,
        _NET_CLIENT_LIST,
        _NET_ACTIVE_WINDOW,
        _NET_WM_DESKTOP,
        _NET_CURRENT_DESKTOP,
        _NET_CLOSE_WINDOW,
    }
}

const ICONIC_STATE: u32 = 3;
// EWMH source indication for requests coming from a pager.
const SOURCE_PAGER: u32 = 2;

fn query_failure(e: impl std::fmt::Display) -> DockError {
    DockError::WindowQueryFailure(e.to_string())
}

pub struct X11Display {
    conn: RustConnection,
    root: Window,
    gc: Gcontext,
    depth: u8,
    bits_per_pixel: u32,
    screen_width: i32,
    screen_height: i32,
    atoms: Atoms,
}

impl X11Display {
    /// Connect to `display`, or to `$DISPLAY` when `None`.
    pub fn connect(display: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display).map_err(query_failure)?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .cloned()
            .ok_or_else(|| query_failure(format!("no screen {screen_num}")))?;
        let bits_per_pixel = conn
            .setup()
            .pixmap_formats
            .iter()
            .find(|f| f.depth == screen.root_depth)
            .map(|f| f.bits_per_pixel as u32)
            .unwrap_or(screen.root_depth as u32);
        let atoms = Atoms::new(&conn)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        let gc = conn.generate_id().map_err(query_failure)?;
        conn.create_gc(gc, screen.root, &CreateGCAux::new())
            .map_err(query_failure)?;
        tracing::debug!(
            screen = screen_num,
            depth = screen.root_depth,
            bits_per_pixel,
            "connected to X server"
        );
        Ok(Self {
            conn,
            root: screen.root,
            gc,
            depth: screen.root_depth,
            bits_per_pixel,
            screen_width: screen.width_in_pixels as i32,
            screen_height: screen.height_in_pixels as i32,
            atoms,
        })
    }

    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    pub fn root(&self) -> Window {
        self.root
    }

    fn property32(&self, window: Window, property: Atom, type_: impl Into<Atom>) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, u32::MAX / 4)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        Ok(reply
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default())
    }

    fn text_property(&self, window: Window, property: Atom, type_: Atom) -> Result<Vec<u8>> {
        let reply = self
            .conn
            .get_property(false, window, property, type_, 0, 1024)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        Ok(reply.value)
    }

    fn send_to_root(&self, window: Window, message: Atom, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent::new(32, window, message, data);
        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )
            .map_err(query_failure)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush().map_err(query_failure)
    }
}

impl WindowSystem for X11Display {
    fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    fn is_valid(&self, window: WindowHandle) -> bool {
        if window.0 == 0 {
            return false;
        }
        self.conn
            .get_window_attributes(window.0)
            .map(|cookie| cookie.reply().is_ok())
            .unwrap_or(false)
    }

    fn window_title(&self, window: WindowHandle) -> Result<String> {
        let latin1 = self.text_property(window.0, AtomEnum::WM_NAME.into(), AtomEnum::STRING.into())?;
        if !latin1.is_empty() {
            return Ok(latin1.iter().map(|&b| b as char).collect());
        }
        let utf8 = self.text_property(window.0, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)?;
        Ok(String::from_utf8_lossy(&utf8).into_owned())
    }

    /// Newest client first.
    fn client_list(&self) -> Result<Vec<WindowHandle>> {
        let mut clients = self.property32(self.root, self.atoms._NET_CLIENT_LIST, AtomEnum::WINDOW)?;
        clients.reverse();
        Ok(clients.into_iter().map(WindowHandle).collect())
    }

    fn active_window(&self) -> Result<Option<WindowHandle>> {
        let active = self.property32(self.root, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW)?;
        Ok(active.first().copied().filter(|&w| w != 0).map(WindowHandle))
    }

    fn activate(&self, window: WindowHandle) -> Result<()> {
        let desktop = self.property32(window.0, self.atoms._NET_WM_DESKTOP, AtomEnum::CARDINAL)?;
        let current = self.property32(self.root, self.atoms._NET_CURRENT_DESKTOP, AtomEnum::CARDINAL)?;
        if let (Some(&desktop), Some(&current)) = (desktop.first(), current.first()) {
            if desktop != current {
                tracing::debug!(window = window.0, desktop, "switching desktop");
                self.send_to_root(
                    self.root,
                    self.atoms._NET_CURRENT_DESKTOP,
                    [desktop, CURRENT_TIME, 0, 0, 0],
                )?;
            }
        }
        self.send_to_root(
            window.0,
            self.atoms._NET_ACTIVE_WINDOW,
            [SOURCE_PAGER, CURRENT_TIME, 0, 0, 0],
        )?;
        self.conn
            .configure_window(window.0, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(query_failure)?;
        self.conn.map_window(window.0).map_err(query_failure)?;
        self.flush()
    }

    fn iconify(&self, window: WindowHandle) -> Result<()> {
        self.send_to_root(window.0, self.atoms.WM_CHANGE_STATE, [ICONIC_STATE, 0, 0, 0, 0])?;
        self.flush()
    }

    fn lower(&self, window: WindowHandle) -> Result<()> {
        self.conn
            .configure_window(window.0, &ConfigureWindowAux::new().stack_mode(StackMode::BELOW))
            .map_err(query_failure)?;
        self.flush()
    }

    fn close(&self, window: WindowHandle) -> Result<()> {
        self.send_to_root(
            window.0,
            self.atoms._NET_CLOSE_WINDOW,
            [CURRENT_TIME, SOURCE_PAGER, 0, 0, 0],
        )?;
        self.flush()
    }

    /// Reads from the slot's parent, which shows what lies behind the slot.
    fn sample_background(
        &self,
        window: WindowHandle,
        x: i32,
        y: i32,
        surface: &mut PixelSurface,
    ) -> Result<()> {
        let parent = self
            .conn
            .query_tree(window.0)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?
            .parent;
        if parent == x11rb::NONE {
            return Err(query_failure("slot has no parent"));
        }

        // GetImage fails for anything not fully on screen.
        let attrs = self
            .conn
            .get_window_attributes(parent)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        let geom = self
            .conn
            .get_geometry(parent)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        let origin = self
            .conn
            .translate_coordinates(parent, self.root, 0, 0)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        let (px, py) = (origin.dst_x as i32, origin.dst_y as i32);
        if attrs.map_state != MapState::VIEWABLE
            || px < 0
            || py < 0
            || px + geom.width as i32 > self.screen_width
            || py + geom.height as i32 > self.screen_height
        {
            return Err(query_failure("parent is not on screen"));
        }

        let slot = self
            .conn
            .get_geometry(window.0)
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        let image = self
            .conn
            .get_image(
                ImageFormat::Z_PIXMAP,
                parent,
                (slot.x as i32 + x) as i16,
                (slot.y as i32 + y) as i16,
                surface.width() as u16,
                surface.height() as u16,
                !0,
            )
            .map_err(query_failure)?
            .reply()
            .map_err(query_failure)?;
        if image.data.len() != surface.data().len() {
            return Err(query_failure(format!(
                "image of {} bytes does not fit a {} byte surface",
                image.data.len(),
                surface.data().len()
            )));
        }
        surface.data_mut().copy_from_slice(&image.data);
        Ok(())
    }

    fn put_image(&self, window: WindowHandle, x: i32, y: i32, surface: &PixelSurface) -> Result<()> {
        self.conn
            .put_image(
                ImageFormat::Z_PIXMAP,
                window.0,
                self.gc,
                surface.width() as u16,
                surface.height() as u16,
                x as i16,
                y as i16,
                0,
                self.depth,
                surface.data(),
            )
            .map_err(query_failure)?;
        self.flush()
    }
}
