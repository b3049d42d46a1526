use std::path::{Path, PathBuf};

use crate::error::{DockError, Result};
use crate::icon::{self, IconRecord};
use crate::launcher::ProcessSupervisor;
use crate::raster::{self, IconRaster};
use crate::remote::RemoteCommand;
use crate::render::{Compositor, MarkType};
use crate::settings::{ClickAction, DockSettings};
use crate::tile::{Activation, Tile, TileOptions};
use crate::window_manager::{Visibility, WindowHandle, WindowSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Middle,
    Right,
}

/// What a button release on a tile led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Activated(Activation),
    Iconified(usize),
    Lowered(usize),
    Closed,
    /// The event loop should fetch the primary selection and hand it to
    /// [`Dock::on_selection`].
    SelectionRequested,
    Nothing,
}

/// A row of tiles sharing one windowing system and one process supervisor.
pub struct Dock<W: WindowSystem, P: ProcessSupervisor> {
    settings: DockSettings,
    options: TileOptions,
    ws: W,
    procs: P,
    compositor: Compositor,
    tiles: Vec<Tile>,
}

impl<W: WindowSystem, P: ProcessSupervisor> Dock<W, P> {
    /// Fails when the display's pixel depth has no compositor.
    pub fn new(settings: DockSettings, ws: W, procs: P) -> Result<Self> {
        let compositor = Compositor::from_bits(ws.bits_per_pixel())?;
        tracing::info!(bits = compositor.depth().bits(), "dock initialised");
        Ok(Self {
            options: TileOptions::from(&settings),
            settings,
            ws,
            procs,
            compositor,
            tiles: Vec::new(),
        })
    }

    pub fn settings(&self) -> &DockSettings {
        &self.settings
    }

    pub fn window_system(&self) -> &W {
        &self.ws
    }

    pub fn processes(&self) -> &P {
        &self.procs
    }

    pub fn processes_mut(&mut self) -> &mut P {
        &mut self.procs
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Index of the tile drawn into `window`.
    pub fn tile_for_window(&self, window: WindowHandle) -> Option<usize> {
        self.tiles.iter().position(|t| t.window() == window)
    }

    /// Load the record's image and append a tile for it. A failure only
    /// affects this tile.
    pub fn add(&mut self, record: IconRecord, window: WindowHandle) -> Result<usize> {
        let raster = raster::load_icon(&record.image).map_err(|e| {
            tracing::warn!(error = %e, "skipping icon");
            e
        })?;
        self.add_with_raster(record, raster, window)
    }

    pub fn add_with_raster(
        &mut self,
        record: IconRecord,
        raster: IconRaster,
        window: WindowHandle,
    ) -> Result<usize> {
        let tile = Tile::new(record, raster, window, self.compositor, self.options.clone())
            .map_err(|e| {
                tracing::warn!(error = %e, "skipping icon");
                e
            })?;
        self.tiles.push(tile);
        Ok(self.tiles.len() - 1)
    }

    /// Tick every tile in order. Returns how many were redrawn.
    pub fn tick(&mut self) -> usize {
        let mut redrawn = 0;
        for tile in &mut self.tiles {
            if tile.tick(&self.ws, &mut self.procs) {
                redrawn += 1;
            }
        }
        redrawn
    }

    pub fn on_expose(&mut self, index: usize) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.draw(&self.ws, false);
        }
    }

    /// The slot moved or was resized; its background has to be sampled again.
    pub fn on_configure(&mut self, index: usize) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.invalidate();
            tile.draw(&self.ws, true);
        }
    }

    pub fn on_visibility(&mut self, index: usize, visibility: Visibility) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.set_visibility(visibility);
        }
    }

    /// `x`/`y` are relative to the slot window.
    pub fn on_button_release(
        &mut self,
        index: usize,
        button: Button,
        x: i32,
        y: i32,
    ) -> Result<ClickOutcome> {
        let Some(tile) = self.tiles.get_mut(index) else {
            return Ok(ClickOutcome::Nothing);
        };
        match button {
            Button::Left => {
                if self.options.mark == MarkType::Cross
                    && tile.shows_mark()
                    && in_close_zone(tile, &self.options, x, y)
                {
                    tile.close(&self.ws, &mut self.procs);
                    return Ok(ClickOutcome::Closed);
                }
                let action = self.settings.left_click;
                if action != ClickAction::Nothing && tile.has_focus(&self.ws) {
                    return Ok(perform(tile, action, &self.ws, &mut self.procs));
                }
                tile.activate(&self.ws, &mut self.procs, None)
                    .map(ClickOutcome::Activated)
            }
            Button::Middle => Ok(ClickOutcome::SelectionRequested),
            Button::Right => Ok(perform(
                tile,
                self.settings.right_click,
                &self.ws,
                &mut self.procs,
            )),
        }
    }

    /// Primary selection requested by a middle click has arrived.
    pub fn on_selection(&mut self, index: usize, text: &str) -> Result<Activation> {
        match self.tiles.get_mut(index) {
            Some(tile) => tile.activate(&self.ws, &mut self.procs, Some(text)),
            None => Ok(Activation::Ignored),
        }
    }

    /// Show `image` on the first tile running `command` whose image differs.
    /// Returns false when no tile qualifies.
    pub fn change_icon(&mut self, command: &str, image: &str) -> Result<bool> {
        let path = icon::expand_home(image);
        let Some(tile) = self.tiles.iter_mut().find(|t| {
            t.record().command.eq_ignore_ascii_case(command)
                && !t
                    .record()
                    .image
                    .to_string_lossy()
                    .eq_ignore_ascii_case(&path)
        }) else {
            tracing::debug!(command, "no tile to change");
            return Ok(false);
        };
        let raster = raster::load_icon(Path::new(&path))?;
        // The record keeps the old path until the new image is in place.
        tile.set_image(&self.ws, raster).map_err(|e| match e {
            DockError::InvalidImage { reason, .. } => DockError::InvalidImage {
                path: PathBuf::from(&path),
                reason,
            },
            other => other,
        })?;
        tile.set_image_path(&path);
        tracing::info!(command, image = %path, "changed icon");
        Ok(true)
    }

    /// Activate the first tile running `command`.
    pub fn execute_icon(&mut self, command: &str) -> Result<Option<Activation>> {
        match self
            .tiles
            .iter_mut()
            .find(|t| t.record().command.eq_ignore_ascii_case(command))
        {
            Some(tile) => tile.activate(&self.ws, &mut self.procs, None).map(Some),
            None => {
                tracing::debug!(command, "no tile to execute");
                Ok(None)
            }
        }
    }

    pub fn handle_remote(&mut self, command: &RemoteCommand) -> Result<()> {
        match command {
            RemoteCommand::ChangeIcon { command, image } => {
                self.change_icon(command, image)?;
            }
            RemoteCommand::ExecuteIcon { command } => {
                self.execute_icon(command)?;
            }
        }
        Ok(())
    }
}

fn perform(
    tile: &mut Tile,
    action: ClickAction,
    ws: &dyn WindowSystem,
    procs: &mut dyn ProcessSupervisor,
) -> ClickOutcome {
    match action {
        ClickAction::Nothing => ClickOutcome::Nothing,
        ClickAction::Iconify => ClickOutcome::Iconified(tile.iconify(ws)),
        ClickAction::Lower => ClickOutcome::Lowered(tile.lower(ws)),
        ClickAction::Close => {
            tile.close(ws, procs);
            ClickOutcome::Closed
        }
    }
}

// The 8x8 box around the cross mark.
fn in_close_zone(tile: &Tile, options: &TileOptions, x: i32, y: i32) -> bool {
    let x = x - tile.left();
    let y = y - tile.top();
    let mut l = options.mark_left;
    let mut t = options.mark_top;
    if l < 0 {
        l += tile.width() as i32 - 6;
    }
    if t < 0 {
        t += tile.height() as i32 - 6;
    }
    x > l && x < l + 8 && y > t && y < t + 8
}
