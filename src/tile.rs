//! One dock tile: its icon, its fade-in animation and the process it
//! launched.

use crate::error::{DockError, Result};
use crate::icon::IconRecord;
use crate::launcher::{self, ProcessSupervisor};
use crate::raster::IconRaster;
use crate::render::{Compositor, MarkType, PixelSurface};
use crate::settings::DockSettings;
use crate::window_manager::{Visibility, WindowHandle, WindowResolver, WindowSystem};

/// Opacity of a launched tile's icon while it fades in. `COMPLETE` is the
/// steady state of idle and running tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FadeLevel(u8);

impl FadeLevel {
    pub const COMPLETE: Self = FadeLevel(255);

    pub const fn new(level: u8) -> Self {
        FadeLevel(level)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self == Self::COMPLETE
    }

    /// Starting level for a launch. A longer idle time gives a fainter
    /// start: the level is `256 / step^(ticks + 1)` where `ticks` is the
    /// number of tick intervals that fit into the idle time.
    pub fn initial(idle_ms: u32, tick_interval_ms: u64, step: f64) -> Self {
        let ticks_per_second = 1000.0 / tick_interval_ms.max(1) as f64;
        let ticks = ticks_per_second * idle_ms as f64 / 1000.0;
        let factor = step.powf(ticks.floor() + 1.0);
        let level = (256.0 / factor).floor();
        FadeLevel(level.clamp(0.0, 255.0) as u8)
    }

    /// Next level after one tick. Grows by `step` but at least by one so
    /// every fade finishes.
    pub fn advance(self, step: f64) -> Self {
        if self.is_complete() {
            return self;
        }
        let current = self.0 as f64;
        let next = (current * step).floor().max(current + 1.0).min(255.0);
        FadeLevel(next as u8)
    }
}

/// Where a tile is in its launch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Idle,
    /// Spawn requested, no process id yet.
    Launching,
    FadingIn { pid: u32 },
    Running { pid: u32 },
}

impl TileState {
    pub fn pid(self) -> Option<u32> {
        match self {
            TileState::FadingIn { pid } | TileState::Running { pid } => Some(pid),
            TileState::Idle | TileState::Launching => None,
        }
    }
}

/// Result of activating a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The running instance's windows were raised; holds how many.
    Raised(usize),
    Launched(u32),
    /// A fade is in progress or there is nothing to run.
    Ignored,
}

/// Per-tile copy of the dock-wide settings a tile needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TileOptions {
    pub slot_width: usize,
    pub slot_height: usize,
    pub mark: MarkType,
    pub mark_left: i32,
    pub mark_top: i32,
    pub case_sensitive: bool,
    pub tick_interval_ms: u64,
    pub fade_step: f64,
}

impl From<&DockSettings> for TileOptions {
    fn from(settings: &DockSettings) -> Self {
        let (mark_left, mark_top) = settings.mark_margins();
        Self {
            slot_width: settings.slot_width,
            slot_height: settings.slot_height,
            mark: settings.mark,
            mark_left,
            mark_top,
            case_sensitive: settings.case_sensitive,
            tick_interval_ms: settings.tick_interval_ms,
            fade_step: settings.fade_step,
        }
    }
}

impl Default for TileOptions {
    fn default() -> Self {
        Self::from(&DockSettings::default())
    }
}

#[derive(Debug)]
pub struct Tile {
    record: IconRecord,
    window: WindowHandle,
    options: TileOptions,
    compositor: Compositor,
    raster: IconRaster,
    /// What gets blitted to the window.
    image: PixelSurface,
    /// Last good background sample.
    background: PixelSurface,
    left: i32,
    top: i32,
    state: TileState,
    fade: FadeLevel,
    visibility: Visibility,
    background_valid: bool,
    resolver: WindowResolver,
}

// Offsets that centre the image in the slot.
fn centre(record: &IconRecord, raster: &IconRaster, options: &TileOptions) -> Result<(i32, i32)> {
    if raster.width() > options.slot_width || raster.height() > options.slot_height {
        return Err(DockError::InvalidImage {
            path: record.image.clone(),
            reason: format!(
                "image is too big ({}x{} in a {}x{} slot)",
                raster.width(),
                raster.height(),
                options.slot_width,
                options.slot_height
            ),
        });
    }
    let left = (options.slot_width - raster.width()) / 2;
    let top = (options.slot_height - raster.height()) / 2;
    Ok((left as i32, top as i32))
}

impl Tile {
    pub fn new(
        record: IconRecord,
        raster: IconRaster,
        window: WindowHandle,
        compositor: Compositor,
        options: TileOptions,
    ) -> Result<Self> {
        let (left, top) = centre(&record, &raster, &options)?;
        let depth = compositor.depth();
        let image = PixelSurface::new(depth, raster.width(), raster.height())?;
        let background = PixelSurface::new(depth, raster.width(), raster.height())?;
        tracing::debug!(
            command = %record.command,
            width = raster.width(),
            height = raster.height(),
            "created tile"
        );
        Ok(Self {
            record,
            window,
            options,
            compositor,
            raster,
            image,
            background,
            left,
            top,
            state: TileState::Idle,
            fade: FadeLevel::COMPLETE,
            visibility: Visibility::default(),
            background_valid: false,
            resolver: WindowResolver::new(),
        })
    }

    pub fn record(&self) -> &IconRecord {
        &self.record
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn pid(&self) -> Option<u32> {
        self.state.pid()
    }

    pub fn fade(&self) -> FadeLevel {
        self.fade
    }

    pub fn is_exclusive(&self) -> bool {
        self.record.is_exclusive()
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn width(&self) -> usize {
        self.raster.width()
    }

    pub fn height(&self) -> usize {
        self.raster.height()
    }

    /// The composed pixels as last drawn.
    pub fn image(&self) -> &PixelSurface {
        &self.image
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn background_valid(&self) -> bool {
        self.background_valid
    }

    pub fn invalidate(&mut self) {
        self.background_valid = false;
    }

    pub fn resolver(&self) -> &WindowResolver {
        &self.resolver
    }

    /// Whether the running mark is currently drawn over the icon.
    pub fn shows_mark(&self) -> bool {
        self.pid().is_some() && self.is_exclusive()
    }

    /// Launch the command, or raise the running instance of an exclusive
    /// tile. `argument` is appended to the command line.
    pub fn activate(
        &mut self,
        ws: &dyn WindowSystem,
        procs: &mut dyn ProcessSupervisor,
        argument: Option<&str>,
    ) -> Result<Activation> {
        if self.shows_mark() {
            return Ok(Activation::Raised(self.focus_switch(ws)));
        }
        if matches!(self.state, TileState::Launching | TileState::FadingIn { .. })
            || self.record.command.trim().is_empty()
        {
            tracing::trace!(command = %self.record.command, "activation ignored");
            return Ok(Activation::Ignored);
        }

        self.state = TileState::Launching;
        let command = launcher::command_with_argument(&self.record.command, argument);
        let pid = match procs.spawn(&command) {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "launch failed");
                self.state = TileState::Idle;
                return Err(e);
            }
        };

        self.fade = FadeLevel::initial(
            self.record.idle.millis(),
            self.options.tick_interval_ms,
            self.options.fade_step,
        );
        self.state = if self.fade.is_complete() {
            TileState::Running { pid }
        } else {
            TileState::FadingIn { pid }
        };
        tracing::debug!(pid, fade = self.fade.value(), "fading in");
        self.draw(ws, true);
        Ok(Activation::Launched(pid))
    }

    /// Periodic update: notices the process exiting and advances the fade.
    /// Returns true when the tile was redrawn.
    pub fn tick(&mut self, ws: &dyn WindowSystem, procs: &mut dyn ProcessSupervisor) -> bool {
        let Some(pid) = self.pid() else {
            return false;
        };

        if procs.has_exited(pid) {
            tracing::info!(pid, command = %self.record.command, "application exited");
            self.state = TileState::Idle;
            self.fade = FadeLevel::COMPLETE;
            self.draw(ws, true);
            return true;
        }

        if let TileState::FadingIn { pid } = self.state {
            self.fade = self.fade.advance(self.options.fade_step);
            if self.fade.is_complete() {
                tracing::debug!(pid, "fade complete");
                self.state = TileState::Running { pid };
            }
            self.draw(ws, true);
            return true;
        }
        false
    }

    /// Blit the tile. With `refresh`, or while no good background is
    /// cached, the icon is composed again first.
    pub fn draw(&mut self, ws: &dyn WindowSystem, refresh: bool) {
        if refresh || !self.background_valid {
            self.restore_background(ws);
            if self.fade.is_complete() {
                self.compositor.opaque(&mut self.image, &self.raster);
            } else {
                self.compositor
                    .ghosted(&mut self.image, &self.raster, self.fade.value());
            }
            if self.shows_mark() {
                self.compositor.active_mark(
                    &mut self.image,
                    self.options.mark,
                    self.options.mark_left,
                    self.options.mark_top,
                );
            }
        }

        if let Err(e) = ws.put_image(self.window, self.left, self.top, &self.image) {
            tracing::debug!(window = self.window.0, error = %e, "blit failed");
        }
    }

    fn restore_background(&mut self, ws: &dyn WindowSystem) {
        if self.background_valid {
            self.image.copy_from(&self.background);
            return;
        }
        match ws.sample_background(self.window, self.left, self.top, &mut self.image) {
            Ok(()) => {
                // an obscured sample may contain other windows
                if self.visibility == Visibility::Unobscured {
                    self.background.copy_from(&self.image);
                    self.background_valid = true;
                }
            }
            Err(e) => {
                tracing::trace!(window = self.window.0, error = %e, "background not available");
                self.image.copy_from(&self.background);
            }
        }
    }

    /// Swap in a new icon image and redraw from a fresh background.
    pub fn set_image(&mut self, ws: &dyn WindowSystem, raster: IconRaster) -> Result<()> {
        let (left, top) = centre(&self.record, &raster, &self.options)?;
        if raster.width() != self.raster.width() || raster.height() != self.raster.height() {
            let depth = self.compositor.depth();
            let image = PixelSurface::new(depth, raster.width(), raster.height())?;
            let background = PixelSurface::new(depth, raster.width(), raster.height())?;
            self.image = image;
            self.background = background;
        }
        self.left = left;
        self.top = top;
        self.raster = raster;
        self.invalidate();
        self.draw(ws, true);
        Ok(())
    }

    /// Replace the image path stored in the record. The raster is left alone.
    pub fn set_image_path(&mut self, path: &str) {
        self.record.set_image(path);
    }

    fn matching_windows(&mut self, ws: &dyn WindowSystem) -> Vec<WindowHandle> {
        let case_sensitive = self.options.case_sensitive;
        let resolver = &mut self.resolver;
        self.record
            .titles
            .iter()
            .filter_map(|pattern| resolver.find_by_title(ws, pattern, case_sensitive))
            .collect()
    }

    // Applies `op` to every window of the running instance.
    fn apply(
        &mut self,
        ws: &dyn WindowSystem,
        what: &str,
        op: impl Fn(&dyn WindowSystem, WindowHandle) -> Result<()>,
    ) -> usize {
        if !self.shows_mark() {
            return 0;
        }
        let mut count = 0;
        for window in self.matching_windows(ws) {
            match op(ws, window) {
                Ok(()) => count += 1,
                Err(e) => tracing::debug!(window = window.0, error = %e, "{what} failed"),
            }
        }
        count
    }

    /// Raise and focus every window of the running instance.
    pub fn focus_switch(&mut self, ws: &dyn WindowSystem) -> usize {
        self.apply(ws, "activate", |ws, w| ws.activate(w))
    }

    pub fn iconify(&mut self, ws: &dyn WindowSystem) -> usize {
        self.apply(ws, "iconify", |ws, w| ws.iconify(w))
    }

    pub fn lower(&mut self, ws: &dyn WindowSystem) -> usize {
        self.apply(ws, "lower", |ws, w| ws.lower(w))
    }

    /// Ask the running instance to close. Without a window to close the
    /// process is sent SIGTERM instead. The tile stays running until
    /// [`Tile::tick`] sees the process exit.
    pub fn close(&mut self, ws: &dyn WindowSystem, procs: &mut dyn ProcessSupervisor) {
        let Some(pid) = self.pid() else {
            return;
        };
        let closed = self.apply(ws, "close", |ws, w| ws.close(w));
        if closed == 0 {
            tracing::debug!(pid, "no window to close; terminating");
            procs.terminate(pid);
        }
    }

    /// True when the active window belongs to this tile's application.
    pub fn has_focus(&mut self, ws: &dyn WindowSystem) -> bool {
        let active = match ws.active_window() {
            Ok(Some(window)) => window,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!(error = %e, "active window unavailable");
                return false;
            }
        };
        self.matching_windows(ws).contains(&active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_fade_follows_idle_presets() {
        let level = |ms| FadeLevel::initial(ms, 250, 1.05).value();
        assert_eq!(level(250), 232);
        assert_eq!(level(500), 221);
        assert_eq!(level(5000), 91);
        assert_eq!(level(10000), 34);
    }

    #[test]
    fn longer_idle_starts_fainter() {
        let a = FadeLevel::initial(1000, 250, 1.05);
        let b = FadeLevel::initial(3000, 250, 1.05);
        assert!(b < a);
    }

    #[test]
    fn tick_interval_need_not_divide_a_second() {
        // 5000 ms at 300 ms ticks is 16 whole ticks.
        assert_eq!(FadeLevel::initial(5000, 300, 1.05).value(), 111);
    }

    #[test]
    fn slow_ticks_still_separate_idle_presets() {
        let fastest = FadeLevel::initial(250, 2000, 1.05);
        let lame = FadeLevel::initial(10000, 2000, 1.05);
        assert_eq!(fastest.value(), 243);
        assert_eq!(lame.value(), 191);
        assert!(lame < fastest);
    }

    #[test]
    fn advance_is_geometric_then_saturates() {
        let mut level = FadeLevel::new(221);
        level = level.advance(1.05);
        assert_eq!(level.value(), 232);
        level = level.advance(1.05);
        assert_eq!(level.value(), 243);
        level = level.advance(1.05);
        assert!(level.is_complete());
        assert_eq!(level.advance(1.05), FadeLevel::COMPLETE);
    }

    #[test]
    fn advance_always_makes_progress() {
        assert_eq!(FadeLevel::new(0).advance(1.05).value(), 1);
        assert_eq!(FadeLevel::new(10).advance(1.05).value(), 11);
        assert_eq!(FadeLevel::new(254).advance(1.001).value(), 255);
    }

    #[test]
    fn state_exposes_pid_only_when_running() {
        assert_eq!(TileState::Idle.pid(), None);
        assert_eq!(TileState::Launching.pid(), None);
        assert_eq!(TileState::FadingIn { pid: 7 }.pid(), Some(7));
        assert_eq!(TileState::Running { pid: 7 }.pid(), Some(7));
    }

    #[test]
    fn options_pick_up_mark_defaults() {
        let mut settings = DockSettings::default();
        settings.mark = MarkType::Dots;
        let options = TileOptions::from(&settings);
        assert_eq!((options.mark_left, options.mark_top), (-1, -1));
    }
}
