
use std::path::{Path, PathBuf};

use mock_display::{Call, MockDisplay, MockProcesses};
use tempfile::TempDir;
use tile_dock::error::DockError;
use tile_dock::icon::IconRecord;
use tile_dock::remote::{RemoteCommand, CHANGE_ICON_MESSAGE, EXECUTE_ICON_MESSAGE};
use tile_dock::settings::{ClickAction, DockSettings};
use tile_dock::tile::Activation;
use tile_dock::window_manager::WindowHandle;
use tile_dock::{Button, ClickOutcome, Dock};

type TestDock = Dock<MockDisplay, MockProcesses>;

fn write_png(dir: &Path, name: &str, size: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(size, size, image::Rgba([200, 100, 50, 255]))
        .save(&path)
        .unwrap();
    path
}

fn dock_with(settings: DockSettings) -> TestDock {
    Dock::new(settings, MockDisplay::new(24), MockProcesses::new()).unwrap()
}

// A dock with one 16x16 xterm tile in slot window 1.
fn xterm_dock(dir: &TempDir, settings: DockSettings) -> TestDock {
    let icon = write_png(dir.path(), "xterm.png", 16);
    let mut dock = dock_with(settings);
    let record = IconRecord::parse(&format!("{}:xterm:XTerm", icon.display())).unwrap();
    assert_eq!(dock.add(record, WindowHandle(1)).unwrap(), 0);
    dock
}

#[test]
fn unsupported_depth_is_fatal() {
    let dock = Dock::new(DockSettings::default(), MockDisplay::new(8), MockProcesses::new());
    assert!(matches!(dock, Err(DockError::UnsupportedFormat { bits: 8 })));
}

#[test]
fn add_loads_and_centres_the_icon() {
    let dir = TempDir::new().unwrap();
    let dock = xterm_dock(&dir, DockSettings::default());
    let tile = dock.tile(0).unwrap();
    assert_eq!((tile.width(), tile.height()), (16, 16));
    assert_eq!((tile.left(), tile.top()), (24, 24));
    assert_eq!(dock.tile_for_window(WindowHandle(1)), Some(0));
    assert_eq!(dock.tile_for_window(WindowHandle(2)), None);
}

#[test]
fn broken_icons_do_not_affect_other_tiles() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());

    let missing = IconRecord::parse("/nonexistent/icon.png:gimp").unwrap();
    assert!(matches!(
        dock.add(missing, WindowHandle(2)),
        Err(DockError::InvalidImage { .. })
    ));

    let huge = write_png(dir.path(), "huge.png", 80);
    let record = IconRecord::parse(&format!("{}:gimp", huge.display())).unwrap();
    assert!(matches!(
        dock.add(record, WindowHandle(3)),
        Err(DockError::InvalidImage { .. })
    ));

    assert_eq!(dock.tiles().len(), 1);
    assert!(matches!(
        dock.on_button_release(0, Button::Left, 30, 30).unwrap(),
        ClickOutcome::Activated(Activation::Launched(_))
    ));
}

#[test]
fn left_click_launches_then_raises() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let window = dock.window_system().add_window(50, "XTerm");

    let first = dock.on_button_release(0, Button::Left, 30, 30).unwrap();
    assert_eq!(first, ClickOutcome::Activated(Activation::Launched(100)));
    let second = dock.on_button_release(0, Button::Left, 30, 30).unwrap();
    assert_eq!(second, ClickOutcome::Activated(Activation::Raised(1)));
    assert_eq!(dock.processes().spawned.len(), 1);
    assert_eq!(dock.window_system().calls(), vec![Call::Activate(window)]);
}

#[test]
fn cross_mark_zone_closes_the_application() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let window = dock.window_system().add_window(50, "XTerm");
    dock.on_button_release(0, Button::Left, 30, 30).unwrap();

    // icon at 24,24; cross zone spans x 34..40, y 25..31 in slot coordinates
    let outcome = dock.on_button_release(0, Button::Left, 36, 27).unwrap();
    assert_eq!(outcome, ClickOutcome::Closed);
    assert_eq!(dock.window_system().calls(), vec![Call::Close(window)]);
    assert!(dock.tile(0).unwrap().pid().is_some());
}

#[test]
fn close_zone_is_inactive_while_idle() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let outcome = dock.on_button_release(0, Button::Left, 36, 27).unwrap();
    assert!(matches!(outcome, ClickOutcome::Activated(Activation::Launched(_))));
}

#[test]
fn left_click_action_applies_only_with_focus() {
    let dir = TempDir::new().unwrap();
    let settings = DockSettings {
        left_click: ClickAction::Iconify,
        ..DockSettings::default()
    };
    let mut dock = xterm_dock(&dir, settings);
    let window = dock.window_system().add_window(50, "XTerm");
    dock.on_button_release(0, Button::Left, 30, 30).unwrap();

    dock.window_system().active.set(Some(window));
    assert_eq!(
        dock.on_button_release(0, Button::Left, 30, 30).unwrap(),
        ClickOutcome::Iconified(1)
    );

    dock.window_system().active.set(None);
    assert_eq!(
        dock.on_button_release(0, Button::Left, 30, 30).unwrap(),
        ClickOutcome::Activated(Activation::Raised(1))
    );
    assert_eq!(
        dock.window_system().calls(),
        vec![Call::Iconify(window), Call::Activate(window)]
    );
}

#[test]
fn right_click_runs_configured_action() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let window = dock.window_system().add_window(50, "XTerm");

    assert_eq!(
        dock.on_button_release(0, Button::Right, 30, 30).unwrap(),
        ClickOutcome::Iconified(0)
    );
    dock.on_button_release(0, Button::Left, 30, 30).unwrap();
    assert_eq!(
        dock.on_button_release(0, Button::Right, 30, 30).unwrap(),
        ClickOutcome::Iconified(1)
    );
    assert_eq!(dock.window_system().calls(), vec![Call::Iconify(window)]);
}

#[test]
fn right_click_close_terminates_when_no_window_matches() {
    let dir = TempDir::new().unwrap();
    let settings = DockSettings {
        right_click: ClickAction::Close,
        ..DockSettings::default()
    };
    let mut dock = xterm_dock(&dir, settings);
    dock.on_button_release(0, Button::Left, 30, 30).unwrap();
    assert_eq!(
        dock.on_button_release(0, Button::Right, 30, 30).unwrap(),
        ClickOutcome::Closed
    );
    assert_eq!(dock.processes().terminated, vec![100]);
}

#[test]
fn middle_click_goes_through_the_selection() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    assert_eq!(
        dock.on_button_release(0, Button::Middle, 30, 30).unwrap(),
        ClickOutcome::SelectionRequested
    );
    assert!(dock.processes().spawned.is_empty());

    let activation = dock.on_selection(0, "-e top").unwrap();
    assert!(matches!(activation, Activation::Launched(_)));
    assert_eq!(
        shlex::split(&dock.processes().spawned[0]).unwrap(),
        vec!["xterm".to_string(), "-e top".to_string()]
    );
}

#[test]
fn events_for_unknown_tiles_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    assert_eq!(
        dock.on_button_release(5, Button::Left, 0, 0).unwrap(),
        ClickOutcome::Nothing
    );
    assert_eq!(dock.on_selection(5, "x").unwrap(), Activation::Ignored);
    dock.on_expose(5);
    dock.on_configure(5);
    assert!(dock.processes().spawned.is_empty());
}

#[test]
fn configure_resamples_background() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    dock.on_expose(0);
    let samples = dock.window_system().sample_calls.get();
    assert_eq!(samples, 1);

    dock.on_expose(0);
    assert_eq!(dock.window_system().sample_calls.get(), 1);

    dock.on_configure(0);
    assert_eq!(dock.window_system().sample_calls.get(), 2);
    assert!(dock.tile(0).unwrap().background_valid());
}

#[test]
fn tick_reaches_every_tile() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let gimp = write_png(dir.path(), "gimp.png", 32);
    let record = IconRecord::parse(&format!("{}:gimp", gimp.display())).unwrap();
    dock.add(record, WindowHandle(2)).unwrap();

    assert_eq!(dock.tick(), 0);
    dock.on_button_release(0, Button::Left, 30, 30).unwrap();
    dock.on_button_release(1, Button::Left, 30, 30).unwrap();
    assert_eq!(dock.tick(), 2);

    dock.processes_mut().exit(100);
    dock.tick();
    assert_eq!(dock.tile(0).unwrap().pid(), None);
    assert_eq!(dock.tile(1).unwrap().pid(), Some(101));
}

#[test]
fn remote_execute_matches_command_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    assert_eq!(dock.execute_icon("gimp").unwrap(), None);
    assert!(matches!(
        dock.execute_icon("XTERM").unwrap(),
        Some(Activation::Launched(_))
    ));

    let cmd = RemoteCommand::parse(EXECUTE_ICON_MESSAGE, "xterm").unwrap();
    dock.handle_remote(&cmd).unwrap();
    // the running exclusive tile is raised, not launched again
    assert_eq!(dock.processes().spawned.len(), 1);
}

#[test]
fn remote_change_icon_swaps_image_once() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let busy = write_png(dir.path(), "busy.png", 24);

    let payload = format!("xterm:{}", busy.display());
    let cmd = RemoteCommand::parse(CHANGE_ICON_MESSAGE, &payload).unwrap();
    dock.handle_remote(&cmd).unwrap();

    let tile = dock.tile(0).unwrap();
    assert_eq!(tile.record().image, busy);
    assert_eq!((tile.width(), tile.left()), (24, 20));

    assert!(!dock.change_icon("xterm", &busy.display().to_string()).unwrap());
    assert!(!dock.change_icon("gimp", &busy.display().to_string()).unwrap());
}

#[test]
fn remote_change_icon_reports_bad_images() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let err = dock.change_icon("xterm", "/nonexistent/busy.png").unwrap_err();
    assert!(matches!(err, DockError::InvalidImage { .. }));
    assert_eq!(dock.tile(0).unwrap().width(), 16);
}

#[test]
fn oversized_change_icon_keeps_the_old_record() {
    let dir = TempDir::new().unwrap();
    let mut dock = xterm_dock(&dir, DockSettings::default());
    let original = dock.tile(0).unwrap().record().image.clone();
    let huge = write_png(dir.path(), "huge.png", 80);
    let huge_str = huge.display().to_string();

    let err = dock.change_icon("xterm", &huge_str).unwrap_err();
    match err {
        DockError::InvalidImage { path, .. } => assert_eq!(path, huge),
        other => panic!("unexpected error {other:?}"),
    }
    let tile = dock.tile(0).unwrap();
    assert_eq!(tile.width(), 16);
    assert_eq!(tile.record().image, original);

    // Still rejected rather than skipped as already applied.
    assert!(dock.change_icon("xterm", &huge_str).is_err());
}
