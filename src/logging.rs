use std::path::{Path, PathBuf};

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging at `info`, or at `debug` when enabled in the settings.
/// With debug logging on, `RUST_LOG` may override the level.
/// Output goes to `log_file` when one is given and to stderr otherwise.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging `RUST_LOG` is ignored so a stray variable in the
    // user's environment cannot make the dock verbose.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = log_file else {
        let _ = builder.try_init();
        return;
    };
    match file_appender(&path) {
        Ok(appender) => {
            let _ = builder.with_writer(appender).with_ansi(false).try_init();
        }
        Err(e) => {
            let _ = builder.try_init();
            tracing::warn!(path = %path.display(), error = %e, "cannot open log file, using stderr");
        }
    }
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tile_dock.log".into());
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}
