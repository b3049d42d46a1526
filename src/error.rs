use std::path::PathBuf;

/// Errors raised by the dock core.
///
/// Window-system failures never leave the crate as hard errors: the resolver
/// and the tile draw path log them and carry on as if the window did not exist.
#[derive(Debug)]
pub enum DockError {
    /// The display uses a pixel format none of the compositors understand.
    UnsupportedFormat { bits: u32 },
    /// The icon could not be decoded or does not fit the slot.
    InvalidImage { path: PathBuf, reason: String },
    /// Spawning the tile's command failed.
    LaunchFailure {
        command: String,
        source: std::io::Error,
    },
    WindowQueryFailure(String),
    SurfaceCreationFailure { width: usize, height: usize },
}

impl std::fmt::Display for DockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DockError::UnsupportedFormat { bits } => {
                write!(f, "pixel depth of {bits} bits is not supported")
            }
            DockError::InvalidImage { path, reason } => {
                write!(f, "invalid image '{}': {reason}", path.display())
            }
            DockError::LaunchFailure { command, source } => {
                write!(f, "failed to launch '{command}': {source}")
            }
            DockError::WindowQueryFailure(msg) => write!(f, "window query failed: {msg}"),
            DockError::SurfaceCreationFailure { width, height } => {
                write!(f, "could not create a {width}x{height} surface")
            }
        }
    }
}

impl std::error::Error for DockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockError::LaunchFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_exposes_io_source() {
        let err = DockError::LaunchFailure {
            command: "xterm".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "failed to launch 'xterm': missing");
    }
}
