//! Messages another process can send to a running dock.
//!
//! Only the message names and payload formats live here; delivering them
//! (window properties, client messages) is up to the event loop.

/// Message name of [`RemoteCommand::ChangeIcon`].
pub const CHANGE_ICON_MESSAGE: &str = "_TILE_DOCK_CHANGE_ICON_";
/// Message name of [`RemoteCommand::ExecuteIcon`].
pub const EXECUTE_ICON_MESSAGE: &str = "_TILE_DOCK_EXECUTE_ICON_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Show `image` on the tile running `command`.
    ChangeIcon { command: String, image: String },
    /// Activate the tile running `command`.
    ExecuteIcon { command: String },
}

impl RemoteCommand {
    /// Decode a received message. Unknown names and incomplete payloads
    /// yield `None`.
    pub fn parse(message: &str, payload: &str) -> Option<Self> {
        match message {
            CHANGE_ICON_MESSAGE => {
                let (command, rest) = payload.trim_start_matches(':').split_once(':')?;
                let image = rest.trim_start_matches('\n').split('\n').next()?;
                if command.is_empty() || image.is_empty() {
                    return None;
                }
                Some(RemoteCommand::ChangeIcon {
                    command: command.to_owned(),
                    image: image.to_owned(),
                })
            }
            EXECUTE_ICON_MESSAGE => {
                if payload.is_empty() {
                    return None;
                }
                Some(RemoteCommand::ExecuteIcon {
                    command: payload.to_owned(),
                })
            }
            other => {
                tracing::debug!(message = other, "ignoring unknown remote message");
                None
            }
        }
    }

    pub fn message_name(&self) -> &'static str {
        match self {
            RemoteCommand::ChangeIcon { .. } => CHANGE_ICON_MESSAGE,
            RemoteCommand::ExecuteIcon { .. } => EXECUTE_ICON_MESSAGE,
        }
    }

    /// Payload to attach when sending this command.
    pub fn payload(&self) -> String {
        match self {
            RemoteCommand::ChangeIcon { command, image } => format!("{command}:{image}"),
            RemoteCommand::ExecuteIcon { command } => command.clone(),
        }
    }
}
