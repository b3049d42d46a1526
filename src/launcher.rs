use std::collections::HashMap;
use std::process::{Child, Command};

use sysinfo::{Pid, Signal, System};

use crate::error::{DockError, Result};

/// Starts and watches the processes launched from tiles.
pub trait ProcessSupervisor {
    /// Run `command` detached and return its process id.
    fn spawn(&mut self, command: &str) -> Result<u32>;

    /// Non-blocking liveness check. Unknown ids count as exited.
    fn has_exited(&mut self, pid: u32) -> bool;

    /// Ask the process to terminate. Best effort.
    fn terminate(&mut self, pid: u32);
}

/// Runs commands through `/bin/sh -c` in their own process group.
#[derive(Debug, Default)]
pub struct ShellSupervisor {
    children: HashMap<u32, Child>,
}

impl ShellSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of children that have not been reaped yet.
    pub fn running(&self) -> usize {
        self.children.len()
    }

    // Collects every finished child, including ones no tile tracks anymore.
    fn reap(&mut self) {
        self.children.retain(|pid, child| match child.try_wait() {
            Ok(Some(status)) => {
                tracing::info!(pid, %status, "child exited");
                false
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(pid, error = %e, "could not poll child");
                false
            }
        });
    }
}

impl ProcessSupervisor for ShellSupervisor {
    fn spawn(&mut self, command: &str) -> Result<u32> {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(command);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let child = cmd.spawn().map_err(|source| DockError::LaunchFailure {
            command: command.to_owned(),
            source,
        })?;
        let pid = child.id();
        tracing::info!(pid, command, "launched");
        self.children.insert(pid, child);
        Ok(pid)
    }

    fn has_exited(&mut self, pid: u32) -> bool {
        self.reap();
        !self.children.contains_key(&pid)
    }

    fn terminate(&mut self, pid: u32) {
        let system = System::new_all();
        match system.process(Pid::from_u32(pid)) {
            Some(process) => match process.kill_with(Signal::Term) {
                Some(true) => tracing::debug!(pid, "sent SIGTERM"),
                Some(false) => tracing::warn!(pid, "failed to signal process"),
                None => tracing::warn!(pid, "SIGTERM is not supported on this platform"),
            },
            None => tracing::debug!(pid, "process already gone"),
        }
    }
}

/// Append `argument` to `command`, quoted for the shell.
pub fn command_with_argument(command: &str, argument: Option<&str>) -> String {
    let Some(arg) = argument.filter(|a| !a.is_empty()) else {
        return command.to_owned();
    };
    match shlex::try_quote(arg) {
        Ok(quoted) => format!("{command} {quoted}"),
        Err(e) => {
            tracing::warn!(error = %e, "dropping argument that cannot be quoted");
            command.to_owned()
        }
    }
}
