//! Pending-command handoff between the request receiver and the control loop

use crate::types::WheelCommand;
use parking_lot::Mutex;

/// Latest-wins cell holding the most recent mapped wheel command.
///
/// The receiver thread writes on request arrival; the control loop takes one
/// consistent snapshot per tick. This is a handoff, not a queue: an
/// overwritten command was never owed to the hardware.
#[derive(Default)]
pub struct CommandCell {
    inner: Mutex<WheelCommand>,
}

impl CommandCell {
    /// Create a cell holding the stopped command
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending command
    pub fn store(&self, cmd: WheelCommand) {
        *self.inner.lock() = cmd;
    }

    /// Snapshot the pending command
    pub fn snapshot(&self) -> WheelCommand {
        *self.inner.lock()
    }

    /// Reset the pending command to stopped
    pub fn reset(&self) {
        *self.inner.lock() = WheelCommand::stop();
    }
}
