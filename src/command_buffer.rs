//! Command buffer (§4.D): an append-only, replayable recording of commands.

use crate::command::Command;
use crate::error::{Error, Result};

/// An ordered sequence of recorded [`Command`]s. `begin`/`add`/`end` is the
/// only legal way to populate one; a sealed buffer may be submitted to a
/// queue zero or more times (§4.D).
#[derive(Debug, Default)]
pub struct CommandBuffer<'a> {
    commands: Vec<Command<'a>>,
    recording: bool,
    sealed: bool,
}

impl<'a> CommandBuffer<'a> {
    pub fn new() -> CommandBuffer<'a> {
        CommandBuffer {
            commands: Vec::new(),
            recording: false,
            sealed: true,
        }
    }

    /// Clears the command list and opens it for recording. Fails if a
    /// previous recording was not `end`ed.
    pub fn begin(&mut self) -> Result<()> {
        if self.recording {
            return Err(Error::InvalidState(
                "command buffer begin called before end of previous recording",
            ));
        }
        self.commands.clear();
        self.recording = true;
        self.sealed = false;
        Ok(())
    }

    /// Appends one command. Fails if called before `begin` or after `end`.
    pub fn add(&mut self, command: Command<'a>) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidState(
                "command buffer add called after end or before begin",
            ));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Appends a batch of commands in order. Equivalent to calling `add`
    /// once per element.
    pub fn add_all(&mut self, commands: impl IntoIterator<Item = Command<'a>>) -> Result<()> {
        for command in commands {
            self.add(command)?;
        }
        Ok(())
    }

    /// Seals the buffer for submission. Further `add` calls fail until the
    /// next `begin`.
    pub fn end(&mut self) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidState(
                "command buffer end called without a matching begin",
            ));
        }
        self.recording = false;
        self.sealed = true;
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn commands(&self) -> &[Command<'a>] {
        &self.commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_add_end_round_trips_the_sequence() {
        let mut buf = CommandBuffer::new();
        buf.begin().unwrap();
        buf.add(Command::EndPass).unwrap();
        buf.add(Command::DebugEndGroup).unwrap();
        buf.end().unwrap();
        assert_eq!(buf.commands().len(), 2);
    }

    #[test]
    fn add_after_end_fails() {
        let mut buf = CommandBuffer::new();
        buf.begin().unwrap();
        buf.end().unwrap();
        assert!(buf.add(Command::EndPass).is_err());
    }

    #[test]
    fn begin_before_end_of_previous_recording_fails() {
        let mut buf = CommandBuffer::new();
        buf.begin().unwrap();
        assert!(buf.begin().is_err());
    }
}
