pub mod player;
pub mod scheduler;

pub use self::player::{NotePlayer, NoteState};
pub use self::scheduler::{ChordHandle, ChordScheduler, NoteReport};

use failure::Fail;

use crate::midi::types::U7;
use crate::midi::ChannelError;
use crate::time::Beats;

#[derive(Debug, Fail, Clone, PartialEq)]
pub enum PlaybackError {
  #[fail(
    display = "Failed to write note (p={}, v={}, d={}): {}",
    pitch, velocity, duration, cause
  )]
  Write {
    pitch: U7,
    velocity: U7,
    duration: Beats,
    cause: ChannelError,
  },

  #[fail(display = "Failed to acquire the MIDI channel: {}", cause)]
  Channel { cause: ChannelError },

  #[fail(display = "Failed to close the MIDI channel: {}", cause)]
  Close { cause: ChannelError },

  #[fail(display = "Failed to start a note thread: {}", cause)]
  Spawn { cause: String },

  #[fail(display = "The note thread for pitch {} ended without reporting", pitch)]
  Lost { pitch: U7 },
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
