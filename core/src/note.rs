use serde::Deserializer;
use serde_derive::Deserialize;

use crate::midi::types::{U4, U7};
use crate::midi::Message;
use crate::time::Beats;

fn default_on() -> bool {
  true
}

fn u7<'de, D>(deserializer: D) -> Result<U7, D::Error>
where
  D: Deserializer<'de>,
{
  <u8 as serde::Deserialize>::deserialize(deserializer).map(|value| value & 0x7f)
}

/// One pitch event.
///
/// A note played through `NotePlayer::play` owns both its note-on and its
/// note-off, `duration` beats apart. A note played as a discrete event only
/// emits the message selected by `on`; balancing ons and offs is up to the
/// caller in that case.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Note {
  #[serde(deserialize_with = "u7")]
  pub pitch: U7,
  #[serde(deserialize_with = "u7")]
  pub velocity: U7,
  #[serde(default)]
  pub duration: Beats,
  #[serde(default = "default_on")]
  pub on: bool,
  #[serde(default)]
  pub offset: Beats,
}

impl Note {
  pub fn new(pitch: U7, velocity: U7, duration: Beats) -> Note {
    Note {
      pitch: pitch & 0x7f,
      velocity: velocity & 0x7f,
      duration,
      on: true,
      offset: 0.0,
    }
  }

  pub fn on(pitch: U7, velocity: U7) -> Note {
    Note::new(pitch, velocity, 0.0)
  }

  pub fn off(pitch: U7, velocity: U7) -> Note {
    Note {
      on: false,
      ..Note::new(pitch, velocity, 0.0)
    }
  }

  pub fn with_offset(self, offset: Beats) -> Note {
    Note { offset, ..self }
  }

  pub fn note_on(&self, channel: U4) -> Message {
    Message::NoteOn {
      channel,
      key: self.pitch,
      velocity: self.velocity,
    }
  }

  pub fn note_off(&self, channel: U4) -> Message {
    Message::NoteOff {
      channel,
      key: self.pitch,
      velocity: self.velocity,
    }
  }

  /// The message this note stands for when used as a discrete event
  pub fn event(&self, channel: U4) -> Message {
    if self.on {
      self.note_on(channel)
    } else {
      self.note_off(channel)
    }
  }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Chord {
  pub notes: Vec<Note>,
}

impl Chord {
  pub fn new(notes: Vec<Note>) -> Chord {
    Chord { notes }
  }

  pub fn len(&self) -> usize {
    self.notes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.notes.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Note> {
    self.notes.iter()
  }
}

impl From<Vec<Note>> for Chord {
  fn from(notes: Vec<Note>) -> Self {
    Chord::new(notes)
  }
}
