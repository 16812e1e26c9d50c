use super::types::{U4, U7};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
  NoteOff { channel: U4, key: U7, velocity: U7 },
  NoteOn { channel: U4, key: U7, velocity: U7 },
}

impl Message {
  pub fn is_note_on(&self) -> bool {
    match self {
      Message::NoteOn { .. } => true,
      Message::NoteOff { .. } => false,
    }
  }
}
