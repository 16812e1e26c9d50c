use super::messages::Message;
use super::types::{U4, U7};

#[inline]
fn u4(d: &U4) -> u8 {
  d & 0x0f
}

#[inline]
fn u7(d: &U7) -> u8 {
  d & 0x7f
}

#[inline]
fn status_and_channel(status: U4, channel: &U4) -> u8 {
  (status << 4) | u4(channel)
}

/// A three byte channel message, as accepted by a device's short write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortMessage {
  pub status: u8,
  pub data1: u8,
  pub data2: u8,
}

pub struct Encoder;

impl Encoder {
  pub fn encode(msg: &Message) -> ShortMessage {
    match msg {
      Message::NoteOff {
        channel,
        key,
        velocity,
      } => ShortMessage {
        status: status_and_channel(0b1000, channel),
        data1: u7(key),
        data2: u7(velocity),
      },
      Message::NoteOn {
        channel,
        key,
        velocity,
      } => ShortMessage {
        status: status_and_channel(0b1001, channel),
        data1: u7(key),
        data2: u7(velocity),
      },
    }
  }
}
