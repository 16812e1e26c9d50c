use std::sync::{Mutex, MutexGuard};

use failure::Fail;
use log::debug;

use super::encoder::Encoder;
use super::messages::Message;

#[derive(Debug, Fail, Clone, PartialEq)]
pub enum ChannelError {
  #[fail(display = "The MIDI channel is closed")]
  Closed,

  #[fail(display = "The MIDI channel lock was poisoned by a failed writer")]
  Poisoned,

  #[fail(display = "MIDI device failure: {}", cause)]
  Device { cause: String },
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// An opened bidirectional MIDI stream.
///
/// Implementations are opened by the application and handed over to an
/// [`OutputChannel`], which owns them from then on.
pub trait MidiDevice: Send {
  fn name(&self) -> &str;

  fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> ChannelResult<()>;

  fn close(&mut self) -> ChannelResult<()>;
}

/// The single shared output of a playback session.
///
/// Every writer goes through the inner mutex. `send` holds it for one
/// message only, while `lock` hands out a guard that keeps the channel for
/// as many messages as the caller needs.
pub struct OutputChannel {
  name: String,
  device: Mutex<Option<Box<dyn MidiDevice>>>,
}

impl OutputChannel {
  pub fn new(device: Box<dyn MidiDevice>) -> OutputChannel {
    OutputChannel {
      name: device.name().to_string(),
      device: Mutex::new(Some(device)),
    }
  }

  pub fn name(&self) -> &str {
    self.name.as_str()
  }

  pub fn lock(&self) -> ChannelResult<ChannelGuard<'_>> {
    self
      .device
      .lock()
      .map(|device| ChannelGuard { device })
      .map_err(|_| ChannelError::Poisoned)
  }

  pub fn send(&self, msg: &Message) -> ChannelResult<()> {
    self.lock()?.send(msg)
  }

  pub fn is_closed(&self) -> bool {
    self
      .device
      .lock()
      .map(|device| device.is_none())
      .unwrap_or(true)
  }

  /// Closes the underlying device. Any later write or close fails with
  /// `ChannelError::Closed`.
  pub fn close(&self) -> ChannelResult<()> {
    debug!("Closing MIDI channel {} ...", self.name);
    let mut guard = self.lock()?;
    match guard.device.take() {
      Some(mut device) => device.close(),
      None => Err(ChannelError::Closed),
    }
  }
}

pub struct ChannelGuard<'a> {
  device: MutexGuard<'a, Option<Box<dyn MidiDevice>>>,
}

impl<'a> ChannelGuard<'a> {
  pub fn send(&mut self, msg: &Message) -> ChannelResult<()> {
    let device = self.device.as_mut().ok_or(ChannelError::Closed)?;
    let short = Encoder::encode(msg);
    device.write_short(short.status, short.data1, short.data2)
  }
}
