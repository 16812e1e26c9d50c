mod portmidi;
pub use self::portmidi::{PortMidiDevice, ID as PORT_MIDI_ID};

use failure::Fail;
use log::info;

#[derive(Debug, Fail)]
pub enum MidiError {
  #[fail(display = "Failed to initialise the MIDI driver: {}", cause)]
  Init { cause: String },

  #[fail(display = "Device not found: {}", id)]
  DeviceNotFound { id: String },

  #[fail(display = "Failed to open an output stream: {}", cause)]
  OutputOpen { cause: String },

  #[fail(display = "Failed to open an input stream: {}", cause)]
  InputOpen { cause: String },

  #[fail(display = "Failed to create the MIDI I/O thread: {}", cause)]
  Start { cause: String },

  #[fail(display = "Failed to join the MIDI I/O thread")]
  Stop,
}

pub type MidiResult<T> = Result<T, MidiError>;

pub type DeviceId = i32;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
  pub id: DeviceId,
  pub name: String,
  pub output: bool,
}

impl DeviceDescriptor {
  pub fn direction(&self) -> &'static str {
    if self.output {
      "output"
    } else {
      "input"
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
  pub input: Option<DeviceId>,
  pub output: DeviceId,
}

/// Picks the device pair to open: the last output device and the last input
/// device listed, unless an explicit id is given for either of them.
pub fn select_devices(
  devices: &[DeviceDescriptor],
  input: Option<DeviceId>,
  output: Option<DeviceId>,
) -> MidiResult<Selection> {
  info!("Found {} devices", devices.len());
  for device in devices {
    info!("{}) {} {}", device.id, device.name, device.direction());
  }

  let find = |id: DeviceId| {
    devices
      .iter()
      .find(|device| device.id == id)
      .map(|device| device.id)
      .ok_or_else(|| MidiError::DeviceNotFound { id: id.to_string() })
  };

  let last = |output: bool| {
    devices
      .iter()
      .filter(|device| device.output == output)
      .last()
      .map(|device| device.id)
  };

  let output = match output {
    Some(id) => find(id)?,
    None => last(true).ok_or_else(|| MidiError::DeviceNotFound {
      id: "any output".to_string(),
    })?,
  };

  let input = match input {
    Some(id) => Some(find(id)?),
    None => last(false),
  };

  Ok(Selection { input, output })
}
