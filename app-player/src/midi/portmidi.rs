use std::thread;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use portmidi::{DeviceInfo, InputPort, MidiEvent, MidiMessage, OutputPort, PortMidi};

use piano_core::config::Midi as MidiConfig;
use piano_core::midi::{ChannelError, ChannelResult, MidiDevice};

use super::{select_devices, DeviceDescriptor, MidiError, MidiResult};

pub const ID: &str = "PortMIDI";

enum Protocol {
  Write {
    message: MidiMessage,
    reply_tx: Sender<Result<(), String>>,
  },

  Stop,
}

/// The PortMidi context and the streams opened on it. PortMidi handles
/// never leave the thread that created them.
struct PortMidiSession {
  output: OutputPort,
  input: Option<InputPort>,
  context: PortMidi,
}

impl PortMidiSession {
  fn open(config: &MidiConfig) -> MidiResult<(String, PortMidiSession)> {
    info!("Initialising {} ...", ID);

    let context = PortMidi::new().map_err(|err| MidiError::Init {
      cause: format!("{:?}", err),
    })?;

    let devices = context.devices().map_err(|err| MidiError::Init {
      cause: format!("{:?}", err),
    })?;

    let descriptors: Vec<DeviceDescriptor> = devices.iter().map(Self::descriptor).collect();
    let selection = select_devices(&descriptors, config.input_device, config.output_device)?;

    match selection.input {
      Some(input) => info!(
        "Using input device {} and output device {}",
        input, selection.output
      ),
      None => info!("Using output device {}", selection.output),
    }

    let output_device = Self::device_info(&devices, selection.output)?;
    let name = output_device.name().clone();

    info!("Opening output stream");
    let output = context
      .output_port(output_device, config.buffer_size)
      .map_err(|err| MidiError::OutputOpen {
        cause: format!("Device={:?}, Error={:?}", name, err),
      })?;

    let input = match selection.input {
      Some(id) => {
        info!("Opening input stream");
        let input_device = Self::device_info(&devices, id)?;
        let input_name = input_device.name().clone();
        let port = context
          .input_port(input_device, config.buffer_size)
          .map_err(|err| MidiError::InputOpen {
            cause: format!("Device={:?}, Error={:?}", input_name, err),
          })?;
        Some(port)
      }
      None => {
        warn!("No input device available, opening the output stream only");
        None
      }
    };

    let session = PortMidiSession {
      output,
      input,
      context,
    };

    Ok((name, session))
  }

  fn descriptor(device: &DeviceInfo) -> DeviceDescriptor {
    DeviceDescriptor {
      id: device.id(),
      name: device.name().clone(),
      output: device.is_output(),
    }
  }

  fn device_info(devices: &[DeviceInfo], id: i32) -> MidiResult<DeviceInfo> {
    devices
      .iter()
      .find(|device| device.id() == id)
      .cloned()
      .ok_or_else(|| MidiError::DeviceNotFound { id: id.to_string() })
  }

  fn handle_messages(mut self, protocol_rx: Receiver<Protocol>) {
    debug!("Handling MIDI messages ...");

    for message in protocol_rx.iter() {
      match message {
        Protocol::Write { message, reply_tx } => {
          let event = MidiEvent {
            message,
            timestamp: 0,
          };
          let result = self
            .output
            .write_event(event)
            .map_err(|err| format!("{:?}", err));
          drop(reply_tx.send(result));
        }

        Protocol::Stop => break,
      }
    }

    self.close();
  }

  fn close(self) {
    let PortMidiSession {
      output,
      input,
      context,
    } = self;

    debug!("Closing output stream");
    drop(output);
    if let Some(input) = input {
      debug!("Closing input stream");
      drop(input);
    }
    debug!("Terminating {}", ID);
    drop(context);
  }
}

/// A device pair opened through PortMidi.
///
/// The streams live on a dedicated `midi-io` thread; writes are forwarded
/// to it and block until the driver has answered.
pub struct PortMidiDevice {
  name: String,
  protocol_tx: Sender<Protocol>,
  handler: Option<JoinHandle<()>>,
}

impl PortMidiDevice {
  pub fn open(config: &MidiConfig) -> MidiResult<PortMidiDevice> {
    info!("Spawning MIDI I/O thread ...");

    let (init_tx, init_rx) = crossbeam_channel::bounded::<MidiResult<String>>(1);
    let (protocol_tx, protocol_rx) = crossbeam_channel::unbounded::<Protocol>();
    let config = config.clone();

    let handler = thread::Builder::new()
      .name("midi-io".into())
      .spawn(move || match PortMidiSession::open(&config) {
        Ok((name, session)) => {
          drop(init_tx.send(Ok(name)));
          session.handle_messages(protocol_rx);
        }
        Err(err) => drop(init_tx.send(Err(err))),
      })
      .map_err(|err| MidiError::Start {
        cause: err.to_string(),
      })?;

    let name = init_rx.recv().map_err(|_| MidiError::Stop)??;

    Ok(PortMidiDevice {
      name,
      protocol_tx,
      handler: Some(handler),
    })
  }

  fn stop(&mut self) -> MidiResult<()> {
    match self.handler.take() {
      Some(handler) => {
        drop(self.protocol_tx.send(Protocol::Stop));
        handler.join().map_err(|_| MidiError::Stop)
      }
      None => Ok(()),
    }
  }
}

impl MidiDevice for PortMidiDevice {
  fn name(&self) -> &str {
    self.name.as_str()
  }

  fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> ChannelResult<()> {
    if self.handler.is_none() {
      return Err(ChannelError::Closed);
    }

    let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
    let message = MidiMessage {
      status,
      data1,
      data2,
    };

    self
      .protocol_tx
      .send(Protocol::Write { message, reply_tx })
      .map_err(|_| ChannelError::Closed)?;

    reply_rx
      .recv()
      .map_err(|_| ChannelError::Closed)?
      .map_err(|cause| ChannelError::Device { cause })
  }

  fn close(&mut self) -> ChannelResult<()> {
    info!("Stopping MIDI I/O thread ...");
    self.stop().map_err(|err| ChannelError::Device {
      cause: err.to_string(),
    })
  }
}

impl Drop for PortMidiDevice {
  fn drop(&mut self) {
    if let Err(err) = self.stop() {
      warn!("{}", err);
    }
  }
}
