use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::channel::{ChannelError, ChannelResult, MidiDevice};

#[derive(Debug, Clone, Copy)]
pub struct Written {
  pub at: Instant,
  pub status: u8,
  pub data1: u8,
  pub data2: u8,
}

#[derive(Default)]
struct State {
  writes: Vec<Written>,
  attempts: usize,
  closed: bool,
}

/// Read side of a `DummyDevice`, kept by the test after the device is
/// handed over to a channel.
#[derive(Clone)]
pub struct DummyLog {
  state: Arc<Mutex<State>>,
}

impl DummyLog {
  pub fn writes(&self) -> Vec<Written> {
    self.state.lock().unwrap().writes.clone()
  }

  pub fn messages(&self) -> Vec<(u8, u8, u8)> {
    self
      .writes()
      .iter()
      .map(|w| (w.status, w.data1, w.data2))
      .collect()
  }

  pub fn attempts(&self) -> usize {
    self.state.lock().unwrap().attempts
  }

  pub fn is_closed(&self) -> bool {
    self.state.lock().unwrap().closed
  }
}

/// A device that records every short message written to it, and fails
/// the write attempt at `fail_at` when set.
pub struct DummyDevice {
  state: Arc<Mutex<State>>,
  fail_at: Option<usize>,
  fail_close: bool,
}

impl DummyDevice {
  pub fn new() -> (DummyDevice, DummyLog) {
    let state = Arc::new(Mutex::new(State::default()));
    let device = DummyDevice {
      state: Arc::clone(&state),
      fail_at: None,
      fail_close: false,
    };
    (device, DummyLog { state })
  }

  pub fn failing_at(index: usize) -> (DummyDevice, DummyLog) {
    let (device, log) = Self::new();
    let device = DummyDevice {
      fail_at: Some(index),
      ..device
    };
    (device, log)
  }

  pub fn failing_close(self) -> DummyDevice {
    DummyDevice {
      fail_close: true,
      ..self
    }
  }
}

impl MidiDevice for DummyDevice {
  fn name(&self) -> &str {
    "dummy"
  }

  fn write_short(&mut self, status: u8, data1: u8, data2: u8) -> ChannelResult<()> {
    let mut state = self.state.lock().unwrap();
    let attempt = state.attempts;
    state.attempts += 1;
    if self.fail_at == Some(attempt) {
      return Err(ChannelError::Device {
        cause: format!("injected failure on write {}", attempt),
      });
    }
    state.writes.push(Written {
      at: Instant::now(),
      status,
      data1,
      data2,
    });
    Ok(())
  }

  fn close(&mut self) -> ChannelResult<()> {
    self.state.lock().unwrap().closed = true;
    if self.fail_close {
      Err(ChannelError::Device {
        cause: "injected failure on close".to_string(),
      })
    } else {
      Ok(())
    }
  }
}
