use std::thread;

use log::{debug, error, trace};

use crate::midi::types::U4;
use crate::midi::{ChannelError, ChannelGuard, Message, OutputChannel};
use crate::note::Note;
use crate::time::{ClockTime, Tempo};

use super::{PlaybackError, PlaybackResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
  Idle,
  OnSent,
  Holding,
  OffSent,
  Done,
  Failed,
}

impl NoteState {
  pub fn is_terminal(&self) -> bool {
    *self == NoteState::Done || *self == NoteState::Failed
  }
}

/// Plays one note to completion: note-on, hold, note-off.
///
/// The channel is only held while a message is written, so the notes of
/// a chord played from several threads interleave freely on the wire.
pub struct NotePlayer {
  note: Note,
  midi_channel: U4,
  offset: ClockTime,
  hold: ClockTime,
  state: NoteState,
  error: Option<PlaybackError>,
}

impl NotePlayer {
  pub fn new(note: Note, tempo: Tempo, midi_channel: U4) -> NotePlayer {
    NotePlayer {
      note,
      midi_channel,
      offset: ClockTime::from_beats(note.offset, tempo),
      hold: ClockTime::from_beats(note.duration, tempo),
      state: NoteState::Idle,
      error: None,
    }
  }

  pub fn note(&self) -> &Note {
    &self.note
  }

  pub fn state(&self) -> NoteState {
    self.state
  }

  pub fn hold(&self) -> ClockTime {
    self.hold
  }

  /// Runs the whole unit. Once the note-on is out the note-off is always
  /// attempted, there is no way to cut a holding note short. A finished
  /// unit is never played again: it keeps answering with its outcome.
  pub fn play(&mut self, channel: &OutputChannel) -> PlaybackResult<()> {
    match self.state {
      NoteState::Idle => {}
      NoteState::Failed => {
        return Err(self.error.clone().unwrap_or(PlaybackError::Lost {
          pitch: self.note.pitch,
        }))
      }
      _ => return Ok(()),
    }

    if self.offset > ClockTime::zero() {
      thread::sleep(self.offset.to_duration());
    }

    let note_on = self.note.note_on(self.midi_channel);
    self.write(channel.send(&note_on), &note_on, NoteState::OnSent)?;

    self.transition(NoteState::Holding);
    thread::sleep(self.hold.to_duration());

    let note_off = self.note.note_off(self.midi_channel);
    self.write(channel.send(&note_off), &note_off, NoteState::OffSent)?;

    self.transition(NoteState::Done);
    Ok(())
  }

  /// Writes a note as a single discrete event on an already locked channel.
  pub fn send_event(
    guard: &mut ChannelGuard<'_>,
    note: &Note,
    midi_channel: U4,
  ) -> PlaybackResult<()> {
    let msg = note.event(midi_channel);
    guard
      .send(&msg)
      .map(|()| log_written(note, &msg))
      .map_err(|cause| {
        let err = write_error(note, cause);
        error!("{}", err);
        err
      })
  }

  fn write(
    &mut self,
    result: Result<(), ChannelError>,
    msg: &Message,
    next: NoteState,
  ) -> PlaybackResult<()> {
    match result {
      Ok(()) => {
        log_written(&self.note, msg);
        self.transition(next);
        Ok(())
      }
      Err(cause) => {
        let err = write_error(&self.note, cause);
        error!("{}", err);
        self.transition(NoteState::Failed);
        self.error = Some(err.clone());
        Err(err)
      }
    }
  }

  fn transition(&mut self, next: NoteState) {
    trace!("p={} {:?} -> {:?}", self.note.pitch, self.state, next);
    self.state = next;
  }
}

fn log_written(note: &Note, msg: &Message) {
  let kind = if msg.is_note_on() { "on" } else { "off" };
  debug!(
    "{} p={} v={} d={}",
    kind, note.pitch, note.velocity, note.duration
  );
}

fn write_error(note: &Note, cause: ChannelError) -> PlaybackError {
  PlaybackError::Write {
    pitch: note.pitch,
    velocity: note.velocity,
    duration: note.duration,
    cause,
  }
}

#[cfg(test)]
mod test {
  use std::time::{Duration, Instant};

  use super::*;
  use crate::midi::dummy::DummyDevice;
  use crate::midi::{NOTE_OFF, NOTE_ON};

  // one beat lasts 10ms
  fn fast_tempo() -> Tempo {
    Tempo::new(6000.0).unwrap()
  }

  #[test]
  pub fn plays_on_then_off() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 1.0), fast_tempo(), 0);

    assert_eq!(player.state(), NoteState::Idle);
    player.play(&channel).unwrap();

    assert_eq!(player.state(), NoteState::Done);
    assert_eq!(
      log.messages(),
      vec![(NOTE_ON, 60, 100), (NOTE_OFF, 60, 100)]
    );
  }

  #[test]
  pub fn off_waits_for_hold() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 3.0), fast_tempo(), 0);

    assert_eq!(player.hold().to_duration(), Duration::from_millis(30));
    player.play(&channel).unwrap();

    let writes = log.writes();
    assert!(writes[1].at.duration_since(writes[0].at) >= Duration::from_millis(30));
  }

  #[test]
  pub fn offset_delays_on() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let note = Note::new(60, 100, 0.0).with_offset(2.0);
    let mut player = NotePlayer::new(note, fast_tempo(), 0);

    let start = Instant::now();
    player.play(&channel).unwrap();

    let writes = log.writes();
    assert!(writes[0].at.duration_since(start) >= Duration::from_millis(20));
  }

  #[test]
  pub fn zero_duration_still_sends_both() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(72, 80, 0.0), fast_tempo(), 0);

    player.play(&channel).unwrap();

    assert_eq!(player.hold(), ClockTime::zero());
    assert_eq!(log.messages(), vec![(NOTE_ON, 72, 80), (NOTE_OFF, 72, 80)]);
  }

  #[test]
  pub fn uses_midi_channel() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 0.0), fast_tempo(), 9);

    player.play(&channel).unwrap();

    assert_eq!(log.messages(), vec![(0x99, 60, 100), (0x89, 60, 100)]);
  }

  #[test]
  pub fn failed_on_skips_off() {
    let (device, log) = DummyDevice::failing_at(0);
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 1.0), fast_tempo(), 0);

    let result = player.play(&channel);

    assert_eq!(player.state(), NoteState::Failed);
    assert_eq!(log.attempts(), 1);
    assert!(log.messages().is_empty());
    match result {
      Err(PlaybackError::Write {
        pitch: 60,
        velocity: 100,
        ..
      }) => {}
      other => panic!("unexpected result: {:?}", other),
    }
  }

  #[test]
  pub fn failed_off_is_reported() {
    let (device, log) = DummyDevice::failing_at(1);
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 1.0), fast_tempo(), 0);

    assert!(player.play(&channel).is_err());

    assert_eq!(player.state(), NoteState::Failed);
    assert_eq!(log.messages(), vec![(NOTE_ON, 60, 100)]);
  }

  #[test]
  pub fn finished_player_does_not_replay() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 0.0), fast_tempo(), 0);

    player.play(&channel).unwrap();
    player.play(&channel).unwrap();

    assert!(player.state().is_terminal());
    assert_eq!(log.messages().len(), 2);
  }

  #[test]
  pub fn failed_player_keeps_failing() {
    let (device, log) = DummyDevice::failing_at(0);
    let channel = OutputChannel::new(Box::new(device));
    let mut player = NotePlayer::new(Note::new(60, 100, 0.0), fast_tempo(), 0);

    let first = player.play(&channel);
    let replay = player.play(&channel);

    assert!(first.is_err());
    assert_eq!(replay, first);
    assert_eq!(player.state(), NoteState::Failed);
    assert_eq!(log.attempts(), 1);
  }

  #[test]
  pub fn send_event_writes_selected_message() {
    let (device, log) = DummyDevice::new();
    let channel = OutputChannel::new(Box::new(device));
    let mut guard = channel.lock().unwrap();

    NotePlayer::send_event(&mut guard, &Note::off(64, 70), 0).unwrap();
    drop(guard);

    assert_eq!(log.messages(), vec![(NOTE_OFF, 64, 70)]);
  }

  #[test]
  pub fn send_event_failure_carries_note() {
    let (device, _log) = DummyDevice::failing_at(0);
    let channel = OutputChannel::new(Box::new(device));
    let mut guard = channel.lock().unwrap();

    let result = NotePlayer::send_event(&mut guard, &Note::on(64, 70), 0);

    match result {
      Err(PlaybackError::Write { pitch: 64, .. }) => {}
      other => panic!("unexpected result: {:?}", other),
    }
  }
}
