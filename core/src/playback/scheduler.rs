use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info};

use crate::midi::types::U4;
use crate::midi::OutputChannel;
use crate::note::{Chord, Note};
use crate::time::{ClockTime, Tempo};

use super::player::{NotePlayer, NoteState};
use super::{PlaybackError, PlaybackResult};

/// Outcome of one note unit launched by `ChordScheduler::play_chord`
#[derive(Debug, Clone)]
pub struct NoteReport {
  pub index: usize,
  pub note: Note,
  pub state: NoteState,
  pub result: PlaybackResult<()>,
}

/// Completion side of a chord launched with `ChordScheduler::play_chord`.
///
/// Dropping it leaves the notes playing; their failures are then only
/// visible in the log.
pub struct ChordHandle {
  notes: Vec<Note>,
  reports_rx: Receiver<NoteReport>,
}

impl ChordHandle {
  pub fn len(&self) -> usize {
    self.notes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.notes.is_empty()
  }

  /// Blocks until every note unit has finished and returns their reports
  /// in completion order. A unit that died without reporting shows up as
  /// `PlaybackError::Lost`.
  pub fn wait_all(self) -> Vec<NoteReport> {
    let mut reports: Vec<NoteReport> = self.reports_rx.iter().collect();

    let mut reported = vec![false; self.notes.len()];
    for report in reports.iter() {
      if let Some(seen) = reported.get_mut(report.index) {
        *seen = true;
      }
    }

    let missing = self
      .notes
      .iter()
      .enumerate()
      .filter(|(index, _)| !reported[*index])
      .map(|(index, note)| NoteReport {
        index,
        note: *note,
        state: NoteState::Failed,
        result: Err(PlaybackError::Lost { pitch: note.pitch }),
      })
      .collect::<Vec<NoteReport>>();

    reports.extend(missing);
    reports
  }

  /// Blocks until every note unit has finished, returning the first error.
  pub fn wait(self) -> PlaybackResult<()> {
    self
      .wait_all()
      .into_iter()
      .map(|report| report.result)
      .collect()
  }
}

/// Plays notes against one shared output channel.
///
/// Two ways of playing are offered and they do not share guarantees:
///
/// * `play_chord` starts one thread per note. Notes start together and hold
///   independently, each write takes the channel lock for that write only,
///   so ons and offs of different notes interleave in any order. It is only
///   safe when nothing else is writing a sequence to the channel.
/// * `play_events` writes a pre-split list of on/off events in the given
///   order while holding the channel for the whole call. Overlapping calls
///   never interleave, and the first failed write ends the call.
pub struct ChordScheduler {
  channel: Arc<OutputChannel>,
  midi_channel: U4,
}

impl ChordScheduler {
  pub fn new(channel: Arc<OutputChannel>) -> ChordScheduler {
    ChordScheduler {
      channel,
      midi_channel: 0,
    }
  }

  pub fn with_midi_channel(self, midi_channel: U4) -> ChordScheduler {
    ChordScheduler {
      midi_channel: midi_channel & 0x0f,
      ..self
    }
  }

  pub fn channel(&self) -> &Arc<OutputChannel> {
    &self.channel
  }

  pub fn midi_channel(&self) -> U4 {
    self.midi_channel
  }

  /// Plays a single note on the calling thread.
  pub fn play_note(&self, note: Note, tempo: Tempo) -> PlaybackResult<()> {
    NotePlayer::new(note, tempo, self.midi_channel).play(&self.channel)
  }

  /// Starts every note of the chord on its own thread and returns without
  /// waiting for them.
  ///
  /// If a thread cannot be started the call fails with
  /// `PlaybackError::Spawn`, but the notes started before it keep playing
  /// with nobody waiting for them: their outcome only reaches the log.
  pub fn play_chord(&self, chord: &Chord, tempo: Tempo) -> PlaybackResult<ChordHandle> {
    debug!(
      "Playing chord of {} notes at {} bpm ...",
      chord.len(),
      tempo.get_value()
    );

    let (reports_tx, reports_rx) = crossbeam_channel::unbounded::<NoteReport>();

    for (index, note) in chord.iter().enumerate() {
      self.spawn_note(index, *note, tempo, reports_tx.clone())?;
    }

    Ok(ChordHandle {
      notes: chord.notes.clone(),
      reports_rx,
    })
  }

  fn spawn_note(
    &self,
    index: usize,
    note: Note,
    tempo: Tempo,
    reports_tx: Sender<NoteReport>,
  ) -> PlaybackResult<()> {
    let channel = Arc::clone(&self.channel);
    let mut player = NotePlayer::new(note, tempo, self.midi_channel);

    thread::Builder::new()
      .name(format!("note-{}", note.pitch))
      .spawn(move || {
        let result = player.play(&channel);
        let report = NoteReport {
          index,
          note,
          state: player.state(),
          result,
        };
        if let Err(send_err) = reports_tx.send(report) {
          if let Err(err) = send_err.into_inner().result {
            error!("Note failed with nobody waiting for it: {}", err);
          }
        }
      })
      .map(|_| ())
      .map_err(|err| PlaybackError::Spawn {
        cause: err.to_string(),
      })
  }

  /// Writes the events strictly in order under one channel lock. An event
  /// with an offset is written no earlier than `offset` beats after the
  /// call started; the lock stays held while waiting for it.
  pub fn play_events(&self, events: &[Note], tempo: Tempo) -> PlaybackResult<()> {
    debug!("Playing {} events at {} bpm ...", events.len(), tempo.get_value());

    let mut guard = self
      .channel
      .lock()
      .map_err(|cause| PlaybackError::Channel { cause })?;

    let start = Instant::now();
    for event in events {
      let due = ClockTime::from_beats(event.offset, tempo).to_duration();
      let elapsed = start.elapsed();
      if due > elapsed {
        thread::sleep(due - elapsed);
      }
      NotePlayer::send_event(&mut guard, event, self.midi_channel)?;
    }

    Ok(())
  }

  pub fn close(&self) -> PlaybackResult<()> {
    info!("Closing MIDI channel {} ...", self.channel.name());
    self
      .channel
      .close()
      .map_err(|cause| PlaybackError::Close { cause })
  }
}
