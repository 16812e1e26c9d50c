use std::sync::Arc;

use log::{debug, error, info};

use failure::{Error, Fail};

use piano_core::config::Config;
use piano_core::midi::OutputChannel;
use piano_core::{Chord, ChordScheduler, Tempo};

mod midi;
use crate::midi::{PortMidiDevice, PORT_MIDI_ID};

const PIANO_CONFIG: &str = "PIANO_CONFIG";
const DEFAULT_PIANO_CONFIG: &str = "piano.toml";

const PIANO_LOG_CONFIG: &str = "PIANO_LOG_CONFIG";
const DEFAULT_PIANO_LOG_CONFIG: &str = "log4rs.yaml";

#[derive(Debug, Fail)]
enum MainError {
  #[fail(display = "Failed to init logging: {}", cause)]
  LoggingInit { cause: String },
}

fn main() -> Result<(), Error> {
  init_logging()?;

  let config = init_config()?;

  let tempo = config.playback.tempo()?;

  let scheduler = init_midi(&config)?;

  play_chords(&scheduler, &config.chords, tempo);

  scheduler.close()?;

  Ok(())
}

fn init_logging() -> Result<(), Error> {
  let log_config_path =
    std::env::var(PIANO_LOG_CONFIG).unwrap_or_else(|_| DEFAULT_PIANO_LOG_CONFIG.to_string());

  log4rs::init_file(log_config_path.as_str(), Default::default()).map_err(|err| {
    MainError::LoggingInit {
      cause: err.to_string(),
    }
  })?;

  Ok(())
}

fn init_config() -> Result<Config, Error> {
  let config_path =
    std::env::var(PIANO_CONFIG).unwrap_or_else(|_| DEFAULT_PIANO_CONFIG.to_string());

  info!("Loading piano configuration from {} ...", config_path);
  let config = Config::from_file(config_path.as_str())?;
  debug!("{:#?}", config);

  Ok(config)
}

fn init_midi(config: &Config) -> Result<ChordScheduler, Error> {
  info!("Initialising MIDI ...");

  let device = PortMidiDevice::open(&config.midi)?;
  let channel = Arc::new(OutputChannel::new(Box::new(device)));

  debug!("MIDI Driver: {}, channel: {}", PORT_MIDI_ID, channel.name());

  Ok(ChordScheduler::new(channel).with_midi_channel(config.playback.channel))
}

fn play_chords(scheduler: &ChordScheduler, chords: &[Chord], tempo: Tempo) {
  info!("Playing {} chords at {} bpm ...", chords.len(), tempo.get_value());

  for (index, chord) in chords.iter().enumerate() {
    let result = scheduler
      .play_chord(chord, tempo)
      .and_then(|handle| handle.wait());

    if let Err(err) = result {
      error!("Chord {} did not play completely: {}", index, err);
    }
  }
}
