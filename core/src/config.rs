use failure::Error;

use serde_derive::Deserialize;

use std::fs::File;
use std::io::Read;

use crate::midi::types::U4;
use crate::note::Chord;
use crate::time::tempo::{Tempo, TempoError};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Midi {
  pub input_device: Option<i32>,
  pub output_device: Option<i32>,
  pub buffer_size: usize,
}

impl Default for Midi {
  fn default() -> Midi {
    Midi {
      input_device: None,
      output_device: None,
      buffer_size: 1024,
    }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Playback {
  pub tempo: f64,
  pub channel: U4,
}

impl Default for Playback {
  fn default() -> Playback {
    Playback {
      tempo: 120.0,
      channel: 0,
    }
  }
}

impl Playback {
  pub fn tempo(&self) -> Result<Tempo, TempoError> {
    Tempo::new(self.tempo)
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
  pub midi: Midi,
  pub playback: Playback,
  pub chords: Vec<Chord>,
}

impl Config {
  pub fn from_file<'a, T>(path: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let mut content = String::new();
    let path_str = path.into();
    let mut file = File::open(path_str)?;
    file.read_to_string(&mut content)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
  }

  pub fn from_str<'a, T>(content: T) -> Result<Config, Error>
  where
    T: Into<&'a str>,
  {
    let config: Config = toml::from_str(content.into())?;
    Ok(config)
  }
}
