use failure::Fail;

#[derive(Debug, Fail, PartialEq)]
pub enum TempoError {
  #[fail(display = "Tempo must be a positive number of beats per minute: {}", bpm)]
  Invalid { bpm: f64 },
}

/// Beats per minute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo(f64);

impl Tempo {
  pub fn new(bpm: f64) -> Result<Tempo, TempoError> {
    if bpm.is_finite() && bpm > 0.0 {
      Ok(Tempo(bpm))
    } else {
      Err(TempoError::Invalid { bpm })
    }
  }

  pub fn get_value(&self) -> f64 {
    self.0
  }
}

impl Default for Tempo {
  fn default() -> Tempo {
    Tempo(120.0)
  }
}

impl From<Tempo> for f64 {
  fn from(item: Tempo) -> Self {
    item.0
  }
}
