use std::time::Duration;

use super::{Beats, Tempo};

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

pub type UnitType = u64;
pub const UNITS_PER_SECOND: UnitType = NANOS_PER_SECOND as UnitType;
pub const UNITS_PER_NANO: UnitType = NANOS_PER_SECOND / UNITS_PER_SECOND;

const SECONDS_PER_MINUTE: u64 = 60;
pub const UNITS_PER_MINUTE: u64 = UNITS_PER_SECOND * SECONDS_PER_MINUTE;

///! Wall-clock time used for note holds and event offsets
#[derive(Debug, PartialOrd, PartialEq, Clone, Copy)]
pub struct ClockTime(UnitType);

impl ClockTime {
  pub fn zero() -> ClockTime {
    ClockTime(0)
  }

  /// Converts a number of beats into wall-clock time at the given tempo.
  /// Negative or NaN beats give zero, a hold is never negative.
  pub fn from_beats(beats: Beats, tempo: Tempo) -> ClockTime {
    let minutes = beats / f64::from(tempo);
    if minutes > 0.0 {
      ClockTime((minutes * UNITS_PER_MINUTE as f64).round() as UnitType)
    } else {
      ClockTime::zero()
    }
  }

  pub fn to_nanos(&self) -> u64 {
    self.0 as u64 / UNITS_PER_NANO
  }

  pub fn to_duration(&self) -> Duration {
    Duration::from_nanos(self.to_nanos())
  }
}
