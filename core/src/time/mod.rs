pub mod clock;
pub mod tempo;

pub use self::clock::ClockTime;
pub use self::tempo::Tempo;

pub type Beats = f64;
