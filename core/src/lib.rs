pub mod config;
pub mod midi;
pub mod note;
pub mod playback;
pub mod time;

pub use crate::note::{Chord, Note};
pub use crate::playback::{ChordHandle, ChordScheduler, NotePlayer, NoteState, PlaybackError};
pub use crate::time::Tempo;
