pub mod channel;
pub mod encoder;
pub mod messages;
pub mod types;

#[cfg(test)]
pub mod dummy;

pub use self::channel::{ChannelError, ChannelGuard, ChannelResult, MidiDevice, OutputChannel};
pub use self::encoder::{Encoder, ShortMessage};
pub use self::messages::Message;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
