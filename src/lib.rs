//! Mirror MIDI notes from one input device to one output device.
//!
//! Every note-on/note-off is rewritten to `124 - note` (an inversion around
//! D4), everything else is passed through. Messages can be logged in a
//! human readable form on the way.
//!
//! ```
//! use midi_mirror::io::mock::{MockSink, MockSource, RecordingDiagnostics};
//! use midi_mirror::{Relay, RelayOptions};
//!
//! fn main() -> midi_mirror::Result<()> {
//!     let source = MockSource::new();
//!     let sink = MockSink::new();
//!     let mut relay = Relay::create(
//!         source.clone(),
//!         sink.clone(),
//!         RecordingDiagnostics::new(),
//!         RelayOptions::default(),
//!     )?;
//!     source.emit(&[0x90, 60, 100]);
//!     assert_eq!(sink.sent(), vec![vec![0x90, 64, 100]]);
//!     relay.disconnect()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod general;
pub mod io;
pub mod midi;

pub use config::Config;
pub use error::{Error, RelayError, Result};
pub use general::relay::{Outcome, Relay, RelayOptions};
pub use midi::{decode, format_midi_data};
