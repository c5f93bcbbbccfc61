//! Adapter implementations for port traits.
//!
//! - `live/` talks to HTTP origins and AWS
//! - `recording/` wraps live adapters and captures calls to a cassette
//! - `replaying/` serves captured calls back from a cassette

pub mod live;
pub mod recording;
pub mod replaying;
