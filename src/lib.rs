//! Compositor: generates one photorealistic image of a person wearing given
//! clothing in a given place.
//!
//! Each request fetches and analyzes the three inputs concurrently, turns the
//! analyses into a text prompt, asks a generative backend for an image, and
//! publishes the result behind a time-limited URL. External services sit
//! behind the traits in [`ports`]; [`adapters`] provides live, recording and
//! replaying implementations of each.

pub mod adapters;
pub mod analysis;
pub mod api;
pub mod cassette;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod generation;
pub mod model;
pub mod orchestrator;
pub mod ports;
pub mod prompt;
pub mod publish;

#[cfg(test)]
mod test_support;
