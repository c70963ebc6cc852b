//! Space Shooter - a two-variant arcade shooter for the terminal.
//!
//! - `entities`: plain game data
//! - `compute`: the simulation step and other pure state transitions
//! - `session`: start/pause/finish state machine, countdown, best score
//! - `display` + `surface`: rendering onto a cell raster
//! - `input`: held-key sampling and shot rate limiting

pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod input;
pub mod session;
pub mod storage;
pub mod surface;

pub use config::{GameConfig, Variant};
pub use error::Error;
pub use session::Session;
