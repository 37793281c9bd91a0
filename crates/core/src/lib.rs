//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod config;
pub mod effects;
pub mod events;
pub mod items;
pub mod rng;
pub mod run;
pub mod scoring;
pub mod shells;
pub mod shot;
pub mod state;

pub use config::*;
pub use effects::*;
pub use events::*;
pub use items::*;
pub use rng::*;
pub use run::*;
pub use scoring::*;
pub use shells::*;
pub use shot::*;
pub use state::*;
