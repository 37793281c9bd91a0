//! Dealer opponent: private shell memory, the decision procedure, a turn
//! driver and a headless match simulator over the core run API.

mod action;
mod agent;
mod config;
mod error;
mod memory;
mod policy;
mod simulator;
mod trace;

pub use action::*;
pub use agent::*;
pub use config::*;
pub use error::*;
pub use memory::*;
pub use policy::*;
pub use simulator::*;
pub use trace::*;
