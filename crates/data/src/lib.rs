//! Data loading and validation for rules, client settings and lifetime stats.

pub mod load;
pub mod schema;
pub mod stats;

pub use load::*;
pub use schema::*;
pub use stats::*;
