//! Query-string parsing: raw parameters and comparison constraints.

mod constraint;
mod params;
pub use constraint::*;
pub use params::*;
