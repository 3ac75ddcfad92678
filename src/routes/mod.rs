//! Route synthesis and the HTTP surface built on it.

mod common;
mod http;
mod synth;

pub use common::common_routes;
pub use http::{router, RESERVED_PATH_CHARS};
pub use synth::*;
