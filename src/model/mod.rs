//! Static entity model for the network schema.

mod entity;
mod network;

pub use entity::*;
pub use network::*;
