//! Domain models for the MediCall scheduling engine.

mod contact;
mod store;
mod timeoff;
mod visit;

pub use contact::*;
pub use store::*;
pub use timeoff::*;
pub use visit::*;
