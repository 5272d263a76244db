//! Course watch progress, kept in memory and persisted as a JSON sidecar file
//! (`.course_progress.json`) in the course root on the AList server.

mod manager;
mod model;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use manager::*;
pub use model::*;
pub use store::*;
