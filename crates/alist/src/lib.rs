pub mod config;
pub mod consts;
pub mod filetype;
pub mod prelude;
pub mod progress;

mod error;
mod impls;
mod models;

pub use error::*;
pub use models::*;

pub use impls::*;
