pub use api::*;
pub use dimacs_engine::*;
pub use types::*;

mod api;
mod dimacs_engine;
pub mod mock;
mod types;
