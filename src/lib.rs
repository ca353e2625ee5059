//! Force-directed layout and interactive viewing of mathematics genealogy
//! graphs.

pub mod config;
pub mod error;
pub mod genealogy;
pub mod layout;
pub mod util;
pub mod view;

pub use error::GraphIntegrityError;
