//! Location records and their CSV source.
//!
//! Provides functionality for:
//! - Parsing headerless CSV text into validated `LocationRecord`s
//! - Loading a user-selected file from disk
//!
//! Rows whose coordinates do not parse are dropped with a log diagnostic;
//! only structural failures of the whole input are reported as errors.

pub mod loader;
pub mod parser;
pub mod types;

pub use loader::load_first;
pub use parser::parse;
pub use types::{GeoBounds, LocationRecord, LocationSequence};
