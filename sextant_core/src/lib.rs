// sextant_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod errors;
pub mod estimation;
pub mod frames;
pub mod landmarks;
pub mod mapping;
pub mod models;
pub mod platform;
pub mod prelude;
pub mod types;

#[cfg(test)]
mod testing;
