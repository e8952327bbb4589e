//! CLI command implementations.

pub mod common;
pub mod distort;
pub mod evaluate;
pub mod generate;
pub mod info;
pub mod run;
