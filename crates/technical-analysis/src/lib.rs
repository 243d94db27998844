pub mod indicators;
pub mod panel;

#[cfg(test)]
mod indicators_tests;

pub use indicators::*;
pub use panel::*;
