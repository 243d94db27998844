pub mod analyzer;
pub mod poller;

pub use analyzer::analyze_item;
pub use poller::{NewsPoller, PollerHandle};
