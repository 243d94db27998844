pub mod clean;
pub mod error;
pub mod traits;
pub mod types;

pub use clean::*;
pub use error::*;
pub use traits::*;
pub use types::*;
