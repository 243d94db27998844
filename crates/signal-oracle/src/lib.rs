pub mod keyword;
pub mod loader;

pub use keyword::KeywordOracle;
pub use loader::{OracleLoadState, OracleLoader};
