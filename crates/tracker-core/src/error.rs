use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("No usable quote data: {0}")]
    DataUnavailable(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Session error: {0}")]
    SessionError(String),
}
