use thiserror::Error;

/// Errors raised by playlist assembly itself. Collaborator failures
/// (network, auth) travel as `anyhow::Error` and are never wrapped here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    /// The candidate pool had no tracks at all
    #[error("No liked songs found")]
    EmptyPool,
}
