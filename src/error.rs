use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CetdError {
    /// The node list does not describe a single rooted tree.
    #[error("invalid tree structure: {0}")]
    InvalidTree(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
