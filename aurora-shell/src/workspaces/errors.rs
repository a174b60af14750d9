use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The index does not name a current workspace. The operation
    /// mutated nothing.
    #[error("workspace index {index} out of range (have {count})")]
    OutOfRange { index: usize, count: usize },
}
