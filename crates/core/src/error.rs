/// Boxed error type used to carry backend failures across the storage seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Well-known errors that can occur during task manipulation.
///
/// Storage adapters are the only place backend-native errors get classified
/// into this taxonomy; [`crate::TaskService`] passes them through unchanged,
/// and the HTTP layer is the only place they turn into status codes.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The service was constructed without a repository. Should never
    /// trigger with correct wiring, but is part of the contract.
    #[error("data store not initialized")]
    NoRepository,

    /// No row exists for the given id.
    #[error("data not found")]
    NotFound,

    /// An update matched zero rows (the target id does not exist).
    #[error("update failed")]
    NotUpdated,

    /// Unclassified storage or transport failure, wrapping the backend error.
    #[error(transparent)]
    Storage(#[from] BoxError),
}

impl TaskError {
    /// Wrap a backend error as [`TaskError::Storage`].
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        TaskError::Storage(Box::new(err))
    }
}
