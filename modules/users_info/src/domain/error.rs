use thiserror::Error;

/// Faults raised by the persistence collaborator.
///
/// Business outcomes (not found, conflicts) are never reported here; see
/// [`crate::contract::outcome`].
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Storage fault: {0:#}")]
    Storage(#[from] anyhow::Error),
}

#[cfg(test)]
impl DomainError {
    pub(crate) fn storage(message: impl Into<String>) -> Self {
        Self::Storage(anyhow::anyhow!(message.into()))
    }
}
