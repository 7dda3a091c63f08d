use mongodb::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MongoStoreError {
    #[error("MongoDB error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has unexpected type {found}")]
    UnexpectedType { field: &'static str, found: String },
}

impl From<MongoStoreError> for proshow_store::StoreError {
    fn from(e: MongoStoreError) -> Self {
        match e {
            MongoStoreError::Driver(ref err) if is_connectivity(err) => {
                proshow_store::StoreError::Unavailable(e.to_string())
            }
            MongoStoreError::Driver(_) => proshow_store::StoreError::Backend(e.to_string()),
            MongoStoreError::MissingField(_) | MongoStoreError::UnexpectedType { .. } => {
                proshow_store::StoreError::Corruption(e.to_string())
            }
        }
    }
}

/// Errors that mean the cluster could not be reached at all.
fn is_connectivity(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::DnsResolve { .. }
    )
}
