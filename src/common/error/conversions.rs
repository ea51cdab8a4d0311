//! Error conversion implementations.
//!
//! I/O failures are flattened into [`Error::Io`] whichever layer raised them.

use super::types::Error;
use crate::alias::AliasError;
use crate::common::binary::BinaryError;
use crate::dsstore::DsStoreError;

impl From<DsStoreError> for Error {
    fn from(err: DsStoreError) -> Self {
        match err {
            DsStoreError::Io(e) => Error::Io(e),
            other => Error::Store(other),
        }
    }
}

impl From<AliasError> for Error {
    fn from(err: AliasError) -> Self {
        match err {
            AliasError::Io(e) => Error::Io(e),
            other => Error::Alias(other),
        }
    }
}

impl From<BinaryError> for Error {
    fn from(err: BinaryError) -> Self {
        Error::Store(DsStoreError::from(err))
    }
}

impl From<plist::Error> for Error {
    fn from(err: plist::Error) -> Self {
        Error::Store(DsStoreError::Plist(err))
    }
}
