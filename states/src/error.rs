use std::any::TypeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("state not registered: {id:?} ({context})")]
    StateNotFound { id: TypeId, context: &'static str },
    #[error("compute not registered: {id:?} ({context})")]
    ComputeNotFound { id: TypeId, context: &'static str },
}
