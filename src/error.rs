use thiserror::Error;

use crate::block::Handle;

/// Result of registry and façade operations.
pub type Result<T, E = BlockError> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
  #[error("pointer ({0}) could not be found in heap manager")]
  NotFound(Handle),

  #[error("heap manager used before setup")]
  UseBeforeInit,

  #[error("heap manager used after teardown")]
  UseAfterShutdown,

  #[error("heap manager is already initialized")]
  AlreadyInitialized,

  #[error("out of memory: {size} bytes requested")]
  OutOfMemory { size: usize },

  #[error("not all blocks freed, {leaked} blocks were not freed")]
  LeakDetected { leaked: usize },
}
