//! The process-wide registry.
//!
//! Each call takes one lock for its whole duration, so a lookup and the
//! mutation that follows it are never interleaved with another thread.
//!
//! ```rust,ignore
//! rblocks::facade::init()?;
//! let handle = rblocks::facade::allocate(256)?;
//! rblocks::facade::free(handle)?;
//! let report = rblocks::facade::shutdown()?;
//! assert!(report.is_clean());
//! ```

use parking_lot::{Mutex, const_mutex};

use crate::{
  block::Handle,
  error::Result,
  heap::LibcHeap,
  registry::{Registry, State, Stats, TeardownReport},
};

static BLOCKS: Mutex<Registry> = const_mutex(Registry::new(LibcHeap));

/// Sets up the shared registry. A registry that was shut down is replaced by
/// a fresh one.
pub fn init() -> Result<()> {
  let mut blocks = BLOCKS.lock();
  if blocks.state() == State::TornDown {
    *blocks = Registry::new(LibcHeap);
  }
  blocks.setup()
}

/// Tears down the shared registry, releasing and reporting unfreed blocks.
pub fn shutdown() -> Result<TeardownReport> {
  BLOCKS.lock().teardown()
}

pub fn allocate(size: usize) -> Result<Handle> {
  BLOCKS.lock().allocate(size)
}

pub fn resize(
  handle: Handle,
  size: usize,
) -> Result<Handle> {
  BLOCKS.lock().resize(handle, size)
}

pub fn free(handle: Handle) -> Result<()> {
  BLOCKS.lock().free(handle)
}

pub fn stats() -> Stats {
  BLOCKS.lock().stats()
}

/// Runs `f` against the shared registry while holding its lock.
pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
  f(&BLOCKS.lock())
}

#[cfg(test)]
mod tests {
  use serial_test::serial;

  use super::*;
  use crate::{error::BlockError, test_support::capture};

  #[test]
  #[serial]
  fn test_lifecycle() {
    init().unwrap();
    assert_eq!(init(), Err(BlockError::AlreadyInitialized));

    let a = allocate(256).unwrap();
    let b = allocate(256).unwrap();
    let c = allocate(256).unwrap();
    let d = allocate(2048).unwrap();
    let d = resize(d, 256).unwrap();
    free(b).unwrap();

    let order = with_registry(|registry| registry.blocks().map(|block| block.address).collect::<Vec<_>>());
    assert_eq!(order, vec![a, c, d]);

    let stats = stats();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.count_allocs, 4);
    assert_eq!(stats.count_frees, 1);

    let (report, logs) = capture(|| shutdown().unwrap());
    assert_eq!(report.leaked, 3);
    assert!(logs.contains("leaked=3"));
  }

  #[test]
  #[serial]
  fn test_clean_shutdown() {
    init().unwrap();

    let handles: Vec<_> = (1..=8).map(|i| allocate(i * 32).unwrap()).collect();
    for handle in handles.into_iter().rev() {
      free(handle).unwrap();
    }

    let report = shutdown().unwrap();
    assert!(report.check().is_ok());
  }

  #[test]
  #[serial]
  fn test_use_outside_lifecycle() {
    if with_registry(|registry| registry.state()) == State::Active {
      shutdown().unwrap();
    }

    assert!(matches!(
      allocate(8),
      Err(BlockError::UseBeforeInit | BlockError::UseAfterShutdown)
    ));

    init().unwrap();
    shutdown().unwrap();

    assert_eq!(allocate(8), Err(BlockError::UseAfterShutdown));
    assert_eq!(shutdown(), Err(BlockError::UseAfterShutdown));
  }

  #[test]
  #[serial]
  fn test_free_unknown_handle() {
    init().unwrap();
    let tracked = allocate(64).unwrap();

    let mut outside = 0u8;
    let unknown = Handle::from_ptr(&mut outside).unwrap();

    assert_eq!(free(unknown), Err(BlockError::NotFound(unknown)));
    assert_eq!(stats().count, 1);

    free(tracked).unwrap();
    assert!(shutdown().unwrap().is_clean());
  }
}
