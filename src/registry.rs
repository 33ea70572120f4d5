use std::mem;

use tracing::{debug, error, info, trace};

use crate::{
  block::{Block, Handle},
  error::{BlockError, Result},
  heap::{LibcHeap, RawHeap},
};

/// Lifecycle of a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Uninitialized,
  Active,
  TornDown,
}

/// Snapshot of the registry counters.
///
/// While the registry is active, `count == count_allocs - count_frees` and
/// `count <= capacity`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
  pub capacity: usize,
  pub count: usize,
  pub count_allocs: usize,
  pub count_frees: usize,
}

/// Outcome of [`Registry::teardown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
  pub allocs: usize,
  /// Frees requested by the caller. Releases forced by teardown are excluded.
  pub frees: usize,
  pub leaked: usize,
  pub leaked_bytes: usize,
}

impl TeardownReport {
  pub fn is_clean(&self) -> bool {
    self.leaked == 0
  }

  /// Turns a leaky report into [`BlockError::LeakDetected`].
  pub fn check(self) -> Result<Self> {
    if self.is_clean() {
      Ok(self)
    } else {
      Err(BlockError::LeakDetected {
        leaked: self.leaked,
      })
    }
  }
}

/// Ordered record of every live allocation made through it.
///
/// Blocks are kept densely in allocation order. Lookup is a linear scan by
/// handle and removal shifts the tail left, so both cost O(n) in the number
/// of live blocks.
///
/// ```text
///   items:    [ A | B | C | D |   |   |   |   ]
///               0   1   2   3   ^ count       ^ capacity
///
///   free(B):  [ A | C | D |   |   |   |   |   ]
/// ```
///
/// Dropping an active registry tears it down.
pub struct Registry<H: RawHeap = LibcHeap> {
  heap: H,
  state: State,
  items: Vec<Block>,
  capacity: usize,
  count_allocs: usize,
  count_frees: usize,
}

// The registry is the sole owner of every region it tracks, so moving it to
// another thread moves that ownership along with it.
unsafe impl<H: RawHeap + Send> Send for Registry<H> {}

impl Default for Registry<LibcHeap> {
  fn default() -> Self {
    Self::new(LibcHeap)
  }
}

impl<H: RawHeap> Registry<H> {
  /// Creates an uninitialized registry over `heap`. Call [`setup`](Self::setup)
  /// before use.
  pub const fn new(heap: H) -> Self {
    Self {
      heap,
      state: State::Uninitialized,
      items: Vec::new(),
      capacity: 0,
      count_allocs: 0,
      count_frees: 0,
    }
  }

  pub fn setup(&mut self) -> Result<()> {
    match self.state {
      State::Uninitialized => {}
      State::Active => return Err(BlockError::AlreadyInitialized),
      State::TornDown => return Err(BlockError::UseAfterShutdown),
    }

    self.capacity = 1;
    self.items = Vec::with_capacity(self.capacity);
    self.count_allocs = 0;
    self.count_frees = 0;
    self.state = State::Active;

    info!("heap management initialized");
    Ok(())
  }

  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Handle> {
    self.ensure_active()?;

    // Zero-byte requests still get a distinct, non-null region.
    let address = match self.heap.allocate(size.max(1)) {
      Some(ptr) => Handle::new(ptr),
      None => {
        error!(size, "allocation failed");
        return Err(BlockError::OutOfMemory { size });
      }
    };

    if self.items.len() + 1 >= self.capacity {
      self.grow();
    }

    self.items.push(Block::new(address, size));
    self.count_allocs += 1;

    trace!(%address, size, "allocated heap block");
    Ok(address)
  }

  /// Index of the live block at `handle`, in allocation order.
  pub fn find(
    &self,
    handle: Handle,
  ) -> Result<usize> {
    self.ensure_active()?;

    match self.items.iter().position(|block| block.address == handle) {
      Some(index) => Ok(index),
      None => {
        error!(address = %handle, "pointer could not be found in heap manager");
        Err(BlockError::NotFound(handle))
      }
    }
  }

  /// Resizes the region behind `handle` and returns its new handle.
  ///
  /// If the heap moves the region, `handle` is no longer tracked.
  pub fn resize(
    &mut self,
    handle: Handle,
    size: usize,
  ) -> Result<Handle> {
    let index = self.find(handle)?;
    let block = &mut self.items[index];

    // SAFETY: `block.address` is live and owned by this registry.
    let moved = unsafe { self.heap.resize(block.address.as_non_null(), size.max(1)) };
    let Some(ptr) = moved else {
      error!(address = %handle, size, "resize failed, block left unchanged");
      return Err(BlockError::OutOfMemory { size });
    };

    trace!(
      from = %block.address,
      to = %Handle::new(ptr),
      old_size = block.size,
      size,
      "adjusted heap block"
    );

    block.address = Handle::new(ptr);
    block.size = size;

    Ok(block.address)
  }

  pub fn free(
    &mut self,
    handle: Handle,
  ) -> Result<()> {
    let index = self.find(handle)?;

    let block = self.items.remove(index);
    self.release(block);
    self.count_frees += 1;

    Ok(())
  }

  /// Releases every remaining block and reports how many were never freed.
  ///
  /// Leaks are logged, not returned as an error; see [`TeardownReport::check`].
  pub fn teardown(&mut self) -> Result<TeardownReport> {
    self.ensure_active()?;
    info!("tearing down heap management");

    let report = TeardownReport {
      allocs: self.count_allocs,
      frees: self.count_frees,
      leaked: self.count_allocs - self.count_frees,
      leaked_bytes: self.live_bytes(),
    };

    for block in mem::take(&mut self.items) {
      debug!(address = %block.address, size = block.size, "releasing unfreed block");
      self.release(block);
      self.count_frees += 1;
    }

    self.capacity = 0;
    self.state = State::TornDown;

    if report.is_clean() {
      info!("all blocks freed successfully");
    } else {
      error!(
        leaked = report.leaked,
        bytes = report.leaked_bytes,
        "not all blocks freed, {} blocks were not freed",
        report.leaked
      );
    }

    Ok(report)
  }

  pub fn get(
    &self,
    handle: Handle,
  ) -> Option<&Block> {
    self.items.iter().find(|block| block.address == handle)
  }

  /// Live blocks in allocation order.
  pub fn blocks(&self) -> impl Iterator<Item = &Block> {
    self.items.iter()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn live_bytes(&self) -> usize {
    self.items.iter().map(|block| block.size).sum()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn stats(&self) -> Stats {
    Stats {
      capacity: self.capacity,
      count: self.items.len(),
      count_allocs: self.count_allocs,
      count_frees: self.count_frees,
    }
  }

  fn ensure_active(&self) -> Result<()> {
    match self.state {
      State::Active => Ok(()),
      State::Uninitialized => {
        error!("heap manager used before setup");
        Err(BlockError::UseBeforeInit)
      }
      State::TornDown => {
        error!("heap manager used after teardown");
        Err(BlockError::UseAfterShutdown)
      }
    }
  }

  fn grow(&mut self) {
    let capacity = self.capacity * 2;
    self.items.reserve_exact(capacity - self.items.len());

    debug!(from = self.capacity, to = capacity, "grew block storage");
    self.capacity = capacity;
  }

  fn release(
    &mut self,
    block: Block,
  ) {
    trace!(address = %block.address, size = block.size, "destroyed heap block");
    // SAFETY: the block was removed from `items`, so this is the last use of
    // its address.
    unsafe { self.heap.release(block.address.as_non_null()) }
  }
}

impl<H: RawHeap> Drop for Registry<H> {
  fn drop(&mut self) {
    if self.state == State::Active {
      let _ = self.teardown();
    }
  }
}
