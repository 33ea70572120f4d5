//! Test doubles and a diagnostics capture for unit tests.

use std::{cell::Cell, io, ptr::NonNull, rc::Rc, sync::Arc};

use parking_lot::Mutex;

use crate::heap::{LibcHeap, RawHeap};

/// Runs `f` under a thread-scoped subscriber and returns everything it logged.
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
  let buffer = Arc::new(Mutex::new(Vec::new()));
  let sink = buffer.clone();

  let subscriber = tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .with_ansi(false)
    .with_writer(move || CapturedWriter(sink.clone()))
    .finish();

  let result = tracing::subscriber::with_default(subscriber, f);
  let output = String::from_utf8_lossy(&buffer.lock()).into_owned();

  (result, output)
}

struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
  fn write(
    &mut self,
    buf: &[u8],
  ) -> io::Result<usize> {
    self.0.lock().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Moves every region on resize, so the old handle is always stale.
///
/// Region contents are not carried over.
#[derive(Default)]
pub(crate) struct RelocatingHeap;

impl RawHeap for RelocatingHeap {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    LibcHeap.allocate(size)
  }

  unsafe fn resize(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let moved = LibcHeap.allocate(size)?;
    unsafe { LibcHeap.release(ptr) };
    Some(moved)
  }

  unsafe fn release(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    unsafe { LibcHeap.release(ptr) }
  }
}

/// Counts regions that are currently held by the heap.
#[derive(Default, Clone)]
pub(crate) struct CountingHeap {
  pub live: Rc<Cell<usize>>,
}

impl RawHeap for CountingHeap {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let ptr = LibcHeap.allocate(size)?;
    self.live.set(self.live.get() + 1);
    Some(ptr)
  }

  unsafe fn resize(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    unsafe { LibcHeap.resize(ptr, size) }
  }

  unsafe fn release(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    self.live.set(self.live.get() - 1);
    unsafe { LibcHeap.release(ptr) }
  }
}

/// Refuses requests above `limit` bytes.
pub(crate) struct BoundedHeap {
  pub limit: usize,
}

impl RawHeap for BoundedHeap {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size > self.limit {
      return None;
    }
    LibcHeap.allocate(size)
  }

  unsafe fn resize(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if size > self.limit {
      return None;
    }
    unsafe { LibcHeap.resize(ptr, size) }
  }

  unsafe fn release(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    unsafe { LibcHeap.release(ptr) }
  }
}
