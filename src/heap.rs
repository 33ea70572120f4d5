use std::ptr::NonNull;

use libc::c_void;

/// Allocator primitives a [`Registry`](crate::Registry) tracks.
///
/// Implementations return `None` when the request cannot be satisfied.
pub trait RawHeap {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>>;

  /// Resizes a region, possibly moving it. On `None` the original region is
  /// still valid.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by this heap and not yet released.
  unsafe fn resize(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> Option<NonNull<u8>>;

  /// # Safety
  ///
  /// `ptr` must have been returned by this heap and not yet released.
  unsafe fn release(
    &mut self,
    ptr: NonNull<u8>,
  );
}

/// The C library heap: `malloc`, `realloc` and `free`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcHeap;

impl RawHeap for LibcHeap {
  fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    NonNull::new(unsafe { libc::malloc(size) } as *mut u8)
  }

  unsafe fn resize(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) -> Option<NonNull<u8>> {
    NonNull::new(unsafe { libc::realloc(ptr.as_ptr() as *mut c_void, size) } as *mut u8)
  }

  unsafe fn release(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    unsafe { libc::free(ptr.as_ptr() as *mut c_void) }
  }
}
