use std::{fmt, ptr::NonNull};

/// Opaque address of a tracked region, as returned by the underlying heap.
///
/// Handles compare by address only. Two live blocks in one registry never
/// share a handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(NonNull<u8>);

impl Handle {
  pub(crate) fn new(ptr: NonNull<u8>) -> Self {
    Self(ptr)
  }

  /// Wraps a raw pointer, returning `None` for null.
  ///
  /// The resulting handle is only meaningful to a registry that produced it;
  /// anything else is reported as not found.
  pub fn from_ptr(ptr: *mut u8) -> Option<Self> {
    NonNull::new(ptr).map(Self)
  }

  pub fn as_ptr(self) -> *mut u8 {
    self.0.as_ptr()
  }

  pub(crate) fn as_non_null(self) -> NonNull<u8> {
    self.0
  }
}

impl fmt::Debug for Handle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "Handle({:p})", self.0)
  }
}

impl fmt::Display for Handle {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:p}", self.0)
  }
}

/// Metadata for one live allocation.
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
  pub address: Handle,
  pub size: usize,
}

impl Block {
  pub(crate) fn new(
    address: Handle,
    size: usize,
  ) -> Self {
    Self { address, size }
  }
}
