//! # rblocks - A Debug Allocation Tracker
//!
//! This crate wraps an allocator's primitives (allocate, resize, release) with
//! a **registry** that records every outstanding allocation, so that live
//! blocks can be enumerated and inspected, and leaks are reported when the
//! registry is torn down.
//!
//! ## Overview
//!
//! ```text
//!   Tracking Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           REGISTRY                                   │
//!   │                                                                      │
//!   │   items   ┌─────────┬─────────┬─────────┬───────────────────────┐    │
//!   │           │ Block 0 │ Block 1 │ Block 2 │      spare slots      │    │
//!   │           └────┬────┴────┬────┴────┬────┴───────────────────────┘    │
//!   │                │         │         │                                 │
//!   │   allocs: 4    ▼         ▼         ▼                                 │
//!   │   frees:  1  ┌────┐   ┌──────┐  ┌──┐                                 │
//!   │              │256B│   │ 256B │  │2K│   heap regions (malloc)         │
//!   │              └────┘   └──────┘  └──┘                                 │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   count = allocs - frees, and count never exceeds capacity.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rblocks
//!   ├── block     - Handle and Block metadata
//!   ├── error     - BlockError and the Result alias
//!   ├── heap      - RawHeap primitives and the libc implementation
//!   ├── registry  - Registry: allocate / find / resize / free / teardown
//!   ├── facade    - one process-wide Registry behind a lock
//!   └── logging   - runtime verbosity and subscriber setup
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rblocks::Registry;
//!
//! fn main() -> rblocks::Result<()> {
//!     let mut registry = Registry::default();
//!     registry.setup()?;
//!
//!     let handle = registry.allocate(256)?;
//!     let handle = registry.resize(handle, 1024)?;
//!     registry.free(handle)?;
//!
//!     let report = registry.teardown()?;
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!   Uninitialized ──setup──▶ Active ──teardown──▶ TornDown
//! ```
//!
//! Any operation outside `Active` returns [`BlockError::UseBeforeInit`] or
//! [`BlockError::UseAfterShutdown`]. Unknown handles return
//! [`BlockError::NotFound`] and leave the registry untouched.
//!
//! ## Limitations
//!
//! - **Linear lookup**: finding a handle scans the live blocks in order
//! - **Shifting removal**: freeing keeps blocks dense and ordered at O(n)
//! - **No allocation strategy**: alignment and reuse are the heap's business

mod block;
mod error;
pub mod facade;
mod heap;
pub mod logging;
mod registry;

#[cfg(test)]
mod test_support;

pub use block::{Block, Handle};
pub use error::{BlockError, Result};
pub use heap::{LibcHeap, RawHeap};
pub use registry::{Registry, State, Stats, TeardownReport};
