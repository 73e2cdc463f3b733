//! # rpool - A Fixed-Arena Pool Allocator
//!
//! This crate provides a **first-fit pool allocator** that carves allocations
//! out of one caller-supplied byte buffer. It is meant for constrained
//! environments (embedded targets, VM heaps) where the whole heap is a static
//! array and allocate/release cycles must run forever without leaking space.
//!
//! ## Overview
//!
//! ```text
//!   Pool Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                       CALLER-OWNED BUFFER                            │
//!   │                                                                      │
//!   │   ┌───┬──────┬───┬────────────┬───┬──────┬───┬────────────────────┐  │
//!   │   │ H │  A1  │ H │    free    │ H │  A2  │ H │        free        │  │
//!   │   └───┴──────┴───┴────────────┴───┴──────┴───┴────────────────────┘  │
//!   │     ▲                                                                │
//!   │     └── inline header: tag, size, link to previous block             │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Blocks tile the arena with no gaps. Free neighbours are merged on release.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rpool
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── block      - Inline block header (internal) and BlockInfo
//!   ├── config     - PoolConfig and SearchMode
//!   ├── diag       - DiagnosticLogger, LogFacade, MemoryLogger, HexDump
//!   ├── error      - PoolError
//!   ├── inspect    - Non-zero word scanner for raw arenas
//!   ├── pool       - PoolAllocator and Handle
//!   └── stats      - PoolStats
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rpool::PoolAllocator;
//!
//! let mut memory = [0u8; 30 * 1024];
//! let mut pool = PoolAllocator::new(&mut memory).unwrap();
//!
//! for _ in 0..1000 {
//!     let handle = pool.allocate(100).unwrap().expect("pool exhausted");
//!     pool.payload_mut(handle).unwrap()[0] = 0xFF;
//!     pool.release(Some(handle)).unwrap();
//! }
//!
//! assert!(pool.stats().unwrap().is_pristine());
//! ```
//!
//! ## How It Works
//!
//! `allocate` walks the blocks in address order and takes the first free one
//! that is large enough, splitting off the tail when it can hold another
//! block:
//!
//! ```text
//!   allocate(n):
//!   ┌───┬──────────────────────────────┐      ┌───┬─────┬───┬────────────┐
//!   │ H │            free              │  ─►  │ H │  n  │ H │    free    │
//!   └───┴──────────────────────────────┘      └───┴─────┴───┴────────────┘
//!                                                   ▲
//!                                                   └── handle
//! ```
//!
//! `release` marks the block free and merges it with a free successor and a
//! free predecessor, so two free blocks are never adjacent:
//!
//! ```text
//!   release(A2):
//!   ┌───┬──────┬───┬──────┬───┬──────┐      ┌───┬──────┬───────────────────┐
//!   │ H │  A1  │ H │ free │ H │  A2  │  ─►  │ H │  A1  │ H │      free     │
//!   └───┴──────┴───┴──────┴───┴──────┘      └───┴──────┴───────────────────┘
//! ```
//!
//! Handles are offsets into the buffer tagged with the binding epoch, and
//! every release is validated against the block list before anything is
//! written. Double releases, interior pointers and handles that survived a
//! reset are reported as [`PoolError`]s.
//!
//! ## Limitations
//!
//! - **Single-threaded**: no synchronization; wrap in a lock to share
//! - **One arena**: no size classes, no growth
//! - **Linear search**: allocate and release are O(blocks)

#![forbid(unsafe_code)]

pub mod align;
mod block;
mod config;
pub mod diag;
mod error;
pub mod inspect;
mod pool;
mod stats;

pub use block::{BlockInfo, HEADER_SIZE};
pub use config::{PoolConfig, SearchMode};
pub use error::{PoolError, PoolResult};
pub use pool::{Handle, MIN_ARENA_SIZE, PoolAllocator};
pub use stats::PoolStats;

/// Alignment of every handle's payload address.
pub const ALIGNMENT: usize = align::WORD;
