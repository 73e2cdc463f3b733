use core::fmt;

use crate::align::{WORD, checked_align_up, is_aligned};
use crate::block::{Block, BlockInfo, HEADER_SIZE};
use crate::config::{PoolConfig, SearchMode};
use crate::error::{PoolError, PoolResult};
use crate::inspect::{self, Words};
use crate::stats::PoolStats;

/// Smallest managed span a pool accepts: one header and one word of payload.
pub const MIN_ARENA_SIZE: usize = HEADER_SIZE + WORD;

/// Reference to a live allocation.
///
/// A handle is the payload offset within the bound buffer plus the epoch of
/// the binding that issued it. Every [`PoolAllocator::initialize`] or
/// [`PoolAllocator::reset`] starts a new epoch, so handles that outlive a
/// reset are rejected instead of aliasing fresh blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
  offset: usize,
  epoch: u32,
}

impl Handle {
  /// Rebuilds a handle from its parts. The pool validates it on use.
  pub const fn from_raw(
    offset: usize,
    epoch: u32,
  ) -> Self {
    Self { offset, epoch }
  }

  /// Payload offset from the start of the bound buffer.
  pub const fn offset(&self) -> usize {
    self.offset
  }

  pub const fn epoch(&self) -> u32 {
    self.epoch
  }
}

/// The bound buffer and the span of it that is managed.
struct Arena<'a> {
  buf: &'a mut [u8],
  /// First header; word aligned in absolute address terms.
  start: usize,
  /// One past the last managed byte.
  end: usize,
  allocated: usize,
}

impl<'a> Arena<'a> {
  fn bind(buf: &'a mut [u8]) -> PoolResult<Self> {
    let base = buf.as_ptr() as usize;
    let start = checked_align_up(base, WORD).map_or(buf.len(), |aligned| aligned - base);
    let end = start + (buf.len().saturating_sub(start) & !(WORD - 1));

    if end - start < MIN_ARENA_SIZE {
      return Err(PoolError::ArenaTooSmall {
        size: buf.len(),
        required: MIN_ARENA_SIZE,
      });
    }

    let mut arena = Self {
      buf,
      start,
      end,
      allocated: 0,
    };
    arena.format();

    Ok(arena)
  }

  /// Lays a single free block over the whole managed span.
  fn format(&mut self) {
    self.allocated = 0;
    let block = Block::new(self.end - self.start - HEADER_SIZE, true, None);
    self.put(self.start, block);
  }

  fn header(
    &self,
    at: usize,
  ) -> PoolResult<Block> {
    if at < self.start || at + HEADER_SIZE > self.end {
      return Err(PoolError::Corrupted {
        offset: at,
        reason: "header outside arena",
      });
    }

    let block = Block::read(self.buf, at).ok_or(PoolError::Corrupted {
      offset: at,
      reason: "bad block tag",
    })?;

    if block.size > self.end - at - HEADER_SIZE {
      return Err(PoolError::Corrupted {
        offset: at,
        reason: "block overruns arena",
      });
    }

    Ok(block)
  }

  fn put(
    &mut self,
    at: usize,
    block: Block,
  ) {
    block.write(self.buf, at);
  }

  fn relink(
    &mut self,
    at: usize,
    prev: usize,
  ) -> PoolResult<()> {
    let mut block = self.header(at)?;
    block.prev = Some(prev);
    self.put(at, block);
    Ok(())
  }

  fn walk(&self) -> Walk<'_, 'a> {
    Walk {
      arena: self,
      at: self.start,
      done: false,
    }
  }

  fn find_free_block(
    &self,
    size: usize,
    mode: SearchMode,
  ) -> PoolResult<Option<usize>> {
    let mut best: Option<(usize, usize)> = None;

    for entry in self.walk() {
      let (at, block) = entry?;
      if !block.is_free || block.size < size {
        continue;
      }

      match mode {
        SearchMode::FirstFit => return Ok(Some(at)),
        SearchMode::BestFit => {
          if block.size == size {
            return Ok(Some(at));
          }
          if best.is_none_or(|(_, best_size)| block.size < best_size) {
            best = Some((at, block.size));
          }
        }
      }
    }

    Ok(best.map(|(at, _)| at))
  }

  /// Marks the free block at `at` used, splitting off the tail when it can
  /// host another block. Returns the payload capacity handed out.
  fn take(
    &mut self,
    at: usize,
    size: usize,
  ) -> PoolResult<usize> {
    let block = self.header(at)?;
    let surplus = block.size - size;

    let granted = if surplus >= MIN_ARENA_SIZE {
      let rest_at = at + HEADER_SIZE + size;
      let rest = Block::new(surplus - HEADER_SIZE, true, Some(at));

      let next_at = rest_at + rest.span();
      if next_at < self.end {
        self.relink(next_at, rest_at)?;
      }

      self.put(rest_at, rest);
      size
    } else {
      block.size
    };

    self.put(at, Block::new(granted, false, block.prev));
    self.allocated += granted;

    Ok(granted)
  }

  /// Maps a handle to its block header.
  ///
  /// Handles landing anywhere in free space yield `NotAllocated`; handles
  /// inside a live block but not at its payload yield `InvalidHandle`.
  fn resolve(
    &self,
    handle: Handle,
  ) -> PoolResult<(usize, Block)> {
    let offset = handle.offset;

    if offset < self.start + HEADER_SIZE || offset >= self.end {
      return Err(PoolError::OutOfBounds { offset });
    }
    if !is_aligned(offset - self.start, WORD) {
      return Err(PoolError::Misaligned { offset });
    }

    for entry in self.walk() {
      let (at, block) = entry?;
      if offset >= at + block.span() {
        continue;
      }
      if block.is_free {
        return Err(PoolError::NotAllocated { offset });
      }
      if offset != at + HEADER_SIZE {
        return Err(PoolError::InvalidHandle { offset });
      }
      return Ok((at, block));
    }

    Err(PoolError::OutOfBounds { offset })
  }

  /// Frees the block at `at` and merges it with free neighbours on both
  /// sides. Absorbed headers are erased.
  fn release(
    &mut self,
    at: usize,
    block: Block,
    fill: Option<u8>,
  ) -> PoolResult<()> {
    if let Some(pattern) = fill {
      let payload = at + HEADER_SIZE;
      self.buf[payload..payload + block.size].fill(pattern);
    }
    self.allocated -= block.size;

    let mut at = at;
    let mut merged = Block::new(block.size, true, block.prev);

    loop {
      let next_at = at + merged.span();
      if next_at >= self.end {
        break;
      }
      let next = self.header(next_at)?;
      if !next.is_free {
        break;
      }
      merged.size += next.span();
      Block::erase(self.buf, next_at);
    }

    while let Some(prev_at) = merged.prev {
      let prev = self.header(prev_at)?;
      if !prev.is_free {
        break;
      }
      Block::erase(self.buf, at);
      merged = Block::new(prev.size + merged.span(), true, prev.prev);
      at = prev_at;
    }

    self.put(at, merged);

    let next_at = at + merged.span();
    if next_at < self.end {
      self.relink(next_at, at)?;
    }

    Ok(())
  }

  fn check(&self) -> PoolResult<()> {
    let mut expected_prev = None;
    let mut prev_free = false;
    let mut cursor = self.start;
    let mut allocated = 0;

    for entry in self.walk() {
      let (at, block) = entry?;

      if block.prev != expected_prev {
        return Err(PoolError::Corrupted {
          offset: at,
          reason: "broken back link",
        });
      }
      if !is_aligned(block.size, WORD) {
        return Err(PoolError::Corrupted {
          offset: at,
          reason: "block size not word aligned",
        });
      }
      if block.is_free && prev_free {
        return Err(PoolError::Corrupted {
          offset: at,
          reason: "adjacent free blocks",
        });
      }
      if !block.is_free {
        allocated += block.size;
      }

      prev_free = block.is_free;
      expected_prev = Some(at);
      cursor = at + block.span();
    }

    if cursor != self.end {
      return Err(PoolError::Corrupted {
        offset: cursor,
        reason: "blocks do not tile the arena",
      });
    }
    if allocated != self.allocated {
      return Err(PoolError::Corrupted {
        offset: self.start,
        reason: "allocated byte count drifted",
      });
    }

    Ok(())
  }

  fn stats(&self) -> PoolResult<PoolStats> {
    let mut stats = PoolStats {
      arena_size: self.end - self.start,
      ..PoolStats::default()
    };

    for entry in self.walk() {
      let (_, block) = entry?;
      stats.overhead += HEADER_SIZE;
      if block.is_free {
        stats.free += block.size;
        stats.free_blocks += 1;
        stats.largest_free = stats.largest_free.max(block.size);
      } else {
        stats.allocated += block.size;
        stats.used_blocks += 1;
      }
    }

    Ok(stats)
  }
}

/// Address-ordered traversal of the implicit block list.
struct Walk<'b, 'a> {
  arena: &'b Arena<'a>,
  at: usize,
  done: bool,
}

impl Iterator for Walk<'_, '_> {
  type Item = PoolResult<(usize, Block)>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done || self.at >= self.arena.end {
      return None;
    }

    match self.arena.header(self.at) {
      Ok(block) => {
        let at = self.at;
        self.at += block.span();
        Some(Ok((at, block)))
      }
      Err(err) => {
        self.done = true;
        Some(Err(err))
      }
    }
  }
}

/// Single-arena allocator over a caller-supplied buffer.
///
/// All bookkeeping lives inline in the buffer. Mutating operations take
/// `&mut self`; sharing a pool across threads needs an external lock.
///
/// ```rust
/// use rpool::PoolAllocator;
///
/// let mut buffer = [0u8; 1024];
/// let mut pool = PoolAllocator::new(&mut buffer).unwrap();
///
/// let handle = pool.allocate(100).unwrap().expect("fits");
/// pool.payload_mut(handle).unwrap()[0] = 0xFF;
/// pool.release(Some(handle)).unwrap();
///
/// assert!(pool.stats().unwrap().is_pristine());
/// ```
pub struct PoolAllocator<'a> {
  arena: Option<Arena<'a>>,
  config: PoolConfig,
  epoch: u32,
}

impl<'a> PoolAllocator<'a> {
  /// An allocator with no buffer bound yet. Every operation except
  /// [`initialize`](Self::initialize) fails with `NotInitialized`.
  pub fn unbound(config: PoolConfig) -> Self {
    Self {
      arena: None,
      config,
      epoch: 0,
    }
  }

  pub fn new(buffer: &'a mut [u8]) -> PoolResult<Self> {
    Self::with_config(buffer, PoolConfig::default())
  }

  pub fn with_config(
    buffer: &'a mut [u8],
    config: PoolConfig,
  ) -> PoolResult<Self> {
    let mut pool = Self::unbound(config);
    pool.initialize(buffer)?;
    Ok(pool)
  }

  /// Binds the pool to `buffer`, replacing any previous binding.
  ///
  /// The managed span starts at the first word-aligned byte and is trimmed
  /// to a whole number of words, so up to `WORD - 1` bytes at either edge
  /// may go unused. On error the previous binding is kept.
  pub fn initialize(
    &mut self,
    buffer: &'a mut [u8],
  ) -> PoolResult<()> {
    let arena = Arena::bind(buffer)?;
    self.arena = Some(arena);
    self.epoch = self.epoch.wrapping_add(1);
    Ok(())
  }

  /// Returns every block to the free state and invalidates all handles.
  pub fn reset(&mut self) -> PoolResult<()> {
    self.arena_mut()?.format();
    self.epoch = self.epoch.wrapping_add(1);
    Ok(())
  }

  pub fn is_initialized(&self) -> bool {
    self.arena.is_some()
  }

  pub fn epoch(&self) -> u32 {
    self.epoch
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  /// Allocates at least `size` word-aligned bytes.
  ///
  /// `Ok(None)` means no free block is large enough; the pool is unchanged
  /// and the caller may release something and retry.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> PoolResult<Option<Handle>> {
    let epoch = self.epoch;
    let PoolConfig {
      search_mode,
      alloc_fill,
      ..
    } = self.config;
    let arena = self.arena_mut()?;

    if size == 0 {
      return Err(PoolError::ZeroSize);
    }
    let Some(size) = checked_align_up(size, WORD) else {
      return Ok(None);
    };
    let Some(at) = arena.find_free_block(size, search_mode)? else {
      return Ok(None);
    };

    let granted = arena.take(at, size)?;
    let payload = at + HEADER_SIZE;

    if let Some(pattern) = alloc_fill {
      arena.buf[payload..payload + granted].fill(pattern);
    }

    Ok(Some(Handle::from_raw(payload, epoch)))
  }

  /// Releases a handle obtained from [`allocate`](Self::allocate).
  ///
  /// `None` is a no-op. Invalid handles are rejected without touching the
  /// arena; a handle that lands in free space is reported as
  /// `DoubleRelease`.
  pub fn release(
    &mut self,
    handle: Option<Handle>,
  ) -> PoolResult<()> {
    let Some(handle) = handle else {
      return Ok(());
    };
    let fill = self.config.release_fill;
    let (at, block) = self.resolve(handle).map_err(|err| match err {
      PoolError::NotAllocated { offset } => PoolError::DoubleRelease { offset },
      other => other,
    })?;

    self.arena_mut()?.release(at, block, fill)
  }

  pub fn payload(
    &self,
    handle: Handle,
  ) -> PoolResult<&[u8]> {
    let (at, block) = self.resolve(handle)?;
    let from = at + HEADER_SIZE;
    Ok(&self.arena()?.buf[from..from + block.size])
  }

  pub fn payload_mut(
    &mut self,
    handle: Handle,
  ) -> PoolResult<&mut [u8]> {
    let (at, block) = self.resolve(handle)?;
    let from = at + HEADER_SIZE;
    Ok(&mut self.arena_mut()?.buf[from..from + block.size])
  }

  /// Payload capacity of a live allocation; at least the requested size.
  pub fn usable_size(
    &self,
    handle: Handle,
  ) -> PoolResult<usize> {
    self.resolve(handle).map(|(_, block)| block.size)
  }

  /// Absolute address of the payload.
  pub fn address(
    &self,
    handle: Handle,
  ) -> PoolResult<usize> {
    self.resolve(handle)?;
    Ok(self.arena()?.buf.as_ptr() as usize + handle.offset)
  }

  /// Managed bytes (headers included); zero when unbound.
  pub fn capacity(&self) -> usize {
    self.arena.as_ref().map_or(0, |arena| arena.end - arena.start)
  }

  /// Payload bytes held by live allocations.
  pub fn allocated(&self) -> usize {
    self.arena.as_ref().map_or(0, |arena| arena.allocated)
  }

  /// Largest request that would currently succeed.
  pub fn largest_free(&self) -> PoolResult<usize> {
    self.stats().map(|stats| stats.largest_free)
  }

  pub fn stats(&self) -> PoolResult<PoolStats> {
    self.arena()?.stats()
  }

  /// Blocks in address order. Traversal stops early at a damaged header;
  /// run [`check`](Self::check) to surface the error.
  pub fn blocks(&self) -> PoolResult<impl Iterator<Item = BlockInfo> + '_> {
    let walk = self.arena()?.walk();
    Ok(walk.map_while(Result::ok).map(|(offset, block)| BlockInfo {
      offset,
      size: block.size,
      is_free: block.is_free,
    }))
  }

  /// Verifies header integrity, back links, tiling, eager coalescing and
  /// the allocated byte count.
  pub fn check(&self) -> PoolResult<()> {
    self.arena()?.check()
  }

  /// The whole bound buffer, including bytes trimmed for alignment.
  pub fn as_bytes(&self) -> PoolResult<&[u8]> {
    Ok(&*self.arena()?.buf)
  }

  /// Non-zero 4-byte words of the bound buffer.
  pub fn inspect(&self) -> PoolResult<Words<'_>> {
    self.as_bytes().map(inspect::scan)
  }

  /// Gives the buffer back, ending the binding.
  pub fn into_inner(self) -> Option<&'a mut [u8]> {
    self.arena.map(|arena| arena.buf)
  }

  fn arena(&self) -> PoolResult<&Arena<'a>> {
    self.arena.as_ref().ok_or(PoolError::NotInitialized)
  }

  fn arena_mut(&mut self) -> PoolResult<&mut Arena<'a>> {
    self.arena.as_mut().ok_or(PoolError::NotInitialized)
  }

  fn resolve(
    &self,
    handle: Handle,
  ) -> PoolResult<(usize, Block)> {
    let arena = self.arena()?;
    if handle.epoch != self.epoch {
      return Err(PoolError::StaleHandle {
        handle_epoch: handle.epoch,
        current_epoch: self.epoch,
      });
    }
    arena.resolve(handle)
  }
}

impl Default for PoolAllocator<'_> {
  fn default() -> Self {
    Self::unbound(PoolConfig::default())
  }
}

impl fmt::Debug for PoolAllocator<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("PoolAllocator")
      .field("epoch", &self.epoch)
      .field("capacity", &self.capacity())
      .field("allocated", &self.allocated())
      .field("config", &self.config)
      .finish()
  }
}
