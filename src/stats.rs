use core::fmt;

/// Point-in-time capacity accounting for a pool.
///
/// All sizes are in bytes. `arena_size` is the managed span after the bound
/// buffer has been trimmed to word boundaries; it always equals
/// `allocated + free + overhead`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
  pub arena_size: usize,
  /// Payload bytes held by live allocations (rounded request sizes).
  pub allocated: usize,
  /// Payload bytes available in free blocks.
  pub free: usize,
  /// Header bytes across all blocks.
  pub overhead: usize,
  /// Largest payload a single allocation could currently get.
  pub largest_free: usize,
  pub used_blocks: usize,
  pub free_blocks: usize,
}

impl PoolStats {
  /// `true` when no allocation is live and the arena is a single free block.
  pub fn is_pristine(&self) -> bool {
    self.used_blocks == 0 && self.free_blocks == 1
  }
}

impl fmt::Display for PoolStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "arena={} allocated={} free={} overhead={} largest_free={} blocks={}/{}",
      self.arena_size,
      self.allocated,
      self.free,
      self.overhead,
      self.largest_free,
      self.used_blocks,
      self.free_blocks,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_lists_used_then_free_blocks() {
    let stats = PoolStats {
      arena_size: 128,
      allocated: 16,
      free: 64,
      overhead: 48,
      largest_free: 64,
      used_blocks: 1,
      free_blocks: 1,
    };

    assert_eq!(
      stats.to_string(),
      "arena=128 allocated=16 free=64 overhead=48 largest_free=64 blocks=1/1"
    );
    assert!(!stats.is_pristine());
  }
}
