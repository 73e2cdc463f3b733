/// Policy used to pick a free block for a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
  /// Lowest-addressed free block that is large enough.
  #[default]
  FirstFit,
  /// Smallest free block that is large enough; ties go to the lower address.
  BestFit,
}

/// Tunables for a [`PoolAllocator`](crate::PoolAllocator).
///
/// ```rust
/// use rpool::{PoolConfig, SearchMode};
///
/// let config = PoolConfig::new()
///     .search_mode(SearchMode::BestFit)
///     .release_fill(0xDD);
///
/// assert_eq!(config.search_mode, SearchMode::BestFit);
/// assert_eq!(config.alloc_fill, None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolConfig {
  pub search_mode: SearchMode,
  /// Byte written over every freshly allocated payload.
  pub alloc_fill: Option<u8>,
  /// Byte written over a payload when it is released, before coalescing.
  pub release_fill: Option<u8>,
}

impl PoolConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn search_mode(
    mut self,
    mode: SearchMode,
  ) -> Self {
    self.search_mode = mode;
    self
  }

  pub fn alloc_fill(
    mut self,
    pattern: u8,
  ) -> Self {
    self.alloc_fill = Some(pattern);
    self
  }

  pub fn release_fill(
    mut self,
    pattern: u8,
  ) -> Self {
    self.release_fill = Some(pattern);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_is_first_fit_without_fills() {
    let config = PoolConfig::default();

    assert_eq!(config.search_mode, SearchMode::FirstFit);
    assert_eq!(config.alloc_fill, None);
    assert_eq!(config.release_fill, None);
  }

  #[test]
  fn test_builder_sets_every_field() {
    let config = PoolConfig::new()
      .search_mode(SearchMode::BestFit)
      .alloc_fill(0xAA)
      .release_fill(0xDD);

    assert_eq!(
      config,
      PoolConfig {
        search_mode: SearchMode::BestFit,
        alloc_fill: Some(0xAA),
        release_fill: Some(0xDD),
      }
    );
  }
}
