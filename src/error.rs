//! Error types for the pool.
//!
//! Exhaustion is deliberately *not* an error: [`PoolAllocator::allocate`]
//! reports it as `Ok(None)`. Everything here is either a configuration
//! problem caught at initialization or a caller contract violation.
//!
//! [`PoolAllocator::allocate`]: crate::PoolAllocator::allocate

use thiserror::Error;

pub type PoolResult<T> = Result<T, PoolError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  /// The buffer cannot hold even one header plus one word of payload.
  #[error("arena too small: {size} bytes supplied, at least {required} required")]
  ArenaTooSmall { size: usize, required: usize },

  /// An operation was attempted before any buffer was bound.
  #[error("pool is not initialized")]
  NotInitialized,

  #[error("zero-sized allocation requested")]
  ZeroSize,

  #[error("handle offset {offset} lies outside the arena")]
  OutOfBounds { offset: usize },

  #[error("handle offset {offset} is not word aligned")]
  Misaligned { offset: usize },

  /// The handle was issued before the pool was last (re)initialized.
  #[error("handle from epoch {handle_epoch} used after reset to epoch {current_epoch}")]
  StaleHandle { handle_epoch: u32, current_epoch: u32 },

  #[error("handle offset {offset} released twice")]
  DoubleRelease { offset: usize },

  /// The handle points into a free region (payload access on a released
  /// handle).
  #[error("handle offset {offset} does not refer to a live allocation")]
  NotAllocated { offset: usize },

  /// The handle points inside a live block but not at its payload start.
  #[error("handle offset {offset} is not the start of a block")]
  InvalidHandle { offset: usize },

  /// Block metadata failed an integrity check.
  #[error("arena corrupted at offset {offset}: {reason}")]
  Corrupted { offset: usize, reason: &'static str },
}

impl PoolError {
  /// `true` for errors caused by misuse of the API, as opposed to
  /// configuration (`ArenaTooSmall`) or metadata damage (`Corrupted`).
  pub fn is_contract_violation(&self) -> bool {
    !matches!(self, PoolError::ArenaTooSmall { .. } | PoolError::Corrupted { .. })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_contract_violation_classification() {
    assert!(PoolError::ZeroSize.is_contract_violation());
    assert!(PoolError::DoubleRelease { offset: 24 }.is_contract_violation());
    assert!(PoolError::NotInitialized.is_contract_violation());
    assert!(!PoolError::ArenaTooSmall { size: 4, required: 32 }.is_contract_violation());
    assert!(
      !PoolError::Corrupted {
        offset: 0,
        reason: "bad tag"
      }
      .is_contract_violation()
    );
  }

  #[test]
  fn test_messages_name_the_offending_offset() {
    let err = PoolError::Misaligned { offset: 27 };
    assert_eq!(err.to_string(), "handle offset 27 is not word aligned");

    let err = PoolError::ArenaTooSmall { size: 8, required: 32 };
    assert_eq!(err.to_string(), "arena too small: 8 bytes supplied, at least 32 required");
  }
}
