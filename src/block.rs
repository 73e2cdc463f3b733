use crate::align::WORD;

/// Bytes of inline metadata in front of every payload.
pub const HEADER_SIZE: usize = 3 * WORD;

const TAG_USED: usize = 0xA110_C8ED;
const TAG_FREE: usize = 0xF4EE_B10C;
const NO_PREV: usize = usize::MAX;

/// Inline block header.
///
/// ```text
///   ┌──────────┬──────────┬──────────┬──────────────────────┐
///   │   tag    │   size   │   prev   │   payload (size B)   │
///   └──────────┴──────────┴──────────┴──────────────────────┘
///   one word each, native endian     ▲
///                                    └── handle offset
/// ```
///
/// `tag` encodes the state and doubles as an integrity marker, `size` is the
/// payload capacity and `prev` is the header offset of the physically
/// preceding block. The following block always starts at `at + span()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Block {
  pub size: usize,
  pub is_free: bool,
  pub prev: Option<usize>,
}

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    prev: Option<usize>,
  ) -> Self {
    Self { size, is_free, prev }
  }

  /// Decodes the header at `at`. `None` when the tag is not a live header.
  pub fn read(
    buf: &[u8],
    at: usize,
  ) -> Option<Self> {
    let is_free = match read_word(buf, at) {
      TAG_USED => false,
      TAG_FREE => true,
      _ => return None,
    };
    let size = read_word(buf, at + WORD);
    let prev = match read_word(buf, at + 2 * WORD) {
      NO_PREV => None,
      offset => Some(offset),
    };

    Some(Self { size, is_free, prev })
  }

  pub fn write(
    &self,
    buf: &mut [u8],
    at: usize,
  ) {
    let tag = if self.is_free { TAG_FREE } else { TAG_USED };
    write_word(buf, at, tag);
    write_word(buf, at + WORD, self.size);
    write_word(buf, at + 2 * WORD, self.prev.unwrap_or(NO_PREV));
  }

  /// Clears a header that was absorbed by a neighbour so it can never be
  /// mistaken for a block start again.
  pub fn erase(
    buf: &mut [u8],
    at: usize,
  ) {
    buf[at..at + HEADER_SIZE].fill(0);
  }

  /// Header plus payload.
  pub fn span(&self) -> usize {
    HEADER_SIZE + self.size
  }
}

/// Public, read-only view of one block, as yielded by
/// [`PoolAllocator::blocks`](crate::PoolAllocator::blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the header within the bound buffer.
  pub offset: usize,
  /// Payload capacity in bytes.
  pub size: usize,
  pub is_free: bool,
}

impl BlockInfo {
  pub fn payload_offset(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  pub fn span(&self) -> usize {
    HEADER_SIZE + self.size
  }

  /// One past the last byte of the block.
  pub fn end(&self) -> usize {
    self.offset + self.span()
  }
}

fn read_word(
  buf: &[u8],
  at: usize,
) -> usize {
  let mut bytes = [0u8; WORD];
  bytes.copy_from_slice(&buf[at..at + WORD]);
  usize::from_ne_bytes(bytes)
}

fn write_word(
  buf: &mut [u8],
  at: usize,
  value: usize,
) {
  buf[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_roundtrip_keeps_state_and_links() {
    let mut buf = [0u8; HEADER_SIZE * 2];

    Block::new(64, true, None).write(&mut buf, 0);
    Block::new(8, false, Some(0)).write(&mut buf, HEADER_SIZE);

    assert_eq!(Block::read(&buf, 0), Some(Block::new(64, true, None)));
    assert_eq!(Block::read(&buf, HEADER_SIZE), Some(Block::new(8, false, Some(0))));
  }

  #[test]
  fn test_zeroed_or_erased_header_is_not_a_block() {
    let mut buf = [0u8; HEADER_SIZE];
    assert_eq!(Block::read(&buf, 0), None);

    Block::new(16, false, None).write(&mut buf, 0);
    Block::erase(&mut buf, 0);

    assert_eq!(Block::read(&buf, 0), None);
    assert!(buf.iter().all(|&b| b == 0));
  }

  #[test]
  fn test_block_info_geometry() {
    let info = BlockInfo {
      offset: WORD,
      size: 4 * WORD,
      is_free: false,
    };

    assert_eq!(info.payload_offset(), WORD + HEADER_SIZE);
    assert_eq!(info.end(), WORD + HEADER_SIZE + 4 * WORD);
  }
}
