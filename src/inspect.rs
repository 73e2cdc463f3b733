//! Raw arena inspection.
//!
//! Walks a buffer four bytes at a time and reports every word that is not
//! all zero, together with its byte offset. Useful for spotting stale
//! payloads or headers that were never cleared. Purely observational: the
//! scan never touches allocator state.
//!
//! ```text
//!   offset  bytes (memory order)
//!   000:    0x0cb1eef4
//!   008:    0xe8770000
//! ```

use core::fmt;
use core::iter::Enumerate;
use core::slice::Chunks;

use crate::diag::DiagnosticLogger;

/// Width of one inspected word.
pub const WORD_WIDTH: usize = 4;

/// One non-zero word found by [`scan`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Word {
  pub offset: usize,
  /// Bytes in memory order. Only the first `len` are meaningful.
  pub bytes: [u8; WORD_WIDTH],
  /// `WORD_WIDTH` except for a trailing partial word.
  pub len: usize,
}

impl Word {
  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes[..self.len]
  }
}

impl fmt::Display for Word {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:03}: 0x", self.offset)?;
    for byte in self.as_bytes() {
      write!(f, "{byte:02x}")?;
    }
    Ok(())
  }
}

/// Iterator returned by [`scan`].
pub struct Words<'b> {
  chunks: Enumerate<Chunks<'b, u8>>,
}

impl Iterator for Words<'_> {
  type Item = Word;

  fn next(&mut self) -> Option<Word> {
    for (index, chunk) in self.chunks.by_ref() {
      if chunk.iter().all(|&b| b == 0) {
        continue;
      }

      let mut bytes = [0u8; WORD_WIDTH];
      bytes[..chunk.len()].copy_from_slice(chunk);

      return Some(Word {
        offset: index * WORD_WIDTH,
        bytes,
        len: chunk.len(),
      });
    }

    None
  }
}

/// Lazily yields the non-zero words of `buffer`.
///
/// Each step consumes exactly one word, so no byte is read twice or skipped.
/// A trailing partial word is reported with only the bytes present.
pub fn scan(buffer: &[u8]) -> Words<'_> {
  Words {
    chunks: buffer.chunks(WORD_WIDTH).enumerate(),
  }
}

/// Collects every non-zero word of `buffer`.
pub fn dump(buffer: &[u8]) -> Vec<Word> {
  scan(buffer).collect()
}

/// Emits every non-zero word through `logger` at debug level and returns
/// how many were reported.
pub fn report(
  buffer: &[u8],
  logger: &dyn DiagnosticLogger,
) -> usize {
  let mut count = 0;
  for word in scan(buffer) {
    logger.debug(format_args!("{word}"));
    count += 1;
  }
  count
}
