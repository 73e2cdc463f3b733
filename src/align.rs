use core::mem;

/// Alignment guaranteed for every payload handed out by the pool.
pub const WORD: usize = mem::size_of::<usize>();

/// Rounds `value` up to the machine word.
///
/// # Examples
///
/// ```rust
/// use rpool::align;
///
/// match core::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align::align_up($value, $crate::align::WORD)
  };
}

/// Rounds `value` up to an explicit power-of-two boundary.
///
/// ```rust
/// use rpool::align_to;
///
/// assert_eq!(align_to!(17, 16), 32);
/// assert_eq!(align_to!(32, 16), 32);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    $crate::align::align_up($value, $align)
  };
}

/// `align` must be a power of two and `value + align - 1` must not overflow.
pub const fn align_up(
  value: usize,
  align: usize,
) -> usize {
  (value + align - 1) & !(align - 1)
}

/// Like [`align_up`] but reports overflow instead of wrapping.
pub const fn checked_align_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  match value.checked_add(align - 1) {
    Some(v) => Some(v & !(align - 1)),
    None => None,
  }
}

pub const fn is_aligned(
  value: usize,
  align: usize,
) -> bool {
  value & (align - 1) == 0
}
