//! Property tests: random allocate/release scripts against the block
//! invariants, and the inspector against random buffers.

use proptest::prelude::*;
use rpool::{Handle, PoolAllocator, PoolConfig, SearchMode, inspect};

#[derive(Debug, Clone)]
enum Op {
  Allocate(usize),
  Release(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (1usize..300).prop_map(Op::Allocate),
    2 => any::<usize>().prop_map(Op::Release),
  ]
}

fn arb_mode() -> impl Strategy<Value = SearchMode> {
  prop_oneof![Just(SearchMode::FirstFit), Just(SearchMode::BestFit)]
}

struct Live {
  handle: Handle,
  size: usize,
  tag: u8,
}

proptest! {
  #[test]
  fn blocks_tile_and_never_leave_adjacent_free_space(
    ops in prop::collection::vec(arb_op(), 1..150),
    mode in arb_mode(),
    skew in 0usize..8,
  ) {
    let mut memory = vec![0u8; 4096 + skew];
    let config = PoolConfig::new().search_mode(mode);
    let mut pool = PoolAllocator::with_config(&mut memory[skew..], config).unwrap();
    let mut live: Vec<Live> = Vec::new();

    for (step, op) in ops.into_iter().enumerate() {
      match op {
        Op::Allocate(size) => match pool.allocate(size).unwrap() {
          Some(handle) => {
            prop_assert!(pool.usable_size(handle).unwrap() >= size);
            let tag = (step % 251) as u8 + 1;
            pool.payload_mut(handle).unwrap()[..size].fill(tag);
            live.push(Live { handle, size, tag });
          }
          None => {
            prop_assert!(pool.largest_free().unwrap() < size);
          }
        },
        Op::Release(pick) => {
          if !live.is_empty() {
            let gone = live.swap_remove(pick % live.len());
            pool.release(Some(gone.handle)).unwrap();
          }
        }
      }

      prop_assert_eq!(pool.check(), Ok(()));

      let blocks: Vec<_> = pool.blocks().unwrap().collect();
      prop_assert_eq!(blocks.iter().map(|b| b.span()).sum::<usize>(), pool.capacity());
      for pair in blocks.windows(2) {
        prop_assert!(!(pair[0].is_free && pair[1].is_free));
      }

      let held: usize = live.iter().map(|l| pool.usable_size(l.handle).unwrap()).sum();
      prop_assert_eq!(held, pool.allocated());

      for entry in &live {
        let payload = pool.payload(entry.handle).unwrap();
        prop_assert!(payload[..entry.size].iter().all(|&b| b == entry.tag));
      }
    }

    for entry in live.drain(..) {
      pool.release(Some(entry.handle)).unwrap();
    }
    prop_assert!(pool.stats().unwrap().is_pristine());
  }

  #[test]
  fn released_handles_cannot_be_released_again(
    sizes in prop::collection::vec(1usize..128, 1..20),
    victim in any::<usize>(),
  ) {
    let mut memory = vec![0u8; 4096];
    let mut pool = PoolAllocator::new(&mut memory).unwrap();

    let handles: Vec<Handle> = sizes
      .iter()
      .filter_map(|&size| pool.allocate(size).unwrap())
      .collect();
    prop_assume!(!handles.is_empty());

    let handle = handles[victim % handles.len()];
    pool.release(Some(handle)).unwrap();
    let before = pool.stats().unwrap();

    let err = pool.release(Some(handle)).unwrap_err();
    prop_assert!(err.is_contract_violation());
    prop_assert_eq!(pool.stats().unwrap(), before);
    prop_assert_eq!(pool.check(), Ok(()));
  }

  #[test]
  fn inspector_reports_exactly_the_non_zero_words(
    buffer in prop::collection::vec(prop_oneof![3 => Just(0u8), 1 => any::<u8>()], 0..256),
  ) {
    let words = inspect::dump(&buffer);
    let expected: Vec<usize> = buffer
      .chunks(inspect::WORD_WIDTH)
      .enumerate()
      .filter(|(_, chunk)| chunk.iter().any(|&b| b != 0))
      .map(|(index, _)| index * inspect::WORD_WIDTH)
      .collect();

    prop_assert_eq!(words.iter().map(|w| w.offset).collect::<Vec<_>>(), expected);
    for word in &words {
      prop_assert_eq!(word.as_bytes(), &buffer[word.offset..word.offset + word.len]);
    }
  }
}
