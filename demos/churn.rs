use rpool::diag::{DiagnosticLogger, LogFacade};
use rpool::{PoolAllocator, inspect, pool_error, pool_info, pool_warn};

const POOL_SIZE: usize = 30 * 1024;
const REQUEST: usize = 100;
const ROUNDS: usize = 1000;

fn main() {
  // Run with `RUST_LOG=rpool=debug` to see the hex dumps as well.
  env_logger::init();

  let logger = LogFacade::new();
  let mut memory = vec![0u8; POOL_SIZE];

  let mut pool = match PoolAllocator::new(&mut memory) {
    Ok(pool) => pool,
    Err(err) => {
      pool_error!(logger, "cannot bind pool: {}", err);
      return;
    }
  };

  // --------------------------------------------------------------------
  // 1) Churn: allocate, touch, release the same size over and over.
  //    Without block reuse the arena would run dry after ~240 rounds.
  // --------------------------------------------------------------------
  for round in 0..ROUNDS {
    let handle = match pool.allocate(REQUEST) {
      Ok(Some(handle)) => handle,
      Ok(None) => {
        pool_error!(logger, "malloc fail @{}", round);
        break;
      }
      Err(err) => {
        pool_error!(logger, "malloc rejected @{}: {}", round, err);
        break;
      }
    };

    let address = pool.address(handle).unwrap_or_default();
    pool_info!(logger, "malloc {} times, @{:#x}", round, address);

    if let Ok(payload) = pool.payload_mut(handle) {
      payload[0] = 0xFF;
    }

    if let Err(err) = pool.release(Some(handle)) {
      pool_error!(logger, "free rejected @{}: {}", round, err);
      break;
    }
  }

  // --------------------------------------------------------------------
  // 2) Observe the arena: stats, non-zero words, first bytes as hex.
  // --------------------------------------------------------------------
  match pool.stats() {
    Ok(stats) => pool_info!(logger, "pool after churn: {}", stats),
    Err(err) => pool_warn!(logger, "pool inconsistent: {}", err),
  }

  if let Ok(bytes) = pool.as_bytes() {
    let reported = inspect::report(bytes, &logger);
    pool_info!(logger, "{} non-zero words in arena", reported);
    logger.dump("arena head", &bytes[..bytes.len().min(64)]);
  }

  // --------------------------------------------------------------------
  // 3) Misuse is reported, never silently absorbed.
  // --------------------------------------------------------------------
  if let Ok(Some(handle)) = pool.allocate(REQUEST) {
    let _ = pool.release(Some(handle));
    if let Err(err) = pool.release(Some(handle)) {
      pool_warn!(logger, "second release detected: {}", err);
    }
  }
}
