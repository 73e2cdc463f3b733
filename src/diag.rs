//! Diagnostic logging collaborator.
//!
//! The pool never logs by itself. Callers that want to observe it pick a
//! [`DiagnosticLogger`]:
//!
//! - [`LogFacade`] forwards to the [`log`] crate, so any backend
//!   (`env_logger`, ...) can render the records;
//! - [`MemoryLogger`] keeps rendered lines in memory for later assertions.
//!
//! ```rust
//! use rpool::diag::{DiagnosticLogger, MemoryLogger};
//! use rpool::pool_info;
//!
//! let logger = MemoryLogger::new();
//! pool_info!(logger, "malloc {} times, @{:#x}", 3, 0x40);
//! logger.dump("example", b"This is a example for logsys.");
//!
//! assert_eq!(logger.lines()[0], "[INFO] malloc 3 times, @0x40");
//! assert_eq!(logger.lines()[1], "example (29 bytes)");
//! ```

use core::cell::RefCell;
use core::fmt;

pub use log::{Level, LevelFilter};

/// Default `log` target for records emitted through [`LogFacade`].
pub const TARGET: &str = "rpool";

const ROW: usize = 16;

/// Leveled text logging plus a named hex dump.
pub trait DiagnosticLogger {
  fn log(
    &self,
    level: Level,
    args: fmt::Arguments<'_>,
  );

  /// Renders `data` under `label`; see [`HexDump`] for the layout.
  fn dump(
    &self,
    label: &str,
    data: &[u8],
  );

  fn debug(
    &self,
    args: fmt::Arguments<'_>,
  ) {
    self.log(Level::Debug, args);
  }

  fn info(
    &self,
    args: fmt::Arguments<'_>,
  ) {
    self.log(Level::Info, args);
  }

  fn warn(
    &self,
    args: fmt::Arguments<'_>,
  ) {
    self.log(Level::Warn, args);
  }

  fn error(
    &self,
    args: fmt::Arguments<'_>,
  ) {
    self.log(Level::Error, args);
  }
}

#[macro_export]
macro_rules! pool_debug {
  ($logger:expr, $($arg:tt)+) => {{
    use $crate::diag::DiagnosticLogger as _;
    ($logger).debug(format_args!($($arg)+))
  }};
}

#[macro_export]
macro_rules! pool_info {
  ($logger:expr, $($arg:tt)+) => {{
    use $crate::diag::DiagnosticLogger as _;
    ($logger).info(format_args!($($arg)+))
  }};
}

#[macro_export]
macro_rules! pool_warn {
  ($logger:expr, $($arg:tt)+) => {{
    use $crate::diag::DiagnosticLogger as _;
    ($logger).warn(format_args!($($arg)+))
  }};
}

#[macro_export]
macro_rules! pool_error {
  ($logger:expr, $($arg:tt)+) => {{
    use $crate::diag::DiagnosticLogger as _;
    ($logger).error(format_args!($($arg)+))
  }};
}

/// Hex/ASCII rendering of a labelled buffer, 16 bytes per row.
///
/// ```text
///   example (20 bytes)
///   0000: 54 68 69 73 20 69 73 20 61 20 65 78 61 6d 70 6c |This is a exampl|
///   0010: 65 00 00 00                                     |e...|
/// ```
pub struct HexDump<'d> {
  label: &'d str,
  data: &'d [u8],
}

impl<'d> HexDump<'d> {
  pub fn new(
    label: &'d str,
    data: &'d [u8],
  ) -> Self {
    Self { label, data }
  }

  pub fn header(&self) -> String {
    format!("{} ({} bytes)", self.label, self.data.len())
  }

  /// Body rows, without the header line.
  pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
    self
      .data
      .chunks(ROW)
      .enumerate()
      .map(|(index, chunk)| render_row(index * ROW, chunk))
  }
}

impl fmt::Display for HexDump<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{}", self.header())?;
    for row in self.rows() {
      write!(f, "\n{row}")?;
    }
    Ok(())
  }
}

fn render_row(
  offset: usize,
  chunk: &[u8],
) -> String {
  let mut line = format!("{offset:04x}:");
  for byte in chunk {
    line.push_str(&format!(" {byte:02x}"));
  }
  for _ in chunk.len()..ROW {
    line.push_str("   ");
  }

  line.push_str(" |");
  line.extend(chunk.iter().map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' }));
  line.push('|');
  line
}

/// Forwards to the `log` facade.
///
/// Hex dumps are emitted at debug level, one record per row, and skipped
/// entirely when debug is disabled for the target.
#[derive(Clone, Copy, Debug)]
pub struct LogFacade {
  target: &'static str,
}

impl LogFacade {
  pub const fn new() -> Self {
    Self { target: TARGET }
  }

  pub const fn with_target(target: &'static str) -> Self {
    Self { target }
  }

  pub fn target(&self) -> &'static str {
    self.target
  }
}

impl Default for LogFacade {
  fn default() -> Self {
    Self::new()
  }
}

impl DiagnosticLogger for LogFacade {
  fn log(
    &self,
    level: Level,
    args: fmt::Arguments<'_>,
  ) {
    log::log!(target: self.target, level, "{}", args);
  }

  fn dump(
    &self,
    label: &str,
    data: &[u8],
  ) {
    if !log::log_enabled!(target: self.target, Level::Debug) {
      return;
    }

    let dump = HexDump::new(label, data);
    log::debug!(target: self.target, "{}", dump.header());
    for row in dump.rows() {
      log::debug!(target: self.target, "{}", row);
    }
  }
}

/// Captures rendered lines in memory.
///
/// Lines look like `[LEVEL] message`; hex dumps contribute their header and
/// rows verbatim. Records above `max_level` are dropped; dumps are treated
/// as debug output.
#[derive(Debug)]
pub struct MemoryLogger {
  max_level: LevelFilter,
  lines: RefCell<Vec<String>>,
}

impl MemoryLogger {
  pub fn new() -> Self {
    Self::with_max_level(LevelFilter::Trace)
  }

  pub fn with_max_level(max_level: LevelFilter) -> Self {
    Self {
      max_level,
      lines: RefCell::new(Vec::new()),
    }
  }

  pub fn lines(&self) -> Vec<String> {
    self.lines.borrow().clone()
  }

  /// Drains captured lines.
  pub fn take(&self) -> Vec<String> {
    self.lines.take()
  }

  pub fn contains(
    &self,
    needle: &str,
  ) -> bool {
    self.lines.borrow().iter().any(|line| line.contains(needle))
  }

  fn enabled(
    &self,
    level: Level,
  ) -> bool {
    level <= self.max_level
  }
}

impl Default for MemoryLogger {
  fn default() -> Self {
    Self::new()
  }
}

impl DiagnosticLogger for MemoryLogger {
  fn log(
    &self,
    level: Level,
    args: fmt::Arguments<'_>,
  ) {
    if self.enabled(level) {
      self.lines.borrow_mut().push(format!("[{level}] {args}"));
    }
  }

  fn dump(
    &self,
    label: &str,
    data: &[u8],
  ) {
    if !self.enabled(Level::Debug) {
      return;
    }

    let dump = HexDump::new(label, data);
    let mut lines = self.lines.borrow_mut();
    lines.push(dump.header());
    lines.extend(dump.rows());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_levels_are_tagged() {
    let logger = MemoryLogger::new();

    crate::pool_debug!(logger, "d{}", 1);
    crate::pool_info!(logger, "i");
    crate::pool_warn!(&logger, "w");
    crate::pool_error!(logger, "e {}", "x");

    assert_eq!(logger.take(), vec!["[DEBUG] d1", "[INFO] i", "[WARN] w", "[ERROR] e x"]);
    assert!(logger.lines().is_empty());
  }

  #[test]
  fn test_max_level_filters_records_and_dumps() {
    let logger = MemoryLogger::with_max_level(LevelFilter::Warn);

    crate::pool_info!(logger, "hidden");
    crate::pool_error!(logger, "shown");
    logger.dump("buf", &[1, 2, 3]);

    assert_eq!(logger.lines(), vec!["[ERROR] shown"]);
  }

  #[test]
  fn test_hex_dump_layout() {
    let data: Vec<u8> = b"This is a example".iter().copied().chain([0, 0, 0]).collect();

    let rendered = HexDump::new("example", &data).to_string();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "example (20 bytes)");
    assert_eq!(lines[1], "0000: 54 68 69 73 20 69 73 20 61 20 65 78 61 6d 70 6c |This is a exampl|");
    assert_eq!(lines[2], format!("0010: 65 00 00 00{} |e...|", "   ".repeat(12)));
  }

  #[test]
  fn test_empty_dump_has_only_header() {
    let logger = MemoryLogger::new();
    logger.dump("empty", &[]);

    assert_eq!(logger.lines(), vec!["empty (0 bytes)"]);
  }

  #[test]
  fn test_facade_is_usable_as_trait_object() {
    let facade = LogFacade::with_target("rpool::test");
    let logger: &dyn DiagnosticLogger = &facade;

    // No backend installed: records are discarded without panicking.
    logger.info(format_args!("hello {}", 1));
    logger.dump("buf", &[0xAB; 40]);
    assert_eq!(facade.target(), "rpool::test");
  }
}
