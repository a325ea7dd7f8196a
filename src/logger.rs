use log::{Metadata, SetLoggerError};

struct SimpleLogger;

// Logs go to stderr: stdout is reserved for raw bank bytes.
impl log::Log for SimpleLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }
  fn log(&self, rec: &log::Record) {
    if !self.enabled(rec.metadata()) {
      return;
    }
    eprintln!(
      "[{}] {}:{} {}",
      rec.level(),
      rec.file().unwrap_or("unknown file"),
      rec.line().unwrap_or(0),
      rec.args()
    );
  }
  fn flush(&self) {}
}

pub fn init(verbose: bool) -> Result<(), SetLoggerError> {
  let level = if verbose {
    log::LevelFilter::Info
  } else {
    log::LevelFilter::Warn
  };
  log::set_max_level(level);
  log::set_boxed_logger(Box::new(SimpleLogger))
}
