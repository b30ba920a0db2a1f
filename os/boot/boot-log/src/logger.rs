use core::fmt;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Destination for formatted log output.
pub type Sink = fn(fmt::Arguments<'_>);

pub struct BootLogger {
    max_level: LevelFilter,
    #[cfg_attr(not(feature = "enabled"), allow(dead_code))]
    sink: Sink,
}

impl BootLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, sink: Sink) -> Self {
        Self { max_level, sink }
    }

    #[inline]
    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Install as the global logger. Call this once during early init.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }
}

impl fmt::Debug for BootLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootLogger")
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

impl Log for BootLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    #[cfg(feature = "enabled")]
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Format: "[LEVEL] target: message\n"
        (self.sink)(format_args!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    #[cfg(not(feature = "enabled"))]
    fn log(&self, _record: &Record) {}

    fn flush(&self) {
        // sinks are unbuffered
    }
}
