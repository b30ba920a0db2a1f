//! # Boot Loader Logging
//!
//! A [`log`] backend for the loader, usable before there is a heap or a
//! console driver.
//!
//! The loader decides where output goes (a serial port, the debug console,
//! the firmware's text output) and hands the logger a plain function that
//! accepts preformatted [`core::fmt::Arguments`]. Nothing is buffered or
//! allocated; every record goes straight to the sink as
//!
//! ```text
//! [LEVEL] target: message
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use boot_log::BootLogger;
//! use log::{LevelFilter, info};
//!
//! fn serial_write(args: core::fmt::Arguments<'_>) {
//!     // Forward to the UART.
//! #   let _ = args;
//! }
//!
//! static LOGGER: BootLogger = BootLogger::new(LevelFilter::Debug, serial_write);
//!
//! LOGGER.init().expect("logger initialization");
//! info!("Memory map ready");
//! ```
//!
//! ## Features
//!
//! * `enabled` (default): records are formatted and forwarded. Without it the
//!   logger still installs but drops everything, so release loaders can keep
//!   their `log` calls.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod logger;

pub use logger::{BootLogger, Sink};
