//! Calendar (.ics) import and export.
//!
//! Import only reads the handful of VEVENT fields whatday stores (summary,
//! start, end, description and UID) and turns each entry into an [`Event`].
//! Export writes the store back out as a calendar other tools can read.
//!
//! [`Event`]: crate::event::Event

mod generate;
mod import;
mod lines;
mod parse;

pub use generate::generate_ics;
pub use import::import_calendar;
pub use parse::{ImportBatch, IcsTime, parse_calendar, parse_timestamp, unescape_text};
