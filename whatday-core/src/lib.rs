//! Core of whatday, a daily task and appointment companion.
//!
//! This crate provides everything shared by the whatday CLI and the
//! notification daemon:
//! - `EventStore` and the persisted `Event`/`Settings` records
//! - `ics` for importing calendar feeds and exporting the store
//! - `scheduler` for planning reminders
//! - `narrator` for spoken day summaries

pub mod constants;
pub mod datetime;
pub mod error;
pub mod event;
pub mod ics;
pub mod narrator;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod store;
pub mod whatday;
pub mod whatday_config;

pub use datetime::{Locale, Zone};
pub use error::{WhatDayError, WhatDayResult};
pub use event::{Category, Event, EventDraft, EventPatch};
pub use settings::Settings;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{DayStats, EventStore};
pub use whatday::WhatDay;
pub use whatday_config::WhatDayConfig;
