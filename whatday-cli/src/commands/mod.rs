pub mod add;
pub mod config;
pub mod day;
pub mod delete;
pub mod done;
pub mod edit;
pub mod export;
pub mod import;
pub mod settings;
pub mod speak;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use whatday_core::{EventStore, FileStorage, Locale, WhatDay, Zone};

use crate::utils::dates;

/// Everything a command needs: config, the loaded store and the zone.
pub struct Session {
    pub whatday: WhatDay,
    pub store: EventStore<FileStorage>,
    pub zone: Zone,
}

impl Session {
    pub fn load() -> Result<Self> {
        let whatday = WhatDay::load()?;
        let zone = whatday.zone()?;
        let store = EventStore::load(whatday.storage());
        tracing::debug!(path = %whatday.data_path().display(), %zone, "Loaded store");

        Ok(Session {
            whatday,
            store,
            zone,
        })
    }

    pub fn locale(&self) -> Locale {
        self.whatday.locale()
    }

    pub fn today(&self) -> NaiveDate {
        self.zone.today(Utc::now())
    }

    /// `--date` argument, defaulting to today.
    pub fn date_arg(&self, date: Option<&str>) -> Result<NaiveDate> {
        match date {
            Some(input) => dates::parse_date(input, self.today()),
            None => Ok(self.today()),
        }
    }
}
