//! The event store.
//!
//! Holds every event in memory in insertion order and writes the full list
//! back to storage after each mutation. Storage failures are logged and
//! otherwise ignored: the in-memory state stays authoritative for the rest of
//! the session.

use chrono::NaiveDate;

use crate::constants::{EVENTS_KEY, ICS_URL_KEY};
use crate::datetime;
use crate::error::{WhatDayError, WhatDayResult};
use crate::event::{Event, EventDraft, EventPatch};
use crate::storage::Storage;

pub struct EventStore<S: Storage> {
    storage: S,
    events: Vec<Event>,
}

/// Completion counts for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayStats {
    pub total: usize,
    pub done: usize,
    pub remaining: usize,
}

impl<S: Storage> EventStore<S> {
    pub fn load(storage: S) -> Self {
        let events = read_events(&storage);
        EventStore { storage, events }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events on a day, ordered by start time. Untimed events come first.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&Event> {
        let key = datetime::date_key(date);
        let mut day: Vec<&Event> = self.events.iter().filter(|e| e.date == key).collect();
        day.sort_by(|a, b| a.time.cmp(&b.time));
        day
    }

    pub fn stats_on(&self, date: NaiveDate) -> DayStats {
        let day = self.events_on(date);
        let done = day.iter().filter(|e| e.completed).count();
        DayStats {
            total: day.len(),
            done,
            remaining: day.len() - done,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Find an event by its full id or a unique id prefix.
    pub fn resolve(&self, id: &str) -> WhatDayResult<&Event> {
        if let Some(event) = self.get(id) {
            return Ok(event);
        }
        if id.is_empty() {
            return Err(WhatDayError::EventNotFound(id.to_string()));
        }

        let mut matches = self.events.iter().filter(|e| e.id.starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(event), None) => Ok(event),
            (Some(_), Some(_)) => Err(WhatDayError::AmbiguousId(id.to_string())),
            (None, _) => Err(WhatDayError::EventNotFound(id.to_string())),
        }
    }

    /// Whether an imported event with this external id is already stored.
    pub fn has_ics_uid(&self, uid: &str) -> bool {
        self.events.iter().any(|e| e.ics_uid.as_deref() == Some(uid))
    }

    pub fn add(&mut self, draft: EventDraft) -> WhatDayResult<Event> {
        let event = Event::new(draft)?;
        self.events.push(event.clone());
        self.persist();
        tracing::debug!(id = %event.id, date = %event.date, "Added event");
        Ok(event)
    }

    pub fn update(&mut self, id: &str, patch: EventPatch) -> WhatDayResult<&Event> {
        let idx = self.index_of(id)?;
        self.events[idx].apply(patch)?;
        self.persist();
        Ok(&self.events[idx])
    }

    pub fn delete(&mut self, id: &str) -> WhatDayResult<Event> {
        let idx = self.index_of(id)?;
        let removed = self.events.remove(idx);
        self.persist();
        tracing::debug!(id = %removed.id, "Deleted event");
        Ok(removed)
    }

    /// Flip the completion flag, returning the new value.
    pub fn toggle_complete(&mut self, id: &str) -> WhatDayResult<bool> {
        let idx = self.index_of(id)?;
        let event = &mut self.events[idx];
        event.completed = !event.completed;
        let completed = event.completed;
        self.persist();
        Ok(completed)
    }

    /// Append already-built events (e.g. from an import) in one write.
    pub fn append(&mut self, events: Vec<Event>) -> usize {
        let count = events.len();
        if count > 0 {
            self.events.extend(events);
            self.persist();
        }
        count
    }

    /// Re-read events from storage. Returns whether anything changed.
    pub fn reload(&mut self) -> bool {
        let events = read_events(&self.storage);
        if events == self.events {
            return false;
        }
        self.events = events;
        true
    }

    pub fn last_import_url(&self) -> Option<String> {
        self.storage
            .read_json::<String>(ICS_URL_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!("Could not read last import URL: {e}");
                None
            })
            .filter(|url| !url.is_empty())
    }

    pub fn set_last_import_url(&self, url: &str) {
        if let Err(e) = self.storage.write_json(ICS_URL_KEY, &url) {
            tracing::warn!("Could not save last import URL: {e}");
        }
    }

    fn index_of(&self, id: &str) -> WhatDayResult<usize> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| WhatDayError::EventNotFound(id.to_string()))
    }

    fn persist(&self) {
        if let Err(e) = self.storage.write_json(EVENTS_KEY, &self.events) {
            tracing::warn!("Could not save events, changes are kept in memory only: {e}");
        }
    }
}

fn read_events<S: Storage>(storage: &S) -> Vec<Event> {
    match storage.read_json::<Vec<Event>>(EVENTS_KEY) {
        Ok(events) => events.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Could not load events, starting empty: {e}");
            Vec::new()
        }
    }
}
