use super::parse::parse_calendar;
use crate::datetime::Zone;
use crate::error::WhatDayResult;
use crate::storage::Storage;
use crate::store::EventStore;

/// Parse calendar text and append the new events to the store in one write.
///
/// Returns the number of events added. Nothing is written when the text
/// has no entries (`NoEventsFound`) or when every entry was skipped.
pub fn import_calendar<S: Storage>(
    store: &mut EventStore<S>,
    text: &str,
    zone: &Zone,
) -> WhatDayResult<usize> {
    let batch = parse_calendar(text, store, zone)?;

    tracing::info!(
        entries = batch.entries,
        added = batch.count(),
        skipped = batch.skipped(),
        "Parsed calendar"
    );

    Ok(store.append(batch.events))
}
