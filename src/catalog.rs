use std::time::Instant;

use tracing::info;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{InstrumentId, InstrumentRecord};
use crate::fetcher::fetch_instrument;
use crate::maya::DetailsApi;

#[derive(Debug, Clone, Default)]
pub struct CatalogBuild {
    /// Resolved records, in id order.
    pub records: Vec<InstrumentRecord>,
    pub dropped: Vec<InstrumentId>,
}

/// Fetches every id strictly one after another. A failed id is skipped and
/// never stops the loop.
pub fn build_catalog<A: DetailsApi + ?Sized>(
    api: &A,
    ids: &[InstrumentId],
    sink: &dyn ProgressSink,
) -> CatalogBuild {
    let started = Instant::now();
    let mut build = CatalogBuild::default();

    for (index, id) in ids.iter().enumerate() {
        sink.event(ProgressEvent {
            message: format!("phase=Fetch; {}/{} {id}", index + 1, ids.len()),
            elapsed: None,
        });
        match fetch_instrument(api, id) {
            Some(record) => build.records.push(record),
            None => build.dropped.push(id.clone()),
        }
    }

    info!(
        resolved = build.records.len(),
        dropped = build.dropped.len(),
        "catalog built"
    );
    sink.event(ProgressEvent {
        message: format!(
            "phase=Fetch; resolved {} of {} ids",
            build.records.len(),
            ids.len()
        ),
        elapsed: Some(started.elapsed()),
    });
    build
}
