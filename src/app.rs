use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::browser::Browser;
use crate::catalog::build_catalog;
use crate::config::{DiscoverySettings, Mode};
use crate::discovery::discover_instrument_ids;
use crate::domain::{InstrumentId, InstrumentRecord};
use crate::error::CatalogError;
use crate::maya::DetailsApi;
use crate::rank::rank_by_fee;
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub discovered: Option<usize>,
    pub resolved: usize,
    pub dropped: Vec<String>,
    pub ranked: usize,
    pub artifacts: Vec<String>,
    pub finished_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Sink that forwards progress to the log.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => tracing::debug!("{}", event.message),
        }
    }
}

pub struct App<B: Browser, A: DetailsApi> {
    store: Store,
    browser: B,
    api: A,
    discovery: DiscoverySettings,
}

impl<B: Browser, A: DetailsApi> App<B, A> {
    pub fn new(store: Store, browser: B, api: A, discovery: DiscoverySettings) -> Self {
        Self {
            store,
            browser,
            api,
            discovery,
        }
    }

    pub fn run(&mut self, mode: Mode, sink: &dyn ProgressSink) -> Result<RunSummary, CatalogError> {
        match mode {
            Mode::Full => self.full(sink),
            Mode::FromIds => self.from_ids(sink),
            Mode::RankOnly => self.rank_only(sink),
        }
    }

    /// Discovery, fetch and ranking in one pass.
    pub fn full(&mut self, sink: &dyn ProgressSink) -> Result<RunSummary, CatalogError> {
        let started = Instant::now();
        sink.event(ProgressEvent {
            message: format!("phase=Discover; opening {}", self.discovery.search_url),
            elapsed: None,
        });
        let ids = discover_instrument_ids(&mut self.browser, &self.discovery)?;
        sink.event(ProgressEvent {
            message: format!("phase=Discover; {} ids", ids.len()),
            elapsed: Some(started.elapsed()),
        });
        self.store.write_ids(&ids)?;

        let mut summary = self.fetch_and_rank(&ids, sink)?;
        summary.mode = Mode::Full;
        summary.discovered = Some(ids.len());
        summary
            .artifacts
            .insert(0, self.store.paths().ids.to_string());
        Ok(summary)
    }

    /// Fetch and rank the ids persisted by an earlier discovery.
    pub fn from_ids(&mut self, sink: &dyn ProgressSink) -> Result<RunSummary, CatalogError> {
        let ids = self.store.read_ids()?;
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} ids from {}", ids.len(), self.store.paths().ids),
            elapsed: None,
        });
        self.fetch_and_rank(&ids, sink)
    }

    /// Re-ranks the persisted catalog without touching the network.
    pub fn rank_only(&mut self, sink: &dyn ProgressSink) -> Result<RunSummary, CatalogError> {
        let records = self.store.read_catalog()?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Rank; {} records from {}",
                records.len(),
                self.store.paths().catalog
            ),
            elapsed: None,
        });
        let ranked = self.rank_and_write(&records)?;
        Ok(RunSummary {
            mode: Mode::RankOnly,
            discovered: None,
            resolved: records.len(),
            dropped: Vec::new(),
            ranked,
            artifacts: vec![self.store.paths().sorted_catalog.to_string()],
            finished_at: iso_timestamp(),
        })
    }

    fn fetch_and_rank(
        &self,
        ids: &[InstrumentId],
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, CatalogError> {
        let build = build_catalog(&self.api, ids, sink);
        self.store.write_catalog(&build.records)?;
        let ranked = self.rank_and_write(&build.records)?;

        Ok(RunSummary {
            mode: Mode::FromIds,
            discovered: None,
            resolved: build.records.len(),
            dropped: build.dropped.iter().map(|id| id.to_string()).collect(),
            ranked,
            artifacts: vec![
                self.store.paths().catalog.to_string(),
                self.store.paths().sorted_catalog.to_string(),
            ],
            finished_at: iso_timestamp(),
        })
    }

    fn rank_and_write(&self, records: &[InstrumentRecord]) -> Result<usize, CatalogError> {
        let ranked = rank_by_fee(records);
        self.store.write_sorted_catalog(&ranked)?;
        Ok(ranked.len())
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
