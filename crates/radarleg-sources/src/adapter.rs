//! The source adapter contract and the progress side-channel.

use futures::stream::BoxStream;

use radarleg_core::{BillRecord, SourceName, YearRange};

use crate::error::SourceError;

/// Lazily produced candidate records, one page/year unit at a time, so the
/// aggregator can stop early by dropping the stream. `Err` items are
/// source-fatal; transient failures are absorbed inside the adapter.
pub type RecordStream<'a> = BoxStream<'a, Result<BillRecord, SourceError>>;

/// One protocol, one origin. Implementations translate raw source payloads
/// into canonical [`BillRecord`]s and never leak payload quirks downstream.
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> SourceName;

    /// Stream raw candidates for the year range. `per_year_limit` sizes the
    /// raw fetch budget for paginated sources; relevance filtering happens
    /// in the aggregator, never here.
    fn fetch<'a>(
        &'a self,
        range: YearRange,
        per_year_limit: usize,
        progress: &'a ProgressSink,
    ) -> RecordStream<'a>;
}

/// Incremental progress notifications emitted during a fetch.
///
/// A side-channel for logging and UIs, not part of the data contract.
#[derive(Debug, Clone)]
pub enum RadarEvent {
    PageFetched {
        source: SourceName,
        year: i32,
        page: u32,
        records: usize,
    },
    PageFailed {
        source: SourceName,
        year: i32,
        page: u32,
        message: String,
    },
    YearFetched {
        source: SourceName,
        year: i32,
        records: usize,
    },
    YearFailed {
        source: SourceName,
        year: i32,
        message: String,
    },
    ArchiveDownloaded {
        source: SourceName,
        bytes: usize,
    },
    SourceFailed {
        source: SourceName,
        message: String,
    },
    SourceDrained {
        source: SourceName,
        accepted: usize,
    },
}

/// Observer callback for [`RadarEvent`]s. The disabled sink drops events.
pub struct ProgressSink {
    callback: Option<Box<dyn Fn(RadarEvent) + Send + Sync>>,
}

impl ProgressSink {
    pub fn new(callback: impl Fn(RadarEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    pub fn disabled() -> Self {
        Self { callback: None }
    }

    pub fn emit(&self, event: RadarEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::disabled()
    }
}
