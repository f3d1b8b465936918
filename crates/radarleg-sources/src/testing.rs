//! Shared test doubles: a scripted transport and a canned adapter.

use std::collections::HashMap;

use async_stream::stream;
use async_trait::async_trait;

use radarleg_core::{BillRecord, SourceName, YearRange, UNKNOWN};

use crate::adapter::{ProgressSink, RecordStream, SourceAdapter};
use crate::error::SourceError;
use crate::transport::Transport;

/// Transport whose responses are scripted per URL. Unscripted URLs answer
/// with a 404-style server error, so tests catch unexpected requests.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    json: HashMap<String, Result<String, u16>>,
    bytes: Option<Result<Vec<u8>, u16>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn json(mut self, url: &str, body: &str) -> Self {
        self.json.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub(crate) fn fail(mut self, url: &str, status: u16) -> Self {
        self.json.insert(url.to_string(), Err(status));
        self
    }

    pub(crate) fn bytes(mut self, payload: Vec<u8>) -> Self {
        self.bytes = Some(Ok(payload));
        self
    }

    pub(crate) fn fail_bytes(mut self, status: u16) -> Self {
        self.bytes = Some(Err(status));
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, url: &str) -> Result<String, SourceError> {
        match self.json.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(SourceError::Server {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(SourceError::Server {
                status: 404,
                url: url.to_string(),
            }),
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        match &self.bytes {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(status)) => Err(SourceError::Server {
                status: *status,
                url: url.to_string(),
            }),
            None => Err(SourceError::Server {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

pub(crate) fn bill(identifier: &str, year: i32, source: SourceName, summary: &str) -> BillRecord {
    BillRecord {
        identifier: identifier.to_string(),
        year,
        chamber: source.chamber(),
        summary: summary.to_string(),
        authors: UNKNOWN.to_string(),
        presented_date: UNKNOWN.to_string(),
        status_text: UNKNOWN.to_string(),
        source_link: UNKNOWN.to_string(),
        source_name: source,
    }
}

/// Adapter that replays canned records, optionally ending with a fatal error.
pub(crate) struct StaticAdapter {
    name: SourceName,
    records: Vec<BillRecord>,
    fatal: Option<String>,
}

impl StaticAdapter {
    pub(crate) fn new(name: SourceName, records: Vec<BillRecord>) -> Self {
        Self {
            name,
            records,
            fatal: None,
        }
    }

    pub(crate) fn failing_after(
        name: SourceName,
        records: Vec<BillRecord>,
        message: &str,
    ) -> Self {
        Self {
            name,
            records,
            fatal: Some(message.to_string()),
        }
    }
}

impl SourceAdapter for StaticAdapter {
    fn name(&self) -> SourceName {
        self.name
    }

    fn fetch<'a>(
        &'a self,
        _range: YearRange,
        _per_year_limit: usize,
        _progress: &'a ProgressSink,
    ) -> RecordStream<'a> {
        Box::pin(stream! {
            for record in self.records.iter().cloned() {
                yield Ok(record);
            }
            if let Some(message) = &self.fatal {
                yield Err(SourceError::Payload(message.clone()));
            }
        })
    }
}
