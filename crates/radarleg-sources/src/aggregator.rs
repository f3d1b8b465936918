//! Drains the enabled source adapters in order and assembles one
//! deduplicated, relevance-filtered result set.

use std::collections::HashSet;

use futures::StreamExt;
use tracing::{info, warn};

use radarleg_core::{ConfigError, RelevanceFilter, RelevantBill, SourceName, YearRange};

use crate::adapter::{ProgressSink, RadarEvent, SourceAdapter};

/// Dedup across sources loses a few records, so each source is asked for a
/// little more than its even share.
const OVERSHOOT: f64 = 1.1;

/// What to collect: an inclusive year range, the sources to drain in order,
/// and the total result cap.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    pub start_year: i32,
    pub end_year: i32,
    pub sources: Vec<SourceName>,
    pub limit: usize,
}

/// A source that failed mid-collection. Advisory: the collection still
/// carries every record harvested before the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWarning {
    pub source: SourceName,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Collection {
    pub bills: Vec<RelevantBill>,
    pub warnings: Vec<SourceWarning>,
}

pub struct Aggregator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    filter: RelevanceFilter,
}

impl Aggregator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, filter: RelevanceFilter) -> Self {
        Self { adapters, filter }
    }

    fn adapter(&self, name: SourceName) -> Result<&dyn SourceAdapter, ConfigError> {
        self.adapters
            .iter()
            .map(Box::as_ref)
            .find(|a| a.name() == name)
            .ok_or(ConfigError::SourceNotRegistered(name))
    }

    /// Run one collection. Configuration problems fail fast, before any
    /// network activity; per-source failures only produce warnings.
    pub async fn collect(
        &self,
        request: &CollectRequest,
        progress: &ProgressSink,
    ) -> Result<Collection, ConfigError> {
        if request.sources.is_empty() {
            return Err(ConfigError::NoSourcesEnabled);
        }
        let range = YearRange::new(request.start_year, request.end_year)?;
        for source in &request.sources {
            self.adapter(*source)?;
        }

        let per_source = per_source_limit(request.limit, request.sources.len());
        let per_year = per_source.div_ceil(range.year_count());

        let mut collection = Collection::default();
        for source in &request.sources {
            let adapter = self.adapter(*source)?;
            let mut accepted = Vec::new();
            let mut stream = adapter.fetch(range, per_year, progress);
            while let Some(item) = stream.next().await {
                match item {
                    Ok(record) => {
                        if record.summary.trim().is_empty()
                            || !self.filter.is_relevant(&record.summary)
                        {
                            continue;
                        }
                        let term_matches = self.filter.match_count(&record.summary);
                        accepted.push(RelevantBill {
                            record,
                            term_matches,
                        });
                        // Dropping the stream here cancels any remaining
                        // fetches for this source.
                        if accepted.len() >= per_source {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(source = %source, error = %e, "source failed");
                        progress.emit(RadarEvent::SourceFailed {
                            source: *source,
                            message: e.to_string(),
                        });
                        collection.warnings.push(SourceWarning {
                            source: *source,
                            message: e.to_string(),
                        });
                        break;
                    }
                }
            }
            info!(source = %source, accepted = accepted.len(), "source drained");
            progress.emit(RadarEvent::SourceDrained {
                source: *source,
                accepted: accepted.len(),
            });
            collection.bills.extend(accepted);
        }

        dedup_by_identifier(&mut collection.bills);
        collection.bills.truncate(request.limit);
        Ok(collection)
    }
}

/// Even share of the total limit plus the dedup overshoot, rounded up.
fn per_source_limit(limit: usize, sources: usize) -> usize {
    ((limit as f64 * OVERSHOOT) / sources as f64).ceil() as usize
}

/// First occurrence wins, preserving source order.
fn dedup_by_identifier(bills: &mut Vec<RelevantBill>) {
    let mut seen = HashSet::new();
    bills.retain(|bill| seen.insert(bill.record.identifier.clone()));
}

#[cfg(test)]
mod tests {
    use radarleg_core::TermSet;

    use super::*;
    use crate::testing::{bill, StaticAdapter};

    const RELEVANT: &str = "Dispõe sobre a identidade de gênero nos registros públicos";
    const IRRELEVANT: &str = "Denomina viaduto no município de Bauru";

    fn request(sources: Vec<SourceName>, limit: usize) -> CollectRequest {
        CollectRequest {
            start_year: 2022,
            end_year: 2022,
            sources,
            limit,
        }
    }

    fn aggregator(adapters: Vec<Box<dyn SourceAdapter>>) -> Aggregator {
        Aggregator::new(adapters, RelevanceFilter::new(TermSet::default()))
    }

    #[tokio::test]
    async fn empty_source_set_fails_before_fetching() {
        let agg = aggregator(vec![]);
        let err = agg
            .collect(&request(vec![], 10), &ProgressSink::disabled())
            .await
            .unwrap_err();
        assert_eq!(err, ConfigError::NoSourcesEnabled);
    }

    #[tokio::test]
    async fn inverted_year_range_fails_before_fetching() {
        let agg = aggregator(vec![Box::new(StaticAdapter::new(
            SourceName::Camara,
            vec![],
        ))]);
        let mut req = request(vec![SourceName::Camara], 10);
        req.start_year = 2023;
        req.end_year = 2020;
        let err = agg.collect(&req, &ProgressSink::disabled()).await.unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidYearRange {
                start: 2023,
                end: 2020
            }
        );
    }

    #[tokio::test]
    async fn unregistered_source_fails_before_fetching() {
        let agg = aggregator(vec![Box::new(StaticAdapter::new(
            SourceName::Camara,
            vec![],
        ))]);
        let err = agg
            .collect(
                &request(vec![SourceName::Camara, SourceName::Senado], 10),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ConfigError::SourceNotRegistered(SourceName::Senado));
    }

    #[tokio::test]
    async fn irrelevant_and_empty_summaries_are_rejected() {
        let agg = aggregator(vec![Box::new(StaticAdapter::new(
            SourceName::Camara,
            vec![
                bill("PL 1/2022", 2022, SourceName::Camara, RELEVANT),
                bill("PL 2/2022", 2022, SourceName::Camara, IRRELEVANT),
                bill("PL 3/2022", 2022, SourceName::Camara, "   "),
            ],
        ))]);
        let collection = agg
            .collect(&request(vec![SourceName::Camara], 10), &ProgressSink::disabled())
            .await
            .unwrap();
        assert_eq!(collection.bills.len(), 1);
        assert_eq!(collection.bills[0].record.identifier, "PL 1/2022");
        assert!(collection.bills[0].term_matches >= 1);
    }

    #[tokio::test]
    async fn duplicate_identifiers_keep_the_first_occurrence() {
        let agg = aggregator(vec![
            Box::new(StaticAdapter::new(
                SourceName::Camara,
                vec![bill("PL 5/2022", 2022, SourceName::Camara, RELEVANT)],
            )),
            Box::new(StaticAdapter::new(
                SourceName::Senado,
                vec![bill("PL 5/2022", 2022, SourceName::Senado, RELEVANT)],
            )),
        ]);
        let collection = agg
            .collect(
                &request(vec![SourceName::Camara, SourceName::Senado], 10),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(collection.bills.len(), 1);
        assert_eq!(collection.bills[0].record.source_name, SourceName::Camara);
    }

    #[tokio::test]
    async fn source_failure_keeps_prior_records_and_later_sources() {
        let agg = aggregator(vec![
            Box::new(StaticAdapter::failing_after(
                SourceName::Alesp,
                vec![bill("PL 10/2022", 2022, SourceName::Alesp, RELEVANT)],
                "archive corrupt",
            )),
            Box::new(StaticAdapter::new(
                SourceName::Senado,
                vec![bill("PLS 11/2022", 2022, SourceName::Senado, RELEVANT)],
            )),
        ]);
        let collection = agg
            .collect(
                &request(vec![SourceName::Alesp, SourceName::Senado], 10),
                &ProgressSink::disabled(),
            )
            .await
            .unwrap();
        assert_eq!(collection.bills.len(), 2);
        assert_eq!(collection.warnings.len(), 1);
        assert_eq!(collection.warnings[0].source, SourceName::Alesp);
        assert!(collection.warnings[0].message.contains("archive corrupt"));
    }

    #[tokio::test]
    async fn per_source_cap_stops_the_stream_early() {
        let records: Vec<_> = (0..50)
            .map(|i| bill(&format!("PL {i}/2022"), 2022, SourceName::Camara, RELEVANT))
            .collect();
        let agg = aggregator(vec![Box::new(StaticAdapter::new(
            SourceName::Camara,
            records,
        ))]);
        // limit 10, one source: per-source cap is ceil(10 * 1.1) = 11,
        // then the final truncate brings it back to 10.
        let collection = agg
            .collect(&request(vec![SourceName::Camara], 10), &ProgressSink::disabled())
            .await
            .unwrap();
        assert_eq!(collection.bills.len(), 10);
    }

    #[test]
    fn per_source_limit_rounds_up() {
        assert_eq!(per_source_limit(50, 2), 28); // 55 / 2
        assert_eq!(per_source_limit(10, 4), 3); // 11 / 4
        assert_eq!(per_source_limit(1, 1), 2); // 1.1 rounds up
    }
}
