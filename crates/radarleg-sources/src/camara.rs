//! Chamber of deputies adapter: paginated open-data REST API.
//!
//! Iterates years newest-first and pages through `/proposicoes` with a fixed
//! page size. A failed or empty page ends that year's pagination only; pages
//! already fetched are kept and sibling years are unaffected.

use async_stream::stream;
use serde::Deserialize;
use tracing::{debug, warn};

use radarleg_core::record::or_unknown;
use radarleg_core::{BillRecord, SourceName, YearRange, UNKNOWN};

use crate::adapter::{ProgressSink, RadarEvent, RecordStream, SourceAdapter};
use crate::error::SourceError;
use crate::transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://dadosabertos.camara.leg.br/api/v2";

/// The API serves at most 100 items per page.
const PAGE_SIZE: usize = 100;
/// Hard ceiling on requests per year, bounding worst-case load.
const MAX_PAGES_PER_YEAR: u32 = 20;
/// Raw records fetched per relevant record wanted: the term filter discards
/// the vast majority of proposals, so oversample heavily.
const RAW_OVERSAMPLE: usize = 15;
const MIN_RAW_PER_YEAR: usize = 500;

pub struct CamaraAdapter<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> CamaraAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, year: i32, page: u32) -> String {
        format!(
            "{}/proposicoes?siglaTipo=PL&ano={year}&itens={PAGE_SIZE}&pagina={page}",
            self.base_url
        )
    }
}

impl<T: Transport> SourceAdapter for CamaraAdapter<T> {
    fn name(&self) -> SourceName {
        SourceName::Camara
    }

    fn fetch<'a>(
        &'a self,
        range: YearRange,
        per_year_limit: usize,
        progress: &'a ProgressSink,
    ) -> RecordStream<'a> {
        Box::pin(stream! {
            let pages = page_budget(per_year_limit);
            for year in range.years_desc() {
                let mut year_records = 0usize;
                for page in 1..=pages {
                    let url = self.page_url(year, page);
                    let body = match self.transport.get_json(&url).await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(year, page, error = %e, "page fetch failed, ending year");
                            progress.emit(RadarEvent::PageFailed {
                                source: SourceName::Camara,
                                year,
                                page,
                                message: e.to_string(),
                            });
                            break;
                        }
                    };
                    let records = match parse_page(&body, year) {
                        Ok(records) => records,
                        Err(e) => {
                            warn!(year, page, error = %e, "page parse failed, ending year");
                            progress.emit(RadarEvent::PageFailed {
                                source: SourceName::Camara,
                                year,
                                page,
                                message: e.to_string(),
                            });
                            break;
                        }
                    };
                    if records.is_empty() {
                        break;
                    }
                    let count = records.len();
                    debug!(year, page, count, "page fetched");
                    progress.emit(RadarEvent::PageFetched {
                        source: SourceName::Camara,
                        year,
                        page,
                        records: count,
                    });
                    for record in records {
                        yield Ok(record);
                    }
                    year_records += count;
                    // A short page means the year is exhausted.
                    if count < PAGE_SIZE {
                        break;
                    }
                }
                progress.emit(RadarEvent::YearFetched {
                    source: SourceName::Camara,
                    year,
                    records: year_records,
                });
            }
        })
    }
}

/// Pages to request per year, sized from the per-year target.
fn page_budget(per_year_limit: usize) -> u32 {
    let raw = (per_year_limit * RAW_OVERSAMPLE).max(MIN_RAW_PER_YEAR);
    (raw.div_ceil(PAGE_SIZE) as u32).clamp(1, MAX_PAGES_PER_YEAR)
}

#[derive(Deserialize)]
struct ProposicoesPage {
    #[serde(default)]
    dados: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct Proposicao {
    id: Option<i64>,
    #[serde(rename = "siglaTipo")]
    sigla_tipo: Option<String>,
    numero: Option<i64>,
    ano: Option<i32>,
    ementa: Option<String>,
    #[serde(rename = "dataApresentacao")]
    data_apresentacao: Option<String>,
    #[serde(rename = "statusProposicao")]
    status: Option<StatusProposicao>,
}

#[derive(Deserialize)]
struct StatusProposicao {
    #[serde(rename = "descricaoSituacao")]
    descricao_situacao: Option<String>,
}

/// Decode one page body. Individually malformed rows are skipped; a body
/// that is not the expected envelope fails the page.
fn parse_page(body: &str, year: i32) -> Result<Vec<BillRecord>, SourceError> {
    let page: ProposicoesPage = serde_json::from_str(body)?;
    let records = page
        .dados
        .into_iter()
        .filter_map(|row| serde_json::from_value::<Proposicao>(row).ok())
        .filter_map(|prop| to_record(prop, year))
        .collect();
    Ok(records)
}

fn to_record(prop: Proposicao, requested_year: i32) -> Option<BillRecord> {
    let numero = prop.numero?;
    let ano = prop.ano.unwrap_or(requested_year);
    let sigla = prop.sigla_tipo.unwrap_or_else(|| "PL".to_string());
    let link = prop
        .id
        .map(|id| {
            format!("https://www.camara.leg.br/proposicoesWeb/fichadetramitacao?idProposicao={id}")
        })
        .unwrap_or_else(|| UNKNOWN.to_string());

    Some(BillRecord {
        identifier: format!("{sigla} {numero}/{ano}"),
        year: ano,
        chamber: SourceName::Camara.chamber(),
        summary: prop.ementa.unwrap_or_default(),
        authors: UNKNOWN.to_string(),
        presented_date: or_unknown(prop.data_apresentacao),
        status_text: or_unknown(prop.status.and_then(|s| s.descricao_situacao)),
        source_link: link,
        source_name: SourceName::Camara,
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::testing::ScriptedTransport;

    fn page_body(rows: &[serde_json::Value]) -> String {
        serde_json::json!({ "dados": rows }).to_string()
    }

    fn row(id: i64, numero: i64, ano: i32, ementa: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "siglaTipo": "PL",
            "numero": numero,
            "ano": ano,
            "ementa": ementa,
            "dataApresentacao": "2022-03-01",
            "statusProposicao": { "descricaoSituacao": "Em tramitação" }
        })
    }

    async fn drain(adapter: &CamaraAdapter<ScriptedTransport>, range: YearRange) -> Vec<BillRecord> {
        let sink = ProgressSink::disabled();
        let mut out = Vec::new();
        let mut stream = adapter.fetch(range, 5, &sink);
        while let Some(item) = stream.next().await {
            out.push(item.expect("camara never yields fatal errors"));
        }
        out
    }

    #[test]
    fn parse_page_maps_fields() {
        let body = page_body(&[row(42, 1234, 2022, "Dispõe sobre nome social")]);
        let records = parse_page(&body, 2022).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.identifier, "PL 1234/2022");
        assert_eq!(r.year, 2022);
        assert_eq!(r.summary, "Dispõe sobre nome social");
        assert_eq!(r.status_text, "Em tramitação");
        assert!(r.source_link.contains("idProposicao=42"));
    }

    #[test]
    fn parse_page_skips_malformed_rows() {
        let body = page_body(&[
            row(1, 10, 2022, "a"),
            serde_json::json!({ "numero": "not-a-number" }),
            serde_json::json!({ "siglaTipo": "PL" }), // missing numero
            row(2, 11, 2022, "b"),
        ]);
        let records = parse_page(&body, 2022).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn parse_page_rejects_wrong_envelope() {
        assert!(parse_page("[1,2,3]", 2022).is_err());
        assert!(parse_page("not json", 2022).is_err());
    }

    #[test]
    fn missing_optional_fields_default_to_sentinel() {
        let body = page_body(&[serde_json::json!({ "numero": 9, "ano": 2021 })]);
        let records = parse_page(&body, 2021).unwrap();
        let r = &records[0];
        assert_eq!(r.identifier, "PL 9/2021");
        assert_eq!(r.summary, "");
        assert_eq!(r.presented_date, UNKNOWN);
        assert_eq!(r.status_text, UNKNOWN);
        assert_eq!(r.source_link, UNKNOWN);
    }

    #[test]
    fn page_budget_is_bounded() {
        assert_eq!(page_budget(0), 5); // MIN_RAW_PER_YEAR / PAGE_SIZE
        assert_eq!(page_budget(50), 8); // 750 raw records
        assert_eq!(page_budget(10_000), MAX_PAGES_PER_YEAR);
    }

    #[tokio::test]
    async fn short_page_ends_the_year() {
        use std::sync::{Arc, Mutex};

        let adapter = CamaraAdapter::with_base_url(
            ScriptedTransport::new().json(
                "http://api/proposicoes?siglaTipo=PL&ano=2022&itens=100&pagina=1",
                &page_body(&[row(1, 10, 2022, "x")]),
            ),
            "http://api",
        );
        // Page 2 is unscripted: requesting it would surface as PageFailed.
        let failures: Arc<Mutex<Vec<u32>>> = Default::default();
        let inner = failures.clone();
        let sink = ProgressSink::new(move |ev| {
            if let RadarEvent::PageFailed { page, .. } = ev {
                inner.lock().unwrap().push(page);
            }
        });

        let range = YearRange::new(2022, 2022).unwrap();
        let records: Vec<_> = adapter
            .fetch(range, 5, &sink)
            .map(|item| item.expect("camara never yields fatal errors"))
            .collect()
            .await;

        assert_eq!(records.len(), 1);
        assert!(failures.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn page_failure_keeps_prior_pages_and_other_years() {
        fn full_page(ementa: &str) -> String {
            let rows: Vec<serde_json::Value> =
                (0..100).map(|i| row(i, i + 1, 2022, ementa)).collect();
            page_body(&rows)
        }

        let adapter = CamaraAdapter::with_base_url(
            ScriptedTransport::new()
                .json(
                    "http://api/proposicoes?siglaTipo=PL&ano=2022&itens=100&pagina=1",
                    &full_page("p1"),
                )
                .json(
                    "http://api/proposicoes?siglaTipo=PL&ano=2022&itens=100&pagina=2",
                    &full_page("p2"),
                )
                .fail(
                    "http://api/proposicoes?siglaTipo=PL&ano=2022&itens=100&pagina=3",
                    503,
                )
                .json(
                    "http://api/proposicoes?siglaTipo=PL&ano=2021&itens=100&pagina=1",
                    &page_body(&[row(900, 77, 2021, "y2021")]),
                ),
            "http://api",
        );

        let range = YearRange::new(2021, 2022).unwrap();
        let records = drain(&adapter, range).await;

        // Pages 1-2 of 2022 (200 records) plus the single 2021 record.
        assert_eq!(records.len(), 201);
        assert_eq!(records.iter().filter(|r| r.year == 2022).count(), 200);
        assert_eq!(records.iter().filter(|r| r.year == 2021).count(), 1);
        // 2022 comes first: years iterate newest-first.
        assert_eq!(records[0].year, 2022);
        assert_eq!(records[200].identifier, "PL 77/2021");
    }

    #[tokio::test]
    async fn failed_first_page_yields_nothing_for_that_year() {
        let adapter = CamaraAdapter::with_base_url(
            ScriptedTransport::new().fail(
                "http://api/proposicoes?siglaTipo=PL&ano=2022&itens=100&pagina=1",
                500,
            ),
            "http://api",
        );
        let range = YearRange::new(2022, 2022).unwrap();
        let records = drain(&adapter, range).await;
        assert!(records.is_empty());
    }
}
