//! São Paulo city council adapter: legacy `.asmx` webservice.
//!
//! One request per year returns the entire year as a flat JSON list, no
//! pagination and no server-side filtering. A busy year carries tens of
//! thousands of rows; all of them are streamed through and filtered
//! downstream. Numeric fields arrive as strings or numbers depending on the
//! row, so decoding is shape-tolerant.

use async_stream::stream;
use serde::Deserialize;
use tracing::{debug, warn};

use radarleg_core::record::or_unknown;
use radarleg_core::{BillRecord, SourceName, YearRange, UNKNOWN};

use crate::adapter::{ProgressSink, RadarEvent, RecordStream, SourceAdapter};
use crate::error::SourceError;
use crate::transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://splegisws.saopaulo.sp.leg.br/ws/ws2.asmx";

pub struct MunicipalSpAdapter<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> MunicipalSpAdapter<T> {
    pub fn new(transport: T) -> Self {
        Self::with_base_url(transport, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn year_url(&self, year: i32) -> String {
        format!("{}/ProjetosPorAnoJSON?ano={year}", self.base_url)
    }
}

impl<T: Transport> SourceAdapter for MunicipalSpAdapter<T> {
    fn name(&self) -> SourceName {
        SourceName::MunicipalSp
    }

    fn fetch<'a>(
        &'a self,
        range: YearRange,
        _per_year_limit: usize,
        progress: &'a ProgressSink,
    ) -> RecordStream<'a> {
        Box::pin(stream! {
            for year in range.years_desc() {
                let url = self.year_url(year);
                let outcome = match self.transport.get_json(&url).await {
                    Ok(body) => parse_year(&body, year),
                    Err(e) => Err(e),
                };
                match outcome {
                    Ok(records) => {
                        debug!(year, count = records.len(), "municipal year fetched");
                        progress.emit(RadarEvent::YearFetched {
                            source: SourceName::MunicipalSp,
                            year,
                            records: records.len(),
                        });
                        for record in records {
                            yield Ok(record);
                        }
                    }
                    Err(e) => {
                        warn!(year, error = %e, "municipal year failed, skipping");
                        progress.emit(RadarEvent::YearFailed {
                            source: SourceName::MunicipalSp,
                            year,
                            message: e.to_string(),
                        });
                    }
                }
            }
        })
    }
}

/// A value the webservice emits as either a JSON number or a quoted string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Numberish {
    Int(i64),
    Text(String),
}

impl Numberish {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct Projeto {
    tipo: Option<String>,
    numero: Option<Numberish>,
    ano: Option<Numberish>,
    ementa: Option<String>,
    data: Option<String>,
    chave: Option<Numberish>,
}

fn parse_year(body: &str, requested_year: i32) -> Result<Vec<BillRecord>, SourceError> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let records = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value::<Projeto>(row).ok())
        .filter_map(|projeto| to_record(projeto, requested_year))
        .collect();
    Ok(records)
}

fn to_record(projeto: Projeto, requested_year: i32) -> Option<BillRecord> {
    let numero = projeto.numero.as_ref().and_then(Numberish::as_i64)?;
    let ano = projeto
        .ano
        .as_ref()
        .and_then(Numberish::as_i64)
        .map(|a| a as i32)
        .unwrap_or(requested_year);
    let tipo = projeto.tipo.unwrap_or_else(|| "PL".to_string());
    let link = projeto
        .chave
        .as_ref()
        .and_then(Numberish::as_i64)
        .map(|chave| {
            format!("https://splegisconsulta.saopaulo.sp.leg.br/Pesquisa/DetailsDetalhado?COD_MTRA_LEGL={chave}")
        })
        .unwrap_or_else(|| UNKNOWN.to_string());

    Some(BillRecord {
        identifier: format!("{tipo} {numero}/{ano}"),
        year: ano,
        chamber: SourceName::MunicipalSp.chamber(),
        summary: projeto.ementa.unwrap_or_default(),
        authors: UNKNOWN.to_string(),
        presented_date: or_unknown(projeto.data),
        status_text: UNKNOWN.to_string(),
        source_link: link,
        source_name: SourceName::MunicipalSp,
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::testing::ScriptedTransport;

    #[test]
    fn parses_a_flat_list() {
        let body = serde_json::json!([
            {
                "tipo": "PL",
                "numero": 101,
                "ano": 2022,
                "ementa": "Dispõe sobre o uso do nome social em serviços municipais",
                "data": "2022-04-02T00:00:00",
                "chave": 9001
            },
            {
                "tipo": "PL",
                "numero": "102",
                "ano": "2022",
                "ementa": "Institui campanha municipal",
                "chave": "9002"
            }
        ])
        .to_string();
        let records = parse_year(&body, 2022).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "PL 101/2022");
        assert!(records[0].source_link.contains("COD_MTRA_LEGL=9001"));
        // Quoted numbers decode the same as bare ones.
        assert_eq!(records[1].identifier, "PL 102/2022");
        assert!(records[1].source_link.contains("COD_MTRA_LEGL=9002"));
    }

    #[test]
    fn rows_without_a_number_are_skipped() {
        let body = serde_json::json!([
            { "tipo": "PL", "ano": 2022, "ementa": "sem número" },
            { "tipo": "PL", "numero": 7, "ano": 2022, "ementa": "ok" }
        ])
        .to_string();
        let records = parse_year(&body, 2022).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "PL 7/2022");
    }

    #[test]
    fn non_list_body_is_an_error() {
        assert!(parse_year("{\"erro\": true}", 2022).is_err());
    }

    #[tokio::test]
    async fn failed_year_is_reported_and_skipped() {
        let adapter = MunicipalSpAdapter::with_base_url(
            ScriptedTransport::new()
                .fail("http://ws/ProjetosPorAnoJSON?ano=2022", 503)
                .json(
                    "http://ws/ProjetosPorAnoJSON?ano=2021",
                    &serde_json::json!([
                        { "tipo": "PL", "numero": 1, "ano": 2021, "ementa": "x" }
                    ])
                    .to_string(),
                ),
            "http://ws",
        );
        let sink = ProgressSink::disabled();
        let range = YearRange::new(2021, 2022).unwrap();
        let records: Vec<_> = adapter
            .fetch(range, 5, &sink)
            .filter_map(|item| async { item.ok() })
            .collect()
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2021);
    }
}
