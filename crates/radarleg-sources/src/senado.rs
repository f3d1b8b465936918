//! Senate adapter: one bulk search request per year.
//!
//! The search endpoint wraps results in a deep PascalCase envelope and,
//! notoriously, serializes a single hit as a bare object instead of a
//! one-element array. [`OneOrMany`] normalizes both shapes. A failed year is
//! reported and skipped; remaining years still run.

use async_stream::stream;
use serde::Deserialize;
use tracing::{debug, warn};

use radarleg_core::record::or_unknown;
use radarleg_core::{BillRecord, SourceName, YearRange, UNKNOWN};

use crate::adapter::{ProgressSink, RadarEvent, RecordStream, SourceAdapter};
use crate::error::SourceError;
use crate::transport::Transport;

pub const DEFAULT_BASE_URL: &str = "https://legis.senado.leg.br/dadosabertos";

/// Bill subtypes kept from the search results; everything else (resolutions,
/// amendments, treaty decrees) is discarded.
const BILL_SUBTYPES: [&str; 3] = ["PLS", "PLC", "PL"];

/// Summaries shorter than this are placeholders, not real abstracts.
const MIN_SUMMARY_LEN: usize = 10;

pub struct SenadoAdapter<T> {
    transport: T,
    base_url: String,
}

impl<T: Transport> SenadoAdapter<T> {
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
        format!("{}/materia/pesquisa/lista?ano={year}", self.base_url)
    }
}

impl<T: Transport> SourceAdapter for SenadoAdapter<T> {
    fn name(&self) -> SourceName {
        SourceName::Senado
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
                        debug!(year, count = records.len(), "senate year fetched");
                        progress.emit(RadarEvent::YearFetched {
                            source: SourceName::Senado,
                            year,
                            records: records.len(),
                        });
                        for record in records {
                            yield Ok(record);
                        }
                    }
                    Err(e) => {
                        warn!(year, error = %e, "senate year failed, skipping");
                        progress.emit(RadarEvent::YearFailed {
                            source: SourceName::Senado,
                            year,
                            message: e.to_string(),
                        });
                    }
                }
            }
        })
    }
}

/// A field the upstream serializes either as a bare object or as an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "PesquisaBasicaMateria")]
    pesquisa: Option<PesquisaBasica>,
}

#[derive(Deserialize)]
struct PesquisaBasica {
    #[serde(rename = "Materias")]
    materias: Option<Materias>,
}

#[derive(Deserialize)]
struct Materias {
    #[serde(rename = "Materia")]
    materia: OneOrMany<serde_json::Value>,
}

#[derive(Deserialize)]
struct Materia {
    #[serde(rename = "IdentificacaoMateria")]
    identificacao: Identificacao,
    #[serde(rename = "DadosBasicosMateria")]
    dados: Option<DadosBasicos>,
    #[serde(rename = "AutoresPrincipais")]
    autores: Option<AutoresPrincipais>,
}

#[derive(Deserialize)]
struct Identificacao {
    #[serde(rename = "CodigoMateria")]
    codigo: Option<String>,
    #[serde(rename = "SiglaSubtipoMateria")]
    subtipo: Option<String>,
    #[serde(rename = "NumeroMateria")]
    numero: Option<String>,
    #[serde(rename = "AnoMateria")]
    ano: Option<String>,
}

#[derive(Deserialize)]
struct DadosBasicos {
    #[serde(rename = "EmentaMateria")]
    ementa: Option<String>,
    #[serde(rename = "DataApresentacao")]
    data_apresentacao: Option<String>,
    #[serde(rename = "IndicadorTramitando")]
    tramitando: Option<String>,
}

#[derive(Deserialize)]
struct AutoresPrincipais {
    #[serde(rename = "AutorPrincipal")]
    autor: OneOrMany<Autor>,
}

#[derive(Deserialize)]
struct Autor {
    #[serde(rename = "NomeAutor")]
    nome: Option<String>,
}

/// Decode one year's search response. An envelope with no hits is an empty
/// year, not an error; malformed individual entries are skipped.
fn parse_year(body: &str, requested_year: i32) -> Result<Vec<BillRecord>, SourceError> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;
    let Some(materias) = envelope.pesquisa.and_then(|p| p.materias) else {
        return Ok(Vec::new());
    };
    let records = materias
        .materia
        .into_vec()
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<Materia>(raw).ok())
        .filter_map(|materia| to_record(materia, requested_year))
        .collect();
    Ok(records)
}

fn to_record(materia: Materia, requested_year: i32) -> Option<BillRecord> {
    let id = materia.identificacao;
    let subtipo = id.subtipo?;
    if !BILL_SUBTYPES.contains(&subtipo.as_str()) {
        return None;
    }
    let numero = id.numero?;
    let summary = materia
        .dados
        .as_ref()
        .and_then(|d| d.ementa.clone())
        .unwrap_or_default();
    if summary.trim().len() < MIN_SUMMARY_LEN {
        return None;
    }

    let ano = id
        .ano
        .as_deref()
        .and_then(|a| a.parse::<i32>().ok())
        .unwrap_or(requested_year);
    let link = id
        .codigo
        .map(|c| format!("https://www25.senado.leg.br/web/atividade/materias/-/materia/{c}"))
        .unwrap_or_else(|| UNKNOWN.to_string());
    let authors = materia
        .autores
        .map(|a| {
            a.autor
                .into_vec()
                .into_iter()
                .filter_map(|autor| autor.nome)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|names| !names.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let status = materia.dados.as_ref().and_then(|d| {
        d.tramitando.as_deref().map(|flag| {
            if flag == "Sim" {
                "Em tramitação".to_string()
            } else {
                "Tramitação encerrada".to_string()
            }
        })
    });
    let presented = materia.dados.and_then(|d| d.data_apresentacao);

    Some(BillRecord {
        identifier: format!("{subtipo} {numero}/{ano}"),
        year: ano,
        chamber: SourceName::Senado.chamber(),
        summary,
        authors,
        presented_date: or_unknown(presented),
        status_text: or_unknown(status),
        source_link: link,
        source_name: SourceName::Senado,
    })
}
