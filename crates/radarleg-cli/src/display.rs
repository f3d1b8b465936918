//! Terminal report rendering.
//!
//! The core crates emit plain data; everything a human reads is assembled
//! here. Progress goes to stderr so the report itself stays pipeable.

use radarleg_ai::{ScoreResult, Verdict};
use radarleg_core::RelevantBill;
use radarleg_sources::aggregator::SourceWarning;
use radarleg_sources::RadarEvent;

const SUMMARY_WIDTH: usize = 96;

pub struct ScoredBill {
    pub bill: RelevantBill,
    pub result: ScoreResult,
}

/// Incremental progress lines during harvesting.
pub fn progress(event: &RadarEvent) {
    match event {
        RadarEvent::PageFetched {
            source,
            year,
            page,
            records,
        } => {
            eprintln!("  {source} {year}: página {page} ({records} registros)");
        }
        RadarEvent::PageFailed {
            source,
            year,
            page,
            message,
        } => {
            eprintln!("  {source} {year}: página {page} falhou ({message})");
        }
        RadarEvent::YearFetched {
            source,
            year,
            records,
        } => {
            eprintln!("  {source} {year}: {records} registros brutos");
        }
        RadarEvent::YearFailed {
            source,
            year,
            message,
        } => {
            eprintln!("  {source} {year}: ano falhou ({message})");
        }
        RadarEvent::ArchiveDownloaded { source, bytes } => {
            eprintln!("  {source}: arquivo baixado ({:.1} MB)", *bytes as f64 / 1e6);
        }
        RadarEvent::SourceFailed { source, message } => {
            eprintln!("  {source}: fonte falhou ({message})");
        }
        RadarEvent::SourceDrained { source, accepted } => {
            eprintln!("  {source}: {accepted} projetos relevantes");
        }
    }
}

/// The full report: totals, verdict distribution, one row per bill,
/// detail links for unfavorable bills, then the warning trail.
pub fn report(bills: &[ScoredBill], warnings: &[SourceWarning]) {
    let unfavorable = count(bills, Verdict::Unfavorable);
    let review = count(bills, Verdict::NeedsReview);
    let favorable = count(bills, Verdict::Favorable);

    println!();
    println!("{}", "=".repeat(100));
    println!("RADAR LEGISLATIVO — {} projetos relevantes", bills.len());
    println!(
        "  DESFAVORÁVEL: {unfavorable}   REVISÃO: {review}   FAVORÁVEL: {favorable}"
    );
    println!("{}", "=".repeat(100));

    for scored in bills {
        let record = &scored.bill.record;
        println!(
            "{:<14} {:<5} {:<18} {:<12} {:>5.1}%  {}",
            record.identifier,
            record.year,
            record.chamber.as_str(),
            scored.result.verdict.as_str(),
            scored.result.final_score * 100.0,
            truncate(&record.summary, SUMMARY_WIDTH),
        );
    }

    let links: Vec<&ScoredBill> = bills
        .iter()
        .filter(|s| s.result.verdict == Verdict::Unfavorable)
        .collect();
    if !links.is_empty() {
        println!();
        println!("Projetos desfavoráveis — links para acompanhamento:");
        for scored in links {
            println!(
                "  {}  {}",
                scored.bill.record.identifier, scored.bill.record.source_link
            );
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("Avisos:");
        for warning in warnings {
            println!("  {}: {}", warning.source, warning.message);
        }
    }
    println!();
}

fn count(bills: &[ScoredBill], verdict: Verdict) -> usize {
    bills
        .iter()
        .filter(|s| s.result.verdict == verdict)
        .count()
}

/// Char-boundary-safe truncation with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let text = "Dispõe sobre ações públicas";
        assert_eq!(truncate(text, 100), text);
        let short = truncate(text, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with('…'));
    }
}
