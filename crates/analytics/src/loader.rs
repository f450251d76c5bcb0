//! CSV loader for campaign performance exports.
//!
//! Validates the header against the required schema before decoding any
//! row, so a dataset either loads completely or fails with a structured
//! error.

use campaign_core::types::CampaignRow;
use campaign_core::{CampaignError, CampaignResult};
use csv::StringRecord;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const REQUIRED_COLUMNS: [&str; 9] = [
    "spend",
    "revenue",
    "ctr",
    "roas",
    "clicks",
    "impressions",
    "campaign_name",
    "date",
    "creative_message",
];

/// Column positions resolved from the header.
struct Schema {
    spend: usize,
    revenue: usize,
    ctr: usize,
    roas: usize,
    clicks: usize,
    impressions: usize,
    campaign_name: usize,
    date: usize,
    creative_message: usize,
}

impl Schema {
    fn resolve(headers: &StringRecord) -> CampaignResult<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: BTreeSet<String> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| position(*c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CampaignError::MissingColumns(missing));
        }

        let column = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            spend: column("spend"),
            revenue: column("revenue"),
            ctr: column("ctr"),
            roas: column("roas"),
            clicks: column("clicks"),
            impressions: column("impressions"),
            campaign_name: column("campaign_name"),
            date: column("date"),
            creative_message: column("creative_message"),
        })
    }
}

pub fn load_rows(path: &Path) -> CampaignResult<Vec<CampaignRow>> {
    let file = std::fs::File::open(path)?;
    let rows = parse_rows(file)?;
    metrics::counter!("dataset.rows_loaded").increment(rows.len() as u64);
    debug!(path = %path.display(), rows = rows.len(), "Loaded campaign rows");
    Ok(rows)
}

pub fn parse_rows<R: Read>(reader: R) -> CampaignResult<Vec<CampaignRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let schema = Schema::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based data row, header excluded
        let row = idx + 1;
        rows.push(CampaignRow {
            campaign_name: text_cell(&record, schema.campaign_name),
            date: record.get(schema.date).map(str::trim).unwrap_or("").to_string(),
            spend: numeric_cell(&record, schema.spend, "spend", row)?,
            revenue: numeric_cell(&record, schema.revenue, "revenue", row)?,
            ctr: numeric_cell(&record, schema.ctr, "ctr", row)?,
            roas: numeric_cell(&record, schema.roas, "roas", row)?,
            clicks: numeric_cell(&record, schema.clicks, "clicks", row)?,
            impressions: numeric_cell(&record, schema.impressions, "impressions", row)?,
            creative_message: text_cell(&record, schema.creative_message),
        });
    }
    Ok(rows)
}

/// Blank cells are missing; anything else is kept verbatim.
fn text_cell(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Blank and NaN cells are missing values; anything else must parse.
fn numeric_cell(
    record: &StringRecord,
    idx: usize,
    column: &str,
    row: usize,
) -> CampaignResult<Option<f64>> {
    let raw = record.get(idx).map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(CampaignError::MalformedValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}
