use std::collections::HashMap;

use crate::config::SideConfig;
use crate::error::ReconError;
use crate::model::{Record, Side, SideInput};

const BOM: char = '\u{feff}';

/// Load CSV rows into Records, resolving the name through the side's
/// configured columns in priority order.
///
/// Rows with no non-empty name are skipped and counted in `dropped`.
pub fn load_csv_records(
    side: Side,
    csv_data: &str,
    side_config: &SideConfig,
) -> Result<SideInput, ReconError> {
    let csv_data = csv_data.strip_prefix(BOM).unwrap_or(csv_data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // (column name, header index) for the configured columns that exist
    let name_idx: Vec<(&str, usize)> = side_config
        .name_columns
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c).map(|i| (c.as_str(), i)))
        .collect();

    let Some(&(name_column, _)) = name_idx.first() else {
        return Err(ReconError::MissingColumn {
            side,
            columns: side_config.name_columns.clone(),
        });
    };

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row.map_err(|e| ReconError::Io(e.to_string()))?;

        let name = name_idx
            .iter()
            .map(|&(_, i)| row.get(i).unwrap_or("").trim())
            .find(|v| !v.is_empty());

        let Some(name) = name else {
            dropped += 1;
            continue;
        };

        let fields: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).unwrap_or("").to_string()))
            .collect();

        records.push(Record {
            position: records.len(),
            name: name.to_string(),
            fields,
        });
    }

    if dropped > 0 {
        log::warn!("{side}: skipped {dropped} row(s) with an empty name");
    }

    Ok(SideInput {
        headers,
        name_column: name_column.to_string(),
        records,
        dropped,
    })
}
