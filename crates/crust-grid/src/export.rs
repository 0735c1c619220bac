use std::fs;
use std::path::Path;

use crust_core::errors::{CrustError, ErrorInfo};

use crate::series::Series;

fn export_error(path: &Path, err: impl ToString) -> CrustError {
    CrustError::Serde(ErrorInfo::new("crust_grid.export", err.to_string()).with_path(path))
}

/// Writes `series` as pretty JSON `{ "x": [...], "y": [...] }`.
pub fn export_series_json(series: &Series, out_path: &Path) -> Result<(), CrustError> {
    let mut bytes = serde_json::to_vec_pretty(series).map_err(|err| export_error(out_path, err))?;
    bytes.push(b'\n');
    fs::write(out_path, bytes).map_err(|err| CrustError::io("crust_grid.export_write", out_path, err))
}

/// Writes `series` as a two-column CSV under `headers`.
pub fn export_series_csv(
    series: &Series,
    headers: [&str; 2],
    out_path: &Path,
) -> Result<(), CrustError> {
    let mut wtr = csv::Writer::from_path(out_path).map_err(|err| export_error(out_path, err))?;
    wtr.write_record(headers)
        .map_err(|err| export_error(out_path, err))?;
    for (x, y) in series.points() {
        wtr.write_record([x.to_string(), y.to_string()])
            .map_err(|err| export_error(out_path, err))?;
    }
    wtr.flush().map_err(|err| export_error(out_path, err))
}

/// Picks CSV or JSON by the file extension, defaulting to CSV.
pub fn export_series(
    series: &Series,
    headers: [&str; 2],
    out_path: &Path,
) -> Result<(), CrustError> {
    match out_path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => export_series_json(series, out_path),
        _ => export_series_csv(series, headers, out_path),
    }
}
