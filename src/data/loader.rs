use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{Roi, SampleRecord, Spectrum};
use crate::config::Delimiter;

// ---------------------------------------------------------------------------
// Sample list entry-point
// ---------------------------------------------------------------------------

/// Load a sample list.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – one row per sample, ROI bounds in `ROI<k> lb` / `ROI<k> hb` columns
/// * `.json` – `[{ "name": ..., "water": ..., "rois": [{ "start": .., "end": .. }], ... }, ...]`
pub fn load_sample_list(path: &Path) -> Result<Vec<SampleRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_sample_csv(path)?,
        "json" => load_sample_json(path)?,
        other => bail!("Unsupported sample list extension: .{other}"),
    };
    if records.is_empty() {
        bail!("{} lists no samples", path.display());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON sample list
// ---------------------------------------------------------------------------

fn load_sample_json(path: &Path) -> Result<Vec<SampleRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<SampleRecord> = serde_json::from_str(&text).context("parsing JSON sample list")?;
    for (i, rec) in records.iter().enumerate() {
        if rec.name.trim().is_empty() {
            bail!("Row {i}: empty sample name");
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV sample list
// ---------------------------------------------------------------------------

/// Column positions of a CSV sample list.
struct CsvLayout {
    name: usize,
    water: Option<usize>,
    feo: Option<usize>,
    spline: Option<usize>,
    reference: Option<usize>,
    water_reference: Option<usize>,
    /// ROI number → (lower bound column, upper bound column).
    rois: BTreeMap<u32, (Option<usize>, Option<usize>)>,
}

impl CsvLayout {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        let name = find("Name").context("CSV missing 'Name' column")?;

        let mut rois: BTreeMap<u32, (Option<usize>, Option<usize>)> = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some((k, is_low)) = parse_roi_header(header) {
                let slot = rois.entry(k).or_default();
                if is_low {
                    slot.0 = Some(idx);
                } else {
                    slot.1 = Some(idx);
                }
            }
        }
        for (k, (lo, hi)) in &rois {
            if lo.is_none() || hi.is_none() {
                bail!("CSV has only one bound for ROI{k}");
            }
        }

        Ok(Self {
            name,
            water: find("Water, wt%").or_else(|| find("Water")),
            feo: find("FeO"),
            spline: find("Spline coeff"),
            reference: find("Ref"),
            water_reference: find("Water Ref"),
            rois,
        })
    }
}

/// `"ROI3 lb"` → `(3, true)`, `"ROI3 hb"` → `(3, false)`.
fn parse_roi_header(header: &str) -> Option<(u32, bool)> {
    let h = header.trim();
    let rest = h.strip_prefix("ROI").or_else(|| h.strip_prefix("roi"))?;
    let (num, bound) = rest.split_once(' ')?;
    let k = num.parse().ok()?;
    match bound.trim().to_ascii_lowercase().as_str() {
        "lb" => Some((k, true)),
        "hb" => Some((k, false)),
        _ => None,
    }
}

fn optional_float(record: &csv::StringRecord, col: Option<usize>, row: usize, what: &str) -> Result<Option<f64>> {
    let Some(col) = col else {
        return Ok(None);
    };
    let cell = record.get(col).unwrap_or("").trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .with_context(|| format!("Row {row}, {what}: '{cell}' is not a number"))
}

fn optional_text(record: &csv::StringRecord, col: Option<usize>) -> Option<String> {
    let cell = record.get(col?)?.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

fn load_sample_csv(path: &Path) -> Result<Vec<SampleRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let layout = CsvLayout::from_headers(&headers)?;

    let mut samples = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let name = record.get(layout.name).unwrap_or("").trim().to_string();
        if name.is_empty() {
            bail!("CSV row {row_no}: empty sample name");
        }

        let mut rois = Vec::new();
        for (k, (lo, hi)) in &layout.rois {
            let start = optional_float(&record, *lo, row_no, &format!("ROI{k} lb"))?;
            let end = optional_float(&record, *hi, row_no, &format!("ROI{k} hb"))?;
            match (start, end) {
                (Some(start), Some(end)) => rois.push(Roi::new(start, end)),
                (None, None) => {}
                _ => bail!("CSV row {row_no}: ROI{k} has only one bound"),
            }
        }

        samples.push(SampleRecord {
            name,
            water: optional_float(&record, layout.water, row_no, "water")?,
            feo: optional_float(&record, layout.feo, row_no, "FeO")?,
            rois,
            spline_smoothing: optional_float(&record, layout.spline, row_no, "spline coeff")?,
            reference: optional_text(&record, layout.reference),
            water_reference: optional_float(&record, layout.water_reference, row_no, "water ref")?,
        });
    }

    Ok(samples)
}

// ---------------------------------------------------------------------------
// Spectrum text files
// ---------------------------------------------------------------------------

/// Load a two-column `(shift, intensity)` text file.
///
/// Extra columns are ignored; lines starting with `#` are comments.
pub fn load_spectrum(path: &Path, delimiter: Delimiter, skip_header: bool) -> Result<Spectrum> {
    let rows = match delimiter {
        Delimiter::Tab => read_delimited(path, b'\t', skip_header),
        Delimiter::Comma => read_delimited(path, b',', skip_header),
        Delimiter::Whitespace => read_whitespace(path, skip_header),
    }
    .with_context(|| format!("loading spectrum {}", path.display()))?;
    if rows.is_empty() {
        bail!("{} contains no data rows", path.display());
    }
    let (x, y): (Vec<f64>, Vec<f64>) = rows.into_iter().unzip();
    Ok(Spectrum { x, y })
}

fn parse_pair<'a>(mut fields: impl Iterator<Item = &'a str>, line: usize) -> Result<(f64, f64)> {
    let mut next = |what: &str| -> Result<f64> {
        let tok = fields
            .find(|f| !f.trim().is_empty())
            .with_context(|| format!("line {line}: missing {what} column"))?;
        tok.trim()
            .parse::<f64>()
            .with_context(|| format!("line {line}: '{tok}' is not a number"))
    };
    let x = next("position")?;
    let y = next("intensity")?;
    Ok((x, y))
}

fn read_delimited(path: &Path, delimiter: u8, skip_header: bool) -> Result<Vec<(f64, f64)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(skip_header)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("{} row {i}", path.display()))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = record.position().map_or(i, |p| p.line() as usize);
        rows.push(parse_pair(record.iter(), line)?);
    }
    Ok(rows)
}

fn read_whitespace(path: &Path, skip_header: bool) -> Result<Vec<(f64, f64)>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate().skip(usize::from(skip_header)) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        rows.push(parse_pair(line.split_whitespace(), i + 1)?);
    }
    Ok(rows)
}
