use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use super::model::SampleRecord;
use crate::water::Reduction;

/// Per-sample summary written by every export format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub name: String,
    pub water: Option<f64>,
    pub water_predicted: Option<f64>,
    pub rw: f64,
    pub rs: f64,
    pub rws: f64,
}

/// Join sample metadata, reduction and predictions row by row.
pub fn result_rows(samples: &[SampleRecord], reduction: &Reduction, predicted: Option<&[f64]>) -> Result<Vec<ResultRow>> {
    if samples.len() != reduction.len() {
        bail!("{} samples but {} reduced spectra", samples.len(), reduction.len());
    }
    if let Some(p) = predicted {
        if p.len() != samples.len() {
            bail!("{} samples but {} predictions", samples.len(), p.len());
        }
    }
    Ok(samples
        .iter()
        .zip(&reduction.spectra)
        .enumerate()
        .map(|(i, (s, r))| ResultRow {
            name: reduction.names[i].clone(),
            water: s.water,
            water_predicted: predicted.map(|p| p[i]),
            rw: r.rw,
            rs: r.rs,
            rws: r.rws,
        })
        .collect())
}

/// Write results to `path`; the extension picks the format.
///
/// * `.parquet` – summary columns plus list columns `x`, `y`, `corrected`, `baseline`
/// * `.json` – summary rows and the reduced spectra
/// * `.csv` – summary rows only
pub fn export_results(
    path: &Path,
    samples: &[SampleRecord],
    reduction: &Reduction,
    predicted: Option<&[f64]>,
) -> Result<()> {
    let rows = result_rows(samples, reduction, predicted)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(path, &rows, reduction),
        "json" => write_json(path, &rows, reduction),
        "csv" => write_csv(path, &rows),
        other => bail!("Unsupported export format: .{other}"),
    }
    .with_context(|| format!("exporting results to {}", path.display()))?;

    log::info!("exported {} results to {}", rows.len(), path.display());
    Ok(())
}

fn write_csv(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    x: &'a [f64],
    results: Vec<JsonSample<'a>>,
}

#[derive(Serialize)]
struct JsonSample<'a> {
    #[serde(flatten)]
    summary: &'a ResultRow,
    y: &'a [f64],
    corrected: &'a [f64],
    baseline: &'a [f64],
}

fn write_json(path: &Path, rows: &[ResultRow], reduction: &Reduction) -> Result<()> {
    let export = JsonExport {
        x: &reduction.x,
        results: rows
            .iter()
            .zip(&reduction.spectra)
            .map(|(summary, r)| JsonSample {
                summary,
                y: &r.y,
                corrected: &r.corrected,
                baseline: &r.baseline,
            })
            .collect(),
    };
    let file = File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(BufWriter::new(file), &export).context("writing JSON")?;
    Ok(())
}

fn list_column<'a>(rows: impl Iterator<Item = &'a [f64]>) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        builder.values().append_slice(row);
        builder.append(true);
    }
    Arc::new(builder.finish())
}

fn list_field(name: &str) -> Field {
    Field::new(name, DataType::List(Arc::new(Field::new("item", DataType::Float64, true))), false)
}

fn write_parquet(path: &Path, rows: &[ResultRow], reduction: &Reduction) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("water", DataType::Float64, true),
        Field::new("water_predicted", DataType::Float64, true),
        Field::new("rw", DataType::Float64, false),
        Field::new("rs", DataType::Float64, false),
        Field::new("rws", DataType::Float64, false),
        list_field("x"),
        list_field("y"),
        list_field("corrected"),
        list_field("baseline"),
    ]));

    let spectra = &reduction.spectra;
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.water).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.water_predicted).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rw).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rs).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.rws).collect::<Vec<_>>())),
        list_column(spectra.iter().map(|_| reduction.x.as_slice())),
        list_column(spectra.iter().map(|s| s.y.as_slice())),
        list_column(spectra.iter().map(|s| s.corrected.as_slice())),
        list_column(spectra.iter().map(|s| s.baseline.as_slice())),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::ReducedSpectrum;
    use arrow::array::{Array, ListArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn fixture() -> (Vec<SampleRecord>, Reduction) {
        let samples = vec![
            SampleRecord {
                name: "a.txt".into(),
                water: Some(1.2),
                ..Default::default()
            },
            SampleRecord {
                name: "b.txt".into(),
                ..Default::default()
            },
        ];
        let spectrum = |k: f64| ReducedSpectrum {
            y: vec![k, 2.0 * k, k],
            corrected: vec![0.0, k, 0.0],
            baseline: vec![k, k, k],
            rw: k,
            rs: 2.0,
            rws: k / 2.0,
        };
        let reduction = Reduction {
            x: vec![100.0, 200.0, 300.0],
            names: vec!["a".into(), "b".into()],
            spectra: vec![spectrum(1.0), spectrum(3.0)],
            ..Default::default()
        };
        (samples, reduction)
    }

    fn temp_path(ext: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("raman_glass_export_{}.{ext}", std::process::id()))
    }

    #[test]
    fn parquet_keeps_summary_and_spectra() {
        let (samples, reduction) = fixture();
        let path = temp_path("parquet");
        export_results(&path, &samples, &reduction, Some(&[1.1, 2.9][..])).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file).unwrap().build().unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        std::fs::remove_file(&path).ok();

        let batch = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        let water = batch
            .column_by_name("water")
            .unwrap()
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(water.value(0), 1.2);
        assert!(water.is_null(1));
        let corrected = batch
            .column_by_name("corrected")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        let second = corrected.value(1);
        let second = second.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(second.values().to_vec(), vec![0.0, 3.0, 0.0]);
    }

    #[test]
    fn csv_has_one_row_per_sample() {
        let (samples, reduction) = fixture();
        let path = temp_path("csv");
        export_results(&path, &samples, &reduction, None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,water,water_predicted,rw,rs,rws");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("b,,,3.0,2.0,1.5"));
    }

    #[test]
    fn json_embeds_the_axis() {
        let (samples, reduction) = fixture();
        let path = temp_path("json");
        export_results(&path, &samples, &reduction, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(value["x"].as_array().unwrap().len(), 3);
        assert_eq!(value["results"][1]["name"], "b");
        assert_eq!(value["results"][0]["rws"], 0.5);
    }

    #[test]
    fn mismatched_predictions_are_rejected() {
        let (samples, reduction) = fixture();
        assert!(result_rows(&samples, &reduction, Some(&[1.0][..])).is_err());
        assert!(export_results(&temp_path("xlsx"), &samples, &reduction, None).is_err());
    }
}
