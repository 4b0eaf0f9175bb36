use anyhow::{anyhow, Context, Result};
use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::schema::Category;
use crate::validate::Validated;

/// Receives each validated table.
pub trait Handoff: Send + Sync {
    fn deliver(&self, category: Category, file: &Path, validated: &Validated) -> Result<()>;
}

/// Prints the first rows of every table.
pub struct Preview {
    rows: usize,
}

impl Preview {
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }
}

impl Handoff for Preview {
    fn deliver(&self, category: Category, file: &Path, validated: &Validated) -> Result<()> {
        let batch = &validated.batch;
        let head = batch.slice(0, self.rows.min(batch.num_rows()));
        let table = pretty_format_batches(&[head]).context("formatting preview")?;
        println!("── {} / {}\n{}", category, file.display(), table);
        Ok(())
    }
}

/// Writes every table to `<dir>/<category>/<file name>`.
pub struct ParquetOutput {
    dir: PathBuf,
}

impl ParquetOutput {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Handoff for ParquetOutput {
    fn deliver(&self, category: Category, file: &Path, validated: &Validated) -> Result<()> {
        let name = file
            .file_name()
            .ok_or_else(|| anyhow!("{:?} has no file name", file))?;
        let out_dir = self.dir.join(category.name());
        fs::create_dir_all(&out_dir).context("creating output directory")?;
        write_parquet(&out_dir.join(name), &validated.batch)
    }
}

/// Write via a `.tmp` sibling and rename into place. A failed write leaves
/// neither file behind.
pub fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = write_snappy(&tmp_path, batch) {
        if let Err(rm) = fs::remove_file(&tmp_path) {
            if rm.kind() != ErrorKind::NotFound {
                warn!("could not remove {}: {}", tmp_path.display(), rm);
            }
        }
        return Err(e);
    }

    fs::rename(&tmp_path, path).context("renaming Parquet file")?;
    debug!(rows = batch.num_rows(), "wrote {}", path.display());
    Ok(())
}

fn write_snappy(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path).context("creating temporary Parquet file")?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("initializing Parquet writer")?;
    writer.write(batch).context("writing batch to Parquet")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::read_table;
    use arrow::{
        array::{ArrayRef, Int64Array, IntervalMonthDayNanoArray},
        datatypes::{DataType, Field, IntervalMonthDayNano, Schema},
    };
    use std::sync::Arc;
    use tempfile::tempdir;

    fn validated(rows: i64) -> Validated {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "vendorid",
            DataType::Int64,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Int64Array::from((0..rows).collect::<Vec<_>>()))],
        )
        .unwrap();
        Validated {
            batch,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn parquet_output_lands_under_category() -> Result<()> {
        let tmp = tempdir()?;
        let out = ParquetOutput::new(tmp.path());

        out.deliver(
            Category::Green,
            Path::new("in/green_tripdata_2023-01.parquet"),
            &validated(4),
        )?;

        let written = tmp.path().join("green").join("green_tripdata_2023-01.parquet");
        assert!(written.exists());
        assert!(!tmp
            .path()
            .join("green")
            .join("green_tripdata_2023-01.parquet.tmp")
            .exists());
        assert_eq!(read_table(&written)?.num_rows(), 4);
        Ok(())
    }

    #[test]
    fn failed_write_cleans_up() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("interval.parquet");
        // month-day-nano intervals cannot be written to Parquet
        let spans = IntervalMonthDayNanoArray::from(vec![IntervalMonthDayNano::new(1, 2, 3)]);
        let batch = RecordBatch::try_from_iter([("span", Arc::new(spans) as ArrayRef)])?;

        assert!(write_parquet(&path, &batch).is_err());
        assert!(!path.exists());
        assert!(!tmp.path().join("interval.parquet.tmp").exists());
        Ok(())
    }

    #[test]
    fn preview_handles_short_tables() -> Result<()> {
        let preview = Preview::new(5);
        preview.deliver(Category::Yellow, Path::new("y.parquet"), &validated(2))?;
        preview.deliver(Category::Yellow, Path::new("y.parquet"), &validated(0))?;
        Ok(())
    }
}
