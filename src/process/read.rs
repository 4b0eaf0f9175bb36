use anyhow::{Context, Result};
use arrow::{compute::concat_batches, error::ArrowError, record_batch::RecordBatch};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Regular files in `dir` whose name ends with `extension`, sorted by name.
pub fn discover_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {:?}", dir))? {
        let path = entry?.path();
        if path.is_file()
            && path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or(false, |name| name.ends_with(extension))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load a whole Parquet file into a single batch.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading Parquet metadata of {:?}", path))?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building Parquet reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .with_context(|| format!("decoding {:?}", path))?;
    let batch = concat_batches(&schema, &batches).context("concatenating record batches")?;
    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "read {}",
        path.display()
    );
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{Int64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use parquet::arrow::ArrowWriter;
    use std::{io::Write, sync::Arc};
    use tempfile::tempdir;

    #[test]
    fn discovery_ignores_other_files_and_directories() -> Result<()> {
        let tmp = tempdir()?;
        fs::write(tmp.path().join("b.parquet"), b"")?;
        fs::write(tmp.path().join("a.parquet"), b"")?;
        fs::write(tmp.path().join("notes.txt"), b"")?;
        fs::write(tmp.path().join("c.parquet.bak"), b"")?;
        fs::create_dir(tmp.path().join("nested.parquet"))?;

        let files = discover_files(tmp.path(), ".parquet")?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.parquet", "b.parquet"]);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempdir().unwrap();
        assert!(discover_files(tmp.path().join("nope"), ".parquet").is_err());
    }

    #[test]
    fn reads_every_row_group() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("t.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("VendorID", DataType::Int64, true),
            Field::new("store_and_fwd_flag", DataType::Utf8, true),
        ]));

        let mut writer = ArrowWriter::try_new(File::create(&path)?, schema.clone(), None)?;
        for chunk in 0..3i64 {
            let batch = RecordBatch::try_new(
                schema.clone(),
                vec![
                    Arc::new(Int64Array::from(vec![chunk, chunk])),
                    Arc::new(StringArray::from(vec!["N", "Y"])),
                ],
            )?;
            writer.write(&batch)?;
            writer.flush()?;
        }
        writer.close()?;

        let batch = read_table(&path)?;
        assert_eq!(batch.num_rows(), 6);
        assert_eq!(batch.schema().field(0).name(), "VendorID");
        Ok(())
    }

    #[test]
    fn garbage_file_is_an_error() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("bad.parquet");
        File::create(&path)?.write_all(b"not parquet at all")?;
        assert!(read_table(&path).is_err());
        Ok(())
    }
}
