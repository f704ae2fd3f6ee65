//! CSV persistence for `Record`s: a buffered writer that promotes its temp file
//! into place on finish, and a strict loader that checks the header.

use crate::error::RcError;
use crate::record::{Record, CSV_HEADER};
use crate::util::{replace_file_atomic, tmp_path_for};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Writes records to `<dest>.tmp`; `finish` flushes and renames it to `dest`.
/// Dropping the writer without a successful `finish` removes the temp file and
/// leaves `dest` untouched.
pub struct CsvRecordWriter {
    tmp: PathBuf,
    dest: PathBuf,
    w: Option<csv::Writer<BufWriter<File>>>, // None once finished
    written: u64,
}

impl CsvRecordWriter {
    pub fn create(dest: &Path) -> Result<Self> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
        }
        let tmp = tmp_path_for(dest);
        let f = File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::with_capacity(256 * 1024, f));
        // Written explicitly so an empty file still carries the header.
        w.write_record(CSV_HEADER)?;
        Ok(Self { tmp, dest: dest.to_path_buf(), w: Some(w), written: 0 })
    }

    pub fn write(&mut self, rec: &Record) -> Result<()> {
        let w = self.w.as_mut().context("writer already finished")?;
        w.serialize(rec).with_context(|| format!("write {}", self.tmp.display()))?;
        self.written += 1;
        Ok(())
    }

    /// Flush and move into place. Returns the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        let mut w = self.w.take().context("writer already finished")?;
        w.flush().with_context(|| format!("flush {}", self.tmp.display()))?;
        drop(w);
        replace_file_atomic(&self.tmp, &self.dest)?;
        Ok(self.written)
    }

    pub fn temp_path(&self) -> &Path {
        &self.tmp
    }
}

impl Drop for CsvRecordWriter {
    fn drop(&mut self) {
        // After a successful rename the temp path is gone; otherwise discard it.
        drop(self.w.take());
        if self.tmp.exists() {
            if let Err(e) = fs::remove_file(&self.tmp) {
                tracing::warn!("could not remove {}: {}", self.tmp.display(), e);
            }
        }
    }
}

/// Write all `records` to `dest` (header first). Returns the count written.
pub fn write_records<'a, I>(dest: &Path, records: I) -> Result<u64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut w = CsvRecordWriter::create(dest)?;
    for rec in records {
        w.write(rec)?;
    }
    w.finish()
}

/// Stream records as CSV (header included) into any writer, e.g. stdout.
pub fn write_records_to<'a, W, I>(out: W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    w.write_record(CSV_HEADER)?;
    for rec in records {
        w.serialize(rec)?;
    }
    w.flush()?;
    Ok(())
}

/// Load every record from a CSV file, in file order.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_records_from(BufReader::new(f), &path.display().to_string())
}

/// Load from any reader; `label` names the source in errors.
pub fn read_records_from<R: Read>(input: R, label: &str) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(input);

    let malformed = |reason: String| RcError::MalformedFile { path: label.to_string(), reason };

    let headers = rdr.headers().map_err(|e| malformed(format!("cannot read header: {}", e)))?;
    if headers.is_empty() || headers.iter().ne(CSV_HEADER.iter().copied()) {
        let got: Vec<&str> = headers.iter().collect();
        return Err(malformed(format!(
            "expected header {:?}, found {:?}",
            CSV_HEADER.join(","),
            got.join(",")
        ))
        .into());
    }

    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<Record>().enumerate() {
        // +2: one-based, after the header line
        let rec = row.map_err(|e| malformed(format!("row {}: {}", i + 2, e)))?;
        out.push(rec);
    }
    Ok(out)
}
