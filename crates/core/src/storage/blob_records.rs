use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::blob::FrameBlobs;

/// Errors raised while reading or writing persisted blob records.
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("blob record I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode blob record for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed blob record in {path} at byte offset {offset}: {source}")]
    Malformed {
        path: PathBuf,
        offset: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes per-frame blob records, one self-describing JSON record per line.
pub struct BlobRecordWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl BlobRecordWriter {
    pub fn create(path: &Path) -> Result<Self, DataFormatError> {
        let file = File::create(path).map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &FrameBlobs) -> Result<(), DataFormatError> {
        let line = serde_json::to_string(record).map_err(|source| DataFormatError::Encode {
            path: self.path.clone(),
            source,
        })?;
        self.out
            .write_all(line.as_bytes())
            .and_then(|()| self.out.write_all(b"\n"))
            .map_err(|source| DataFormatError::Io {
                path: self.path.clone(),
                source,
            })
    }

    pub fn finish(mut self) -> Result<(), DataFormatError> {
        self.out.flush().map_err(|source| DataFormatError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Reads a blob record file produced by [`BlobRecordWriter`] or any
/// conforming producer.
///
/// The file is treated as a concatenation of independently-parsable records
/// with no enclosing array or separators; records are consumed back-to-back,
/// whitespace (including the newlines this crate writes) permitting. A
/// malformed record aborts the whole read; there is no partial recovery.
pub fn read_blob_records(path: &Path) -> Result<Vec<FrameBlobs>, DataFormatError> {
    let file = File::open(path).map_err(|source| DataFormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<FrameBlobs>();

    let mut records = Vec::new();
    loop {
        let offset = stream.byte_offset();
        match stream.next() {
            Some(Ok(record)) => records.push(record),
            Some(Err(source)) => {
                return Err(DataFormatError::Malformed {
                    path: path.to_path_buf(),
                    offset,
                    source,
                })
            }
            None => break,
        }
    }
    Ok(records)
}
