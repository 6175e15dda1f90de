use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::shared::track::{Track, TrackPoint};
use crate::storage::blob_records::DataFormatError;

#[derive(Serialize)]
struct TrackRecord<'a> {
    track: usize,
    points: &'a [TrackPoint],
}

/// Writes stitched tracks for downstream analysis, one JSON record per
/// line: `{"track": <index>, "points": [{"frame": ..., "blob": ...}, ...]}`.
pub struct TrackRecordWriter {
    path: PathBuf,
    out: BufWriter<File>,
    next_index: usize,
}

impl TrackRecordWriter {
    pub fn create(path: &Path) -> Result<Self, DataFormatError> {
        let file = File::create(path).map_err(|source| DataFormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            next_index: 0,
        })
    }

    pub fn write(&mut self, track: &Track) -> Result<(), DataFormatError> {
        let record = TrackRecord {
            track: self.next_index,
            points: &track.points,
        };
        let line = serde_json::to_string(&record).map_err(|source| DataFormatError::Encode {
            path: self.path.clone(),
            source,
        })?;
        self.next_index += 1;
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
