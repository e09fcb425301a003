use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
};
use tracing::{debug, info};

use super::entities::{PresenceData, PresenceRecord, UserId};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Interface for abstracting where presence data comes from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Returns a snapshot of all presence data. The snapshot is never mutated afterwards, so it
    /// can be freely shared between requests.
    async fn load(&self) -> Result<Arc<PresenceData>>;
}

/// Parses a single `user_id,date,start,end` row. Returns [None] for anything malformed.
pub fn parse_row(line: &str) -> Option<(UserId, NaiveDate, PresenceRecord)> {
    let mut columns = line.split(',').map(str::trim);
    let (Some(user_id), Some(date), Some(start), Some(end), None) = (
        columns.next(),
        columns.next(),
        columns.next(),
        columns.next(),
        columns.next(),
    ) else {
        return None;
    };

    let user_id = user_id.parse::<UserId>().ok().filter(|v| *v > 0)?;
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let start = NaiveTime::parse_from_str(start, TIME_FORMAT).ok()?;
    let end = NaiveTime::parse_from_str(end, TIME_FORMAT).ok()?;
    Some((user_id, date, PresenceRecord { start, end }))
}

fn insert_row(data: &mut PresenceData, line_number: usize, line: &str) {
    match parse_row(line) {
        // Later rows for the same day replace earlier ones
        Some((user_id, date, record)) => {
            data.entry(user_id).or_default().insert(date, record);
        }
        None => debug!("Skipping malformed row {line_number}: {line:?}"),
    }
}

/// Builds [PresenceData] out of CSV rows. Malformed rows (including a header) are skipped.
pub fn parse_presence<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> PresenceData {
    let mut data = PresenceData::new();
    for (index, line) in lines.into_iter().enumerate() {
        insert_row(&mut data, index + 1, line.as_ref());
    }
    data
}

async fn read_presence(path: &Path) -> Result<PresenceData> {
    debug!("Reading presence data from {path:?}");
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open presence data {path:?}"))?;
    file.lock_shared()?;

    // Split on raw bytes, a row with broken encoding is just another malformed row
    let mut reader = BufReader::new(file);
    let mut lines = (&mut reader).split(b'\n');
    let mut data = PresenceData::new();
    let mut line_number = 0;
    while let Some(line) = lines.next_segment().await? {
        line_number += 1;
        match std::str::from_utf8(&line) {
            Ok(line) => insert_row(&mut data, line_number, line),
            Err(e) => debug!("Skipping row {line_number} that is not valid utf-8: {e}"),
        }
    }

    reader.into_inner().unlock_async().await?;

    debug!("Read {} users from {path:?}", data.len());
    Ok(data)
}

/// Reads the CSV file from scratch on every [PresenceSource::load].
pub struct CsvPresenceSource {
    path: PathBuf,
}

impl CsvPresenceSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PresenceSource for CsvPresenceSource {
    async fn load(&self) -> Result<Arc<PresenceData>> {
        Ok(Arc::new(read_presence(&self.path).await?))
    }
}

struct CachedPresence {
    modified: SystemTime,
    data: Arc<PresenceData>,
}

/// Read-through cache over the CSV file. The file is parsed again only once its modification
/// time changes.
pub struct CachedPresenceSource {
    path: PathBuf,
    cached: Mutex<Option<CachedPresence>>,
}

impl CachedPresenceSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PresenceSource for CachedPresenceSource {
    async fn load(&self) -> Result<Arc<PresenceData>> {
        let modified = tokio::fs::metadata(&self.path)
            .await
            .with_context(|| format!("Failed to read metadata of {:?}", self.path))?
            .modified()?;

        let mut cached = self.cached.lock().await;
        match cached.as_ref() {
            Some(v) if v.modified == modified => Ok(v.data.clone()),
            _ => {
                info!("Presence data {:?} changed, reloading", self.path);
                let data = Arc::new(read_presence(&self.path).await?);
                *cached = Some(CachedPresence {
                    modified,
                    data: data.clone(),
                });
                Ok(data)
            }
        }
    }
}

/// Sample data shared by tests across the crate.
#[cfg(test)]
pub const TEST_DATA_CSV: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/runtime/data/test_data.csv");

#[cfg(test)]
pub fn test_data() -> PresenceData {
    parse_presence(
        std::fs::read_to_string(TEST_DATA_CSV)
            .expect("Sample data should be present")
            .lines(),
    )
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        io::Write,
        path::Path,
        sync::Arc,
        time::{Duration, SystemTime},
    };

    use anyhow::Result;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::PresenceRecord,
            presence_source::{
                parse_presence, parse_row, CachedPresenceSource, CsvPresenceSource,
                PresenceSource, TEST_DATA_CSV,
            },
        },
        utils::logging::TEST_LOGGING,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn write_csv(path: &Path, content: &str, modified: SystemTime) -> Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(content.as_bytes())?;
        file.set_modified(modified)?;
        Ok(())
    }

    #[test]
    fn test_parse_row_basic() {
        assert_eq!(
            parse_row("10,2013-09-10,09:39:05,17:59:52"),
            Some((
                10,
                date(2013, 9, 10),
                PresenceRecord {
                    start: time(9, 39, 5),
                    end: time(17, 59, 52),
                }
            ))
        );
        assert_eq!(
            parse_row(" 10 , 2013-09-10 , 09:39:05 , 17:59:52\r")
                .map(|v| v.0),
            Some(10)
        );
    }

    #[test]
    fn test_parse_row_malformed() {
        assert_eq!(parse_row("user_id,date,start,end"), None);
        assert_eq!(parse_row(""), None);
        assert_eq!(parse_row("10,2013-09-10,09:39:05"), None);
        assert_eq!(parse_row("10,2013-09-10,09:39:05,17:59:52,extra"), None);
        assert_eq!(parse_row("0,2013-09-10,09:39:05,17:59:52"), None);
        assert_eq!(parse_row("-3,2013-09-10,09:39:05,17:59:52"), None);
        assert_eq!(parse_row("10,2013-13-10,09:39:05,17:59:52"), None);
        assert_eq!(parse_row("10,2013-09-10,25:39:05,17:59:52"), None);
        assert_eq!(parse_row("10,2013-09-10,09:39:05,noon"), None);
    }

    #[test]
    fn test_parse_presence_skips_and_overwrites() {
        let data = parse_presence([
            "user_id,date,start,end",
            "10,2013-09-10,09:39:05,17:59:52",
            "garbage",
            "10,2013-09-10,10:00:00,18:00:00",
            "11,2013-09-11,08:00:00,16:00:00",
        ]);

        assert_eq!(data.keys().copied().collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(data[&10].len(), 1);
        assert_eq!(
            data[&10][&date(2013, 9, 10)],
            PresenceRecord {
                start: time(10, 0, 0),
                end: time(18, 0, 0),
            }
        );
    }

    #[tokio::test]
    async fn test_csv_source_sample_data() -> Result<()> {
        *TEST_LOGGING;
        let source = CsvPresenceSource::new(TEST_DATA_CSV.into());
        let data = source.load().await?;

        assert_eq!(data.keys().copied().collect::<Vec<_>>(), vec![10, 11]);
        let sample_date = date(2013, 9, 10);
        assert!(data[&10].contains_key(&sample_date));
        assert_eq!(data[&10][&sample_date].start, time(9, 39, 5));
        assert_eq!(
            data[&10].keys().copied().collect::<Vec<_>>(),
            vec![date(2013, 9, 10), date(2013, 9, 11), date(2013, 9, 12)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_source_reloads_every_time() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.csv");
        write_csv(&path, "10,2013-09-10,09:00:00,17:00:00\n", SystemTime::now())?;

        let source = CsvPresenceSource::new(path.clone());
        let first = source.load().await?;
        let second = source.load().await?;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_source_skips_invalid_utf8_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.csv");
        fs::write(
            &path,
            b"10,2013-09-10,09:39:05,17:59:52\n\xff\xfe,garbage\n11,2013-09-11,08:00:00,16:00:00\n",
        )?;

        let data = CsvPresenceSource::new(path).load().await?;
        assert_eq!(data.keys().copied().collect::<Vec<_>>(), vec![10, 11]);
        Ok(())
    }

    #[tokio::test]
    async fn test_csv_source_missing_file() {
        let dir = tempdir().unwrap();
        let source = CsvPresenceSource::new(dir.path().join("missing.csv"));
        assert!(source.load().await.is_err());
    }

    #[tokio::test]
    async fn test_cached_source_invalidation() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.csv");
        let first_modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        write_csv(&path, "10,2013-09-10,09:00:00,17:00:00\n", first_modified)?;

        let source = CachedPresenceSource::new(path.clone());
        let first = source.load().await?;
        assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec![10]);

        // Same modification time means the cached snapshot is returned
        write_csv(&path, "11,2013-09-10,09:00:00,17:00:00\n", first_modified)?;
        let second = source.load().await?;
        assert!(Arc::ptr_eq(&first, &second));

        write_csv(
            &path,
            "11,2013-09-10,09:00:00,17:00:00\n",
            first_modified + Duration::from_secs(10),
        )?;
        let third = source.load().await?;
        assert_eq!(third.keys().copied().collect::<Vec<_>>(), vec![11]);
        Ok(())
    }
}
