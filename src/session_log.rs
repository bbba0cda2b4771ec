use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::Result;

pub const DATE_FMT: &str = "%d/%m/%Y";
pub const TIME_FMT: &str = "%H:%M:%S";

// ============================================================================
// Records
// ============================================================================

/// One completed focus session, as stored in the log file. Durations are
/// seconds; the history views convert to minutes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SessionRecord {
    pub timestamp: NaiveDateTime,
    pub duration_secs: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub minutes: u64,
}

/// Zero-filled summary of a date range: every day in the range appears
/// exactly once, ascending. Days without sessions count as 0 toward the
/// average; an empty range has total and average 0.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RangeSummary {
    pub days: Vec<DayTotal>,
    pub total_minutes: u64,
    pub average_minutes: u64,
}

// ============================================================================
// Session Log
// ============================================================================

/// Append-only CSV log of completed focus sessions, one line per session:
/// `DD/MM/YYYY,HH:MM:SS,<duration_secs>`, no header.
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file on first write. Losing a session
    /// record is a correctness issue, so errors propagate to the caller.
    pub fn append(&self, timestamp: NaiveDateTime, duration_secs: u64) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([
            timestamp.format(DATE_FMT).to_string(),
            timestamp.format(TIME_FMT).to_string(),
            duration_secs.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Parse the whole log in write order. A log that does not exist yet
    /// reads as empty; a malformed line is an error, since the file is only
    /// ever machine-written.
    pub fn load_records(&self) -> Result<Vec<SessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let (Some(date), Some(time), Some(secs)) = (row.get(0), row.get(1), row.get(2))
            else {
                return Err(format!(
                    "log line {} has {} fields, expected 3",
                    row.position().map_or(0, |p| p.line()),
                    row.len()
                )
                .into());
            };
            let date = NaiveDate::parse_from_str(date, DATE_FMT)?;
            let time = chrono::NaiveTime::parse_from_str(time, TIME_FMT)?;
            let duration_secs = secs.parse::<u64>()?;
            records.push(SessionRecord {
                timestamp: date.and_time(time),
                duration_secs,
            });
        }
        Ok(records)
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Sum session seconds into one bucket per calendar day.
pub fn daily_totals(records: &[SessionRecord]) -> BTreeMap<NaiveDate, u64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.timestamp.date()).or_insert(0) += record.duration_secs;
    }
    totals
}

/// Summarize the inclusive date range with zero-fill: N days in, exactly N
/// buckets out, sorted ascending. `start > end` yields the empty summary.
pub fn aggregate(
    totals: &BTreeMap<NaiveDate, u64>,
    start: NaiveDate,
    end: NaiveDate,
) -> RangeSummary {
    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let minutes = totals.get(&date).copied().unwrap_or(0) / 60;
        days.push(DayTotal { date, minutes });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    let total_minutes = days.iter().map(|d| d.minutes).sum();
    let average_minutes = if days.is_empty() {
        0
    } else {
        (total_minutes as f64 / days.len() as f64).round() as u64
    };

    RangeSummary {
        days,
        total_minutes,
        average_minutes,
    }
}

/// "Total: 90 mins / 1 hr 30 mins" style label used by the history view.
pub fn format_minutes(label: &str, minutes: u64) -> String {
    let mut out = format!("{label}: {minutes} mins");
    if minutes > 60 {
        let hrs = minutes / 60;
        let mins = minutes % 60;
        out.push_str(" / ");
        out.push_str(&if hrs > 1 {
            format!("{hrs} hrs ")
        } else {
            format!("{hrs} hr ")
        });
        out.push_str(&format!("{mins} mins"));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("pomodoro_log.csv"));
        assert_eq!(log.load_records().unwrap(), Vec::new());
    }

    #[test]
    fn append_creates_file_and_round_trips() {
        let dir = tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("pomodoro_log.csv"));

        let ts = at(2026, 8, 29, 14, 30, 5);
        log.append(ts, 1500).unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw, "29/08/2026,14:30:05,1500\n");

        let records = log.load_records().unwrap();
        assert_eq!(
            records,
            vec![SessionRecord {
                timestamp: ts,
                duration_secs: 1500,
            }]
        );
    }

    #[test]
    fn records_keep_write_order() {
        let dir = tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.csv"));

        // Not monotonic; the log preserves write order regardless.
        log.append(at(2026, 8, 29, 10, 0, 0), 600).unwrap();
        log.append(at(2026, 8, 28, 9, 0, 0), 300).unwrap();
        log.append(at(2026, 8, 29, 15, 0, 0), 900).unwrap();

        let records = log.load_records().unwrap();
        let secs: Vec<u64> = records.iter().map(|r| r.duration_secs).collect();
        assert_eq!(secs, vec![600, 300, 900]);
    }

    #[test]
    fn same_day_sessions_share_one_bucket() {
        let records = vec![
            SessionRecord {
                timestamp: at(2026, 8, 29, 9, 0, 0),
                duration_secs: 10 * 60,
            },
            SessionRecord {
                timestamp: at(2026, 8, 29, 16, 0, 0),
                duration_secs: 15 * 60,
            },
        ];
        let totals = daily_totals(&records);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&date(2026, 8, 29)], 25 * 60);

        let summary = aggregate(&totals, date(2026, 8, 29), date(2026, 8, 29));
        assert_eq!(summary.days.len(), 1);
        assert_eq!(summary.days[0].minutes, 25);
        assert_eq!(summary.total_minutes, 25);
        assert_eq!(summary.average_minutes, 25);
    }

    #[test]
    fn aggregate_zero_fills_every_day_in_range() {
        let records = vec![SessionRecord {
            timestamp: at(2026, 8, 27, 12, 0, 0),
            duration_secs: 1500,
        }];
        let totals = daily_totals(&records);
        let summary = aggregate(&totals, date(2026, 8, 24), date(2026, 8, 30));

        assert_eq!(summary.days.len(), 7);
        for pair in summary.days.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert_eq!(summary.days[0].date, date(2026, 8, 24));
        assert_eq!(summary.days[6].date, date(2026, 8, 30));

        let minutes: Vec<u64> = summary.days.iter().map(|d| d.minutes).collect();
        assert_eq!(minutes, vec![0, 0, 0, 25, 0, 0, 0]);
        assert_eq!(summary.total_minutes, 25);
        // round(25 / 7)
        assert_eq!(summary.average_minutes, 4);
    }

    #[test]
    fn inverted_range_is_empty_with_zero_average() {
        let totals = BTreeMap::new();
        let summary = aggregate(&totals, date(2026, 8, 30), date(2026, 8, 24));
        assert!(summary.days.is_empty());
        assert_eq!(summary.total_minutes, 0);
        assert_eq!(summary.average_minutes, 0);
    }

    #[test]
    fn range_spans_a_month_boundary() {
        let records = vec![
            SessionRecord {
                timestamp: at(2026, 8, 31, 22, 0, 0),
                duration_secs: 1200,
            },
            SessionRecord {
                timestamp: at(2026, 9, 1, 8, 0, 0),
                duration_secs: 1800,
            },
        ];
        let totals = daily_totals(&records);
        let summary = aggregate(&totals, date(2026, 8, 31), date(2026, 9, 1));
        assert_eq!(summary.days.len(), 2);
        assert_eq!(summary.days[0].minutes, 20);
        assert_eq!(summary.days[1].minutes, 30);
        assert_eq!(summary.total_minutes, 50);
        assert_eq!(summary.average_minutes, 25);
    }

    #[test]
    fn appended_session_shows_up_in_aggregation() {
        let dir = tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.csv"));
        log.append(at(2026, 8, 29, 11, 25, 0), 1500).unwrap();

        let totals = daily_totals(&log.load_records().unwrap());
        let summary = aggregate(&totals, date(2026, 8, 23), date(2026, 8, 29));
        assert_eq!(summary.days.last().unwrap().minutes, 25);
        assert_eq!(summary.total_minutes, 25);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "not-a-date,14:00:00,1500\n").unwrap();
        assert!(SessionLog::new(&path).load_records().is_err());
    }

    #[test]
    fn truncated_line_is_an_error_not_a_panic() {
        // An interrupted append can leave a short final line.
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "29/08/2026,14:00:00\n").unwrap();

        let err = SessionLog::new(&path).load_records().unwrap_err();
        assert!(err.to_string().contains("expected 3"), "{err}");
    }

    #[test]
    fn truncated_line_after_valid_records_is_an_error() {
        let dir = tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.csv"));
        log.append(at(2026, 8, 29, 10, 0, 0), 600).unwrap();

        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .unwrap();
        writeln!(file, "29/08/2026,14:00:00").unwrap();

        assert!(log.load_records().is_err());
    }

    #[test]
    fn format_minutes_adds_hours_past_sixty() {
        assert_eq!(format_minutes("Total", 45), "Total: 45 mins");
        assert_eq!(format_minutes("Total", 60), "Total: 60 mins");
        assert_eq!(format_minutes("Total", 90), "Total: 90 mins / 1 hr 30 mins");
        assert_eq!(
            format_minutes("Average", 150),
            "Average: 150 mins / 2 hrs 30 mins"
        );
    }
}
