use super::{BatchDraft, DraftError, PostDraft};
use crate::models::MediaItem;
use crate::util::parse_timestamp;

const COL_SCHEDULED_AT: &str = "scheduled_at";
const COL_CAPTION: &str = "caption";
const COL_MEDIA_URL: &str = "media_url";
const COL_SUBJECT: &str = "subject";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ImportError {
    #[error("Missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Draft(#[from] DraftError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Parsed tabular input: a header row and data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ImportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ImportTable {
    /// Parse comma-separated text.
    ///
    /// Rules:
    /// - Fields may be wrapped in `"..."`; `""` inside quotes is a literal quote.
    /// - Quoted fields may span lines.
    /// - `\r\n` and `\n` both end a record; blank records are dropped.
    pub fn parse_csv(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut records: Vec<Vec<String>> = Vec::new();
        let mut record: Vec<String> = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if in_quotes {
                match c {
                    '"' if chars.peek() == Some(&'"') => {
                        chars.next();
                        field.push('"');
                    }
                    '"' => in_quotes = false,
                    _ => field.push(c),
                }
                continue;
            }

            match c {
                '"' if field.is_empty() => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' | '\r' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
        if !field.is_empty() || !record.is_empty() {
            record.push(field);
            records.push(record);
        }

        records.retain(|r| r.iter().any(|f| !f.trim().is_empty()));

        let mut records = records.into_iter();
        let headers = records.next().unwrap_or_default();
        Self {
            headers,
            rows: records.collect(),
        }
    }

    /// Index of `name` among the headers, ignoring case and surrounding blanks.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

fn cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

impl BatchDraft {
    /// Merge rows from a spreadsheet-style table.
    ///
    /// Both `scheduled_at` and `caption` columns must exist or nothing is
    /// imported. Rows without a usable value in either are skipped and only
    /// counted.
    pub fn import_rows(&mut self, table: &ImportTable) -> Result<ImportReport, ImportError> {
        self.ensure_editable()?;

        let at_col = table
            .column(COL_SCHEDULED_AT)
            .ok_or(ImportError::MissingColumn(COL_SCHEDULED_AT))?;
        let caption_col = table
            .column(COL_CAPTION)
            .ok_or(ImportError::MissingColumn(COL_CAPTION))?;
        let media_col = table.column(COL_MEDIA_URL);
        let subject_col = table.column(COL_SUBJECT);

        let mut report = ImportReport::default();
        for row in &table.rows {
            let scheduled_at = cell(row, Some(at_col)).and_then(parse_timestamp);
            let caption = cell(row, Some(caption_col));

            let (Some(scheduled_at), Some(caption)) = (scheduled_at, caption) else {
                report.skipped += 1;
                continue;
            };

            self.drafts.push(PostDraft {
                scheduled_at,
                caption: caption.to_string(),
                subject: cell(row, subject_col).map(str::to_string),
                media: cell(row, media_col)
                    .map(MediaItem::from_url)
                    .into_iter()
                    .collect(),
            });
            report.imported += 1;
        }

        self.sort();
        tracing::info!(
            imported = report.imported,
            skipped = report.skipped,
            "batch rows imported"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::draft;
    use crate::models::MediaType;
    use crate::util::parse_timestamp;

    #[test]
    fn test_parse_csv_quotes_and_line_endings() {
        let t = ImportTable::parse_csv(
            "\u{feff}Scheduled_At,Caption,media_url\r\n\
             2026-01-30T09:00,\"Hello, world\",https://cdn/a.jpg\r\n\
             \r\n\
             2026-01-30T10:00,\"She said \"\"hi\"\"\nand left\",\n",
        );
        assert_eq!(t.headers, vec!["Scheduled_At", "Caption", "media_url"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][1], "Hello, world");
        assert_eq!(t.rows[1][1], "She said \"hi\"\nand left");
        assert_eq!(t.rows[1][2], "");
    }

    #[test]
    fn test_parse_csv_without_trailing_newline() {
        let t = ImportTable::parse_csv("caption,scheduled_at\nx,2026-01-30T09:00");
        assert_eq!(t.rows, vec![vec!["x".to_string(), "2026-01-30T09:00".to_string()]]);
    }

    #[test]
    fn test_missing_caption_column_aborts_everything() {
        let table = ImportTable::parse_csv(
            "scheduled_at,text\n2026-01-30T09:00,hello\n2026-01-30T10:00,world\n",
        );
        let mut b = BatchDraft::new();

        let err = b.import_rows(&table).expect_err("caption column is required");
        assert_eq!(err, ImportError::MissingColumn("caption"));
        assert!(b.is_empty());
    }

    #[test]
    fn test_missing_scheduled_at_column_aborts() {
        let table = ImportTable::parse_csv("caption\nhello\n");
        let mut b = BatchDraft::new();
        assert_eq!(
            b.import_rows(&table),
            Err(ImportError::MissingColumn("scheduled_at"))
        );
    }

    #[test]
    fn test_rows_missing_values_are_skipped_and_counted() {
        let table = ImportTable::parse_csv(
            "CAPTION,Scheduled_at,Media_URL,Subject\n\
             late,2026-01-30T15:00,https://cdn/v.mp4,Teaser\n\
             ,2026-01-30T11:00,,\n\
             no time,,,\n\
             bad time,someday,,\n\
             early,2026-01-30T09:00,,\n",
        );
        let mut b = BatchDraft::new();

        let report = b.import_rows(&table).expect("headers present");

        assert_eq!(report, ImportReport { imported: 2, skipped: 3 });
        let drafts = b.drafts();
        assert_eq!(drafts[0].caption, "early");
        assert!(drafts[0].media.is_empty());
        assert!(drafts[0].subject.is_none());
        assert_eq!(drafts[1].caption, "late");
        assert_eq!(drafts[1].subject.as_deref(), Some("Teaser"));
        assert_eq!(drafts[1].media.len(), 1);
        assert_eq!(drafts[1].media[0].media_type, MediaType::Video);
    }

    #[test]
    fn test_import_merges_with_existing_drafts_in_order() {
        let mut b = BatchDraft::new();
        let long_ago = parse_timestamp("2020-01-01T00:00:00Z").expect("valid");
        b.add_manual(draft("2026-01-30T12:00", "manual noon"), long_ago)
            .expect("ok");

        let table = ImportTable::parse_csv(
            "scheduled_at,caption\n2026-01-30T18:00,evening\n2026-01-30T08:00,morning\n",
        );
        b.import_rows(&table).expect("ok");

        let captions: Vec<&str> = b.drafts().iter().map(|d| d.caption.as_str()).collect();
        assert_eq!(captions, vec!["morning", "manual noon", "evening"]);
    }

    #[test]
    fn test_import_does_not_require_future_times() {
        let table = ImportTable::parse_csv("scheduled_at,caption\n2001-01-01T00:00,old\n");
        let mut b = BatchDraft::new();
        assert_eq!(b.import_rows(&table).map(|r| r.imported), Ok(1));
    }
}
