//! Export service domain logic.
//!
//! Renders any listed entity as CSV and writes exports to disk. Entity
//! services hand it already filtered and sorted rows; the UI only chooses
//! where the file goes.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::{error, info};
use shared::{CsvExport, ExportToPathResponse};
use std::fs;
use std::path::PathBuf;

use super::listing::TableRow;

/// Export service that handles all export-related business logic
#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Render rows as CSV: a header line, then one line per record.
    /// Fields holding a comma, quote or line break are quoted with embedded
    /// quotes doubled; every record ends in `\n`.
    pub fn to_csv<T: TableRow>(&self, entity: &str, rows: &[T], date: NaiveDate) -> Result<CsvExport> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(T::csv_headers())?;
        for row in rows {
            writer.write_record(row.csv_record())?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV export: {}", e))?;
        let csv_content = String::from_utf8(bytes)?;

        let filename = format!("{}_{}.csv", entity, date.format("%Y%m%d"));
        info!(
            "📄 EXPORT: Generated {} ({} rows, {} bytes)",
            filename,
            rows.len(),
            csv_content.len()
        );

        Ok(CsvExport {
            filename,
            csv_content,
            row_count: rows.len(),
        })
    }

    /// Write an export into `directory`, or the Documents folder when none is
    /// given. Failures are reported in the response, not as errors.
    pub fn export_to_path(&self, export: &CsvExport, directory: Option<&str>) -> ExportToPathResponse {
        let export_dir = match directory {
            Some(custom_path) if !custom_path.trim().is_empty() => PathBuf::from(sanitize_path(custom_path)),
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("❌ EXPORT: Could not determine default export directory");
                    return failure("Failed to determine export directory".to_string(), String::new());
                }
            },
        };

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("❌ EXPORT: Failed to create export directory {:?}: {}", export_dir, e);
            return failure(
                format!("Failed to create export directory: {}", e),
                export_dir.to_string_lossy().to_string(),
            );
        }

        let file_path = export_dir.join(&export.filename);
        let file_path_str = file_path.to_string_lossy().to_string();

        match fs::write(&file_path, &export.csv_content) {
            Ok(_) => {
                info!("✅ EXPORT: Wrote {} rows to: {}", export.row_count, file_path_str);
                ExportToPathResponse {
                    success: true,
                    message: format!("File exported successfully to: {}", file_path_str),
                    file_path: file_path_str,
                    row_count: export.row_count,
                }
            }
            Err(e) => {
                error!("❌ EXPORT: Failed to write export file to {:?}: {}", file_path, e);
                failure(format!("Failed to write export file: {}", e), file_path_str)
            }
        }
    }
}

fn failure(message: String, file_path: String) -> ExportToPathResponse {
    ExportToPathResponse {
        success: false,
        message,
        file_path,
        row_count: 0,
    }
}

/// Basic path sanitization to handle common user input issues
pub fn sanitize_path(path: &str) -> String {
    let mut cleaned = path.trim().to_string();

    // Surrounding quotes (single or double)
    if cleaned.len() >= 2
        && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
    {
        cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
    }

    cleaned = cleaned.replace("\\ ", " ");

    while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
        cleaned.pop();
    }

    if cleaned == "~" || cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
        if let Some(home) = dirs::home_dir() {
            cleaned = if cleaned == "~" {
                home.to_string_lossy().to_string()
            } else {
                home.join(&cleaned[2..]).to_string_lossy().to_string()
            };
        }
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::ReaderBuilder;
    use shared::Block;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn block(name: &str, notes: Option<&str>) -> Block {
        Block {
            block_id: 1,
            block_name: name.to_string(),
            property_id: 2,
            property_name: Some("Sunrise".to_string()),
            floor_count: Some(3),
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_csv_quotes_only_when_needed() {
        let rows = vec![block("Block A", Some("Gate code \"1234\", side entrance"))];
        let export = ExportService::new().to_csv("blocks", &rows, date()).unwrap();

        assert_eq!(export.filename, "blocks_20250307.csv");
        assert_eq!(export.row_count, 1);
        assert_eq!(
            export.csv_content,
            "Block ID,Block Name,Property ID,Property Name,Floor Count,Notes\n\
             1,Block A,2,Sunrise,3,\"Gate code \"\"1234\"\", side entrance\"\n"
        );
    }

    #[test]
    fn test_csv_quotes_line_breaks() {
        let rows = vec![block("Block A", Some("line one\nline two"))];
        let export = ExportService::new().to_csv("blocks", &rows, date()).unwrap();
        assert!(export.csv_content.ends_with(",\"line one\nline two\"\n"));
    }

    #[test]
    fn test_exported_csv_parses_back_to_the_same_fields() {
        let rows = vec![
            block("Block A, north wing", Some("Gate code \"1234\"")),
            block("Block B", Some("line one\nline two")),
            block("\"Annex\"", Some("windows line\r\nbreak, and more")),
            block("Block D", None),
        ];
        let export = ExportService::new().to_csv("blocks", &rows, date()).unwrap();

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(export.csv_content.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, Block::csv_headers());

        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect();
        let expected: Vec<Vec<String>> = rows.iter().map(TableRow::csv_record).collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let export = ExportService::new().to_csv::<Block>("blocks", &[], date()).unwrap();
        assert_eq!(export.csv_content, "Block ID,Block Name,Property ID,Property Name,Floor Count,Notes\n");
        assert_eq!(export.row_count, 0);
    }

    #[test]
    fn test_export_to_path_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let service = ExportService::new();
        let export = service.to_csv("blocks", &[block("Block A", None)], date()).unwrap();

        let target = format!("\"{}/exports/\"", temp_dir.path().display());
        let response = service.export_to_path(&export, Some(&target));

        assert!(response.success, "{}", response.message);
        assert_eq!(response.row_count, 1);
        let written = std::fs::read_to_string(temp_dir.path().join("exports").join("blocks_20250307.csv")).unwrap();
        assert_eq!(written, export.csv_content);
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("  '/tmp/My\\ Files/'  "), "/tmp/My Files");
        assert_eq!(sanitize_path("\"/var/data\""), "/var/data");
        assert_eq!(sanitize_path("/"), "/");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(sanitize_path("~/exports"), home.join("exports").to_string_lossy());
        }
    }
}
