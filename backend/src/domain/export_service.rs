//! Export service domain logic for the church ledger.
//!
//! This module turns an assembled report document into a CSV file on disk:
//! rendering to text and writing to the destination are separate steps, and
//! a failed write never leaves a partial report behind the success flag.

use anyhow::Result;
use csv::WriterBuilder;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use shared::{ExportReportResponse, ReportDocument, ReportSection};

/// Fixed export file name, not derived from the reporting range
pub const EXPORT_FILE_NAME: &str = "donations_report.csv";

/// Width of the signature rule rendered above each caption
const SIGNATURE_RULE_WIDTH: usize = 30;

/// Export service that renders report documents and writes them out
#[derive(Clone)]
pub struct ExportService {
    // No internal state needed for now
}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Render the document as CSV text: title, period caption, then each
    /// section as a heading row, its column headers, its rows and its
    /// footer, followed by the side-by-side signature placeholders.
    pub fn render_csv(&self, document: &ReportDocument) -> Result<String> {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        writer.write_record([document.title.as_str()])?;
        if let Some(period) = &document.period {
            writer.write_record([period.as_str()])?;
        }

        for section in &document.sections {
            match section {
                ReportSection::Table(table) => {
                    writer.write_record([table.title.as_str()])?;
                    writer.write_record(&table.columns)?;
                    for row in &table.rows {
                        writer.write_record(row)?;
                    }
                    writer.write_record(&table.footer)?;
                }
                ReportSection::Summary(summary) => {
                    writer.write_record([summary.title.as_str()])?;
                    for row in &summary.rows {
                        writer.write_record([row.label.as_str(), row.value.as_str()])?;
                    }
                }
            }
        }

        if !document.signatures.is_empty() {
            let rules: Vec<String> = document
                .signatures
                .iter()
                .map(|_| "_".repeat(SIGNATURE_RULE_WIDTH))
                .collect();
            writer.write_record(&rules)?;

            let captions: Vec<&str> = document
                .signatures
                .iter()
                .map(|s| s.caption.as_str())
                .collect();
            writer.write_record(&captions)?;
        }

        writer.flush()?;
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to finish CSV output: {}", e))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Render the document and write it beneath the destination directory
    /// (the current directory when none is given), creating the directory
    /// if needed. IO problems are reported in the response rather than as
    /// an error, so the caller can show them to the user.
    pub fn export_to_path(
        &self,
        document: &ReportDocument,
        directory: Option<&str>,
    ) -> Result<ExportReportResponse> {
        let csv_content = self.render_csv(document)?;

        let export_dir = match directory {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir.trim()),
            _ => PathBuf::from("."),
        };
        let file_path = export_dir.join(EXPORT_FILE_NAME);

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(ExportReportResponse {
                success: false,
                message: format!("Failed to create export directory: {}", e),
                file_path: export_dir.to_string_lossy().to_string(),
            });
        }

        match fs::write(&file_path, &csv_content) {
            Ok(()) => {
                let file_path = file_path.to_string_lossy().to_string();
                info!("Exported report to {}", file_path);
                Ok(ExportReportResponse {
                    success: true,
                    message: format!("Report exported successfully to: {}", file_path),
                    file_path,
                })
            }
            Err(e) => {
                error!("Failed to write export file {:?}: {}", file_path, e);
                Ok(ExportReportResponse {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                })
            }
        }
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}
