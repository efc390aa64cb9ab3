//! Machine-readable export of a full analysis run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    AnalysisConfig, AnalysisResults, ImputationReport, IngestReport, LOSS_INDICATOR_CAVEAT,
};

/// File name of the JSON export inside the output directory
pub const EXPORT_FILE_NAME: &str = "analysis_results.json";

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub claimlens_version: String,
    pub input_file: String,
    /// Effective configuration after file and flag overrides
    pub config: AnalysisConfig,
    pub loss_indicator_caveat: &'static str,
}

/// Complete export with metadata
#[derive(Serialize)]
pub struct AnalysisExport<'a> {
    pub metadata: ExportMetadata,
    pub ingest: &'a IngestReport,
    pub imputation: &'a ImputationReport,
    pub results: &'a AnalysisResults,
}

/// Parameters for the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub config: &'a AnalysisConfig,
}

/// Export the run to a JSON file
pub fn export_analysis(
    results: &AnalysisResults,
    ingest: &IngestReport,
    imputation: &ImputationReport,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = AnalysisExport {
        metadata: ExportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            claimlens_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            config: params.config.clone(),
            loss_indicator_caveat: LOSS_INDICATOR_CAVEAT,
        },
        ingest,
        imputation,
        results,
    };

    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize analysis to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis export to {}", output_path.display()))?;

    Ok(())
}

/// Package report files into a zip archive.
///
/// Entries are stored with their path relative to `root`; the original files
/// are left in place.
pub fn package_reports(root: &Path, files: &[std::path::PathBuf], zip_path: &Path) -> Result<()> {
    use std::io::{Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in files {
        let name = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to zip", name))?;
        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
    }

    zip.finish().context("Failed to finalize zip file")?;
    log::info!("bundled {} file(s) into {}", files.len(), zip_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_reports_uses_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("main_reports");
        std::fs::create_dir_all(&sub).unwrap();
        let file = sub.join("a.txt");
        std::fs::write(&file, "hello").unwrap();

        let zip_path = dir.path().join("bundle.zip");
        package_reports(dir.path(), &[file.clone()], &zip_path).unwrap();

        let archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec!["main_reports/a.txt"]);
        assert!(file.exists());
    }
}
