//! Main entry point for the checkpack CLI application.
//!
//! Exports a check-in roster as CSV or as a ZIP bundle, and lists or
//! tests the archives it produces.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use simple_logger::SimpleLogger;
use std::path::Path;
use std::sync::Arc;

use checkpack::cli::Command;
use checkpack::export::{bundle_entries, roster_to_csv};
use checkpack::{BundleOptions, Cli, LocalFileReader, ReadAt, Roster, ZipExtractor, build_archive};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and dispatches to the
/// handler for the chosen subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(cli.log_level())
        .init()
        .context("Failed to initialize logger")?;

    match &cli.command {
        Command::Csv { roster, output } => export_csv(roster, output, &cli).await,
        Command::Bundle {
            roster,
            output,
            csv_name,
            signature_dir,
        } => {
            let options = BundleOptions {
                csv_name: csv_name.clone(),
                signature_dir: signature_dir.clone(),
            };
            export_bundle(roster, output, &options, &cli).await
        }
        Command::List { archive, verbose } => {
            let reader = Arc::new(LocalFileReader::new(archive)?);
            list_files(&ZipExtractor::new(reader), *verbose).await
        }
        Command::Test { archive } => {
            let reader = Arc::new(LocalFileReader::new(archive)?);
            test_archive(&ZipExtractor::new(reader), archive, &cli).await
        }
    }
}

/// Write the plain CSV export of a roster.
///
/// The signature column carries each guest's raw data URL.
async fn export_csv(roster_path: &Path, output: &Path, cli: &Cli) -> Result<()> {
    let roster = Roster::load(roster_path)
        .await
        .with_context(|| format!("Cannot load roster {}", roster_path.display()))?;

    let csv = roster_to_csv(&roster)?;
    write_output(output, &csv, cli.never_overwrite).await?;

    info!(
        "wrote {} guests ({} checked in) to {}",
        roster.len(),
        roster.checked_in_count(),
        output.display()
    );
    Ok(())
}

/// Write the ZIP bundle of a roster.
///
/// # Arguments
///
/// * `roster_path` - Roster JSON file
/// * `output` - Destination archive
/// * `options` - Entry naming inside the archive
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` once the archive is written. Guests with undecodable
/// signatures are reported as warnings, not errors.
async fn export_bundle(
    roster_path: &Path,
    output: &Path,
    options: &BundleOptions,
    cli: &Cli,
) -> Result<()> {
    let roster = Roster::load(roster_path)
        .await
        .with_context(|| format!("Cannot load roster {}", roster_path.display()))?;

    let report = bundle_entries(&roster, options)?;
    let zip = build_archive(&report.entries)?;
    write_output(output, &zip, cli.never_overwrite).await?;

    if !report.skipped.is_empty() {
        warn!(
            "{} signature(s) could not be decoded and were left out",
            report.skipped.len()
        );
    }
    info!(
        "wrote {} guests and {} signatures to {} ({})",
        roster.len(),
        report.signature_count(),
        output.display(),
        format_size(zip.len() as u64)
    );
    Ok(())
}

/// Write `data` to `path`, refusing to replace an existing file when
/// `never_overwrite` is set.
async fn write_output(path: &Path, data: &[u8], never_overwrite: bool) -> Result<()> {
    if never_overwrite && tokio::fs::try_exists(path).await? {
        bail!("{} already exists", path.display());
    }
    tokio::fs::write(path, data)
        .await
        .with_context(|| format!("Cannot write {}", path.display()))
}

/// List files in the archive.
///
/// Supports two output formats:
/// - Simple format: just file names, one per line
/// - Verbose format (`-v`): table with size, CRC-32 and timestamp
async fn list_files<R: ReadAt + 'static>(extractor: &ZipExtractor<R>, verbose: bool) -> Result<()> {
    let entries = extractor.list_files().await?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.file_name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>6}  {:>10}  {:>5}  {:>8}  Name",
        "Length", "Method", "Date", "Time", "CRC-32"
    );
    println!("{}", "-".repeat(70));

    let mut total_size = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        let method = match entry.compression_method.as_u16() {
            0 => "Stored".to_string(),
            8 => "Defl".to_string(),
            other => format!("#{}", other),
        };

        println!(
            "{:>10}  {:>6}  {:04}-{:02}-{:02}  {:02}:{:02}  {:08x}  {}",
            entry.uncompressed_size,
            method,
            year,
            month,
            day,
            hour,
            minute,
            entry.crc32,
            entry.file_name
        );

        if !entry.is_directory {
            total_size += entry.uncompressed_size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!("{:>10}  {:>38}  {} files", total_size, "", file_count);

    Ok(())
}

/// Recompute every entry's CRC-32 and report the result like `unzip -t`.
///
/// Fails when any entry does not match its stored checksum.
async fn test_archive<R: ReadAt + 'static>(
    extractor: &ZipExtractor<R>,
    path: &Path,
    cli: &Cli,
) -> Result<()> {
    let checks = extractor.test_archive().await?;

    if !cli.is_quiet() {
        println!("Archive:  {}", path.display());
        for check in &checks {
            let status = if check.is_ok() { "OK" } else { "bad CRC" };
            println!("    testing: {:<40}  {}", check.file_name, status);
        }
    }

    let failed = checks.iter().filter(|c| !c.is_ok()).count();
    if failed > 0 {
        bail!(
            "{} of {} entries in {} failed the CRC check",
            failed,
            checks.len(),
            path.display()
        );
    }

    if !cli.is_quiet() {
        println!("No errors detected in {}", path.display());
    }
    Ok(())
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
