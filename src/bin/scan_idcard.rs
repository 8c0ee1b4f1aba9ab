//! Command-line interface for scan_idcard
//!
//! Usage:
//!   scan-idcard --front front.jpg --back back.jpg
//!   scan-idcard --front front.jpg --back back.jpg --debug-dir debug/
//!   scan-idcard --front f.png --back b.png --config config.json -o result.json

use clap::Parser;
use scan_idcard::detection::QrCodeScanner;
use scan_idcard::geometry::ImageprocGeometry;
use scan_idcard::ocr::TesseractCli;
use scan_idcard::{CardScanner, PageProcessor, PipelineConfig, ScanError, ScanReport};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scan-idcard")]
#[command(version, long_about = None)]
#[command(about = "Read demographic fields from the front and back of an ID card")]
struct Args {
    /// Front face image (demographic text)
    #[arg(long)]
    front: PathBuf,

    /// Back face image (QR code and address)
    #[arg(long)]
    back: PathBuf,

    /// Pipeline configuration JSON (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write intermediate images and the combined output.png into this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Tesseract executable
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// OCR language(s), e.g. "eng" or "eng+hin"
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(report) => {
            if let Err(e) = write_report(&report, &args) {
                eprintln!("Error writing result: {}", e);
                process::exit(1);
            }
            print_summary(&report);
        }
        Err(error) => {
            eprintln!("Scan failed: {}", error);
            eprintln!("{}", error.user_message());
            let code = match error {
                ScanError::ImageDecode { .. } => 2,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "scan_idcard=debug" } else { "scan_idcard=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> scan_idcard::Result<ScanReport> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let recognizer = TesseractCli::new()
        .with_executable(&args.tesseract)
        .with_language(&args.lang);
    let processor =
        PageProcessor::with_backends(config, ImageprocGeometry, QrCodeScanner, recognizer);

    CardScanner::new(processor).scan_files(&args.front, &args.back, args.debug_dir.as_deref())
}

fn write_report(report: &ScanReport, args: &Args) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match &args.output {
        Some(path) => std::fs::write(path, json),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn print_summary(report: &ScanReport) {
    let record = &report.extracted;
    eprintln!();
    eprintln!("ID Card Summary:");
    eprintln!("  Name:    {}", record.name);
    eprintln!("  DOB:     {}", record.dob);
    eprintln!("  Gender:  {}", record.gender);
    eprintln!("  Number:  {}", record.aadhaar);
    eprintln!("  Address: {}", record.address.replace('\n', " "));

    for (face, page) in [("front", &report.front), ("back", &report.back)] {
        if !page.quadrilateral_found {
            eprintln!("  Warning: {} card outline not found ({})", face, page.miss_reason);
        }
    }
    if !report.back.code_detected {
        eprintln!("  Warning: no QR code on the back page; address was not read");
    }
}
