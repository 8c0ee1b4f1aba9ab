//! # Scan ID Card
//!
//! A Rust crate for reading demographic fields from photographed ID cards.
//!
//! This library provides field extraction by:
//! - Detecting the card outline and rectifying its perspective
//! - Checking the rectified card for a QR code to tell back from front
//! - Mapping percentage-based regions onto the card
//! - Reading the regions that matter for that face through OCR
//! - Merging front and back into one demographic record
//!
//! ## Example
//!
//! ```rust,no_run
//! use scan_idcard::{CardScanner, PageProcessor, PipelineConfig};
//! use std::path::Path;
//!
//! let scanner = CardScanner::new(PageProcessor::new(PipelineConfig::default()));
//! let report = scanner.scan_files(Path::new("front.jpg"), Path::new("back.jpg"), None)?;
//! println!("Name: {}, Address: {}", report.extracted.name, report.extracted.address);
//! # Ok::<(), scan_idcard::ScanError>(())
//! ```

pub mod error;
pub mod constants;
pub mod config;
pub mod geometry;
pub mod detection;
pub mod normalize;
pub mod roi;
pub mod ocr;
pub mod extract;
pub mod pipeline;
pub mod aggregate;
pub mod scanner;
pub mod debug;
pub mod image_loader;

pub use aggregate::{aggregate, DemographicRecord};
pub use config::PipelineConfig;
pub use error::{Result, ScanError};
pub use pipeline::{PageProcessor, PageResult};
pub use scanner::{CardScanner, ScanReport};
