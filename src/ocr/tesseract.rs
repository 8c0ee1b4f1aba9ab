//! Tesseract command-line backend

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{GrayImage, ImageFormat};
use tracing::{debug, instrument};

use super::{SegmentationMode, TextRecognizer};
use crate::constants::extraction::LANGUAGE;
use crate::{Result, ScanError};

/// Runs the `tesseract` executable once per region
///
/// The region is written to a temporary PNG that is removed when the call
/// returns.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    executable: PathBuf,
    language: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractCli {
    /// `tesseract` from `PATH` with English language data
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from("tesseract"),
            language: LANGUAGE.to_string(),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Command line for one image file
    fn command(&self, image_path: &Path, mode: SegmentationMode) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(mode.psm().to_string());
        cmd
    }
}

impl TextRecognizer for TesseractCli {
    #[instrument(skip(self, region), fields(width = region.width(), height = region.height()))]
    fn recognize(&self, region: &GrayImage, mode: SegmentationMode) -> Result<String> {
        let file = tempfile::Builder::new()
            .prefix("roi_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ScanError::Recognition {
                message: format!("failed to create temporary crop file: {}", e),
            })?;

        region
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| ScanError::Recognition {
                message: format!("failed to write crop: {}", e),
            })?;

        let output = self
            .command(file.path(), mode)
            .output()
            .map_err(|e| ScanError::Recognition {
                message: format!(
                    "failed to run {} (is it installed?): {}",
                    self.executable.display(),
                    e
                ),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::Recognition {
                message: format!("tesseract failed: {}", stderr.trim()),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(chars = text.len(), "tesseract finished");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let cli = TesseractCli::new().with_language("eng+hin");
        let cmd = cli.command(Path::new("/tmp/crop.png"), SegmentationMode::SingleBlock);
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(cmd.get_program(), "tesseract");
        assert_eq!(
            args,
            vec!["/tmp/crop.png", "stdout", "-l", "eng+hin", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_executable_is_recognition_error() {
        let cli = TesseractCli::new().with_executable("/nonexistent/tesseract-binary");
        let region = GrayImage::new(20, 20);

        let err = cli
            .recognize(&region, SegmentationMode::SingleBlock)
            .unwrap_err();
        assert!(matches!(err, ScanError::Recognition { .. }));
        assert!(err.is_recoverable());
    }
}
