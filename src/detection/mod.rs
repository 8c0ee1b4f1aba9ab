//! Card and code detection module
//!
//! Locates the card outline in a raw photograph and checks the rectified card
//! for a machine-readable code.

pub mod card;
pub mod code;

pub use card::{CardCandidate, CardLocalizer, LocalizationMiss};
pub use code::{CodeDetection, CodeScanner, QrCodeScanner};
