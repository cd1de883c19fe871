//! Pressure cycle analysis: trigger segmentation, phase alignment and
//! compression/decompression reconstruction, shared by the desktop window
//! and the command line renderer.
pub mod analysis;
pub mod types;
