//! Batch-prepare JPEG folders for publishing.
//!
//! Every `.jpg`/`.jpeg` file directly inside an input directory is decoded,
//! optionally stripped of its metadata, tagged with a rights holder (EXIF
//! Artist), overlaid with a translucent centred text watermark, shrunk to fit
//! a bounding square and written under the same name to an output directory.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use image_prep::{default_output_dir, ProcessingOptions, Processor};
//!
//! let opts = ProcessingOptions {
//!     max_size: 1080,
//!     rights_holder: Some("Jane Doe".to_string()),
//!     ..ProcessingOptions::default()
//! };
//! let processor = Processor::new(opts).expect("failed to load watermark font");
//! let input = Path::new("photos");
//! let results = processor
//!     .process_directory(input, &default_output_dir(input))
//!     .expect("cannot access directories");
//! for r in &results {
//!     println!("{}: {}", r.path.display(), r.message);
//! }
//! ```
//!
//! # Single images
//!
//! The in-memory stages are available on their own through
//! [`Processor::prepare`]:
//!
//! ```no_run
//! use image_prep::{ImageAsset, ProcessingOptions, Processor};
//!
//! let processor = Processor::new(ProcessingOptions::default()).unwrap();
//! let asset = ImageAsset::load("photo.jpg".as_ref()).unwrap();
//! let (prepared, _) = processor.prepare(asset);
//! println!("{:?}", prepared.dimensions());
//! ```

#![deny(missing_docs)]

mod asset;
mod engine;
pub mod error;
pub mod metadata;
mod options;
pub mod resize;
pub mod watermark;

pub use asset::ImageAsset;
pub use engine::{
    default_output_dir, is_jpeg_file_name, save_image, BatchSummary, ProcessResult, Processor,
};
pub use error::{Error, Result};
pub use metadata::{Metadata, ARTIST_TAG_ID};
pub use options::{ProcessingOptions, DEFAULT_MAX_SIZE, DEFAULT_QUALITY};
pub use watermark::{WatermarkPlan, Watermarker};
