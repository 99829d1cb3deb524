//! # DICOM-MPR library
//!
//! Multi-planar browsing of 3D scalar volumes built from a folder of
//! cross-sectional images.
//!
//! A folder is ingested either as a calibrated DICOM series (sorted by
//! InstanceNumber, then SliceLocation, and rescaled with
//! RescaleSlope/RescaleIntercept) or, when no DICOM files are present or
//! DICOM support is disabled, as a plain PNG/JPEG/TIFF/BMP stack ordered by
//! file name. Unreadable DICOM files are skipped. The resulting volume can be
//! sliced along the three medical axes:
//!  - Axial
//!  - Coronal
//!  - Sagittal
//!
//! Slices are tone-mapped to 8 bits with a window center/width followed by
//! brightness, contrast and gamma adjustments, and letterboxed into a fixed
//! canvas. Slice indices are always clamped, never rejected.
//!
//! # Examples
//!
//! ## Loading a folder and rendering the current views
//!
//! ```no_run
//! # use dicom_mpr::{PlaneAxis, ViewerSession, VolumeLoader};
//! let (volume, metadata) = VolumeLoader::default()
//!     .load_from_directory("dicom")
//!     .expect("should have loaded files from directory");
//! let mut session = ViewerSession::new();
//! session.load(volume, metadata);
//! session.set_plane(PlaneAxis::Sagittal);
//! session.set_plane_index(session.plane_extent() as i64 / 2);
//! let frame = session.render((512, 512)).expect("volume is loaded");
//! dicom_mpr::render::compose(&frame.secondary, (512, 512))
//!     .save("sagittal.png")
//!     .expect("should have written image");
//! ```

pub mod config;
pub mod enums;
pub mod geometry;
pub mod render;
pub mod session;
pub mod slice_parser;
pub mod volume;
pub mod volume_loader;
pub mod windowing;

pub use enums::PlaneAxis;
pub use geometry::{DisplayGeometry, IndicatorLine, cross_plane_indicator};
pub use session::{RenderedView, SessionFrame, ViewerSession};
pub use volume::Volume;
pub use volume_loader::{Metadata, VolumeLoader, VolumeLoaderError};
pub use windowing::{WindowSettings, tone_map};
