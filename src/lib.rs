//! Series model for the Perspecta viewer.
//!
//! A [`Series`] is an ordered, thread-safe collection of media elements
//! (DICOM instances, images) sharing one series identity. Importers fill it
//! from worker threads; the viewer reads representative elements, toggles
//! open/selected state and listens for change events, which are always
//! delivered on the UI executor.

pub mod config;
pub mod dicom;
pub mod error;
pub mod event;
pub mod executor;
pub mod loader;
pub mod media;
pub mod series;
pub mod tag;
pub mod thumbnail;
pub mod transfer;

pub use dicom::{DicomInstance, FrameCacheReader};
pub use error::SeriesError;
pub use event::{EventAction, ObservableEvent, PropertyChangeListener};
pub use executor::{UiExecutor, UiQueue};
pub use loader::SeriesImporter;
pub use media::{ImageElement, ImageSize, MediaElement, MediaPosition, MediaReader};
pub use series::Series;
pub use tag::{SeriesIdentity, TagElement, TagStore, TagValue};
pub use thumbnail::{TextureThumbnail, Thumbnail};
pub use transfer::{DataFlavor, Transferable};
