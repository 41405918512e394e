use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;

use crate::tag::{TagElement, TagStore, TagValue};

/// Which element of a series to pick as its representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPosition {
    First,
    Middle,
    Last,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

/// Resets the decoding state attached to a media element.
pub trait MediaReader: Send + Sync {
    fn reset(&self);
}

/// A single item of a series, as handed over by an importer.
pub trait MediaElement: Send + Sync {
    /// Releases the resources held by this element. Called once by the owning series.
    fn dispose(&self) -> Result<()>;

    fn tag_value(&self, tag: &TagElement) -> Option<TagValue>;

    /// Pixel dimensions, for image-typed elements only.
    fn image_size(&self) -> Option<ImageSize> {
        None
    }

    fn media_reader(&self) -> Option<&dyn MediaReader> {
        None
    }
}

/// In-memory image element with a fixed size and tag set.
pub struct ImageElement {
    pub width: usize,
    pub height: usize,
    tags: TagStore,
    reader: Option<Arc<dyn MediaReader>>,
    dispose_count: AtomicUsize,
}

impl ImageElement {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tags: TagStore::new(),
            reader: None,
            dispose_count: AtomicUsize::new(0),
        }
    }

    pub fn with_tag(mut self, tag: TagElement, value: impl Into<TagValue>) -> Self {
        self.tags.set(tag, Some(value.into()));
        self
    }

    pub fn with_reader(mut self, reader: Arc<dyn MediaReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn dispose_count(&self) -> usize {
        self.dispose_count.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ImageElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageElement")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tags", &self.tags)
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

impl MediaElement for ImageElement {
    fn dispose(&self) -> Result<()> {
        self.dispose_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn tag_value(&self, tag: &TagElement) -> Option<TagValue> {
        self.tags.get(tag).cloned()
    }

    fn image_size(&self) -> Option<ImageSize> {
        Some(ImageSize {
            width: self.width,
            height: self.height,
        })
    }

    fn media_reader(&self) -> Option<&dyn MediaReader> {
        self.reader.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_element_reports_size_and_tags() {
        let instance_number = TagElement::new("InstanceNumber");
        let image = ImageElement::new(512, 256).with_tag(instance_number.clone(), 4);

        assert_eq!(
            image.image_size(),
            Some(ImageSize {
                width: 512,
                height: 256
            })
        );
        assert_eq!(image.tag_value(&instance_number), Some(TagValue::Int(4)));
        assert!(image.media_reader().is_none());
    }

    #[test]
    fn image_element_counts_dispose_calls() {
        let image = ImageElement::new(1, 1);
        image.dispose().expect("dispose should succeed");
        image.dispose().expect("dispose should succeed");
        assert_eq!(image.dispose_count(), 2);
    }
}
