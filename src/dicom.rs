use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use dicom_core::VR;
use dicom_object::InMemDicomObject;

use crate::media::{ImageSize, MediaElement, MediaReader};
use crate::tag::{TagElement, TagValue};

type MonoFrameCache = Arc<Mutex<Vec<Option<Arc<[i32]>>>>>;

/// Decoded-frame cache filled by the importer. Resetting empties every slot
/// so frames are decoded again on next access.
#[derive(Debug, Clone)]
pub struct FrameCacheReader {
    cache: MonoFrameCache,
}

impl FrameCacheReader {
    pub fn new(frame_count: usize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(vec![None; frame_count])),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Option<Arc<[i32]>>>> {
        self.cache.lock().unwrap_or_else(|err| {
            log::warn!("frame cache lock poisoned, recovering");
            PoisonError::into_inner(err)
        })
    }

    pub fn frame_count(&self) -> usize {
        self.slots().len()
    }

    pub fn frame(&self, frame_index: usize) -> Option<Arc<[i32]>> {
        self.slots().get(frame_index).and_then(|slot| slot.clone())
    }

    /// Stores a decoded frame; returns false when the index is out of range
    /// or the slot is already filled.
    pub fn store(&self, frame_index: usize, pixels: Arc<[i32]>) -> bool {
        match self.slots().get_mut(frame_index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(pixels);
                true
            }
            _ => false,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.slots().iter().filter(|slot| slot.is_some()).count()
    }
}

impl MediaReader for FrameCacheReader {
    fn reset(&self) {
        for slot in self.slots().iter_mut() {
            *slot = None;
        }
    }
}

/// Media element over an already-parsed DICOM data set.
#[derive(Debug)]
pub struct DicomInstance {
    obj: InMemDicomObject,
    size: Option<ImageSize>,
    frames: FrameCacheReader,
    disposed: AtomicBool,
}

impl DicomInstance {
    pub fn new(obj: InMemDicomObject) -> Result<Self> {
        let size = match (read_usize(&obj, "Columns"), read_usize(&obj, "Rows")) {
            (Some(width), Some(height)) => Some(ImageSize { width, height }),
            (None, None) => None,
            (width, height) => bail!(
                "Incomplete image dimensions: Columns={:?}, Rows={:?}",
                width,
                height
            ),
        };

        let frame_count = match read_int_first(&obj, "NumberOfFrames") {
            Some(value) if value > 0 => value as usize,
            Some(value) => bail!("Invalid NumberOfFrames={} (must be >= 1)", value),
            None if size.is_some() => 1,
            None => 0,
        };

        Ok(Self {
            obj,
            size,
            frames: FrameCacheReader::new(frame_count),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn object(&self) -> &InMemDicomObject {
        &self.obj
    }

    pub fn frames(&self) -> &FrameCacheReader {
        &self.frames
    }

    pub fn instance_number(&self) -> Option<i32> {
        read_int_first(&self.obj, "InstanceNumber")
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl MediaElement for DicomInstance {
    fn dispose(&self) -> Result<()> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.frames.reset();
        Ok(())
    }

    fn tag_value(&self, tag: &TagElement) -> Option<TagValue> {
        let element = self.obj.element_by_name(tag.keyword()).ok()?;
        match element.vr() {
            VR::IS | VR::US | VR::SS | VR::UL | VR::SL => {
                element.to_int::<i64>().ok().map(TagValue::Int)
            }
            VR::DS | VR::FL | VR::FD => element.to_float64().ok().map(TagValue::Float),
            _ => element
                .to_str()
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(TagValue::Text),
        }
    }

    fn image_size(&self) -> Option<ImageSize> {
        self.size
    }

    fn media_reader(&self) -> Option<&dyn MediaReader> {
        if self.frames.frame_count() == 0 {
            return None;
        }
        Some(&self.frames)
    }
}

fn read_usize(obj: &InMemDicomObject, name: &str) -> Option<usize> {
    obj.element_by_name(name)
        .ok()
        .and_then(|el| el.to_int::<usize>().ok())
}

fn read_int_first(obj: &InMemDicomObject, name: &str) -> Option<i32> {
    obj.element_by_name(name)
        .ok()
        .and_then(|el| el.to_str().ok())
        .and_then(|value| {
            value
                .split('\\')
                .next()
                .and_then(|v| v.trim().parse::<i32>().ok())
        })
}
