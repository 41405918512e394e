use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::sync::atomic::{self, AtomicBool};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::Rng;

use crate::config;
use crate::error::{Result, SeriesError};
use crate::event::{ObservableEvent, PropertyChangeListener};
use crate::executor::UiExecutor;
use crate::loader::SeriesImporter;
use crate::media::{MediaElement, MediaPosition};
use crate::tag::{SeriesIdentity, TagElement, TagStore, TagValue};
use crate::thumbnail::Thumbnail;
use crate::transfer::{DataFlavor, Transferable};

pub const IMAGE_SIZE_LABEL: &str = "Image size: ";

type Listeners = Arc<Mutex<Vec<Arc<dyn PropertyChangeListener>>>>;

struct SeriesState {
    open: bool,
    selected: bool,
    thumbnail: Option<Arc<dyn Thumbnail>>,
    series_loader: Option<Arc<dyn SeriesImporter>>,
    tags: TagStore,
}

/// Ordered, thread-safe collection of media elements sharing one series identity.
///
/// Every read or mutation of the element list takes the same lock for the
/// duration of that one call. Sequences of calls are not atomic as a whole.
/// Collaborator callbacks (element dispose/reset, thumbnail repaint, listeners)
/// always run with the list lock released.
pub struct Series<E: MediaElement + ?Sized> {
    identity: SeriesIdentity,
    medias: Mutex<Vec<Arc<E>>>,
    state: Mutex<SeriesState>,
    listeners: Listeners,
    executor: Option<UiExecutor>,
    rng: Mutex<StdRng>,
    disposed: AtomicBool,
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|err| {
        log::warn!("series {what} lock poisoned, recovering");
        PoisonError::into_inner(err)
    })
}

fn position_index(
    position: MediaPosition,
    len: usize,
    pick_random: impl FnOnce(usize) -> usize,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = match position {
        MediaPosition::First => 0,
        MediaPosition::Middle => len / 2,
        MediaPosition::Last => len - 1,
        MediaPosition::Random => pick_random(len),
    };
    Some(index.min(len - 1))
}

fn deliver(listeners: &Listeners, event: &ObservableEvent) {
    let snapshot = lock_or_recover(listeners, "listener").clone();
    for listener in snapshot {
        listener.property_change(event);
    }
}

impl<E: MediaElement + ?Sized> Series<E> {
    pub fn new(identity: SeriesIdentity) -> Self {
        Self::with_capacity(identity, config::default_capacity())
    }

    pub fn with_capacity(identity: SeriesIdentity, capacity: usize) -> Self {
        Self::from_medias(identity, Some(Vec::with_capacity(capacity)))
    }

    /// Wraps an existing element list; `None` starts empty.
    pub fn from_medias(identity: SeriesIdentity, medias: Option<Vec<Arc<E>>>) -> Self {
        Self {
            identity,
            medias: Mutex::new(medias.unwrap_or_default()),
            state: Mutex::new(SeriesState {
                open: false,
                selected: false,
                thumbnail: None,
                series_loader: None,
                tags: TagStore::new(),
            }),
            listeners: Arc::new(Mutex::new(Vec::new())),
            executor: None,
            rng: Mutex::new(config::default_rng()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Routes change notifications through `executor`. Without one they are
    /// delivered on the calling thread.
    pub fn with_executor(mut self, executor: UiExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn identity(&self) -> &SeriesIdentity {
        &self.identity
    }

    fn medias(&self) -> MutexGuard<'_, Vec<Arc<E>>> {
        lock_or_recover(&self.medias, "media")
    }

    fn state(&self) -> MutexGuard<'_, SeriesState> {
        lock_or_recover(&self.state, "state")
    }

    pub fn sort_by(&self, mut compare: impl FnMut(&E, &E) -> Ordering) {
        self.medias().sort_by(|a, b| compare(a, b));
    }

    pub fn add(&self, media: Arc<E>) {
        self.medias().push(media);
    }

    pub fn insert(&self, index: usize, media: Arc<E>) -> Result<()> {
        let mut medias = self.medias();
        if index > medias.len() {
            return Err(SeriesError::IndexOutOfBounds {
                index,
                len: medias.len(),
            });
        }
        medias.insert(index, media);
        Ok(())
    }

    pub fn add_all(&self, items: impl IntoIterator<Item = Arc<E>>) {
        let items = items.into_iter().collect::<Vec<_>>();
        self.medias().extend(items);
    }

    pub fn insert_all(&self, index: usize, items: impl IntoIterator<Item = Arc<E>>) -> Result<()> {
        let items = items.into_iter().collect::<Vec<_>>();
        let mut medias = self.medias();
        if index > medias.len() {
            return Err(SeriesError::IndexOutOfBounds {
                index,
                len: medias.len(),
            });
        }
        medias.splice(index..index, items);
        Ok(())
    }

    /// Representative element at `position`; RANDOM draws from this series' own source.
    pub fn media_at(&self, position: MediaPosition) -> Option<Arc<E>> {
        let medias = self.medias();
        let index = position_index(position, medias.len(), |len| {
            lock_or_recover(&self.rng, "rng").random_range(0..len)
        })?;
        medias.get(index).cloned()
    }

    pub fn media_at_with<R: Rng>(&self, position: MediaPosition, rng: &mut R) -> Option<Arc<E>> {
        let medias = self.medias();
        let index = position_index(position, medias.len(), |len| rng.random_range(0..len))?;
        medias.get(index).cloned()
    }

    /// Element at `index`, or `None` when out of range.
    pub fn media(&self, index: usize) -> Option<Arc<E>> {
        self.medias().get(index).cloned()
    }

    /// Position of this exact handle (pointer identity, not value equality).
    pub fn index_of(&self, media: &Arc<E>) -> Option<usize> {
        self.medias()
            .iter()
            .position(|candidate| Arc::ptr_eq(candidate, media))
    }

    pub fn medias_snapshot(&self) -> Vec<Arc<E>> {
        self.medias().clone()
    }

    pub fn len(&self) -> usize {
        self.medias().len()
    }

    pub fn is_empty(&self) -> bool {
        self.medias().is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(atomic::Ordering::Acquire)
    }

    /// Disposes every element and the thumbnail, then drops all listeners and
    /// the importer. A failing element does not stop the others. Calling it
    /// again is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, atomic::Ordering::AcqRel) {
            log::debug!("series {} already disposed", self.identity.identifier);
            return;
        }

        let medias = std::mem::take(&mut *self.medias());
        let mut failures = 0usize;
        for (index, media) in medias.iter().enumerate() {
            if let Err(err) = media.dispose() {
                failures += 1;
                log::warn!(
                    "series {}: disposing media {index} failed: {err:#}",
                    self.identity.identifier
                );
            }
        }

        let thumbnail = {
            let mut state = self.state();
            state.series_loader = None;
            state.thumbnail.take()
        };
        if let Some(thumbnail) = thumbnail {
            if let Err(err) = thumbnail.dispose() {
                log::warn!(
                    "series {}: disposing thumbnail failed: {err:#}",
                    self.identity.identifier
                );
            }
        }

        lock_or_recover(&self.listeners, "listener").clear();

        log::debug!(
            "disposed series {} ({} media, {failures} failure(s))",
            self.identity.identifier,
            medias.len()
        );
    }

    pub fn reset_loaders(&self) {
        let medias = self.medias_snapshot();
        for media in &medias {
            if let Some(reader) = media.media_reader() {
                reader.reset();
            }
        }
    }

    /// True when any element holds `value` under `tag`. Always false for `None`.
    pub fn has_media_matching(&self, tag: &TagElement, value: Option<&TagValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        self.medias()
            .iter()
            .any(|media| media.tag_value(tag).as_ref() == Some(value))
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn set_open(&self, open: bool) {
        let thumbnail = {
            let mut state = self.state();
            if state.open == open {
                return;
            }
            state.open = open;
            state.thumbnail.clone()
        };
        if let Some(thumbnail) = thumbnail {
            thumbnail.repaint();
        }
    }

    pub fn is_selected(&self) -> bool {
        self.state().selected
    }

    pub fn set_selected(&self, selected: bool) {
        let thumbnail = {
            let mut state = self.state();
            if state.selected == selected {
                return;
            }
            state.selected = selected;
            state.thumbnail.clone()
        };
        if let Some(thumbnail) = thumbnail {
            thumbnail.repaint();
        }
    }

    pub fn thumbnail(&self) -> Option<Arc<dyn Thumbnail>> {
        self.state().thumbnail.clone()
    }

    pub fn set_thumbnail(&self, thumbnail: Option<Arc<dyn Thumbnail>>) {
        self.state().thumbnail = thumbnail;
    }

    pub fn series_loader(&self) -> Option<Arc<dyn SeriesImporter>> {
        self.state().series_loader.clone()
    }

    pub fn set_series_loader(&self, loader: Option<Arc<dyn SeriesImporter>>) {
        self.state().series_loader = loader;
    }

    pub fn tag_value(&self, tag: &TagElement) -> Option<TagValue> {
        self.state().tags.get(tag).cloned()
    }

    pub fn set_tag(&self, tag: TagElement, value: Option<TagValue>) {
        self.state().tags.set(tag, value);
    }

    /// Hover text for the series thumbnail.
    pub fn tool_tip_text(&self) -> String {
        let mut text = String::new();
        let size = self
            .media_at(MediaPosition::Middle)
            .and_then(|media| media.image_size());
        if let Some(size) = size {
            let _ = write!(text, "{IMAGE_SIZE_LABEL}{}x{}", size.width, size.height);
        }
        text
    }

    /// Appends a `title` line with the series' value for `tag` (empty if unset).
    pub fn push_tool_tip_element(&self, text: &mut String, title: &str, tag: &TagElement) {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(title);
        if let Some(value) = self.tag_value(tag) {
            let _ = write!(text, "{value}");
        }
    }

    pub fn add_property_change_listener(&self, listener: Arc<dyn PropertyChangeListener>) {
        lock_or_recover(&self.listeners, "listener").push(listener);
    }

    pub fn remove_property_change_listener(&self, listener: &Arc<dyn PropertyChangeListener>) {
        lock_or_recover(&self.listeners, "listener")
            .retain(|registered| !Arc::ptr_eq(registered, listener));
    }

    pub fn listener_count(&self) -> usize {
        lock_or_recover(&self.listeners, "listener").len()
    }

    /// Delivers `event` to every listener on the UI executor: synchronously
    /// when already on it, posted otherwise. Listeners are read at delivery
    /// time, so nothing is delivered after [`Series::dispose`].
    pub fn fire_property_change(&self, event: Option<ObservableEvent>) -> Result<()> {
        let event = event.ok_or(SeriesError::InvalidArgument("event must not be absent"))?;
        let listeners = Arc::clone(&self.listeners);
        match &self.executor {
            Some(executor) => {
                if !executor.is_ui_thread() {
                    log::trace!(
                        "series {}: deferring {:?} to UI executor",
                        self.identity.identifier,
                        event.action
                    );
                }
                executor.run_or_post(move || deliver(&listeners, &event))
            }
            None => {
                deliver(&listeners, &event);
                Ok(())
            }
        }
    }
}

impl<E: MediaElement + ?Sized> Transferable for Series<E> {
    fn transfer_flavors(&self) -> Vec<DataFlavor> {
        vec![DataFlavor::series()]
    }

    fn transfer_data(&self, flavor: &DataFlavor) -> Result<&Self> {
        if *flavor == DataFlavor::series() {
            Ok(self)
        } else {
            Err(SeriesError::UnsupportedFlavor(flavor.mime_type().to_string()))
        }
    }
}

impl<E: MediaElement + ?Sized> PartialEq for Series<E> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<E: MediaElement + ?Sized> fmt::Debug for Series<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series")
            .field("identity", &self.identity)
            .field("len", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
