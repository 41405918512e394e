/// Background importer that fills a series with media elements.
///
/// A series keeps at most one importer and drops it when disposed.
pub trait SeriesImporter: Send + Sync {
    fn stop(&self);

    fn is_stopped(&self) -> bool;
}
