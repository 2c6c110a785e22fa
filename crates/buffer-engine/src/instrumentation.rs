/// Optional observer wired at construction of a [`crate::tree::Tree`] or
/// [`crate::builder::Builder`], notified as leaves and nodes are allocated or
/// dropped.
///
/// Notifications are per edit batch, not per individual leaf mutation:
/// [`Tree::replace_offset_len`](crate::tree::Tree::replace_offset_len) reports
/// every old leaf it discards as `leaf_dropped` and every leaf left standing
/// afterward (whether newly spliced or just carried over unchanged) as
/// `leaf_created`, and `Builder::finish` reports the same pair when it
/// replaces its last leaf to append a held-back code unit.
///
/// Stands in for the original engine's `MM_REGISTER`/`MM_UNREGISTER` macros
/// (`mem-manager.h`), which were compiled in or out entirely behind
/// `#ifdef TRACK_MEMORY`. Rust has no such preprocessor toggle, so this is an
/// ordinary trait with a no-op default — callers who don't care pay nothing
/// beyond a vtable call per allocation event.
pub trait InstrumentationHook {
    fn leaf_created(&self, _leaf_index: usize, _length: usize) {}
    fn leaf_dropped(&self, _leaf_index: usize) {}
    fn nodes_rebuilt(&self, _leaf_count: usize) {}
}

/// The default hook: observes nothing.
pub struct NoopHook;

impl InstrumentationHook for NoopHook {}
