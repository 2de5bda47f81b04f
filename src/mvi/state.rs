/// Marker trait for slice state objects.
///
/// States are cloned to produce new states and compared to detect changes.
pub trait SliceState: Clone + PartialEq + Default + Send + 'static {}
