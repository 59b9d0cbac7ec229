//! TransformLookup trait - time-indexed frame transforms.

use nalgebra::Isometry3;

use crate::Stamp;

/// Source of frame-to-frame transforms
pub trait TransformLookup {
    /// Transform mapping `source` coordinates into `target` at `stamp`.
    ///
    /// Returns `None` when the transform is unknown at that time.
    fn lookup(&self, target: &str, source: &str, stamp: Stamp) -> Option<Isometry3<f64>>;
}

impl<T: TransformLookup + ?Sized> TransformLookup for &T {
    fn lookup(&self, target: &str, source: &str, stamp: Stamp) -> Option<Isometry3<f64>> {
        (**self).lookup(target, source, stamp)
    }
}

impl<T: TransformLookup + ?Sized> TransformLookup for std::sync::Arc<T> {
    fn lookup(&self, target: &str, source: &str, stamp: Stamp) -> Option<Isometry3<f64>> {
        (**self).lookup(target, source, stamp)
    }
}
