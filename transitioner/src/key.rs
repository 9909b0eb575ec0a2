/// Item identity used by the pose registry.
///
/// Keys must be stable across the two layout states being transitioned
/// between: the same key in the "from" and "to" layouts identifies the same
/// item.
pub trait TransitionKey: core::hash::Hash + Eq + Clone {}
impl<T: core::hash::Hash + Eq + Clone> TransitionKey for T {}
