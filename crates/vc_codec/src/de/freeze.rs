use alloc::vec::Vec;

use vc_graph::{ObjectGraph, ObjectKey};

use super::PatchesApplied;

/// Remembers every object constructed by one decode, to seal them at the end.
#[derive(Debug, Default)]
pub struct FreezeTracker {
    tracked: Vec<ObjectKey>,
}

impl FreezeTracker {
    #[inline]
    pub const fn new() -> Self {
        Self {
            tracked: Vec::new(),
        }
    }

    #[inline]
    pub fn track(&mut self, key: ObjectKey) {
        self.tracked.push(key);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Seals every tracked object and returns how many were sealed.
    ///
    /// Takes the [`PatchesApplied`] proof: sealing must come after every
    /// deferred reference has been assigned.
    pub fn freeze_all(self, graph: &mut ObjectGraph, patches: PatchesApplied) -> usize {
        let sealed = self
            .tracked
            .into_iter()
            .filter(|key| graph.seal(*key))
            .count();
        log::debug!(
            "decode: {sealed} objects sealed after {} patches",
            patches.count()
        );
        sealed
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::FreezeTracker;
    use crate::de::PatchQueue;
    use crate::registry::ReferenceRegistry;
    use vc_graph::{AccessError, FieldKey, Object, ObjectGraph, ObjectKey, PatchError};

    struct Unit;

    impl Object for Unit {
        fn type_tag(&self) -> &'static str {
            "Unit"
        }

        fn patch(&mut self, field: &FieldKey, _: ObjectKey) -> Result<(), PatchError> {
            Err(PatchError::UnknownField(*field))
        }
    }

    #[test]
    fn seals_tracked_only() {
        let mut graph = ObjectGraph::new();
        let a = graph.insert(Unit);
        let b = graph.insert(Unit);

        let mut tracker = FreezeTracker::new();
        tracker.track(a.key());
        tracker.track(a.key());

        let applied = PatchQueue::new()
            .apply_all(&ReferenceRegistry::new(), &mut graph)
            .unwrap();
        assert_eq!(tracker.freeze_all(&mut graph, applied), 1);

        assert_eq!(graph.get_mut(a).err(), Some(AccessError::Frozen(a.key())));
        assert!(graph.get(a).is_ok());
        assert!(graph.get_mut(b).is_ok());
    }
}
