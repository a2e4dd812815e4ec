use alloc::string::String;
use alloc::vec::Vec;

use vc_graph::{FieldKey, ObjectGraph, ObjectKey};

use crate::envelope::RefId;
use crate::error::DecodeError;
use crate::registry::ReferenceRegistry;

// -----------------------------------------------------------------------------
// Patch

/// A reference assignment deferred until its target id is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// The object holding the reference field.
    pub target: ObjectKey,
    /// The reference field of `target`.
    pub field: FieldKey,
    /// The id the field refers to.
    pub id: RefId,
    /// Type tag the referenced object must have, `None` for `dyn` fields.
    pub expected: Option<&'static str>,
    /// Rendered path of the field, for error reporting.
    pub path: String,
}

// -----------------------------------------------------------------------------
// PatchesApplied

/// Proof that a [`PatchQueue`] has been drained successfully.
///
/// Only [`PatchQueue::apply_all`] creates this value, and
/// [`FreezeTracker::freeze_all`](super::FreezeTracker::freeze_all) requires it.
#[must_use]
#[derive(Debug)]
pub struct PatchesApplied {
    count: usize,
}

impl PatchesApplied {
    /// Number of patches that were applied.
    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }
}

// -----------------------------------------------------------------------------
// PatchQueue

/// Append-only list of [`Patch`]es, drained once in insertion order.
#[derive(Debug, Default)]
pub struct PatchQueue {
    patches: Vec<Patch>,
}

impl PatchQueue {
    #[inline]
    pub const fn new() -> Self {
        Self {
            patches: Vec::new(),
        }
    }

    #[inline]
    pub fn enqueue(&mut self, patch: Patch) {
        log::trace!("decode: `{}` waits for id {}", patch.path, patch.id);
        self.patches.push(patch);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Patch> {
        self.patches.iter()
    }

    /// Applies every patch in the order it was queued.
    ///
    /// Consumes the queue, so patches are applied at most once. The first
    /// failing patch aborts; an id that is still unbound here can never be
    /// bound, the walk being over.
    pub fn apply_all(
        self,
        references: &ReferenceRegistry,
        graph: &mut ObjectGraph,
    ) -> Result<PatchesApplied, DecodeError> {
        let count = self.patches.len();

        for patch in self.patches {
            let Some(binding) = references.binding(patch.id) else {
                return Err(DecodeError::UnresolvedReference {
                    id: patch.id,
                    field: patch.path,
                });
            };

            match patch.expected {
                Some(expected) if expected != binding.tag => {
                    return Err(DecodeError::ReferenceMismatch {
                        id: patch.id,
                        field: patch.path,
                        expected,
                        found: binding.tag,
                    });
                }
                _ => {}
            }

            let target = match graph.get_dyn_mut(patch.target) {
                Ok(target) => target,
                Err(source) => {
                    return Err(DecodeError::Access {
                        field: patch.path,
                        source,
                    });
                }
            };

            if let Err(source) = target.patch(&patch.field, binding.key) {
                return Err(DecodeError::Patch {
                    field: patch.path,
                    source,
                });
            }

            log::trace!("decode: `{}` patched to id {}", patch.path, patch.id);
        }

        log::debug!("decode: {count} patches applied");
        Ok(PatchesApplied { count })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Patch, PatchQueue};
    use crate::envelope::RefId;
    use crate::error::DecodeError;
    use crate::registry::ReferenceRegistry;
    use alloc::boxed::Box;
    use alloc::string::String;
    use vc_graph::{FieldKey, Object, ObjectGraph, ObjectKey, PatchError, Ref};

    struct Cell {
        next: Ref<Cell>,
    }

    impl Object for Cell {
        fn type_tag(&self) -> &'static str {
            "Cell"
        }

        fn patch(&mut self, field: &FieldKey, target: ObjectKey) -> Result<(), PatchError> {
            match field {
                FieldKey::Name("next") => self.next = Ref::from_key(target),
                _ => return Err(PatchError::UnknownField(*field)),
            }
            Ok(())
        }
    }

    fn patch(target: ObjectKey, field: FieldKey, id: u32) -> Patch {
        Patch {
            target,
            field,
            id: RefId(id),
            expected: Some("Cell"),
            path: String::from("next"),
        }
    }

    #[test]
    fn applies_in_order() {
        let mut graph = ObjectGraph::new();
        let a = graph.insert(Cell { next: Ref::null() });
        let b = graph.insert(Cell { next: Ref::null() });

        let mut references = ReferenceRegistry::new();
        references.register(RefId(0), a.key(), "Cell").unwrap();
        references.register(RefId(1), b.key(), "Cell").unwrap();

        let mut queue = PatchQueue::new();
        queue.enqueue(patch(a.key(), FieldKey::Name("next"), 1));
        queue.enqueue(patch(b.key(), FieldKey::Name("next"), 0));
        assert_eq!(queue.len(), 2);

        let applied = queue.apply_all(&references, &mut graph).unwrap();
        assert_eq!(applied.count(), 2);
        assert_eq!(graph.get(a).unwrap().next, b);
        assert_eq!(graph.get(b).unwrap().next, a);
    }

    #[test]
    fn unresolved_is_fatal() {
        let mut graph = ObjectGraph::new();
        let a = graph.insert(Cell { next: Ref::null() });

        let mut queue = PatchQueue::new();
        queue.enqueue(patch(a.key(), FieldKey::Name("next"), 7));

        let err = queue
            .apply_all(&ReferenceRegistry::new(), &mut graph)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnresolvedReference {
                id: RefId(7),
                field: String::from("next"),
            }
        );
        assert!(graph.get(a).unwrap().next.is_null());
    }

    #[test]
    fn rejected_field_and_wrong_tag() {
        let mut graph = ObjectGraph::new();
        let a = graph.reserve();
        graph.fill(a, Box::new(Cell { next: Ref::null() })).unwrap();

        let mut references = ReferenceRegistry::new();
        references.register(RefId(0), a, "Cell").unwrap();
        references.register(RefId(1), a, "Other").unwrap();

        let mut queue = PatchQueue::new();
        queue.enqueue(patch(a, FieldKey::Name("prev"), 0));
        let err = queue.apply_all(&references, &mut graph).unwrap_err();
        assert!(matches!(err, DecodeError::Patch { .. }));

        let mut queue = PatchQueue::new();
        queue.enqueue(patch(a, FieldKey::Name("next"), 1));
        let err = queue.apply_all(&references, &mut graph).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ReferenceMismatch {
                expected: "Cell",
                found: "Other",
                ..
            }
        ));
    }
}
