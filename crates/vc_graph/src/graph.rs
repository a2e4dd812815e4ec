use alloc::boxed::Box;
use core::any::{Any, type_name};
use core::fmt;

use slotmap::SlotMap;

use crate::{AccessError, Object, ObjectKey, Ref};

// -----------------------------------------------------------------------------
// Entry

struct Entry {
    // `None` while the slot is reserved but not yet constructed.
    object: Option<Box<dyn Object>>,
    sealed: bool,
}

impl Entry {
    #[inline]
    const fn open(object: Option<Box<dyn Object>>) -> Self {
        Self {
            object,
            sealed: false,
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectGraph

/// An arena owning a set of objects that may reference each other.
///
/// Objects refer to each other through [`Ref`] handles, so the graph may
/// contain shared references and cycles without any reference counting.
///
/// # Slot states
///
/// A slot is either *reserved* (its key exists, the object does not yet) or
/// *constructed*. Reserving first lets a decoder hand out the key of an object
/// to its own children before the object itself can be built.
///
/// Independently, a slot is either *open* or *sealed*. Sealing is one-way:
/// a sealed object can still be read but never mutated again.
///
/// # Examples
///
/// ```
/// # use vc_graph::{FieldKey, Object, ObjectGraph, ObjectKey, PatchError, Ref};
/// struct Pair { other: Ref<Pair> }
///
/// impl Object for Pair {
///     fn type_tag(&self) -> &'static str { "Pair" }
///     fn patch(&mut self, field: &FieldKey, target: ObjectKey) -> Result<(), PatchError> {
///         match field {
///             FieldKey::Name("other") => self.other = Ref::from_key(target),
///             _ => return Err(PatchError::UnknownField(*field)),
///         }
///         Ok(())
///     }
/// }
///
/// let mut graph = ObjectGraph::new();
/// let a = graph.insert(Pair { other: Ref::null() });
/// let b = graph.insert(Pair { other: a });
/// graph.get_mut(a).unwrap().other = b;
///
/// let back = graph.get(graph.get(a).unwrap().other).unwrap().other;
/// assert_eq!(back, a);
/// ```
pub struct ObjectGraph {
    entries: SlotMap<ObjectKey, Entry>,
}

impl Default for ObjectGraph {
    /// See [`ObjectGraph::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGraph {
    /// Creates an empty graph.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }

    /// Creates an empty graph with room for `capacity` objects.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Returns the number of slots, reserved ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves `value` into the graph and returns a handle to it.
    pub fn insert<T: Object>(&mut self, value: T) -> Ref<T> {
        let object: Box<dyn Object> = Box::new(value);
        Ref::from_key(self.entries.insert(Entry::open(Some(object))))
    }

    /// Inserts the value built by `f`, which receives the handle the value
    /// will live under. Useful for objects referring to themselves.
    pub fn insert_with<T: Object>(&mut self, f: impl FnOnce(Ref<T>) -> T) -> Ref<T> {
        let key = self.entries.insert_with_key(|key| {
            let object: Box<dyn Object> = Box::new(f(Ref::from_key(key)));
            Entry::open(Some(object))
        });
        Ref::from_key(key)
    }

    /// Reserves a slot whose object will be provided later by [`fill`](Self::fill).
    ///
    /// Reading a reserved slot fails with [`AccessError::Vacant`].
    #[inline]
    pub fn reserve(&mut self) -> ObjectKey {
        self.entries.insert(Entry::open(None))
    }

    /// Stores the object of a reserved slot.
    pub fn fill(&mut self, key: ObjectKey, object: Box<dyn Object>) -> Result<(), AccessError> {
        let entry = self.entries.get_mut(key).ok_or(AccessError::Missing(key))?;
        if entry.sealed {
            return Err(AccessError::Frozen(key));
        }
        if entry.object.is_some() {
            return Err(AccessError::Occupied(key));
        }
        entry.object = Some(object);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, key: ObjectKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if `key` is reserved but not constructed.
    #[inline]
    pub fn is_vacant(&self, key: ObjectKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.object.is_none())
    }

    /// Returns `true` if `key` exists and has been sealed.
    #[inline]
    pub fn is_sealed(&self, key: ObjectKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.sealed)
    }

    /// Seals one slot.
    ///
    /// Returns `true` if the slot existed and was open.
    pub fn seal(&mut self, key: ObjectKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) if !entry.sealed => {
                entry.sealed = true;
                true
            }
            _ => false,
        }
    }

    /// Seals every slot, returning how many were still open.
    pub fn seal_all(&mut self) -> usize {
        let mut count = 0;
        for entry in self.entries.values_mut() {
            if !entry.sealed {
                entry.sealed = true;
                count += 1;
            }
        }
        count
    }

    /// Returns the object at `key` without checking its type.
    pub fn get_dyn(&self, key: ObjectKey) -> Result<&(dyn Object + 'static), AccessError> {
        let entry = self.entries.get(key).ok_or(AccessError::Missing(key))?;
        entry.object.as_deref().ok_or(AccessError::Vacant(key))
    }

    /// Returns the object at `key` mutably, unless it is sealed.
    pub fn get_dyn_mut(
        &mut self,
        key: ObjectKey,
    ) -> Result<&mut (dyn Object + 'static), AccessError> {
        let entry = self.entries.get_mut(key).ok_or(AccessError::Missing(key))?;
        if entry.sealed {
            return Err(AccessError::Frozen(key));
        }
        entry.object.as_deref_mut().ok_or(AccessError::Vacant(key))
    }

    /// Returns the object behind `handle`.
    pub fn get<T: Object>(&self, handle: Ref<T>) -> Result<&T, AccessError> {
        let key = handle.key();
        let object = self.get_dyn(key)?;
        let found = object.type_tag();
        (object as &dyn Any)
            .downcast_ref::<T>()
            .ok_or(AccessError::TypeMismatch {
                key,
                expected: type_name::<T>(),
                found,
            })
    }

    /// Returns the object behind `handle` mutably, unless it is sealed.
    pub fn get_mut<T: Object>(&mut self, handle: Ref<T>) -> Result<&mut T, AccessError> {
        let key = handle.key();
        let object = self.get_dyn_mut(key)?;
        let found = object.type_tag();
        (object as &mut dyn Any)
            .downcast_mut::<T>()
            .ok_or(AccessError::TypeMismatch {
                key,
                expected: type_name::<T>(),
                found,
            })
    }

    /// Iterates over every slot key, reserved ones included.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = ObjectKey> + '_ {
        self.entries.keys()
    }

    /// Iterates over every constructed object.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &dyn Object)> + '_ {
        self.entries
            .iter()
            .filter_map(|(key, entry)| Some((key, entry.object.as_deref()?)))
    }
}

impl fmt::Debug for ObjectGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| {
                let tag = entry.object.as_deref().map_or("<reserved>", |o| o.type_tag());
                (key, tag)
            }))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ObjectGraph;
    use crate::{AccessError, FieldKey, Object, ObjectKey, PatchError, Ref};
    use alloc::boxed::Box;

    #[derive(Debug, PartialEq)]
    struct Node {
        value: i64,
        next: Ref<Node>,
    }

    impl Object for Node {
        fn type_tag(&self) -> &'static str {
            "Node"
        }

        fn patch(&mut self, field: &FieldKey, target: ObjectKey) -> Result<(), PatchError> {
            match field {
                FieldKey::Name("next") => self.next = Ref::from_key(target),
                _ => return Err(PatchError::UnknownField(*field)),
            }
            Ok(())
        }
    }

    struct Leaf;

    impl Object for Leaf {
        fn type_tag(&self) -> &'static str {
            "Leaf"
        }

        fn patch(&mut self, field: &FieldKey, _: ObjectKey) -> Result<(), PatchError> {
            Err(PatchError::UnknownField(*field))
        }
    }

    #[test]
    fn insert_and_get() {
        let mut graph = ObjectGraph::new();
        let a = graph.insert(Node {
            value: 1,
            next: Ref::null(),
        });
        let b = graph.insert(Node { value: 2, next: a });

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.get(b).unwrap().next, a);
        assert_eq!(graph.get(a).unwrap().value, 1);

        graph.get_mut(a).unwrap().next = b;
        let a_next = graph.get(a).unwrap().next;
        assert_eq!(graph.get(a_next).unwrap().next, a);
    }

    #[test]
    fn self_reference() {
        let mut graph = ObjectGraph::new();
        let node = graph.insert_with(|me| Node { value: 7, next: me });
        assert_eq!(graph.get(node).unwrap().next, node);
    }

    #[test]
    fn reserve_then_fill() {
        let mut graph = ObjectGraph::new();
        let key = graph.reserve();
        assert!(graph.is_vacant(key));
        assert_eq!(graph.get_dyn(key).err(), Some(AccessError::Vacant(key)));

        let node = Node {
            value: 3,
            next: Ref::from_key(key),
        };
        graph.fill(key, Box::new(node)).unwrap();
        assert!(!graph.is_vacant(key));

        let handle = Ref::<Node>::from_key(key);
        assert_eq!(graph.get(handle).unwrap().next, handle);
        assert_eq!(
            graph.fill(key, Box::new(Leaf)).err(),
            Some(AccessError::Occupied(key))
        );
    }

    #[test]
    fn type_mismatch() {
        let mut graph = ObjectGraph::new();
        let leaf = graph.insert(Leaf);
        let wrong = Ref::<Node>::from_key(leaf.key());
        assert!(matches!(
            graph.get(wrong),
            Err(AccessError::TypeMismatch { found: "Leaf", .. })
        ));
        assert!(graph.get_dyn(leaf.key()).is_ok());
    }

    #[test]
    fn sealed_objects_are_read_only() {
        let mut graph = ObjectGraph::new();
        let a = graph.insert(Node {
            value: 1,
            next: Ref::null(),
        });
        let b = graph.insert(Node { value: 2, next: a });

        assert!(graph.seal(a.key()));
        assert!(!graph.seal(a.key()));
        assert!(graph.is_sealed(a.key()));

        assert_eq!(graph.get_mut(a).err(), Some(AccessError::Frozen(a.key())));
        assert_eq!(graph.get(a).unwrap().value, 1);

        // only `a` was sealed.
        graph.get_mut(b).unwrap().value = 20;
        assert_eq!(graph.seal_all(), 1);
        assert!(graph.get_mut(b).is_err());
    }

    #[test]
    fn null_and_missing() {
        let mut graph = ObjectGraph::new();
        let null = Ref::<Node>::null();
        assert!(matches!(graph.get(null), Err(AccessError::Missing(_))));
        assert!(!graph.seal(null.key()));
        assert!(graph.is_empty());
    }

    #[test]
    fn graph_crosses_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ObjectGraph>();
        assert_send_sync::<Ref<Node>>();
    }
}
