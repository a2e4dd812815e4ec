use vc_graph::Object;

use super::FieldWriter;
use crate::error::EncodeError;

/// Per-type encoder: writes the fields of one object.
///
/// Scalars are written inline, references go back through the context so
/// that shared objects and cycles are emitted as back-references.
///
/// The envelope itself (tag and id) is written by the context, the
/// implementation only deals with the field map.
///
/// # Examples
///
/// ```
/// # use vc_codec::ser::{Encode, FieldWriter};
/// # use vc_codec::EncodeError;
/// # use vc_graph::{FieldKey, Object, ObjectKey, PatchError, Ref};
/// struct Node { value: i64, next: Ref<Node> }
/// # impl Object for Node {
/// #     fn type_tag(&self) -> &'static str { "Node" }
/// #     fn patch(&mut self, field: &FieldKey, _: ObjectKey) -> Result<(), PatchError> {
/// #         Err(PatchError::UnknownField(*field))
/// #     }
/// # }
///
/// impl Encode for Node {
///     fn encode_fields(&self, fields: &mut FieldWriter<'_, '_>) -> Result<(), EncodeError> {
///         fields.scalar("value", self.value);
///         fields.reference("next", self.next)
///     }
/// }
/// ```
pub trait Encode: Object {
    fn encode_fields(&self, fields: &mut FieldWriter<'_, '_>) -> Result<(), EncodeError>;
}
