use vc_graph::Object;

use super::FieldReader;

/// Per-type decoder: builds one object out of its envelope's field map.
///
/// The context has already checked the envelope tag against
/// [`TYPE_TAG`](Self::TYPE_TAG), reported every missing name of
/// [`REQUIRED_FIELDS`](Self::REQUIRED_FIELDS) and reserved the object's slot
/// before `decode_fields` runs.
///
/// Returning `None` aborts construction. Problems should be recorded through
/// the reader first; a `None` without any recorded problem is reported as a
/// generic construction failure.
///
/// Fields are best read all at once before combining them, so that every
/// problem ends up in the same batch:
///
/// ```
/// # use vc_codec::de::{Decode, FieldReader};
/// # use vc_graph::{FieldKey, Object, ObjectKey, PatchError, Ref};
/// struct Person { name: String, age: u8, friend: Option<Ref<Person>> }
/// # impl Object for Person {
/// #     fn type_tag(&self) -> &'static str { "Person" }
/// #     fn patch(&mut self, field: &FieldKey, target: ObjectKey) -> Result<(), PatchError> {
/// #         match field {
/// #             FieldKey::Name("friend") => self.friend = Some(Ref::from_key(target)),
/// #             _ => return Err(PatchError::UnknownField(*field)),
/// #         }
/// #         Ok(())
/// #     }
/// # }
///
/// impl Decode for Person {
///     const TYPE_TAG: &'static str = "Person";
///     const REQUIRED_FIELDS: &'static [&'static str] = &["name", "age"];
///
///     fn decode_fields(fields: &mut FieldReader<'_, '_>) -> Option<Self> {
///         let name = fields.required("name");
///         let age = fields.required("age");
///         let friend = fields.optional_reference("friend");
///         Some(Person { name: name?, age: age?, friend })
///     }
/// }
/// ```
pub trait Decode: Object + Sized {
    /// Tag of the envelopes this type is decoded from.
    ///
    /// Must be what [`Object::type_tag`] returns for every value of the type.
    const TYPE_TAG: &'static str;

    /// Fields that must be present in the envelope.
    const REQUIRED_FIELDS: &'static [&'static str] = &[];

    fn decode_fields(fields: &mut FieldReader<'_, '_>) -> Option<Self>;
}
