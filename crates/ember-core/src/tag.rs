//! The closed type-tag set that drives destructor dispatch.

/// Discriminates the payload shape stored after a heap object's header.
///
/// The numeric values are part of the stable ABI (`header().type_tag`) and
/// must never be renumbered; new variants may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeTag {
    /// Boxed `i64`.
    Int = 1,
    /// Boxed `f64`.
    Float = 2,
    /// Boxed `bool`.
    Bool = 3,
    /// `{data, length}` string view; data is not owned by the runtime.
    String = 4,
    /// `{len, items}` fixed-arity tuple.
    Tuple = 5,
    /// `{field_count, values}` record with canonicalized field order.
    Record = 6,
    /// `{env, code}` closure.
    Closure = 7,
    /// `{tag, payload}` algebraic data type.
    Adt = 8,
    /// `{len, capacity, items}` persistent pointer-identity set.
    Set = 9,
    /// Boxed Unicode scalar value.
    Char = 10,
    /// `{len, items}` array, same shape as tuple.
    Array = 11,
}

impl TypeTag {
    /// Returns the raw `u32` tag value stored in an object's header.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for TypeTag {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TypeTag::Int),
            2 => Ok(TypeTag::Float),
            3 => Ok(TypeTag::Bool),
            4 => Ok(TypeTag::String),
            5 => Ok(TypeTag::Tuple),
            6 => Ok(TypeTag::Record),
            7 => Ok(TypeTag::Closure),
            8 => Ok(TypeTag::Adt),
            9 => Ok(TypeTag::Set),
            10 => Ok(TypeTag::Char),
            11 => Ok(TypeTag::Array),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_numbering_matches_abi() {
        assert_eq!(TypeTag::Int.as_u32(), 1);
        assert_eq!(TypeTag::Float.as_u32(), 2);
        assert_eq!(TypeTag::Bool.as_u32(), 3);
        assert_eq!(TypeTag::String.as_u32(), 4);
        assert_eq!(TypeTag::Tuple.as_u32(), 5);
        assert_eq!(TypeTag::Record.as_u32(), 6);
        assert_eq!(TypeTag::Closure.as_u32(), 7);
        assert_eq!(TypeTag::Adt.as_u32(), 8);
        assert_eq!(TypeTag::Set.as_u32(), 9);
        assert_eq!(TypeTag::Char.as_u32(), 10);
        assert_eq!(TypeTag::Array.as_u32(), 11);
    }

    #[test]
    fn round_trips_through_try_from() {
        for raw in 1u32..=11 {
            let tag = TypeTag::try_from(raw).unwrap();
            assert_eq!(tag.as_u32(), raw);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(TypeTag::try_from(0).is_err());
        assert!(TypeTag::try_from(12).is_err());
        assert!(TypeTag::try_from(u32::MAX).is_err());
    }
}
