//! # Element Types
//!
//! The numeric types a column may hold, and the Rust types that can view them.

use std::fmt;
use std::str::FromStr;

use bytemuck::Pod;

/// Element type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 8-bit integer, clamped on conversion.
    U8Clamped,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Entity handle (unsigned 32-bit).
    Eid,
}

impl FieldType {
    /// Every element type, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::I8,
        Self::U8,
        Self::U8Clamped,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::F32,
        Self::F64,
        Self::Eid,
    ];

    /// Size of one element in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::I8 | Self::U8 | Self::U8Clamped => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Eid => 4,
            Self::F64 => 8,
        }
    }

    /// Short name used in schema declarations.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "ui8",
            Self::U8Clamped => "ui8c",
            Self::I16 => "i16",
            Self::U16 => "ui16",
            Self::I32 => "i32",
            Self::U32 => "ui32",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Eid => "eid",
        }
    }

    /// Position of this type in [`FieldType::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or(())
    }
}

/// Rust type that can view a column of one or more [`FieldType`]s.
pub trait Element: Pod {
    /// Field types this Rust type can view.
    const FIELD_TYPES: &'static [FieldType];
    /// Name used in error messages.
    const NAME: &'static str;
}

macro_rules! impl_element {
    ($($ty:ty => [$($field:ident),+]),+ $(,)?) => {
        $(
            impl Element for $ty {
                const FIELD_TYPES: &'static [FieldType] = &[$(FieldType::$field),+];
                const NAME: &'static str = stringify!($ty);
            }
        )+
    };
}

impl_element! {
    i8 => [I8],
    u8 => [U8, U8Clamped],
    i16 => [I16],
    u16 => [U16],
    i32 => [I32],
    u32 => [U32, Eid],
    f32 => [F32],
    f64 => [F64],
}
