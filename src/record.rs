//! Schema description of a configurable record.
//!
//! Sources never inspect a record through runtime type information. Instead a
//! record describes itself: [`Record::schema`] lists its fields in declaration
//! order with their tags, and [`Record::fields_mut`] hands out one typed
//! mutable accessor per field in the same order. The [`record!`](crate::record!)
//! macro writes both for a plain struct.
//!
//! ```ignore
//! #[derive(Default, Serialize, Deserialize)]
//! struct Server {
//!     #[serde(rename = "listen_addr")]
//!     listen: String,
//!     port: u16,
//!     tls: Tls,
//! }
//!
//! multiconfig::record! {
//!     Server {
//!         listen(json = "listen_addr", arg = "bind", usage = "address to bind"),
//!         port(json = "port"),
//!         tls: record,
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::num::TryFromIntError;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Name/value annotations attached to a field at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tags(&'static [(&'static str, &'static str)]);

impl Tags {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Tags(pairs)
    }

    /// Value of `key`, distinguishing an absent tag from an empty one.
    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Value of `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &'static str {
        self.lookup(key).unwrap_or("")
    }
}

/// Static description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field's identifier as declared.
    pub ident: &'static str,
    pub tags: Tags,
    /// Unexported fields are invisible to every source.
    pub exported: bool,
}

impl FieldSpec {
    pub const fn new(
        ident: &'static str,
        tags: &'static [(&'static str, &'static str)],
        exported: bool,
    ) -> Self {
        FieldSpec {
            ident,
            tags: Tags::new(tags),
            exported,
        }
    }

    /// Whether the field consumes positional command-line tokens.
    pub fn is_positional(&self) -> bool {
        self.tags.get("argtype") == "positional"
    }
}

macro_rules! int_slot {
    ($(#[$meta:meta])* $name:ident, $wide:ty { $($variant:ident($t:ty)),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub enum $name<'a> {
            $($variant(&'a mut $t)),*
        }

        impl $name<'_> {
            pub fn bits(&self) -> u32 {
                match self {
                    $(Self::$variant(_) => <$t>::BITS),*
                }
            }

            pub fn get(&self) -> $wide {
                match self {
                    $(Self::$variant(v) => **v as $wide),*
                }
            }

            /// Store `value`, failing instead of truncating when it does not fit.
            pub fn set(&mut self, value: $wide) -> Result<(), TryFromIntError> {
                match self {
                    $(Self::$variant(v) => **v = <$t>::try_from(value)?),*
                }
                Ok(())
            }
        }
    };
}

int_slot!(
    /// Mutable access to a signed integer field of any width.
    SignedMut, i64 { I8(i8), I16(i16), I32(i32), I64(i64), Isize(isize) }
);

int_slot!(
    /// Mutable access to an unsigned integer field of any width.
    UnsignedMut, u64 { U8(u8), U16(u16), U32(u32), U64(u64), Usize(usize) }
);

/// Mutable access to a floating point field.
#[derive(Debug)]
pub enum FloatMut<'a> {
    F32(&'a mut f32),
    F64(&'a mut f64),
}

impl FloatMut<'_> {
    pub fn bits(&self) -> u32 {
        match self {
            FloatMut::F32(_) => 32,
            FloatMut::F64(_) => 64,
        }
    }

    pub fn get(&self) -> f64 {
        match self {
            FloatMut::F32(v) => f64::from(**v),
            FloatMut::F64(v) => **v,
        }
    }

    /// True when a finite `value` has a magnitude the field cannot represent.
    pub fn overflows(&self, value: f64) -> bool {
        match self {
            FloatMut::F32(_) => value.is_finite() && value.abs() > f64::from(f32::MAX),
            FloatMut::F64(_) => false,
        }
    }

    pub fn set(&mut self, value: f64) {
        match self {
            FloatMut::F32(v) => **v = value as f32,
            FloatMut::F64(v) => **v = value,
        }
    }
}

/// A value that is assigned atomically as a JSON document.
pub trait Composite {
    fn to_json(&self) -> serde_json::Result<String>;

    /// Replace the whole value with the decoded document.
    fn set_json(&mut self, text: &str) -> serde_json::Result<()>;

    /// Whether the value is an ordered sequence of text.
    fn is_text_list(&self) -> bool;

    /// The value as an ordered sequence of text, if that is its shape.
    fn as_text_list(&mut self) -> Option<&mut Vec<String>>;
}

impl<T> Composite for T
where
    T: Serialize + DeserializeOwned + Any,
{
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn set_json(&mut self, text: &str) -> serde_json::Result<()> {
        *self = serde_json::from_str(text)?;
        Ok(())
    }

    fn is_text_list(&self) -> bool {
        (self as &dyn Any).is::<Vec<String>>()
    }

    fn as_text_list(&mut self) -> Option<&mut Vec<String>> {
        (self as &mut dyn Any).downcast_mut::<Vec<String>>()
    }
}

/// Typed mutable accessor for one field.
pub enum FieldMut<'a> {
    Signed(SignedMut<'a>),
    Unsigned(UnsignedMut<'a>),
    Float(FloatMut<'a>),
    Bool(&'a mut bool),
    Text(&'a mut String),
    Seq(&'a mut dyn Composite),
    Map(&'a mut dyn Composite),
    Record(&'a mut dyn Record),
    /// A field no source knows how to assign. Walking into one is an error.
    Unsupported(&'static str),
}

impl FieldMut<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldMut::Signed(_) => "signed integer",
            FieldMut::Unsigned(_) => "unsigned integer",
            FieldMut::Float(_) => "float",
            FieldMut::Bool(_) => "bool",
            FieldMut::Text(_) => "string",
            FieldMut::Seq(_) => "sequence",
            FieldMut::Map(_) => "map",
            FieldMut::Record(_) => "record",
            FieldMut::Unsupported(kind) => *kind,
        }
    }
}

impl fmt::Debug for FieldMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMut::Signed(v) => fmt::Debug::fmt(v, f),
            FieldMut::Unsigned(v) => fmt::Debug::fmt(v, f),
            FieldMut::Float(v) => fmt::Debug::fmt(v, f),
            FieldMut::Bool(v) => write!(f, "Bool({v})"),
            FieldMut::Text(v) => write!(f, "Text({v:?})"),
            other => write!(f, "FieldMut({})", other.kind_name()),
        }
    }
}

/// A nested structure whose fields sources can populate.
pub trait Record {
    /// Field descriptions in declaration order.
    fn schema(&self) -> &'static [FieldSpec];

    /// One accessor per entry of [`schema`](Record::schema), same order.
    fn fields_mut(&mut self) -> Vec<FieldMut<'_>>;
}

/// Types that can appear as a leaf field of a [`Record`].
pub trait Field {
    fn field_mut(&mut self) -> FieldMut<'_>;
}

macro_rules! numeric_fields {
    ($outer:ident, $slot:ident { $($t:ty => $variant:ident),* $(,)? }) => {
        $(
            impl Field for $t {
                fn field_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::$outer($slot::$variant(self))
                }
            }
        )*
    };
}

numeric_fields!(Signed, SignedMut { i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize });
numeric_fields!(Unsigned, UnsignedMut { u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize });
numeric_fields!(Float, FloatMut { f32 => F32, f64 => F64 });

impl Field for bool {
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Bool(self)
    }
}

impl Field for String {
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Text(self)
    }
}

impl<T: 'static> Field for Vec<T>
where
    Self: Composite,
{
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Seq(self)
    }
}

impl<T: 'static> Field for VecDeque<T>
where
    Self: Composite,
{
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Seq(self)
    }
}

impl<K: 'static, V: 'static> Field for HashMap<K, V>
where
    Self: Composite,
{
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Map(self)
    }
}

impl<K: 'static, V: 'static> Field for BTreeMap<K, V>
where
    Self: Composite,
{
    fn field_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Map(self)
    }
}

/// Implement [`Record`] for a struct from a compact field list.
///
/// Each entry is a field identifier, optionally followed by `: record` (a
/// nested record, walked recursively) or `: private` (never visited), and an
/// optional parenthesized tag list such as `(json = "port", usage = "...")`.
/// Entries must be listed in the struct's declaration order.
#[macro_export]
macro_rules! record {
    (@slot record; $place:expr) => {
        $crate::FieldMut::Record($place)
    };
    (@slot private; $place:expr) => {
        $crate::FieldMut::Unsupported("unexported field")
    };
    (@slot ; $place:expr) => {
        $crate::Field::field_mut($place)
    };
    (@exported private) => {
        false
    };
    (@exported $($kind:ident)?) => {
        true
    };
    ($ty:ty {
        $(
            $field:ident $( : $kind:ident )? $( ( $( $key:ident = $val:literal ),* $(,)? ) )?
        ),* $(,)?
    }) => {
        impl $crate::Record for $ty {
            fn schema(&self) -> &'static [$crate::FieldSpec] {
                const FIELDS: &[$crate::FieldSpec] = &[
                    $(
                        $crate::FieldSpec::new(
                            stringify!($field),
                            &[ $( $( (stringify!($key), $val) ),* )? ],
                            $crate::record!(@exported $($kind)?),
                        )
                    ),*
                ];
                FIELDS
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<$crate::FieldMut<'_>> {
                ::std::vec![
                    $( $crate::record!(@slot $($kind)?; &mut self.$field) ),*
                ]
            }
        }
    };
}
