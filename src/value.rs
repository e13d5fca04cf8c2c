use crate::LuaMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
#[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
use static_assertions::assert_eq_size;
use std::{
    borrow::Cow,
    fmt::{Debug, Formatter},
    str::from_utf8,
};
#[cfg(feature = "serde_json")]
use std::str::Utf8Error;

/// A Lua 5.2 literal value: the tree produced by [`decode`][crate::decode] and
/// consumed by [`encode`][crate::encode].
///
/// This structure avoids owning data where possible: [the decoder][crate::decode]
/// returns a borrowed byte slice for strings that need no unescaping or newline
/// normalization.
///
/// Reference: <https://www.lua.org/manual/5.2/manual.html#2.1>
#[derive(Clone, PartialEq)]
pub enum LuaValue<'a> {
    /// Nil value. Distinct from an absent [map][LuaValue::Map] entry.
    Nil,

    /// Boolean, either `true` or `false`.
    Boolean(bool),

    /// Number. Lua 5.2 has a single real-valued number type (`f64`), with no
    /// integer subtype.
    Number(f64),

    /// Lua strings are immutable sequences of bytes.
    ///
    /// We don't attempt to turn this into a [`str`][], as escape sequences
    /// (`\xFF`, `\255`) may produce non-UTF-8 data, and long strings copy
    /// arbitrary source bytes through verbatim.
    String(Cow<'a, [u8]>),

    /// A table constructor that contained only list-style fields: an ordered
    /// sequence of non-Nil values.
    ///
    /// Lua indexes sequences from 1; this [`Vec`] is 0-indexed.
    Sequence(Vec<LuaValue<'a>>),

    /// A table constructor that contained at least one record-style field: a
    /// key→value map. Positional entries are stored under numeric keys
    /// 1, 2, … in source order.
    ///
    /// The decoder only produces [Number][LuaValue::Number] and
    /// [String][LuaValue::String] keys; the encoder rejects everything else.
    Map(LuaMap<'a>),
}

#[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
assert_eq_size!([usize; 4], LuaValue<'_>);

impl Debug for LuaValue<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "Nil"),
            Self::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f
                .debug_tuple("String")
                .field(&s.escape_ascii().to_string())
                .finish(),
            Self::Sequence(s) => f.debug_tuple("Sequence").field(s).finish(),
            Self::Map(m) => f.debug_tuple("Map").field(m).finish(),
        }
    }
}

impl<'a> LuaValue<'a> {
    /// Returns `true` for [`LuaValue::Nil`].
    #[inline]
    pub const fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    /// Returns the kind of the value as a lowercase name.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
        }
    }

    /// Returns `true` if the [`LuaValue`] is _entirely_ [borrowed][Cow::Borrowed]
    /// from the decoder's input buffer.
    ///
    /// Returns `true` for `LuaValue::String(Cow::Borrowed(_))`, `false`
    /// otherwise.
    #[inline]
    pub const fn is_borrowed(&self) -> bool {
        matches!(self, LuaValue::String(Cow::Borrowed(_)))
    }

    /// Returns the value as a `bool`, if it contains [a boolean][LuaValue::Boolean].
    ///
    /// ## Example
    ///
    /// ```rust
    /// use luatable::LuaValue;
    ///
    /// let a = LuaValue::Boolean(true);
    /// assert!(a.as_bool().unwrap());
    ///
    /// let b = LuaValue::from("hello world");
    /// assert!(b.as_bool().is_none());
    /// ```
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an `f64`, if it contains [a number][LuaValue::Number].
    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a byte slice, if it contains [a string][LuaValue::String].
    ///
    /// Lua strings may contain arbitrary binary data, with no defined encoding.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use luatable::LuaValue;
    ///
    /// let a = LuaValue::String(b"hello world".into());
    /// assert_eq!(a.as_bytes().unwrap(), b"hello world".as_slice());
    ///
    /// let b = LuaValue::Boolean(true);
    /// assert!(b.as_bytes().is_none());
    /// ```
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a string, if it contains a UTF-8-encoded
    /// [string][LuaValue::String].
    ///
    /// Returns `None` for strings that do not decode as UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => from_utf8(s).ok(),
            _ => None,
        }
    }

    /// Returns the value as a string, if it contains [a string][LuaValue::String].
    ///
    /// Data that cannot be decoded as UTF-8 is returned
    /// [lossily][String::from_utf8_lossy].
    pub fn as_str_lossy(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(String::from_utf8_lossy(s)),
            _ => None,
        }
    }

    /// Returns the value as a slice of elements, if it contains
    /// [a sequence][LuaValue::Sequence].
    #[inline]
    pub fn as_sequence(&self) -> Option<&[LuaValue<'a>]> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a [`LuaMap`], if it contains [a map][LuaValue::Map].
    #[inline]
    pub const fn as_map(&self) -> Option<&LuaMap<'a>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

macro_rules! lua_value_from_number {
    ($($ty:ty)*) => {$(
        impl From<$ty> for LuaValue<'_> {
            fn from(value: $ty) -> Self {
                Self::Number(f64::from(value))
            }
        }
    )*};
}

lua_value_from_number! { i8 i16 i32 u8 u16 u32 f32 f64 }

impl<'a> From<&'a [u8]> for LuaValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::String(value.into())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for LuaValue<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Self::String(value.as_slice().into())
    }
}

impl<'a> From<&'a str> for LuaValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::String(Cow::Borrowed(value.as_bytes()))
    }
}

impl From<String> for LuaValue<'_> {
    fn from(value: String) -> Self {
        Self::String(Cow::Owned(value.into_bytes()))
    }
}

impl From<bool> for LuaValue<'_> {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<'a> From<Vec<LuaValue<'a>>> for LuaValue<'a> {
    fn from(value: Vec<LuaValue<'a>>) -> Self {
        Self::Sequence(value)
    }
}

impl<'a> From<LuaMap<'a>> for LuaValue<'a> {
    fn from(value: LuaMap<'a>) -> Self {
        Self::Map(value)
    }
}

impl<'a, T> From<Option<T>> for LuaValue<'a>
where
    LuaValue<'a>: From<T>,
{
    fn from(value: Option<T>) -> Self {
        value.map(LuaValue::from).unwrap_or(LuaValue::Nil)
    }
}

impl<'a> FromIterator<LuaValue<'a>> for LuaValue<'a> {
    fn from_iter<T: IntoIterator<Item = LuaValue<'a>>>(iter: T) -> Self {
        LuaValue::Sequence(iter.into_iter().collect())
    }
}

/// Serializes into serde's data model: strings as `str` when they are valid
/// UTF-8 and as bytes otherwise, sequences as seqs, maps as maps.
///
/// Note that number-keyed maps are not accepted by every serde sink.
impl Serialize for LuaValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Nil => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::String(s) => match from_utf8(s) {
                Ok(s) => serializer.serialize_str(s),
                Err(_) => serializer.serialize_bytes(s),
            },
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    m.serialize_entry(key, value)?;
                }
                m.end()
            }
        }
    }
}

/// Attempts to convert a `Cow<'a, [u8]>` into a `Cow<'a, str>` while avoiding
/// copying.
#[cfg(feature = "serde_json")]
pub(crate) fn from_utf8_cow(v: Cow<'_, [u8]>) -> Result<Cow<'_, str>, Utf8Error> {
    match v {
        Cow::Borrowed(v) => from_utf8(v).map(Cow::Borrowed),
        Cow::Owned(v) => String::from_utf8(v)
            .map(Cow::Owned)
            .map_err(|e| e.utf8_error()),
    }
}

/// Lossily converts a `Cow<'a, [u8]>` into a `Cow<'a, str>` while avoiding
/// copying.
#[cfg(feature = "serde_json")]
pub(crate) fn from_utf8_cow_lossy(v: Cow<'_, [u8]>) -> Cow<'_, str> {
    match v {
        Cow::Borrowed(v) => String::from_utf8_lossy(v),
        Cow::Owned(v) => Cow::Owned(String::from_utf8_lossy(&v).into_owned()),
    }
}
