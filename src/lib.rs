//! `luatable` is a bidirectional codec between Lua 5.2 table-constructor
//! source text and a plain, language-neutral value tree, _without requiring
//! Lua itself_.
//!
//! The goal is to safely read configuration and state from software (mostly
//! games) that persists data as Lua table literals, and to write such data
//! back, without allowing arbitrary code execution.
//!
//! This library consists of four parts:
//!
//! - A [`LuaValue`] `enum` describing Lua's literal data types
//!   ([`nil`][LuaValue::Nil], [boolean][LuaValue::Boolean],
//!   [number][LuaValue::Number], [string][LuaValue::String]) plus the two
//!   shapes a table constructor can take ([`Sequence`][LuaValue::Sequence]
//!   and [`Map`][LuaValue::Map]), with [`LuaMap`] as the map container.
//!
//! - [A recursive-descent decoder][decode] from `&[u8]` (containing one Lua
//!   literal expression) to a [`LuaValue`].
//!
//! - [An encoder][encode] from a [`LuaValue`] back to Lua source text that
//!   [`decode`] accepts.
//!
//! - _Optional_ [converters to][to_json_value] and [from][from_json_value]
//!   `serde_json`'s `Value` type, and the `lua2json` batch converter built on
//!   them.
//!
//! ## Examples
//!
//! Decode a bare Lua table constructor:
//!
//! ```rust
//! use luatable::{decode, LuaValue};
//!
//! let value = decode(b"{'a', 'b', 'c'}", /* max table depth */ 16).unwrap();
//! assert_eq!(
//!     value,
//!     LuaValue::Sequence(vec!["a".into(), "b".into(), "c".into()]),
//! );
//! ```
//!
//! A table with record-style fields decodes to a [`LuaMap`] keyed by numbers
//! and strings:
//!
//! ```rust
//! use luatable::{decode, LuaMap, LuaValue};
//!
//! let value = decode(b"{x = 1, [2] = 'two'}", 16).unwrap();
//! let expected: LuaMap = [
//!     (LuaValue::from("x"), LuaValue::from(1)),
//!     (LuaValue::from(2), LuaValue::from("two")),
//! ]
//! .into_iter()
//! .collect();
//! assert_eq!(value, LuaValue::Map(expected));
//! ```
//!
//! Encode produces text the decoder accepts:
//!
//! ```rust
//! use luatable::{decode, encode, LuaValue};
//!
//! let value = LuaValue::Sequence(vec![1.into(), 2.into(), 3.into()]);
//! let text = encode(&value).unwrap();
//! assert_eq!(text, "{1,2,3,}");
//! assert_eq!(decode(text.as_bytes(), 16).unwrap(), value);
//! ```
//!
//! ## Data model
//!
//! | Lua 5.2 type | [`LuaValue`] variant | Notes |
//! | ------------ | -------------------- | ----- |
//! | `nil`     | [`LuaValue::Nil`][]      | distinct from an absent map entry |
//! | `boolean` | [`LuaValue::Boolean`][]  | |
//! | `number`  | [`LuaValue::Number`][]   | a single `f64` kind; Lua 5.2 has no integer subtype |
//! | `string`  | [`LuaValue::String`][]   | bytes, not necessarily UTF-8 |
//! | `table`   | [`LuaValue::Sequence`][] | constructor with list-style fields only |
//! | `table`   | [`LuaValue::Map`][]      | constructor with at least one record-style field |
//!
//! A table constructor becomes a [`Sequence`][LuaValue::Sequence] if and only
//! if it contains no record-style fields; otherwise it becomes a
//! [`Map`][LuaValue::Map] whose positional entries are stored under numeric
//! keys 1, 2, … in source order. Nil-valued entries are dropped in both
//! shapes, and duplicate keys resolve to the last assignment, as in Lua.
//!
//! ## Security
//!
//! Loading serialized data with Lua's own `load()` or `require()` allows
//! arbitrary code execution, so neither is safe with untrusted inputs — the
//! same reason JavaScript code uses `JSON.parse()` instead of `eval()`. Even a
//! sandboxed `load()` lets an attacker burn arbitrary CPU and memory:
//!
//! ```lua
//! (function() x={};for a=1,100000000 do x[a]=a end;return x;end)()
//! ```
//!
//! `luatable` addresses this risk by implementing only Lua's literal syntax,
//! so anything containing code is a syntax error:
//!
//! ```rust
//! use luatable::decode;
//!
//! // This would cause Lua to read a local file:
//! let input = b"(function() f=io.open('/etc/passwd');return f:read('a');end)()";
//! // But it's a syntax error here.
//! assert!(decode(input, 16).is_err());
//! ```
//!
//! ## Maximum table depth
//!
//! The `max_depth` argument to [`decode`] bounds how deeply tables may nest
//! before the input is rejected with a syntax error. Recursion depth — and so
//! control-stack use — is proportional to this limit; setting it very high
//! allows a heavily-nested input to crash your program with a stack overflow.
//! [`DEFAULT_MAX_DEPTH`] is plenty for configuration-like data.

mod error;
mod generator;
#[cfg(feature = "serde_json")]
mod json;
mod parser;
mod table;
mod value;

pub use crate::{
    error::{Error, Result},
    generator::{encode, to_vec, to_writer},
    parser::{decode, decode_str, DEFAULT_MAX_DEPTH},
    table::LuaMap,
    value::LuaValue,
};

#[cfg(feature = "serde_json")]
pub use crate::{
    error::{JsonConversionError, LuaConversionError},
    json::{from_json_value, to_json_value, JsonConversionOptions},
};

/// Sorted list of Lua keywords, which cannot be used as field names.
///
/// Reference: <https://www.lua.org/manual/5.2/manual.html#3.1>
const LUA_KEYWORDS: [&[u8]; 22] = [
    b"and",
    b"break",
    b"do",
    b"else",
    b"elseif",
    b"end",
    b"false",
    b"for",
    b"function",
    b"goto",
    b"if",
    b"in",
    b"local",
    b"nil",
    b"not",
    b"or",
    b"repeat",
    b"return",
    b"then",
    b"true",
    b"until",
    b"while",
];
