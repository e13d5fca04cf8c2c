#[cfg(feature = "serde_json")]
use std::str::Utf8Error;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by [`decode`][crate::decode] and [`encode`][crate::encode].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The input text is not a single Lua literal expression followed only by
    /// whitespace and comments.
    ///
    /// The message names the sublanguage that failed (`bad number`,
    /// `bad string`, `bad long string`, `bad table`, `bad word`,
    /// `bad expression`, `bad long comment`); `offset` is the byte position of
    /// the first offending character.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// The encoder was handed a table key that is not a number or a string.
    #[error("unsupported type for table key: {0}")]
    UnsupportedKeyType(&'static str),

    /// The encoder was handed a value with no decodable literal form.
    #[error("unsupported type for value: {0}")]
    UnsupportedValueType(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "serde_json")]
/// Errors when converting Lua to JSON.
#[derive(Debug, ThisError, PartialEq)]
pub enum JsonConversionError {
    #[error("positive infinity cannot be represented in standard JSON")]
    PositiveInfinity,

    #[error("negative infinity cannot be represented in standard JSON")]
    NegativeInfinity,

    #[error("NaN cannot be represented in standard JSON")]
    NaN,

    #[error("UTF-8 encoding error: {0:?}")]
    Utf8Error(#[from] Utf8Error),

    #[error("table key cannot be converted to a JSON object key")]
    UnrepresentableKey,
}

#[cfg(feature = "serde_json")]
/// Errors when converting JSON to Lua.
#[derive(Debug, ThisError, PartialEq)]
pub enum LuaConversionError {
    #[error("JSON numbers must fit in an f64")]
    Number,
}
