//! Encoder from [`LuaValue`] trees back to Lua literal text.
//!
//! The output is a single expression with no whitespace or comments, always
//! re-decodable by [`decode`][crate::decode]. Map keys are always written in
//! the bracketed `[key]=` form, and table fields always end with a separator
//! (the trailing separator is valid Lua).

use crate::{Error, LuaValue, Result};
use std::io;

/// Encodes a [`LuaValue`] as a Lua literal expression.
///
/// Fails with [`Error::UnsupportedKeyType`] on a map key that is not a number
/// or a string, and with [`Error::UnsupportedValueType`] on NaN (which has no
/// literal form).
///
/// ## Example
///
/// ```rust
/// use luatable::{encode, LuaValue};
///
/// let value = LuaValue::Sequence(vec![1.into(), "two".into()]);
/// assert_eq!(encode(&value).unwrap(), r#"{1,"two",}"#);
/// ```
pub fn encode(value: &LuaValue<'_>) -> Result<String> {
    let buf = to_vec(value)?;
    // from_utf8 cannot fail, the encoder emits only ASCII
    Ok(String::from_utf8(buf).expect("encoder emitted non-ASCII"))
}

/// Encodes a [`LuaValue`] as Lua literal text into a byte buffer.
pub fn to_vec(value: &LuaValue<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

/// Encodes a [`LuaValue`] as Lua literal text into a writer.
pub fn to_writer<W: io::Write>(mut writer: W, value: &LuaValue<'_>) -> Result<()> {
    write_value(&mut writer, value)
}

fn write_value<W: io::Write>(writer: &mut W, value: &LuaValue<'_>) -> Result<()> {
    match value {
        LuaValue::Nil => writer.write_all(b"nil")?,
        LuaValue::Boolean(true) => writer.write_all(b"true")?,
        LuaValue::Boolean(false) => writer.write_all(b"false")?,
        LuaValue::Number(n) => write_number(writer, *n)?,
        LuaValue::String(s) => write_string(writer, s)?,
        LuaValue::Sequence(items) => {
            writer.write_all(b"{")?;
            for item in items {
                write_value(writer, item)?;
                writer.write_all(b",")?;
            }
            writer.write_all(b"}")?;
        }
        LuaValue::Map(map) => {
            writer.write_all(b"{")?;
            for (key, value) in map {
                match key {
                    LuaValue::Number(_) | LuaValue::String(_) => {}
                    other => return Err(Error::UnsupportedKeyType(other.type_name())),
                }
                writer.write_all(b"[")?;
                write_value(writer, key)?;
                writer.write_all(b"]=")?;
                write_value(writer, value)?;
                writer.write_all(b",")?;
            }
            writer.write_all(b"}")?;
        }
    }
    Ok(())
}

fn write_number<W: io::Write>(writer: &mut W, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(Error::UnsupportedValueType("NaN"));
    }
    if value.is_infinite() {
        // overflows back to an infinity when decoded
        let text: &[u8] = if value > 0. { b"1e9999" } else { b"-1e9999" };
        writer.write_all(text)?;
        return Ok(());
    }
    writer.write_all(value.to_string().as_bytes())?;
    Ok(())
}

/// Writes a string as a double-quoted literal, escaping byte by byte.
///
/// Runs of unescaped bytes are written in one call; escaped bytes become
/// `\` + mnemonic, and bytes with no mnemonic that aren't printable ASCII
/// become `\x` + exactly two lowercase hex digits (the decoder accepts no
/// other width).
fn write_string<W: io::Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    static HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";

    writer.write_all(b"\"")?;
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let escape = ESCAPE[byte as usize];
        if escape == __ {
            continue;
        }
        if start < i {
            writer.write_all(&bytes[start..i])?;
        }
        if escape == XX {
            writer.write_all(&[
                b'\\',
                b'x',
                HEX_DIGITS[(byte >> 4) as usize],
                HEX_DIGITS[(byte & 0xF) as usize],
            ])?;
        } else {
            writer.write_all(&[b'\\', escape])?;
        }
        start = i + 1;
    }
    if start < bytes.len() {
        writer.write_all(&bytes[start..])?;
    }
    writer.write_all(b"\"")?;
    Ok(())
}

const AA: u8 = b'a'; // \x07
const BB: u8 = b'b'; // \x08
const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const VV: u8 = b'v'; // \x0B
const FF: u8 = b'f'; // \x0C
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const SQ: u8 = b'\''; // \x27
const BS: u8 = b'\\'; // \x5C
const XX: u8 = b'x'; // everything not printable and without a mnemonic
const __: u8 = 0;

// Lookup table of escape sequences. A value of b'x' at index i means that
// byte i is escaped as "\x" followed by its hex value. A value of 0 means
// that byte i is written as-is.
static ESCAPE: [u8; 256] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    XX, XX, XX, XX, XX, XX, XX, AA, BB, TT, NN, VV, FF, RR, XX, XX, // 0
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 1
    __, __, QU, __, __, __, __, SQ, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, XX, // 7
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 8
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 9
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // A
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // B
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // C
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // D
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // E
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // F
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::LuaMap;

    fn enc(value: impl Into<LuaValue<'static>>) -> String {
        encode(&value.into()).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!("nil", encode(&LuaValue::Nil).unwrap());
        assert_eq!("true", enc(true));
        assert_eq!("false", enc(false));
        assert_eq!("0", enc(0));
        assert_eq!("3", enc(3));
        assert_eq!("-3.25", enc(-3.25));
        assert_eq!("1e9999", enc(f64::INFINITY));
        assert_eq!("-1e9999", enc(f64::NEG_INFINITY));
    }

    #[test]
    fn strings() {
        assert_eq!(r#""""#, enc(""));
        assert_eq!(r#""alo""#, enc("alo"));
        assert_eq!(r#""alo\n123\"""#, enc("alo\n123\""));
        assert_eq!(r#""\a\b\t\v\f\r\'\\""#, enc("\x07\x08\t\x0b\x0c\r'\\"));
        assert_eq!(r#""\x00\x01\x1f\x7f\xff""#, enc(b"\x00\x01\x1f\x7f\xff"));
        // space is printable, everything around it passes through
        assert_eq!(r#""a b!~""#, enc("a b!~"));
    }

    #[test]
    fn containers() {
        assert_eq!("{}", encode(&LuaValue::Sequence(vec![])).unwrap());
        assert_eq!(
            r#"{1,"two",nil,}"#,
            encode(&LuaValue::Sequence(vec![
                1.into(),
                "two".into(),
                LuaValue::Nil
            ]))
            .unwrap()
        );

        let map: LuaMap = [("x", LuaValue::from(1))].into_iter().collect();
        assert_eq!(r#"{["x"]=1,}"#, encode(&LuaValue::Map(map)).unwrap());
    }

    #[test]
    fn unsupported() {
        assert!(matches!(
            encode(&LuaValue::Number(f64::NAN)),
            Err(Error::UnsupportedValueType("NaN"))
        ));

        let map: LuaMap = [(LuaValue::Nil, LuaValue::from(1))].into_iter().collect();
        assert!(matches!(
            encode(&LuaValue::Map(map)),
            Err(Error::UnsupportedKeyType("nil"))
        ));

        let map: LuaMap = [(LuaValue::Boolean(true), LuaValue::from(1))]
            .into_iter()
            .collect();
        assert!(matches!(
            encode(&LuaValue::Map(map)),
            Err(Error::UnsupportedKeyType("boolean"))
        ));
    }
}
