#![allow(dead_code)]

use luatable::{decode, Error, LuaValue};

/// Maximum table depth for all tests. Our tests are very small!
pub const MAX_DEPTH: u16 = 16;

/// Parses a buffer of Lua and expects the given value.
pub fn check<'a>(lua: &'a [u8], expected: impl Into<LuaValue<'a>>) {
    let expected = expected.into();
    let actual = decode(lua, MAX_DEPTH)
        .unwrap_or_else(|e| panic!("parse error for {}: {e}", lua.escape_ascii()));
    assert_eq!(actual, expected, "lua: {}", lua.escape_ascii());
}

/// Parses a buffer of Lua and expects a number close to `expected`, for cases
/// where the decoder's arithmetic is allowed to round.
pub fn check_close(lua: &[u8], expected: f64) {
    let actual = decode(lua, MAX_DEPTH)
        .unwrap_or_else(|e| panic!("parse error for {}: {e}", lua.escape_ascii()));
    let actual = actual
        .as_f64()
        .unwrap_or_else(|| panic!("expected a number for {}, got {actual:?}", lua.escape_ascii()));
    let tolerance = 1e-9 * expected.abs().max(1.);
    assert!(
        (actual - expected).abs() <= tolerance,
        "lua: {}: {actual} not close to {expected}",
        lua.escape_ascii()
    );
}

/// Parses a buffer of Lua and expects a syntax error whose message contains
/// `fragment` (usually the sublanguage tag, like "bad number").
pub fn should_error(lua: &[u8], fragment: &str) {
    match decode(lua, MAX_DEPTH) {
        Ok(v) => panic!("expected error for {}, got {v:?}", lua.escape_ascii()),
        Err(Error::Syntax { message, offset }) => assert!(
            message.contains(fragment),
            "lua: {}: message {message:?} (at byte {offset}) does not contain {fragment:?}",
            lua.escape_ascii()
        ),
        Err(e) => panic!(
            "unexpected error kind for {}: {e}",
            lua.escape_ascii()
        ),
    }
}
