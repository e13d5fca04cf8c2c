//! Recursive-descent decoder for Lua 5.2 literal expressions.
//!
//! The parser walks a `&[u8]` with a single byte cursor and no token stream;
//! lexical concerns (whitespace, comments, numeric and string forms) are
//! handled by predicates that peek at the current and next byte before
//! dispatching to a sublanguage routine. The three places that need lookahead
//! (long-bracket detection after `--`, wrong-level closers inside long
//! strings, and `word =` field disambiguation) save and restore the cursor
//! around a speculative parse.

use crate::{Error, LuaMap, LuaValue, Result, LUA_KEYWORDS};
use std::borrow::Cow;

/// Maximum table nesting accepted by convenience callers (the `lua2json`
/// converter and this crate's own tests).
///
/// Setting a much larger limit risks overflowing the control stack on
/// adversarial inputs; deep tables are rejected with a syntax error instead.
pub const DEFAULT_MAX_DEPTH: u16 = 16;

/// Decodes a single Lua 5.2 literal expression into a [`LuaValue`].
///
/// The expression may be preceded and followed by whitespace and comments,
/// but nothing else. `max_depth` bounds table nesting; see
/// [`DEFAULT_MAX_DEPTH`].
///
/// ## Example
///
/// ```rust
/// use luatable::{decode, LuaValue};
///
/// let value = decode(b"{1, 2, 3}", 16).unwrap();
/// assert_eq!(value, LuaValue::Sequence(vec![1.into(), 2.into(), 3.into()]));
///
/// assert!(decode(b"print('hi')", 16).is_err());
/// ```
pub fn decode(text: &[u8], max_depth: u16) -> Result<LuaValue<'_>> {
    Parser::new(text, max_depth).parse()
}

/// Decodes a Lua 5.2 literal expression from a `&str`.
///
/// See [`decode`]; string escapes may still produce non-UTF-8 byte strings.
pub fn decode_str(text: &str, max_depth: u16) -> Result<LuaValue<'_>> {
    decode(text.as_bytes(), max_depth)
}

/// Whitespace, as Lua's lexer counts it.
const fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

const fn is_word_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

struct Parser<'a> {
    source: &'a [u8],
    index: usize,
    depth: u16,
}

impl<'a> Parser<'a> {
    fn new(source: &'a [u8], max_depth: u16) -> Self {
        Self {
            source,
            index: 0,
            depth: max_depth,
        }
    }

    // Cursor primitives. Both peeks report end of input as None.

    #[inline]
    fn current(&self) -> Option<u8> {
        self.source.get(self.index).copied()
    }

    #[inline]
    fn peek_next(&self) -> Option<u8> {
        self.source.get(self.index + 1).copied()
    }

    #[inline]
    fn advance(&mut self) {
        if self.index < self.source.len() {
            self.index += 1;
        }
    }

    #[inline]
    fn save(&self) -> usize {
        self.index
    }

    #[inline]
    fn restore(&mut self, index: usize) {
        self.index = index;
    }

    fn fail<T>(&self, message: impl Into<String>) -> Result<T> {
        Err(Error::Syntax {
            offset: self.index,
            message: message.into(),
        })
    }

    // Dispatch predicates, consulted against the current byte (and sometimes
    // the next) before committing to a sublanguage routine.

    fn number_coming(&self) -> bool {
        match self.current() {
            Some(c) if c.is_ascii_digit() => true,
            Some(b'.') => matches!(self.peek_next(), Some(c) if c.is_ascii_digit()),
            _ => false,
        }
    }

    fn short_string_coming(&self) -> bool {
        matches!(self.current(), Some(b'"' | b'\''))
    }

    fn long_string_coming(&self) -> bool {
        self.current() == Some(b'[') && matches!(self.peek_next(), Some(b'=' | b'['))
    }

    fn word_coming(&self) -> bool {
        matches!(self.current(), Some(c) if is_word_start(c))
    }

    fn table_coming(&self) -> bool {
        self.current() == Some(b'{')
    }

    fn comment_coming(&self) -> bool {
        self.current() == Some(b'-') && self.peek_next() == Some(b'-')
    }

    /// Consumes whitespace and comments until neither is next.
    fn skip_spaces(&mut self) -> Result<()> {
        loop {
            while matches!(self.current(), Some(c) if is_space(c)) {
                self.advance();
            }
            if !self.comment_coming() {
                return Ok(());
            }
            self.skip_comment()?;
        }
    }

    /// Consumes one comment. The cursor is on the first `-`.
    ///
    /// A long-bracket opener after `--` makes this a long comment whose body
    /// is a discarded long string; otherwise everything up to the next
    /// newline (or end of input) is skipped.
    fn skip_comment(&mut self) -> Result<()> {
        self.advance();
        self.advance();

        if self.current() == Some(b'[') {
            let saved = self.save();
            if let Some(level) = self.open_long_bracket() {
                return match self.long_string_body(level) {
                    Ok(_) => Ok(()),
                    Err(Error::Syntax { offset, .. }) => Err(Error::Syntax {
                        offset,
                        message: "bad long comment: unfinished long comment".into(),
                    }),
                    Err(e) => Err(e),
                };
            }
            self.restore(saved);
        }

        loop {
            match self.current() {
                None => return Ok(()),
                Some(b'\n' | b'\r') => {
                    self.skip_newline();
                    return Ok(());
                }
                Some(_) => self.advance(),
            }
        }
    }

    /// Consumes one newline, treating CRLF and LFCR as a single newline.
    /// The cursor is on a CR or LF.
    fn skip_newline(&mut self) {
        let first = self.current();
        self.advance();
        match (first, self.current()) {
            (Some(b'\r'), Some(b'\n')) | (Some(b'\n'), Some(b'\r')) => self.advance(),
            _ => {}
        }
    }

    /// Attempts to consume a long-bracket opener `[` `=`* `[`, returning its
    /// level. On mismatch returns None with the cursor left wherever the scan
    /// stopped; callers that speculate must save and restore around the call.
    fn open_long_bracket(&mut self) -> Option<usize> {
        if self.current() != Some(b'[') {
            return None;
        }
        self.advance();
        let mut level = 0;
        while self.current() == Some(b'=') {
            level += 1;
            self.advance();
        }
        if self.current() == Some(b'[') {
            self.advance();
            Some(level)
        } else {
            None
        }
    }

    /// Attempts to consume a long-bracket closer `]` `=`* `]` at exactly
    /// `level`. The cursor is on the first `]`; on mismatch it is restored.
    fn close_long_bracket(&mut self, level: usize) -> bool {
        let saved = self.save();
        self.advance();
        let mut count = 0;
        while self.current() == Some(b'=') {
            count += 1;
            self.advance();
        }
        if count == level && self.current() == Some(b']') {
            self.advance();
            true
        } else {
            self.restore(saved);
            false
        }
    }

    // Numbers.
    //
    // The leading two bytes pick the base: `0x`/`0X` means hexadecimal with a
    // binary `p` exponent, anything else decimal with a decimal `e` exponent.
    // Numbers here are non-negative; unary minus lives in parse_expression.

    fn parse_number(&mut self) -> Result<f64> {
        if self.current() == Some(b'0') && matches!(self.peek_next(), Some(b'x' | b'X')) {
            self.advance();
            self.advance();
            self.parse_hex_number()
        } else {
            self.parse_decimal_number()
        }
    }

    /// Scans the decimal form `I[.F][e[±]E]`, enforcing the digit-count rules,
    /// then converts the scanned slice with the host's float parser for a
    /// correctly-rounded result.
    fn parse_decimal_number(&mut self) -> Result<f64> {
        let start = self.index;

        let i_count = self.decimal_digit_run();
        let mut f_count = 0;
        if self.current() == Some(b'.') {
            self.advance();
            f_count = self.decimal_digit_run();
        }

        if matches!(self.current(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.current(), Some(b'+' | b'-')) {
                self.advance();
            }
            if self.decimal_digit_run() == 0 {
                return self.fail("bad number: empty exponent part");
            }
        }

        if i_count == 0 && f_count == 0 {
            return self.fail("bad number: empty integer and fraction part");
        }

        let text = &self.source[start..self.index];
        std::str::from_utf8(text)
            .ok()
            .and_then(|t| t.parse().ok())
            .map_or_else(|| self.fail("bad number: malformed number"), Ok)
    }

    /// Parses the hexadecimal form `I[.F][p[±]E]` (the `0x` prefix is already
    /// consumed) as `(I + F) × 2^E`. Exponent digits are decimal.
    fn parse_hex_number(&mut self) -> Result<f64> {
        let (i_value, i_count) = self.hex_integer_run();

        let (mut f_value, mut f_count) = (0.0, 0);
        if self.current() == Some(b'.') {
            self.advance();
            (f_value, f_count) = self.hex_fraction_run();
        }

        let mut exponent = 0i32;
        if matches!(self.current(), Some(b'p' | b'P')) {
            self.advance();
            let mut sign = 1i32;
            if matches!(self.current(), Some(b'+' | b'-')) {
                if self.current() == Some(b'-') {
                    sign = -1;
                }
                self.advance();
            }
            let mut count = 0;
            while let Some(d) = self.current().filter(u8::is_ascii_digit) {
                exponent = exponent
                    .saturating_mul(10)
                    .saturating_add(i32::from(d - b'0'));
                count += 1;
                self.advance();
            }
            if count == 0 {
                return self.fail("bad number: empty exponent part");
            }
            exponent = exponent.saturating_mul(sign);
        }

        if i_count == 0 && f_count == 0 {
            return self.fail("bad number: empty integer and fraction part");
        }

        Ok((i_value + f_value) * 2f64.powi(exponent))
    }

    /// Consumes a run of decimal digits, returning how many there were.
    fn decimal_digit_run(&mut self) -> u32 {
        let mut count = 0;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            count += 1;
            self.advance();
        }
        count
    }

    /// Consumes a run of hex digits, accumulating their integer value.
    fn hex_integer_run(&mut self) -> (f64, u32) {
        let (mut value, mut count) = (0.0f64, 0);
        while let Some(d) = self.hex_digit() {
            value = value * 16.0 + f64::from(d);
            count += 1;
            self.advance();
        }
        (value, count)
    }

    /// Consumes a run of hex digits after the point, accumulating their
    /// fractional value. Each digit is worth 16× less than the one before, so
    /// very long runs underflow to zero instead of misbehaving.
    fn hex_fraction_run(&mut self) -> (f64, u32) {
        let (mut value, mut count) = (0.0f64, 0);
        let mut scale = 1.0 / 16.0;
        while let Some(d) = self.hex_digit() {
            value += f64::from(d) * scale;
            scale /= 16.0;
            count += 1;
            self.advance();
        }
        (value, count)
    }

    fn hex_digit(&self) -> Option<u32> {
        self.current().and_then(|c| (c as char).to_digit(16))
    }

    /// Consumes up to `limit` digits in `base`, returning the accumulated
    /// value and digit count. Used by the bounded string escapes.
    fn bounded_digit_run(&mut self, base: u32, limit: u32) -> (u32, u32) {
        let (mut value, mut count) = (0u32, 0);
        while count < limit {
            let Some(d) = self.current().and_then(|c| (c as char).to_digit(base)) else {
                break;
            };
            value = value * base + d;
            count += 1;
            self.advance();
        }
        (value, count)
    }

    // Strings.

    /// Parses a short string delimited by `"` or `'`. Borrows the body from
    /// the source unless an escape sequence forces a copy.
    fn parse_short_string(&mut self) -> Result<Cow<'a, [u8]>> {
        let delimiter = self.current();
        self.advance();
        let body_start = self.index;
        let mut owned: Option<Vec<u8>> = None;

        loop {
            match self.current() {
                None => return self.fail("bad string: unfinished string"),
                Some(b'\n' | b'\r') => return self.fail("bad string: unfinished string"),
                Some(c) if Some(c) == delimiter => {
                    let end = self.index;
                    self.advance();
                    return Ok(match owned {
                        Some(buf) => Cow::Owned(buf),
                        None => Cow::Borrowed(&self.source[body_start..end]),
                    });
                }
                Some(b'\\') => {
                    let to_here = self.source[body_start..self.index].to_vec();
                    let buf = owned.get_or_insert(to_here);
                    self.advance();
                    self.parse_escape(buf)?;
                }
                Some(c) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                    self.advance();
                }
            }
        }
    }

    /// Parses one escape sequence into `out`. The cursor is just past the
    /// backslash.
    fn parse_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let Some(c) = self.current() else {
            return self.fail("bad string: unfinished string");
        };
        match c {
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'"' | b'\'' | b'\\' => out.push(c),
            b'\n' | b'\r' => {
                // escaped newline; CRLF and LFCR count as one
                self.skip_newline();
                out.push(b'\n');
                return Ok(());
            }
            b'z' => {
                // skips all following whitespace, including line breaks
                self.advance();
                while matches!(self.current(), Some(c) if is_space(c)) {
                    self.advance();
                }
                return Ok(());
            }
            b'x' => {
                self.advance();
                let (value, count) = self.bounded_digit_run(16, 2);
                if count != 2 {
                    return self.fail("bad string: needs exactly 2 hex digits");
                }
                out.push(value as u8);
                return Ok(());
            }
            b'0'..=b'9' => {
                let (value, _) = self.bounded_digit_run(10, 3);
                if value > 255 {
                    return self.fail("bad string: decimal value exceeds 255");
                }
                out.push(value as u8);
                return Ok(());
            }
            _ => return self.fail("bad string: invalid escape sequence"),
        }
        self.advance();
        Ok(())
    }

    /// Parses a long string `[=*[ … ]=*]`. The cursor is on the opening `[`.
    fn parse_long_string(&mut self) -> Result<Cow<'a, [u8]>> {
        let saved = self.save();
        let Some(level) = self.open_long_bracket() else {
            self.restore(saved);
            return self.fail("bad long string: invalid delimiter");
        };
        self.long_string_body(level)
    }

    /// Accumulates a long-string body up to the closer at `level`.
    ///
    /// A newline immediately after the opener is dropped; every newline inside
    /// the body is normalized to a single LF (which forces an owned copy when
    /// the source used CR). A `]` that does not start a closer at exactly
    /// `level` is literal. Escape sequences are not processed.
    fn long_string_body(&mut self, level: usize) -> Result<Cow<'a, [u8]>> {
        if matches!(self.current(), Some(b'\n' | b'\r')) {
            self.skip_newline();
        }
        let body_start = self.index;
        let mut owned: Option<Vec<u8>> = None;

        loop {
            match self.current() {
                None => return self.fail("bad long string: unfinished long string"),
                Some(b']') => {
                    let end = self.index;
                    if self.close_long_bracket(level) {
                        return Ok(match owned {
                            Some(buf) => Cow::Owned(buf),
                            None => Cow::Borrowed(&self.source[body_start..end]),
                        });
                    }
                    if let Some(buf) = owned.as_mut() {
                        buf.push(b']');
                    }
                    self.advance();
                }
                Some(b'\n') if self.peek_next() != Some(b'\r') => {
                    // already a bare LF, usable verbatim
                    if let Some(buf) = owned.as_mut() {
                        buf.push(b'\n');
                    }
                    self.advance();
                }
                Some(b'\n' | b'\r') => {
                    let to_here = self.source[body_start..self.index].to_vec();
                    let buf = owned.get_or_insert(to_here);
                    buf.push(b'\n');
                    self.skip_newline();
                }
                Some(c) => {
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                    self.advance();
                }
            }
        }
    }

    /// Consumes a run of word characters. The cursor is on a letter or `_`.
    fn parse_word(&mut self) -> &'a [u8] {
        let start = self.index;
        while matches!(self.current(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        &self.source[start..self.index]
    }

    // Table constructors.

    fn parse_table(&mut self) -> Result<LuaValue<'a>> {
        if self.depth == 0 {
            return self.fail("bad table: too deeply nested");
        }
        self.depth -= 1;
        let table = self.parse_table_inner();
        self.depth += 1;
        table
    }

    fn parse_table_inner(&mut self) -> Result<LuaValue<'a>> {
        self.advance();

        // Fields accumulate into one keyed table: list-style fields under
        // their 1-based position, record-style fields under their key, all in
        // source order. Nil values from list fields survive until
        // finalization.
        let mut fields = LuaMap::new();
        let mut rec = 0u32;
        let mut lst = 0u32;

        loop {
            self.skip_spaces()?;
            match self.current() {
                None => return self.fail("bad table: expect '}'"),
                Some(b'}') => {
                    self.advance();
                    break;
                }
                _ => {}
            }

            if self.record_key_coming()? {
                self.parse_record_field(&mut fields, &mut rec)?;
            } else {
                let value = self.parse_expression()?;
                lst += 1;
                if rec == 0 {
                    // positions count up from 1, so the key is always fresh
                    fields.push(LuaValue::Number(f64::from(lst)), value);
                } else {
                    fields.insert(LuaValue::Number(f64::from(lst)), value);
                }
            }

            self.skip_spaces()?;
            match self.current() {
                Some(b'}') => {} // closed by the next iteration
                Some(b',' | b';') => self.advance(),
                None => return self.fail("bad table: expect '}'"),
                Some(c) => {
                    return self.fail(format!(
                        "bad table: unexpected character '{}'",
                        c.escape_ascii()
                    ))
                }
            }
        }

        Ok(finalize_table(fields, rec))
    }

    /// Decides whether the next field is record-style: either `[` that does
    /// not open a long bracket, or a word followed (after spaces) by `=`. The
    /// word case speculatively parses and always restores the cursor.
    fn record_key_coming(&mut self) -> Result<bool> {
        match self.current() {
            Some(b'[') => Ok(!matches!(self.peek_next(), Some(b'=' | b'['))),
            Some(c) if is_word_start(c) => {
                let saved = self.save();
                self.parse_word();
                self.skip_spaces()?;
                let is_record = self.current() == Some(b'=');
                self.restore(saved);
                Ok(is_record)
            }
            _ => Ok(false),
        }
    }

    /// Parses one record-style field (`[expr] = expr` or `name = expr`) into
    /// `fields`. Fields whose value is Nil are dropped without counting.
    fn parse_record_field(&mut self, fields: &mut LuaMap<'a>, rec: &mut u32) -> Result<()> {
        let key = if self.current() == Some(b'[') {
            self.advance();
            self.skip_spaces()?;
            let key = self.parse_expression()?;
            match key {
                LuaValue::Number(_) | LuaValue::String(_) => {}
                LuaValue::Nil => return self.fail("bad table: table index is nil"),
                _ => return self.fail("bad table: table index must be a number or a string"),
            }
            self.skip_spaces()?;
            if self.current() != Some(b']') {
                return self.fail("bad table: expect ']'");
            }
            self.advance();
            key
        } else {
            let start = self.index;
            let word = self.parse_word();
            if LUA_KEYWORDS.binary_search(&word).is_ok() {
                return Err(Error::Syntax {
                    offset: start,
                    message: format!(
                        "bad word: keyword '{}' cannot be a field name",
                        word.escape_ascii()
                    ),
                });
            }
            LuaValue::String(Cow::Borrowed(word))
        };

        self.skip_spaces()?;
        if self.current() != Some(b'=') {
            return self.fail("bad table: expect '='");
        }
        self.advance();
        self.skip_spaces()?;

        let value = self.parse_expression()?;
        if !value.is_nil() {
            fields.insert(key, value);
            *rec += 1;
        }
        Ok(())
    }

    // Expressions.

    /// Parses one literal expression. The cursor is on its first byte.
    fn parse_expression(&mut self) -> Result<LuaValue<'a>> {
        if self.word_coming() {
            let start = self.index;
            return match self.parse_word() {
                b"nil" => Ok(LuaValue::Nil),
                b"true" => Ok(LuaValue::Boolean(true)),
                b"false" => Ok(LuaValue::Boolean(false)),
                word => Err(Error::Syntax {
                    offset: start,
                    message: format!("bad expression: unexpected word '{}'", word.escape_ascii()),
                }),
            };
        }
        if self.current() == Some(b'-') {
            self.advance();
            self.skip_spaces()?;
            if !self.number_coming() {
                return self.fail("bad expression: unexpected '-'");
            }
            return self.parse_number().map(|n| LuaValue::Number(-n));
        }
        if self.number_coming() {
            return self.parse_number().map(LuaValue::Number);
        }
        if self.short_string_coming() {
            return self.parse_short_string().map(LuaValue::String);
        }
        if self.long_string_coming() {
            return self.parse_long_string().map(LuaValue::String);
        }
        if self.table_coming() {
            return self.parse_table();
        }
        match self.current() {
            None => self.fail("bad expression: unexpected end of input"),
            Some(c) => self.fail(format!(
                "bad expression: unexpected character '{}'",
                c.escape_ascii()
            )),
        }
    }

    /// Top level: one expression, with only whitespace and comments around it.
    fn parse(&mut self) -> Result<LuaValue<'a>> {
        self.skip_spaces()?;
        let value = self.parse_expression()?;
        self.skip_spaces()?;
        if let Some(c) = self.current() {
            return self.fail(format!(
                "bad expression: unexpected character '{}' after expression",
                c.escape_ascii()
            ));
        }
        Ok(value)
    }
}

/// Turns an accumulated field table into a [`Sequence`][LuaValue::Sequence]
/// (no record-style fields seen) or a [`Map`][LuaValue::Map].
///
/// Nil-valued positional entries are dropped outright, so a Nil in the middle
/// of a list shortens the resulting sequence.
fn finalize_table(fields: LuaMap<'_>, rec: u32) -> LuaValue<'_> {
    if rec == 0 {
        // Keys are exactly 1..=lst in insertion order.
        let items = fields
            .into_iter()
            .map(|(_, value)| value)
            .filter(|value| !value.is_nil())
            .collect();
        LuaValue::Sequence(items)
    } else {
        let mut map = fields;
        map.retain(|_, value| !value.is_nil());
        LuaValue::Map(map)
    }
}
