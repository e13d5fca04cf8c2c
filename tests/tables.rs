//! Table constructor tests: the sequence/map duality, field forms, and
//! finalization rules.
mod common;

use crate::common::{check, should_error, MAX_DEPTH};
use luatable::{decode, LuaValue};

fn map<'a>(entries: impl IntoIterator<Item = (LuaValue<'a>, LuaValue<'a>)>) -> LuaValue<'a> {
    LuaValue::Map(entries.into_iter().collect())
}

fn seq<'a>(items: impl IntoIterator<Item = LuaValue<'a>>) -> LuaValue<'a> {
    LuaValue::Sequence(items.into_iter().collect())
}

#[test]
fn empty_table() {
    // no record-style fields, so an empty table is an empty sequence
    check(b"{}", seq([]));
    check(b"{ --[[nothing]] }", seq([]));
}

#[test]
fn sequences() {
    check(b"{1, 2, 3}", seq([1.into(), 2.into(), 3.into()]));
    check(b"{true, false}", seq([true.into(), false.into()]));
    check(
        b"{'a', \"b\", [[c]]}",
        seq(["a".into(), "b".into(), "c".into()]),
    );
    check(
        b"{{1}, {2}}",
        seq([seq([1.into()]), seq([2.into()])]),
    );

    check(
        b"{\"Sunday\",\"Monday\",\"Tuesday\",\"Wednesday\",\"Thursday\",\"Friday\",\"Saturday\"}",
        seq([
            "Sunday".into(),
            "Monday".into(),
            "Tuesday".into(),
            "Wednesday".into(),
            "Thursday".into(),
            "Friday".into(),
            "Saturday".into(),
        ]),
    );
}

#[test]
fn separators() {
    // ',' and ';' are interchangeable, and one may trail
    check(b"{1, 2; 3}", seq([1.into(), 2.into(), 3.into()]));
    check(b"{1; 2; 3;}", seq([1.into(), 2.into(), 3.into()]));
    check(b"{1, 2, 3,}", seq([1.into(), 2.into(), 3.into()]));
    check(b"{1,}", seq([1.into()]));
    check(b"{x = 1;}", map([("x".into(), 1.into())]));
}

#[test]
fn record_fields() {
    check(b"{x = 1}", map([("x".into(), 1.into())]));
    check(b"{['x'] = 1}", map([("x".into(), 1.into())]));
    check(b"{[\"x\"] = 1}", map([("x".into(), 1.into())]));
    check(b"{[ [[x]] ] = 1}", map([("x".into(), 1.into())]));
    check(b"{[30] = 23}", map([(30.into(), 23.into())]));
    check(b"{[1.5] = 'half'}", map([(1.5.into(), "half".into())]));
    check(b"{[-1] = 'neg'}", map([((-1).into(), "neg".into())]));

    // underscores and digits are fine in names
    check(b"{_x2 = true}", map([("_x2".into(), true.into())]));

    // a word key that merely starts with a keyword is a name
    check(b"{ifx = 1}", map([("ifx".into(), 1.into())]));
}

#[test]
fn mixed_tables() {
    // one record-style field makes the whole table a map, with positional
    // entries stored under numeric keys in source order
    let expected = map([
        ("f(1)".into(), "g".into()),
        (1.into(), "x".into()),
        (2.into(), "y".into()),
        ("x".into(), 1.into()),
        (3.into(), "f(x)".into()),
        (30.into(), 23.into()),
        (4.into(), 45.into()),
    ]);
    let input = br#"{ ["f(1)"] = "g"; "x", "y"; x = 1, "f(x)", [30] = 23; 45 }"#;
    check(input, expected);

    // entries appear in source order
    let decoded = decode(input, MAX_DEPTH).unwrap();
    let keys: Vec<LuaValue> = decoded.as_map().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "f(1)".into(),
            1.into(),
            2.into(),
            "x".into(),
            3.into(),
            30.into(),
            4.into(),
        ],
    );
}

#[test]
fn nil_elision() {
    // nil positional entries shorten the sequence
    check(b"{nil}", seq([]));
    check(b"{1, nil, 3}", seq([1.into(), 3.into()]));
    check(b"{1, 2, nil}", seq([1.into(), 2.into()]));

    // a record field bound to nil is dropped entirely
    check(b"{x = nil}", seq([]));
    check(
        b"{kikyo = true, inuyasha = nil, kagome = false}",
        map([("kikyo".into(), true.into()), ("kagome".into(), false.into())]),
    );
    check(b"{[30] = nil, 1}", seq([1.into()]));

    // dropped before assignment, so the earlier binding survives
    check(b"{x = 1, x = nil}", map([("x".into(), 1.into())]));

    // nil positional entries of a map are elided too
    check(
        b"{nil, y = 2}",
        map([("y".into(), 2.into())]),
    );
}

#[test]
fn duplicate_keys() {
    // the last assignment wins
    check(b"{x = 1, x = 2}", map([("x".into(), 2.into())]));
    check(b"{['x'] = 1, x = 2}", map([("x".into(), 2.into())]));
    check(b"{[1] = 'a', 'b'}", map([(1.into(), "b".into())]));
    check(b"{'a', [1] = 'b'}", map([(1.into(), "b".into())]));
}

#[test]
fn nested() {
    let input = br#"{
        list = {
            3141.6e-3,              -- decimal floating-point expression
            0xA23p-4;               -- binary floating-point expression
            '\97lo\10\04923"',                  -- single-quoted string
            "\x61\x6c\x6f\x0a123\x22",          -- double-quoted string
            [==[
alo
123"]==],                               -- multi-line string
        },
        dict = {
            [ [[kikyo]]] = true,                -- long string as key
            ["kagome"] = false,                 -- short string as key
            inuyasha = nil;                     --[[ name as key
                                                     will be ignored ]]
            19961113.E-4,               -- positive, empty fraction part
            -.20080618e4,               -- negative, empty integer part
        }
    }"#;

    let alo = LuaValue::from(b"alo\n123\"");
    let expected = map([
        (
            "list".into(),
            seq([
                3.1416.into(),
                162.1875.into(),
                alo.clone(),
                alo.clone(),
                alo,
            ]),
        ),
        (
            "dict".into(),
            map([
                ("kikyo".into(), true.into()),
                ("kagome".into(), false.into()),
                (1.into(), 1996.1113.into()),
                (2.into(), (-2008.0618).into()),
            ]),
        ),
    ]);
    check(input, expected);
}

#[test]
fn field_classification() {
    // a bare word is not a valid expression
    should_error(b"{x}", "bad expression");
    should_error(b"{x, y = 1}", "bad expression");

    // a long string is a list field, not a record key
    check(b"{[[x]]}", seq(["x".into()]));
    check(b"{[=[x]=]}", seq(["x".into()]));
}

#[test]
fn bad_tables() {
    should_error(b"{", "bad table: expect '}'");
    should_error(b"{1", "bad table: expect '}'");
    should_error(b"{1,", "bad table: expect '}'");
    should_error(b"{1 2}", "bad table");
    should_error(b"{,}", "bad expression");
    should_error(b"{;}", "bad expression");
    should_error(b"{1 = 2}", "bad table");

    should_error(b"{[nil] = 1}", "bad table: table index is nil");
    should_error(b"{[true] = 1}", "bad table: table index must be a number or a string");
    should_error(b"{[{}] = 1}", "bad table: table index must be a number or a string");

    should_error(b"{[1 = 2}", "bad table: expect ']'");
    should_error(b"{[1]: 2}", "bad table: expect '='");
    should_error(b"{x : 2}", "bad expression");

    // keywords cannot be field names
    should_error(b"{if = 1}", "bad word");
    should_error(b"{true = 1}", "bad word");
    should_error(b"{nil = 1}", "bad word");
}

#[test]
fn depth_limit() {
    let deep = |n: usize| [vec![b'{'; n], vec![b'}'; n]].concat();

    assert!(decode(&deep(16), 16).is_ok());
    should_error(&deep(17), "bad table: too deeply nested");

    // a depth of zero rejects even an empty table
    assert!(decode(b"{}", 0).is_err());
    assert!(decode(b"true", 0).is_ok());
}
