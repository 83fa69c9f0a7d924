use bencode_core::{parse, parse_with, Bencode, BencodeError, Kind, Options};

/// Helper: parse input that must hold exactly one value.
fn parse_one(raw: &[u8]) -> Bencode {
    parse(raw)
        .unwrap_or_else(|err| panic!("parse failed for {:?}: {err}", String::from_utf8_lossy(raw)))
        .expect("input is not empty")
}

/// Helper: assert that `raw` is rejected with a syntax error and return its offset.
fn syntax_error_at(raw: &[u8]) -> usize {
    match parse(raw) {
        Err(BencodeError::Syntax { position, .. }) => position,
        other => panic!(
            "expected syntax error for {:?}, got {other:?}",
            String::from_utf8_lossy(raw)
        ),
    }
}

fn keys(dict: &Bencode) -> Vec<&[u8]> {
    dict.entries().map(|(key, _)| key).collect()
}

// ============================================================================
// Integers
// ============================================================================

#[test]
fn decode_integer() {
    assert_eq!(parse_one(b"i42e").as_integer(), Some(42));
}

#[test]
fn decode_negative_integer() {
    assert_eq!(parse_one(b"i-5e").as_integer(), Some(-5));
}

#[test]
fn decode_zero() {
    assert_eq!(parse_one(b"i0e").as_integer(), Some(0));
}

#[test]
fn decode_integer_extremes() {
    assert_eq!(parse_one(b"i9223372036854775807e").as_integer(), Some(i64::MAX));
    assert_eq!(parse_one(b"i-9223372036854775808e").as_integer(), Some(i64::MIN));
}

#[test]
fn decode_integer_leading_zeros_normalize() {
    assert_eq!(parse_one(b"i007e").as_integer(), Some(7));
    assert_eq!(parse_one(b"i-0e").as_integer(), Some(0));
}

#[test]
fn decode_integer_without_digits_fails() {
    assert_eq!(syntax_error_at(b"ie"), 0);
    assert_eq!(syntax_error_at(b"i-e"), 0);
}

#[test]
fn decode_integer_with_inner_minus_fails() {
    assert_eq!(syntax_error_at(b"i5-3e"), 2);
}

#[test]
fn decode_integer_with_plus_sign_fails() {
    syntax_error_at(b"i+5e");
}

#[test]
fn decode_integer_overflow_fails() {
    syntax_error_at(b"i9223372036854775808e");
    syntax_error_at(b"i-9223372036854775809e");
}

#[test]
fn decode_unterminated_integer_fails() {
    syntax_error_at(b"i42");
}

// ============================================================================
// Byte strings
// ============================================================================

#[test]
fn decode_string() {
    assert_eq!(parse_one(b"4:spam").as_bytes(), Some(&b"spam"[..]));
}

#[test]
fn decode_empty_string() {
    assert_eq!(parse_one(b"0:").as_bytes(), Some(&b""[..]));
}

#[test]
fn decode_binary_string() {
    let value = parse_one(b"3:\x00\xff%");
    assert_eq!(value.as_bytes(), Some(&[0x00, 0xff, b'%'][..]));
}

#[test]
fn decode_string_containing_bencode_syntax() {
    assert_eq!(parse_one(b"5:i1ele").as_bytes(), Some(&b"i1ele"[..]));
}

#[test]
fn decode_string_too_short_fails() {
    assert_eq!(syntax_error_at(b"5:abc"), 0);
}

#[test]
fn decode_string_missing_colon_fails() {
    assert_eq!(syntax_error_at(b"4spam"), 1);
}

#[test]
fn decode_huge_string_length_fails() {
    syntax_error_at(b"99999999999999999999999:x");
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn decode_list() {
    let list = parse_one(b"l4:spam4:eggse");
    assert_eq!(list.kind(), Kind::List);
    let items: Vec<_> = list.children().iter().map(|c| c.as_bytes().unwrap()).collect();
    assert_eq!(items, vec![&b"spam"[..], &b"eggs"[..]]);
}

#[test]
fn decode_empty_list() {
    let list = parse_one(b"le");
    assert!(list.is_list());
    assert_eq!(list.child_count(), 0);
}

#[test]
fn decode_nested_lists() {
    let list = parse_one(b"lli1ei2eeli3eee");
    assert_eq!(list.child_count(), 2);
    assert_eq!(list[0].child_count(), 2);
    assert_eq!(list[1][0].as_integer(), Some(3));
}

#[test]
fn decode_list_items_have_no_keys() {
    let list = parse_one(b"li1e1:ae");
    assert!(list.children().iter().all(|c| c.key().is_none()));
}

#[test]
fn decode_unterminated_list_fails() {
    assert_eq!(syntax_error_at(b"li1e"), 0);
}

// ============================================================================
// Dictionaries
// ============================================================================

#[test]
fn decode_dictionary() {
    let dict = parse_one(b"d3:cow3:moo4:spam4:eggse");
    assert_eq!(keys(&dict), vec![&b"cow"[..], &b"spam"[..]]);
    assert_eq!(dict.child_by_key(b"spam").unwrap().as_bytes(), Some(&b"eggs"[..]));
}

#[test]
fn decode_dictionary_sorts_out_of_order_keys() {
    let dict = parse_one(b"d1:zi1e1:ai2e1:mi3ee");
    assert_eq!(keys(&dict), vec![&b"a"[..], &b"m"[..], &b"z"[..]]);
    assert_eq!(dict[0].as_integer(), Some(2));
}

#[test]
fn decode_dictionary_sorts_by_raw_bytes() {
    // Uppercase sorts before lowercase, shorter prefix before longer.
    let dict = parse_one(b"d2:abi1e1:ai2e1:Bi3ee");
    assert_eq!(keys(&dict), vec![&b"B"[..], &b"a"[..], &b"ab"[..]]);
}

#[test]
fn decode_dictionary_empty_key() {
    let dict = parse_one(b"d0:i1e1:ai2ee");
    assert_eq!(keys(&dict), vec![&b""[..], &b"a"[..]]);
}

#[test]
fn decode_dictionary_duplicate_key_fails() {
    assert_eq!(syntax_error_at(b"d1:ai1e1:ai2ee"), 7);
}

#[test]
fn decode_dictionary_non_string_key_fails() {
    assert_eq!(syntax_error_at(b"di1ei2ee"), 1);
}

#[test]
fn decode_dictionary_missing_value_fails() {
    syntax_error_at(b"d1:ae");
}

#[test]
fn decode_unterminated_dictionary_fails() {
    assert_eq!(syntax_error_at(b"d1:ai1e"), 0);
}

// ============================================================================
// Hex keys
// ============================================================================

#[test]
fn decode_marks_default_hex_keys() {
    let dict = parse_one(b"d4:name1:x6:pieces2:\x01\x02e");
    assert!(dict.child_by_key(b"pieces").unwrap().hex());
    assert!(!dict.child_by_key(b"name").unwrap().hex());
}

#[test]
fn decode_with_custom_hex_keys() {
    let options = Options::default().without_hex_keys().with_hex_key("name");
    let dict = parse_with(b"d4:name1:x6:pieces2:\x01\x02e", &options)
        .unwrap()
        .unwrap();
    assert!(dict.child_by_key(b"name").unwrap().hex());
    assert!(!dict.child_by_key(b"pieces").unwrap().hex());
}

// ============================================================================
// Whole-input rules
// ============================================================================

#[test]
fn decode_empty_input_is_none() {
    assert!(parse(b"").unwrap().is_none());
}

#[test]
fn decode_trailing_bytes_fail() {
    assert_eq!(syntax_error_at(b"i1ei2e"), 3);
}

#[test]
fn decode_unknown_leading_byte_fails() {
    assert_eq!(syntax_error_at(b"x"), 0);
}

#[test]
fn decode_nesting_limit() {
    let options = Options::default().with_max_depth(2);
    assert!(parse_with(b"llee", &options).is_ok());
    assert!(matches!(
        parse_with(b"llleee", &options),
        Err(BencodeError::Syntax { position: 2, .. })
    ));
}

#[test]
fn decode_deep_nesting_within_default_limit() {
    let depth = 200;
    let mut raw = vec![b'l'; depth];
    raw.extend(std::iter::repeat_n(b'e', depth));
    let mut node = &parse_one(&raw);
    for _ in 1..depth {
        node = &node[0];
    }
    assert_eq!(node.child_count(), 0);
}

#[test]
fn decode_error_message_names_offset() {
    let err = parse(b"i5-3e").unwrap_err();
    assert!(err.to_string().starts_with("bencode syntax error at byte 2"));
}
