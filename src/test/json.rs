use super::{json_err, json_tokens};
use crate::{JsonWriter, Token, TokenWrite};

#[test]
fn object_tokens() {
    assert_eq!(
        json_tokens(br#"{"a":1}"#),
        vec![
            Token::StartObject,
            Token::FieldName("a".to_string()),
            Token::Integer(1),
            Token::EndObject,
        ]
    );
}

#[test]
fn array_tokens() {
    assert_eq!(
        json_tokens(b"[true,false,null]"),
        vec![
            Token::StartArray,
            Token::Boolean(true),
            Token::Boolean(false),
            Token::Null,
            Token::EndArray,
        ]
    );
}

#[test]
fn whitespace() {
    assert_eq!(
        json_tokens(b" \t{ \"a\" :\r\n [ 1 , 2 ] } \n"),
        vec![
            Token::StartObject,
            Token::FieldName("a".to_string()),
            Token::StartArray,
            Token::Integer(1),
            Token::Integer(2),
            Token::EndArray,
            Token::EndObject,
        ]
    );
}

#[test]
fn multiple_root_values() {
    assert_eq!(
        json_tokens(b"1 2 [3]"),
        vec![
            Token::Integer(1),
            Token::Integer(2),
            Token::StartArray,
            Token::Integer(3),
            Token::EndArray,
        ]
    );
}

#[test]
fn string_escapes() {
    let mut input = Vec::new();
    input.extend_from_slice(br#""A\t\"\\\/ \u"#);
    input.extend_from_slice(br#"00e9 \u"#);
    input.extend_from_slice(br#"d83d\u"#);
    input.extend_from_slice(br#"de00""#);
    assert_eq!(
        json_tokens(&input),
        vec![Token::String("A\t\"\\/ \u{e9} \u{1f600}".to_string())]
    );
}

#[test]
fn empty_string() {
    assert_eq!(json_tokens(br#""""#), vec![Token::String(String::new())]);
}

#[test]
fn lone_low_surrogate() {
    json_err(br#""\udc00""#);
}

#[test]
fn unpaired_high_surrogate() {
    json_err(br#""\ud800x""#);
}

#[test]
fn unescaped_control_character() {
    assert_eq!(
        json_err(b"\"a\x01b\"").to_string(),
        "unescaped control character in string"
    );
}

#[test]
fn invalid_escape() {
    json_err(br#""\x""#);
}

#[test]
fn unterminated_string() {
    assert_eq!(json_err(br#""abc"#).to_string(), "unterminated string");
}

#[test]
fn numbers() {
    assert_eq!(json_tokens(b"0"), vec![Token::Integer(0)]);
    assert_eq!(json_tokens(b"-0"), vec![Token::Integer(0)]);
    assert_eq!(json_tokens(b"0.5"), vec![Token::Double(0.5)]);
    assert_eq!(json_tokens(b"1e3"), vec![Token::Double(1000.0)]);
    assert_eq!(json_tokens(b"-1.5e-2"), vec![Token::Double(-0.015)]);
}

#[test]
fn oversized_integer_falls_back_to_double() {
    assert_eq!(
        json_tokens(b"18446744073709551615"),
        vec![Token::Double(18446744073709551615.0)]
    );
}

#[test]
fn invalid_numbers() {
    for input in [&b"01"[..], b"1.", b"-", b"1e", b"--1", b"1.2.3"] {
        json_err(input);
    }
}

#[test]
fn trailing_garbage() {
    json_err(b"{}x");
}

#[test]
fn missing_colon() {
    assert_eq!(
        json_err(br#"{"a" 1}"#).to_string(),
        "expected ':' after object key"
    );
}

#[test]
fn missing_comma() {
    json_err(b"[1 2]");
    json_err(br#"{"a":1 "b":2}"#);
}

#[test]
fn non_string_key() {
    assert_eq!(
        json_err(b"{1:2}").to_string(),
        "expected an object key or '}'"
    );
}

#[test]
fn truncated_input() {
    json_err(br#"{"a":"#);
    json_err(b"[1,");
    json_err(b"tru");
}

#[test]
fn depth_limit() {
    let input = vec![b'['; 200];
    assert_eq!(json_err(&input).to_string(), "recursion limit exceeded");
}

fn render(tokens: &[Token]) -> String {
    let mut writer = JsonWriter::new(Vec::new());
    for token in tokens {
        writer.write_token(token).unwrap();
    }
    writer.close().unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn writer_escapes() {
    assert_eq!(
        render(&[Token::String("a\"b\\c\nd\u{1}".to_string())]),
        "\"a\\\"b\\\\c\\nd\\u0001\""
    );
}

#[test]
fn writer_root_separator() {
    assert_eq!(render(&[Token::Null, Token::Null]), "null null");
}

#[test]
fn writer_binary_as_base64() {
    assert_eq!(
        render(&[
            Token::StartArray,
            Token::Binary(vec![1, 2, 3]),
            Token::EndArray,
        ]),
        r#"["AQID"]"#
    );
}

#[test]
fn writer_rejects_value_in_key_position() {
    let mut writer = JsonWriter::new(Vec::new());
    writer.write_token(&Token::StartObject).unwrap();
    let err = writer.write_token(&Token::Integer(1)).unwrap_err();
    assert_eq!(err.to_string(), "misplaced integer token");
}

#[test]
fn writer_rejects_unmatched_end() {
    let mut writer = JsonWriter::new(Vec::new());
    writer.write_token(&Token::EndArray).unwrap_err();
}
