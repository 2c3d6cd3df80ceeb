use crate::token::TokenKind;
use std::{error, fmt, io};

#[derive(Debug)]
enum ErrorKind {
    Io(io::Error),
    // JSON text
    UnexpectedCharacter(u8),
    UnterminatedString,
    UnescapedControlCharacter,
    InvalidEscape,
    InvalidUnicodeEscape,
    InvalidNumber(String),
    ExpectedColon,
    ExpectedCommaOrEnd,
    ExpectedKeyOrEnd,
    // Smile binary
    EofWhileParsingValue,
    EofWhileParsingArray,
    EofWhileParsingMap,
    EofWhileParsingHeader,
    ReservedToken,
    InvalidStringReference,
    UnterminatedVint,
    BufferLengthOverflow,
    UnsupportedBigInteger,
    UnsupportedBigDecimal,
    UnexpectedToken,
    InvalidHeader,
    UnsupportedVersion,
    RecursionLimitExceeded,
    // shared
    InvalidUtf8,
    MisplacedToken(TokenKind),
    // verification
    TokenMismatch {
        index: u64,
        expected: TokenKind,
        actual: TokenKind,
    },
    TextMismatch {
        index: u64,
        expected: String,
        actual: String,
    },
    LengthMismatch {
        index: u64,
        input_ended: bool,
    },
}

/// An error encountered while reading, writing, or verifying a token stream.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ErrorKind::Io(_) => f.write_str("IO error"),
            ErrorKind::UnexpectedCharacter(b) => {
                write!(f, "unexpected character '{}'", char::from(*b))
            }
            ErrorKind::UnterminatedString => f.write_str("unterminated string"),
            ErrorKind::UnescapedControlCharacter => {
                f.write_str("unescaped control character in string")
            }
            ErrorKind::InvalidEscape => f.write_str("invalid escape sequence"),
            ErrorKind::InvalidUnicodeEscape => f.write_str("invalid unicode escape"),
            ErrorKind::InvalidNumber(s) => write!(f, "invalid number '{}'", s),
            ErrorKind::ExpectedColon => f.write_str("expected ':' after object key"),
            ErrorKind::ExpectedCommaOrEnd => f.write_str("expected ',' or a closing bracket"),
            ErrorKind::ExpectedKeyOrEnd => f.write_str("expected an object key or '}'"),
            ErrorKind::EofWhileParsingValue => f.write_str("EOF while parsing a value"),
            ErrorKind::EofWhileParsingArray => f.write_str("EOF while parsing array"),
            ErrorKind::EofWhileParsingMap => f.write_str("EOF while parsing map"),
            ErrorKind::EofWhileParsingHeader => f.write_str("EOF while parsing header"),
            ErrorKind::ReservedToken => f.write_str("reserved token"),
            ErrorKind::InvalidStringReference => f.write_str("invalid string reference"),
            ErrorKind::UnterminatedVint => f.write_str("unterminated vint"),
            ErrorKind::BufferLengthOverflow => f.write_str("buffer length overflow"),
            ErrorKind::UnsupportedBigInteger => f.write_str("unsupported BigInteger"),
            ErrorKind::UnsupportedBigDecimal => f.write_str("unsupported BigDecimal"),
            ErrorKind::UnexpectedToken => f.write_str("unexpected token"),
            ErrorKind::InvalidHeader => f.write_str("invalid header"),
            ErrorKind::UnsupportedVersion => f.write_str("unsupported version"),
            ErrorKind::RecursionLimitExceeded => f.write_str("recursion limit exceeded"),
            ErrorKind::InvalidUtf8 => f.write_str("invalid UTF-8"),
            ErrorKind::MisplacedToken(kind) => write!(f, "misplaced {} token", kind),
            ErrorKind::TokenMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "input and encoded differ, token #{}; expected {}, got {}",
                index, expected, actual
            ),
            ErrorKind::TextMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "input and encoded differ, token #{}; expected text '{}', got '{}'",
                index, expected, actual
            ),
            ErrorKind::LengthMismatch { index, input_ended } => {
                let (ended, continuing) = if *input_ended {
                    ("input", "encoded stream")
                } else {
                    ("encoded stream", "input")
                };
                write!(
                    f,
                    "input and encoded differ, token #{}; {} ended but {} continues",
                    index, ended, continuing
                )
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::io(e)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &*self.0 {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// Returns true if the error came from the verification lockstep comparison.
    pub fn is_verification(&self) -> bool {
        matches!(
            &*self.0,
            ErrorKind::TokenMismatch { .. }
                | ErrorKind::TextMismatch { .. }
                | ErrorKind::LengthMismatch { .. }
        )
    }

    pub(crate) fn io(e: io::Error) -> Self {
        Error(Box::new(ErrorKind::Io(e)))
    }

    pub(crate) fn unexpected_character(b: u8) -> Self {
        Error(Box::new(ErrorKind::UnexpectedCharacter(b)))
    }

    pub(crate) fn unterminated_string() -> Self {
        Error(Box::new(ErrorKind::UnterminatedString))
    }

    pub(crate) fn unescaped_control_character() -> Self {
        Error(Box::new(ErrorKind::UnescapedControlCharacter))
    }

    pub(crate) fn invalid_escape() -> Self {
        Error(Box::new(ErrorKind::InvalidEscape))
    }

    pub(crate) fn invalid_unicode_escape() -> Self {
        Error(Box::new(ErrorKind::InvalidUnicodeEscape))
    }

    pub(crate) fn invalid_number(s: &str) -> Self {
        Error(Box::new(ErrorKind::InvalidNumber(s.to_string())))
    }

    pub(crate) fn expected_colon() -> Self {
        Error(Box::new(ErrorKind::ExpectedColon))
    }

    pub(crate) fn expected_comma_or_end() -> Self {
        Error(Box::new(ErrorKind::ExpectedCommaOrEnd))
    }

    pub(crate) fn expected_key_or_end() -> Self {
        Error(Box::new(ErrorKind::ExpectedKeyOrEnd))
    }

    pub(crate) fn eof_while_parsing_value() -> Self {
        Error(Box::new(ErrorKind::EofWhileParsingValue))
    }

    pub(crate) fn eof_while_parsing_array() -> Self {
        Error(Box::new(ErrorKind::EofWhileParsingArray))
    }

    pub(crate) fn eof_while_parsing_map() -> Self {
        Error(Box::new(ErrorKind::EofWhileParsingMap))
    }

    pub(crate) fn eof_while_parsing_header() -> Self {
        Error(Box::new(ErrorKind::EofWhileParsingHeader))
    }

    pub(crate) fn reserved_token() -> Self {
        Error(Box::new(ErrorKind::ReservedToken))
    }

    pub(crate) fn invalid_string_reference() -> Self {
        Error(Box::new(ErrorKind::InvalidStringReference))
    }

    pub(crate) fn unterminated_vint() -> Self {
        Error(Box::new(ErrorKind::UnterminatedVint))
    }

    pub(crate) fn buffer_length_overflow() -> Self {
        Error(Box::new(ErrorKind::BufferLengthOverflow))
    }

    pub(crate) fn unsupported_big_integer() -> Self {
        Error(Box::new(ErrorKind::UnsupportedBigInteger))
    }

    pub(crate) fn unsupported_big_decimal() -> Self {
        Error(Box::new(ErrorKind::UnsupportedBigDecimal))
    }

    pub(crate) fn unexpected_token() -> Self {
        Error(Box::new(ErrorKind::UnexpectedToken))
    }

    pub(crate) fn invalid_header() -> Self {
        Error(Box::new(ErrorKind::InvalidHeader))
    }

    pub(crate) fn unsupported_version() -> Self {
        Error(Box::new(ErrorKind::UnsupportedVersion))
    }

    pub(crate) fn recursion_limit_exceeded() -> Self {
        Error(Box::new(ErrorKind::RecursionLimitExceeded))
    }

    pub(crate) fn invalid_utf8() -> Self {
        Error(Box::new(ErrorKind::InvalidUtf8))
    }

    pub(crate) fn misplaced_token(kind: TokenKind) -> Self {
        Error(Box::new(ErrorKind::MisplacedToken(kind)))
    }

    pub(crate) fn token_mismatch(index: u64, expected: TokenKind, actual: TokenKind) -> Self {
        Error(Box::new(ErrorKind::TokenMismatch {
            index,
            expected,
            actual,
        }))
    }

    pub(crate) fn text_mismatch(index: u64, expected: &str, actual: &str) -> Self {
        Error(Box::new(ErrorKind::TextMismatch {
            index,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }))
    }

    pub(crate) fn length_mismatch(index: u64, input_ended: bool) -> Self {
        Error(Box::new(ErrorKind::LengthMismatch { index, input_ended }))
    }
}
