//! Tokeniser and pair extraction for the length-prefixed payload format.
//!
//! ```text
//! a:3:{s:14:"TOTAL_RECEIVED";i:11;s:14:"TOTAL_ANSWERED";i:11;s:15:"TOTAL_ABANDONED";i:0;}
//! ```
//!
//! Tokens: `a:<n>:{` / `}` containers, `s:<len>:"<bytes>";` strings,
//! `i:<int>;`, `d:<float>;`, `b:<0|1>;` and `N;`. Containers are flattened:
//! every key/value pair at any depth lands in one map, later keys
//! overwriting earlier ones.
//!
//! The parser never fails. A pair whose declared string length does not
//! match the actual byte length is discarded, as is any run of bytes that is
//! not a token; both are counted in `Unserialized::discarded`.

use std::collections::BTreeMap;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize, value},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A scalar value from the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LegacyValue {
    /// Non-negative integer view. Numeric strings are accepted; floats are
    /// rounded; negatives and non-numeric text give `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(i) => u64::try_from(*i).ok(),
            Self::Float(f) if *f >= 0.0 && f.is_finite() => Some(f.round() as u64),
            Self::Float(_) => None,
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(|f| Self::Float(f).as_u64()))
            }
        }
    }

    /// Finite float view; `NAN` and `INF` read as unknown.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        };
        value.filter(|f: &f64| f.is_finite())
    }
}

/// Flattened key/value pairs and the number of discarded tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unserialized {
    pub pairs: BTreeMap<String, LegacyValue>,
    pub discarded: u64,
}

impl Unserialized {
    pub fn get(&self, key: &str) -> Option<&LegacyValue> {
        self.pairs.get(key)
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(LegacyValue::as_u64)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(LegacyValue::as_f64)
    }
}

// ── Tokens ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    /// `valid` is false when the declared length did not match.
    Str { text: String, valid: bool },
    Int(i64),
    Float(f64),
    Null,
}

fn length(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

fn open(input: &str) -> IResult<&str, Token> {
    value(Token::Open, tuple((tag("a:"), digit1, tag(":{"))))(input)
}

fn close(input: &str) -> IResult<&str, Token> {
    value(Token::Close, char('}'))(input)
}

/// `s:<len>:"<bytes>";`. The declared length is tried first so values
/// containing quotes decode; otherwise the body runs to the next quote and
/// the length check decides validity.
fn string(input: &str) -> IResult<&str, Token> {
    let (rest, declared) = delimited(tag("s:"), length, tag(":\""))(input)?;

    if let Some(body) = rest.get(..declared) {
        let exact: IResult<&str, &str> = tag("\";")(&rest[declared..]);
        if let Ok((after, _)) = exact {
            let token = Token::Str { text: body.to_string(), valid: true };
            return Ok((after, token));
        }
    }

    let (after, body) = terminated(take_till(|c| c == '"'), pair(char('"'), opt(char(';'))))(rest)?;
    let token = Token::Str {
        text: body.to_string(),
        valid: body.len() == declared,
    };
    Ok((after, token))
}

fn int(input: &str) -> IResult<&str, Token> {
    map(
        delimited(
            tag("i:"),
            map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>),
            char(';'),
        ),
        Token::Int,
    )(input)
}

fn float(input: &str) -> IResult<&str, Token> {
    map(delimited(tag("d:"), double, char(';')), Token::Float)(input)
}

fn boolean(input: &str) -> IResult<&str, Token> {
    map(delimited(tag("b:"), one_of("01"), char(';')), |b| {
        Token::Int(i64::from(b == '1'))
    })(input)
}

fn null(input: &str) -> IResult<&str, Token> {
    value(Token::Null, tag("N;"))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    preceded(multispace0, alt((open, close, string, int, float, boolean, null)))(input)
}

// ── Pair extraction ───────────────────────────────────────────────────────────

enum Pending {
    Nothing,
    Key(String),
    /// A key whose length check failed; its value is discarded with it.
    BadKey,
}

/// Decode a payload into its flattened pairs.
pub fn unserialize(blob: &str) -> Unserialized {
    let mut out = Unserialized::default();
    let mut pending = Pending::Nothing;
    let mut input = blob;
    let mut in_garbage = false;
    // After unparseable bytes only a string can start the next pair; scalars
    // met before it belong to the broken pair.
    let mut resync = false;

    while !input.trim_start().is_empty() {
        let (rest, tok) = match token(input) {
            Ok(parsed) => parsed,
            Err(_) => {
                if !in_garbage {
                    out.discarded += 1;
                    in_garbage = true;
                    resync = true;
                    debug!(at = blob.len() - input.len(), "unparseable bytes in legacy payload");
                }
                pending = Pending::Nothing;
                let skip = input.chars().next().map_or(1, char::len_utf8);
                input = &input[skip..];
                continue;
            }
        };
        in_garbage = false;
        input = rest;

        if resync {
            match tok {
                Token::Int(_) | Token::Float(_) | Token::Null => continue,
                _ => resync = false,
            }
        }

        pending = match (pending, tok) {
            // A container under a key: its pairs are lifted to the top level.
            (_, Token::Open) => Pending::Nothing,
            (Pending::Nothing, Token::Close) => Pending::Nothing,
            (_, Token::Close) => {
                out.discarded += 1;
                Pending::Nothing
            }

            (Pending::Nothing, Token::Str { text, valid: true }) => Pending::Key(text),
            (Pending::Nothing, Token::Str { valid: false, .. }) => Pending::BadKey,
            (Pending::Nothing, Token::Int(i)) => Pending::Key(i.to_string()),
            (Pending::Nothing, _) => {
                out.discarded += 1;
                Pending::Nothing
            }

            (Pending::BadKey, _) => {
                out.discarded += 1;
                Pending::Nothing
            }

            (Pending::Key(key), Token::Str { text, valid: true }) => {
                out.pairs.insert(key, LegacyValue::Text(text));
                Pending::Nothing
            }
            (Pending::Key(key), Token::Str { valid: false, .. }) => {
                debug!(key = %key, "legacy value failed length check");
                out.discarded += 1;
                Pending::Nothing
            }
            (Pending::Key(key), Token::Int(i)) => {
                out.pairs.insert(key, LegacyValue::Int(i));
                Pending::Nothing
            }
            (Pending::Key(key), Token::Float(f)) => {
                out.pairs.insert(key, LegacyValue::Float(f));
                Pending::Nothing
            }
            (Pending::Key(_), Token::Null) => Pending::Nothing,
        };
    }

    if let Pending::Key(key) = pending {
        debug!(key = %key, "legacy payload ended after a key");
        out.discarded += 1;
    }
    if out.discarded > 0 {
        warn!(
            discarded = out.discarded,
            kept = out.pairs.len(),
            "legacy payload contained malformed tokens"
        );
    }
    out
}

/// Write `pairs` as one flat container, the inverse of `unserialize`.
pub fn encode(pairs: &BTreeMap<String, LegacyValue>) -> String {
    let mut out = format!("a:{}:{{", pairs.len());
    for (key, value) in pairs {
        out.push_str(&format!("s:{}:\"{}\";", key.len(), key));
        match value {
            LegacyValue::Int(i) => out.push_str(&format!("i:{};", i)),
            LegacyValue::Float(f) => out.push_str(&format!("d:{};", f)),
            LegacyValue::Text(s) => out.push_str(&format!("s:{}:\"{}\";", s.len(), s)),
        }
    }
    out.push('}');
    out
}
