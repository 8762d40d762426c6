use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::database::config::DatabaseFormat;
use crate::types::{Category, Checksum};

/// Last entry of every serialized list. Starts with `s`, so it sorts after
/// every hex digit and each real entry line keeps its trailing comma.
pub const SENTINEL: &str = "sentinel";

const LEGACY_INDENT: &str = "        ";

/// Lists exactly as they appear in a file, before any validation.
/// Categories absent from the file are absent from the map.
pub type RawLists = BTreeMap<Category, Vec<String>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

pub fn parse(format: DatabaseFormat, text: &str) -> Result<RawLists, ParseError> {
    match format {
        DatabaseFormat::Legacy => parse_legacy(text),
        DatabaseFormat::Json => parse_json(text),
    }
}

/// Serialize in alphabetical category order, entries sorted, sentinel last.
pub fn render(
    format: DatabaseFormat,
    sets: &BTreeMap<Category, BTreeSet<Checksum>>,
) -> Result<String, serde_json::Error> {
    match format {
        DatabaseFormat::Legacy => Ok(render_legacy(sets)),
        DatabaseFormat::Json => render_json(sets),
    }
}

fn render_legacy(sets: &BTreeMap<Category, BTreeSet<Checksum>>) -> String {
    let mut out = String::new();
    for category in Category::ALL {
        out.push_str(&format!("{} = [\n", category.list_name()));
        for checksum in sets.get(&category).into_iter().flatten() {
            out.push_str(&format!("{LEGACY_INDENT}'{checksum}',\n"));
        }
        out.push_str(&format!("{LEGACY_INDENT}'{SENTINEL}']\n\n"));
    }
    out
}

fn render_json(sets: &BTreeMap<Category, BTreeSet<Checksum>>) -> Result<String, serde_json::Error> {
    // BTreeMap keeps the keys in bad, good, unknown order
    let doc: BTreeMap<&str, Vec<&str>> = Category::ALL
        .into_iter()
        .map(|category| {
            let entries: Vec<&str> = sets
                .get(&category)
                .into_iter()
                .flatten()
                .map(Checksum::as_str)
                .chain(std::iter::once(SENTINEL))
                .collect();
            (category.as_str(), entries)
        })
        .collect();

    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    Ok(out)
}

/// Derived so that serde rejects repeated and unknown keys.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonLists {
    bad: Option<Vec<String>>,
    good: Option<Vec<String>>,
    unknown: Option<Vec<String>>,
}

fn parse_json(text: &str) -> Result<RawLists, ParseError> {
    let doc: JsonLists =
        serde_json::from_str(text).map_err(|e| ParseError::new(e.line(), e.to_string()))?;

    Ok([
        (Category::Bad, doc.bad),
        (Category::Good, doc.good),
        (Category::Unknown, doc.unknown),
    ]
    .into_iter()
    .filter_map(|(category, entries)| entries.map(|entries| (category, entries)))
    .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Equals,
    OpenBracket,
    CloseBracket,
    Comma,
    Str(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("name {name:?}"),
            Token::Equals => "'='".into(),
            Token::OpenBracket => "'['".into(),
            Token::CloseBracket => "']'".into(),
            Token::Comma => "','".into(),
            Token::Str(s) => format!("string {s:?}"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '#' => {
                while chars.peek().is_some_and(|&c| c != '\n') {
                    chars.next();
                }
            }
            '=' => tokens.push((line, Token::Equals)),
            '[' => tokens.push((line, Token::OpenBracket)),
            ']' => tokens.push((line, Token::CloseBracket)),
            ',' => tokens.push((line, Token::Comma)),
            '\'' | '"' => {
                let start = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(q) if q == c => break,
                        Some('\n') | None => {
                            return Err(ParseError::new(start, "unterminated string"));
                        }
                        Some('\\') => {
                            return Err(ParseError::new(line, "escape sequences are not supported"));
                        }
                        Some(other) => value.push(other),
                    }
                }
                tokens.push((start, Token::Str(value)));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((line, Token::Ident(name)));
            }
            other => return Err(ParseError::new(line, format!("unexpected character {other:?}"))),
        }
    }
    Ok(tokens)
}

type Tokens = std::vec::IntoIter<(usize, Token)>;

fn expect(iter: &mut Tokens, wanted: Token, last_line: usize) -> Result<(), ParseError> {
    match iter.next() {
        Some((_, token)) if token == wanted => Ok(()),
        Some((line, token)) => Err(ParseError::new(
            line,
            format!("expected {}, found {}", wanted.describe(), token.describe()),
        )),
        None => Err(ParseError::new(
            last_line,
            format!("expected {}, found end of file", wanted.describe()),
        )),
    }
}

fn parse_legacy(text: &str) -> Result<RawLists, ParseError> {
    let tokens = tokenize(text)?;
    let last_line = text.lines().count().max(1);
    let mut iter: Tokens = tokens.into_iter();
    let mut lists = RawLists::new();

    while let Some((line, token)) = iter.next() {
        let name = match token {
            Token::Ident(name) => name,
            other => {
                return Err(ParseError::new(
                    line,
                    format!("expected a list name, found {}", other.describe()),
                ))
            }
        };
        let category = Category::from_list_name(&name)
            .ok_or_else(|| ParseError::new(line, format!("unknown list {name:?}")))?;
        if lists.contains_key(&category) {
            return Err(ParseError::new(line, format!("list {name:?} assigned twice")));
        }

        expect(&mut iter, Token::Equals, last_line)?;
        expect(&mut iter, Token::OpenBracket, last_line)?;

        let mut entries = Vec::new();
        loop {
            match iter.next() {
                Some((_, Token::CloseBracket)) => break,
                Some((_, Token::Str(value))) => {
                    entries.push(value);
                    match iter.next() {
                        Some((_, Token::Comma)) => {}
                        Some((_, Token::CloseBracket)) => break,
                        Some((line, other)) => {
                            return Err(ParseError::new(
                                line,
                                format!("expected ',' or ']', found {}", other.describe()),
                            ))
                        }
                        None => return Err(ParseError::new(last_line, "unterminated list")),
                    }
                }
                Some((line, other)) => {
                    return Err(ParseError::new(
                        line,
                        format!("expected a string or ']', found {}", other.describe()),
                    ))
                }
                None => return Err(ParseError::new(last_line, "unterminated list")),
            }
        }
        lists.insert(category, entries);
    }

    Ok(lists)
}
