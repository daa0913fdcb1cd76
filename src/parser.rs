use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, opt, recognize},
    error::ErrorKind,
    sequence::pair,
};

use crate::ast::Value;
use crate::intern::Interner;
use crate::{Error, NumberType, ParseError, ParseErrorKind, QUOTE_KEYWORD};

/// Why a form could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyntaxErrorKind {
    UnexpectedEnd,
    UnterminatedList,
    EmptyAtom,
    IntegerOutOfRange,
    Nom(ErrorKind),
}

/// Parser-internal error; `input` is the unconsumed text at the failure point
#[derive(Debug, Clone, PartialEq)]
struct SyntaxError<'a> {
    input: &'a str,
    kind: SyntaxErrorKind,
}

impl<'a> nom::error::ParseError<&'a str> for SyntaxError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        SyntaxError {
            input,
            kind: SyntaxErrorKind::Nom(kind),
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

type PResult<'a, T> = IResult<&'a str, T, SyntaxError<'a>>;

fn failure<T>(input: &str, kind: SyntaxErrorKind) -> PResult<'_, T> {
    Err(nom::Err::Failure(SyntaxError { input, kind }))
}

/// Whitespace between forms: space, tab and newline only
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_atom_char(c: char) -> bool {
    !is_whitespace(c) && !matches!(c, '(' | ')' | '\'')
}

fn skip_whitespace(input: &str) -> PResult<'_, &str> {
    take_while(is_whitespace).parse(input)
}

/// An atom is a number iff it is `-?[0-9]+`; a lone `-` is a symbol
fn is_integer_literal(text: &str) -> bool {
    let result: IResult<&str, &str> =
        all_consuming(recognize(pair(opt(char('-')), digit1))).parse(text);
    result.is_ok()
}

/// Parse an atom (number or symbol)
fn parse_atom<'a>(input: &'a str, interner: &mut Interner) -> PResult<'a, Value> {
    let atom: PResult<'a, &'a str> = take_while1(is_atom_char).parse(input);
    let Ok((remaining, text)) = atom else {
        return failure(input, SyntaxErrorKind::EmptyAtom);
    };

    if !is_integer_literal(text) {
        return Ok((remaining, Value::Symbol(interner.intern(text))));
    }

    match text.parse::<NumberType>() {
        Ok(n) => Ok((remaining, Value::Number(n))),
        Err(_) => failure(input, SyntaxErrorKind::IntegerOutOfRange),
    }
}

/// Parse a list: `(` form* `)`
fn parse_list<'a>(input: &'a str, interner: &mut Interner) -> PResult<'a, Value> {
    let (mut input, _) = char('(').parse(input)?;
    let mut elements = Vec::new();

    loop {
        let (rest, _) = skip_whitespace(input)?;
        if rest.is_empty() {
            return failure(rest, SyntaxErrorKind::UnterminatedList);
        }

        let (rest, close) = opt(char(')')).parse(rest)?;
        if close.is_some() {
            return Ok((rest, Value::list(elements)));
        }

        let (rest, element) = parse_form(rest, interner)?;
        elements.push(element);
        input = rest;
    }
}

/// Parse quoted expression ('expr -> (quote expr))
fn parse_quoted<'a>(input: &'a str, interner: &mut Interner) -> PResult<'a, Value> {
    let (input, _) = char('\'').parse(input)?;
    let (input, expr) = parse_form(input, interner)?;
    let quote = interner.intern(QUOTE_KEYWORD);
    Ok((input, Value::list([Value::Symbol(quote), expr])))
}

/// Parse one form, skipping leading whitespace
fn parse_form<'a>(input: &'a str, interner: &mut Interner) -> PResult<'a, Value> {
    let (input, _) = skip_whitespace(input)?;
    match input.chars().next() {
        None => failure(input, SyntaxErrorKind::UnexpectedEnd),
        Some('\'') => parse_quoted(input, interner),
        Some('(') => parse_list(input, interner),
        Some(_) => parse_atom(input, interner),
    }
}

/// Convert parser failures to user-friendly errors
fn syntax_error_to_parse_error(source: &str, error: nom::Err<SyntaxError<'_>>) -> ParseError {
    let (input, kind) = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => (e.input, e.kind),
        nom::Err::Incomplete(_) => {
            return ParseError::from_message(ParseErrorKind::Incomplete, "Incomplete input");
        }
    };
    let offset = source.len().saturating_sub(input.len());
    let next_char = input.chars().next().map(String::from);

    match kind {
        SyntaxErrorKind::UnexpectedEnd => ParseError::with_context(
            ParseErrorKind::Incomplete,
            "Unexpected end of input",
            source,
            offset,
        ),
        SyntaxErrorKind::UnterminatedList => ParseError::with_context(
            ParseErrorKind::Incomplete,
            "Unterminated list",
            source,
            offset,
        ),
        SyntaxErrorKind::EmptyAtom => ParseError::with_context_and_found(
            ParseErrorKind::InvalidSyntax,
            format!("Empty atom at position {offset}"),
            source,
            offset,
            next_char,
        ),
        SyntaxErrorKind::IntegerOutOfRange => {
            let literal: String = input.chars().take_while(|c| is_atom_char(*c)).collect();
            ParseError::with_context_and_found(
                ParseErrorKind::ImplementationLimit,
                "Integer literal out of range",
                source,
                offset,
                Some(literal),
            )
        }
        SyntaxErrorKind::Nom(_) => ParseError::with_context_and_found(
            ParseErrorKind::InvalidSyntax,
            format!("Invalid syntax at position {offset}"),
            source,
            offset,
            next_char,
        ),
    }
}

/// Cursor over a text buffer, reading one form at a time.
///
/// Symbols are interned as they are read, so the produced trees do not borrow the
/// buffer and may outlive it. A failed read leaves the cursor where it was; symbols
/// interned before the failure stay interned.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    source: &'a str,
    rest: &'a str,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Reader {
            source,
            rest: source,
        }
    }

    /// Unconsumed input
    pub fn remaining(&self) -> &'a str {
        self.rest
    }

    /// Byte offset of the cursor in the source
    pub fn offset(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    /// True when only whitespace is left
    pub fn is_at_end(&self) -> bool {
        self.rest.trim_start_matches(is_whitespace).is_empty()
    }

    /// Read the next form and advance past it
    pub fn read(&mut self, interner: &mut Interner) -> Result<Value, Error> {
        match parse_form(self.rest, interner) {
            Ok((rest, value)) => {
                self.rest = rest;
                Ok(value)
            }
            Err(e) => Err(Error::ParseError(syntax_error_to_parse_error(self.source, e))),
        }
    }

    /// Read the next form, or `None` once only whitespace remains
    pub fn next_form(&mut self, interner: &mut Interner) -> Option<Result<Value, Error>> {
        if self.is_at_end() {
            return None;
        }
        Some(self.read(interner))
    }
}

/// Parse the first form in input. Whatever follows it is left unread.
///
/// Use a [`Reader`] to continue past the first form, or [`parse_exact`] to reject
/// trailing input.
pub fn parse(input: &str, interner: &mut Interner) -> Result<Value, Error> {
    Reader::new(input).read(interner)
}

/// Parse exactly one form from input; anything but whitespace after it is an error.
pub fn parse_exact(input: &str, interner: &mut Interner) -> Result<Value, Error> {
    let mut reader = Reader::new(input);
    let value = reader.read(interner)?;

    if !reader.is_at_end() {
        let remaining = reader.remaining().trim_matches(is_whitespace);
        return Err(Error::ParseError(ParseError::with_context_and_found(
            ParseErrorKind::TrailingContent,
            format!("Unexpected remaining input: '{remaining}'"),
            input,
            reader.offset(),
            Some(remaining.to_owned()),
        )));
    }

    Ok(value)
}

/// Parse every form in input, in order
pub fn parse_all(input: &str, interner: &mut Interner) -> Result<Vec<Value>, Error> {
    let mut reader = Reader::new(input);
    let mut forms = Vec::new();
    while let Some(form) = reader.next_form(interner) {
        forms.push(form?);
    }
    Ok(forms)
}
