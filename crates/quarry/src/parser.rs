// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path text parser
//!
//! Single pass over the path bytes with a cursor. Dotted segments and `[...]`
//! indexers become [`PathFilter`] steps; `?( ... )` predicates are parsed by
//! recursive descent with `||` binding looser than `&&`.
//!
//! ```text
//! path     := ws* ('$' ('.' | '[') )? segment* ws*
//! segment  := '.' name | '..' name | '[' indexer ']' | name
//! indexer  := quoted (',' quoted)* | int (',' int)* | slice | '*' | '?(' or ')'
//! or       := and ('||' and)*
//! and      := term ('&&' term)*
//! term     := '(' or ')' | side (op side)?
//! side     := '@' path | '$' path | 'string' | number | true | false | null | /re/flags
//! ```

use serde_json::Value;

use crate::error::{ParseContext, ParseError};
use crate::expression::{LogicalOperator, Operand, QueryExpression, QueryOperator, RegexLiteral};
use crate::filter::{NameSet, PathFilter};
use crate::node::parse_json_number;

type Result<T> = std::result::Result<T, ParseError>;

/// Operator tokens, longest first where one is a prefix of another.
const OPERATORS: [(&str, QueryOperator); 10] = [
    ("===", QueryOperator::StrictEquals),
    ("==", QueryOperator::Equals),
    ("=~", QueryOperator::RegexEquals),
    ("!==", QueryOperator::StrictNotEquals),
    ("!=", QueryOperator::NotEquals),
    ("<>", QueryOperator::NotEquals),
    ("<=", QueryOperator::LessThanOrEquals),
    ("<", QueryOperator::LessThan),
    (">=", QueryOperator::GreaterThanOrEquals),
    (">", QueryOperator::GreaterThan),
];

/// Parse path text into its filter pipeline.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; nothing is returned for a
/// partially valid path.
pub fn parse(text: &str) -> Result<Vec<PathFilter>> {
    Parser::new(text).parse_main()
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn parse_main(mut self) -> Result<Vec<PathFilter>> {
        let mut filters = Vec::new();

        self.eat_whitespace();
        if self.at_end() {
            return Ok(filters);
        }

        if self.peek() == Some(b'$') {
            match self.bytes.get(self.pos + 1).copied() {
                Some(b'.' | b'[') => self.pos += 1,
                // `$values` is a property name
                Some(c) if !c.is_ascii_whitespace() => {}
                _ => {
                    self.pos += 1;
                    self.eat_whitespace();
                    if self.at_end() {
                        return Ok(filters);
                    }
                    return Err(self.unexpected(ParseContext::Path));
                }
            }
        }

        if !self.parse_path(&mut filters, self.pos, false)? {
            self.eat_whitespace();
            if !self.at_end() {
                return Err(self.unexpected(ParseContext::Path));
            }
        }

        Ok(filters)
    }

    /// Parse dotted segments and indexers until a terminator.
    ///
    /// Returns `true` when the input is exhausted.
    fn parse_path(
        &mut self,
        filters: &mut Vec<PathFilter>,
        mut part_start: usize,
        query: bool,
    ) -> Result<bool> {
        let mut scan = false;
        let mut following_indexer = false;
        let mut following_dot = false;

        while let Some(c) = self.peek() {
            match c {
                b'[' => {
                    if self.pos > part_start {
                        filters.push(member(&self.text[part_start..self.pos], scan));
                        scan = false;
                    }
                    self.parse_indexer(filters, scan)?;
                    scan = false;
                    self.pos += 1;
                    part_start = self.pos;
                    following_indexer = true;
                    following_dot = false;
                }
                b']' | b')' => break,
                c if c.is_ascii_whitespace() => break,
                b'.' => {
                    if self.pos > part_start {
                        filters.push(member(&self.text[part_start..self.pos], scan));
                        scan = false;
                    }
                    if self.bytes.get(self.pos + 1) == Some(&b'.') {
                        scan = true;
                        self.pos += 1;
                    }
                    self.pos += 1;
                    part_start = self.pos;
                    following_indexer = false;
                    following_dot = true;
                }
                b'=' | b'<' | b'!' | b'>' | b'|' | b'&' if query => break,
                _ => {
                    if following_indexer {
                        return Err(ParseError::UnexpectedCharacterAfterIndexer {
                            character: self.current_char(),
                            position: self.pos,
                        });
                    }
                    self.pos += 1;
                }
            }
        }

        let at_end = self.at_end();
        if self.pos > part_start {
            filters.push(member(&self.text[part_start..self.pos], scan));
        } else if following_dot && (at_end || query) {
            return Err(ParseError::UnexpectedEnd { position: self.pos });
        }

        Ok(at_end)
    }

    /// Cursor on `[`; leaves it on the closing `]`.
    fn parse_indexer(&mut self, filters: &mut Vec<PathFilter>, scan: bool) -> Result<()> {
        self.pos += 1;
        self.eat_whitespace();
        let c = self.peek().ok_or(ParseError::OpenIndexer { position: self.pos })?;

        match c {
            b'\'' => filters.push(self.parse_quoted_field(scan)?),
            b'?' => filters.push(self.parse_query(scan)?),
            _ => {
                let indexer = self.parse_array_indexer()?;
                // `..[0]` indexes every node the scan reaches
                if scan {
                    filters.push(PathFilter::Scan(None));
                }
                filters.push(indexer);
            }
        }
        Ok(())
    }

    fn parse_array_indexer(&mut self) -> Result<PathFilter> {
        let mut start = self.pos;
        let mut end: Option<usize> = None;
        let mut colon_count = 0;
        let mut indexes: Option<Vec<i64>> = None;
        let mut slice_start = None;
        let mut slice_end = None;

        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                end = Some(self.pos);
                self.eat_whitespace();
                continue;
            }

            if c == b']' {
                let stop = end.unwrap_or(self.pos);
                let text = &self.text[start..stop];

                if let Some(mut indexes) = indexes {
                    if text.is_empty() {
                        return Err(ParseError::IndexExpected { position: self.pos });
                    }
                    indexes.push(parse_index(text, start)?);
                    return Ok(PathFilter::IndexMulti(indexes));
                }

                if colon_count > 0 {
                    let value = if text.is_empty() {
                        None
                    } else {
                        Some(parse_index(text, start)?)
                    };
                    return Ok(if colon_count == 1 {
                        PathFilter::Slice {
                            start: slice_start,
                            end: value,
                            step: None,
                        }
                    } else {
                        PathFilter::Slice {
                            start: slice_start,
                            end: slice_end,
                            step: value,
                        }
                    });
                }

                if text.is_empty() {
                    return Err(ParseError::IndexExpected { position: self.pos });
                }
                return Ok(PathFilter::Index(Some(parse_index(text, start)?)));
            }

            match c {
                b',' => {
                    let stop = end.unwrap_or(self.pos);
                    let text = &self.text[start..stop];
                    if text.is_empty() || colon_count > 0 {
                        return Err(self.unexpected(ParseContext::Indexer));
                    }
                    indexes
                        .get_or_insert_with(Vec::new)
                        .push(parse_index(text, start)?);
                    self.pos += 1;
                    self.eat_whitespace();
                    start = self.pos;
                    end = None;
                }
                b'*' => {
                    if start != self.pos || indexes.is_some() || colon_count > 0 {
                        return Err(self.unexpected(ParseContext::Indexer));
                    }
                    self.pos += 1;
                    self.eat_whitespace();
                    return match self.peek() {
                        None => Err(ParseError::OpenIndexer { position: self.pos }),
                        Some(b']') => Ok(PathFilter::Index(None)),
                        Some(_) => Err(self.unexpected(ParseContext::Indexer)),
                    };
                }
                b':' => {
                    if indexes.is_some() || colon_count >= 2 {
                        return Err(self.unexpected(ParseContext::Indexer));
                    }
                    let stop = end.unwrap_or(self.pos);
                    let text = &self.text[start..stop];
                    let value = if text.is_empty() {
                        None
                    } else {
                        Some(parse_index(text, start)?)
                    };
                    colon_count += 1;
                    if colon_count == 1 {
                        slice_start = value;
                    } else {
                        slice_end = value;
                    }
                    self.pos += 1;
                    self.eat_whitespace();
                    start = self.pos;
                    end = None;
                }
                b'0'..=b'9' | b'-' if end.is_none() => self.pos += 1,
                _ => return Err(self.unexpected(ParseContext::Indexer)),
            }
        }

        Err(ParseError::OpenIndexer { position: self.pos })
    }

    /// Cursor on the first `'`; leaves it on `]`.
    fn parse_quoted_field(&mut self, scan: bool) -> Result<PathFilter> {
        let mut names = Vec::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::OpenIndexer { position: self.pos }),
                Some(b'\'') => {}
                Some(_) => return Err(self.unexpected(ParseContext::Indexer)),
            }
            names.push(self.read_quoted_string()?);
            self.eat_whitespace();

            match self.peek() {
                None => return Err(ParseError::OpenIndexer { position: self.pos }),
                Some(b']') => break,
                Some(b',') => {
                    self.pos += 1;
                    self.eat_whitespace();
                }
                Some(_) => return Err(self.unexpected(ParseContext::Indexer)),
            }
        }

        Ok(match (names.len(), scan) {
            (1, false) => PathFilter::Field(names.pop()),
            (1, true) => PathFilter::Scan(names.pop()),
            (_, false) => PathFilter::FieldMulti(names),
            (_, true) => PathFilter::ScanMulti(NameSet::new(names)),
        })
    }

    /// Cursor on the opening `'`; leaves it after the closing one.
    fn read_quoted_string(&mut self) -> Result<String> {
        self.pos += 1;
        let mut value = String::new();

        while let Some(c) = self.current() {
            match c {
                '\\' if self.pos + 1 < self.bytes.len() => {
                    self.pos += 1;
                    let escaped = self.current_char();
                    let resolved = match escaped {
                        'b' => '\u{8}',
                        't' => '\t',
                        'n' => '\n',
                        'f' => '\u{c}',
                        'r' => '\r',
                        '\\' | '"' | '\'' | '/' => escaped,
                        other => {
                            return Err(ParseError::UnknownEscape {
                                character: other,
                                position: self.pos,
                            });
                        }
                    };
                    value.push(resolved);
                    self.pos += escaped.len_utf8();
                }
                '\'' => {
                    self.pos += 1;
                    return Ok(value);
                }
                _ => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        Err(ParseError::OpenString { position: self.pos })
    }

    /// Cursor on `?`; leaves it on `]`.
    fn parse_query(&mut self, scan: bool) -> Result<PathFilter> {
        self.pos += 1;
        match self.peek() {
            None => return Err(ParseError::OpenIndexer { position: self.pos }),
            Some(b'(') => self.pos += 1,
            Some(_) => return Err(self.unexpected(ParseContext::Indexer)),
        }

        let expression = self.parse_or()?;
        self.expect_close_paren()?;

        self.eat_whitespace();
        match self.peek() {
            None => Err(ParseError::OpenIndexer { position: self.pos }),
            Some(b']') if scan => Ok(PathFilter::QueryScan(expression)),
            Some(b']') => Ok(PathFilter::Query(expression)),
            Some(_) => Err(self.unexpected(ParseContext::Indexer)),
        }
    }

    fn expect_close_paren(&mut self) -> Result<()> {
        match self.peek() {
            None => Err(ParseError::OpenQuery { position: self.pos }),
            Some(b')') => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected(ParseContext::Query)),
        }
    }

    fn parse_or(&mut self) -> Result<QueryExpression> {
        let mut expressions = vec![self.parse_and()?];
        while self.peek() == Some(b'|') {
            if !self.eat("||") {
                return Err(self.unexpected(ParseContext::Query));
            }
            expressions.push(self.parse_and()?);
        }
        Ok(composite(LogicalOperator::Or, expressions))
    }

    fn parse_and(&mut self) -> Result<QueryExpression> {
        let mut expressions = vec![self.parse_term()?];
        while self.peek() == Some(b'&') {
            if !self.eat("&&") {
                return Err(self.unexpected(ParseContext::Query));
            }
            expressions.push(self.parse_term()?);
        }
        Ok(composite(LogicalOperator::And, expressions))
    }

    /// Leaves the cursor on the next non-whitespace character.
    fn parse_term(&mut self) -> Result<QueryExpression> {
        self.eat_whitespace();
        let c = self.peek().ok_or(ParseError::OpenQuery { position: self.pos })?;

        if c == b'(' {
            self.pos += 1;
            let inner = self.parse_or()?;
            self.expect_close_paren()?;
            self.eat_whitespace();
            self.ensure_query_open()?;
            return Ok(inner);
        }

        let left = self.parse_side()?;
        if matches!(self.peek(), Some(b')' | b'|' | b'&')) {
            return Ok(QueryExpression::Boolean {
                op: QueryOperator::Exists,
                left,
                right: None,
            });
        }

        let op = self.parse_operator()?;
        let right = self.parse_side()?;
        Ok(QueryExpression::Boolean {
            op,
            left,
            right: Some(right),
        })
    }

    fn parse_side(&mut self) -> Result<Operand> {
        self.eat_whitespace();
        let c = self.peek().ok_or(ParseError::OpenQuery { position: self.pos })?;

        let operand = match c {
            b'@' | b'$' => {
                let mut filters = if c == b'$' {
                    vec![PathFilter::Root]
                } else {
                    Vec::new()
                };
                self.pos += 1;
                if self.parse_path(&mut filters, self.pos, true)? {
                    return Err(ParseError::OpenQuery { position: self.pos });
                }
                Operand::Path(filters)
            }
            b'\'' => Operand::Literal(Value::String(self.read_quoted_string()?)),
            b'0'..=b'9' | b'-' => Operand::Literal(self.read_number()?),
            b't' if self.eat("true") => Operand::Literal(Value::Bool(true)),
            b'f' if self.eat("false") => Operand::Literal(Value::Bool(false)),
            b'n' if self.eat("null") => Operand::Literal(Value::Null),
            b'/' => Operand::Regex(self.read_regex()?),
            _ => return Err(self.unexpected(ParseContext::Query)),
        };

        self.eat_whitespace();
        self.ensure_query_open()?;
        Ok(operand)
    }

    fn parse_operator(&mut self) -> Result<QueryOperator> {
        if self.peek() == Some(b']') {
            return Err(self.unexpected(ParseContext::Query));
        }
        if self.pos + 1 >= self.bytes.len() {
            return Err(ParseError::OpenQuery { position: self.pos });
        }
        OPERATORS
            .iter()
            .find(|(token, _)| self.eat(token))
            .map(|&(_, op)| op)
            .ok_or(ParseError::UnknownOperator { position: self.pos })
    }

    fn read_number(&mut self) -> Result<Value> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
        ) {
            self.pos += 1;
        }
        let text = &self.text[start..self.pos];
        parse_json_number(text)
            .map(Value::Number)
            .ok_or_else(|| ParseError::InvalidNumber {
                text: text.to_string(),
                position: start,
            })
    }

    /// Cursor on the opening `/`; leaves it after the flags.
    fn read_regex(&mut self) -> Result<RegexLiteral> {
        let start = self.pos;
        self.pos += 1;

        while let Some(c) = self.peek() {
            match c {
                b'\\' if self.pos + 1 < self.bytes.len() => self.pos += 2,
                b'/' => {
                    self.pos += 1;
                    while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                        self.pos += 1;
                    }
                    let text = &self.text[start..self.pos];
                    return RegexLiteral::parse(text).map_err(|reason| ParseError::InvalidRegex {
                        text: text.to_string(),
                        reason,
                        position: start,
                    });
                }
                _ => self.pos += 1,
            }
        }

        Err(ParseError::OpenRegex { position: self.pos })
    }

    fn ensure_query_open(&self) -> Result<()> {
        if self.at_end() {
            Err(ParseError::OpenQuery { position: self.pos })
        } else {
            Ok(())
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.bytes[self.pos..].starts_with(token.as_bytes()) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    const fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Character at the cursor, if the cursor sits on a char boundary.
    fn current(&self) -> Option<char> {
        self.text.get(self.pos..)?.chars().next()
    }

    fn current_char(&self) -> char {
        self.current().unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn unexpected(&self, context: ParseContext) -> ParseError {
        ParseError::UnexpectedCharacter {
            context,
            character: self.current_char(),
            position: self.pos,
        }
    }
}

/// Filter for a dotted segment; `*` is the wildcard.
fn member(text: &str, scan: bool) -> PathFilter {
    let text = text.trim_end();
    let name = (text != "*").then(|| text.to_string());
    if scan {
        PathFilter::Scan(name)
    } else {
        PathFilter::Field(name)
    }
}

fn composite(op: LogicalOperator, mut expressions: Vec<QueryExpression>) -> QueryExpression {
    if expressions.len() == 1
        && let Some(single) = expressions.pop()
    {
        return single;
    }
    QueryExpression::Composite { op, expressions }
}

fn parse_index(text: &str, position: usize) -> Result<i64> {
    text.parse().map_err(|_| ParseError::InvalidIndex {
        text: text.to_string(),
        position,
    })
}
