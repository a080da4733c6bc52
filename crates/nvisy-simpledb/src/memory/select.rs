//! Select expression parsing and evaluation for the memory backend.
//!
//! Supports the subset of the select language that document queries use:
//!
//! ```text
//! select (* | itemName() | count(*) | attr[, attr]*) from domain
//!     [where predicate] [order by operand [asc | desc]] [limit n]
//! ```
//!
//! Predicates combine `=`, `!=`, `<`, `<=`, `>`, `>=`, `like`, `not like`,
//! `is null` and `is not null` with `and`, `or`, `not` and parentheses.
//! Names may be quoted with backticks, values with single or double quotes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::types::{Attribute, Item};
use crate::{Error, Result};

/// Stored attributes of one item, keyed by attribute name.
pub(crate) type Attributes = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Name(String),
    Value(String),
    Star,
    Comma,
    LParen,
    RParen,
    Cmp(CmpOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn apply(self, left: &str, right: &str) -> bool {
        let ord = left.cmp(right);
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    ItemName,
    Attribute(String),
}

impl Operand {
    fn values<'a>(&self, item: &'a str, attributes: &'a Attributes) -> Vec<&'a str> {
        match self {
            Self::ItemName => vec![item],
            Self::Attribute(name) => attributes
                .get(name)
                .map(|values| values.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Compare(Operand, CmpOp, String),
    Like {
        operand: Operand,
        pattern: String,
        negated: bool,
    },
    IsNull {
        operand: Operand,
        negated: bool,
    },
}

impl Predicate {
    /// Multi-valued attributes match when any of their values does.
    fn matches(&self, item: &str, attributes: &Attributes) -> bool {
        match self {
            Self::And(l, r) => l.matches(item, attributes) && r.matches(item, attributes),
            Self::Or(l, r) => l.matches(item, attributes) || r.matches(item, attributes),
            Self::Not(p) => !p.matches(item, attributes),
            Self::Compare(operand, op, value) => operand
                .values(item, attributes)
                .iter()
                .any(|v| op.apply(v, value)),
            Self::Like {
                operand,
                pattern,
                negated,
            } => operand
                .values(item, attributes)
                .iter()
                .any(|v| like_match(v, pattern) != *negated),
            Self::IsNull { operand, negated } => {
                operand.values(item, attributes).is_empty() != *negated
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Output {
    All,
    ItemName,
    Count,
    Attributes(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Order {
    operand: Operand,
    descending: bool,
}

/// A parsed select expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SelectExpression {
    pub output: Output,
    pub domain: String,
    pub filter: Option<Predicate>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

/// Default page size when no limit is given.
pub(crate) const DEFAULT_LIMIT: usize = 100;

/// Largest page size the service accepts.
pub(crate) const MAX_LIMIT: usize = 2500;

impl SelectExpression {
    /// Parses an expression.
    pub fn parse(expression: &str) -> Result<Self> {
        let tokens = tokenize(expression)?;
        Parser { tokens, pos: 0 }.select()
    }

    /// Evaluates the expression against a domain, returning the rows of one
    /// page and the offset of the next page, if any.
    pub fn evaluate(
        &self,
        domain: &BTreeMap<String, Attributes>,
        offset: usize,
    ) -> (Vec<Item>, Option<usize>) {
        let mut rows: Vec<(&String, &Attributes)> = domain
            .iter()
            .filter(|(name, attrs)| {
                self.filter
                    .as_ref()
                    .is_none_or(|p| p.matches(name.as_str(), attrs))
            })
            .collect();

        if self.output == Output::Count {
            let count = Attribute::single("Domain", "Count", rows.len().to_string());
            return (vec![Item::new("Domain", vec![count])], None);
        }

        if let Some(order) = &self.order {
            rows.sort_by(|(a_name, a_attrs), (b_name, b_attrs)| {
                let a = order.operand.values(a_name, a_attrs).first().copied();
                let b = order.operand.values(b_name, b_attrs).first().copied();
                match (a, b) {
                    (Some(a), Some(b)) if order.descending => b.cmp(a),
                    (Some(a), Some(b)) => a.cmp(b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let end = offset.saturating_add(limit).min(rows.len());
        let next = (end < rows.len()).then_some(end);

        let items = rows
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|(name, attrs)| Item::new(name.as_str(), self.project(name, attrs)))
            .collect();

        (items, next)
    }

    fn project(&self, item: &str, attributes: &Attributes) -> Vec<Attribute> {
        let keep = |name: &str| match &self.output {
            Output::All => true,
            Output::Attributes(names) => names.iter().any(|n| n == name),
            Output::ItemName | Output::Count => false,
        };

        attributes
            .iter()
            .filter(|(name, _)| keep(name))
            .map(|(name, values)| Attribute::new(item, name.as_str(), values.iter().cloned()))
            .collect()
    }
}

/// `%` matches any run of characters; everything else matches literally.
pub(crate) fn like_match(value: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    let [first, middle @ .., last] = parts.as_slice() else {
        return value == pattern;
    };

    let Some(mut rest) = value.strip_prefix(first) else {
        return false;
    };

    for part in middle {
        match rest.find(part) {
            Some(index) => rest = &rest[index + part.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '*' => tokens.push(Token::Star),
            ',' => tokens.push(Token::Comma),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '=' => tokens.push(Token::Cmp(CmpOp::Eq)),
            '!' => match chars.next() {
                Some((_, '=')) => tokens.push(Token::Cmp(CmpOp::Ne)),
                _ => return Err(Error::invalid_query(format!("unexpected '!' at {start}"))),
            },
            '<' | '>' => {
                let or_equal = chars.next_if(|(_, next)| *next == '=').is_some();
                let op = match (c, or_equal) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    (_, false) => CmpOp::Gt,
                    (_, true) => CmpOp::Ge,
                };
                tokens.push(Token::Cmp(op));
            }
            '\'' | '"' | '`' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, ch)) if ch == c => {
                            // A doubled delimiter is an escaped delimiter.
                            if chars.next_if(|(_, next)| *next == c).is_some() {
                                text.push(c);
                            } else {
                                break;
                            }
                        }
                        Some((_, ch)) => text.push(ch),
                        None => {
                            return Err(Error::invalid_query(format!(
                                "unterminated quote starting at {start}"
                            )));
                        }
                    }
                }
                tokens.push(if c == '`' {
                    Token::Name(text)
                } else {
                    Token::Value(text)
                });
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some((_, next)) = chars.next_if(|(_, next)| is_word_char(*next)) {
                    word.push(next);
                }
                tokens.push(Token::Word(word));
            }
            other => {
                return Err(Error::invalid_query(format!(
                    "unexpected character '{other}' at {start}"
                )));
            }
        }
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '$' | '-' | '.')
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        let found = self.is_keyword(keyword);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{keyword}'")))
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("{token:?}")))
        }
    }

    fn unexpected(&self, wanted: &str) -> Error {
        match self.peek() {
            Some(token) => Error::invalid_query(format!("expected {wanted}, found {token:?}")),
            None => Error::invalid_query(format!("expected {wanted}, found end of expression")),
        }
    }

    fn select(mut self) -> Result<SelectExpression> {
        self.expect_keyword("select")?;
        let output = self.output()?;
        self.expect_keyword("from")?;
        let domain = self.name()?;

        let filter = if self.keyword("where") {
            Some(self.or()?)
        } else {
            None
        };

        let order = if self.keyword("order") {
            self.expect_keyword("by")?;
            let operand = self.operand()?;
            let descending = if self.keyword("desc") {
                true
            } else {
                self.keyword("asc");
                false
            };
            Some(Order {
                operand,
                descending,
            })
        } else {
            None
        };

        let limit = if self.keyword("limit") {
            match self.next() {
                Some(Token::Word(n)) => Some(
                    n.parse::<usize>()
                        .map_err(|_| Error::invalid_query(format!("invalid limit '{n}'")))?,
                ),
                _ => return Err(Error::invalid_query("limit requires a number")),
            }
        } else {
            None
        };

        if self.peek().is_some() {
            return Err(self.unexpected("end of expression"));
        }

        Ok(SelectExpression {
            output,
            domain,
            filter,
            order,
            limit,
        })
    }

    fn output(&mut self) -> Result<Output> {
        if self.peek() == Some(&Token::Star) {
            self.pos += 1;
            return Ok(Output::All);
        }

        if self.is_keyword("count") {
            self.pos += 1;
            self.expect(Token::LParen)?;
            self.expect(Token::Star)?;
            self.expect(Token::RParen)?;
            return Ok(Output::Count);
        }

        if let Operand::ItemName = self.operand()? {
            return Ok(Output::ItemName);
        }
        self.pos -= 1;

        let mut names = vec![self.name()?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            names.push(self.name()?);
        }
        Ok(Output::Attributes(names))
    }

    /// Parses an operand, leaving the cursor after it.
    fn operand(&mut self) -> Result<Operand> {
        let save = self.pos;
        match self.next() {
            Some(Token::Word(w))
                if w.eq_ignore_ascii_case("itemName") && self.peek() == Some(&Token::LParen) =>
            {
                self.expect(Token::LParen)?;
                self.expect(Token::RParen)?;
                Ok(Operand::ItemName)
            }
            Some(Token::Word(w)) | Some(Token::Name(w)) => Ok(Operand::Attribute(w)),
            _ => {
                self.pos = save;
                Err(self.unexpected("a name"))
            }
        }
    }

    fn name(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Word(w)) | Some(Token::Name(w)) => Ok(w),
            _ => {
                self.pos -= 1;
                Err(self.unexpected("a name"))
            }
        }
    }

    fn value(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Value(v)) => Ok(v),
            _ => {
                self.pos -= 1;
                Err(self.unexpected("a quoted value"))
            }
        }
    }

    fn or(&mut self) -> Result<Predicate> {
        let mut left = self.and()?;
        while self.keyword("or") {
            let right = self.and()?;
            left = Predicate::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<Predicate> {
        let mut left = self.not()?;
        while self.keyword("and") {
            let right = self.not()?;
            left = Predicate::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not(&mut self) -> Result<Predicate> {
        if self.keyword("not") {
            return Ok(Predicate::Not(Box::new(self.not()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Predicate> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.or()?;
            self.expect(Token::RParen)?;
            return Ok(inner);
        }

        let operand = self.operand()?;

        if let Some(Token::Cmp(op)) = self.peek().cloned() {
            self.pos += 1;
            return Ok(Predicate::Compare(operand, op, self.value()?));
        }

        if self.keyword("like") {
            return Ok(Predicate::Like {
                operand,
                pattern: self.value()?,
                negated: false,
            });
        }

        if self.keyword("not") {
            self.expect_keyword("like")?;
            return Ok(Predicate::Like {
                operand,
                pattern: self.value()?,
                negated: true,
            });
        }

        if self.keyword("is") {
            let negated = self.keyword("not");
            self.expect_keyword("null")?;
            return Ok(Predicate::IsNull { operand, negated });
        }

        Err(self.unexpected("a comparison"))
    }
}
