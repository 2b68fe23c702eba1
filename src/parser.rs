//! Tokenizer and recursive-descent parser for single-variable expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary | <implicit> unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'x' | constant | name '(' args ')' | '(' sum ')'
//! ```
//!
//! `^` is right associative and binds tighter than unary minus, so `-x^2`
//! reads as `-(x^2)` while `2^-1` is `0.5`. Implicit multiplication applies
//! when an operand is directly followed by a name or `(`, as in `2x`,
//! `3(x + 1)` or `(x - 1)(x + 1)`.

use crate::error::{Result, RootError};
use crate::expression::{BinaryOp, Function, Function2, Node};

/// Parses `source` into an expression tree.
pub fn parse(source: &str) -> Result<Node> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(RootError::syntax(0, "empty expression"));
    }
    let mut parser = Parser {
        tokens,
        cursor: 0,
        end: source.chars().count(),
        depth: 0,
    };
    let node = parser.sum()?;
    if let Some(token) = parser.peek() {
        return Err(RootError::syntax(
            token.position,
            format!("unexpected {} after end of expression", token.kind.describe()),
        ));
    }
    Ok(node)
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::Name(name) => format!("name '{name}'"),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            _ if c.is_ascii_digit() || c == '.' => {
                let (value, next) = scan_number(&chars, start)?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: start,
                });
                i = next;
                continue;
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut next = start;
                while next < chars.len() && (chars[next].is_alphanumeric() || chars[next] == '_') {
                    next += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Name(chars[start..next].iter().collect()),
                    position: start,
                });
                i = next;
                continue;
            }
            _ => {
                return Err(RootError::syntax(
                    start,
                    format!("unexpected character '{c}'"),
                ))
            }
        };
        tokens.push(Token {
            kind,
            position: start,
        });
        i += 1;
    }

    Ok(tokens)
}

/// Scans `digits [. digits] [(e|E) [+|-] digits]` starting at `start`.
fn scan_number(chars: &[char], start: usize) -> Result<(f64, usize)> {
    let digits_from = |mut i: usize| {
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = digits_from(start);
    if end < chars.len() && chars[end] == '.' {
        end = digits_from(end + 1);
    }
    if end - start == 1 && chars[start] == '.' {
        return Err(RootError::syntax(start, "expected digits around '.'"));
    }

    // An exponent is only taken when digits follow; otherwise `2e` is `2 * e`.
    if end < chars.len() && (chars[end] == 'e' || chars[end] == 'E') {
        let mut exponent = end + 1;
        if exponent < chars.len() && (chars[exponent] == '+' || chars[exponent] == '-') {
            exponent += 1;
        }
        if exponent < chars.len() && chars[exponent].is_ascii_digit() {
            end = digits_from(exponent);
        }
    }

    let text: String = chars[start..end].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| RootError::syntax(start, format!("malformed number '{text}'")))?;
    if !value.is_finite() {
        return Err(RootError::syntax(start, format!("number '{text}' is out of range")));
    }
    Ok((value, end))
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        "phi" => Some(1.618_033_988_749_895),
        _ => None,
    }
}

/// Deepest nesting accepted, counting parentheses, calls, unary signs,
/// exponents and the operands of each `+`/`-` or `*`/`/` chain.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    /// Character length of the source, used to locate end-of-input errors.
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|token| &token.kind) == Some(kind) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        match self.next() {
            Some(token) if &token.kind == kind => Ok(()),
            Some(token) => Err(RootError::syntax(
                token.position,
                format!("expected {} but found {}", kind.describe(), token.kind.describe()),
            )),
            None => Err(RootError::syntax(
                self.end,
                format!("expected {} but the expression ended", kind.describe()),
            )),
        }
    }

    /// Position of the most recently consumed token.
    fn last_position(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(self.end, |token| token.position)
    }

    /// Enters one more level of the tree, failing once `MAX_DEPTH` is reached.
    fn deepen(&mut self, position: usize) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(RootError::syntax(position, "expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn sum(&mut self) -> Result<Node> {
        let depth = self.depth;
        let mut node = self.product()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinaryOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinaryOp::Sub
            } else {
                self.depth = depth;
                return Ok(node);
            };
            // each fold adds a level to the left-leaning tree
            self.deepen(self.last_position())?;
            let rhs = self.product()?;
            node = Node::Binary(op, Box::new(node), Box::new(rhs));
        }
    }

    fn product(&mut self) -> Result<Node> {
        let depth = self.depth;
        let mut node = self.unary()?;
        loop {
            let op = match self.peek().map(|token| &token.kind) {
                Some(TokenKind::Star) => {
                    self.cursor += 1;
                    BinaryOp::Mul
                }
                Some(TokenKind::Slash) => {
                    self.cursor += 1;
                    BinaryOp::Div
                }
                Some(TokenKind::Name(_)) | Some(TokenKind::LParen) => BinaryOp::Mul,
                _ => {
                    self.depth = depth;
                    return Ok(node);
                }
            };
            self.deepen(self.last_position())?;
            let rhs = self.unary()?;
            node = Node::Binary(op, Box::new(node), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Node> {
        if self.eat(&TokenKind::Minus) {
            self.deepen(self.last_position())?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Node::Negate(Box::new(inner)));
        }
        if self.eat(&TokenKind::Plus) {
            self.deepen(self.last_position())?;
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(inner);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node> {
        let base = self.primary()?;
        if self.eat(&TokenKind::Caret) {
            self.deepen(self.last_position())?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Node::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node> {
        let token = match self.next() {
            Some(token) => token,
            None => {
                return Err(RootError::syntax(
                    self.end,
                    "unexpected end of expression",
                ))
            }
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Node::Number(value)),
            TokenKind::LParen => {
                self.deepen(self.last_position())?;
                let inner = self.sum()?;
                self.expect(&TokenKind::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            TokenKind::Name(name) => self.name(name, token.position),
            other => Err(RootError::syntax(
                token.position,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn name(&mut self, name: String, position: usize) -> Result<Node> {
        if name == "x" {
            return Ok(Node::Variable);
        }
        if let Some(value) = constant(&name) {
            return Ok(Node::Number(value));
        }

        let unary = Function::from_name(&name);
        let binary = Function2::from_name(&name);
        if unary.is_none() && binary.is_none() {
            return Err(RootError::syntax(
                position,
                format!("unknown name '{name}'; the only variable is 'x'"),
            ));
        }
        if !self.eat(&TokenKind::LParen) {
            return Err(RootError::syntax(
                position,
                format!("function '{name}' must be followed by '('"),
            ));
        }

        self.deepen(self.last_position())?;
        let mut args = vec![self.sum()?];
        while self.eat(&TokenKind::Comma) {
            args.push(self.sum()?);
        }
        self.expect(&TokenKind::RParen)?;
        self.depth -= 1;

        let found = args.len();
        let mut args = args.into_iter();
        match (unary, binary, args.next(), args.next()) {
            (Some(function), _, Some(arg), None) => Ok(Node::Call(function, Box::new(arg))),
            (_, Some(function), Some(first), Some(second)) if found == 2 => {
                Ok(Node::Call2(function, Box::new(first), Box::new(second)))
            }
            _ => {
                let expected = if unary.is_some() { 1 } else { 2 };
                Err(RootError::syntax(
                    position,
                    format!("function '{name}' expects {expected} argument(s), found {found}"),
                ))
            }
        }
    }
}
