//! Port bit-width evaluation.
//!
//! Resolves a raw port declaration such as `[INPUT_COUNT-1:0][DATA_WIDTH-1:0]`
//! into a total bit width. Each bracket group contributes `|hi - lo| + 1`
//! and the groups multiply, so packed multi-dimensional ports flatten into a
//! single integer width. A declaration with no bracket group is one bit wide.
//!
//! Range bounds are integer expressions over the case parameters:
//!
//! - decimal literals and sized literals (`8'd255`, `'hff`, `4'b1010`)
//! - parameter names
//! - `+ - * / % **`, unary minus and parentheses
//! - `clog2(x)` / `$clog2(x)`
//!
//! Division must be exact; anything that would produce a fraction is
//! rejected as a non-integer expression.

use std::collections::BTreeMap;

use crate::config::ConfigError;

/// Ceiling log2 with the hardware convention `clog2(0) == clog2(1) == 0`.
pub fn clog2(n: i64) -> i64 {
    if n <= 1 {
        0
    } else {
        (64 - ((n - 1) as u64).leading_zeros()) as i64
    }
}

/// Resolves the total width of a port declaration against `params`.
pub fn port_width(decl: &str, params: &BTreeMap<String, i64>) -> Result<u64, ConfigError> {
    WidthEvaluator::new(params).port_width(decl)
}

/// Evaluates width expressions against one case's parameters.
#[derive(Debug, Clone, Copy)]
pub struct WidthEvaluator<'a> {
    params: &'a BTreeMap<String, i64>,
}

impl<'a> WidthEvaluator<'a> {
    /// Creates an evaluator bound to a parameter mapping.
    pub fn new(params: &'a BTreeMap<String, i64>) -> Self {
        Self { params }
    }

    /// Returns the product of all bracket-group widths in `decl`.
    pub fn port_width(&self, decl: &str) -> Result<u64, ConfigError> {
        let mut total: u64 = 1;
        for group in bracket_groups(decl)? {
            let width = match group.split_once(':') {
                Some((hi, lo)) => {
                    let hi = self.eval(hi)?;
                    let lo = self.eval(lo)?;
                    hi.checked_sub(lo)
                        .and_then(|span| span.unsigned_abs().checked_add(1))
                        .ok_or_else(|| expression_error(group, "arithmetic overflow"))?
                }
                // `[N]` is an N-element dimension
                None => {
                    let n = self.eval(group)?;
                    if n < 1 {
                        return Err(expression_error(group, "dimension size must be positive"));
                    }
                    n as u64
                }
            };
            total = total
                .checked_mul(width)
                .ok_or_else(|| expression_error(decl, "width overflows 64 bits"))?;
        }
        Ok(total)
    }

    /// Evaluates a single integer expression.
    pub fn eval(&self, expr: &str) -> Result<i64, ConfigError> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            expr,
            params: self.params,
        };
        let value = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(expression_error(expr, "unexpected trailing input"));
        }
        Ok(value)
    }
}

fn expression_error(expr: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Expression {
        expr: expr.trim().to_string(),
        message: message.into(),
    }
}

fn bracket_groups(decl: &str) -> Result<Vec<&str>, ConfigError> {
    let mut groups = Vec::new();
    let mut rest = decl;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let close = after
            .find(']')
            .ok_or_else(|| expression_error(decl, "unterminated '['"))?;
        groups.push(&after[..close]);
        rest = &after[close + 1..];
    }
    Ok(groups)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Pow,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, ConfigError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '\'' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '\'' | '_')) {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_literal(expr, &literal)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(expression_error(expr, format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

/// Parses `255`, `8'd255`, `'hff`, `4'b1010`, `3'o7` (underscores allowed).
fn parse_literal(expr: &str, literal: &str) -> Result<i64, ConfigError> {
    let cleaned: String = literal.chars().filter(|&c| c != '_').collect();
    let (radix, digits) = match cleaned.split_once('\'') {
        None => (10, cleaned.as_str()),
        Some((_size, based)) => {
            let mut chars = based.chars();
            let radix = match chars.next().map(|c| c.to_ascii_lowercase()) {
                Some('d') => 10,
                Some('h') => 16,
                Some('b') => 2,
                Some('o') => 8,
                _ => return Err(expression_error(expr, format!("bad literal '{}'", literal))),
            };
            (radix, chars.as_str())
        }
    };
    i64::from_str_radix(digits, radix)
        .map_err(|_| expression_error(expr, format!("bad literal '{}'", literal)))
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    expr: &'t str,
    params: &'t BTreeMap<String, i64>,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn overflow(&self) -> ConfigError {
        expression_error(self.expr, "arithmetic overflow")
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<i64, ConfigError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or_else(|| self.overflow())?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or_else(|| self.overflow())?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<i64, ConfigError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    value = value.checked_mul(rhs).ok_or_else(|| self.overflow())?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0 {
                        return Err(expression_error(self.expr, "division by zero"));
                    }
                    if value.checked_rem(rhs).ok_or_else(|| self.overflow())? != 0 {
                        return Err(ConfigError::NonInteger {
                            expr: self.expr.trim().to_string(),
                        });
                    }
                    value = value.checked_div(rhs).ok_or_else(|| self.overflow())?;
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    if rhs == 0 {
                        return Err(expression_error(self.expr, "division by zero"));
                    }
                    value = value
                        .checked_rem_euclid(rhs)
                        .ok_or_else(|| self.overflow())?;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := ('-' | '+') unary | power
    fn unary(&mut self) -> Result<i64, ConfigError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let value = self.unary()?;
                value.checked_neg().ok_or_else(|| self.overflow())
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> Result<i64, ConfigError> {
        let base = self.primary()?;
        if self.peek() != Some(&Token::Pow) {
            return Ok(base);
        }
        self.pos += 1;
        let exp = self.unary()?;
        if exp < 0 {
            return Err(ConfigError::NonInteger {
                expr: self.expr.trim().to_string(),
            });
        }
        let exp = u32::try_from(exp).map_err(|_| self.overflow())?;
        base.checked_pow(exp).ok_or_else(|| self.overflow())
    }

    fn primary(&mut self) -> Result<i64, ConfigError> {
        let expr = self.expr;
        match self.next().cloned() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect_rparen()?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    return self.call(&name, arg);
                }
                self.params
                    .get(&name)
                    .copied()
                    .ok_or(ConfigError::UndefinedParameter(name))
            }
            Some(other) => Err(expression_error(expr, format!("unexpected token {:?}", other))),
            None => Err(expression_error(expr, "unexpected end of expression")),
        }
    }

    fn call(&self, name: &str, arg: i64) -> Result<i64, ConfigError> {
        match name {
            "clog2" | "$clog2" => Ok(clog2(arg)),
            other => Err(expression_error(self.expr, format!("unknown function '{}'", other))),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ConfigError> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            _ => Err(expression_error(self.expr, "expected ')'")),
        }
    }
}
