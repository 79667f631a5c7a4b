use std::sync::LazyLock;

use regex::Regex;
use rootcause::Report;

use crate::search::{Icon, Provider, ProviderKind, ResultAction, SearchResult};

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+\-*%/().^]+$").expect("valid expression regex"));

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unexpected {0}")]
    Unexpected(Token),
    #[error("result is not a finite number")]
    NotFinite,
    #[error("expression is nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(String),
    /// `N%` written without a space
    Percent(String),
    Operator(char),
    LeftParen,
    RightParen,
    End,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::Percent(n) => write!(f, "percentage {n}%"),
            Token::Operator(op) => write!(f, "operator {op}"),
            Token::LeftParen => f.write_str("'('"),
            Token::RightParen => f.write_str("')'"),
            Token::End => f.write_str("end of expression"),
        }
    }
}

fn tokenize(expr: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' | '.' => {
                let mut number = String::new();
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit() || **d == '.') {
                    number.push(d);
                    chars.next();
                }
                if chars.next_if_eq(&'%').is_some() {
                    tokens.push(Token::Percent(number));
                } else {
                    tokens.push(Token::Number(number));
                }
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Operator(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            _ => {
                chars.next();
            }
        }
    }

    tokens.push(Token::End);
    tokens
}

/// Deepest nesting of parentheses, signs and exponents the parser descends
/// into before giving up. Keeps pasted input from exhausting the stack.
const MAX_DEPTH: usize = 256;

fn parse_number(raw: &str) -> Result<f64, EvalError> {
    raw.parse()
        .map_err(|_| EvalError::InvalidNumber(raw.to_string()))
}

/// Recursive descent over
///
/// ```text
/// expr   = term (('+' | '-') (percent | term))*
/// term   = power (('*' | '/' | '%') power)*
/// power  = factor ('^' power)?
/// factor = number | percent | '(' expr ')' | ('-' | '+') factor
/// ```
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::End)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        self.pos += 1;
        token
    }

    fn peek_operator(&self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Token::Operator(op) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn nested(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<f64, EvalError>,
    ) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }

        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut result = self.term()?;

        while let Some(op) = self.peek_operator(&['+', '-']) {
            self.bump();

            // `a + N%` adds N percent of a
            let right = if let Token::Percent(raw) = self.peek() {
                let amount = result * parse_number(raw)? / 100.0;
                self.bump();
                amount
            } else {
                self.term()?
            };

            if op == '+' {
                result += right;
            } else {
                result -= right;
            }
        }

        Ok(result)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut result = self.power()?;

        while let Some(op) = self.peek_operator(&['*', '/', '%']) {
            self.bump();
            let right = self.power()?;

            match op {
                '*' => result *= right,
                '/' if right == 0.0 => return Err(EvalError::DivisionByZero),
                '/' => result /= right,
                _ if right == 0.0 => return Err(EvalError::ModuloByZero),
                _ => result %= right,
            }
        }

        Ok(result)
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.factor()?;

        if self.peek_operator(&['^']).is_some() {
            self.bump();
            return Ok(base.powf(self.nested(Self::power)?));
        }

        Ok(base)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        match self.bump() {
            Token::Number(raw) => parse_number(&raw),
            Token::Percent(raw) => Ok(parse_number(&raw)? / 100.0),
            Token::LeftParen => {
                let value = self.nested(Self::expr)?;
                match self.bump() {
                    Token::RightParen => Ok(value),
                    other => Err(EvalError::Unexpected(other)),
                }
            }
            Token::Operator('-') => Ok(-self.nested(Self::factor)?),
            Token::Operator('+') => self.nested(Self::factor),
            other => Err(EvalError::Unexpected(other)),
        }
    }
}

/// Evaluates an arithmetic expression.
///
/// # Errors
///
/// Malformed input, division or modulo by zero, and non-finite results.
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let mut parser = Parser {
        tokens: tokenize(expr),
        pos: 0,
        depth: 0,
    };

    let value = parser.expr()?;
    match parser.bump() {
        Token::End => {}
        other => return Err(EvalError::Unexpected(other)),
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NotFinite)
    }
}

/// Whole numbers without decimals, otherwise 4 decimals (6 below 0.1)
/// with trailing zeros trimmed.
#[must_use]
pub fn format_value(value: f64) -> String {
    // Normalizes -0
    let value = value + 0.0;

    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }

    let precision = if value.abs() < 0.1 { 6 } else { 4 };
    let formatted = format!("{value:.precision$}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    if trimmed == "-0" { "0" } else { trimmed }.to_string()
}

pub struct CalculatorProvider {
    priority: i32,
}

impl CalculatorProvider {
    #[must_use]
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

impl Provider for CalculatorProvider {
    fn name(&self) -> &str {
        "Calculator"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Calculator
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, query: &str) -> bool {
        let query = query.trim();
        query.chars().any(|c| c.is_ascii_digit()) && EXPRESSION.is_match(query)
    }

    fn search(&self, query: &str) -> Result<Vec<SearchResult>, Report> {
        let expr = query.trim();

        let result = match evaluate(expr) {
            Ok(value) => {
                let value = format_value(value);
                SearchResult::new(ProviderKind::Calculator, format!("{expr} = {value}"))
                    .description("Press Enter to copy the result")
                    .path(format!("calculator:{expr}"))
                    .icon(Icon::Symbol("="))
                    .action(ResultAction::Copy(value))
            }
            Err(err) => {
                tracing::debug!(expr, error = %err, "expression did not evaluate");
                SearchResult::new(ProviderKind::Calculator, format!("Error: {err}"))
                    .description("Could not calculate the expression")
                    .path(format!("calculator:{expr}"))
                    .icon(Icon::Symbol("!"))
            }
        };

        Ok(vec![result])
    }
}
