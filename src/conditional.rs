//! Conditional Expressions
//!
//! Descriptor elements may be gated by a conditional expression (`if` on
//! program bindings, `context` on technique requirements). Every such check
//! goes through [`passes`], which applies the one rule shared by all gates:
//! an empty expression is always true.
//!
//! The expression language itself sits behind [`ConditionEvaluator`]. The
//! default [`PreprocessorEvaluator`] understands the subset of C preprocessor
//! `#if` expressions that shader descriptors use:
//!
//! ```text
//! USE_SHADOW && !MODE_WIREFRAME
//! defined(USE_FOG) || QUALITY >= 2
//! ```

use crate::defines::DefineSet;
use crate::markup::Element;

/// Evaluates a conditional expression against a define set.
pub trait ConditionEvaluator {
    fn evaluate(&self, expression: &str, defines: &DefineSet) -> bool;
}

/// Returns whether an element gated by `expression` should be applied.
#[inline]
pub fn passes(evaluator: &dyn ConditionEvaluator, expression: &str, defines: &DefineSet) -> bool {
    expression.trim().is_empty() || evaluator.evaluate(expression, defines)
}

/// Children of `parent` whose `attribute` condition holds, in document order.
///
/// Children failing the condition are skipped entirely.
pub fn applicable_children<'a>(
    evaluator: &'a dyn ConditionEvaluator,
    parent: &'a Element,
    attribute: &'a str,
    defines: &'a DefineSet,
) -> impl Iterator<Item = &'a Element> + 'a {
    parent
        .children()
        .filter(move |child| passes(evaluator, child.attr(attribute), defines))
}

/// C-preprocessor style `#if` evaluator.
///
/// Identifiers resolve to the integer value of the define of that name;
/// undefined names and non-numeric values read as `0`. A malformed expression
/// is logged and evaluates to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessorEvaluator;

impl ConditionEvaluator for PreprocessorEvaluator {
    fn evaluate(&self, expression: &str, defines: &DefineSet) -> bool {
        match evaluate_expression(expression, defines) {
            Ok(value) => value != 0,
            Err(message) => {
                log::warn!("Failed to evaluate condition '{expression}': {message}");
                false
            }
        }
    }
}

/// Evaluates `expression` to its integer value.
pub fn evaluate_expression(expression: &str, defines: &DefineSet) -> Result<i64, String> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        defines,
    };
    let value = parser.parse_or()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(format!("unexpected token {token:?}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(i64),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
}

const OPERATORS: [&str; 17] = [
    "&&", "||", "==", "!=", "<=", ">=", "<", ">", "!", "+", "-", "*", "/", "%", "~", "&", "|",
];

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                i += 1;
            }
            tokens.push(Token::Number(parse_number(&input[start..i])?));
        } else if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Ident(input[start..i].to_string()));
        } else if c == b'(' {
            tokens.push(Token::LParen);
            i += 1;
        } else if c == b')' {
            tokens.push(Token::RParen);
            i += 1;
        } else if let Some(op) = OPERATORS.iter().find(|op| input[i..].starts_with(**op)) {
            tokens.push(Token::Op(*op));
            i += op.len();
        } else {
            return Err(format!("unexpected character '{}'", char::from(c)));
        }
    }
    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<i64, String> {
    let trimmed = literal.trim_end_matches(['u', 'U', 'l', 'L']);
    let parsed = if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else {
        trimmed.parse::<i64>()
    };
    parsed.map_err(|_| format!("invalid number '{literal}'"))
}

/// Deepest nesting of unary operators and parentheses accepted.
const MAX_DEPTH: usize = 128;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    defines: &'a DefineSet,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        if let Some(Token::Op(op)) = self.peek()
            && ops.contains(op)
        {
            let op = *op;
            self.pos += 1;
            return Some(op);
        }
        None
    }

    fn binary(
        &mut self,
        ops: &[&'static str],
        operand: fn(&mut Self) -> Result<i64, String>,
    ) -> Result<i64, String> {
        let mut lhs = operand(self)?;
        while let Some(op) = self.eat_op(ops) {
            let rhs = operand(self)?;
            lhs = apply(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<i64, String> {
        self.binary(&["||"], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<i64, String> {
        self.binary(&["&&"], Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> Result<i64, String> {
        self.binary(&["|"], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> Result<i64, String> {
        self.binary(&["&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<i64, String> {
        self.binary(&["==", "!="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<i64, String> {
        self.binary(&["<", ">", "<=", ">="], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<i64, String> {
        self.binary(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<i64, String> {
        self.binary(&["*", "/", "%"], Self::parse_unary)
    }

    // Every nesting level passes through here, so this bounds recursion.
    fn parse_unary(&mut self) -> Result<i64, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        self.depth += 1;
        let value = self.parse_unary_operand();
        self.depth -= 1;
        value
    }

    fn parse_unary_operand(&mut self) -> Result<i64, String> {
        match self.eat_op(&["!", "-", "+", "~"]) {
            Some("!") => Ok(i64::from(self.parse_unary()? == 0)),
            Some("-") => Ok(self.parse_unary()?.wrapping_neg()),
            Some("~") => Ok(!self.parse_unary()?),
            Some(_) => self.parse_unary(),
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<i64, String> {
        match self.advance().cloned() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Ident(name)) if name == "defined" => self.parse_defined(),
            Some(Token::Ident(name)) => Ok(self.resolve(&name)),
            Some(Token::LParen) => {
                let value = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("missing ')'".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn parse_defined(&mut self) -> Result<i64, String> {
        let parenthesized = matches!(self.peek(), Some(Token::LParen));
        if parenthesized {
            self.pos += 1;
        }
        let name = match self.advance() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err("'defined' expects an identifier".to_string()),
        };
        if parenthesized && !matches!(self.advance(), Some(Token::RParen)) {
            return Err("missing ')' after 'defined'".to_string());
        }
        Ok(i64::from(self.defines.contains(&name)))
    }

    fn resolve(&self, name: &str) -> i64 {
        self.defines
            .get(name)
            .and_then(|value| parse_number(value.trim()).ok())
            .unwrap_or(0)
    }
}

fn apply(op: &str, lhs: i64, rhs: i64) -> Result<i64, String> {
    Ok(match op {
        "||" => i64::from(lhs != 0 || rhs != 0),
        "&&" => i64::from(lhs != 0 && rhs != 0),
        "|" => lhs | rhs,
        "&" => lhs & rhs,
        "==" => i64::from(lhs == rhs),
        "!=" => i64::from(lhs != rhs),
        "<" => i64::from(lhs < rhs),
        ">" => i64::from(lhs > rhs),
        "<=" => i64::from(lhs <= rhs),
        ">=" => i64::from(lhs >= rhs),
        "+" => lhs.wrapping_add(rhs),
        "-" => lhs.wrapping_sub(rhs),
        "*" => lhs.wrapping_mul(rhs),
        "/" | "%" if rhs == 0 => return Err("division by zero".to_string()),
        "/" => lhs.wrapping_div(rhs),
        "%" => lhs.wrapping_rem(rhs),
        other => return Err(format!("unsupported operator '{other}'")),
    })
}
