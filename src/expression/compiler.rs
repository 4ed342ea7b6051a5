//! Precedence-climbing expression parser
//!
//!     The compiler owns four immutable identifier tables (unary operators, binary operators,
//!     functions and variables). Parsing tokenizes the input against the union of their
//!     representations and then descends through token ranges:
//!
//!         binary (one priority level at a time, loosest first)
//!           └── unary (prefix operator applied to the rest of the range)
//!                 └── primary (bracket, variable, function call or literal)
//!
//!     A binary operator is taken at bracket depth 0 only, and only where it has an operand
//!     on both sides: its left neighbour must end an operand (a literal, a variable or `)`),
//!     which is what lets `-` be both a prefix and an infix operator. Within one priority
//!     level the rightmost such operator splits the range, so chains like `10-3-2` associate
//!     to the left.
//!
//!     The priority walk visits only the distinct priorities the binary operators declare,
//!     so recursion depth follows the number of levels and not the numeric distance between
//!     them.
//!
//!     All spans reported in [`ParseError`] are token index ranges into the tokenized input.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use super::identifiers::{BinaryOperator, Function, IdentifierError, UnaryOperator, Variable};
use super::scalar::{LiteralError, Scalar};
use super::tree::Expression;
use crate::lexing::{tokenize, LexError, Token, TokenKind};

/// Errors that can occur while parsing an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Lex(LexError),
    /// Nothing to parse where an expression was required
    Empty { span: Range<usize> },
    /// An operator without the operand it needs
    MissingOperand { operator: String, span: Range<usize> },
    UnbalancedBrackets { span: Range<usize>, excerpt: String },
    /// A name that is not registered as a variable or function
    UnknownIdentifier { name: String, span: Range<usize> },
    /// A token sequence that cannot be reduced to an expression
    UnexpectedTokens { span: Range<usize>, excerpt: String },
    InvalidLiteral {
        error: LiteralError,
        span: Range<usize>,
    },
    /// A function with a declared arity called with a different number of arguments
    Arity {
        function: String,
        expected: usize,
        found: usize,
        span: Range<usize>,
    },
}

impl ParseError {
    /// Token range the error refers to
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::Empty { span }
            | ParseError::MissingOperand { span, .. }
            | ParseError::UnbalancedBrackets { span, .. }
            | ParseError::UnknownIdentifier { span, .. }
            | ParseError::UnexpectedTokens { span, .. }
            | ParseError::InvalidLiteral { span, .. }
            | ParseError::Arity { span, .. } => Some(span.clone()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "Parse error: {}", err),
            ParseError::Empty { span } => {
                write!(f, "Parse error: missing expression at tokens {:?}", span)
            }
            ParseError::MissingOperand { operator, span } => write!(
                f,
                "Parse error: operator '{}' at tokens {:?} is missing an operand",
                operator, span
            ),
            ParseError::UnbalancedBrackets { span, excerpt } => write!(
                f,
                "Parse error: unbalanced brackets in '{}' at tokens {:?}",
                excerpt, span
            ),
            ParseError::UnknownIdentifier { name, span } => write!(
                f,
                "Parse error: unknown identifier '{}' at tokens {:?}",
                name, span
            ),
            ParseError::UnexpectedTokens { span, excerpt } => write!(
                f,
                "Parse error: cannot parse '{}' at tokens {:?}",
                excerpt, span
            ),
            ParseError::InvalidLiteral { error, span } => {
                write!(f, "Parse error: {} at tokens {:?}", error, span)
            }
            ParseError::Arity {
                function,
                expected,
                found,
                span,
            } => write!(
                f,
                "Parse error: function '{}' expects {} arguments, found {} at tokens {:?}",
                function, expected, found, span
            ),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

/// Compiles expression text into [`Expression`] trees
pub struct ExpressionCompiler<T> {
    unary: HashMap<String, Arc<UnaryOperator<T>>>,
    binary: HashMap<String, Arc<BinaryOperator<T>>>,
    functions: HashMap<String, Arc<Function<T>>>,
    variables: HashMap<String, usize>,
    known: HashSet<String>,
    /// Distinct binary priorities, loosest first
    levels: Vec<i32>,
}

impl<T: Scalar> ExpressionCompiler<T> {
    pub fn new(
        unary: Vec<UnaryOperator<T>>,
        binary: Vec<BinaryOperator<T>>,
        functions: Vec<Function<T>>,
        variables: Vec<Variable>,
    ) -> Result<Self, IdentifierError> {
        Self::from_shared(
            unary.into_iter().map(Arc::new),
            binary.into_iter().map(Arc::new),
            functions.into_iter().map(Arc::new),
            variables,
        )
    }

    /// Build a compiler over identifiers shared with other compilers
    pub fn from_shared(
        unary: impl IntoIterator<Item = Arc<UnaryOperator<T>>>,
        binary: impl IntoIterator<Item = Arc<BinaryOperator<T>>>,
        functions: impl IntoIterator<Item = Arc<Function<T>>>,
        variables: impl IntoIterator<Item = Variable>,
    ) -> Result<Self, IdentifierError> {
        let duplicate = |representation: &str| IdentifierError::DuplicateIdentifier {
            representation: representation.to_string(),
        };

        let mut compiler = Self {
            unary: HashMap::new(),
            binary: HashMap::new(),
            functions: HashMap::new(),
            variables: HashMap::new(),
            known: HashSet::new(),
            levels: Vec::new(),
        };

        // A unary and a binary operator may share a representation; prefix and infix
        // positions never overlap. Nothing else may.
        for op in unary {
            let repr = op.representation().to_string();
            if compiler.unary.contains_key(&repr) {
                return Err(duplicate(&repr));
            }
            compiler.known.insert(repr.clone());
            compiler.unary.insert(repr, op);
        }

        for op in binary {
            let repr = op.representation().to_string();
            if compiler.binary.contains_key(&repr) {
                return Err(duplicate(&repr));
            }
            compiler.levels.push(op.priority());
            compiler.known.insert(repr.clone());
            compiler.binary.insert(repr, op);
        }
        compiler.levels.sort_unstable();
        compiler.levels.dedup();

        for function in functions {
            let repr = function.representation().to_string();
            if !compiler.known.insert(repr.clone()) {
                return Err(duplicate(&repr));
            }
            compiler.functions.insert(repr, function);
        }

        for variable in variables {
            let repr = variable.representation().to_string();
            if !compiler.known.insert(repr.clone()) {
                return Err(duplicate(&repr));
            }
            compiler.variables.insert(repr, variable.index());
        }

        Ok(compiler)
    }

    /// Every representation known to this compiler
    pub fn identifiers(&self) -> &HashSet<String> {
        &self.known
    }

    /// Parse `input` into an expression
    pub fn parse(&self, input: &str) -> Result<Expression<T>, ParseError> {
        let tokens = tokenize(input, &self.known)?;
        check_balance(&tokens)?;
        self.parse_binary(&tokens, 0, 0..tokens.len())
    }

    /// Read a single literal, without variables or operators
    pub fn parse_literal(&self, input: &str) -> Result<T, LiteralError> {
        T::parse_literal(input.trim())
    }

    /// Parse `span` with binary operators of `levels[level]` or tighter
    fn parse_binary(
        &self,
        tokens: &[Token],
        level: usize,
        span: Range<usize>,
    ) -> Result<Expression<T>, ParseError> {
        if span.is_empty() {
            return Err(ParseError::Empty { span });
        }
        let Some(&priority) = self.levels.get(level) else {
            return self.parse_unary(tokens, span);
        };

        let mut depth = 0i32;
        let mut split = None;
        for i in span.clone() {
            let token = &tokens[i];
            if token.is_open() {
                depth += 1;
            } else if token.is_close() {
                depth -= 1;
            } else if depth == 0
                && i != span.start
                && i + 1 != span.end
                && token.kind == TokenKind::Identifier
                && self.ends_operand(&tokens[i - 1])
            {
                if let Some(op) = self.binary.get(&token.text) {
                    if op.priority() == priority {
                        split = Some((i, op));
                    }
                }
            }
        }

        match split {
            Some((i, op)) => {
                let left = self.parse_binary(tokens, level, span.start..i)?;
                let right = self.parse_binary(tokens, level + 1, i + 1..span.end)?;
                Ok(Expression::Binary(
                    op.clone(),
                    Box::new(left),
                    Box::new(right),
                ))
            }
            None => self.parse_binary(tokens, level + 1, span),
        }
    }

    fn parse_unary(&self, tokens: &[Token], span: Range<usize>) -> Result<Expression<T>, ParseError> {
        let first = &tokens[span.start];
        if first.kind == TokenKind::Identifier {
            if let Some(op) = self.unary.get(&first.text) {
                if span.len() == 1 {
                    return Err(ParseError::MissingOperand {
                        operator: first.text.clone(),
                        span,
                    });
                }
                let operand = self.parse_unary(tokens, span.start + 1..span.end)?;
                return Ok(Expression::Unary(op.clone(), Box::new(operand)));
            }
        }
        self.parse_primary(tokens, span)
    }

    fn parse_primary(
        &self,
        tokens: &[Token],
        span: Range<usize>,
    ) -> Result<Expression<T>, ParseError> {
        if span.is_empty() {
            return Err(ParseError::Empty { span });
        }
        let first = &tokens[span.start];

        match first.kind {
            TokenKind::Control if first.is_open() => {
                let close = matching_close(tokens, span.start, span.end)
                    .ok_or_else(|| unbalanced(tokens, span.clone()))?;
                if close + 1 != span.end {
                    return Err(unexpected(tokens, span));
                }
                // Brackets can contain anything, start again from the loosest operators
                self.parse_binary(tokens, 0, span.start + 1..close)
            }
            TokenKind::Control => Err(unexpected(tokens, span)),
            TokenKind::Identifier => self.parse_identifier(tokens, span),
            TokenKind::Literal => self.parse_literal_token(tokens, span),
        }
    }

    fn parse_identifier(
        &self,
        tokens: &[Token],
        span: Range<usize>,
    ) -> Result<Expression<T>, ParseError> {
        let name = &tokens[span.start].text;

        if let Some(index) = self.variables.get(name) {
            if span.len() == 1 {
                return Ok(Expression::Variable(*index));
            }
            return Err(unexpected(tokens, span));
        }
        if let Some(function) = self.functions.get(name) {
            return self.parse_call(function, tokens, span);
        }

        // Operators in operand position lack an operand on their left
        Err(ParseError::MissingOperand {
            operator: name.clone(),
            span,
        })
    }

    fn parse_call(
        &self,
        function: &Arc<Function<T>>,
        tokens: &[Token],
        span: Range<usize>,
    ) -> Result<Expression<T>, ParseError> {
        let open = span.start + 1;
        if open >= span.end || !tokens[open].is_open() {
            return Err(ParseError::UnbalancedBrackets {
                excerpt: excerpt(tokens, span.clone()),
                span,
            });
        }
        let close =
            matching_close(tokens, open, span.end).ok_or_else(|| unbalanced(tokens, span.clone()))?;
        if close + 1 != span.end {
            return Err(unexpected(tokens, span));
        }

        let mut arguments = Vec::new();
        if close > open + 1 {
            let mut depth = 0i32;
            let mut start = open + 1;
            for i in open + 1..close {
                let token = &tokens[i];
                if token.is_open() {
                    depth += 1;
                } else if token.is_close() {
                    depth -= 1;
                } else if token.is_comma() && depth == 0 {
                    arguments.push(self.parse_binary(tokens, 0, start..i)?);
                    start = i + 1;
                }
            }
            arguments.push(self.parse_binary(tokens, 0, start..close)?);
        }

        if let Some(expected) = function.arity() {
            if expected != arguments.len() {
                return Err(ParseError::Arity {
                    function: function.representation().to_string(),
                    expected,
                    found: arguments.len(),
                    span,
                });
            }
        }

        Ok(Expression::Call(function.clone(), arguments))
    }

    fn parse_literal_token(
        &self,
        tokens: &[Token],
        span: Range<usize>,
    ) -> Result<Expression<T>, ParseError> {
        let first = &tokens[span.start];
        if span.len() > 1 {
            if tokens[span.start + 1].is_open() {
                return Err(ParseError::UnknownIdentifier {
                    name: first.text.clone(),
                    span,
                });
            }
            return Err(unexpected(tokens, span));
        }

        match T::parse_literal(&first.text) {
            Ok(value) => Ok(Expression::Literal(value)),
            Err(_) if starts_like_name(&first.text) => Err(ParseError::UnknownIdentifier {
                name: first.text.clone(),
                span,
            }),
            Err(error) => Err(ParseError::InvalidLiteral { error, span }),
        }
    }

    /// Check if `token` can be the last token of a left operand
    fn ends_operand(&self, token: &Token) -> bool {
        match token.kind {
            TokenKind::Control => token.is_close(),
            TokenKind::Literal => true,
            TokenKind::Identifier => self.variables.contains_key(&token.text),
        }
    }
}

impl<T> fmt::Debug for ExpressionCompiler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<&String> = self.known.iter().collect();
        identifiers.sort();
        f.debug_struct("ExpressionCompiler")
            .field("identifiers", &identifiers)
            .field("priorities", &self.levels)
            .finish()
    }
}

fn starts_like_name(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

fn excerpt(tokens: &[Token], span: Range<usize>) -> String {
    tokens[span]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unexpected(tokens: &[Token], span: Range<usize>) -> ParseError {
    ParseError::UnexpectedTokens {
        excerpt: excerpt(tokens, span.clone()),
        span,
    }
}

fn unbalanced(tokens: &[Token], span: Range<usize>) -> ParseError {
    ParseError::UnbalancedBrackets {
        excerpt: excerpt(tokens, span.clone()),
        span,
    }
}

/// Index of the bracket closing the one at `open`, searching before `end`
fn matching_close(tokens: &[Token], open: usize, end: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate().take(end).skip(open) {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn check_balance(tokens: &[Token]) -> Result<(), ParseError> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth -= 1;
            if depth < 0 {
                return Err(unbalanced(tokens, 0..i + 1));
            }
        }
    }
    if depth != 0 {
        return Err(unbalanced(tokens, 0..tokens.len()));
    }
    Ok(())
}
