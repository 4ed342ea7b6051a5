//! Lexer
//!
//!     Tokenization for the expression sub-language used inside module parameters and rule
//!     guards. Scanning is done by a logos lexer over four character classes (words, numbers,
//!     control characters and symbol runs); a second pass classifies every scanned token as
//!     Control, Identifier or Literal.
//!
//! Identifiers
//!
//!     Whether a word or symbol run is an identifier depends on the compiler that asks: the
//!     same text `x` is a variable in `A(x)->B(x+1)` and an unparseable literal elsewhere. The
//!     tokenizer therefore takes the set of known representations as an argument instead of
//!     owning one.
//!
//!     Words may contain digits and periods after their first character, so `x2` is a single
//!     token while `2x` is two.

pub mod tokenizer;
pub mod tokens;

pub use tokenizer::{tokenize, LexError, Token, TokenKind};
pub use tokens::RawToken;
