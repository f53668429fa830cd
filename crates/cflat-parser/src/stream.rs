//! Cursor over the materialized token sequence.

use cflat_syntax::token::Token;

/// Owned token sequence plus a monotonic cursor.
///
/// `advance` is the only mutator and never rewinds; all grammar
/// disambiguation uses forward lookahead of at most two tokens. Reading at
/// or past the end yields `None` rather than failing; callers treat `None`
/// as implicit end of input.
pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    /// Consume and return the next token.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    /// Next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Lookahead `n` tokens past the cursor; `peek_ahead(0)` is `peek`.
    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n)
    }

    /// True once the cursor has passed the last token.
    pub fn is_at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cflat_syntax::{Pos, TokenKind};

    fn stream(kinds: Vec<TokenKind>) -> TokenStream {
        TokenStream::new(
            kinds
                .into_iter()
                .map(|k| Token::new(k, Pos::new(1, 1, "test.c")))
                .collect(),
        )
    }

    #[test]
    fn reads_past_the_end_return_none() {
        let mut s = stream(vec![TokenKind::Newline]);
        assert!(s.advance().is_some());
        assert!(s.advance().is_none());
        assert!(s.peek().is_none());
        assert!(s.peek_ahead(5).is_none());
        assert!(s.is_at_end());
    }

    #[test]
    fn peek_does_not_consume() {
        let s = stream(vec![TokenKind::Number(1), TokenKind::Number(2)]);
        assert_eq!(s.peek().map(|t| &t.kind), Some(&TokenKind::Number(1)));
        assert_eq!(s.peek().map(|t| &t.kind), Some(&TokenKind::Number(1)));
        assert_eq!(
            s.peek_ahead(1).map(|t| &t.kind),
            Some(&TokenKind::Number(2))
        );
    }
}
