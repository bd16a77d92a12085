use core::fmt;

use logos::Logos;

#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    Eof,
    Illegal,

    #[regex(r"[a-zA-Z_]+")]
    Ident,

    #[regex(r"[0-9]+")]
    Int,

    // An unterminated string runs to the end of the input
    #[regex(r#""[^"]*"?"#)]
    String,

    #[token("let")]
    Let,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("fn")]
    Function,

    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("!")]
    Bang,
    #[token("!=")]
    NotEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eof => "EOF",
            Self::Illegal => "ILLEGAL",
            Self::Ident => "IDENT",
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Let => "LET",
            Self::Return => "RETURN",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::Function => "FUNCTION",
            Self::Assign => "=",
            Self::Eq => "==",
            Self::Bang => "!",
            Self::NotEq => "!=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub literal: &'a str,
}

impl<'a> Token<'a> {
    pub fn eof() -> Self {
        Self { kind: TokenKind::Eof, literal: "" }
    }
}

/// Pull based token source. Once the input is exhausted every further call
/// to [Lexer::next_token] yields an `Eof` token.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { inner: TokenKind::lexer(input) }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        let kind = match self.inner.next() {
            None => return Token::eof(),
            Some(Ok(kind)) => kind,
            Some(Err(())) => TokenKind::Illegal,
        };

        let slice = self.inner.slice();
        let literal = match kind {
            TokenKind::String => {
                let body = &slice[1..];
                body.strip_suffix('"').unwrap_or(body)
            }
            _ => slice,
        };

        Token { kind, literal }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokenize(input: &str) -> Vec<(TokenKind, &str)> {
        let mut lexer = Lexer::new(input);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token();
            tokens.push((token.kind, token.literal));
            if token.kind == TokenKind::Eof {
                return tokens;
            }
        }
    }

    #[test]
    fn lexes_a_small_program() {
        use TokenKind::*;

        let tokens = tokenize(r#"let five = 5;
            let add = fn(x, y) { x + y; };
            !-/*5 < 10 > 5; 10 == 10 != 9
            "foo bar" [1, 2] {"a": 1}"#);

        assert_eq!(tokens, vec![
            (Let, "let"), (Ident, "five"), (Assign, "="), (Int, "5"), (Semicolon, ";"),
            (Let, "let"), (Ident, "add"), (Assign, "="), (Function, "fn"), (LeftParen, "("),
            (Ident, "x"), (Comma, ","), (Ident, "y"), (RightParen, ")"), (LeftBrace, "{"),
            (Ident, "x"), (Plus, "+"), (Ident, "y"), (Semicolon, ";"), (RightBrace, "}"), (Semicolon, ";"),
            (Bang, "!"), (Minus, "-"), (Slash, "/"), (Asterisk, "*"), (Int, "5"), (Lt, "<"), (Int, "10"),
            (Gt, ">"), (Int, "5"), (Semicolon, ";"), (Int, "10"), (Eq, "=="), (Int, "10"), (NotEq, "!="), (Int, "9"),
            (String, "foo bar"), (LeftBracket, "["), (Int, "1"), (Comma, ","), (Int, "2"), (RightBracket, "]"),
            (LeftBrace, "{"), (String, "a"), (Colon, ":"), (Int, "1"), (RightBrace, "}"),
            (Eof, ""),
        ]);
    }

    #[test]
    fn keywords_only_match_whole_words() {
        let tokens = tokenize("letter iffy fn_ returned");
        assert!(tokens[..4].iter().all(|(kind, _)| *kind == TokenKind::Ident));
    }

    #[test]
    fn unknown_characters_are_illegal() {
        let tokens = tokenize("a @ b");
        assert_eq!(tokens[1], (TokenKind::Illegal, "@"));
        assert_eq!(tokens[2], (TokenKind::Ident, "b"));
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() {
        let tokens = tokenize(r#"x "abc def"#);
        assert_eq!(tokens[1], (TokenKind::String, "abc def"));
        assert_eq!(tokens[2].0, TokenKind::Eof);
    }

    #[test]
    fn eof_repeats_after_exhaustion() {
        let mut lexer = Lexer::new("1");
        assert_eq!(lexer.next_token().kind, TokenKind::Int);
        assert_eq!(lexer.next_token(), Token::eof());
        assert_eq!(lexer.next_token(), Token::eof());
    }
}
