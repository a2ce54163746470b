//! Lexer (tokenizer) for definition source text.

use crate::{ParseError, ParseResult, Span};

/// Token types.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords (case-sensitive)
    Module,
    EndModule,
    Imports,
    Syntax,
    Rule,
    Context,
    Configuration,
    Requires,
    Ensures,

    // Names and literals
    /// Sorts, labels, module names and variables, including `#`, `.`,
    /// `!`, `?` and `$` prefixes.
    Ident(String),
    /// A backquoted label such as `` `_+Int_` ``.
    Quoted(String),
    Int(i64),
    String(String),

    // Cells
    /// `<name key="value" ...>`
    CellOpen(String, Vec<(String, String)>),
    CellClose(String), // </name>

    // Symbols
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    Comma,     // ,
    Colon,     // :
    DefinedAs, // ::=
    Arrow,     // =>
    Then,      // ~>
    Ellipsis,  // ...

    // End of file
    Eof,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Module => "module",
            TokenKind::EndModule => "endmodule",
            TokenKind::Imports => "imports",
            TokenKind::Syntax => "syntax",
            TokenKind::Rule => "rule",
            TokenKind::Context => "context",
            TokenKind::Configuration => "configuration",
            TokenKind::Requires => "requires",
            TokenKind::Ensures => "ensures",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Quoted(_) => "quoted label",
            TokenKind::Int(_) => "integer",
            TokenKind::String(_) => "string",
            TokenKind::CellOpen(..) => "cell",
            TokenKind::CellClose(_) => "cell end",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::DefinedAs => "::=",
            TokenKind::Arrow => "=>",
            TokenKind::Then => "~>",
            TokenKind::Ellipsis => "...",
            TokenKind::Eof => "end of input",
        }
    }

    /// Returns true if this token can begin a term.
    pub fn starts_term(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Quoted(_)
                | TokenKind::Int(_)
                | TokenKind::String(_)
                | TokenKind::CellOpen(..)
                | TokenKind::LParen
        )
    }
}

/// A token with its span.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: usize, column: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    pos: usize,
    line: usize,
    column: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize all input into a vector of tokens.
    pub fn tokenize(mut self) -> ParseResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn span_from(&self, start: usize, start_line: usize, start_col: usize) -> Span {
        Span::new(start, self.pos, start_line, start_col)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.peek().map(|(_, c)| *c)
    }

    fn next_char(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.pos = pos + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> ParseResult<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.next_char();
                    }
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let (start, line, col) = (self.pos, self.line, self.column);
                    self.next_char();
                    self.next_char();
                    loop {
                        match self.next_char() {
                            Some('*') if self.peek_char() == Some('/') => {
                                self.next_char();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(ParseError::new(
                                    "unterminated block comment",
                                    self.span_from(start, line, col),
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_name(&mut self, into: &mut String) {
        while let Some(c) = self.peek_char() {
            if is_name_char(c) {
                into.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let Some(c) = self.next_char() else {
            return Ok(Token::eof(self.pos, self.line, self.column));
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => {
                if self.peek_char() == Some(':') && self.peek_second() == Some('=') {
                    self.next_char();
                    self.next_char();
                    TokenKind::DefinedAs
                } else {
                    TokenKind::Colon
                }
            }
            '=' if self.peek_char() == Some('>') => {
                self.next_char();
                TokenKind::Arrow
            }
            '~' if self.peek_char() == Some('>') => {
                self.next_char();
                TokenKind::Then
            }
            '.' if self.peek_char() == Some('.') => {
                self.next_char();
                if self.next_char() != Some('.') {
                    return Err(ParseError::new(
                        "expected '...'",
                        self.span_from(start, start_line, start_col),
                    ));
                }
                TokenKind::Ellipsis
            }
            '<' => self.scan_cell(start, start_line, start_col)?,
            '`' => self.scan_quoted(start, start_line, start_col)?,
            '"' => self.scan_string(start, start_line, start_col)?,
            '-' if matches!(self.peek_char(), Some('0'..='9')) => {
                self.scan_int(c, start, start_line, start_col)?
            }
            '0'..='9' => self.scan_int(c, start, start_line, start_col)?,
            '#' | '.' | '!' | '?' | '$' if matches!(self.peek_char(), Some(n) if n.is_alphabetic()) => {
                let mut name = c.to_string();
                self.scan_name(&mut name);
                TokenKind::Ident(name)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = c.to_string();
                self.scan_name(&mut name);
                keyword_or_ident(name)
            }
            _ => {
                return Err(ParseError::new(
                    format!("unexpected character '{}'", c),
                    self.span_from(start, start_line, start_col),
                ));
            }
        };

        Ok(Token::new(
            kind,
            self.span_from(start, start_line, start_col),
        ))
    }

    fn scan_cell(
        &mut self,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        let closing = if self.peek_char() == Some('/') {
            self.next_char();
            true
        } else {
            false
        };
        let mut name = String::new();
        self.scan_name(&mut name);
        if name.is_empty() {
            return Err(ParseError::new(
                "malformed cell tag",
                self.span_from(start, start_line, start_col),
            ));
        }

        let mut attributes = Vec::new();
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.next_char();
            }
            match self.next_char() {
                Some('>') => break,
                Some(c) if !closing && c.is_alphabetic() => {
                    let mut key = c.to_string();
                    self.scan_name(&mut key);
                    if self.next_char() != Some('=') || self.next_char() != Some('"') {
                        return Err(ParseError::new(
                            format!("malformed attribute '{}' in cell <{}>", key, name),
                            self.span_from(start, start_line, start_col),
                        ));
                    }
                    let value = self.scan_string_value(start, start_line, start_col)?;
                    attributes.push((key, value));
                }
                _ => {
                    return Err(ParseError::new(
                        "malformed cell tag",
                        self.span_from(start, start_line, start_col),
                    ))
                }
            }
        }

        Ok(if closing {
            TokenKind::CellClose(name)
        } else {
            TokenKind::CellOpen(name, attributes)
        })
    }

    fn scan_quoted(
        &mut self,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        let mut label = String::new();
        loop {
            match self.next_char() {
                Some('`') => break,
                Some(c) => label.push(c),
                None => {
                    return Err(ParseError::new(
                        "unterminated quoted label",
                        self.span_from(start, start_line, start_col),
                    ))
                }
            }
        }
        if label.is_empty() {
            return Err(ParseError::new(
                "empty quoted label",
                self.span_from(start, start_line, start_col),
            ));
        }
        Ok(TokenKind::Quoted(label))
    }

    fn scan_string(
        &mut self,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        self.scan_string_value(start, start_line, start_col)
            .map(TokenKind::String)
    }

    /// Body of a string literal after the opening quote.
    fn scan_string_value(
        &mut self,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<String> {
        let mut value = String::new();

        loop {
            match self.next_char() {
                None => {
                    return Err(ParseError::new(
                        "unterminated string literal",
                        self.span_from(start, start_line, start_col),
                    ));
                }
                Some('"') => break,
                Some('\\') => {
                    let escaped = match self.next_char() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => {
                            return Err(ParseError::new(
                                format!("invalid escape sequence '\\{}'", c),
                                self.span_from(start, start_line, start_col),
                            ));
                        }
                        None => {
                            return Err(ParseError::new(
                                "unterminated escape sequence",
                                self.span_from(start, start_line, start_col),
                            ));
                        }
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }

        Ok(value)
    }

    fn scan_int(
        &mut self,
        first: char,
        start: usize,
        start_line: usize,
        start_col: usize,
    ) -> ParseResult<TokenKind> {
        let mut number = first.to_string();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                number.push(c);
                self.next_char();
            } else {
                break;
            }
        }
        let value: i64 = number.parse().map_err(|_| {
            ParseError::new(
                format!("invalid integer literal '{}'", number),
                self.span_from(start, start_line, start_col),
            )
        })?;
        Ok(TokenKind::Int(value))
    }
}

fn keyword_or_ident(name: String) -> TokenKind {
    match name.as_str() {
        "module" => TokenKind::Module,
        "endmodule" => TokenKind::EndModule,
        "imports" => TokenKind::Imports,
        "syntax" => TokenKind::Syntax,
        "rule" => TokenKind::Rule,
        "context" => TokenKind::Context,
        "configuration" => TokenKind::Configuration,
        "requires" => TokenKind::Requires,
        "ensures" => TokenKind::Ensures,
        _ => TokenKind::Ident(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let kinds = tokenize("module Module endmodule");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Module,
                TokenKind::Ident("Module".into()),
                TokenKind::EndModule,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_prefixed_names() {
        let kinds = tokenize("#istream .Map !N ?X $PGM K-TERM _");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident("#istream".into()),
                TokenKind::Ident(".Map".into()),
                TokenKind::Ident("!N".into()),
                TokenKind::Ident("?X".into()),
                TokenKind::Ident("$PGM".into()),
                TokenKind::Ident("K-TERM".into()),
                TokenKind::Ident("_".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_cells_and_arrows() {
        let kinds = tokenize("<k> X => Y ~> Z ...</k>");
        assert_eq!(
            kinds,
            vec![
                TokenKind::CellOpen("k".into(), Vec::new()),
                TokenKind::Ident("X".into()),
                TokenKind::Arrow,
                TokenKind::Ident("Y".into()),
                TokenKind::Then,
                TokenKind::Ident("Z".into()),
                TokenKind::Ellipsis,
                TokenKind::CellClose("k".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_cell_attributes() {
        let kinds = tokenize(r#"<in stream="stdin" color="magenta"> .List </in>"#);
        assert_eq!(
            kinds[0],
            TokenKind::CellOpen(
                "in".into(),
                vec![
                    ("stream".into(), "stdin".into()),
                    ("color".into(), "magenta".into())
                ]
            )
        );
        assert_eq!(kinds[2], TokenKind::CellClose("in".into()));
    }

    #[test]
    fn test_production_tokens() {
        let kinds = tokenize("syntax Int ::= `_+Int_`(Int, Int) [function, smtlib(\"+\")]");
        assert_eq!(kinds[2], TokenKind::DefinedAs);
        assert_eq!(kinds[3], TokenKind::Quoted("_+Int_".into()));
        assert!(kinds.contains(&TokenKind::String("+".into())));
    }

    #[test]
    fn test_comments() {
        let kinds = tokenize("rule // trailing\n/* block\n comment */ X");
        assert_eq!(
            kinds,
            vec![TokenKind::Rule, TokenKind::Ident("X".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_negative_int() {
        assert_eq!(tokenize("-5"), vec![TokenKind::Int(-5), TokenKind::Eof]);
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("rule\n  X").tokenize().unwrap();
        assert_eq!((tokens[0].span.line, tokens[0].span.column), (1, 1));
        assert_eq!((tokens[1].span.line, tokens[1].span.column), (2, 3));
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        let err = Lexer::new("`abc").tokenize().unwrap_err();
        assert_eq!(err.line(), 1);
    }
}
