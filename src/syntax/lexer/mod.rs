use crate::diagnostic::Diagnostic;
use crate::syntax::lexeme::Lexeme;
use crate::syntax::span::{Span, Spanned};

pub(crate) struct Lexer<'src> {
    source: &'src [u8],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
    /// Whether only whitespace has been seen since the last newline.
    at_line_start: bool,
}

impl<'src> Lexer<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            diagnostics: Vec::new(),
            at_line_start: true,
        }
    }

    pub(crate) fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if ch == b'#' && self.at_line_start {
                return self.scan_directive();
            }
            self.at_line_start = false;

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if ch.is_ascii_digit()
                || (ch == b'.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()))
            {
                return self.scan_number();
            }

            if ch == b'"' || ch == b'\'' {
                if let Some(tok) = self.scan_quoted(ch) {
                    return tok;
                }
                continue;
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol returned None → error was recorded, try again
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                if self.source[self.pos] == b'\n' {
                    self.at_line_start = true;
                }
                self.pos += 1;
            }

            if self.starts_with(b"//") {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            if self.starts_with(b"/*") {
                let start = self.pos;
                self.pos += 2;
                while self.pos < self.source.len() && !self.starts_with(b"*/") {
                    if self.source[self.pos] == b'\n' {
                        self.at_line_start = true;
                    }
                    self.pos += 1;
                }
                if self.pos >= self.source.len() {
                    self.diagnostics.push(Diagnostic::error(
                        "unterminated block comment".to_string(),
                        Span::new(start as u32, self.pos as u32),
                    ));
                } else {
                    self.pos += 2;
                }
                continue;
            }

            break;
        }
    }

    /// A preprocessor line, continued across backslash-newlines.
    fn scan_directive(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
            if self.source[self.pos] == b'\\' && self.peek_at(1) == Some(b'\n') {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
        }
        let text = self.text(start, self.pos).trim_end().to_string();
        self.make_token(Lexeme::Directive(text), start, self.pos)
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = self.text(start, self.pos);
        let token = Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    /// Integer and floating literals, including hex, exponents and suffixes
    /// (`1`, `0x1F`, `1.5e-3f`, `10ul`).
    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() {
            let c = self.source[self.pos];
            let exponent_sign = (c == b'+' || c == b'-')
                && self.pos > start
                && matches!(self.source[self.pos - 1], b'e' | b'E')
                && !self.text(start, self.pos).starts_with("0x");
            if c.is_ascii_alphanumeric() || c == b'.' || c == b'\'' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = self.text(start, self.pos).to_string();
        self.make_token(Lexeme::Number(text), start, self.pos)
    }

    fn scan_quoted(&mut self, quote: u8) -> Option<Spanned<Lexeme>> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.source.len() {
            match self.source[self.pos] {
                b'\\' => self.pos += 2,
                b'\n' => break,
                c if c == quote => {
                    self.pos += 1;
                    let text = self.text(start, self.pos).to_string();
                    let token = if quote == b'"' {
                        Lexeme::Str(text)
                    } else {
                        Lexeme::Char(text)
                    };
                    return Some(self.make_token(token, start, self.pos));
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.source.len());
        let what = if quote == b'"' {
            "string literal"
        } else {
            "character literal"
        };
        self.diagnostics.push(
            Diagnostic::error(
                format!("unterminated {}", what),
                Span::new(start as u32, self.pos as u32),
            )
            .with_help("literals cannot span multiple lines".to_string()),
        );
        None
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'{' => Lexeme::LBrace,
            b'}' => Lexeme::RBrace,
            b'[' => Lexeme::LBracket,
            b']' => Lexeme::RBracket,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'?' => Lexeme::Question,
            b'.' => Lexeme::Dot,
            b'~' => Lexeme::Tilde,
            b'^' => Lexeme::Caret,
            b'%' => Lexeme::Percent,
            b':' => self.pick(b':', Lexeme::ColonColon, Lexeme::Colon),
            b'=' => self.pick(b'=', Lexeme::EqEq, Lexeme::Eq),
            b'!' => self.pick(b'=', Lexeme::BangEq, Lexeme::Bang),
            b'*' => self.pick(b'=', Lexeme::StarEq, Lexeme::Star),
            b'/' => self.pick(b'=', Lexeme::SlashEq, Lexeme::Slash),
            b'<' => match self.peek() {
                Some(b'=') => self.bump(Lexeme::LtEq),
                Some(b'<') => self.bump(Lexeme::Shl),
                _ => Lexeme::Lt,
            },
            b'>' => match self.peek() {
                Some(b'=') => self.bump(Lexeme::GtEq),
                Some(b'>') => self.bump(Lexeme::Shr),
                _ => Lexeme::Gt,
            },
            b'+' => match self.peek() {
                Some(b'=') => self.bump(Lexeme::PlusEq),
                Some(b'+') => self.bump(Lexeme::PlusPlus),
                _ => Lexeme::Plus,
            },
            b'-' => match self.peek() {
                Some(b'=') => self.bump(Lexeme::MinusEq),
                Some(b'-') => self.bump(Lexeme::MinusMinus),
                Some(b'>') => self.bump(Lexeme::Arrow),
                _ => Lexeme::Minus,
            },
            b'&' => match self.peek() {
                Some(b'&') => self.bump(Lexeme::AmpAmp),
                Some(b'=') => self.bump(Lexeme::AmpEq),
                _ => Lexeme::Amp,
            },
            b'|' => match self.peek() {
                Some(b'|') => self.bump(Lexeme::PipePipe),
                Some(b'=') => self.bump(Lexeme::PipeEq),
                _ => Lexeme::Pipe,
            },
            _ => {
                let shown = if ch.is_ascii_graphic() {
                    (ch as char).to_string()
                } else {
                    format!("\\x{:02X}", ch)
                };
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unexpected character '{}'", shown),
                        Span::new(start as u32, self.pos as u32),
                    )
                    .with_help(
                        "vertex programs are written in a C++ subset; this character is not part of it"
                            .to_string(),
                    ),
                );
                return None;
            }
        };

        Some(self.make_token(token, start, self.pos))
    }

    /// Two-character lexeme if the next byte is `next`, else the one-character one.
    fn pick(&mut self, next: u8, double: Lexeme, single: Lexeme) -> Lexeme {
        if self.peek() == Some(next) {
            self.bump(double)
        } else {
            single
        }
    }

    fn bump(&mut self, token: Lexeme) -> Lexeme {
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pat: &[u8]) -> bool {
        self.source[self.pos..].starts_with(pat)
    }

    fn text(&self, start: usize, end: usize) -> &'src str {
        // Token boundaries always fall on ASCII bytes, so the slice is valid UTF-8
        // whenever the input was.
        std::str::from_utf8(&self.source[start..end]).unwrap_or("")
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, Span::new(start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}

#[cfg(test)]
mod tests;
