// ABOUTME: Converts source text into a token stream
// Never aborts on a bad character; records a diagnostic and keeps scanning so one
// file can surface more than one lexical error per run.

use crate::diagnostics::Diagnostics;
use crate::token::{keyword, Literal, Token, TokenKind};
use std::io::Write;

pub struct Lexer<'a, W: Write> {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    diagnostics: &'a mut Diagnostics<W>,
}

impl<'a, W: Write> Lexer<'a, W> {
    pub fn new(source: &str, diagnostics: &'a mut Diagnostics<W>) -> Self {
        Self {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            tokens: Vec::new(),
            diagnostics,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        use TokenKind::*;
        match c {
            '(' => self.add_token(LeftParen, None),
            ')' => self.add_token(RightParen, None),
            '{' => self.add_token(LeftBrace, None),
            '}' => self.add_token(RightBrace, None),
            ',' => self.add_token(Comma, None),
            '.' => self.add_token(Dot, None),
            '-' => self.add_token(Minus, None),
            '+' => self.add_token(Plus, None),
            ';' => self.add_token(Semicolon, None),
            '*' => self.add_token(Star, None),
            '?' => self.add_token(Question, None),
            ':' => self.add_token(Colon, None),
            '!' => {
                let kind = if self.match_char('=') { BangEqual } else { Bang };
                self.add_token(kind, None);
            }
            '=' => {
                let kind = if self.match_char('=') { EqualEqual } else { Equal };
                self.add_token(kind, None);
            }
            '<' => {
                let kind = if self.match_char('=') { LessEqual } else { Less };
                self.add_token(kind, None);
            }
            '>' => {
                let kind = if self.match_char('=') { GreaterEqual } else { Greater };
                self.add_token(kind, None);
            }
            '/' => {
                if self.match_char('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.match_char('*') {
                    self.block_comment();
                } else {
                    self.add_token(Slash, None);
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,
            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_start(c) => self.identifier(),
            other => {
                self.diagnostics
                    .report_parse(self.line, "", &format!("Unexpected character {other}"));
            }
        }
    }

    fn block_comment(&mut self) {
        let mut depth = 1;
        while depth > 0 {
            if self.is_at_end() {
                self.diagnostics.report_parse(self.line, "", "Unterminated block comment.");
                return;
            }
            if self.peek() == '/' && self.peek_next() == '*' {
                self.advance();
                self.advance();
                depth += 1;
            } else if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                depth -= 1;
            } else {
                if self.peek() == '\n' {
                    self.line += 1;
                }
                self.advance();
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            self.diagnostics.report_parse(self.line, "", "Unterminated string.");
            return;
        }
        self.advance(); // closing quote
        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token(TokenKind::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned digits must form a valid float");
        self.add_token(TokenKind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while is_identifier_char(self.peek()) {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token(kind, None);
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        *self.source.get(self.current).unwrap_or(&'\0')
    }

    fn peek_next(&self) -> char {
        *self.source.get(self.current + 1).unwrap_or(&'\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> (Vec<Token>, bool) {
        let mut diag = Diagnostics::new(Vec::new());
        let tokens = Lexer::new(src, &mut diag).scan_tokens();
        (tokens, diag.had_parse_error())
    }

    #[test]
    fn scans_single_char_tokens() {
        let (tokens, err) = scan("(){},.-+;*?:");
        assert!(!err);
        assert_eq!(tokens.len(), 13); // 12 tokens + EOF
    }

    #[test]
    fn scans_two_char_operators() {
        let (tokens, _) = scan("!= == <= >= ! < > =");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Bang,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Equal,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_consumed_to_eol() {
        let (tokens, _) = scan("1 // a comment\n2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn nestable_block_comments() {
        let (tokens, err) = scan("/* outer /* inner */ still in outer */ 1");
        assert!(!err);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_reports_error() {
        let (_, err) = scan("/* never closed");
        assert!(err);
    }

    #[test]
    fn string_literal_spans_lines() {
        let (tokens, err) = scan("\"hi\nthere\"");
        assert!(!err);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, Some(Literal::String("hi\nthere".to_string())));
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (_, err) = scan("\"oops");
        assert!(err);
    }

    #[test]
    fn number_literal_with_fraction() {
        let (tokens, _) = scan("3.14");
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.14)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        let (tokens, _) = scan("3.");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Dot, TokenKind::Eof]);
    }

    #[test]
    fn identifier_vs_keyword() {
        let (tokens, _) = scan("foo and bar");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unexpected_character_reports_error_and_continues() {
        let (tokens, err) = scan("1 @ 2");
        assert!(err);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn newline_increments_line_number() {
        let (tokens, _) = scan("1\n2\n3");
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 3]);
    }
}
