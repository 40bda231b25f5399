//! Naftah lexer: tokenizes UTF-8 source text into the [`Token`] stream the parser
//! consumes (§6 "Tokens", "Source files", "Comments", "String literals").
//!
//! Structured the way the teacher's FHIRPath lexer is (`lexer.rs`): a `Vec<char>`
//! cursor with `advance`/`peek`, one `read_*` helper per lexical class, and a single
//! `next_token` dispatch. Comments are `--- ...` to end of line, or balanced
//! `---* ... *---` blocks.

use crate::error::{Error, ErrorKind, Position, Result};
use crate::locale::western_digit;
use crate::token::{Keyword, Span, Symbol, TemporalMarker, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    current: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current = chars.first().copied();
        Self {
            chars,
            position: 0,
            line: 1,
            column: 1,
            current,
        }
    }

    fn advance(&mut self) {
        if let Some(c) = self.current {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
        self.current = self.chars.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            while let Some(c) = self.current {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }
            if self.current == Some('-') && self.peek() == Some('-') {
                let save = self.position;
                self.advance();
                self.advance();
                if self.current == Some('-') {
                    self.advance();
                    if self.current == Some('*') {
                        self.advance();
                        self.skip_block_comment()?;
                        continue;
                    }
                    // line comment `--- ...`
                    while let Some(c) = self.current {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    continue;
                }
                // not a comment opener after all, rewind.
                self.position = save;
                self.current = self.chars.get(self.position).copied();
            }
            break;
        }
        Ok(())
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        loop {
            match self.current {
                None => {
                    return Err(Error::new(
                        ErrorKind::Lexical,
                        "unterminated block comment",
                        self.pos(),
                    ))
                }
                Some('*') if self.peek() == Some('-') => {
                    self.advance();
                    self.advance();
                    if self.current == Some('-') {
                        self.advance();
                        return Ok(());
                    }
                }
                _ => self.advance(),
            }
        }
    }

    fn is_ident_start(c: char) -> bool {
        c.is_alphabetic() || c == '_'
    }

    fn is_ident_continue(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn read_identifier(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.current {
            if Self::is_ident_continue(c) {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    /// Reads the content between a pair of `quote`, honoring `\`-escapes (and the
    /// doubled-quote escape convention). Returns the decoded text.
    fn read_quoted(&mut self, quote: char, closing: char) -> Result<String> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.current {
                None => {
                    return Err(Error::new(
                        ErrorKind::Lexical,
                        "unterminated string literal",
                        self.pos(),
                    ))
                }
                Some(c) if c == closing => {
                    if closing == quote && self.peek() == Some(closing) {
                        value.push(closing);
                        self.advance();
                        self.advance();
                        continue;
                    }
                    self.advance();
                    return Ok(value);
                }
                Some('\\') => {
                    self.advance();
                    match self.current {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some(c) => value.push(c),
                        None => {
                            return Err(Error::new(
                                ErrorKind::Lexical,
                                "incomplete escape sequence",
                                self.pos(),
                            ))
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_number(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.current {
            if c.is_ascii_digit() || western_digit(c).is_some() {
                s.push(western_digit(c).unwrap_or(c));
                self.advance();
            } else {
                break;
            }
        }
        if self.current == Some('.') && self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            s.push('.');
            self.advance();
            while let Some(c) = self.current {
                if c.is_ascii_digit() || western_digit(c).is_some() {
                    s.push(western_digit(c).unwrap_or(c));
                    self.advance();
                } else {
                    break;
                }
            }
        }
        s
    }

    fn word_operator(word: &str) -> Option<Symbol> {
        Some(match word {
            "زائد" => Symbol::Plus,
            "ناقص" => Symbol::Minus,
            "ضارب" => Symbol::Star,
            "قسمة" => Symbol::Slash,
            "يساوي" => Symbol::EqEq,
            "لا_يساوي" => Symbol::NotEq,
            "أصغر_من" => Symbol::Lt,
            "أصغر_أو_يساوي" => Symbol::Le,
            "أكبر_من" => Symbol::Gt,
            "أكبر_أو_يساوي" => Symbol::Ge,
            _ => return None,
        })
    }

    fn temporal_marker(word: &str) -> Option<TemporalMarker> {
        Some(match word {
            "زمن" => TemporalMarker::Zaman,
            "نقطة_زمنية" => TemporalMarker::NuqtaZamania,
            "مقدار_زمني" => TemporalMarker::MiqdarZamani,
            "قيمة_زمنية" => TemporalMarker::QimaZamania,
            _ => return None,
        })
    }

    fn raw_prefix(word: &str) -> bool {
        matches!(word, "خام" | "نص_خام" | "سلسلة_خام")
    }

    fn bytes_prefix(word: &str) -> bool {
        matches!(word, "ثمانية_بت" | "بايتات")
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let span = self.span();

        let Some(c) = self.current else {
            return Ok(Token::new(TokenKind::Eof, span));
        };

        // Radix / plain string literal: 'digits' optionally followed immediately by a
        // base R in 2..36 (§4.A), or a plain single-quoted string/char otherwise.
        if c == '\'' {
            let text = self.read_quoted('\'', '\'')?;
            if text.chars().all(|c| c.is_ascii_alphanumeric()) && !text.is_empty() {
                if let Some(radix_start) = self.current {
                    if radix_start.is_ascii_digit() {
                        let radix_str = self.read_number();
                        if let Ok(radix) = radix_str.parse::<u32>() {
                            if (2..=36).contains(&radix) {
                                return Ok(Token::new(
                                    TokenKind::RadixNumber { digits: text, radix },
                                    span,
                                ));
                            }
                        }
                    }
                }
            }
            if text.chars().count() == 1 {
                return Ok(Token::new(
                    TokenKind::Char(text.chars().next().unwrap()),
                    span,
                ));
            }
            return Ok(Token::new(TokenKind::Str { value: text, raw: false }, span));
        }

        if c == '"' {
            let text = self.read_quoted('"', '"')?;
            return Ok(Token::new(TokenKind::Str { value: text, raw: false }, span));
        }
        if c == '«' {
            let text = self.read_quoted('«', '»')?;
            return Ok(Token::new(TokenKind::Str { value: text, raw: false }, span));
        }

        if c.is_ascii_digit() || western_digit(c).is_some() {
            let s = self.read_number();
            return Ok(Token::new(TokenKind::Number(s), span));
        }

        if Self::is_ident_start(c) {
            let word = self.read_identifier();
            if let Some(kw) = Keyword::from_str(&word) {
                return Ok(Token::new(TokenKind::Keyword(kw), span));
            }
            if let Some(sym) = Self::word_operator(&word) {
                return Ok(Token::new(TokenKind::Symbol(sym), span));
            }
            if Self::raw_prefix(&word) && matches!(self.current, Some('"') | Some('«')) {
                let text = if self.current == Some('"') {
                    self.read_quoted('"', '"')?
                } else {
                    self.read_quoted('«', '»')?
                };
                return Ok(Token::new(TokenKind::Str { value: text, raw: true }, span));
            }
            if Self::bytes_prefix(&word) && matches!(self.current, Some('"') | Some('«')) {
                let text = if self.current == Some('"') {
                    self.read_quoted('"', '"')?
                } else {
                    self.read_quoted('«', '»')?
                };
                return Ok(Token::new(TokenKind::ByteString(text), span));
            }
            if let Some(marker) = Self::temporal_marker(&word) {
                if matches!(self.current, Some('"') | Some('«')) {
                    let text = if self.current == Some('"') {
                        self.read_quoted('"', '"')?
                    } else {
                        self.read_quoted('«', '»')?
                    };
                    return Ok(Token::new(TokenKind::Temporal { marker, value: text }, span));
                }
            }
            return Ok(Token::new(TokenKind::Identifier(word), span));
        }

        macro_rules! sym {
            ($s:expr) => {
                Ok(Token::new(TokenKind::Symbol($s), span))
            };
        }

        match c {
            '؛' | ';' => {
                self.advance();
                sym!(Symbol::Semicolon)
            }
            '+' => {
                self.advance();
                if self.current == Some('+') {
                    self.advance();
                    sym!(Symbol::PlusPlus)
                } else {
                    sym!(Symbol::Plus)
                }
            }
            '-' => {
                self.advance();
                if self.current == Some('-') {
                    self.advance();
                    sym!(Symbol::MinusMinus)
                } else if self.current == Some('>') {
                    self.advance();
                    sym!(Symbol::Arrow)
                } else {
                    sym!(Symbol::Minus)
                }
            }
            '*' => {
                self.advance();
                if self.current == Some('*') {
                    self.advance();
                    sym!(Symbol::StarStar)
                } else {
                    sym!(Symbol::Star)
                }
            }
            '/' => {
                self.advance();
                sym!(Symbol::Slash)
            }
            '%' => {
                self.advance();
                sym!(Symbol::Percent)
            }
            '=' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    sym!(Symbol::EqEq)
                } else {
                    sym!(Symbol::Eq)
                }
            }
            '!' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    sym!(Symbol::NotEq)
                } else {
                    sym!(Symbol::Bang)
                }
            }
            '<' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    sym!(Symbol::Le)
                } else if self.current == Some('-') {
                    self.advance();
                    sym!(Symbol::LeftArrow)
                } else if self.current == Some('<') {
                    self.advance();
                    sym!(Symbol::Shl)
                } else {
                    sym!(Symbol::Lt)
                }
            }
            '>' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    sym!(Symbol::Ge)
                } else if self.current == Some('>') {
                    self.advance();
                    if self.current == Some('>') {
                        self.advance();
                        sym!(Symbol::Ushr)
                    } else {
                        sym!(Symbol::Shr)
                    }
                } else {
                    sym!(Symbol::Gt)
                }
            }
            '&' => {
                self.advance();
                if self.current == Some('&') {
                    self.advance();
                    sym!(Symbol::AndAnd)
                } else {
                    sym!(Symbol::Amp)
                }
            }
            '|' => {
                self.advance();
                if self.current == Some('|') {
                    self.advance();
                    sym!(Symbol::OrOr)
                } else {
                    sym!(Symbol::Pipe)
                }
            }
            '^' => {
                self.advance();
                sym!(Symbol::Caret)
            }
            '~' => {
                self.advance();
                sym!(Symbol::Tilde)
            }
            '.' => {
                self.advance();
                match self.current {
                    Some('+') => {
                        self.advance();
                        sym!(Symbol::DotPlus)
                    }
                    Some('-') => {
                        self.advance();
                        sym!(Symbol::DotMinus)
                    }
                    Some('*') => {
                        self.advance();
                        sym!(Symbol::DotStar)
                    }
                    Some('/') => {
                        self.advance();
                        sym!(Symbol::DotSlash)
                    }
                    Some('%') => {
                        self.advance();
                        sym!(Symbol::DotPercent)
                    }
                    _ => sym!(Symbol::Dot),
                }
            }
            ',' => {
                self.advance();
                sym!(Symbol::Comma)
            }
            ':' => {
                self.advance();
                if self.current == Some('=') {
                    self.advance();
                    sym!(Symbol::Assign)
                } else if self.current == Some(':') {
                    self.advance();
                    if self.current == Some(':') {
                        self.advance();
                        sym!(Symbol::ColonColonColon)
                    } else {
                        sym!(Symbol::ColonColon)
                    }
                } else {
                    sym!(Symbol::Colon)
                }
            }
            '?' => {
                self.advance();
                if self.current == Some('?') {
                    self.advance();
                    sym!(Symbol::QuestionQuestion)
                } else if self.current == Some('.') {
                    self.advance();
                    sym!(Symbol::QuestionDot)
                } else if self.current == Some('[') {
                    self.advance();
                    sym!(Symbol::QuestionBracket)
                } else {
                    sym!(Symbol::Question)
                }
            }
            '(' => {
                self.advance();
                sym!(Symbol::LParen)
            }
            ')' => {
                self.advance();
                sym!(Symbol::RParen)
            }
            '[' => {
                self.advance();
                sym!(Symbol::LBracket)
            }
            ']' => {
                self.advance();
                sym!(Symbol::RBracket)
            }
            '{' => {
                self.advance();
                sym!(Symbol::LBrace)
            }
            '}' => {
                self.advance();
                sym!(Symbol::RBrace)
            }
            '#' => {
                self.advance();
                if self.current == Some('{') {
                    self.advance();
                    sym!(Symbol::HashLBrace)
                } else {
                    Err(Error::new(ErrorKind::Lexical, "unexpected '#'", self.pos()))
                }
            }
            '$' => {
                self.advance();
                if self.current == Some('{') {
                    self.advance();
                    sym!(Symbol::DollarLBrace)
                } else {
                    Err(Error::new(ErrorKind::Lexical, "unexpected '$'", self.pos()))
                }
            }
            '@' => {
                self.advance();
                if self.current == Some('{') {
                    self.advance();
                    sym!(Symbol::AtLBrace)
                } else {
                    Err(Error::new(ErrorKind::Lexical, "unexpected '@'", self.pos()))
                }
            }
            other => Err(Error::new(
                ErrorKind::Lexical,
                format!("unexpected character: {other}"),
                self.pos(),
            )),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            out.push(token);
            if is_eof {
                break;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn identifiers_and_keywords() {
        let ks = kinds("متغير عدد := 10");
        assert_eq!(ks[0], TokenKind::Keyword(Keyword::Variable));
        assert_eq!(ks[1], TokenKind::Identifier("عدد".into()));
        assert_eq!(ks[2], TokenKind::Symbol(Symbol::Assign));
        assert_eq!(ks[3], TokenKind::Number("10".into()));
    }

    #[test]
    fn eastern_arabic_digits_normalize_to_western() {
        let ks = kinds("١٢٣");
        assert_eq!(ks[0], TokenKind::Number("123".into()));
    }

    #[test]
    fn radix_literal() {
        let ks = kinds("'1010'2");
        assert_eq!(
            ks[0],
            TokenKind::RadixNumber {
                digits: "1010".into(),
                radix: 2
            }
        );
    }

    #[test]
    fn string_and_qualified_names() {
        let ks = kinds(r#""مرحباً" جافا:لغة:سلسلة"#);
        assert_eq!(
            ks[0],
            TokenKind::Str {
                value: "مرحباً".into(),
                raw: false
            }
        );
        assert_eq!(ks[1], TokenKind::Identifier("جافا".into()));
        assert_eq!(ks[2], TokenKind::Symbol(Symbol::Colon));
    }

    #[test]
    fn line_and_block_comments_are_skipped() {
        let ks = kinds("متغير --- this is a comment\nثابت ---* block *--- دالة");
        assert_eq!(ks[0], TokenKind::Keyword(Keyword::Variable));
        assert_eq!(ks[1], TokenKind::Keyword(Keyword::Constant));
        assert_eq!(ks[2], TokenKind::Keyword(Keyword::Function));
    }

    #[test]
    fn word_operators_map_to_symbols() {
        let ks = kinds("أصغر_من أكبر_أو_يساوي");
        assert_eq!(ks[0], TokenKind::Symbol(Symbol::Lt));
        assert_eq!(ks[1], TokenKind::Symbol(Symbol::Ge));
    }
}
