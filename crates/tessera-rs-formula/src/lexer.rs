//! Tokenizer for formula source text.

use crate::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    End,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::End => "end of input".to_string(),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) position: usize,
}

/// Split `source` into tokens, always terminated by `TokenKind::End`.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match byte {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'0'..=b'9' | b'.' => {
                pos = scan_number(bytes, pos);
                let text = &source[start..pos];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| FormulaError::parse(start, format!("invalid number '{text}'")))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: start,
                });
                continue;
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(source[start..pos].to_string()),
                    position: start,
                });
                continue;
            }
            _ => {
                let found = source[start..].chars().next().unwrap_or_default();
                return Err(FormulaError::parse(
                    start,
                    format!("unexpected character '{found}'"),
                ));
            }
        };
        tokens.push(Token {
            kind,
            position: start,
        });
        pos += 1;
    }

    tokens.push(Token {
        kind: TokenKind::End,
        position: bytes.len(),
    });
    Ok(tokens)
}

/// Digits with at most one decimal point; exponents are not part of the grammar.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    let mut seen_point = false;
    while pos < bytes.len() {
        match bytes[pos] {
            b'0'..=b'9' => {}
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokens")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn tokenizes_operators_numbers_and_identifiers() {
        assert_eq!(
            kinds("max(hp, 0.5) - .25*regen_2"),
            vec![
                TokenKind::Ident("max".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("hp".to_string()),
                TokenKind::Comma,
                TokenKind::Number(0.5),
                TokenKind::RParen,
                TokenKind::Minus,
                TokenKind::Number(0.25),
                TokenKind::Star,
                TokenKind::Ident("regen_2".to_string()),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn records_byte_offsets() {
        let tokens = tokenize("  a +\tb").expect("tokens");
        let positions: Vec<usize> = tokens.iter().map(|token| token.position).collect();
        assert_eq!(positions, vec![2, 4, 6, 7]);
    }

    #[test]
    fn rejects_unknown_characters_and_lone_points() {
        assert_eq!(
            tokenize("a ^ 2").unwrap_err(),
            FormulaError::parse(2, "unexpected character '^'")
        );
        assert!(matches!(
            tokenize("1 + ."),
            Err(FormulaError::Parse { position: 4, .. })
        ));
    }

    #[test]
    fn exponent_suffix_is_not_part_of_a_number() {
        assert_eq!(
            kinds("2e3"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Ident("e3".to_string()),
                TokenKind::End,
            ]
        );
    }
}
