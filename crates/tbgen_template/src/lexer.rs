//! Splits template text into segments and tokenizes expressions.

use crate::error::TemplateError;

/// A raw piece of template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(String),
    Expr { source: String, line: usize },
    Tag { source: String, line: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delim {
    Expr,
    Tag,
    Comment,
}

impl Delim {
    fn closer(self) -> &'static str {
        match self {
            Delim::Expr => "}}",
            Delim::Tag => "%}",
            Delim::Comment => "#}",
        }
    }
}

/// Finds the next opening delimiter in `text`.
fn find_open(text: &str) -> Option<(usize, Delim)> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let pos = from + offset;
        let delim = match bytes.get(pos + 1) {
            Some(b'{') => Some(Delim::Expr),
            Some(b'%') => Some(Delim::Tag),
            Some(b'#') => Some(Delim::Comment),
            _ => None,
        };
        if let Some(delim) = delim {
            return Some((pos, delim));
        }
        from = pos + 1;
    }
    None
}

/// Finds `closer` in `text`, skipping over quoted strings unless `raw`.
fn find_close(text: &str, closer: &str, raw: bool) -> Option<usize> {
    if raw {
        return text.find(closer);
    }
    let mut quote: Option<char> = None;
    for (idx, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if text[idx..].starts_with(closer) => return Some(idx),
            None => {}
        }
    }
    None
}

pub(crate) fn segment(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut line = 1;
    let mut trim_next = false;

    loop {
        let Some((open, delim)) = find_open(rest) else {
            let text = if trim_next { rest.trim_start() } else { rest };
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            break;
        };

        let (before, after) = rest.split_at(open);
        let strip_left = after[2..].starts_with('-');
        let mut text = before;
        if trim_next {
            text = text.trim_start();
        }
        if strip_left {
            text = text.trim_end();
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text.to_string()));
        }
        line += before.matches('\n').count();

        let body_start = if strip_left { 3 } else { 2 };
        let closer = delim.closer();
        let Some(close) = find_close(&after[body_start..], closer, delim == Delim::Comment) else {
            return Err(TemplateError::syntax(
                line,
                format!("unclosed `{}`", &after[..2]),
            ));
        };

        let mut inner = &after[body_start..body_start + close];
        trim_next = inner.ends_with('-');
        if trim_next {
            inner = &inner[..inner.len() - 1];
        }
        let source = inner.trim().to_string();
        match delim {
            Delim::Expr => segments.push(Segment::Expr { source, line }),
            Delim::Tag => segments.push(Segment::Tag { source, line }),
            Delim::Comment => {}
        }

        let consumed = body_start + close + closer.len();
        line += after[..consumed].matches('\n').count();
        rest = &after[consumed..];
    }

    Ok(segments)
}

/// A token inside `{{ }}` or `{% %}`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Dot,
    Comma,
    Pipe,
    Tilde,
    Plus,
    Minus,
    Star,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

pub(crate) fn tokenize(source: &str, line: usize) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let is_float =
                i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit();
            if is_float {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let token = if is_float {
                text.parse().map(Token::Float).ok()
            } else {
                text.parse().map(Token::Int).ok()
            };
            let token = token.ok_or_else(|| {
                TemplateError::syntax(line, format!("invalid number literal `{text}`"))
            })?;
            tokens.push(token);
            continue;
        }

        if c == '\'' || c == '"' {
            let mut value = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(TemplateError::syntax(line, "unterminated string literal"))
                    }
                    Some(&q) if q == c => {
                        i += 1;
                        break;
                    }
                    Some('\\') => {
                        let escaped = match chars.get(i + 1) {
                            Some('n') => '\n',
                            Some('t') => '\t',
                            Some(&other) => other,
                            None => {
                                return Err(TemplateError::syntax(
                                    line,
                                    "unterminated string literal",
                                ))
                            }
                        };
                        value.push(escaped);
                        i += 2;
                    }
                    Some(&other) => {
                        value.push(other);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(value));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (c, next) {
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) => (Token::Ne, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('=', _) => (Token::Assign, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('.', _) => (Token::Dot, 1),
            (',', _) => (Token::Comma, 1),
            ('|', _) => (Token::Pipe, 1),
            ('~', _) => (Token::Tilde, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            ('[', _) => (Token::LBracket, 1),
            (']', _) => (Token::RBracket, 1),
            _ => {
                return Err(TemplateError::syntax(
                    line,
                    format!("unexpected character `{c}`"),
                ))
            }
        };
        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}
