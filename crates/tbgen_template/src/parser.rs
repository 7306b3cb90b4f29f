//! Builds the syntax tree from lexed segments.

use serde_json::Value;

use crate::ast::{BinOp, Expr, Node};
use crate::error::TemplateError;
use crate::lexer::{tokenize, Segment, Token};

pub(crate) fn parse(segments: Vec<Segment>) -> Result<Vec<Node>, TemplateError> {
    let mut parser = Parser {
        segments: segments.into_iter(),
    };
    let (nodes, _) = parser.parse_nodes(&[])?;
    Ok(nodes)
}

/// The tag that ended a block, with its remaining tokens.
struct Terminator {
    keyword: String,
    rest: ExprParser,
}

struct Parser {
    segments: std::vec::IntoIter<Segment>,
}

impl Parser {
    fn parse_nodes(
        &mut self,
        terminators: &[&str],
    ) -> Result<(Vec<Node>, Option<Terminator>), TemplateError> {
        let mut nodes = Vec::new();
        let mut last_line = 1;

        while let Some(segment) = self.segments.next() {
            match segment {
                Segment::Text(text) => nodes.push(Node::Text(text)),
                Segment::Expr { source, line } => {
                    last_line = line;
                    let mut p = ExprParser::new(&source, line)?;
                    let expr = p.parse_expr()?;
                    p.expect_end()?;
                    nodes.push(Node::Output { expr, line });
                }
                Segment::Tag { source, line } => {
                    last_line = line;
                    let mut p = ExprParser::new(&source, line)?;
                    let keyword = p.expect_ident("a statement")?;
                    if terminators.contains(&keyword.as_str()) {
                        return Ok((nodes, Some(Terminator { keyword, rest: p })));
                    }
                    let node = match keyword.as_str() {
                        "if" => self.parse_if(p, line)?,
                        "for" => self.parse_for(p, line)?,
                        "set" => parse_set(p, line)?,
                        other => {
                            return Err(TemplateError::syntax(
                                line,
                                format!("unexpected `{{% {other} %}}`"),
                            ))
                        }
                    };
                    nodes.push(node);
                }
            }
        }

        if terminators.is_empty() {
            Ok((nodes, None))
        } else {
            let expected: Vec<String> = terminators
                .iter()
                .map(|t| format!("`{{% {t} %}}`"))
                .collect();
            Err(TemplateError::syntax(
                last_line,
                format!("unexpected end of template, expected {}", expected.join(" or ")),
            ))
        }
    }

    /// Parses the body of a block, requiring it to be closed by one of `terminators`.
    fn parse_block(
        &mut self,
        terminators: &[&str],
    ) -> Result<(Vec<Node>, Terminator), TemplateError> {
        let (nodes, term) = self.parse_nodes(terminators)?;
        // parse_nodes only returns None at the top level
        match term {
            Some(term) => Ok((nodes, term)),
            None => Err(TemplateError::syntax(0, "unexpected end of template")),
        }
    }

    fn parse_if(&mut self, mut p: ExprParser, line: usize) -> Result<Node, TemplateError> {
        let mut cond = p.parse_expr()?;
        p.expect_end()?;
        let mut branches = Vec::new();

        loop {
            let (body, mut term) = self.parse_block(&["elif", "else", "endif"])?;
            branches.push((cond, body));
            match term.keyword.as_str() {
                "elif" => {
                    cond = term.rest.parse_expr()?;
                    term.rest.expect_end()?;
                }
                "else" => {
                    term.rest.expect_end()?;
                    let (otherwise, end) = self.parse_block(&["endif"])?;
                    end.rest.expect_end()?;
                    return Ok(Node::If {
                        branches,
                        otherwise,
                        line,
                    });
                }
                _ => {
                    term.rest.expect_end()?;
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                        line,
                    });
                }
            }
        }
    }

    fn parse_for(&mut self, mut p: ExprParser, line: usize) -> Result<Node, TemplateError> {
        let mut targets = vec![p.expect_ident("a loop variable")?];
        while p.eat(&Token::Comma) {
            targets.push(p.expect_ident("a loop variable")?);
        }
        if targets.len() > 2 {
            return Err(TemplateError::syntax(
                line,
                "for loops unpack at most two variables",
            ));
        }
        if !p.eat_keyword("in") {
            return Err(TemplateError::syntax(line, "expected `in` in for loop"));
        }
        let iter = p.parse_expr()?;
        p.expect_end()?;

        let (body, term) = self.parse_block(&["else", "endfor"])?;
        term.rest.expect_end()?;
        let otherwise = if term.keyword == "else" {
            let (otherwise, end) = self.parse_block(&["endfor"])?;
            end.rest.expect_end()?;
            otherwise
        } else {
            Vec::new()
        };

        Ok(Node::For {
            targets,
            iter,
            body,
            otherwise,
            line,
        })
    }
}

fn parse_set(mut p: ExprParser, line: usize) -> Result<Node, TemplateError> {
    let name = p.expect_ident("a variable name")?;
    if !p.eat(&Token::Assign) {
        return Err(TemplateError::syntax(line, "expected `=` in set statement"));
    }
    let expr = p.parse_expr()?;
    p.expect_end()?;
    Ok(Node::Set { name, expr, line })
}

/// Recursive-descent parser over the tokens of one delimiter.
pub(crate) struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
}

impl ExprParser {
    pub(crate) fn new(source: &str, line: usize) -> Result<Self, TemplateError> {
        Ok(Self {
            tokens: tokenize(source, line)?,
            pos: 0,
            line,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(name)) if name == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::syntax(self.line, message)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), TemplateError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, TemplateError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    pub(crate) fn expect_end(&self) -> Result<(), TemplateError> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(self.error(format!("unexpected token {tok:?}"))),
        }
    }

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, TemplateError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, TemplateError> {
        let mut lhs = self.parse_and()?;
        while self.eat_keyword("or") {
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, TemplateError> {
        let mut lhs = self.parse_not()?;
        while self.eat_keyword("and") {
            let rhs = self.parse_not()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, TemplateError> {
        if self.eat_keyword("not") {
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<Expr, TemplateError> {
        let lhs = self.parse_concat()?;

        let op = match self.peek() {
            Some(Token::Eq) => Some(BinOp::Eq),
            Some(Token::Ne) => Some(BinOp::Ne),
            Some(Token::Lt) => Some(BinOp::Lt),
            Some(Token::Le) => Some(BinOp::Le),
            Some(Token::Gt) => Some(BinOp::Gt),
            Some(Token::Ge) => Some(BinOp::Ge),
            Some(Token::Ident(kw)) if kw == "in" => Some(BinOp::In),
            Some(Token::Ident(kw))
                if kw == "not"
                    && matches!(self.tokens.get(self.pos + 1), Some(Token::Ident(n)) if n == "in") =>
            {
                Some(BinOp::NotIn)
            }
            _ => None,
        };
        if let Some(op) = op {
            self.pos += if op == BinOp::NotIn { 2 } else { 1 };
            let rhs = self.parse_concat()?;
            return Ok(binary(op, lhs, rhs));
        }

        if self.eat_keyword("is") {
            let negated = self.eat_keyword("not");
            let name = self.expect_ident("a test name after `is`")?;
            return Ok(Expr::Test {
                expr: Box::new(lhs),
                name,
                negated,
            });
        }

        Ok(lhs)
    }

    fn parse_concat(&mut self) -> Result<Expr, TemplateError> {
        let mut lhs = self.parse_additive()?;
        while self.eat(&Token::Tilde) {
            let rhs = self.parse_additive()?;
            lhs = binary(BinOp::Concat, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, TemplateError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = if self.eat(&Token::Plus) {
                BinOp::Add
            } else if self.eat(&Token::Minus) {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, TemplateError> {
        let mut lhs = self.parse_unary()?;
        while self.eat(&Token::Star) {
            let rhs = self.parse_unary()?;
            lhs = binary(BinOp::Mul, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, TemplateError> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_filtered()
    }

    fn parse_filtered(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.parse_postfix()?;
        while self.eat(&Token::Pipe) {
            let name = self.expect_ident("a filter name after `|`")?;
            let mut args = Vec::new();
            if self.eat(&Token::LParen) {
                args = self.parse_list(Token::RParen, "`)`")?;
            }
            expr = Expr::Filter {
                expr: Box::new(expr),
                name,
                args,
            };
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, TemplateError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let attr = match self.next() {
                    Some(Token::Ident(name)) => name,
                    Some(Token::Int(n)) => n.to_string(),
                    _ => return Err(self.error("expected attribute name after `.`")),
                };
                expr = Expr::Attr(Box::new(expr), attr);
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(Token::RBracket, "`]`")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(match name.as_str() {
                "true" | "True" => Expr::Literal(Value::Bool(true)),
                "false" | "False" => Expr::Literal(Value::Bool(false)),
                "none" | "None" => Expr::Literal(Value::Null),
                _ => Expr::Var(name),
            }),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::String(s))),
            Some(Token::Int(n)) => Ok(Expr::Literal(Value::from(n))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::from(f))),
            Some(Token::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(expr)
            }
            Some(Token::LBracket) => {
                let items = self.parse_list(Token::RBracket, "`]`")?;
                Ok(Expr::List(items))
            }
            Some(tok) => Err(self.error(format!("unexpected token {tok:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    /// Parses comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, TemplateError> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if self.eat(&close) {
                return Ok(items);
            }
            self.expect(Token::Comma, what)?;
        }
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
