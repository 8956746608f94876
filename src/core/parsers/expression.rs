//! Parser for the AngularJS expression language.
//!
//! Covers the subset that appears in templates: literals, identifiers, member access,
//! calls, unary/binary/logical operators, assignment, ternaries, array and object
//! literals, and filter pipes (`value | filter:arg1:arg2`). A pipe is represented as a
//! [`Node::Call`] with `filter: true` whose first argument is the piped input.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Unterminated string starting at column {0}")]
    UnterminatedString(usize),
    #[error("Invalid unicode escape at column {0}")]
    InvalidUnicodeEscape(usize),
    #[error("Unexpected character '{ch}' at column {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Token '{token}' at column {pos} is unexpected, expecting [{expected}]")]
    Expected {
        token: String,
        pos: usize,
        expected: String,
    },
    #[error("Token '{token}' at column {pos} {reason}")]
    Unexpected {
        token: String,
        pos: usize,
        reason: &'static str,
    },
    #[error("Unexpected end of expression, expecting [{0}]")]
    UnexpectedEnd(String),
}

// ============================================================
// Lexer
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    String(String),
    Number(f64),
    /// Operators and punctuation.
    Op(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the token.
    pub pos: usize,
}

impl Token {
    fn text(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::String(value) => format!("'{value}'"),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Op(op) => op.to_string(),
        }
    }

    fn is_op(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Op(o) if o == op)
    }
}

/// Operators sorted longest first so the lexer can match greedily.
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+", "-", "*", "/", "%", "!", "=", "<",
    ">", "|", "(", ")", "[", "]", "{", "}", ".", ",", ";", ":", "?",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

pub fn tokenize(text: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '\'' || c == '"' {
            let (value, next) = read_string(&chars, i)?;
            tokens.push(Token {
                kind: TokenKind::String(value),
                pos: i,
            });
            i = next;
        } else if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit))
        {
            let (value, next) = read_number(&chars, i)?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                pos: i,
            });
            i = next;
        } else if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_part(chars[i]) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(chars[start..i].iter().collect()),
                pos: start,
            });
        } else {
            let op = OPERATORS
                .iter()
                .copied()
                .find(|op| {
                    op.chars()
                        .enumerate()
                        .all(|(offset, oc)| chars.get(i + offset) == Some(&oc))
                })
                .ok_or(ExpressionError::UnexpectedChar { ch: c, pos: i })?;
            tokens.push(Token {
                kind: TokenKind::Op(op),
                pos: i,
            });
            i += op.len();
        }
    }

    Ok(tokens)
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize), ExpressionError> {
    let quote = chars[start];
    let mut value = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((value, i + 1));
        }
        if c == '\\' {
            let Some(&escaped) = chars.get(i + 1) else {
                break;
            };
            if escaped == 'u' {
                let hex: String = chars.get(i + 2..i + 6).unwrap_or_default().iter().collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or(ExpressionError::InvalidUnicodeEscape(i))?;
                value.push(decoded);
                i += 6;
                continue;
            }
            value.push(match escaped {
                'n' => '\n',
                'f' => '\u{000C}',
                'r' => '\r',
                't' => '\t',
                'v' => '\u{000B}',
                other => other,
            });
            i += 2;
            continue;
        }
        value.push(c);
        i += 1;
    }

    Err(ExpressionError::UnterminatedString(start))
}

fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), ExpressionError> {
    let mut i = start;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
        i += 1;
    }
    if i < chars.len() && matches!(chars[i], 'e' | 'E') {
        let mut j = i + 1;
        if j < chars.len() && matches!(chars[j], '+' | '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        } else {
            return Err(ExpressionError::UnexpectedChar {
                ch: chars[i],
                pos: i,
            });
        }
    }
    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .map(|value| (value, i))
        .map_err(|_| ExpressionError::UnexpectedChar {
            ch: chars[start],
            pos: start,
        })
}

// ============================================================
// AST
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Program {
        body: Vec<Node>,
    },
    ExpressionStatement {
        expression: Box<Node>,
    },
    Literal(Literal),
    Identifier(String),
    This,
    Member {
        object: Box<Node>,
        property: Box<Node>,
        computed: bool,
    },
    Call {
        callee: Box<Node>,
        arguments: Vec<Node>,
        /// Set for filter pipes (`input | name:args`).
        filter: bool,
    },
    Conditional {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    Binary {
        operator: &'static str,
        left: Box<Node>,
        right: Box<Node>,
    },
    Logical {
        operator: &'static str,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        operator: &'static str,
        argument: Box<Node>,
    },
    Assignment {
        left: Box<Node>,
        right: Box<Node>,
    },
    Array {
        elements: Vec<Node>,
    },
    Object {
        properties: Vec<Node>,
    },
    Property {
        key: Box<Node>,
        value: Box<Node>,
        computed: bool,
    },
}

/// Closed set of node kinds, used to key visitor dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ExpressionStatement,
    Literal,
    Identifier,
    This,
    Member,
    Call,
    Conditional,
    Binary,
    Logical,
    Unary,
    Assignment,
    Array,
    Object,
    Property,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Program { .. } => NodeKind::Program,
            Node::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            Node::Literal(_) => NodeKind::Literal,
            Node::Identifier(_) => NodeKind::Identifier,
            Node::This => NodeKind::This,
            Node::Member { .. } => NodeKind::Member,
            Node::Call { .. } => NodeKind::Call,
            Node::Conditional { .. } => NodeKind::Conditional,
            Node::Binary { .. } => NodeKind::Binary,
            Node::Logical { .. } => NodeKind::Logical,
            Node::Unary { .. } => NodeKind::Unary,
            Node::Assignment { .. } => NodeKind::Assignment,
            Node::Array { .. } => NodeKind::Array,
            Node::Object { .. } => NodeKind::Object,
            Node::Property { .. } => NodeKind::Property,
        }
    }
}

// ============================================================
// Parser
// ============================================================

/// Parse an expression into a [`Node::Program`].
pub fn parse(text: &str) -> Result<Node, ExpressionError> {
    let tokens = tokenize(text)?;
    let mut parser = ExprParser { tokens, index: 0 };
    let program = parser.program()?;
    if let Some(token) = parser.peek() {
        return Err(ExpressionError::Unexpected {
            token: token.text(),
            pos: token.pos,
            reason: "is an unexpected token",
        });
    }
    Ok(program)
}

struct ExprParser {
    tokens: Vec<Token>,
    index: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_op(&self, ops: &[&str]) -> bool {
        self.peek().is_some_and(|t| ops.iter().any(|op| t.is_op(op)))
    }

    /// Consume the next token if it is one of `ops`, returning the matched operator.
    fn expect(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        let token = self.peek()?;
        let matched = ops.iter().copied().find(|op| token.is_op(op))?;
        self.index += 1;
        Some(matched)
    }

    fn consume(&mut self, op: &'static str) -> Result<(), ExpressionError> {
        if self.expect(&[op]).is_some() {
            return Ok(());
        }
        Err(match self.peek() {
            Some(token) => ExpressionError::Expected {
                token: token.text(),
                pos: token.pos,
                expected: op.to_string(),
            },
            None => ExpressionError::UnexpectedEnd(op.to_string()),
        })
    }

    fn advance(&mut self) -> Result<Token, ExpressionError> {
        let token = self
            .tokens
            .get(self.index)
            .cloned()
            .ok_or_else(|| ExpressionError::UnexpectedEnd("expression".to_string()))?;
        self.index += 1;
        Ok(token)
    }

    fn program(&mut self) -> Result<Node, ExpressionError> {
        let mut body = Vec::new();
        loop {
            if self.peek().is_some() && !self.peek_op(&["}", ")", ";", "]"]) {
                body.push(Node::ExpressionStatement {
                    expression: Box::new(self.filter_chain()?),
                });
            }
            if self.expect(&[";"]).is_none() {
                return Ok(Node::Program { body });
            }
        }
    }

    fn filter_chain(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.expression()?;
        while self.expect(&["|"]).is_some() {
            left = self.filter(left)?;
        }
        Ok(left)
    }

    fn filter(&mut self, input: Node) -> Result<Node, ExpressionError> {
        let callee = self.identifier()?;
        let mut arguments = vec![input];
        while self.expect(&[":"]).is_some() {
            arguments.push(self.expression()?);
        }
        Ok(Node::Call {
            callee: Box::new(callee),
            arguments,
            filter: true,
        })
    }

    fn expression(&mut self) -> Result<Node, ExpressionError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Node, ExpressionError> {
        let result = self.ternary()?;
        if self.peek_op(&["="]) {
            let pos = self.peek().map_or(0, |t| t.pos);
            self.index += 1;
            if !matches!(result, Node::Identifier(_) | Node::Member { .. }) {
                return Err(ExpressionError::Unexpected {
                    token: "=".to_string(),
                    pos,
                    reason: "implies assignment but the left side can not be assigned to",
                });
            }
            let right = self.assignment()?;
            return Ok(Node::Assignment {
                left: Box::new(result),
                right: Box::new(right),
            });
        }
        Ok(result)
    }

    fn ternary(&mut self) -> Result<Node, ExpressionError> {
        let test = self.logical_or()?;
        if self.expect(&["?"]).is_some() {
            let consequent = self.expression()?;
            self.consume(":")?;
            let alternate = self.expression()?;
            return Ok(Node::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }
        Ok(test)
    }

    fn logical_or(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.logical_and()?;
        while let Some(operator) = self.expect(&["||"]) {
            let right = self.logical_and()?;
            left = Node::Logical {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Node, ExpressionError> {
        let mut left = self.binary_level(0)?;
        while let Some(operator) = self.expect(&["&&"]) {
            let right = self.binary_level(0)?;
            left = Node::Logical {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// Left-associative binary levels, loosest first: equality, relational,
    /// additive, multiplicative.
    fn binary_level(&mut self, level: usize) -> Result<Node, ExpressionError> {
        const LEVELS: &[&[&str]] = &[
            &["===", "!==", "==", "!="],
            &["<", ">", "<=", ">="],
            &["+", "-"],
            &["*", "/", "%"],
        ];
        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };
        let mut left = self.binary_level(level + 1)?;
        while let Some(operator) = self.expect(ops) {
            let right = self.binary_level(level + 1)?;
            left = Node::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        if let Some(operator) = self.expect(&["+", "-", "!"]) {
            return Ok(Node::Unary {
                operator,
                argument: Box::new(self.unary()?),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Node, ExpressionError> {
        let mut primary = if self.expect(&["("]).is_some() {
            let inner = self.filter_chain()?;
            self.consume(")")?;
            inner
        } else if self.expect(&["["]).is_some() {
            self.array()?
        } else if self.expect(&["{"]).is_some() {
            self.object()?
        } else {
            let token = self
                .peek()
                .cloned()
                .ok_or_else(|| ExpressionError::UnexpectedEnd("expression".to_string()))?;
            match token.kind {
                TokenKind::Identifier(_) => self.identifier()?,
                TokenKind::String(_) | TokenKind::Number(_) => self.constant()?,
                TokenKind::Op(_) => {
                    return Err(ExpressionError::Unexpected {
                        token: token.text(),
                        pos: token.pos,
                        reason: "not a primary expression",
                    });
                }
            }
        };

        while let Some(op) = self.expect(&["(", "[", "."]) {
            primary = match op {
                "(" => {
                    let arguments = self.arguments()?;
                    self.consume(")")?;
                    Node::Call {
                        callee: Box::new(primary),
                        arguments,
                        filter: false,
                    }
                }
                "[" => {
                    let property = self.expression()?;
                    self.consume("]")?;
                    Node::Member {
                        object: Box::new(primary),
                        property: Box::new(property),
                        computed: true,
                    }
                }
                _ => {
                    let property = self.identifier()?;
                    Node::Member {
                        object: Box::new(primary),
                        property: Box::new(property),
                        computed: false,
                    }
                }
            };
        }
        Ok(primary)
    }

    fn arguments(&mut self) -> Result<Vec<Node>, ExpressionError> {
        let mut arguments = Vec::new();
        if !self.peek_op(&[")"]) {
            loop {
                arguments.push(self.filter_chain()?);
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        Ok(arguments)
    }

    /// Identifiers, including the keyword constants `true`, `false`, `null`,
    /// `undefined` and `this`.
    fn identifier(&mut self) -> Result<Node, ExpressionError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok(match name.as_str() {
                "true" => Node::Literal(Literal::Bool(true)),
                "false" => Node::Literal(Literal::Bool(false)),
                "null" => Node::Literal(Literal::Null),
                "undefined" => Node::Literal(Literal::Undefined),
                "this" => Node::This,
                _ => Node::Identifier(name),
            }),
            _ => Err(ExpressionError::Unexpected {
                token: token.text(),
                pos: token.pos,
                reason: "is not a valid identifier",
            }),
        }
    }

    fn constant(&mut self) -> Result<Node, ExpressionError> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::String(value) => Ok(Node::Literal(Literal::String(value))),
            TokenKind::Number(value) => Ok(Node::Literal(Literal::Number(value))),
            _ => Err(ExpressionError::Unexpected {
                token: token.text(),
                pos: token.pos,
                reason: "is not a constant",
            }),
        }
    }

    fn array(&mut self) -> Result<Node, ExpressionError> {
        let mut elements = Vec::new();
        if !self.peek_op(&["]"]) {
            loop {
                if self.peek_op(&["]"]) {
                    // Trailing comma
                    break;
                }
                elements.push(self.expression()?);
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        self.consume("]")?;
        Ok(Node::Array { elements })
    }

    fn object(&mut self) -> Result<Node, ExpressionError> {
        let mut properties = Vec::new();
        if !self.peek_op(&["}"]) {
            loop {
                if self.peek_op(&["}"]) {
                    // Trailing comma
                    break;
                }
                properties.push(self.property()?);
                if self.expect(&[","]).is_none() {
                    break;
                }
            }
        }
        self.consume("}")?;
        Ok(Node::Object { properties })
    }

    fn property(&mut self) -> Result<Node, ExpressionError> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ExpressionError::UnexpectedEnd("}".to_string()))?;
        let (key, value, computed) = match token.kind {
            TokenKind::String(_) | TokenKind::Number(_) => {
                let key = self.constant()?;
                self.consume(":")?;
                (key, self.expression()?, false)
            }
            TokenKind::Identifier(_) => {
                let key = self.identifier()?;
                let value = if self.expect(&[":"]).is_some() {
                    self.expression()?
                } else {
                    // Shorthand `{a}`
                    key.clone()
                };
                (key, value, false)
            }
            TokenKind::Op("[") => {
                self.index += 1;
                let key = self.expression()?;
                self.consume("]")?;
                self.consume(":")?;
                (key, self.expression()?, true)
            }
            TokenKind::Op(_) => {
                return Err(ExpressionError::Unexpected {
                    token: token.text(),
                    pos: token.pos,
                    reason: "is an invalid key",
                });
            }
        };
        Ok(Node::Property {
            key: Box::new(key),
            value: Box::new(value),
            computed,
        })
    }
}
