//! Recursive descent parser producing expression ASTs
//!
//! Operator precedence, lowest to highest: `or`, `and`, comparison
//! (`= != < <= > >= between in`), additive, multiplicative, exponentiation,
//! unary minus, postfix (path access, filter, invocation).

use crate::error::{ParseError, Result};
use crate::lexer::{Lexer, SpannedToken, Token};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use verdict_core::ast::{BinaryOp, Binding, Expression, Quantifier, UnaryTest, UnaryTests};
use verdict_core::Value;

/// Expression parser over a token stream
pub struct Parser {
    tokens: Vec<SpannedToken>,
    index: usize,
    source_len: usize,
}

impl Parser {
    /// Tokenize the source and set up a parser
    pub fn new(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            index: 0,
            source_len: source.len(),
        })
    }

    /// Parse the source as a single complete expression
    pub fn parse_expression_source(mut self) -> Result<Expression> {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse the source as a unary-test list
    pub fn parse_unary_tests_source(mut self) -> Result<UnaryTests> {
        if self.tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        // A lone dash matches any candidate
        if self.tokens.len() == 1 && self.tokens[0].token == Token::Minus {
            return Ok(UnaryTests::any());
        }

        let negated = if self.peek() == Some(&Token::Not) && self.peek_at(1) == Some(&Token::LParen)
        {
            self.advance();
            self.advance();
            true
        } else {
            false
        };

        let mut tests = vec![self.parse_unary_test()?];
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            tests.push(self.parse_unary_test()?);
        }

        if negated {
            self.expect(Token::RParen)?;
        }
        self.expect_end()?;

        Ok(UnaryTests { negated, tests })
    }

    // ---- expression grammar ----

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expression::binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_additive()?;

        let op = match self.peek() {
            Some(Token::Eq) => Some(BinaryOp::Eq),
            Some(Token::Ne) => Some(BinaryOp::Ne),
            Some(Token::Lt) => Some(BinaryOp::Lt),
            Some(Token::Le) => Some(BinaryOp::Le),
            Some(Token::Gt) => Some(BinaryOp::Gt),
            Some(Token::Ge) => Some(BinaryOp::Ge),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_additive()?;
            return Ok(Expression::binary(left, op, right));
        }

        if self.peek() == Some(&Token::Between) {
            self.advance();
            let low = self.parse_additive()?;
            self.expect(Token::And)?;
            let high = self.parse_additive()?;
            return Ok(Expression::Between {
                value: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        if self.peek() == Some(&Token::In) {
            self.advance();
            let tests = self.parse_in_rhs()?;
            return Ok(Expression::In {
                value: Box::new(left),
                tests,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expression> {
        let base = self.parse_unary()?;
        if self.peek() == Some(&Token::StarStar) {
            self.advance();
            // Right-associative
            let exponent = self.parse_exponent()?;
            return Ok(Expression::binary(base, BinaryOp::Pow, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::Negation(Box::new(operand)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let segment = self.expect_name()?;
                    expr = match expr {
                        Expression::Name(name) => Expression::QualifiedName(vec![name, segment]),
                        Expression::QualifiedName(mut segments) => {
                            segments.push(segment);
                            Expression::QualifiedName(segments)
                        }
                        Expression::Path { base, mut segments } => {
                            segments.push(segment);
                            Expression::Path { base, segments }
                        }
                        other => Expression::Path {
                            base: Box::new(other),
                            segments: vec![segment],
                        },
                    };
                }
                Some(Token::LParen) => {
                    let name = match &expr {
                        Expression::Name(name) => name.clone(),
                        Expression::QualifiedName(segments) => segments.join("."),
                        _ => {
                            return Err(self.error_here("a function name before '('"));
                        }
                    };
                    self.advance();
                    let args = self.parse_call_args()?;
                    expr = Expression::FunctionCall { name, args };
                }
                Some(Token::LBracket) => {
                    // Only filter when the bracket follows a value expression;
                    // list literals are handled in parse_primary
                    self.advance();
                    let predicate = self.parse_expression()?;
                    self.expect(Token::RBracket)?;
                    expr = Expression::Filter {
                        base: Box::new(expr),
                        predicate: Box::new(predicate),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.peek().cloned() {
            None => Err(self.error_here("an expression")),
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expression::Literal(Value::Number(n)))
            }
            Some(Token::String(s)) => {
                self.advance();
                Ok(Expression::Literal(Value::String(s)))
            }
            Some(Token::Temporal(text)) => {
                let position = self.position();
                self.advance();
                self.parse_temporal(&text, position)
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(true)))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expression::Literal(Value::Boolean(false)))
            }
            Some(Token::Null) => {
                self.advance();
                Ok(Expression::Literal(Value::Null))
            }
            Some(Token::Question) => {
                self.advance();
                Ok(Expression::Name("?".to_string()))
            }
            Some(Token::Name(name)) => {
                self.advance();
                Ok(Expression::Name(name))
            }
            Some(Token::Not) => {
                self.advance();
                self.expect(Token::LParen)?;
                let arg = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(Expression::function_call("not", vec![arg]))
            }
            Some(Token::If) => {
                self.advance();
                let condition = self.parse_expression()?;
                self.expect(Token::Then)?;
                let then_expr = self.parse_expression()?;
                self.expect(Token::Else)?;
                let else_expr = self.parse_expression()?;
                Ok(Expression::if_then_else(condition, then_expr, else_expr))
            }
            Some(Token::For) => {
                self.advance();
                let bindings = self.parse_bindings()?;
                self.expect(Token::Return)?;
                let body = self.parse_expression()?;
                Ok(Expression::For {
                    bindings,
                    body: Box::new(body),
                })
            }
            Some(Token::Some) | Some(Token::Every) => {
                let quantifier = if self.peek() == Some(&Token::Some) {
                    Quantifier::Some
                } else {
                    Quantifier::Every
                };
                self.advance();
                let bindings = self.parse_bindings()?;
                self.expect(Token::Satisfies)?;
                let satisfies = self.parse_expression()?;
                Ok(Expression::Quantified {
                    quantifier,
                    bindings,
                    satisfies: Box::new(satisfies),
                })
            }
            Some(Token::LParen) => {
                if let Some(range) = self.try_parse_range()? {
                    return Ok(range);
                }
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::LBracket) => {
                if let Some(range) = self.try_parse_range()? {
                    return Ok(range);
                }
                self.advance();
                let mut items = Vec::new();
                if self.peek() != Some(&Token::RBracket) {
                    items.push(self.parse_expression()?);
                    while self.peek() == Some(&Token::Comma) {
                        self.advance();
                        items.push(self.parse_expression()?);
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Expression::List(items))
            }
            Some(Token::RBracket) => {
                // `]a..b[` style open-start interval
                match self.try_parse_range()? {
                    Some(range) => Ok(range),
                    None => Err(self.error_here("a range after ']'")),
                }
            }
            Some(Token::LBrace) => {
                self.advance();
                let mut entries = Vec::new();
                if self.peek() != Some(&Token::RBrace) {
                    entries.push(self.parse_context_entry()?);
                    while self.peek() == Some(&Token::Comma) {
                        self.advance();
                        entries.push(self.parse_context_entry()?);
                    }
                }
                self.expect(Token::RBrace)?;
                Ok(Expression::Context(entries))
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: other.describe(),
                position: self.position(),
            }),
        }
    }

    fn parse_context_entry(&mut self) -> Result<(String, Expression)> {
        let key = match self.peek().cloned() {
            Some(Token::Name(name)) => {
                self.advance();
                name
            }
            Some(Token::String(s)) => {
                self.advance();
                s
            }
            _ => return Err(self.error_here("a context key")),
        };
        self.expect(Token::Colon)?;
        let value = self.parse_expression()?;
        Ok((key, value))
    }

    fn parse_bindings(&mut self) -> Result<Vec<Binding>> {
        let mut bindings = Vec::new();
        loop {
            let name = self.expect_name()?;
            self.expect(Token::In)?;
            let source = self.parse_expression()?;
            bindings.push(Binding { name, source });

            if self.peek() == Some(&Token::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(bindings)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            args.push(self.parse_expression()?);
            while self.peek() == Some(&Token::Comma) {
                self.advance();
                args.push(self.parse_expression()?);
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// Attempt to parse an interval such as `[1..5]`, `(1..5]` or `]1..5[`.
    /// Restores the token position and returns `None` when the lookahead does
    /// not contain `..` at this nesting level.
    fn try_parse_range(&mut self) -> Result<Option<Expression>> {
        let saved = self.index;

        let start_closed = match self.peek() {
            Some(Token::LBracket) => true,
            Some(Token::LParen) | Some(Token::RBracket) => false,
            _ => return Ok(None),
        };
        self.advance();

        let start = match self.parse_additive() {
            Ok(expr) => expr,
            Err(_) => {
                self.index = saved;
                return Ok(None);
            }
        };

        if self.peek() != Some(&Token::DotDot) {
            self.index = saved;
            return Ok(None);
        }
        self.advance();

        let end = self.parse_additive()?;

        let end_closed = match self.peek() {
            Some(Token::RBracket) => true,
            Some(Token::RParen) | Some(Token::LBracket) => false,
            _ => return Err(self.error_here("a closing range bracket")),
        };
        self.advance();

        Ok(Some(Expression::Range {
            start_closed,
            start: Box::new(start),
            end: Box::new(end),
            end_closed,
        }))
    }

    // ---- unary tests ----

    fn parse_in_rhs(&mut self) -> Result<UnaryTests> {
        if self.peek() == Some(&Token::LParen) {
            if let Some(range) = self.try_parse_range()? {
                return Ok(UnaryTests {
                    negated: false,
                    tests: vec![UnaryTest::Interval(range)],
                });
            }
            // Parenthesized test list: `x in (2, 3, 5)`
            self.advance();
            let mut tests = vec![self.parse_unary_test()?];
            while self.peek() == Some(&Token::Comma) {
                self.advance();
                tests.push(self.parse_unary_test()?);
            }
            self.expect(Token::RParen)?;
            return Ok(UnaryTests {
                negated: false,
                tests,
            });
        }

        Ok(UnaryTests {
            negated: false,
            tests: vec![self.parse_unary_test()?],
        })
    }

    fn parse_unary_test(&mut self) -> Result<UnaryTest> {
        let op = match self.peek() {
            Some(Token::Lt) => Some(BinaryOp::Lt),
            Some(Token::Le) => Some(BinaryOp::Le),
            Some(Token::Gt) => Some(BinaryOp::Gt),
            Some(Token::Ge) => Some(BinaryOp::Ge),
            Some(Token::Eq) => Some(BinaryOp::Eq),
            Some(Token::Ne) => Some(BinaryOp::Ne),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_additive()?;
            return Ok(UnaryTest::Comparison { op, operand });
        }

        if matches!(
            self.peek(),
            Some(Token::LBracket) | Some(Token::LParen) | Some(Token::RBracket)
        ) {
            if let Some(range) = self.try_parse_range()? {
                return Ok(UnaryTest::Interval(range));
            }
        }

        let expr = self.parse_expression()?;
        Ok(UnaryTest::Equal(expr))
    }

    // ---- temporal literals ----

    fn parse_temporal(&self, text: &str, position: usize) -> Result<Expression> {
        let invalid = || ParseError::InvalidTemporal {
            text: text.to_string(),
            position,
        };

        let value = if text.contains('T') {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .map(Value::DateTime)
                .map_err(|_| invalid())?
        } else if text.contains('-') {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid())?
        } else {
            NaiveTime::parse_from_str(text, "%H:%M:%S")
                .map(Value::Time)
                .map_err(|_| invalid())?
        };

        Ok(Expression::Literal(value))
    }

    // ---- token stream helpers ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset).map(|t| &t.token)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|t| t.position)
            .unwrap_or(self.source_len)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.peek() {
            Some(token) if *token == expected => {
                self.advance();
                Ok(())
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: expected.describe(),
                found: token.describe(),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedToken {
                expected: expected.describe(),
                found: "end of input".to_string(),
                position: self.position(),
            }),
        }
    }

    fn expect_name(&mut self) -> Result<String> {
        match self.peek().cloned() {
            Some(Token::Name(name)) => {
                self.advance();
                Ok(name)
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: "a name".to_string(),
                found: token.describe(),
                position: self.position(),
            }),
            None => Err(ParseError::UnexpectedToken {
                expected: "a name".to_string(),
                found: "end of input".to_string(),
                position: self.position(),
            }),
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.index < self.tokens.len() {
            return Err(ParseError::TrailingInput {
                position: self.position(),
            });
        }
        Ok(())
    }

    fn error_here(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self
                .peek()
                .map(|t| t.describe())
                .unwrap_or_else(|| "end of input".to_string()),
            position: self.position(),
        }
    }
}
