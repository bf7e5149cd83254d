//! Recursive-descent parser for OneShot.
//!
//! Statements are parsed by keyword dispatch; expressions by precedence
//! climbing, lowest to highest:
//! assignment, `OR`, `AND`, equality, comparison, additive, multiplicative,
//! unary, primary.

use super::ast::*;
use super::error::Error;
use super::token::{Token, TokenKind};
use super::value::Value;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Appends an `Eof` token when `tokens` does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let line = tokens.last().map_or(1, |t| t.line);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, Error> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(self.parse_declaration()?);
        }
        Ok(statements)
    }

    fn parse_declaration(&mut self) -> Result<Stmt, Error> {
        if self.check(TokenKind::Let) {
            self.parse_let()
        } else {
            self.parse_statement()
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, Error> {
        let line = self.expect(TokenKind::Let, "'LET'")?.line;
        let name = self.expect_ident("variable name")?;
        let init = if self.matches(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Stmt {
            kind: StmtKind::Let { name, init },
            line,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, Error> {
        let token = self.peek().clone();
        let line = token.line;

        let kind = match token.kind {
            TokenKind::Debug => {
                self.advance();
                StmtKind::Debug(self.parse_expression()?)
            }
            TokenKind::Print => {
                self.advance();
                StmtKind::Print(self.parse_expression()?)
            }
            TokenKind::Window => {
                self.advance();
                let [width, height] = self.parse_args::<2>("WINDOW")?;
                StmtKind::Window { width, height }
            }
            TokenKind::Color => {
                self.advance();
                StmtKind::Color(self.parse_expression()?)
            }
            TokenKind::Fill => {
                self.advance();
                if self.matches(TokenKind::All) {
                    StmtKind::Fill(FillArea::All)
                } else {
                    let [x, y, width, height] = self.parse_args::<4>("FILL")?;
                    StmtKind::Fill(FillArea::Rect {
                        x,
                        y,
                        width,
                        height,
                    })
                }
            }
            TokenKind::Text => {
                self.advance();
                let [x, y, text] = self.parse_args::<3>("TEXT")?;
                StmtKind::Text { x, y, text }
            }
            TokenKind::Sleep => {
                self.advance();
                StmtKind::Sleep(self.parse_expression()?)
            }
            TokenKind::Size => {
                self.advance();
                let [width, height] = self.parse_args::<2>("SIZE")?;
                StmtKind::Size { width, height }
            }
            TokenKind::Draw => {
                self.advance();
                let [x, y] = self.parse_args::<2>("DRAW")?;
                self.expect(TokenKind::Comma, "',' after DRAW position")?;
                let sprite = self.parse_name("sprite")?;
                self.expect(TokenKind::Comma, "',' after DRAW sprite name")?;
                let frame = self.parse_expression()?;
                StmtKind::Draw {
                    x,
                    y,
                    sprite,
                    frame,
                }
            }
            TokenKind::ColorData => {
                self.advance();
                let [key, color] = self.parse_args::<2>("COLORDATA")?;
                StmtKind::ColorData { key, color }
            }
            TokenKind::PixelData => {
                self.advance();
                let mut rows = vec![self.parse_expression()?];
                while self.matches(TokenKind::Comma) {
                    rows.push(self.parse_expression()?);
                }
                StmtKind::PixelData(rows)
            }
            TokenKind::Bar => {
                self.advance();
                StmtKind::Bar(self.parse_expression()?)
            }
            TokenKind::Gain => {
                self.advance();
                StmtKind::Gain(self.parse_expression()?)
            }
            TokenKind::Bpm => {
                self.advance();
                StmtKind::Bpm(self.parse_expression()?)
            }
            TokenKind::Loop => {
                self.advance();
                StmtKind::Loop(self.parse_expression()?)
            }
            TokenKind::Type => {
                self.advance();
                StmtKind::Type(self.parse_expression()?)
            }
            TokenKind::Play => {
                self.advance();
                StmtKind::Play(self.parse_name("song")?)
            }
            TokenKind::Stop => {
                self.advance();
                StmtKind::Stop(self.parse_name("song")?)
            }
            TokenKind::Then => {
                self.advance();
                StmtKind::Block(self.parse_block("THEN")?)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Sprite => {
                self.advance();
                let name = self.parse_name("sprite")?;
                let body = self.parse_block("SPRITE")?;
                StmtKind::Sprite { name, body }
            }
            TokenKind::Frame => {
                self.advance();
                let name = self.parse_optional_frame_name();
                let body = self.parse_block("FRAME")?;
                StmtKind::Frame { name, body }
            }
            TokenKind::Song => {
                self.advance();
                let name = self.parse_name("song")?;
                let body = self.parse_block("SONG")?;
                StmtKind::Song { name, body }
            }
            TokenKind::Sheet => {
                self.advance();
                let body = self.parse_block("SHEET")?;
                StmtKind::Sheet { body }
            }
            TokenKind::Fun => {
                return Err(Error::parse("user-defined functions are not supported", line));
            }
            TokenKind::End | TokenKind::Else => {
                return Err(Error::parse(
                    format!("unexpected '{}' outside of a block", token.lexeme),
                    line,
                ));
            }
            _ => StmtKind::Expression(self.parse_expression()?),
        };

        Ok(Stmt { kind, line })
    }

    fn parse_if(&mut self) -> Result<StmtKind, Error> {
        self.expect(TokenKind::If, "'IF'")?;
        let condition = self.parse_expression()?;
        self.matches(TokenKind::Then);

        let mut then_branch = Vec::new();
        while !self.check(TokenKind::Else) && !self.check(TokenKind::End) && !self.is_at_end() {
            then_branch.push(self.parse_declaration()?);
        }

        let else_branch = if self.matches(TokenKind::Else) {
            self.parse_block("IF")?
        } else {
            self.expect(TokenKind::End, "'END' to close IF")?;
            Vec::new()
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<StmtKind, Error> {
        self.expect(TokenKind::While, "'WHILE'")?;
        let condition = self.parse_expression()?;
        self.matches(TokenKind::Then);
        let body = self.parse_block("WHILE")?;
        Ok(StmtKind::While { condition, body })
    }

    /// `FOR [(] init : condition : increment [)] [THEN] body END`
    fn parse_for(&mut self) -> Result<StmtKind, Error> {
        self.expect(TokenKind::For, "'FOR'")?;
        let parenthesized = self.matches(TokenKind::LParen);

        let init = if self.check(TokenKind::Let) {
            self.parse_let()?
        } else {
            let line = self.peek().line;
            Stmt {
                kind: StmtKind::Expression(self.parse_expression()?),
                line,
            }
        };
        self.expect(TokenKind::Colon, "':' after FOR initializer")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon, "':' after FOR condition")?;
        let increment = self.parse_expression()?;

        if parenthesized {
            self.expect(TokenKind::RParen, "')' after FOR clauses")?;
        }
        self.matches(TokenKind::Then);
        let body = self.parse_block("FOR")?;

        Ok(StmtKind::For {
            init: Box::new(init),
            condition,
            increment,
            body,
        })
    }

    /// Parse declarations up to and including the closing `END`.
    fn parse_block(&mut self, opener: &str) -> Result<Vec<Stmt>, Error> {
        let mut body = Vec::new();
        while !self.check(TokenKind::End) && !self.is_at_end() {
            body.push(self.parse_declaration()?);
        }
        self.expect(TokenKind::End, &format!("'END' to close {opener}"))?;
        Ok(body)
    }

    fn parse_name(&mut self, what: &str) -> Result<String, Error> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) | TokenKind::Str(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(Error::parse(
                format!("expected {what} name, got '{}'", token.lexeme),
                token.line,
            )),
        }
    }

    /// A frame name is a string, or an identifier that does not start an
    /// assignment.
    fn parse_optional_frame_name(&mut self) -> Option<String> {
        let name = match &self.peek().kind {
            TokenKind::Str(name) => name.clone(),
            TokenKind::Ident(name) if !self.check_next(TokenKind::Eq) => name.clone(),
            _ => return None,
        };
        self.advance();
        Some(name)
    }

    /// Exactly `N` comma-separated expressions.
    fn parse_args<const N: usize>(&mut self, what: &str) -> Result<[Expr; N], Error> {
        let line = self.peek().line;
        let mut args = Vec::with_capacity(N);
        for i in 0..N {
            if i > 0 {
                self.expect(TokenKind::Comma, &format!("',' between {what} arguments"))?;
            }
            args.push(self.parse_expression()?);
        }
        args.try_into()
            .map_err(|_| Error::parse(format!("{what} takes {N} arguments"), line))
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    pub fn parse_expression(&mut self) -> Result<Expr, Error> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, Error> {
        let target = self.parse_or()?;

        if self.check(TokenKind::Eq) {
            let line = self.advance().line;
            let value = self.parse_assignment()?;
            return match target {
                Expr::Variable { name, .. } => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                    line,
                }),
                _ => Err(Error::parse("invalid assignment target", line)),
            };
        }

        Ok(target)
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_and()?;
        while self.matches(TokenKind::Or) {
            let right = self.parse_and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::Or,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_equality()?;
        while self.matches(TokenKind::And) {
            let right = self.parse_equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op: LogicalOp::And,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, Error> {
        self.parse_binary_level(Self::parse_comparison, |kind| match kind {
            TokenKind::EqEq => Some(BinaryOp::Equal),
            TokenKind::NotEq => Some(BinaryOp::NotEqual),
            _ => None,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        self.parse_binary_level(Self::parse_term, |kind| match kind {
            TokenKind::Less => Some(BinaryOp::Less),
            TokenKind::LessEq => Some(BinaryOp::LessEqual),
            TokenKind::Greater => Some(BinaryOp::Greater),
            TokenKind::GreaterEq => Some(BinaryOp::GreaterEqual),
            _ => None,
        })
    }

    fn parse_term(&mut self) -> Result<Expr, Error> {
        self.parse_binary_level(Self::parse_factor, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    fn parse_factor(&mut self) -> Result<Expr, Error> {
        self.parse_binary_level(Self::parse_unary, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Multiply),
            TokenKind::Slash => Some(BinaryOp::Divide),
            _ => None,
        })
    }

    /// One left-associative binary level: fold while the current token is one
    /// of this level's operators.
    fn parse_binary_level(
        &mut self,
        operand: fn(&mut Self) -> Result<Expr, Error>,
        operator: fn(&TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, Error> {
        let mut expr = operand(self)?;
        while let Some(op) = operator(&self.peek().kind) {
            let line = self.advance().line;
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                line,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.parse_primary(),
        };
        let line = self.advance().line;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            line,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let token = self.peek().clone();
        let line = token.line;

        let builtin = match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                return Ok(Expr::Literal(Value::Number(n)));
            }
            TokenKind::Str(s) => {
                self.advance();
                return Ok(Expr::Literal(Value::Str(s)));
            }
            TokenKind::True => {
                self.advance();
                return Ok(Expr::Literal(Value::Bool(true)));
            }
            TokenKind::False => {
                self.advance();
                return Ok(Expr::Literal(Value::Bool(false)));
            }
            TokenKind::Null => {
                self.advance();
                return Ok(Expr::Literal(Value::Null));
            }
            TokenKind::Ident(name) => {
                self.advance();
                return Ok(Expr::Variable { name, line });
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')' after expression")?;
                return Ok(Expr::Grouping(Box::new(inner)));
            }
            TokenKind::MouseX => return self.parse_mouse(Builtin::MouseX, line),
            TokenKind::MouseY => return self.parse_mouse(Builtin::MouseY, line),
            TokenKind::Random => Builtin::Random,
            TokenKind::Input => Builtin::Input,
            TokenKind::Int => Builtin::Int,
            TokenKind::Min => Builtin::Min,
            TokenKind::Max => Builtin::Max,
            TokenKind::Abs => Builtin::Abs,
            TokenKind::Floor => Builtin::Floor,
            TokenKind::Ceil => Builtin::Ceil,
            TokenKind::Lerp => Builtin::Lerp,
            TokenKind::Eof => {
                return Err(Error::parse("expected expression, got end of input", line));
            }
            _ => {
                return Err(Error::parse(
                    format!("expected expression, got '{}'", token.lexeme),
                    line,
                ));
            }
        };

        self.advance();
        self.parse_call(builtin, line)
    }

    /// `MOUSEX` and `MOUSEY` may be written bare or with an empty argument list.
    fn parse_mouse(&mut self, builtin: Builtin, line: usize) -> Result<Expr, Error> {
        self.advance();
        if self.matches(TokenKind::LParen) {
            self.expect(TokenKind::RParen, &format!("')' after {}", builtin.name()))?;
        }
        Ok(Expr::Call {
            builtin,
            args: Vec::new(),
            line,
        })
    }

    fn parse_call(&mut self, builtin: Builtin, line: usize) -> Result<Expr, Error> {
        let name = builtin.name();
        self.expect(TokenKind::LParen, &format!("'(' after {name}"))?;
        let mut args = Vec::with_capacity(builtin.arity());
        for i in 0..builtin.arity() {
            if i > 0 {
                self.expect(TokenKind::Comma, &format!("',' between {name} arguments"))?;
            }
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen, &format!("')' after {name} arguments"))?;
        Ok(Expr::Call {
            builtin,
            args,
            line,
        })
    }

    // -------------------------------------------------------------------------
    // Token helpers
    // -------------------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn check_next(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(&kind))
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<&Token, Error> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            let got = if t.kind == TokenKind::Eof {
                "end of input".to_string()
            } else {
                format!("'{}'", t.lexeme)
            };
            Err(Error::parse(format!("expected {what}, got {got}"), t.line))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, Error> {
        let t = self.peek().clone();
        match t.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(Error::parse(
                format!("expected {what}, got '{}'", t.lexeme),
                t.line,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::lexer::Lexer;

    fn parse(src: &str) -> Result<Vec<Stmt>, Error> {
        let mut lexer = Lexer::new(src);
        let tokens = lexer.tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    #[test]
    fn empty_token_list_parses_to_nothing() {
        assert!(Parser::new(Vec::new()).parse().unwrap().is_empty());
        let tokens = vec![Token::new(TokenKind::Print, "PRINT", 1)];
        let err = Parser::new(tokens).parse().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    fn parse_expr(src: &str) -> Expr {
        let stmts = parse(src).unwrap();
        match stmts.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expression(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn num(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(Value::Number(n)))
    }

    #[test]
    fn parse_empty_program() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn multiplication_binds_tighter() {
        let expr = parse_expr("1 + 2 * 3");
        assert_eq!(
            expr,
            Expr::Binary {
                left: num(1.0),
                op: BinaryOp::Add,
                right: Box::new(Expr::Binary {
                    left: num(2.0),
                    op: BinaryOp::Multiply,
                    right: num(3.0),
                    line: 1,
                }),
                line: 1,
            }
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse_expr("10 - 4 - 3");
        match expr {
            Expr::Binary { left, op, right, .. } => {
                assert_eq!(op, BinaryOp::Subtract);
                assert_eq!(right, num(3.0));
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expr = parse_expr("(1 + 2) * 3");
        match expr {
            Expr::Binary { left, op, .. } => {
                assert_eq!(op, BinaryOp::Multiply);
                assert!(matches!(*left, Expr::Grouping(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn or_binds_looser_than_and() {
        let expr = parse_expr("A OR B AND C");
        match expr {
            Expr::Logical { op, right, .. } => {
                assert_eq!(op, LogicalOp::Or);
                assert!(matches!(*right, Expr::Logical { op: LogicalOp::And, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comparison_binds_looser_than_addition() {
        let expr = parse_expr("1 + X > 2");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Greater, .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let expr = parse_expr("A = B = 3");
        match expr {
            Expr::Assign { name, value, .. } => {
                assert_eq!(name, "A");
                assert!(matches!(*value, Expr::Assign { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_assignment_target() {
        let err = parse("1 + 2 = 3").unwrap_err();
        assert_eq!(err, Error::parse("invalid assignment target", 1));
    }

    #[test]
    fn let_with_and_without_initializer() {
        let stmts = parse("LET X = 5\nLET Y").unwrap();
        assert_eq!(
            stmts[0].kind,
            StmtKind::Let {
                name: "X".into(),
                init: Some(Expr::Literal(Value::Number(5.0))),
            }
        );
        assert_eq!(
            stmts[1],
            Stmt {
                kind: StmtKind::Let {
                    name: "Y".into(),
                    init: None
                },
                line: 2,
            }
        );
    }

    #[test]
    fn builtin_arity_is_enforced() {
        assert!(parse("LET R = RANDOM()").is_ok());
        assert!(parse("LET M = MIN(1, 2)").is_ok());
        assert!(parse("LET L = LERP(0, 10, 0.5)").is_ok());

        let missing_comma = parse("LET M = MIN(1 2)").unwrap_err();
        assert!(missing_comma.message().contains("','"));

        let missing_paren = parse("LET A = ABS(1").unwrap_err();
        assert!(missing_paren.message().contains("')'"));

        let missing_expr = parse("LET A = MAX(1,)").unwrap_err();
        assert!(missing_expr.message().contains("expected expression"));
    }

    #[test]
    fn mouse_position_with_or_without_parens() {
        assert!(matches!(
            parse_expr("X = MOUSEX"),
            Expr::Assign { .. }
        ));
        assert!(parse("LET Y = MOUSEY()").is_ok());
    }

    #[test]
    fn if_else_branches() {
        let stmts = parse("IF (NULL) THEN PRINT 1 ELSE PRINT 2 END").unwrap();
        match &stmts[0].kind {
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_end_is_an_error() {
        let err = parse("WHILE TRUE\nPRINT 1\n").unwrap_err();
        assert!(err.message().contains("'END' to close WHILE"));
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn for_with_and_without_parens() {
        let a = parse("FOR (LET I = 0 : I < 3 : I = I + 1) PRINT I END").unwrap();
        let b = parse("FOR LET I = 0 : I < 3 : I = I + 1 THEN PRINT I END").unwrap();
        assert!(matches!(a[0].kind, StmtKind::For { .. }));
        assert_eq!(a[0].kind, b[0].kind);
    }

    #[test]
    fn for_requires_colons() {
        let err = parse("FOR LET I = 0, I < 3 : I = I + 1 END").unwrap_err();
        assert!(err.message().contains("':'"));
    }

    #[test]
    fn window_missing_comma() {
        let err = parse("WINDOW 10 20").unwrap_err();
        assert!(err.message().contains("',' between WINDOW arguments"));
    }

    #[test]
    fn fill_all_and_rect() {
        let stmts = parse("FILL ALL\nFILL 1, 2, 3, 4").unwrap();
        assert_eq!(stmts[0].kind, StmtKind::Fill(FillArea::All));
        assert!(matches!(stmts[1].kind, StmtKind::Fill(FillArea::Rect { .. })));
    }

    #[test]
    fn sprite_with_frames() {
        let src = r#"
SPRITE hero
  SIZE 2, 2
  FRAME "idle"
    COLORDATA "r", "red"
    PIXELDATA "rr", "rr"
  END
  FRAME
    PIXELDATA "r."
  END
END
DRAW 0, 0, hero, 0
"#;
        let stmts = parse(src).unwrap();
        match &stmts[0].kind {
            StmtKind::Sprite { name, body } => {
                assert_eq!(name, "hero");
                assert_eq!(body.len(), 3);
                assert!(matches!(&body[1].kind, StmtKind::Frame { name: Some(n), body } if n == "idle" && body.len() == 2));
                assert!(matches!(&body[2].kind, StmtKind::Frame { name: None, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(&stmts[1].kind, StmtKind::Draw { sprite, .. } if sprite == "hero"));
    }

    #[test]
    fn frame_body_may_start_with_assignment() {
        let stmts = parse("SPRITE s FRAME X = 1 END END").unwrap();
        match &stmts[0].kind {
            StmtKind::Sprite { body, .. } => {
                assert!(matches!(&body[0].kind, StmtKind::Frame { name: None, body } if body.len() == 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn song_requires_name() {
        let err = parse("SONG\nSHEET END END").unwrap_err();
        assert!(err.message().contains("expected song name"));
    }

    #[test]
    fn song_with_sheets() {
        let src = r#"
SONG "theme"
  BPM 140
  LOOP TRUE
  SHEET
    TYPE "square"
    GAIN 0.5
    BAR "C4 - E4 G4"
  END
END
PLAY theme
STOP "theme"
"#;
        let stmts = parse(src).unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[1].kind, StmtKind::Play("theme".into()));
        assert_eq!(stmts[2].kind, StmtKind::Stop("theme".into()));
    }

    #[test]
    fn fun_is_rejected() {
        let err = parse("FUN f").unwrap_err();
        assert!(err.message().contains("not supported"));
    }

    #[test]
    fn stray_end_is_rejected() {
        assert!(parse("END").is_err());
    }

    #[test]
    fn bare_then_block() {
        let stmts = parse("THEN LET X = 1 PRINT X END").unwrap();
        assert!(matches!(&stmts[0].kind, StmtKind::Block(body) if body.len() == 2));
    }
}
