use colored::Colorize;

use crate::frontend::{
    SourceFile,
    ast::{
        BinaryOperatorKind, ClassDecl, Expression, ExpressionKind, ForStatement, FuncDecl,
        Identifier, IfStatement, MatchCase, MatchStatement, NodeId, Pattern, PatternKind, Program,
        Statement, StatementKind, UnaryOperatorKind, VarDecl, WhileStatement,
    },
    lexer::{Keyword, Lexer, Span, Token, TokenKind},
};

#[derive(Debug)]
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    next_node_id: u32,
}

impl<'source> Parser<'source> {
    pub fn parse_program(source_file: &'source SourceFile) -> Program {
        let mut parser = Self {
            lexer: Lexer::new(source_file),
            next_node_id: 0,
        };

        let mut statements = Vec::new();

        while parser.lexer.peek().is_some() {
            statements.push(parser.parse_statement());
        }

        Program { statements }
    }

    fn create_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn report_fatal_error(&self, offending_span: Span, message: &str) -> ! {
        eprintln!(
            "{} {} ({}:{}:{})",
            "error:".red().bold(),
            message,
            self.lexer.source().origin,
            self.lexer.source().row_for_position(offending_span.start) + 1,
            self.lexer
                .source()
                .column_for_position(offending_span.start)
        );
        eprintln!("{}", self.lexer.source().highlight_span(offending_span));
        std::process::exit(1);
    }

    fn report_fatal_error_at_eof(&self, message: &str) -> ! {
        let end = self.lexer.source().contents.len();
        self.report_fatal_error(Span::new(end.saturating_sub(1), end), message)
    }

    fn expect_peek(&mut self, expecting: &str) -> Token {
        let Some(token) = self.lexer.peek() else {
            self.report_fatal_error_at_eof(&format!(
                "Expected {expecting} but reached end of file"
            ))
        };

        token
    }

    fn expect_next(&mut self, expecting: &str) -> Token {
        let Some(token) = self.lexer.next() else {
            self.report_fatal_error_at_eof(&format!(
                "Expected {expecting} but reached end of file"
            ))
        };

        token
    }

    fn expect_next_to_be(&mut self, kind: TokenKind) -> Token {
        let token = self.expect_next(&format!("{kind:?}"));

        if token.kind != kind {
            self.report_fatal_error(
                token.span,
                &format!(
                    "Expected {:?} but found {:?} ({})",
                    kind,
                    token.kind,
                    self.lexer.source().value_of_span(token.span)
                ),
            )
        }

        token
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Token {
        self.expect_next_to_be(TokenKind::Keyword(keyword))
    }

    /// fn name(this: Type) {}
    fn parse_statement(&mut self) -> Statement {
        let peeked = self.expect_peek("statement");

        match peeked.kind {
            TokenKind::Keyword(Keyword::Let) => self.parse_var_decl(),
            TokenKind::Keyword(Keyword::Func) => self.parse_func_decl(),
            TokenKind::Keyword(Keyword::Class) => self.parse_class_decl(),
            TokenKind::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenKind::Keyword(Keyword::For) => self.parse_for_statement(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenKind::Keyword(Keyword::Match) => self.parse_match_statement(),
            TokenKind::Keyword(Keyword::Print) => self.parse_print_statement(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return_statement(),
            TokenKind::Keyword(keyword) if keyword.is_reserved() => self.report_fatal_error(
                peeked.span,
                &format!("Keyword `{keyword:?}` is reserved and not yet supported"),
            ),
            TokenKind::Keyword(Keyword::Else | Keyword::End | Keyword::Case) => self
                .report_fatal_error(
                    peeked.span,
                    &format!(
                        "Unexpected {:?} outside of an enclosing block",
                        self.lexer.source().value_of_span(peeked.span)
                    ),
                ),
            _ => self.parse_expression_statement(),
        }
    }

    /// Parses statements until one of `stops` (or end of file) is peeked.
    /// Never consumes the stopping keyword; the enclosing construct does.
    fn parse_statement_block(&mut self, stops: &[Keyword]) -> Vec<Statement> {
        let mut statements = Vec::new();

        while let Some(peeked) = self.lexer.peek() {
            if let TokenKind::Keyword(keyword) = peeked.kind
                && stops.contains(&keyword)
            {
                break;
            }

            statements.push(self.parse_statement());
        }

        statements
    }

    fn parse_identifier(&mut self) -> Identifier {
        let token = self.expect_next("identifier");

        if token.kind != TokenKind::Identifier {
            self.report_fatal_error(
                token.span,
                &format!(
                    "Expected identifier but found {:?} ({})",
                    token.kind,
                    self.lexer.source().value_of_span(token.span)
                ),
            )
        }

        Identifier {
            id: self.create_node_id(),
            span: token.span,
            name: self.lexer.source().value_of_span(token.span).to_owned(),
        }
    }

    /// Let name = expression
    fn parse_var_decl(&mut self) -> Statement {
        let let_token = self.expect_keyword(Keyword::Let);
        let name = self.parse_identifier();

        let initializer = if self
            .lexer
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Equals)
        {
            self.lexer.next();
            Some(self.parse_expression())
        } else {
            None
        };

        let end = initializer
            .as_ref()
            .map(|e| e.span.end)
            .unwrap_or(name.span.end);

        Statement {
            id: self.create_node_id(),
            span: Span::new(let_token.span.start, end),
            kind: StatementKind::VarDecl(Box::new(VarDecl { name, initializer })),
        }
    }

    /// Func name(a, b) ... End
    fn parse_func_decl(&mut self) -> Statement {
        let func_token = self.expect_keyword(Keyword::Func);
        let name = self.parse_identifier();

        self.expect_next_to_be(TokenKind::OpenParen);

        let mut parameters = Vec::new();

        if self
            .expect_peek("parameter list")
            .kind
            != TokenKind::CloseParen
        {
            loop {
                parameters.push(self.parse_identifier());

                let token = self.expect_next("`,` or `)`");

                match token.kind {
                    TokenKind::Comma => continue,
                    TokenKind::CloseParen => break,
                    _ => self.report_fatal_error(
                        token.span,
                        "Expected `,` or `)` in parameter list",
                    ),
                }
            }
        } else {
            self.lexer.next();
        }

        let body = self.parse_statement_block(&[Keyword::End]);
        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(func_token.span.start, end_token.span.end),
            kind: StatementKind::FuncDecl(Box::new(FuncDecl {
                name,
                parameters,
                body,
            })),
        }
    }

    /// Class name : base ... End
    fn parse_class_decl(&mut self) -> Statement {
        let class_token = self.expect_keyword(Keyword::Class);
        let name = self.parse_identifier();

        let base = if self
            .lexer
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Colon)
        {
            self.lexer.next();
            Some(self.parse_identifier())
        } else {
            None
        };

        let body = self.parse_statement_block(&[Keyword::End]);
        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(class_token.span.start, end_token.span.end),
            kind: StatementKind::ClassDecl(Box::new(ClassDecl { name, base, body })),
        }
    }

    /// If condition ... Else ... End
    fn parse_if_statement(&mut self) -> Statement {
        let if_token = self.expect_keyword(Keyword::If);
        let condition = self.parse_expression();

        let then_body = self.parse_statement_block(&[Keyword::Else, Keyword::End]);

        let else_body = if self
            .lexer
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword(Keyword::Else))
        {
            self.lexer.next();
            self.parse_statement_block(&[Keyword::End])
        } else {
            Vec::new()
        };

        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(if_token.span.start, end_token.span.end),
            kind: StatementKind::If(Box::new(IfStatement {
                condition,
                then_body,
                else_body,
            })),
        }
    }

    /// For variable = start..end ... End
    fn parse_for_statement(&mut self) -> Statement {
        let for_token = self.expect_keyword(Keyword::For);
        let variable = self.parse_identifier();

        self.expect_next_to_be(TokenKind::Equals);
        let start = self.parse_expression();
        self.expect_next_to_be(TokenKind::DotDot);
        let end = self.parse_expression();

        let body = self.parse_statement_block(&[Keyword::End]);
        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(for_token.span.start, end_token.span.end),
            kind: StatementKind::For(Box::new(ForStatement {
                variable,
                start,
                end,
                body,
            })),
        }
    }

    /// While condition ... End
    fn parse_while_statement(&mut self) -> Statement {
        let while_token = self.expect_keyword(Keyword::While);
        let condition = self.parse_expression();

        let body = self.parse_statement_block(&[Keyword::End]);
        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(while_token.span.start, end_token.span.end),
            kind: StatementKind::While(Box::new(WhileStatement { condition, body })),
        }
    }

    /// Match scrutinee Case pattern: ... End
    fn parse_match_statement(&mut self) -> Statement {
        let match_token = self.expect_keyword(Keyword::Match);
        let scrutinee = self.parse_expression();

        let mut cases = Vec::new();

        while self
            .lexer
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Keyword(Keyword::Case))
        {
            let case_token = self.expect_keyword(Keyword::Case);
            let pattern = self.parse_pattern();

            self.expect_next_to_be(TokenKind::Colon);

            let body = self.parse_statement_block(&[Keyword::Case, Keyword::End]);
            let end = body.last().map(|s| s.span.end).unwrap_or(pattern.span.end);

            cases.push(MatchCase {
                id: self.create_node_id(),
                span: Span::new(case_token.span.start, end),
                pattern,
                body,
            });
        }

        let end_token = self.expect_keyword(Keyword::End);

        Statement {
            id: self.create_node_id(),
            span: Span::new(match_token.span.start, end_token.span.end),
            kind: StatementKind::Match(Box::new(MatchStatement { scrutinee, cases })),
        }
    }

    /// One of the four case-pattern forms: `expr`, `lo..hi`, `<expr`,
    /// `>expr`
    fn parse_pattern(&mut self) -> Pattern {
        let peeked = self.expect_peek("case pattern");

        match peeked.kind {
            TokenKind::LessThan => {
                self.lexer.next();
                let limit = self.parse_expression();

                Pattern {
                    id: self.create_node_id(),
                    span: Span::new(peeked.span.start, limit.span.end),
                    kind: PatternKind::LessThan(limit),
                }
            }
            TokenKind::GreaterThan => {
                self.lexer.next();
                let limit = self.parse_expression();

                Pattern {
                    id: self.create_node_id(),
                    span: Span::new(peeked.span.start, limit.span.end),
                    kind: PatternKind::GreaterThan(limit),
                }
            }
            _ => {
                let low = self.parse_expression();

                if self
                    .lexer
                    .peek()
                    .is_some_and(|t| t.kind == TokenKind::DotDot)
                {
                    self.lexer.next();
                    let high = self.parse_expression();

                    Pattern {
                        id: self.create_node_id(),
                        span: Span::new(low.span.start, high.span.end),
                        kind: PatternKind::Range(low, high),
                    }
                } else {
                    Pattern {
                        id: self.create_node_id(),
                        span: low.span,
                        kind: PatternKind::Equals(low),
                    }
                }
            }
        }
    }

    /// Print expression
    fn parse_print_statement(&mut self) -> Statement {
        let print_token = self.expect_keyword(Keyword::Print);
        let expression = self.parse_expression();

        Statement {
            id: self.create_node_id(),
            span: Span::new(print_token.span.start, expression.span.end),
            kind: StatementKind::Print(Box::new(expression)),
        }
    }

    /// Return expression
    fn parse_return_statement(&mut self) -> Statement {
        let return_token = self.expect_keyword(Keyword::Return);
        let expression = self.parse_expression();

        Statement {
            id: self.create_node_id(),
            span: Span::new(return_token.span.start, expression.span.end),
            kind: StatementKind::Return(Box::new(expression)),
        }
    }

    fn parse_expression_statement(&mut self) -> Statement {
        let expression = self.parse_expression();

        Statement {
            id: self.create_node_id(),
            span: expression.span,
            kind: StatementKind::Expr(Box::new(expression)),
        }
    }

    fn parse_expression(&mut self) -> Expression {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Expression {
        let mut lhs = self.parse_comparison();

        while self
            .lexer
            .peek()
            .is_some_and(|t| t.kind.is_equality_operator())
        {
            let operator_token = self.expect_next("operator");
            let operator = match operator_token.kind {
                TokenKind::DoubleEquals => BinaryOperatorKind::Equals,
                TokenKind::NotEquals => BinaryOperatorKind::NotEquals,
                _ => unreachable!(),
            };

            let rhs = self.parse_comparison();

            lhs = self.new_binary_expression(operator, lhs, rhs);
        }

        lhs
    }

    fn parse_comparison(&mut self) -> Expression {
        let mut lhs = self.parse_term();

        while self
            .lexer
            .peek()
            .is_some_and(|t| t.kind.is_comparison_operator())
        {
            let operator_token = self.expect_next("operator");
            let operator = match operator_token.kind {
                TokenKind::LessThan => BinaryOperatorKind::LessThan,
                TokenKind::LessThanOrEqualTo => BinaryOperatorKind::LessThanOrEqualTo,
                TokenKind::GreaterThan => BinaryOperatorKind::GreaterThan,
                TokenKind::GreaterThanOrEqualTo => BinaryOperatorKind::GreaterThanOrEqualTo,
                _ => unreachable!(),
            };

            let rhs = self.parse_term();

            lhs = self.new_binary_expression(operator, lhs, rhs);
        }

        lhs
    }

    fn parse_term(&mut self) -> Expression {
        let mut lhs = self.parse_factor();

        while self
            .lexer
            .peek()
            .is_some_and(|t| t.kind.is_term_operator())
        {
            let operator_token = self.expect_next("operator");
            let operator = match operator_token.kind {
                TokenKind::Plus => BinaryOperatorKind::Add,
                TokenKind::Minus => BinaryOperatorKind::Subtract,
                _ => unreachable!(),
            };

            let rhs = self.parse_factor();

            lhs = self.new_binary_expression(operator, lhs, rhs);
        }

        lhs
    }

    fn parse_factor(&mut self) -> Expression {
        let mut lhs = self.parse_unary();

        while self
            .lexer
            .peek()
            .is_some_and(|t| t.kind.is_factor_operator())
        {
            let operator_token = self.expect_next("operator");
            let operator = match operator_token.kind {
                TokenKind::Asterisk => BinaryOperatorKind::Multiply,
                TokenKind::Divide => BinaryOperatorKind::Divide,
                _ => unreachable!(),
            };

            let rhs = self.parse_unary();

            lhs = self.new_binary_expression(operator, lhs, rhs);
        }

        lhs
    }

    fn new_binary_expression(
        &mut self,
        operator: BinaryOperatorKind,
        lhs: Expression,
        rhs: Expression,
    ) -> Expression {
        Expression {
            id: self.create_node_id(),
            span: Span::new(lhs.span.start, rhs.span.end),
            kind: ExpressionKind::Binary {
                operator,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    fn parse_unary(&mut self) -> Expression {
        let peeked = self.expect_peek("expression");

        if !peeked.kind.is_unary_operator() {
            return self.parse_primary();
        }

        let operator_token = self.expect_next("operator");
        let operator = match operator_token.kind {
            TokenKind::Minus => UnaryOperatorKind::Negate,
            TokenKind::Bang => UnaryOperatorKind::BitwiseNot,
            _ => unreachable!(),
        };

        let operand = self.parse_unary();

        Expression {
            id: self.create_node_id(),
            span: Span::new(operator_token.span.start, operand.span.end),
            kind: ExpressionKind::Unary {
                operator,
                operand: Box::new(operand),
            },
        }
    }

    fn parse_primary(&mut self) -> Expression {
        let peeked = self.expect_peek("expression");

        match peeked.kind {
            TokenKind::IntegerLiteral => {
                let token = self.expect_next_to_be(TokenKind::IntegerLiteral);
                let text = self.lexer.source().value_of_span(token.span);

                let Ok(value) = text.parse::<i32>() else {
                    self.report_fatal_error(
                        token.span,
                        &format!("Integer literal `{text}` does not fit in 32 bits"),
                    )
                };

                Expression {
                    id: self.create_node_id(),
                    span: token.span,
                    kind: ExpressionKind::IntegerLiteral(value),
                }
            }
            TokenKind::StringLiteral => {
                let token = self.expect_next_to_be(TokenKind::StringLiteral);
                let text = self.lexer.source().value_of_span(token.span);
                // Strip the surrounding quotes; there are no escapes
                let value = text[1..text.len() - 1].to_owned();

                Expression {
                    id: self.create_node_id(),
                    span: token.span,
                    kind: ExpressionKind::StringLiteral(value),
                }
            }
            TokenKind::Keyword(Keyword::Input) => {
                let token = self.expect_keyword(Keyword::Input);
                self.expect_next_to_be(TokenKind::OpenParen);
                let close = self.expect_next_to_be(TokenKind::CloseParen);

                Expression {
                    id: self.create_node_id(),
                    span: Span::new(token.span.start, close.span.end),
                    kind: ExpressionKind::Input,
                }
            }
            TokenKind::Identifier => {
                let identifier = self.parse_identifier();

                if self
                    .lexer
                    .peek()
                    .is_some_and(|t| t.kind == TokenKind::OpenParen)
                {
                    return self.parse_call_expression(identifier);
                }

                Expression {
                    id: self.create_node_id(),
                    span: identifier.span,
                    kind: ExpressionKind::Variable(identifier),
                }
            }
            TokenKind::OpenParen => {
                self.lexer.next();
                let inner = self.parse_expression();
                self.expect_next_to_be(TokenKind::CloseParen);

                inner
            }
            _ => self.report_fatal_error(
                peeked.span,
                &format!(
                    "Expected expression but found {:?} ({})",
                    peeked.kind,
                    self.lexer.source().value_of_span(peeked.span)
                ),
            ),
        }
    }

    fn parse_call_expression(&mut self, callee: Identifier) -> Expression {
        self.expect_next_to_be(TokenKind::OpenParen);

        let mut arguments = Vec::new();

        let close_span = if self
            .expect_peek("argument list")
            .kind
            == TokenKind::CloseParen
        {
            self.expect_next_to_be(TokenKind::CloseParen).span
        } else {
            loop {
                arguments.push(self.parse_expression());

                let token = self.expect_next("`,` or `)`");

                match token.kind {
                    TokenKind::Comma => continue,
                    TokenKind::CloseParen => break token.span,
                    _ => self
                        .report_fatal_error(token.span, "Expected `,` or `)` in argument list"),
                }
            }
        };

        Expression {
            id: self.create_node_id(),
            span: Span::new(callee.span.start, close_span.end),
            kind: ExpressionKind::Call { callee, arguments },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let source = SourceFile::in_memory(source);
        Parser::parse_program(&source)
    }

    fn parse_single_expression(source: &str) -> Expression {
        let mut program = parse(source);
        assert_eq!(program.statements.len(), 1);

        match program.statements.remove(0).kind {
            StatementKind::Expr(expression) => *expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        let expression = parse_single_expression("2 + 3 * 4");

        let ExpressionKind::Binary { operator, rhs, .. } = expression.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperatorKind::Add);

        let ExpressionKind::Binary { operator, .. } = rhs.kind else {
            panic!("expected nested binary expression");
        };
        assert_eq!(operator, BinaryOperatorKind::Multiply);
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expression = parse_single_expression("(2 + 3) * 4");

        let ExpressionKind::Binary { operator, lhs, .. } = expression.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperatorKind::Multiply);
        assert!(matches!(
            lhs.kind,
            ExpressionKind::Binary {
                operator: BinaryOperatorKind::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_comparison_is_lower_than_arithmetic() {
        let expression = parse_single_expression("1 + 2 < 3 * 4");

        let ExpressionKind::Binary { operator, .. } = expression.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, BinaryOperatorKind::LessThan);
    }

    #[test]
    fn test_unary_operators_nest() {
        let expression = parse_single_expression("-!x");

        let ExpressionKind::Unary { operator, operand } = expression.kind else {
            panic!("expected unary expression");
        };
        assert_eq!(operator, UnaryOperatorKind::Negate);
        assert!(matches!(
            operand.kind,
            ExpressionKind::Unary {
                operator: UnaryOperatorKind::BitwiseNot,
                ..
            }
        ));
    }

    #[test]
    fn test_if_with_else_blocks() {
        let program = parse("If x < 1 Print \"a\" Else Print \"b\" End");

        let StatementKind::If(if_statement) = &program.statements[0].kind else {
            panic!("expected if statement");
        };
        assert_eq!(if_statement.then_body.len(), 1);
        assert_eq!(if_statement.else_body.len(), 1);
    }

    #[test]
    fn test_if_without_else() {
        let program = parse("If x Print \"a\" End");

        let StatementKind::If(if_statement) = &program.statements[0].kind else {
            panic!("expected if statement");
        };
        assert_eq!(if_statement.then_body.len(), 1);
        assert!(if_statement.else_body.is_empty());
    }

    #[test]
    fn test_for_statement_fields() {
        let program = parse("For i = 1..10 Print \"x\" End");

        let StatementKind::For(for_statement) = &program.statements[0].kind else {
            panic!("expected for statement");
        };
        assert_eq!(for_statement.variable.name, "i");
        assert!(matches!(
            for_statement.start.kind,
            ExpressionKind::IntegerLiteral(1)
        ));
        assert!(matches!(
            for_statement.end.kind,
            ExpressionKind::IntegerLiteral(10)
        ));
        assert_eq!(for_statement.body.len(), 1);
    }

    #[test]
    fn test_match_patterns() {
        let program = parse(
            "Match x \
             Case 1: Print \"one\" \
             Case 2..5: Print \"few\" \
             Case <0: Print \"negative\" \
             Case >100: Print \"many\" \
             End",
        );

        let StatementKind::Match(match_statement) = &program.statements[0].kind else {
            panic!("expected match statement");
        };
        assert_eq!(match_statement.cases.len(), 4);

        assert!(matches!(
            match_statement.cases[0].pattern.kind,
            PatternKind::Equals(_)
        ));
        assert!(matches!(
            match_statement.cases[1].pattern.kind,
            PatternKind::Range(_, _)
        ));
        assert!(matches!(
            match_statement.cases[2].pattern.kind,
            PatternKind::LessThan(_)
        ));
        assert!(matches!(
            match_statement.cases[3].pattern.kind,
            PatternKind::GreaterThan(_)
        ));
    }

    #[test]
    fn test_func_decl_parameters_and_body() {
        let program = parse("Func add(a, b) Return a + b End");

        let StatementKind::FuncDecl(func) = &program.statements[0].kind else {
            panic!("expected function declaration");
        };
        assert_eq!(func.name.name, "add");
        assert_eq!(
            func.parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(func.body.len(), 1);
        assert!(matches!(func.body[0].kind, StatementKind::Return(_)));
    }

    #[test]
    fn test_class_decl_with_base() {
        let program = parse("Class Dog : Animal End");

        let StatementKind::ClassDecl(class) = &program.statements[0].kind else {
            panic!("expected class declaration");
        };
        assert_eq!(class.name.name, "Dog");
        assert_eq!(class.base.as_ref().map(|b| b.name.as_str()), Some("Animal"));
        assert!(class.body.is_empty());
    }

    #[test]
    fn test_call_arguments() {
        let expression = parse_single_expression("add(2, 3 * 4)");

        let ExpressionKind::Call { callee, arguments } = expression.kind else {
            panic!("expected call expression");
        };
        assert_eq!(callee.name, "add");
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn test_input_expression() {
        let program = parse("Let x = Input()");

        let StatementKind::VarDecl(decl) = &program.statements[0].kind else {
            panic!("expected variable declaration");
        };
        assert!(matches!(
            decl.initializer.as_ref().map(|e| &e.kind),
            Some(ExpressionKind::Input)
        ));
    }

    #[test]
    fn test_var_decl_without_initializer() {
        let program = parse("Let x");

        let StatementKind::VarDecl(decl) = &program.statements[0].kind else {
            panic!("expected variable declaration");
        };
        assert_eq!(decl.name.name, "x");
        assert!(decl.initializer.is_none());
    }

    #[test]
    fn test_string_literal_strips_quotes() {
        let expression = parse_single_expression("\"hello\"");

        assert!(
            matches!(expression.kind, ExpressionKind::StringLiteral(s) if s == "hello")
        );
    }
}
