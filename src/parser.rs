use crate::error::{ParseError, Throw};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// Parses the tokens into a list of statements.
///
/// - Program     -> Declaration* EOF ;
/// - Block       -> "{" Declaration* "}" ;
/// - Declaration -> ClassDecl | FunDecl | VarDecl | Statement ;
/// - ClassDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" Function* "}" ;
/// - FunDecl     -> "fun" Function ;
/// - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | WhileStmt | Block ;
/// - ExprStmt    -> Expression ";" ;
/// - ForStmt     -> "for" "(" ( VarDecl | ExprStmt | ";" ) Expression? ";" Expression? ")" Statement ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt   -> "print" Expression ";" ;
/// - ReturnStmt  -> "return" Expression? ";" ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - Expression  -> Assignment ;
/// - Assignment  -> ( Call "." )? IDENTIFIER "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "and" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "!" | "-" ) Unary | Call ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Primary     -> NUMBER | STRING | "false" | "true" | "nil" | "this" | "(" Expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    /// Parses the tokens and returns the resulting statements.
    /// A declaration that fails to parse is reported, skipped over and left
    /// out of the list; the error flag keeps the rest of the pipeline from
    /// running such a program.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the previous token without consuming it.
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Returns if the parser has reached the end of the tokens.
    fn is_at_end(&self) -> bool {
        self.peek().r#type == Type::EOF
    }

    /// Returns if the next token is of the given type.
    fn check(&self, r#type: Type) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().r#type == r#type
    }

    /// Consumes the next token and returns it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Consumes the next token if it is any of the given types.
    fn matches(&mut self, types: &[Type]) -> bool {
        if types.iter().any(|&r#type| self.check(r#type)) {
            self.advance();
            return true;
        }

        false
    }

    /// Consumes the next token if it is of the given type.
    /// Otherwise reports a parse error at the offending token.
    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    /// Parses a declaration.
    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if self.matches(&[Type::Class]) {
            self.class_declaration()
        } else if self.matches(&[Type::Fun]) {
            self.function("function")
        } else if self.matches(&[Type::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.throw();
                self.synchronize();
                None
            }
        }
    }

    /// Parses a class declaration.
    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect class name.")?.clone();

        let superclass = if self.matches(&[Type::Less]) {
            let name = self.consume(Type::Identifier, "Expect superclass name.")?.clone();
            Some(Expr::Variable(VariableData { id: ExprId::new(), name }))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expect '{' before class body.")?;

        let mut methods: Vec<Stmt> = vec![];
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Type::RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    /// Parses a variable declaration.
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expect variable name.")?.clone();

        let initializer = if self.matches(&[Type::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    /// Parses a function or method declaration.
    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, &format!("Expect {kind} name."))?.clone();

        self.consume(Type::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    // Reported, but parsing carries on.
                    ParseError {
                        token: self.peek().clone(),
                        message: "Cannot have more than 255 parameters.".to_string(),
                    }.throw();
                }

                params.push(self.consume(Type::Identifier, "Expect parameter name.")?.clone());

                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        self.consume(Type::RightParen, "Expect ')' after parameters.")?;

        self.consume(Type::LeftBrace, &format!("Expect '{{' before {kind} body."))?;

        let body = self.block()?;

        Ok(Stmt::Function(FunctionData { name, params, body }))
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[Type::For]) {
            return self.for_statement();
        }

        if self.matches(&[Type::If]) {
            return self.if_statement();
        }

        if self.matches(&[Type::Print]) {
            return self.print_statement();
        }

        if self.matches(&[Type::Return]) {
            return self.return_statement();
        }

        if self.matches(&[Type::While]) {
            return self.while_statement();
        }

        if self.matches(&[Type::LeftBrace]) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Parses a for statement.
    /// There is no for statement node; the loop is desugared into a while
    /// statement wrapped in blocks carrying the initializer and increment.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[Type::Semicolon]) {
            None
        } else if self.matches(&[Type::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = match !self.check(Type::Semicolon) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::Semicolon, "Expect ';' after loop condition.")?;

        let increment = match !self.check(Type::RightParen) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        // Execute the increment after the body.
        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![
                    body,
                    Stmt::Expression(ExpressionData { expr: increment }),
                ],
            });
        }

        // Wrap the body into a while loop.
        // If there is no condition, use true.
        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        // Add the initializer before the loop if there is one.
        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    /// Parses an if statement.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[Type::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    /// Parses a print statement.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after value.")?;

        Ok(Stmt::Print(PrintData { expr }))
    }

    /// Parses a return statement.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = match self.check(Type::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };

        self.consume(Type::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Type::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expect ')' after condition.")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            condition,
            body: Box::new(body),
        }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(Type::Semicolon, "Expect ';' after expression.")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "Expect '}' after block.")?;

        Ok(statements)
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses an assignment expression.
    /// The left side is parsed as an ordinary expression first and rewritten
    /// into an assignment target once the `=` shows up.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[Type::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => Ok(Expr::Assign(AssignData {
                    id: ExprId::new(),
                    name: data.name,
                    value: Box::new(value),
                })),
                Expr::Get(data) => Ok(Expr::Set(SetData {
                    object: data.object,
                    name: data.name,
                    value: Box::new(value),
                })),
                other => {
                    // Reported, but not worth unwinding over; the target is
                    // returned unchanged so parsing continues from a sane spot.
                    ParseError {
                        token: equals,
                        message: "Invalid assignment target.".to_string(),
                    }.throw();

                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[Type::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an and expression.
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[Type::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an equality expression.
    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.matches(&[Type::BangEqual, Type::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a comparison expression.
    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.matches(&[Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a term expression.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.matches(&[Type::Minus, Type::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a factor expression.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.matches(&[Type::Slash, Type::Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a unary expression.
    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::Bang, Type::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                expr: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses the arguments of a call expression.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    // Reported, but parsing carries on.
                    ParseError {
                        token: self.peek().clone(),
                        message: "Cannot have more than 255 arguments.".to_string(),
                    }.throw();
                }

                arguments.push(self.expression()?);

                if !self.matches(&[Type::Comma]) {
                    break;
                }
            }
        }

        let paren = self.consume(Type::RightParen, "Expect ')' after arguments.")?.clone();

        Ok(Expr::Call(CallData {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    /// Parses a call expression.
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.matches(&[Type::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.matches(&[Type::Dot]) {
                let name = self.consume(Type::Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[Type::False]) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if self.matches(&[Type::True]) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if self.matches(&[Type::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if self.matches(&[Type::Number, Type::String]) {
            let literal = self.previous().literal.clone()
                .expect("number or string token to have a literal value");
            return Ok(Expr::Literal(literal));
        }

        if self.matches(&[Type::Super]) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Type::Identifier, "Expect superclass method name.")?.clone();

            return Ok(Expr::Super(SuperData { id: ExprId::new(), keyword, method }));
        }

        if self.matches(&[Type::This]) {
            return Ok(Expr::This(ThisData { id: ExprId::new(), keyword: self.previous().clone() }));
        }

        if self.matches(&[Type::Identifier]) {
            return Ok(Expr::Variable(VariableData {
                id: ExprId::new(),
                name: self.previous().clone(),
            }));
        }

        if self.matches(&[Type::LeftParen]) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expect ')' after expression.")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: "Expect expression.".to_string(),
        })
    }

    /// Tries to recover from a parse error by discarding tokens until a
    /// likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class
                | Type::Fun
                | Type::Var
                | Type::For
                | Type::If
                | Type::While
                | Type::Print
                | Type::Return => return,
                _ => self.advance(),
            };
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scanner::Scanner;

    fn parse(source: &str) -> Vec<Stmt> {
        Parser::new(Scanner::new(source).scan_tokens()).parse()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let statements = parse("1 + 2 * 3;");

        let Stmt::Expression(data) = &statements[0] else { panic!("expected expression statement") };
        let Expr::Binary(add) = &data.expr else { panic!("expected binary expression") };

        assert_eq!(add.operator.r#type, Type::Plus);
        assert!(matches!(*add.right, Expr::Binary(ref mul) if mul.operator.r#type == Type::Star));
    }

    #[test]
    fn for_desugars_into_while() {
        let statements = parse("for (var i = 0; i < 3; i = i + 1) print i;");

        // { var i = 0; while (i < 3) { print i; i = i + 1; } }
        let Stmt::Block(outer) = &statements[0] else { panic!("expected block") };
        assert!(matches!(outer.statements[0], Stmt::Var(_)));

        let Stmt::While(data) = &outer.statements[1] else { panic!("expected while") };
        let Stmt::Block(body) = &*data.body else { panic!("expected body block") };
        assert!(matches!(body.statements[0], Stmt::Print(_)));
        assert!(matches!(body.statements[1], Stmt::Expression(_)));
    }

    #[test]
    fn for_without_condition_loops_on_true() {
        let statements = parse("for (;;) print 1;");

        let Stmt::While(data) = &statements[0] else { panic!("expected while") };
        assert_eq!(data.condition, Expr::Literal(Literal::Bool(true)));
    }

    #[test]
    fn assignment_rewrites_variable_into_assign() {
        let statements = parse("a = 1;");

        let Stmt::Expression(data) = &statements[0] else { panic!("expected expression statement") };
        assert!(matches!(data.expr, Expr::Assign(_)));
    }

    #[test]
    fn property_assignment_rewrites_get_into_set() {
        let statements = parse("a.b = 1;");

        let Stmt::Expression(data) = &statements[0] else { panic!("expected expression statement") };
        assert!(matches!(data.expr, Expr::Set(_)));
    }

    #[test]
    fn failed_declaration_is_left_out() {
        let statements = parse("var = 1;\nprint 2;");

        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Stmt::Print(_)));
    }
}
