use std::rc::Rc;

use crate::error::{Error, ParseError, ParseErrors};
use crate::expr::*;
use crate::literal::Literal;
use crate::scanner::Scanner;
use crate::stmt::*;
use crate::token::{Token, Type};

type ParseResult<T> = Result<T, ParseError>;

/// Consumes the next token and returns true if it is any of the given types.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Parses the tokens and returns the resulting program.
///
/// - Program      -> Declaration* EOF ;
/// - Declaration  -> ClassDecl | FunDecl | VarDecl | Statement ;
/// - ClassDecl    -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" Function* "}" ;
/// - FunDecl      -> "fun" ( Function | FunctionExpr ) ;
/// - VarDecl      -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Function     -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters   -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement    -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | WhileStmt | Block ;
/// - ExprStmt     -> Expression ";" ;
/// - ForStmt      -> "for" "(" ( VarDecl | ExprStmt | ";" ) Expression? ";" Expression? ")" Statement ;
/// - IfStmt       -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt    -> "print" Expression ( "," Expression )* ";" ;
/// - ReturnStmt   -> "return" Expression? ";" ;
/// - WhileStmt    -> "while" "(" Expression ")" Statement ;
/// - Expression   -> FunctionExpr | Lambda | Assignment ;
/// - FunctionExpr -> "fun" "(" Parameters? ")" Block ;
/// - Lambda       -> "\" Parameters? "->" Expression ;
/// - Assignment   -> ( Call "." )? IDENTIFIER "=" Assignment | Ternary ;
/// - Ternary      -> LogicOr ( "?" LogicOr ":" Ternary )* ;
/// - LogicOr      -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd     -> Equality ( "and" Equality )* ;
/// - Equality     -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison   -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term         -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor       -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary        -> ( "!" | "-" ) Unary | Call ;
/// - Arguments    -> Expression ( "," Expression )* ;
/// - Call         -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Primary      -> NUMBER | STRING | "false" | "true" | "nil" | "this" | "(" Expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
    next_id: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            errors: vec![],
            next_id: 0,
        }
    }

    /// Parses the tokens and returns the resulting program. Parsing
    /// recovers at statement boundaries and reports every error at once.
    pub fn parse(&mut self) -> Result<Vec<Stmt>, ParseErrors> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        if self.errors.is_empty() {
            Ok(statements)
        } else {
            Err(ParseErrors(std::mem::take(&mut self.errors)))
        }
    }

    /// Scans and parses a complete program.
    pub fn parse_code(source: &str) -> Result<Vec<Stmt>, Error> {
        let tokens = Scanner::new(source).scan_tokens()?;
        Ok(Parser::new(tokens).parse()?)
    }

    /// Scans and parses a single expression by wrapping it in a trivial
    /// statement.
    pub fn parse_expression(source: &str) -> Result<Expr, Error> {
        let program = Parser::parse_code(&format!("{source};"))?;

        match program.into_iter().next() {
            Some(Stmt::Expression(data)) => Ok(data.expr),
            _ => Err(ParseErrors(vec![ParseError {
                token: Token::from(""),
                message: String::from("Failed parsing expression"),
            }]).into()),
        }
    }

    /// Hands out the identity for a variable-referencing expression node.
    fn new_id(&mut self) -> ExprId {
        let id = ExprId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Returns the next token without consuming it.
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Returns the previous token without consuming it.
    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Returns if the parser has reached the end of the file.
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

    /// Consumes the next token if it is of the given type.
    fn consume(&mut self, r#type: Type, message: &str) -> ParseResult<&Token> {
        if self.check(r#type) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    /// Parses a declaration. A failed statement is reported and dropped
    /// after synchronizing to the next statement boundary.
    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Type::Class) {
            self.class_declaration()
        } else if matches!(self, Type::Fun) {
            if self.check(Type::Identifier) {
                self.function("function")
            } else {
                // An anonymous function in statement position.
                self.function_statement()
            }
        } else if matches!(self, Type::Var) {
            self.variable_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    /// Parses a class declaration.
    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expected class name")?.clone();

        let superclass = if matches!(self, Type::Less) {
            let name = self.consume(Type::Identifier, "Expected superclass name")?.clone();
            Some(Expr::Variable(VariableData { id: self.new_id(), name }))
        } else {
            None
        };

        self.consume(Type::LeftBrace, "Expected '{' before class body")?;

        let mut methods = vec![];
        while !self.check(Type::RightBrace) && !self.is_at_end() {
            methods.push(self.function_data("method")?);
        }

        self.consume(Type::RightBrace, "Expected '}' after class body")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    /// Parses a variable declaration.
    fn variable_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Type::Identifier, "Expected variable name")?.clone();

        let initializer = if matches!(self, Type::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(Type::Semicolon, "Expected semicolon after variable declaration")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Type::For) {
            return self.for_statement();
        }

        if matches!(self, Type::If) {
            return self.if_statement();
        }

        if matches!(self, Type::Print) {
            return self.print_statement();
        }

        if matches!(self, Type::Return) {
            return self.return_statement();
        }

        if matches!(self, Type::While) {
            return self.while_statement();
        }

        if matches!(self, Type::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Parses a for statement, desugaring it into a while loop.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.previous().clone();
        self.consume(Type::LeftParen, "Expected '(' after 'for'")?;

        let initializer = if matches!(self, Type::Semicolon) {
            None
        } else if matches!(self, Type::Var) {
            Some(self.variable_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = match !self.check(Type::Semicolon) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::Semicolon, "Expected semicolon after loop condition")?;

        let increment = match !self.check(Type::RightParen) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Type::RightParen, "Expected ')' after loop clauses")?;

        let body = self.statement()?;

        // Execute the increment after the body.
        let mut while_body = vec![body];
        if let Some(increment) = increment {
            while_body.push(Stmt::Expression(ExpressionData { expr: increment }));
        }

        // Wrap the body into a while loop. A missing condition means true.
        let condition = condition.unwrap_or(Expr::Literal(Literal::Bool(true)));
        let body = Stmt::While(WhileData {
            token,
            condition,
            body: Box::new(Stmt::Block(BlockData { statements: while_body })),
        });

        // Add the initializer before the loop if there is one.
        let statements = match initializer {
            Some(initializer) => vec![initializer, body],
            None => vec![body],
        };

        Ok(Stmt::Block(BlockData { statements }))
    }

    /// Parses an if statement. An else branch binds to the nearest if.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.previous().clone();
        self.consume(Type::LeftParen, "Expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expected ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if matches!(self, Type::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfData { token, condition, then_branch, else_branch }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.previous().clone();
        self.consume(Type::LeftParen, "Expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(Type::RightParen, "Expected ')' after condition")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            token,
            condition,
            body: Box::new(body),
        }))
    }

    /// Parses a print statement with one or more comma separated values.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let mut exprs = vec![self.expression()?];

        while matches!(self, Type::Comma) {
            exprs.push(self.expression()?);
        }

        self.consume(Type::Semicolon, "Expected semicolon after statement")?;

        Ok(Stmt::Print(PrintData { exprs }))
    }

    /// Parses a return statement.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = match self.check(Type::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };

        self.consume(Type::Semicolon, "Expected semicolon after return value")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        self.consume(Type::Semicolon, "Expected semicolon after statement")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses an anonymous function in statement position. The `fun`
    /// keyword has already been consumed.
    fn function_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.function_expression()?;

        self.consume(Type::Semicolon, "Expected semicolon after statement")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses a named function declaration.
    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        Ok(Stmt::Function(self.function_data(kind)?))
    }

    /// Parses the name, parameters and body of a function or a method.
    fn function_data(&mut self, kind: &str) -> ParseResult<FunctionData> {
        let name = self.consume(Type::Identifier, &format!("Expected {kind} name"))?.clone();

        self.consume(Type::LeftParen, &format!("Expected '(' after {kind} name"))?;
        let params = self.parameters()?;
        self.consume(Type::RightParen, "Expected ')' after parameters")?;

        self.consume(Type::LeftBrace, &format!("Expected '{{' before {kind} body"))?;
        let body = self.block()?;

        Ok(FunctionData {
            name,
            params: Rc::new(params),
            body: Rc::new(body),
        })
    }

    /// Parses a comma separated parameter list. An overlong list is
    /// reported but parsing carries on.
    fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = vec![];

        if !self.check(Type::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().clone(),
                        message: String::from("Maximum parameter count of 255 exceeded"),
                    });
                }

                params.push(self.consume(Type::Identifier, "Expected parameter name")?.clone());

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        Ok(params)
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Type::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Type::RightBrace, "Expected '}' after block")?;

        Ok(statements)
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::Fun) {
            return self.function_expression();
        }

        if matches!(self, Type::Backslash) {
            return self.lambda();
        }

        self.assignment()
    }

    /// Parses an anonymous function expression. The `fun` keyword has
    /// already been consumed.
    fn function_expression(&mut self) -> ParseResult<Expr> {
        self.consume(Type::LeftParen, "Expected '(' after 'fun'")?;
        let params = self.parameters()?;
        self.consume(Type::RightParen, "Expected ')' after parameters")?;

        self.consume(Type::LeftBrace, "Expected '{' before function body")?;
        let body = self.block()?;

        Ok(Expr::Function(FunctionExprData {
            params: Rc::new(params),
            body: Rc::new(body),
        }))
    }

    /// Parses a lambda expression. The backslash has already been consumed.
    fn lambda(&mut self) -> ParseResult<Expr> {
        let mut params = vec![];

        if self.check(Type::Identifier) {
            loop {
                if params.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().clone(),
                        message: String::from("Maximum parameter count of 255 exceeded"),
                    });
                }

                params.push(self.consume(Type::Identifier, "Expected parameter name")?.clone());

                if !matches!(self, Type::Comma) {
                    break;
                }
            }
        }

        let arrow = self.consume(Type::Arrow, "Expected '->' after lambda parameters")?.clone();
        let expression = self.expression()?;

        Ok(Expr::Lambda(LambdaData {
            params: Rc::new(params),
            arrow,
            expression: Rc::new(expression),
        }))
    }

    /// Parses an assignment expression.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.ternary()?;

        if matches!(self, Type::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(data) => Ok(Expr::Assign(AssignData {
                    id: self.new_id(),
                    name: data.name,
                    value: Box::new(value),
                })),
                Expr::Get(data) => Ok(Expr::Set(SetData {
                    object: data.object,
                    name: data.name,
                    value: Box::new(value),
                })),
                _ => Err(ParseError {
                    token: equals,
                    message: String::from("Invalid assignment target"),
                }),
            };
        }

        Ok(expr)
    }

    /// Parses a ternary expression. Chained alternatives associate at the
    /// head while the else branch nests to the right.
    fn ternary(&mut self) -> ParseResult<Expr> {
        let mut expr = self.or()?;

        while matches!(self, Type::QuestionMark) {
            let operator = self.previous().clone();
            let then_branch = self.or()?;
            self.consume(Type::Colon, "Expected colon in ternary")?;
            let else_branch = self.ternary()?;

            expr = Expr::Ternary(TernaryData {
                test: Box::new(expr),
                operator,
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Type::Or) {
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

        while matches!(self, Type::And) {
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

        while matches!(self, Type::BangEqual, Type::EqualEqual) {
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

        while matches!(self, Type::Greater, Type::GreaterEqual, Type::Less, Type::LessEqual) {
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

        while matches!(self, Type::Minus, Type::Plus) {
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

        while matches!(self, Type::Slash, Type::Star) {
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
        if matches!(self, Type::Bang, Type::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                expr: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses the arguments of a call. An overlong list is reported but
    /// parsing carries on.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Type::RightParen) {
            arguments.push(self.expression()?);

            while matches!(self, Type::Comma) {
                if arguments.len() >= 255 {
                    self.errors.push(ParseError {
                        token: self.peek().clone(),
                        message: String::from("Maximum argument count of 255 exceeded"),
                    });
                }

                arguments.push(self.expression()?);
            }
        }

        let paren = self.consume(Type::RightParen, "Expected closing parenthesis")?.clone();

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
            if matches!(self, Type::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Type::Dot) {
                let name = self.consume(Type::Identifier, "Expected property name after '.'")?.clone();
                expr = Expr::Get(GetData { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Type::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if matches!(self, Type::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if matches!(self, Type::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if matches!(self, Type::Number, Type::String) {
            return Ok(Expr::Literal(self.previous().literal.clone()
                .expect("number or string to have a literal value")));
        }

        if matches!(self, Type::Super) {
            let keyword = self.previous().clone();
            self.consume(Type::Dot, "Expected '.' after 'super'")?;
            let method = self.consume(Type::Identifier, "Expected superclass method name")?.clone();

            return Ok(Expr::Super(SuperData { id: self.new_id(), keyword, method }));
        }

        if matches!(self, Type::This) {
            let keyword = self.previous().clone();
            return Ok(Expr::This(ThisData { id: self.new_id(), keyword }));
        }

        if matches!(self, Type::Identifier) {
            let name = self.previous().clone();
            return Ok(Expr::Variable(VariableData { id: self.new_id(), name }));
        }

        if matches!(self, Type::LeftParen) {
            let expr = self.expression()?;
            self.consume(Type::RightParen, "Expected ')' after expression")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: String::from("Expected expression"),
        })
    }

    /// Tries to recover from a parse error by discarding tokens until the
    /// next statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().r#type == Type::Semicolon {
                return;
            }

            match self.peek().r#type {
                Type::Class => return,
                Type::Fun => return,
                Type::Var => return,
                Type::For => return,
                Type::If => return,
                Type::While => return,
                Type::Print => return,
                Type::Return => return,
                _ => self.advance(),
            };
        }
    }
}
