use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::expr::*;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::printer::Printer;
use crate::resolver::Bindings;
use crate::stmt::*;
use crate::token::{Token, Type};

type ExprResult = Result<Object, Unwind>;
type StmtResult = Result<(), Unwind>;

/// A recursive AST walker. Carries the chain of environments and consults
/// the resolver's bindings table for every variable access, so that a
/// reference always lands on the frame that was innermost at its source
/// location, no matter what was defined afterwards.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    bindings: Bindings,
    printer: &'a mut dyn Printer,
}

impl<'a> Interpreter<'a> {
    pub fn new(bindings: Bindings, printer: &'a mut dyn Printer) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.clone();
            globals
                .borrow_mut()
                .define(&name, Object::from(native))
                .expect("freshly created globals to accept native functions");
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            bindings,
            printer,
        }
    }

    /// Executes the program. Runtime errors halt execution where they are
    /// raised; the return signal never escapes here because the resolver
    /// rejects top-level returns.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {},
                Err(Unwind::Error(error)) => return Err(error),
                Err(Unwind::Return(_)) => break,
            }
        }

        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> StmtResult {
        stmt.accept(self)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> ExprResult {
        expr.accept(self)
    }

    /// Runs the statements with the given frame as the current one,
    /// restoring the previous frame on every exit path, unwinding included.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> StmtResult {
        let previous = mem::replace(&mut self.environment, environment);
        let result = statements.iter().try_for_each(|statement| self.execute(statement));
        self.environment = previous;

        result
    }

    /// Evaluates an expression with the given frame as the current one.
    /// Used for lambda bodies.
    pub fn evaluate_in(
        &mut self,
        expr: &Expr,
        environment: Rc<RefCell<Environment>>,
    ) -> ExprResult {
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.evaluate(expr);
        self.environment = previous;

        result
    }

    /// Reads a variable through the bindings table, falling back to the
    /// globals frame for unresolved names.
    fn lookup_variable(&self, id: ExprId, name: &Token) -> Result<Object, RuntimeError> {
        match self.bindings.get(&id) {
            Some(depth) => self.environment.borrow().get_at(*depth, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Requires the value to be a bool and hands it back unwrapped.
    fn check_bool(token: &Token, value: &Object) -> Result<bool, RuntimeError> {
        match value {
            Object::Literal(Literal::Bool(b)) => Ok(*b),
            other => Err(RuntimeError::invalid_operand(token, &["bool"], other.type_str())),
        }
    }

    /// Requires both operands to share a type and that type to be one of
    /// the expected ones.
    fn check_operands(
        token: &Token,
        left: &Object,
        right: &Object,
        expected: &[&str],
    ) -> Result<(), RuntimeError> {
        if left.type_str() != right.type_str() {
            return Err(RuntimeError::operand_mismatch(token, left.type_str(), right.type_str()));
        }

        if !expected.contains(&left.type_str()) {
            return Err(RuntimeError::invalid_operands(token, expected, left.type_str()));
        }

        Ok(())
    }

    /// Arithmetic on two numbers. Integer pairs stay integers; a float on
    /// either side promotes the operation to floats.
    fn arithmetic(operator: &Token, left: &Literal, right: &Literal) -> Literal {
        match (left, right) {
            (Literal::Integer(l), Literal::Integer(r)) => match operator.r#type {
                Type::Plus => Literal::Integer(l + r),
                Type::Minus => Literal::Integer(l - r),
                Type::Star => Literal::Integer(l * r),
                _ => Literal::Nil,
            },
            _ => match operator.r#type {
                Type::Plus => Literal::Float(left.as_f64() + right.as_f64()),
                Type::Minus => Literal::Float(left.as_f64() - right.as_f64()),
                Type::Star => Literal::Float(left.as_f64() * right.as_f64()),
                _ => Literal::Nil,
            },
        }
    }
}

impl<'a> ExprVisitor<ExprResult> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> ExprResult {
        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> ExprResult {
        self.evaluate(&grouping.expr)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> ExprResult {
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => match right {
                Object::Literal(Literal::Integer(n)) => Ok(Object::from(-n)),
                Object::Literal(Literal::Float(n)) => Ok(Object::from(-n)),
                other => Err(RuntimeError::invalid_operand(
                    &unary.operator,
                    &["number"],
                    other.type_str(),
                ).into()),
            },
            Type::Bang => {
                let value = Self::check_bool(&unary.operator, &right)?;
                Ok(Object::from(!value))
            },
            _ => Err(RuntimeError {
                token: unary.operator.clone(),
                message: format!("Unsupported unary operator ({})", unary.operator.lexeme),
            }.into()),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> ExprResult {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.r#type {
            // Equality never raises, whatever the operand types.
            Type::EqualEqual => return Ok(Object::from(left == right)),
            Type::BangEqual => return Ok(Object::from(left != right)),
            _ => {},
        }

        match operator.r#type {
            Type::Plus | Type::Minus => {
                Self::check_operands(operator, &left, &right, &["number", "string"])?;

                match (left, right) {
                    (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                        if operator.r#type == Type::Plus {
                            Ok(Object::from(l + &r))
                        } else {
                            // String subtraction removes every occurrence of
                            // the right operand.
                            Ok(Object::from(l.replace(&r, "")))
                        }
                    },
                    (Object::Literal(l), Object::Literal(r)) => {
                        Ok(Object::from(Self::arithmetic(operator, &l, &r)))
                    },
                    _ => unreachable!("operand check admits only numbers and strings"),
                }
            },
            Type::Star => {
                Self::check_operands(operator, &left, &right, &["number"])?;

                match (left, right) {
                    (Object::Literal(l), Object::Literal(r)) => {
                        Ok(Object::from(Self::arithmetic(operator, &l, &r)))
                    },
                    _ => unreachable!("operand check admits only numbers"),
                }
            },
            Type::Slash => {
                Self::check_operands(operator, &left, &right, &["number"])?;

                match (left, right) {
                    // Division always happens in floats, so dividing by
                    // zero yields inf rather than a crash.
                    (Object::Literal(l), Object::Literal(r)) => {
                        Ok(Object::from(l.as_f64() / r.as_f64()))
                    },
                    _ => unreachable!("operand check admits only numbers"),
                }
            },
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                Self::check_operands(operator, &left, &right, &["number"])?;

                let (l, r) = match (&left, &right) {
                    (Object::Literal(l), Object::Literal(r)) => (l.as_f64(), r.as_f64()),
                    _ => unreachable!("operand check admits only numbers"),
                };

                let result = match operator.r#type {
                    Type::Greater => l > r,
                    Type::GreaterEqual => l >= r,
                    Type::Less => l < r,
                    _ => l <= r,
                };

                Ok(Object::from(result))
            },
            _ => Err(RuntimeError {
                token: operator.clone(),
                message: format!("Unsupported binary operator ({})", operator.lexeme),
            }.into()),
        }
    }

    fn visit_ternary_expr(&mut self, ternary: &TernaryData) -> ExprResult {
        let test = self.evaluate(&ternary.test)?;

        if Self::check_bool(&ternary.operator, &test)? {
            self.evaluate(&ternary.then_branch)
        } else {
            self.evaluate(&ternary.else_branch)
        }
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> ExprResult {
        let left = self.evaluate(&logical.left)?;
        let left = Self::check_bool(&logical.operator, &left)?;

        // Short circuit before the right operand is ever evaluated.
        match logical.operator.r#type {
            Type::Or if left => return Ok(Object::from(true)),
            Type::And if !left => return Ok(Object::from(false)),
            _ => {},
        }

        let right = self.evaluate(&logical.right)?;
        let right = Self::check_bool(&logical.operator, &right)?;

        Ok(Object::from(right))
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> ExprResult {
        Ok(self.lookup_variable(variable.id, &variable.name)?)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> ExprResult {
        let value = self.evaluate(&assign.value)?;

        match self.bindings.get(&assign.id) {
            Some(depth) => {
                self.environment
                    .borrow_mut()
                    .assign_at(*depth, &assign.name, value.clone())?;
            },
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> ExprResult {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(native) => native,
            Object::Class(class) => class,
            _ => {
                return Err(RuntimeError {
                    token: call.paren.clone(),
                    message: String::from("Can only call functions or classes"),
                }.into());
            },
        };

        if arguments.len() != callable.arity() {
            return Err(RuntimeError {
                token: call.paren.clone(),
                message: format!(
                    "Expected {} arguments but got {}",
                    callable.arity(),
                    arguments.len(),
                ),
            }.into());
        }

        Ok(callable.call(self, arguments)?)
    }

    fn visit_get_expr(&mut self, get: &GetData) -> ExprResult {
        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&get.name, &object)?),
            _ => Err(RuntimeError {
                token: get.name.clone(),
                message: String::from("Only instances have properties"),
            }.into()),
        }
    }

    fn visit_set_expr(&mut self, set: &SetData) -> ExprResult {
        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError {
                token: set.name.clone(),
                message: String::from("Only instances have fields"),
            }.into());
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_function_expr(&mut self, function: &FunctionExprData) -> ExprResult {
        Ok(Object::from(Function::anonymous(function, Rc::clone(&self.environment))))
    }

    fn visit_lambda_expr(&mut self, lambda: &LambdaData) -> ExprResult {
        Ok(Object::from(Function::lambda(lambda, Rc::clone(&self.environment))))
    }

    fn visit_this_expr(&mut self, this: &ThisData) -> ExprResult {
        Ok(self.lookup_variable(this.id, &this.keyword)?)
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) -> ExprResult {
        let superclass = self.lookup_variable(super_expr.id, &super_expr.keyword)?;

        let Object::Class(superclass) = superclass else {
            return Err(RuntimeError {
                token: super_expr.keyword.clone(),
                message: String::from("Superclass must be a class"),
            }.into());
        };

        // One frame closer than `super` lives the current `this`.
        let depth = self.bindings.get(&super_expr.id).copied().unwrap_or(1);
        let this = self.environment.borrow().get_at(depth - 1, &Token::from("this"))?;

        let method = self.borrow_method(&superclass, &super_expr.method)?;

        Ok(Object::from(method.bind(this)?))
    }
}

impl<'a> Interpreter<'a> {
    fn borrow_method(
        &self,
        class: &Rc<RefCell<Class>>,
        name: &Token,
    ) -> Result<Function, RuntimeError> {
        class.borrow().find_method(&name.lexeme).ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined method [{}]", name.lexeme),
        })
    }
}

impl<'a> StmtVisitor<StmtResult> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) -> StmtResult {
        self.evaluate(&stmt.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &PrintData) -> StmtResult {
        let mut values = Vec::with_capacity(stmt.exprs.len());
        for expr in &stmt.exprs {
            values.push(self.evaluate(expr)?.to_string());
        }

        self.printer.print(&values);

        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &VarData) -> StmtResult {
        match &stmt.initializer {
            Some(initializer) => {
                let value = self.evaluate(initializer)?;
                self.environment.borrow_mut().define(&stmt.name, value)?;
            },
            None => {
                self.environment.borrow_mut().define_uninitialized(&stmt.name)?;
            },
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &FunctionData) -> StmtResult {
        let function = Function::new(stmt, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&stmt.name, Object::from(function))?;

        Ok(())
    }

    fn visit_class_stmt(&mut self, stmt: &ClassData) -> StmtResult {
        let superclass = match &stmt.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Object::Class(class) => Some(class),
                    _ => {
                        let token = match expr {
                            Expr::Variable(variable) => variable.name.clone(),
                            _ => stmt.name.clone(),
                        };
                        return Err(RuntimeError {
                            token,
                            message: String::from("Superclass must be a class"),
                        }.into());
                    },
                }
            },
            None => None,
        };

        // Methods of a subclass close over a frame holding `super`, layered
        // between the declaration site and the eventual `this` frame.
        let mut closure = Rc::clone(&self.environment);
        if let Some(superclass) = &superclass {
            closure = Environment::child(&closure);
            closure
                .borrow_mut()
                .define(&Token::from("super"), Object::Class(Rc::clone(superclass)))?;
        }

        let mut methods = std::collections::HashMap::new();
        for method in &stmt.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(method, Rc::clone(&closure), is_initializer);
            methods.insert(method.name.lexeme.clone(), function);
        }

        let class = Class::new(stmt.name.lexeme.clone(), superclass, methods);
        self.environment.borrow_mut().define(&stmt.name, Object::from(class))?;

        Ok(())
    }

    fn visit_if_stmt(&mut self, stmt: &IfData) -> StmtResult {
        let test = self.evaluate(&stmt.condition)?;

        if Self::check_bool(&stmt.token, &test)? {
            self.execute(&stmt.then_branch)?;
        } else if let Some(else_branch) = &stmt.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn visit_while_stmt(&mut self, stmt: &WhileData) -> StmtResult {
        loop {
            // The test is re-evaluated and re-checked after every iteration.
            let test = self.evaluate(&stmt.condition)?;
            if !Self::check_bool(&stmt.token, &test)? {
                break;
            }

            self.execute(&stmt.body)?;
        }

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnData) -> StmtResult {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };

        Err(Unwind::Return(value))
    }

    fn visit_block_stmt(&mut self, stmt: &BlockData) -> StmtResult {
        let environment = Environment::child(&self.environment);
        self.execute_block(&stmt.statements, environment)
    }
}
