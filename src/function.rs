use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::expr::{Expr, FunctionExprData, LambdaData};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{FunctionData, Stmt};
use crate::token::Token;

/// The body a function runs when called. A lambda body behaves like a
/// block whose only statement returns the expression.
#[derive(Debug, Clone)]
enum Body {
    Block(Rc<Vec<Stmt>>),
    Expression(Rc<Expr>),
}

/// A user-declared function, bound to the environment that was current
/// when its declaration was executed.
#[derive(Debug, Clone)]
pub struct Function {
    name: Option<Token>,
    params: Rc<Vec<Token>>,
    body: Body,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: &FunctionData, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function {
            name: Some(declaration.name.clone()),
            params: Rc::clone(&declaration.params),
            body: Body::Block(Rc::clone(&declaration.body)),
            closure,
            is_initializer,
        }
    }

    pub fn anonymous(declaration: &FunctionExprData, closure: Rc<RefCell<Environment>>) -> Self {
        Function {
            name: None,
            params: Rc::clone(&declaration.params),
            body: Body::Block(Rc::clone(&declaration.body)),
            closure,
            is_initializer: false,
        }
    }

    pub fn lambda(declaration: &LambdaData, closure: Rc<RefCell<Environment>>) -> Self {
        Function {
            name: None,
            params: Rc::clone(&declaration.params),
            body: Body::Expression(Rc::clone(&declaration.expression)),
            closure,
            is_initializer: false,
        }
    }

    pub fn name(&self) -> &str {
        match &self.name {
            Some(name) => &name.lexeme,
            None => "anonymous",
        }
    }

    /// Produces a copy of this function whose closure has `this` bound to
    /// the given instance. Property access returns methods through here.
    pub fn bind(&self, instance: Object) -> Result<Function, RuntimeError> {
        let environment = Environment::child(&self.closure);
        environment.borrow_mut().define(&Token::from("this"), instance)?;

        Ok(Function {
            closure: environment,
            ..self.clone()
        })
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Environment::child(&self.closure);

        for (param, argument) in self.params.iter().zip(arguments) {
            environment.borrow_mut().define(param, argument)?;
        }

        let completion = match &self.body {
            Body::Block(statements) => interpreter
                .execute_block(statements, environment)
                .map(|_| Object::from(Literal::Nil)),
            Body::Expression(expression) => interpreter.evaluate_in(expression, environment),
        };

        let value = match completion {
            Ok(value) => value,
            Err(Unwind::Return(value)) => value,
            Err(Unwind::Error(error)) => return Err(error),
        };

        // An initializer always hands back the instance under construction.
        if self.is_initializer {
            return self.closure.borrow().get_at(0, &Token::from("this"));
        }

        Ok(value)
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Functions compare by identity of their closure frame; two declarations
/// of the same text are still distinct values.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.closure, &other.closure) && self.name() == other.name()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fun {}>", self.name())
    }
}

/// A function implemented by the host rather than by a user declaration.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The natives every program starts with.
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::from("clock"),
                arity: 0,
                function: |_, _| {
                    let now = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_secs_f64();
                    Ok(Object::from(now))
                },
            },
            NativeFunction {
                name: Token::from("sleep"),
                arity: 1,
                function: |_, arguments| {
                    let seconds = match arguments.first() {
                        Some(Object::Literal(value)) if value.is_number() => value.as_f64(),
                        Some(other) => {
                            return Err(RuntimeError::invalid_operand(
                                &Token::from("sleep"),
                                &["number"],
                                other.type_str(),
                            ));
                        },
                        None => 0.0,
                    };

                    // Negative or non-finite durations sleep for nothing.
                    let duration = std::time::Duration::try_from_secs_f64(seconds)
                        .unwrap_or_default();
                    std::thread::sleep(duration);

                    Ok(Object::from(Literal::Nil))
                },
            },
        ]
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name.lexeme == other.name.lexeme
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fun {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fun {}>", self.name.lexeme)
    }
}
