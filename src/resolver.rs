use std::collections::{BTreeMap, HashMap};
use std::mem;

use crate::error::{CompileErrors, ResolveError};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::Token;

/// The resolver's output: scope depth per variable-referencing node.
/// Globals are deliberately absent; the interpreter falls back to the
/// globals frame for anything not in the table.
pub type Bindings = BTreeMap<ExprId, usize>;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// A static pass over the AST that binds each variable reference to the
/// lexical scope depth where it will be found at runtime, and enforces the
/// rules the parser cannot.
pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    bindings: Bindings,
    errors: Vec<ResolveError>,
    current_function: FunctionType,
    current_class: ClassType,
}

/// Resolves a program into its bindings table.
pub fn resolve(statements: &[Stmt]) -> Result<Bindings, CompileErrors> {
    Resolver::new().run(statements)
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: vec![],
            bindings: Bindings::new(),
            errors: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn run(mut self, statements: &[Stmt]) -> Result<Bindings, CompileErrors> {
        self.resolve_all(statements);

        if self.errors.is_empty() {
            Ok(self.bindings)
        } else {
            Err(CompileErrors(self.errors))
        }
    }

    fn resolve_all(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn error(&mut self, token: &Token, message: String) {
        self.errors.push(ResolveError { token: token.clone(), message });
    }

    /// Marks a name as declared but not yet initialized. The global scope
    /// is exempt; runtime redeclaration checks cover it.
    fn declare(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        let already_declared = self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(&name.lexeme));

        if already_declared {
            let message = format!("Variable [{}] is already defined", name.lexeme);
            self.error(name, message);
        }

        self.scopes
            .last_mut()
            .expect("scope stack to be not empty")
            .insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        scope.insert(name.lexeme.clone(), true);
    }

    /// Records how many frames out the name lives, counting from the
    /// innermost scope. Names found in no scope are globals and stay out
    /// of the table.
    fn resolve_local(&mut self, id: ExprId, name: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.bindings.insert(id, depth);
                return;
            }
        }
    }

    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], r#type: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, r#type);

        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_all(body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn accessed_inside_own_initializer(&self, name: &Token) -> bool {
        match self.scopes.last() {
            Some(scope) => scope.get(&name.lexeme) == Some(&false),
            None => false,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprVisitor<()> for Resolver {
    fn visit_variable_expr(&mut self, variable: &VariableData) {
        if self.accessed_inside_own_initializer(&variable.name) {
            let message = format!(
                "Variable [{}] accessed inside its own initializer",
                variable.name.lexeme,
            );
            self.error(&variable.name, message);
        }

        self.resolve_local(variable.id, &variable.name.lexeme);
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) {
        self.resolve_expr(&assign.value);
        self.resolve_local(assign.id, &assign.name.lexeme);
    }

    fn visit_literal_expr(&mut self, _literal: &Literal) {}

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) {
        self.resolve_expr(&grouping.expr);
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) {
        self.resolve_expr(&unary.expr);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_ternary_expr(&mut self, ternary: &TernaryData) {
        self.resolve_expr(&ternary.test);
        self.resolve_expr(&ternary.then_branch);
        self.resolve_expr(&ternary.else_branch);
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) {
        self.resolve_expr(&logical.left);
        self.resolve_expr(&logical.right);
    }

    fn visit_call_expr(&mut self, call: &CallData) {
        self.resolve_expr(&call.callee);

        for argument in &call.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, get: &GetData) {
        self.resolve_expr(&get.object);
    }

    fn visit_set_expr(&mut self, set: &SetData) {
        self.resolve_expr(&set.value);
        self.resolve_expr(&set.object);
    }

    fn visit_function_expr(&mut self, function: &FunctionExprData) {
        self.resolve_function(&function.params, &function.body, FunctionType::Function);
    }

    fn visit_lambda_expr(&mut self, lambda: &LambdaData) {
        let enclosing_function = mem::replace(&mut self.current_function, FunctionType::Function);

        self.begin_scope();
        for param in lambda.params.iter() {
            self.declare(param);
            self.define(param);
        }
        self.resolve_expr(&lambda.expression);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn visit_this_expr(&mut self, this: &ThisData) {
        if self.current_class == ClassType::None {
            self.error(&this.keyword, String::from("Cannot use 'this' outside of a class"));
            return;
        }

        self.resolve_local(this.id, &this.keyword.lexeme);
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) {
        match self.current_class {
            ClassType::Subclass => (),
            ClassType::None => self.error(
                &super_expr.keyword,
                String::from("Cannot use 'super' outside of a class"),
            ),
            ClassType::Class => self.error(
                &super_expr.keyword,
                String::from("Cannot use 'super' in a class with no superclass"),
            ),
        }

        self.resolve_local(super_expr.id, &super_expr.keyword.lexeme);
    }
}

impl StmtVisitor<()> for Resolver {
    fn visit_block_stmt(&mut self, block: &BlockData) {
        self.begin_scope();
        self.resolve_all(&block.statements);
        self.end_scope();
    }

    fn visit_var_stmt(&mut self, var: &VarData) {
        self.declare(&var.name);
        if let Some(initializer) = &var.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&var.name);
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) {
        self.declare(&function.name);
        self.define(&function.name);

        self.resolve_function(&function.params, &function.body, FunctionType::Function);
    }

    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) {
        self.resolve_expr(&stmt.expr);
    }

    fn visit_if_stmt(&mut self, if_stmt: &IfData) {
        self.resolve_expr(&if_stmt.condition);
        self.resolve_stmt(&if_stmt.then_branch);
        if let Some(else_branch) = &if_stmt.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_print_stmt(&mut self, print: &PrintData) {
        for expr in &print.exprs {
            self.resolve_expr(expr);
        }
    }

    fn visit_return_stmt(&mut self, return_stmt: &ReturnData) {
        if self.current_function == FunctionType::None {
            self.error(
                &return_stmt.keyword,
                String::from("Cannot return from top-level code"),
            );
        }

        if let Some(value) = &return_stmt.value {
            // A bare return is how an initializer exits early; returning a
            // value from one is an error.
            if self.current_function == FunctionType::Initializer {
                self.error(
                    &return_stmt.keyword,
                    String::from("Cannot return a value from an initializer"),
                );
                return;
            }

            self.resolve_expr(value);
        }
    }

    fn visit_while_stmt(&mut self, while_stmt: &WhileData) {
        self.resolve_expr(&while_stmt.condition);
        self.resolve_stmt(&while_stmt.body);
    }

    fn visit_class_stmt(&mut self, class: &ClassData) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(&class.name);
        self.define(&class.name);

        if let Some(superclass) = &class.superclass {
            if let Expr::Variable(variable) = superclass {
                if class.name.lexeme == variable.name.lexeme {
                    self.error(
                        &variable.name,
                        String::from("A class cannot inherit from itself"),
                    );
                }
            }

            self.current_class = ClassType::Subclass;

            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope stack to be not empty")
                .insert(String::from("super"), true);
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope stack to be not empty")
            .insert(String::from("this"), true);

        for method in &class.methods {
            let declaration = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(&method.params, &method.body, declaration);
        }

        self.end_scope();

        if class.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }
}
