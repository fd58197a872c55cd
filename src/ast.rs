use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::Token;

/// Returns a string representation of the expression in parentheses.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Renders the AST as parenthesized text for debug dumps and for parser
/// tests that want to assert tree shape without spelling out nodes.
pub struct ASTPrinter;

impl ASTPrinter {
    /// Prints the expression using visitor pattern.
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    /// Prints a whole program, statements joined by a space.
    pub fn print_program(&mut self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<String>>()
            .join(" ")
    }

    fn params(params: &[Token]) -> String {
        params
            .iter()
            .map(|param| param.lexeme.clone())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        parenthesize!(self, &unary.operator.lexeme, unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        parenthesize!(self, &binary.operator.lexeme, binary.left, binary.right)
    }

    fn visit_ternary_expr(&mut self, ternary: &TernaryData) -> String {
        parenthesize!(self, "?", ternary.test, ternary.then_branch, ternary.else_branch)
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        parenthesize!(self, &logical.operator.lexeme, logical.left, logical.right)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        for arg in &call.arguments {
            string += &arg.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, get: &GetData) -> String {
        format!("(get {} {})", get.object.accept(self), get.name.lexeme)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> String {
        format!(
            "(set {} {} {})",
            set.object.accept(self),
            set.name.lexeme,
            set.value.accept(self),
        )
    }

    fn visit_function_expr(&mut self, function: &FunctionExprData) -> String {
        let mut string = String::new();
        string += "(fun (";
        string += &Self::params(&function.params);
        string += ") { ";
        string += &function.body.iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";

        string
    }

    fn visit_lambda_expr(&mut self, lambda: &LambdaData) -> String {
        format!(
            "(\\ ({}) {})",
            Self::params(&lambda.params),
            lambda.expression.accept(self),
        )
    }

    fn visit_this_expr(&mut self, _this: &ThisData) -> String {
        String::from("this")
    }

    fn visit_super_expr(&mut self, super_expr: &SuperData) -> String {
        format!("(super {})", super_expr.method.lexeme)
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) -> String {
        parenthesize!(self, "expr", stmt.expr)
    }

    fn visit_print_stmt(&mut self, stmt: &PrintData) -> String {
        let mut string = String::new();
        string += "(print";
        for expr in &stmt.exprs {
            string += " ";
            string += &expr.accept(self);
        }
        string += ")";

        string
    }

    fn visit_var_stmt(&mut self, stmt: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &stmt.name.lexeme;
        if let Some(initializer) = &stmt.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";

        string
    }

    fn visit_function_stmt(&mut self, stmt: &FunctionData) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += &stmt.name.lexeme;
        string += "(";
        string += &Self::params(&stmt.params);
        string += ") { ";
        string += &stmt.body.iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";

        string
    }

    fn visit_class_stmt(&mut self, stmt: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &stmt.name.lexeme;
        if let Some(Expr::Variable(superclass)) = &stmt.superclass {
            string += " < ";
            string += &superclass.name.lexeme;
        }
        for method in &stmt.methods {
            string += " ";
            string += &self.visit_function_stmt(method);
        }
        string += ")";

        string
    }

    fn visit_if_stmt(&mut self, stmt: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &stmt.condition.accept(self);
        string += " ";
        string += &stmt.then_branch.accept(self);
        if let Some(else_branch) = &stmt.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, stmt: &WhileData) -> String {
        parenthesize!(self, "while", stmt.condition, stmt.body)
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnData) -> String {
        match &stmt.value {
            Some(value) => parenthesize!(self, "return", value),
            None => String::from("(return)"),
        }
    }

    fn visit_block_stmt(&mut self, stmt: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &stmt.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";

        string
    }
}
