use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{RuntimeError, Throw, Unwind};
use crate::expr::{Expr, ExprId, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

type EvalResult = Result<Object, Unwind>;
type ExecResult = Result<(), Unwind>;

/// Builds the unwinding variant of a runtime error at the given token.
fn runtime_error(token: &Token, message: impl Into<String>) -> Unwind {
    Unwind::Error(RuntimeError {
        token: token.clone(),
        message: message.into(),
    })
}

/// Evaluates a program by walking its syntax tree.
///
/// The interpreter owns the global environment and the resolution map, and
/// both outlive a single run so that the prompt can keep definitions across
/// lines. `print` writes to the injected sink, which lets tests capture the
/// output of a whole program in memory.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    out: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Executes the statements in order. A runtime error aborts the run and
    /// is reported here, at the outermost statement it unwound out of.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => (),
                Err(Unwind::Error(error)) => {
                    error.throw();
                    return;
                },
                Err(Unwind::Return(_)) => unreachable!("top-level return is rejected by the resolver"),
            }
        }
    }

    /// Records the scope distance of a resolvable expression.
    /// Called by the resolver; references without an entry are globals.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes the statements with the given environment as the current
    /// one. The previous environment is restored on every exit path, whether
    /// the block completed, returned or failed.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    /// Reads a variable through the resolution map: resolved references go
    /// straight to the frame at the recorded distance, everything else is a
    /// global.
    fn look_up_variable(&self, id: ExprId, name: &Token) -> EvalResult {
        match self.locals.get(&id) {
            Some(distance) => self.environment.borrow().get_at(*distance, &name.lexeme)
                .ok_or_else(|| runtime_error(name, format!("Undefined variable '{}'.", name.lexeme))),
            None => self.globals.borrow().get(name).map_err(Unwind::from),
        }
    }
}

impl<'a> ExprVisitor<EvalResult> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Literal(literal) = expr else { unreachable!() };

        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        self.evaluate(&grouping.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Unary(unary) = expr else { unreachable!() };

        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => (-right)
                .ok_or_else(|| runtime_error(&unary.operator, "Operand must be a number.")),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.r#type {
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),

            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                let (Some(left), Some(right)) = (left.as_number(), right.as_number()) else {
                    return Err(runtime_error(operator, "Operands must be numbers."));
                };

                Ok(Object::from(match operator.r#type {
                    Type::Greater => left > right,
                    Type::GreaterEqual => left >= right,
                    Type::Less => left < right,
                    Type::LessEqual => left <= right,
                    _ => unreachable!(),
                }))
            },

            Type::Plus => (left + right)
                .ok_or_else(|| runtime_error(operator, "Operands must be two numbers or two strings.")),
            Type::Minus => (left - right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers.")),
            Type::Star => (left * right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers.")),
            Type::Slash => (left / right)
                .ok_or_else(|| runtime_error(operator, "Operands must be numbers.")),

            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        // Short-circuiting hands back the operand itself, not a boolean.
        match logical.operator.r#type {
            Type::Or if left.is_truthy() => Ok(left),
            Type::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Variable(variable) = expr else { unreachable!() };

        self.look_up_variable(variable.id, &variable.name)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.id) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(native) => native,
            Object::Class(class) => class,
            _ => return Err(runtime_error(&call.paren, "Can only call functions and classes.")),
        };

        if arguments.len() != callable.arity() {
            return Err(runtime_error(
                &call.paren,
                format!("Expected {} arguments but got {}.", callable.arity(), arguments.len()),
            ));
        }

        callable.call(self, arguments)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        if let Object::Instance(instance) = &object {
            let result = instance.borrow().get(&get.name, &object);
            result.map_err(Unwind::from)
        } else {
            Err(runtime_error(&get.name, "Only instances have properties."))
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(runtime_error(&set.name, "Only instances have fields."));
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::This(this) = expr else { unreachable!() };

        self.look_up_variable(this.id, &this.keyword)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        // The class body arranged the frames so that `this` is always one
        // hop nearer than `super`.
        let distance = *self.locals.get(&super_expr.id).expect("'super' to be resolved");

        let superclass = self.environment.borrow().get_at(distance, "super")
            .expect("'super' to be defined at the resolved distance");
        let Object::Class(superclass) = superclass else { unreachable!() };

        let object = self.environment.borrow().get_at(distance - 1, "this")
            .expect("'this' to be defined inside a method");

        let method = superclass.find_method(&super_expr.method.lexeme).ok_or_else(|| {
            runtime_error(
                &super_expr.method,
                format!("Undefined property '{}'.", super_expr.method.lexeme),
            )
        })?;

        Ok(Object::from(method.bind(object)))
    }
}

impl<'a> StmtVisitor<ExecResult> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Expression(data) = stmt else { unreachable!() };

        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Print(data) = stmt else { unreachable!() };

        let value = self.evaluate(&data.expr)?;
        let _ = writeln!(self.out, "{value}");

        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Var(data) = stmt else { unreachable!() };

        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Block(data) = stmt else { unreachable!() };

        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&data.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.is_truthy() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Function(data) = stmt else { unreachable!() };

        // The closure is the environment at the declaration, not at the
        // call; this is what the resolver's distances are relative to.
        let function = Function::new(data, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Return(data) = stmt else { unreachable!() };

        let value = match &data.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        Err(Unwind::Return(value))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                let Object::Class(class) = value else {
                    let Expr::Variable(variable) = expr else { unreachable!() };
                    return Err(runtime_error(&variable.name, "Superclass must be a class."));
                };
                Some(class)
            },
            None => None,
        };

        // The name is bound to nil first so methods can reference the class
        // being declared; the finished class is assigned over it below.
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        // Methods of a subclass close over an extra frame where `super` is
        // bound to the superclass.
        let enclosing = match &superclass {
            Some(class) => {
                let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
                environment.define("super", Object::Class(Rc::clone(class)));
                Some(mem::replace(&mut self.environment, Rc::new(RefCell::new(environment))))
            },
            None => None,
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            let is_initializer = function.name.lexeme == "init";
            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment), is_initializer),
            );
        }

        let class = Rc::new(Class::new(data.name.lexeme.clone(), superclass, methods));

        if let Some(enclosing) = enclosing {
            self.environment = enclosing;
        }

        self.environment.borrow_mut().assign(&data.name, Object::Class(class))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn token(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, lexeme.to_string(), None, 1)
    }

    fn binary(left: Literal, operator: Token, right: Literal) -> Expr {
        Expr::Binary(crate::expr::BinaryData {
            left: Box::new(Expr::Literal(left)),
            operator,
            right: Box::new(Expr::Literal(right)),
        })
    }

    fn eval(expr: &Expr) -> EvalResult {
        let mut out = Vec::new();
        let mut interpreter = Interpreter::new(&mut out);
        interpreter.evaluate(expr)
    }

    /// Runs a whole program and returns everything it printed.
    fn run(source: &str) -> String {
        let mut out = Vec::new();
        let mut interpreter = Interpreter::new(&mut out);

        let statements = Parser::new(Scanner::new(source).scan_tokens()).parse();
        Resolver::new(&mut interpreter).resolve(&statements);
        interpreter.interpret(&statements);

        drop(interpreter);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn evaluates_arithmetic() {
        let expr = binary(Literal::Number(6.0), token(Type::Minus, "-"), Literal::Number(2.0));
        assert_eq!(eval(&expr).unwrap(), Object::from(4.0));

        let expr = binary(Literal::Number(6.0), token(Type::Slash, "/"), Literal::Number(2.0));
        assert_eq!(eval(&expr).unwrap(), Object::from(3.0));
    }

    #[test]
    fn concatenates_strings() {
        let expr = binary(Literal::from("foo"), token(Type::Plus, "+"), Literal::from("bar"));
        assert_eq!(eval(&expr).unwrap(), Object::from("foobar"));
    }

    #[test]
    fn addition_rejects_mixed_operands() {
        let expr = binary(Literal::from("foo"), token(Type::Plus, "+"), Literal::Number(1.0));

        let Err(Unwind::Error(error)) = eval(&expr) else { panic!("expected a runtime error") };
        assert_eq!(error.message, "Operands must be two numbers or two strings.");
    }

    #[test]
    fn comparison_rejects_non_numbers() {
        let expr = binary(Literal::from("a"), token(Type::Less, "<"), Literal::from("b"));

        let Err(Unwind::Error(error)) = eval(&expr) else { panic!("expected a runtime error") };
        assert_eq!(error.message, "Operands must be numbers.");
    }

    #[test]
    fn equality_across_types_is_false() {
        let expr = binary(Literal::Number(0.0), token(Type::EqualEqual, "=="), Literal::from("0"));
        assert_eq!(eval(&expr).unwrap(), Object::from(false));

        let expr = binary(Literal::Nil, token(Type::EqualEqual, "=="), Literal::Nil);
        assert_eq!(eval(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn unary_minus_requires_a_number() {
        let expr = Expr::Unary(crate::expr::UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(Expr::Literal(Literal::from("muffin"))),
        });

        let Err(Unwind::Error(error)) = eval(&expr) else { panic!("expected a runtime error") };
        assert_eq!(error.message, "Operand must be a number.");
    }

    #[test]
    fn prints_with_a_newline() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
    }

    #[test]
    fn logical_operators_return_the_operand() {
        assert_eq!(run("print \"hi\" or 2;"), "hi\n");
        assert_eq!(run("print nil or \"yes\";"), "yes\n");
        assert_eq!(run("print nil and 2;"), "nil\n");
    }

    #[test]
    fn block_scopes_shadow() {
        assert_eq!(run("var a = 1; { var a = 2; print a; } print a;"), "2\n1\n");
    }

    #[test]
    fn closures_capture_their_definition_scope() {
        let source = r#"
var a = "global";
{
  fun showA() { print a; }
  showA();
  var a = "block";
  showA();
}
"#;
        assert_eq!(run(source), "global\nglobal\n");
    }

    #[test]
    fn initializer_returns_the_instance() {
        let source = r#"
class Foo { init() { return; } }
print Foo().init();
"#;
        assert_eq!(run(source), "Foo instance\n");
    }
}
