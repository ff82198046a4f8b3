use std::cell::RefCell;
use std::fmt::{self, Debug, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;

/// Represents a user-defined function.
///
/// The closure is the environment that was current when the declaration was
/// executed; calls chain their frame onto it, which is what makes lexical
/// scoping work. Binding a method swaps the closure for a one-entry frame
/// holding `this`.
#[derive(Clone)]
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: &FunctionData, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function {
            declaration: Rc::new(declaration.clone()),
            closure,
            is_initializer,
        }
    }

    /// Returns a fresh function whose closure additionally defines `this`.
    /// Every property access that finds a method binds anew; the bound
    /// methods of an instance are not identical to each other.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// Returns the instance an initializer was called on.
    fn this(&self) -> Object {
        self.closure
            .borrow()
            .get_at(0, "this")
            .expect("initializer closure to bind 'this'")
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let result = interpreter.execute_block(
            &self.declaration.body,
            Rc::new(RefCell::new(environment)),
        );

        match result {
            // An initializer always hands back its instance, even when the
            // body bailed out early with a bare `return;`.
            Ok(()) if self.is_initializer => Ok(self.this()),
            Ok(()) => Ok(Object::from(Literal::Nil)),
            Err(Unwind::Return(_)) if self.is_initializer => Ok(self.this()),
            Err(Unwind::Return(value)) => Ok(value),
            Err(error) => Err(error),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

// Identity, not structure: two functions are the same value only when they
// came from the same declaration with the same captured environment.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

// Manual impl so that debug output never recurses into the closure, which
// can reach this very function again through a captured variable.
impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// Represents a function provided by the interpreter itself.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl NativeFunction {
    /// Returns the native functions defined in the global environment.
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock".to_owned(),
                arity: 0,
                function: |_, _| {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .expect("system clock to be after the epoch");
                    Ok(Object::from(now.as_secs_f64()))
                },
            },
        ]
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        (self.function)(interpreter, arguments).map_err(Unwind::from)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}
