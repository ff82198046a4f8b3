use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::{RuntimeError, Unwind};
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// Represents a class declaration at runtime.
///
/// A class is immutable once built: its methods were collected while the
/// declaration executed, each closed over an environment where `super`
/// resolves if the class has a superclass.
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Function>) -> Self {
        Class { name, superclass, methods }
    }

    /// Looks up a method by name, walking up the superclass chain.
    /// A method defined on the class shadows an inherited one.
    pub fn find_method(&self, name: &str) -> Option<Function> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass.as_ref().and_then(|superclass| superclass.find_method(name))
    }
}

// Calling a class instantiates it. The callable lives on `Rc<Class>` rather
// than `Class` because the new instance needs a shared handle to its class.
impl Callable for Rc<Class> {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, Unwind> {
        let instance = Rc::new(RefCell::new(Instance::from(self)));

        if let Some(initializer) = self.find_method("init") {
            initializer.bind(Object::Instance(Rc::clone(&instance))).call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }

    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |initializer| initializer.arity())
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Represents an instance of a class.
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    /// Looks up a property on the instance. Fields shadow methods; a method
    /// comes back freshly bound to this instance.
    ///
    /// `instance` is the shared handle to this very instance, needed because
    /// the bound method must keep the instance alive through `this`.
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            Ok(field.clone())
        } else if let Some(method) = self.class.find_method(&name.lexeme) {
            Ok(Object::from(method.bind(instance.clone())))
        } else {
            Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined property '{}'.", name.lexeme),
            })
        }
    }

    /// Stores a field on the instance. Fields spring into being on first
    /// assignment; there is no declaration.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl From<&Rc<Class>> for Instance {
    fn from(class: &Rc<Class>) -> Self {
        Instance { class: Rc::clone(class), fields: HashMap::new() }
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}
