// ABOUTME: Lexically nested variable bindings

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain). Redefinition allowed.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up a name in this scope and parent scopes, innermost first.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }
        Err(RuntimeError::undefined_variable(name))
    }

    /// Assigns to the scope where the binding first appears, innermost first.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }
        if let Some(ref parent) = self.parent {
            return parent.assign(name, value);
        }
        Err(RuntimeError::undefined_variable(name))
    }
}
