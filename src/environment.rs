use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A single scope frame. Frames chain through `parent`; closures keep the
/// frame that was current at their declaration site alive through the
/// shared reference. A `None` cell marks a declared but uninitialized
/// variable.
#[derive(Debug, Clone)]
pub struct Environment {
    pub parent: Option<Rc<RefCell<Environment>>>,
    variables: HashMap<String, Option<Object>>,
}

impl Environment {
    pub fn new(parent: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            parent,
            variables: HashMap::new(),
        }
    }

    /// Allocates a new frame with this one as the parent.
    pub fn child(parent: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::new(Some(Rc::clone(parent)))))
    }

    /// Inserts a variable into this frame. Redeclaring a name within the
    /// same frame is an error.
    pub fn define(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            return Err(RuntimeError::redeclaring_variable(name));
        }

        self.variables.insert(name.lexeme.clone(), Some(value));
        Ok(())
    }

    /// Inserts a variable without a value, as `var x;` does. A later get
    /// fails until an assignment initializes the cell.
    pub fn define_uninitialized(&mut self, name: &Token) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            return Err(RuntimeError::redeclaring_variable(name));
        }

        self.variables.insert(name.lexeme.clone(), None);
        Ok(())
    }

    /// Assigns to the nearest enclosing frame holding the name.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), Some(value));
            return Ok(());
        }

        if let Some(parent) = &self.parent {
            return parent.borrow_mut().assign(name, value);
        }

        Err(RuntimeError::undefined_variable(name))
    }

    /// Reads from the nearest enclosing frame holding the name.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.variables.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(RuntimeError::uninitialized_variable(name)),
            None => match &self.parent {
                Some(parent) => parent.borrow().get(name),
                None => Err(RuntimeError::undefined_variable(name)),
            },
        }
    }

    /// Walks exactly `distance` parents up the chain. The resolver
    /// guarantees the frame exists.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let parent = self.parent.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", 1));
        let mut environment = parent;

        for i in 1..distance {
            let parent = environment.borrow().parent.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i));
            environment = parent;
        }

        environment
    }

    /// Reads from the frame exactly `distance` parents away, with no
    /// fallback past it.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        if distance > 0 {
            return self.ancestor(distance).borrow().get_here(name);
        }

        self.get_here(name)
    }

    /// Assigns into the frame exactly `distance` parents away, with no
    /// fallback past it.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if distance > 0 {
            return self.ancestor(distance).borrow_mut().assign_here(name, value);
        }

        self.assign_here(name, value)
    }

    fn get_here(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.variables.get(&name.lexeme) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(RuntimeError::uninitialized_variable(name)),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }

    fn assign_here(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if !self.variables.contains_key(&name.lexeme) {
            return Err(RuntimeError::undefined_variable(name));
        }

        self.variables.insert(name.lexeme.clone(), Some(value));
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;

    fn value(n: i64) -> Object {
        Object::from(Literal::Integer(n))
    }

    #[test]
    fn stores_variables() {
        let mut env = Environment::default();

        env.define(&Token::from("foo"), value(1)).unwrap();

        assert_eq!(env.get(&Token::from("foo")).unwrap(), value(1));
    }

    #[test]
    fn errors_when_redefining_variable() {
        let mut env = Environment::default();

        env.define(&Token::from("foo"), value(1)).unwrap();

        let error = env.define(&Token::from("foo"), value(2)).unwrap_err();
        assert_eq!(error.message, "Variable [foo] is already defined");
    }

    #[test]
    fn errors_when_accessing_undefined_variable() {
        let env = Environment::default();

        let error = env.get(&Token::from("foo")).unwrap_err();
        assert_eq!(error.message, "Variable [foo] is not defined");
    }

    #[test]
    fn errors_when_accessing_uninitialized_variable() {
        let mut env = Environment::default();

        env.define_uninitialized(&Token::from("foo")).unwrap();

        let error = env.get(&Token::from("foo")).unwrap_err();
        assert_eq!(error.message, "Variable [foo] is not initialized");
    }

    #[test]
    fn assignment_initializes_cell() {
        let mut env = Environment::default();

        env.define_uninitialized(&Token::from("foo")).unwrap();
        env.assign(&Token::from("foo"), value(5)).unwrap();

        assert_eq!(env.get(&Token::from("foo")).unwrap(), value(5));
    }

    #[test]
    fn allows_reassigning_variable() {
        let mut env = Environment::default();

        env.define(&Token::from("foo"), value(1)).unwrap();
        env.assign(&Token::from("foo"), value(5)).unwrap();

        assert_eq!(env.get(&Token::from("foo")).unwrap(), value(5));
    }

    #[test]
    fn errors_when_reassigning_non_existing_variable() {
        let mut env = Environment::default();

        let error = env.assign(&Token::from("foo"), value(5)).unwrap_err();
        assert_eq!(error.message, "Variable [foo] is not defined");
    }

    #[test]
    fn allows_shadowing_by_child() {
        let env = Rc::new(RefCell::new(Environment::default()));
        env.borrow_mut().define(&Token::from("foo"), value(5)).unwrap();

        let child = Environment::child(&env);
        child.borrow_mut().define(&Token::from("foo"), value(6)).unwrap();

        assert_eq!(env.borrow().get(&Token::from("foo")).unwrap(), value(5));
        assert_eq!(child.borrow().get(&Token::from("foo")).unwrap(), value(6));
    }

    #[test]
    fn gets_value_from_parent_if_not_present() {
        let env = Rc::new(RefCell::new(Environment::default()));
        env.borrow_mut().define(&Token::from("foo"), value(5)).unwrap();

        let child = Environment::child(&env);

        assert_eq!(child.borrow().get(&Token::from("foo")).unwrap(), value(5));
    }

    #[test]
    fn propagates_assignment_to_parent() {
        let env = Rc::new(RefCell::new(Environment::default()));
        env.borrow_mut().define(&Token::from("foo"), value(5)).unwrap();

        let child = Environment::child(&env);
        child.borrow_mut().assign(&Token::from("foo"), value(10)).unwrap();

        assert_eq!(env.borrow().get(&Token::from("foo")).unwrap(), value(10));
        assert_eq!(child.borrow().get(&Token::from("foo")).unwrap(), value(10));
    }

    #[test]
    fn indexed_access_skips_nearer_frames() {
        let root = Rc::new(RefCell::new(Environment::default()));
        root.borrow_mut().define(&Token::from("foo"), value(1)).unwrap();

        let child = Environment::child(&root);
        child.borrow_mut().define(&Token::from("foo"), value(2)).unwrap();

        assert_eq!(child.borrow().get_at(0, &Token::from("foo")).unwrap(), value(2));
        assert_eq!(child.borrow().get_at(1, &Token::from("foo")).unwrap(), value(1));

        child.borrow_mut().assign_at(1, &Token::from("foo"), value(3)).unwrap();
        assert_eq!(root.borrow().get(&Token::from("foo")).unwrap(), value(3));
    }

    #[test]
    fn indexed_access_does_not_fall_back() {
        let root = Rc::new(RefCell::new(Environment::default()));
        root.borrow_mut().define(&Token::from("foo"), value(1)).unwrap();

        let child = Environment::child(&root);

        let error = child.borrow().get_at(0, &Token::from("foo")).unwrap_err();
        assert_eq!(error.message, "Variable [foo] is not defined");
    }
}
