use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::value::Value;

/// Environments are shared: closures keep their captured environment (and
/// through its parent link the scope that defined them) alive by reference
/// counting.
pub type EnvRef<'k> = Rc<RefCell<Environment<'k>>>;

/// A scope record: a string→value map plus an optional parent. Symbol lookup
/// walks the parent chain; the specials/builtins registries are consulted
/// first by the VM, not stored here.
pub struct Environment<'k> {
    values: HashMap<String, Value<'k>>,
    parent: Option<EnvRef<'k>>,
}

impl<'k> Environment<'k> {
    /// The global scope. `capacity` is the `environment_size` option.
    pub fn root(capacity: usize) -> EnvRef<'k> {
        Rc::new(RefCell::new(Environment {
            values: HashMap::with_capacity(capacity),
            parent: None,
        }))
    }

    pub fn child(parent: EnvRef<'k>) -> EnvRef<'k> {
        Rc::new(RefCell::new(Environment {
            values: HashMap::with_capacity(8),
            parent: Some(parent),
        }))
    }

    /// Inserts without any shadow check, replacing an existing binding.
    /// Shadow discipline lives in `Vm::register_symbol`.
    pub fn define(&mut self, name: &str, value: Value<'k>) -> Result<(), Error> {
        if name.is_empty() {
            return Err(Error::new(
                ErrorCode::MapInvalidKey,
                None,
                "Map key cannot be empty".to_string(),
            ));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Capture-walk insertion: the first registration of a name wins.
    pub fn capture(&mut self, name: &str, value: Value<'k>) {
        self.values.entry(name.to_string()).or_insert(value);
    }

    /// Resolves a name through the parent chain, returning an owned copy of
    /// the stored value.
    pub fn resolve(env: &EnvRef<'k>, name: &str) -> Option<Value<'k>> {
        let mut current = env.clone();
        loop {
            let next = {
                let borrowed = current.borrow();
                if let Some(value) = borrowed.values.get(name) {
                    return Some(value.clone());
                }
                borrowed.parent.clone()
            };
            current = next?;
        }
    }

    pub fn contains(env: &EnvRef<'k>, name: &str) -> bool {
        let mut current = env.clone();
        loop {
            let next = {
                let borrowed = current.borrow();
                if borrowed.values.contains_key(name) {
                    return true;
                }
                borrowed.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }
}
