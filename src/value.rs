use std::rc::Rc;

use crate::env::EnvRef;
use crate::error::Error;
use crate::interpreter::Trampoline;
use crate::node::Node;
use crate::position::Position;
use crate::vm::Vm;

/// A native function: receives fully evaluated arguments and the position of
/// the call site.
pub type BuiltinFn =
    for<'k> fn(&Vm<'k>, &[Value<'k>], Position) -> Result<Value<'k>, Error>;

/// A special form: receives the whole unevaluated node list (keyword at
/// index 0), the current environment, and a trampoline it may use to request
/// a tail rewrite.
pub type SpecialFn = for<'n, 'k> fn(
    &Vm<'k>,
    &'n [Node<'n>],
    &EnvRef<'k>,
    &mut Trampoline<'n, 'k>,
) -> Result<Value<'k>, Error>;

/// A user function: parameter names, a form copied into the VM's stable
/// arena, and the environment captured at creation time.
pub struct Closure<'k> {
    pub form: &'k Node<'k>,
    pub params: Vec<&'k str>,
    pub env: EnvRef<'k>,
}

/// A runtime value. Cloning is the ownership copy of the interpreter: lists
/// and strings duplicate their storage, closures share form and captured
/// environment.
#[derive(Clone)]
pub struct Value<'k> {
    pub position: Position,
    pub kind: ValueKind<'k>,
}

#[derive(Clone)]
pub enum ValueKind<'k> {
    Nil,
    Boolean(bool),
    Number(f64),
    Str(String),
    List(Vec<Value<'k>>),
    Builtin(BuiltinFn),
    Special(SpecialFn),
    Closure(Rc<Closure<'k>>),
}

impl<'k> Value<'k> {
    pub fn new(kind: ValueKind<'k>, position: Position) -> Self {
        Value { position, kind }
    }

    pub fn nil(position: Position) -> Self {
        Self::new(ValueKind::Nil, position)
    }

    pub fn boolean(value: bool, position: Position) -> Self {
        Self::new(ValueKind::Boolean(value), position)
    }

    pub fn number(value: f64, position: Position) -> Self {
        Self::new(ValueKind::Number(value), position)
    }

    pub fn string(value: String, position: Position) -> Self {
        Self::new(ValueKind::Str(value), position)
    }

    pub fn list(items: Vec<Value<'k>>, position: Position) -> Self {
        Self::new(ValueKind::List(items), position)
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ValueKind::Nil => "nil",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Number(_) => "number",
            ValueKind::Str(_) => "string",
            ValueKind::List(_) => "list",
            ValueKind::Builtin(_) => "builtin",
            ValueKind::Special(_) => "special",
            ValueKind::Closure(_) => "function",
        }
    }

    /// Equality as exposed by `=`: scalar payloads by value, strings by
    /// bytes, natives by function identity; lists and closures are never
    /// equal.
    pub fn equals(&self, other: &Value<'k>) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Nil, ValueKind::Nil) => true,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
            (ValueKind::Number(a), ValueKind::Number(b)) => a == b,
            (ValueKind::Str(a), ValueKind::Str(b)) => a == b,
            (ValueKind::Builtin(a), ValueKind::Builtin(b)) => {
                *a as usize == *b as usize
            }
            (ValueKind::Special(a), ValueKind::Special(b)) => {
                *a as usize == *b as usize
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at {}", self.kind, self.position)
    }
}

// Closures reference their captured environment, which may in turn hold the
// closure itself; Debug stays shallow to avoid walking that cycle.
impl std::fmt::Debug for ValueKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Nil => write!(f, "Nil"),
            ValueKind::Boolean(value) => write!(f, "Boolean({})", value),
            ValueKind::Number(value) => write!(f, "Number({})", value),
            ValueKind::Str(value) => write!(f, "Str({:?})", value),
            ValueKind::List(items) => f.debug_list().entries(items.iter()).finish(),
            ValueKind::Builtin(_) => write!(f, "Builtin"),
            ValueKind::Special(_) => write!(f, "Special"),
            ValueKind::Closure(closure) => write!(f, "Closure({:?})", closure.params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> Position {
        Position::default()
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(Value::number(1.5, at()).equals(&Value::number(1.5, at())));
        assert!(!Value::number(1.5, at()).equals(&Value::number(2.5, at())));
    }

    #[test]
    fn booleans_compare_by_value() {
        assert!(Value::boolean(true, at()).equals(&Value::boolean(true, at())));
        assert!(!Value::boolean(true, at()).equals(&Value::boolean(false, at())));
    }

    #[test]
    fn strings_compare_by_bytes() {
        assert!(Value::string("abc".into(), at()).equals(&Value::string("abc".into(), at())));
        assert!(!Value::string("abc".into(), at()).equals(&Value::string("abd".into(), at())));
    }

    #[test]
    fn nil_is_always_equal_to_nil() {
        assert!(Value::nil(at()).equals(&Value::nil(at())));
    }

    #[test]
    fn mismatched_tags_are_never_equal() {
        assert!(!Value::number(1.0, at()).equals(&Value::string("1".into(), at())));
        assert!(!Value::nil(at()).equals(&Value::boolean(false, at())));
    }

    #[test]
    fn lists_are_never_equal() {
        let a = Value::list(vec![Value::number(1.0, at())], at());
        let b = Value::list(vec![Value::number(1.0, at())], at());
        assert!(!a.equals(&b));
    }

    #[test]
    fn clone_duplicates_list_storage() {
        let original = Value::list(vec![Value::string("x".into(), at())], at());
        let copy = original.clone();
        match (original.kind, copy.kind) {
            (ValueKind::List(a), ValueKind::List(b)) => {
                assert_eq!(a.len(), b.len());
                match (&a[0].kind, &b[0].kind) {
                    (ValueKind::Str(sa), ValueKind::Str(sb)) => {
                        assert_eq!(sa, sb);
                        assert_ne!(sa.as_ptr(), sb.as_ptr());
                    }
                    _ => panic!("expected strings"),
                }
            }
            _ => panic!("expected lists"),
        }
    }

    #[test]
    fn type_names_match_surface_language() {
        assert_eq!(Value::nil(at()).type_name(), "nil");
        assert_eq!(Value::number(0.0, at()).type_name(), "number");
        assert_eq!(Value::boolean(true, at()).type_name(), "boolean");
        assert_eq!(Value::string(String::new(), at()).type_name(), "string");
        assert_eq!(Value::list(vec![], at()).type_name(), "list");
    }
}
