//! The four special forms. Each receives the whole node list, keyword
//! included at index 0, and controls evaluation of its own operands.

use std::rc::Rc;

use crate::env::{EnvRef, Environment};
use crate::error::{Error, ErrorCode};
use crate::interpreter::{evaluate, Trampoline};
use crate::node::{Node, NodeKind};
use crate::token::NAMESPACE_DELIMITER;
use crate::value::{Closure, Value, ValueKind};
use crate::vm::Vm;

pub const DEFINE: &str = "def!";
pub const FUNCTION: &str = "fn";
pub const LET: &str = "let";
pub const COND: &str = "cond";

const DEFINE_EXAMPLE: &str = "(def! x (+ 1 2))";
const FUNCTION_EXAMPLE: &str = "(fn (a b) (+ a b))";
const LET_EXAMPLE: &str = "(let ((a 1) (b 2)) (+ a b))";
const COND_EXAMPLE: &str = "(cond ((<> x 0) (/ 10 x)) (+ x 10))";

/// `(def! <symbol> <form>)` — evaluates the form and binds it in the current
/// environment. Returns nil.
pub fn define<'n, 'k>(
    vm: &Vm<'k>,
    nodes: &'n [Node<'n>],
    env: &EnvRef<'k>,
    _trampoline: &mut Trampoline<'n, 'k>,
) -> Result<Value<'k>, Error> {
    let first = &nodes[0];
    if nodes.len() != 3 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            first.position,
            format!("{} requires a symbol and a form. {}", DEFINE, DEFINE_EXAMPLE),
        ));
    }

    let key = &nodes[1];
    let name = match key.kind {
        NodeKind::Symbol(name) => name,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeError,
                first.position,
                format!("{} requires a symbol and a form. {}", DEFINE, DEFINE_EXAMPLE),
            ));
        }
    };

    if name.contains(NAMESPACE_DELIMITER) {
        return Err(Error::at(
            ErrorCode::SyntaxUnexpectedToken,
            first.position,
            format!(
                "Unexpected namespace delimiter '{}' in custom symbol '{}'.",
                NAMESPACE_DELIMITER, name
            ),
        ));
    }

    let form = &nodes[2];
    let value = evaluate(vm, form, env)?;
    vm.register_symbol(env, name, value)
        .map_err(|error| error.with_position(form.position))?;

    Ok(Value::nil(first.position))
}

/// `(fn (<param>*) <form>)` — builds a closure. The form is copied into the
/// VM's stable arena; the captured environment snapshots every non-special,
/// non-builtin symbol the form references.
pub fn function<'n, 'k>(
    vm: &Vm<'k>,
    nodes: &'n [Node<'n>],
    env: &EnvRef<'k>,
    _trampoline: &mut Trampoline<'n, 'k>,
) -> Result<Value<'k>, Error> {
    let first = &nodes[0];
    if nodes.len() != 3 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            first.position,
            format!(
                "{} requires a binding list and a form. {}",
                FUNCTION, FUNCTION_EXAMPLE
            ),
        ));
    }

    let bindings_node = &nodes[1];
    let bindings = match bindings_node.kind {
        NodeKind::List(bindings) => bindings,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeError,
                bindings_node.position,
                format!(
                    "{} requires a binding list and a form. {}",
                    FUNCTION, FUNCTION_EXAMPLE
                ),
            ));
        }
    };

    let mut params: Vec<&'k str> = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let name = match binding.kind {
            NodeKind::Symbol(name) => name,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeError,
                    binding.position,
                    format!(
                        "{} requires a binding list of symbols. {}",
                        FUNCTION, FUNCTION_EXAMPLE
                    ),
                ));
            }
        };

        if vm.is_visible(env, name) || params.iter().any(|param| *param == name) {
            return Err(Error::at(
                ErrorCode::ReferenceSymbolShadowed,
                binding.position,
                format!("Identifier '{}' shadows a value", name),
            ));
        }

        params.push(vm.keep().alloc_str(name));
    }

    let form_node = &nodes[2];
    let form = vm.keep().alloc(form_node.clone_into(vm.keep()));

    let captured = Environment::child(env.clone());
    capture_environment(vm, form_node, env, &captured);

    Ok(Value::new(
        ValueKind::Closure(Rc::new(Closure {
            form,
            params,
            env: captured,
        })),
        first.position,
    ))
}

/// The capture walk: snapshots creation-time bindings into the captured
/// environment. Specials and builtins stay late-bound through the
/// registries; the first registration of a name wins.
fn capture_environment<'n, 'k>(
    vm: &Vm<'k>,
    node: &Node<'n>,
    source: &EnvRef<'k>,
    destination: &EnvRef<'k>,
) {
    match node.kind {
        NodeKind::Symbol(name) => {
            if let Some(value) = vm.resolve_symbol(source, name) {
                match value.kind {
                    ValueKind::Special(_) | ValueKind::Builtin(_) => {}
                    _ => destination.borrow_mut().capture(name, value),
                }
            }
        }
        NodeKind::List(children) => {
            for child in children {
                capture_environment(vm, child, source, destination);
            }
        }
        _ => {}
    }
}

/// `(let ((<sym> <form>)*) <body>)` — evaluates the couples in a fresh child
/// environment (later couples see earlier ones), then the body. The result
/// outlives the local scope.
pub fn let_form<'n, 'k>(
    vm: &Vm<'k>,
    nodes: &'n [Node<'n>],
    env: &EnvRef<'k>,
    _trampoline: &mut Trampoline<'n, 'k>,
) -> Result<Value<'k>, Error> {
    let first = &nodes[0];
    if nodes.len() != 3 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            first.position,
            format!(
                "{} requires a list of symbol-form assignments. {}",
                LET, LET_EXAMPLE
            ),
        ));
    }

    let couples_node = &nodes[1];
    let couples = match couples_node.kind {
        NodeKind::List(couples) => couples,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeError,
                couples_node.position,
                format!(
                    "{} requires a list of symbol-form assignments. {}",
                    LET, LET_EXAMPLE
                ),
            ));
        }
    };

    let local = Environment::child(env.clone());

    for couple in couples {
        let children = match couple.kind {
            NodeKind::List(children) if children.len() == 2 => children,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeError,
                    couple.position,
                    format!(
                        "{} requires a list of symbol-form assignments. {}",
                        LET, LET_EXAMPLE
                    ),
                ));
            }
        };

        let symbol = &children[0];
        let name = match symbol.kind {
            NodeKind::Symbol(name) => name,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeError,
                    symbol.position,
                    format!(
                        "{} requires a list of symbol-form assignments. {}",
                        LET, LET_EXAMPLE
                    ),
                ));
            }
        };

        if name.contains(NAMESPACE_DELIMITER) {
            return Err(Error::at(
                ErrorCode::SyntaxUnexpectedToken,
                first.position,
                format!(
                    "Unexpected namespace delimiter '{}' in custom symbol '{}'.",
                    NAMESPACE_DELIMITER, name
                ),
            ));
        }

        let value = evaluate(vm, &children[1], &local)?;
        let value_position = value.position;
        vm.register_symbol(&local, name, value)
            .map_err(|error| error.with_position(value_position))?;
    }

    evaluate(vm, &nodes[2], &local)
}

/// `(cond (<pred> <then>)* <fallback>)` — evaluates predicates in order;
/// the first true one selects its branch, otherwise the fallback runs.
pub fn cond<'n, 'k>(
    vm: &Vm<'k>,
    nodes: &'n [Node<'n>],
    env: &EnvRef<'k>,
    _trampoline: &mut Trampoline<'n, 'k>,
) -> Result<Value<'k>, Error> {
    let first = &nodes[0];
    if nodes.len() < 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            first.position,
            format!(
                "{} requires a list of condition-form assignments. {}",
                COND, COND_EXAMPLE
            ),
        ));
    }

    for clause in &nodes[1..nodes.len() - 1] {
        let children = match clause.kind {
            NodeKind::List(children) if children.len() == 2 => children,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeError,
                    clause.position,
                    format!(
                        "{} requires a list of condition-form assignments. {}",
                        COND, COND_EXAMPLE
                    ),
                ));
            }
        };

        let condition = evaluate(vm, &children[0], env)?;
        let selected = match condition.kind {
            ValueKind::Boolean(value) => value,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeError,
                    clause.position,
                    format!(
                        "Conditions should resolve to a boolean, got {}. {}",
                        condition.type_name(),
                        COND_EXAMPLE
                    ),
                ));
            }
        };

        if selected {
            return evaluate(vm, &children[1], env);
        }
    }

    evaluate(vm, &nodes[nodes.len() - 1], env)
}
