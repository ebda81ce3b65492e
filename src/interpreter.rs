use crate::arena::Arena;
use crate::env::{EnvRef, Environment};
use crate::error::{Error, ErrorCode};
use crate::lexer::tokenize;
use crate::node::{Node, NodeKind};
use crate::parser::parse;
use crate::value::{Closure, Value, ValueKind};
use crate::vm::Vm;

/// Out-parameter through which a special form may request a tail rewrite:
/// when `more` is set the evaluator rebinds `(node, environment)` and loops
/// instead of recursing. None of the bundled specials uses it; the contract
/// exists for forms that need bounded-stack iteration.
pub struct Trampoline<'n, 'k> {
    pub more: bool,
    pub node: Option<&'n Node<'n>>,
    pub environment: Option<EnvRef<'k>>,
}

impl<'n, 'k> Trampoline<'n, 'k> {
    pub fn new() -> Self {
        Trampoline {
            more: false,
            node: None,
            environment: None,
        }
    }
}

impl<'n, 'k> Default for Trampoline<'n, 'k> {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks one syntax tree to a value.
///
/// Atoms map to their value; symbols resolve through the VM and come back as
/// positioned copies; lists dispatch on their evaluated head (builtin call,
/// special form, closure call, or plain data list).
pub fn evaluate<'n, 'k>(
    vm: &Vm<'k>,
    node: &'n Node<'n>,
    env: &EnvRef<'k>,
) -> Result<Value<'k>, Error> {
    let _frame = vm.enter_frame(node.position)?;
    let mut node = node;
    let mut env = env.clone();

    loop {
        match node.kind {
            NodeKind::Nil => return Ok(Value::nil(node.position)),
            NodeKind::Boolean(value) => return Ok(Value::boolean(value, node.position)),
            NodeKind::Number(value) => return Ok(Value::number(value, node.position)),
            NodeKind::Str(text) => return Ok(Value::string(text.to_string(), node.position)),
            NodeKind::Symbol(name) => {
                let mut value = vm.resolve_symbol(&env, name).ok_or_else(|| {
                    Error::at(
                        ErrorCode::ReferenceSymbolNotFound,
                        node.position,
                        format!("Symbol '{}' cannot be found in the current environment", name),
                    )
                })?;
                value.position = node.position;
                return Ok(value);
            }
            NodeKind::List(children) => {
                if children.is_empty() {
                    return Ok(Value::list(Vec::new(), node.position));
                }

                let head = evaluate(vm, &children[0], &env)?;

                match head.kind {
                    ValueKind::Builtin(builtin) => {
                        let mut arguments = Vec::with_capacity(children.len() - 1);
                        for child in &children[1..] {
                            arguments.push(evaluate(vm, child, &env)?);
                        }
                        return builtin(vm, &arguments, head.position);
                    }
                    ValueKind::Special(special) => {
                        let mut trampoline = Trampoline::new();
                        let value = special(vm, children, &env, &mut trampoline)?;
                        if trampoline.more {
                            if let (Some(next_node), Some(next_env)) =
                                (trampoline.node, trampoline.environment)
                            {
                                node = next_node;
                                env = next_env;
                                continue;
                            }
                        }
                        return Ok(value);
                    }
                    ValueKind::Closure(ref closure) => {
                        let mut arguments = Vec::with_capacity(children.len() - 1);
                        for child in &children[1..] {
                            arguments.push(evaluate(vm, child, &env)?);
                        }
                        return invoke_closure(vm, closure, &arguments);
                    }
                    _ => {
                        // The head is plain data: the whole form is a list
                        // literal, head value included as element 0.
                        let mut items = Vec::with_capacity(children.len());
                        items.push(head);
                        for child in &children[1..] {
                            items.push(evaluate(vm, child, &env)?);
                        }
                        return Ok(Value::list(items, node.position));
                    }
                }
            }
        }
    }
}

/// Calls a closure: binds parameters positionally in a child of the captured
/// environment and evaluates the stored form there. Surplus arguments are
/// discarded.
pub fn invoke_closure<'k>(
    vm: &Vm<'k>,
    closure: &Closure<'k>,
    arguments: &[Value<'k>],
) -> Result<Value<'k>, Error> {
    if arguments.len() < closure.params.len() {
        return Err(Error::at(
            ErrorCode::TypeUnexpectedArity,
            closure.form.position,
            format!(
                "Unexpected arity. Expected {} arguments, got {}.",
                closure.params.len(),
                arguments.len()
            ),
        ));
    }

    let local = Environment::child(closure.env.clone());
    for (name, value) in closure.params.iter().zip(arguments) {
        vm.register_symbol(&local, name, value.clone())
            .map_err(|error| error.with_position(value.position))?;
    }

    evaluate(vm, closure.form, &local)
}

/// The whole pipeline for one top-level form: tokenize, parse, evaluate.
/// Returns `None` for blank input. The syntax arena lives only for the
/// duration of the call; the produced value does not reference it.
pub fn interpret<'k>(vm: &Vm<'k>, source: &str) -> Result<Option<Value<'k>>, Error> {
    let arena = Arena::new();
    let tokens = tokenize(&arena, source)?;

    let mut offset = 0;
    let mut depth = 0;
    match parse(&arena, &tokens, &mut offset, &mut depth)? {
        Some(node) => evaluate(vm, &node, &vm.global).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::vm::VmOptions;

    fn expect_number(value: &Value<'_>) -> f64 {
        match value.kind {
            ValueKind::Number(n) => n,
            _ => panic!("expected a number, got {}", value.type_name()),
        }
    }

    #[test]
    fn atoms_evaluate_to_themselves() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "42").unwrap().unwrap();
        assert_eq!(expect_number(&value), 42.0);
        let value = interpret(&vm, "true").unwrap().unwrap();
        assert!(matches!(value.kind, ValueKind::Boolean(true)));
        let value = interpret(&vm, "nil").unwrap().unwrap();
        assert!(matches!(value.kind, ValueKind::Nil));
        let value = interpret(&vm, "\"hi\"").unwrap().unwrap();
        assert!(matches!(value.kind, ValueKind::Str(ref s) if s == "hi"));
    }

    #[test]
    fn blank_input_interprets_to_none() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert!(interpret(&vm, "  ").unwrap().is_none());
    }

    #[test]
    fn empty_list_evaluates_to_empty_list_value() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "()").unwrap().unwrap();
        match value.kind {
            ValueKind::List(items) => assert!(items.is_empty()),
            _ => panic!("expected a list"),
        }
    }

    #[test]
    fn unknown_symbol_fails_at_its_position() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(+ 1 missing)").unwrap_err();
        assert_eq!(error.code, ErrorCode::ReferenceSymbolNotFound);
        assert_eq!(error.position, Some(Position::new(1, 6)));
    }

    #[test]
    fn resolved_symbols_take_the_reference_position() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        interpret(&vm, "(def! answer 42)").unwrap();
        let value = interpret(&vm, "  answer").unwrap().unwrap();
        assert_eq!(value.position, Position::new(1, 3));
    }

    #[test]
    fn builtin_call_evaluates_arguments_left_to_right() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "(+ 1 2 3)").unwrap().unwrap();
        assert_eq!(expect_number(&value), 6.0);
    }

    #[test]
    fn data_list_keeps_evaluated_head() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "(1 2 (+ 1 2))").unwrap().unwrap();
        match value.kind {
            ValueKind::List(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(expect_number(&items[0]), 1.0);
                assert_eq!(expect_number(&items[2]), 3.0);
            }
            _ => panic!("expected a list"),
        }
    }

    #[test]
    fn closure_roundtrip_applies_arguments() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        interpret(&vm, "(def! sum (fn (a b) (+ a b)))").unwrap();
        let value = interpret(&vm, "(sum 1 2)").unwrap().unwrap();
        assert_eq!(expect_number(&value), 3.0);
    }

    #[test]
    fn closure_surplus_arguments_are_discarded() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        interpret(&vm, "(def! first (fn (a) a))").unwrap();
        let value = interpret(&vm, "(first 1 2 3)").unwrap().unwrap();
        assert_eq!(expect_number(&value), 1.0);
    }

    #[test]
    fn closure_missing_arguments_fail_with_arity_error() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        interpret(&vm, "(def! sum (fn (a b) (+ a b)))").unwrap();
        let error = interpret(&vm, "(sum 1)").unwrap_err();
        assert_eq!(error.code, ErrorCode::TypeUnexpectedArity);
    }

    #[test]
    fn closures_escape_the_arena_of_their_definition() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        // The defining statement's arena is gone once interpret returns;
        // the stored form must still be callable.
        interpret(&vm, "(def! double (fn (x) (* x 2)))").unwrap();
        let value = interpret(&vm, "(double 21)").unwrap().unwrap();
        assert_eq!(expect_number(&value), 42.0);
    }

    #[test]
    fn recursion_through_the_global_environment_works() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        interpret(
            &vm,
            "(def! fact (fn (n) (cond ((= n 0) 1) (* n (fact (- n 1))))))",
        )
        .unwrap();
        let value = interpret(&vm, "(fact 5)").unwrap().unwrap();
        assert_eq!(expect_number(&value), 120.0);
    }

    #[test]
    fn runaway_recursion_hits_the_call_stack_limit() {
        let keep = Arena::new();
        let vm = Vm::new(
            &keep,
            VmOptions {
                max_call_stack_size: 64,
                ..VmOptions::default()
            },
        );
        interpret(&vm, "(def! boom (fn (n) (boom n)))").unwrap();
        let error = interpret(&vm, "(boom 1)").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeError);
        assert!(error.message.contains("call stack"));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let first = interpret(&vm, "(* (+ 1 2) (- 10 4))").unwrap().unwrap();
        let second = interpret(&vm, "(* (+ 1 2) (- 10 4))").unwrap().unwrap();
        assert!(first.equals(&second));
    }

    #[test]
    fn first_failure_aborts_the_form() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(+ 1 (io:stdout!) 2)").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeError);
    }
}
