use std::cell::Cell;
use std::collections::HashMap;

use crate::arena::Arena;
use crate::builtins;
use crate::env::{EnvRef, Environment};
use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::specials;
use crate::value::{BuiltinFn, SpecialFn, Value, ValueKind};

pub const DEFAULT_ENVIRONMENT_SIZE: usize = 64;
pub const DEFAULT_MAX_CALL_STACK_SIZE: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct VmOptions {
    /// Initial capacity of the global environment's value map.
    pub environment_size: usize,
    /// Recursion limit checked on every `evaluate` entry.
    pub max_call_stack_size: usize,
}

impl Default for VmOptions {
    fn default() -> Self {
        VmOptions {
            environment_size: DEFAULT_ENVIRONMENT_SIZE,
            max_call_stack_size: DEFAULT_MAX_CALL_STACK_SIZE,
        }
    }
}

/// The immutable name tables built once per VM: special forms and builtins.
/// These precede every environment in symbol lookup order.
pub struct Registry {
    specials: HashMap<&'static str, SpecialFn>,
    builtins: HashMap<&'static str, BuiltinFn>,
}

impl Registry {
    fn new() -> Self {
        let mut specials: HashMap<&'static str, SpecialFn> = HashMap::with_capacity(4);
        specials.insert(specials::DEFINE, specials::define);
        specials.insert(specials::FUNCTION, specials::function);
        specials.insert(specials::LET, specials::let_form);
        specials.insert(specials::COND, specials::cond);

        let mut builtins: HashMap<&'static str, BuiltinFn> = HashMap::with_capacity(64);
        {
            use crate::builtins::core;
            builtins.insert(core::SUM, core::sum);
            builtins.insert(core::SUB, core::subtract);
            builtins.insert(core::MUL, core::multiply);
            builtins.insert(core::DIV, core::divide);
            builtins.insert(core::MOD, core::modulo);
            builtins.insert(core::EQUAL, core::equal);
            builtins.insert(core::NEQ, core::not_equal);
            builtins.insert(core::LESS_THAN, core::less_than);
            builtins.insert(core::GREATER_THAN, core::greater_than);
            builtins.insert(core::LEQ, core::less_equal);
            builtins.insert(core::GEQ, core::greater_equal);
            builtins.insert(core::LOGICAL_AND, core::logical_and);
            builtins.insert(core::LOGICAL_OR, core::logical_or);
        }
        {
            use crate::builtins::list;
            builtins.insert(list::LIST_COUNT, list::count);
            builtins.insert(list::LIST_FROM, list::from);
            builtins.insert(list::LIST_NTH, list::nth);
            builtins.insert(list::LIST_MAP, list::map);
            builtins.insert(list::LIST_EACH, list::each);
            builtins.insert(list::LIST_FILTER, list::filter);
            builtins.insert(list::LIST_TIMES, list::times);
            builtins.insert(list::LIST_REDUCE, list::reduce);
        }
        {
            use crate::builtins::str;
            builtins.insert(str::STR_LENGTH, str::length);
            builtins.insert(str::STR_JOIN, str::join);
            builtins.insert(str::STR_SLICE, str::slice);
            builtins.insert(str::STR_INCLUDE, str::include);
            builtins.insert(str::STR_TRIM_LEFT, str::trim_left);
            builtins.insert(str::STR_TRIM_RIGHT, str::trim_right);
        }
        {
            use crate::builtins::math;
            builtins.insert(math::MATH_MAX, math::max);
            builtins.insert(math::MATH_MIN, math::min);
            builtins.insert(math::MATH_CEIL, math::ceil);
            builtins.insert(math::MATH_FLOOR, math::floor);
            builtins.insert(math::MATH_RANDOM, math::random);
        }
        {
            use crate::builtins::io;
            builtins.insert(io::IO_STDOUT, io::stdout);
            builtins.insert(io::IO_STDERR, io::stderr);
            builtins.insert(io::IO_PRINTF, io::printf);
            builtins.insert(io::IO_READLINE, io::readline);
            builtins.insert(io::IO_CLEAR, io::clear);
        }
        builtins.insert(builtins::flow::FLOW_SLEEP, builtins::flow::sleep);

        Registry { specials, builtins }
    }

    pub fn special(&self, name: &str) -> Option<SpecialFn> {
        self.specials.get(name).copied()
    }

    pub fn builtin(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specials.contains_key(name) || self.builtins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specials.len() + self.builtins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One interpreter instance: options, registries, the global environment,
/// and the stable arena closure forms are copied into. Multiple VMs may
/// coexist in one process.
pub struct Vm<'k> {
    keep: &'k Arena,
    pub options: VmOptions,
    pub registry: Registry,
    pub global: EnvRef<'k>,
    depth: Cell<usize>,
}

impl<'k> Vm<'k> {
    /// `keep` must outlive every value produced by this VM; closure forms
    /// and parameter names are allocated there.
    pub fn new(keep: &'k Arena, options: VmOptions) -> Self {
        Vm {
            keep,
            options,
            registry: Registry::new(),
            global: Environment::root(options.environment_size),
            depth: Cell::new(0),
        }
    }

    pub fn keep(&self) -> &'k Arena {
        self.keep
    }

    /// Symbol lookup order: specials, builtins, then the environment chain.
    pub fn resolve_symbol(&self, env: &EnvRef<'k>, name: &str) -> Option<Value<'k>> {
        if let Some(special) = self.registry.special(name) {
            return Some(Value::new(ValueKind::Special(special), Position::default()));
        }
        if let Some(builtin) = self.registry.builtin(name) {
            return Some(Value::new(ValueKind::Builtin(builtin), Position::default()));
        }
        Environment::resolve(env, name)
    }

    pub fn is_visible(&self, env: &EnvRef<'k>, name: &str) -> bool {
        self.registry.contains(name) || Environment::contains(env, name)
    }

    /// Binds `name` in `env`, refusing to shadow any visible binding or
    /// registry entry.
    pub fn register_symbol(
        &self,
        env: &EnvRef<'k>,
        name: &str,
        value: Value<'k>,
    ) -> Result<(), Error> {
        if self.is_visible(env, name) {
            return Err(Error::new(
                ErrorCode::ReferenceSymbolAlreadyDefined,
                None,
                format!("Identifier '{}' has already been declared", name),
            ));
        }
        env.borrow_mut().define(name, value)
    }

    /// Accounts one evaluator frame against `max_call_stack_size`.
    pub(crate) fn enter_frame(&self, position: Position) -> Result<FrameGuard<'_>, Error> {
        let depth = self.depth.get();
        if depth >= self.options.max_call_stack_size {
            return Err(Error::at(
                ErrorCode::RuntimeError,
                position,
                "Maximum call stack size exceeded".to_string(),
            ));
        }
        self.depth.set(depth + 1);
        Ok(FrameGuard { depth: &self.depth })
    }
}

pub(crate) struct FrameGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_NAMES: &[&str] = &[
        "def!",
        "fn",
        "let",
        "cond",
        "+",
        "-",
        "*",
        "/",
        "%",
        "=",
        "<>",
        "<",
        ">",
        "<=",
        ">=",
        "and",
        "or",
        "flow:sleep!",
        "io:stdout!",
        "io:stderr!",
        "io:printf!",
        "io:readline!",
        "io:clear!",
        "list:count",
        "list:from",
        "list:nth",
        "list:map",
        "list:each",
        "list:filter",
        "list:times",
        "list:reduce",
        "math:max",
        "math:min",
        "math:ceil",
        "math:floor",
        "math:random!",
        "str:length",
        "str:join",
        "str:slice",
        "str:include?",
        "str:trimLeft",
        "str:trimRight",
    ];

    #[test]
    fn registry_exposes_exactly_the_initial_name_set() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        for name in ALL_NAMES {
            assert!(vm.registry.contains(name), "missing {}", name);
        }
        assert_eq!(vm.registry.len(), ALL_NAMES.len());
        assert!(!vm.registry.is_empty());
    }

    #[test]
    fn resolve_prefers_registries_over_environment() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let resolved = vm.resolve_symbol(&vm.global, "+").unwrap();
        assert_eq!(resolved.type_name(), "builtin");
        let resolved = vm.resolve_symbol(&vm.global, "def!").unwrap();
        assert_eq!(resolved.type_name(), "special");
    }

    #[test]
    fn register_rejects_builtin_names() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = vm
            .register_symbol(&vm.global, "and", Value::nil(Position::default()))
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::ReferenceSymbolAlreadyDefined);
    }

    #[test]
    fn register_rejects_names_visible_in_parents() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        vm.register_symbol(&vm.global, "x", Value::number(1.0, Position::default()))
            .unwrap();
        let child = Environment::child(vm.global.clone());
        let error = vm
            .register_symbol(&child, "x", Value::number(2.0, Position::default()))
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::ReferenceSymbolAlreadyDefined);
    }

    #[test]
    fn frame_guard_releases_depth() {
        let keep = Arena::new();
        let vm = Vm::new(
            &keep,
            VmOptions {
                max_call_stack_size: 1,
                ..VmOptions::default()
            },
        );
        {
            let _guard = vm.enter_frame(Position::default()).unwrap();
            assert!(vm.enter_frame(Position::default()).is_err());
        }
        assert!(vm.enter_frame(Position::default()).is_ok());
    }

    #[test]
    fn two_vms_coexist() {
        let keep_a = Arena::new();
        let keep_b = Arena::new();
        let vm_a = Vm::new(&keep_a, VmOptions::default());
        let vm_b = Vm::new(&keep_b, VmOptions::default());
        vm_a.register_symbol(&vm_a.global, "x", Value::number(1.0, Position::default()))
            .unwrap();
        assert!(vm_b.resolve_symbol(&vm_b.global, "x").is_none());
    }
}
