//! Visibility and enablement conditions.
//!
//! Conditions are side-effect free expressions over switches, variables and a
//! few system flags, evaluated by a restricted rhai engine. Accessors are
//! rewritten into scope bindings when the menu configuration loads; each
//! opening fills a fresh scope from live game state.

use std::{error::Error, fmt};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rhai::{
    packages::{ArithmeticPackage, LogicPackage, Package},
    Dynamic, Engine, EvalAltResult, OptimizationLevel, ParseError, Scope, AST,
};

/// Nesting limit for parentheses and unary operators.
pub const MAX_EXPR_DEPTH: usize = 64;
const MAX_OPERATIONS: u64 = 10_000;

static ACCESSOR: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        \$gameSwitches\.value\(\s*(?P<switch>\d+)\s*\)
        | \$gameVariables\.value\(\s*(?P<variable>\d+)\s*\)
        | \$gameSystem\.(?P<method>[A-Za-z_]\w*)\(\s*\)
        | \bs\[\s*(?P<short_switch>\d+)\s*\]
        | \bv\[\s*(?P<short_variable>\d+)\s*\]",
    )
});

static ENGINE: Lazy<Engine> = Lazy::new(|| {
    let mut engine = Engine::new_raw();
    engine.register_global_module(ArithmeticPackage::new().as_shared_module());
    engine.register_global_module(LogicPackage::new().as_shared_module());
    engine.set_optimization_level(OptimizationLevel::None);
    engine.set_strict_variables(true);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_EXPR_DEPTH / 2);
    engine.set_max_operations(MAX_OPERATIONS);
    engine
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFlag {
    SaveEnabled,
    MenuEnabled,
    FormationEnabled,
}

impl SystemFlag {
    fn from_method(method: &str) -> Option<Self> {
        match method {
            "isSaveEnabled" => Some(Self::SaveEnabled),
            "isMenuEnabled" => Some(Self::MenuEnabled),
            "isFormationEnabled" => Some(Self::FormationEnabled),
            _ => None,
        }
    }

    fn binding(self) -> &'static str {
        match self {
            Self::SaveEnabled => "save_enabled",
            Self::MenuEnabled => "menu_enabled",
            Self::FormationEnabled => "formation_enabled",
        }
    }
}

/// Read-only view of the game state a condition may inspect.
pub trait GameStateView {
    fn switch(&self, id: u32) -> Option<bool>;
    fn variable(&self, id: u32) -> Option<i64>;
    fn system_flag(&self, flag: SystemFlag) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    Syntax { message: String },
    UndefinedSwitch(u32),
    UndefinedVariable(u32),
    TypeMismatch { operator: String, found: String },
    DivisionByZero,
    Overflow,
    Evaluation(String),
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message } => write!(f, "syntax error: {message}"),
            Self::UndefinedSwitch(id) => write!(f, "switch {id} is not defined"),
            Self::UndefinedVariable(id) => write!(f, "variable {id} is not defined"),
            Self::TypeMismatch { operator, found } => {
                write!(f, "`{operator}` cannot be applied to {found}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::Evaluation(message) => write!(f, "evaluation failed: {message}"),
        }
    }
}

impl Error for ExpressionError {}

fn syntax(message: impl Into<String>) -> ExpressionError {
    ExpressionError::Syntax {
        message: message.into(),
    }
}

fn switch_binding(id: u32) -> String {
    format!("switch_{id}")
}

fn variable_binding(id: u32) -> String {
    format!("variable_{id}")
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

/// Game state a compiled condition reads, in first-use order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Bindings {
    switches: Vec<u32>,
    variables: Vec<u32>,
    flags: Vec<SystemFlag>,
}

impl Bindings {
    fn bind(&mut self, caps: &Captures<'_>) -> Result<String, ExpressionError> {
        if let Some(id) = caps.name("switch").or_else(|| caps.name("short_switch")) {
            let id = parse_id(id.as_str(), "switch")?;
            push_unique(&mut self.switches, id);
            return Ok(switch_binding(id));
        }
        if let Some(id) = caps.name("variable").or_else(|| caps.name("short_variable")) {
            let id = parse_id(id.as_str(), "variable")?;
            push_unique(&mut self.variables, id);
            return Ok(variable_binding(id));
        }
        let method = caps.name("method").map_or("", |method| method.as_str());
        let flag = SystemFlag::from_method(method).ok_or_else(|| {
            syntax(format!("`$gameSystem.{method}` is not available in conditions"))
        })?;
        push_unique(&mut self.flags, flag);
        Ok(flag.binding().to_string())
    }

    fn declare(&self) -> Scope<'static> {
        let mut scope = Scope::new();
        for &id in &self.switches {
            scope.push(switch_binding(id), false);
        }
        for &id in &self.variables {
            scope.push(variable_binding(id), 0_i64);
        }
        for &flag in &self.flags {
            scope.push(flag.binding(), false);
        }
        scope
    }

    fn read<S: GameStateView + ?Sized>(&self, state: &S) -> Scope<'static> {
        let mut scope = Scope::new();
        for &id in &self.switches {
            if let Some(value) = state.switch(id) {
                scope.push(switch_binding(id), value);
            }
        }
        for &id in &self.variables {
            if let Some(value) = state.variable(id) {
                scope.push(variable_binding(id), value);
            }
        }
        for &flag in &self.flags {
            scope.push(flag.binding(), state.system_flag(flag));
        }
        scope
    }
}

fn parse_id(digits: &str, kind: &str) -> Result<u32, ExpressionError> {
    digits
        .parse()
        .map_err(|_| syntax(format!("{kind} id {digits} is out of range")))
}

/// Replaces accessors with scope bindings and strict equality spellings with
/// their plain forms. Values never coerce, so both spellings compare alike.
fn rewrite(source: &str) -> Result<(String, Bindings), ExpressionError> {
    let accessor = ACCESSOR
        .as_ref()
        .map_err(|err| syntax(format!("accessor pattern failed to compile: {err}")))?;
    let mut bindings = Bindings::default();
    let mut failure = None;
    let rewritten = accessor.replace_all(source, |caps: &Captures<'_>| {
        bindings.bind(caps).unwrap_or_else(|error| {
            failure.get_or_insert(error);
            String::new()
        })
    });
    if let Some(error) = failure {
        return Err(error);
    }
    let rewritten = rewritten.replace("!==", "!=").replace("===", "==");
    Ok((rewritten, bindings))
}

fn parse_error(error: &ParseError) -> ExpressionError {
    syntax(error.err_type().to_string())
}

fn undefined(name: &str) -> ExpressionError {
    let id = |prefix: &str| -> Option<u32> { name.strip_prefix(prefix)?.parse().ok() };
    if let Some(id) = id("switch_") {
        ExpressionError::UndefinedSwitch(id)
    } else if let Some(id) = id("variable_") {
        ExpressionError::UndefinedVariable(id)
    } else {
        ExpressionError::Evaluation(format!("`{name}` is not defined"))
    }
}

fn runtime_error(error: EvalAltResult) -> ExpressionError {
    match error {
        EvalAltResult::ErrorVariableNotFound(name, _) => undefined(&name),
        EvalAltResult::ErrorFunctionNotFound(signature, _) => {
            // Operator signatures read `+ (bool, i64)`.
            let (operator, operands) = signature
                .split_once(' ')
                .unwrap_or((signature.as_str(), ""));
            ExpressionError::TypeMismatch {
                operator: operator.to_string(),
                found: operands.to_string(),
            }
        }
        EvalAltResult::ErrorMismatchDataType(expected, found, _) => {
            ExpressionError::TypeMismatch {
                operator: expected,
                found,
            }
        }
        EvalAltResult::ErrorArithmetic(message, _) if message.contains("by zero") => {
            ExpressionError::DivisionByZero
        }
        EvalAltResult::ErrorArithmetic(..) => ExpressionError::Overflow,
        other => ExpressionError::Evaluation(other.to_string()),
    }
}

/// A compiled condition together with the text it came from.
#[derive(Debug, Clone)]
pub struct Condition {
    source: String,
    ast: AST,
    bindings: Bindings,
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Condition {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(syntax("condition is empty"));
        }
        let (rewritten, bindings) = rewrite(source)?;
        let ast = ENGINE
            .compile_expression_with_scope(&bindings.declare(), &rewritten)
            .map_err(|error| parse_error(&error))?;
        Ok(Self {
            source: source.to_string(),
            ast,
            bindings,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate<S: GameStateView + ?Sized>(&self, state: &S) -> Result<bool, ExpressionError> {
        let mut scope = self.bindings.read(state);
        let value = ENGINE
            .eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
            .map_err(|error| runtime_error(*error))?;
        value
            .as_bool()
            .map_err(|found| ExpressionError::TypeMismatch {
                operator: "condition".to_string(),
                found: found.to_string(),
            })
    }
}

/// An absent condition always holds and never reads state.
pub fn evaluate_condition<S: GameStateView + ?Sized>(
    condition: Option<&Condition>,
    state: &S,
) -> Result<bool, ExpressionError> {
    condition.map_or(Ok(true), |condition| condition.evaluate(state))
}
