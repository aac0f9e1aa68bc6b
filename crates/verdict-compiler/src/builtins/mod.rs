//! Built-in function library
//!
//! A process-wide immutable table constructed once and shared by reference;
//! the compiler binds call sites against it by name and arity, and the
//! evaluator invokes the resolved implementations. Implementations are pure
//! functions over values. Most built-ins propagate a null primary operand as
//! null; genuinely invalid invocations return an error message that the
//! evaluator wraps into an evaluation failure.

mod boolean;
mod context;
mod list;
mod numeric;
mod string;
mod temporal;

use lazy_static::lazy_static;
use std::collections::HashMap;
use verdict_core::Value;

/// Implementation signature for a built-in function
pub type BuiltinFn = fn(&[Value]) -> std::result::Result<Value, String>;

/// A built-in function: name, arity bounds and implementation
pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` means variadic with no upper bound
    pub max_args: Option<usize>,
    pub func: BuiltinFn,
}

impl Builtin {
    /// Check an argument count against this built-in's arity bounds
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map(|max| count <= max).unwrap_or(true)
    }

    /// Human-readable arity description for error messages
    pub fn arity_description(&self) -> String {
        match (self.min_args, self.max_args) {
            (min, Some(max)) if min == max => format!("{}", min),
            (min, Some(max)) => format!("{} to {}", min, max),
            (min, None) => format!("at least {}", min),
        }
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

const fn builtin(
    name: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    func: BuiltinFn,
) -> Builtin {
    Builtin {
        name,
        min_args,
        max_args,
        func,
    }
}

static TABLE: &[Builtin] = &[
    // Boolean
    builtin("not", 1, Some(1), boolean::not),
    // String
    builtin("substring", 2, Some(3), string::substring),
    builtin("string_length", 1, Some(1), string::string_length),
    builtin("upper_case", 1, Some(1), string::upper_case),
    builtin("lower_case", 1, Some(1), string::lower_case),
    builtin("contains", 2, Some(2), string::contains),
    builtin("starts_with", 2, Some(2), string::starts_with),
    builtin("ends_with", 2, Some(2), string::ends_with),
    builtin("matches", 2, Some(2), string::matches),
    builtin("replace", 3, Some(3), string::replace),
    builtin("string", 1, Some(1), string::string),
    // Numeric
    builtin("abs", 1, Some(1), numeric::abs),
    builtin("floor", 1, Some(1), numeric::floor),
    builtin("ceiling", 1, Some(1), numeric::ceiling),
    builtin("decimal", 2, Some(2), numeric::decimal),
    builtin("modulo", 2, Some(2), numeric::modulo),
    builtin("number", 1, Some(1), numeric::number),
    // List
    builtin("count", 1, None, list::count),
    builtin("min", 1, None, list::min),
    builtin("max", 1, None, list::max),
    builtin("sum", 1, None, list::sum),
    builtin("mean", 1, None, list::mean),
    builtin("append", 2, None, list::append),
    builtin("concatenate", 1, None, list::concatenate),
    builtin("sublist", 2, Some(3), list::sublist),
    builtin("reverse", 1, Some(1), list::reverse),
    builtin("index_of", 2, Some(2), list::index_of),
    builtin("distinct_values", 1, Some(1), list::distinct_values),
    builtin("flatten", 1, None, list::flatten),
    builtin("list_contains", 2, Some(2), list::list_contains),
    // Context
    builtin("get_value", 2, Some(2), context::get_value),
    builtin("get_entries", 1, Some(1), context::get_entries),
    // Temporal
    builtin("date", 1, Some(3), temporal::date),
    builtin("time", 1, Some(3), temporal::time),
    builtin("date_and_time", 1, Some(2), temporal::date_and_time),
    builtin("today", 0, Some(0), temporal::today),
    builtin("now", 0, Some(0), temporal::now),
];

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, &'static Builtin> =
        TABLE.iter().map(|b| (b.name, b)).collect();
}

/// Look up a built-in by name
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BY_NAME.get(name).copied()
}

/// Collect positional arguments into a single list: a lone list argument is
/// used as-is, anything else is treated as the list of elements. Shared by the
/// variadic list built-ins (`sum(1, 2, 3)` and `sum([1, 2, 3])` agree).
pub(crate) fn gather_list(args: &[Value]) -> Option<Vec<Value>> {
    match args {
        [Value::List(items)] => Some(items.clone()),
        [Value::Null] => None,
        items => Some(items.to_vec()),
    }
}
