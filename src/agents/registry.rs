//! Fixed factory registry mapping agent-type symbols to constructors.
//!
//! No run-time reflection: a `HashMap<&'static str, fn(...) -> Arc<dyn Agent>>` is
//! enough, since the set of operators is closed (spec §9 Design Notes).

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::arithmetic;
use super::Agent;
use crate::topics::TopicRegistry;

pub type Factory = fn(Vec<String>, Vec<String>, &TopicRegistry) -> Arc<dyn Agent>;

static FACTORIES: LazyLock<HashMap<&'static str, Factory>> = LazyLock::new(|| {
    let mut map: HashMap<&'static str, Factory> = HashMap::new();
    map.insert("Increment", arithmetic::increment);
    map.insert("Decrement", arithmetic::decrement);
    map.insert("Negate", arithmetic::negate);
    map.insert("Absolute", arithmetic::absolute);
    map.insert("Double", arithmetic::double);
    map.insert("Plus", arithmetic::plus);
    map.insert("Minus", arithmetic::minus);
    map.insert("Multiply", arithmetic::multiply);
    map.insert("Max", arithmetic::max);
    map.insert("Min", arithmetic::min);
    map.insert("Average", arithmetic::average);
    map
});

/// Look up a factory by agent-type symbol. `None` if the symbol isn't one of the fixed
/// operator names (spec §4.7: "Agent-type symbol unknown").
pub fn lookup(type_symbol: &str) -> Option<Factory> {
    FACTORIES.get(type_symbol).copied()
}

/// Arity contract for a given operator, used by `ConfigLoader` validation (spec §4.7).
pub fn arity(type_symbol: &str) -> Option<(usize, usize)> {
    match type_symbol {
        "Increment" | "Decrement" | "Negate" | "Absolute" | "Double" => Some((1, 1)),
        "Plus" | "Minus" | "Multiply" | "Max" | "Min" | "Average" => Some((2, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_symbols_resolve() {
        assert!(lookup("Increment").is_some());
        assert!(lookup("Plus").is_some());
    }

    #[test]
    fn unknown_symbol_does_not_resolve() {
        assert!(lookup("Frobnicate").is_none());
    }

    #[test]
    fn arity_matches_operator_shape() {
        assert_eq!(arity("Increment"), Some((1, 1)));
        assert_eq!(arity("Plus"), Some((2, 1)));
        assert_eq!(arity("Bogus"), None);
    }
}
