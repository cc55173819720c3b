//! Centralized fresh-symbol naming for graph rewrites.
//!
//! All symbols minted by the planner MUST come from a [`NameGenerator`] so that
//! names stay unique for the whole compilation session.
//!
//! ## Naming Convention
//! Format: `{prefix}_{counter}`
//! - The counter is the text after the LAST underscore and is always decimal
//! - The prefix is for readability only and may be empty or repeated
//!
//! Examples:
//! - `("autojoin", 0)` → `"autojoin_0"`
//! - `("left_access", 7)` → `"left_access_7"`
//! - `("", 3)` → `"_3"`

use crate::query_planner::symbol::Symbol;

/// Generate a symbol name from a prefix and a sequence counter.
///
/// # Examples
/// ```
/// use qsu_planner::utils::symbol_naming::fresh_symbol_name;
///
/// assert_eq!(fresh_symbol_name("autojoin", 0), "autojoin_0");
/// assert_eq!(fresh_symbol_name("a_1", 2), "a_1_2");
/// assert_eq!(fresh_symbol_name("", 5), "_5");
/// ```
pub fn fresh_symbol_name(prefix: &str, counter: u64) -> String {
    format!("{}_{}", prefix, counter)
}

/// Split a generated name back into `(prefix, counter)`.
///
/// # Returns
/// * `Some((prefix, counter))` - If the name ends in `_<digits>`
/// * `None` - If the name was not produced by [`fresh_symbol_name`]
///
/// # Examples
/// ```
/// use qsu_planner::utils::symbol_naming::parse_symbol_name;
///
/// assert_eq!(parse_symbol_name("autojoin_12"), Some(("autojoin", 12)));
/// assert_eq!(parse_symbol_name("a_1_2"), Some(("a_1", 2)));
/// assert_eq!(parse_symbol_name("root"), None);
/// ```
pub fn parse_symbol_name(name: &str) -> Option<(&str, u64)> {
    let pos = name.rfind('_')?;
    let digits = &name[pos + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let counter = digits.parse().ok()?;
    Some((&name[..pos], counter))
}

/// Sequential, deterministic source of fresh symbols.
///
/// Two generators that start at the same counter and receive the same sequence
/// of `next` calls produce identical symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameGenerator {
    counter: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(counter: u64) -> Self {
        NameGenerator { counter }
    }

    /// Seed a generator past every generated-looking name in `symbols`.
    ///
    /// Used when a graph built by an earlier session is handed to a new one:
    /// the counter must not revisit values that already appear in the graph.
    /// A name carrying `u64::MAX` leaves the generator exhausted.
    pub fn resume_after<'a, I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let counter = symbols
            .into_iter()
            .filter_map(|sym| parse_symbol_name(sym.as_str()))
            .map(|(_, n)| n.saturating_add(1))
            .max()
            .unwrap_or(0);
        NameGenerator { counter }
    }

    /// Allocate a new symbol and advance the sequence.
    ///
    /// Returns `None` once the counter cannot advance any further; the counter
    /// never wraps, so no name is handed out twice.
    pub fn next(&mut self, prefix: &str) -> Option<Symbol> {
        let following = self.counter.checked_add(1)?;
        let symbol = Symbol::new(fresh_symbol_name(prefix, self.counter));
        self.counter = following;
        Some(symbol)
    }

    /// The counter value the next call to [`NameGenerator::next`] will use.
    pub fn peek_counter(&self) -> u64 {
        self.counter
    }
}
