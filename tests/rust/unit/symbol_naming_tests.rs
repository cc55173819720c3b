//! Unit tests for fresh-symbol generation
//!
//! Uniqueness must not depend on the prefix: repeated, empty and
//! number-looking prefixes all have to produce distinct symbols.

#[cfg(test)]
mod symbol_naming_tests {
    use std::collections::HashSet;

    use qsu_planner::{
        query_planner::symbol::Symbol,
        utils::symbol_naming::{fresh_symbol_name, parse_symbol_name, NameGenerator},
    };
    use test_case::test_case;

    #[test]
    fn test_many_calls_are_pairwise_distinct() {
        let prefixes = ["autojoin", "", "a_1", "1", "leftAccess", "a"];
        let mut name_gen = NameGenerator::new();
        let mut seen = HashSet::new();

        for i in 0..1200 {
            let symbol = name_gen.next(prefixes[i % prefixes.len()]).unwrap();
            assert!(seen.insert(symbol.clone()), "duplicate symbol {}", symbol);
        }
        assert_eq!(name_gen.peek_counter(), 1200);
    }

    /// Prefixes that end in `_<digits>` must not collide with other counters.
    #[test]
    fn test_tricky_prefixes_do_not_collide() {
        // "a_1" + 2 => "a_1_2", "a" + 12 => "a_12": different texts
        assert_ne!(fresh_symbol_name("a_1", 2), fresh_symbol_name("a", 12));
        assert_ne!(fresh_symbol_name("a_1", 2), fresh_symbol_name("a_12", 2));
    }

    #[test_case(&["root", "src"], 0 ; "no generated names")]
    #[test_case(&["autojoin_3", "leftAccess_4"], 5 ; "continues after highest")]
    #[test_case(&["x_10", "x_2", "y"], 11 ; "order independent")]
    #[test_case(&["weird_", "trailing_x"], 0 ; "non numeric suffixes ignored")]
    fn test_resume_after(names: &[&str], expected: u64) {
        let symbols: Vec<Symbol> = names.iter().map(|n| Symbol::new(*n)).collect();
        let name_gen = NameGenerator::resume_after(&symbols);
        assert_eq!(name_gen.peek_counter(), expected);
    }

    #[test]
    fn test_resumed_generator_never_remints_existing_names() {
        let existing: Vec<Symbol> = {
            let mut name_gen = NameGenerator::new();
            (0..5).map(|_| name_gen.next("autojoin").unwrap()).collect()
        };
        let mut resumed = NameGenerator::resume_after(&existing);
        for _ in 0..5 {
            let symbol = resumed.next("autojoin").unwrap();
            assert!(!existing.contains(&symbol));
        }
    }

    #[test]
    fn test_generated_names_parse_back() {
        let mut name_gen = NameGenerator::starting_at(41);
        let symbol = name_gen.next("centerAccess").unwrap();
        assert_eq!(symbol.as_str(), "centerAccess_41");
        assert_eq!(
            parse_symbol_name(symbol.as_str()),
            Some(("centerAccess", 41))
        );
    }
}
