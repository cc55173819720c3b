pub mod symbol_naming;
