//! Built-in modules every definition is compiled against.

/// Term syntax: the builtin sorts and the functions passes generate calls to.
pub const K_TERM: &str = "K-TERM";
/// Program-level lexical syntax.
pub const ID_PROGRAM_PARSING: &str = "ID-PROGRAM-PARSING";
/// Synthesized wrapper injecting every sort into `KItem`.
pub const SEMANTICS: &str = "SEMANTICS";
/// Synthesized grammar for parsing object-language programs.
pub const LANGUAGE_PARSING: &str = "LANGUAGE-PARSING";

/// Source of the built-in modules, prepended to every definition parsed by
/// [`crate::Kompiler::run`].
pub const PRELUDE: &str = r#"
module K-TERM
  syntax K
  syntax KItem
  syntax KResult
  syntax Bool
  syntax Int
  syntax String
  syntax K ::= KItem
  syntax KItem ::= KResult
  syntax Bool ::= isKResult(K) [function, predicate(KResult)]
  syntax Bool ::= notBool(Bool) [function, smtlib("not")]
  syntax Bool ::= `_andBool_`(Bool, Bool) [function, smtlib("and")]
  syntax Int ::= `_+Int_`(Int, Int) [function, smtlib("+")]
  syntax Int ::= freshInt(Int) [function, freshGenerator]
endmodule

module ID-PROGRAM-PARSING
  imports K-TERM
  syntax Id
  syntax #Layout
endmodule
"#;
