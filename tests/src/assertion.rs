//! Comparisons that ignore compiler-generated names.

use kompile_definition::Rule;
use regex_lite::Regex;

/// Replaces the numeric suffix of every `_Gen<n>` and `DotVar<n>` with `#`.
pub fn normalize_fresh(text: &str) -> String {
    let generated = Regex::new(r"\b(_Gen|DotVar)\d+\b").expect("valid pattern");
    generated.replace_all(text, "$1#").into_owned()
}

/// Asserts that two rules agree on body, `requires` and `ensures` modulo
/// generated names. Attributes are not compared.
pub fn assert_same_rule(left: &Rule, right: &Rule) {
    let render = |rule: &Rule| {
        let mut text = normalize_fresh(&rule.body.to_string());
        if let Some(requires) = &rule.requires {
            text.push_str(" requires ");
            text.push_str(&normalize_fresh(&requires.to_string()));
        }
        if let Some(ensures) = &rule.ensures {
            text.push_str(" ensures ");
            text.push_str(&normalize_fresh(&ensures.to_string()));
        }
        text
    };
    assert_eq!(render(left), render(right));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fresh() {
        assert_eq!(
            normalize_fresh("<k> foo(_Gen12) ~> DotVar3 </k> X _Gen"),
            "<k> foo(_Gen#) ~> DotVar# </k> X _Gen"
        );
    }
}
