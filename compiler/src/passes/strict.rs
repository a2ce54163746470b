//! `strict` and `seqstrict` productions become contexts.

use super::transform_sentences;
use crate::{Pass, PassError, PassResult};
use kompile_core::keys;
use kompile_definition::{labels, Context, Definition, Production, Sentence, Term};

/// For every strict position of a production, a context with `HOLE` at
/// that position and anonymous variables elsewhere. Under `seqstrict`,
/// earlier strict positions are named `K<i>` and must be results.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveStrict;

const NAME: &str = "resolve-strict";

struct Strictness {
    positions: Vec<u32>,
    sequential: bool,
}

fn strictness(production: &Production) -> PassResult<Option<Strictness>> {
    let (key, sequential) = if production.attributes.contains(keys::SEQSTRICT) {
        (keys::SEQSTRICT, true)
    } else if production.attributes.contains(keys::STRICT) {
        (keys::STRICT, false)
    } else {
        return Ok(None);
    };

    let label = production.klabel.as_deref().ok_or_else(|| {
        PassError::malformed(format!("{} on a production without a label: {}", key, production))
    })?;
    let arity = production.arity();
    let positions: Vec<u32> = match production.attributes.get_ints(key)? {
        Some(listed) if !listed.is_empty() => listed.to_vec(),
        _ => (1..=arity as u32).collect(),
    };
    if let Some(&bad) = positions
        .iter()
        .find(|&&p| p == 0 || p as usize > arity)
    {
        return Err(PassError::strict_position(label, bad, arity));
    }
    Ok(Some(Strictness {
        positions,
        sequential,
    }))
}

fn result_variable(position: u32) -> String {
    format!("K{}", position)
}

fn contexts_for(label: &str, arity: usize, strictness: &Strictness) -> Vec<Context> {
    let mut contexts = Vec::with_capacity(strictness.positions.len());
    for (i, &position) in strictness.positions.iter().enumerate() {
        let earlier = if strictness.sequential {
            &strictness.positions[..i]
        } else {
            &[][..]
        };
        let args = (1..=arity as u32)
            .map(|j| {
                if j == position {
                    Term::var(labels::HOLE)
                } else if earlier.contains(&j) {
                    Term::var(result_variable(j))
                } else {
                    Term::var(labels::ANONYMOUS)
                }
            })
            .collect();

        let mut context = Context::new(Term::apply(label, args));
        context.requires = earlier.iter().fold(None, |acc, &q| {
            Some(Term::and_bool(
                acc,
                Term::apply(labels::IS_KRESULT, vec![Term::var(result_variable(q))]),
            ))
        });
        contexts.push(context);
    }
    contexts
}

impl Pass for ResolveStrict {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        transform_sentences(definition, |_, _, sentence| {
            let Sentence::Production(production) = sentence else {
                return Ok(vec![sentence.clone()]);
            };
            let (Some(strictness), Some(label)) = (strictness(production)?, &production.klabel)
            else {
                return Ok(vec![sentence.clone()]);
            };
            let mut out = vec![sentence.clone()];
            out.extend(
                contexts_for(label, production.arity(), &strictness)
                    .into_iter()
                    .map(Sentence::Context),
            );
            Ok(out)
        })
    }
}
