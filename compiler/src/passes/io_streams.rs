//! Explicit stream items for `stream` cells.

use super::transform_sentences;
use crate::{Pass, PassError, PassResult};
use kompile_core::{keys, sorts, Sort};
use kompile_definition::{labels, Cell, Configuration, Definition, Production, Sentence, Term};
use log::debug;

/// Configuration cells tagged `stream="stdin"` or `stream="stdout"` get an
/// `#istream(0)` / `#ostream(1)` list item appended to their initial
/// content. The list and stream productions this relies on are added to
/// the main module when it cannot see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveIoStreams;

const NAME: &str = "resolve-io-streams";

fn stream_item(cell: &Cell, stream: &str) -> PassResult<Term> {
    let item = match stream {
        "stdin" => Term::apply(labels::ISTREAM, vec![Term::int(0)]),
        "stdout" => Term::apply(labels::OSTREAM, vec![Term::int(1)]),
        other => return Err(PassError::unknown_stream(&cell.name, other)),
    };
    Ok(Term::apply(labels::LIST_ITEM, vec![item]))
}

fn is_empty_list(term: &Term) -> bool {
    match term {
        Term::Bag(items) => items.is_empty(),
        Term::Apply(a) => a.label == ".List" && a.args.is_empty(),
        _ => false,
    }
}

fn has_stream_item(term: &Term) -> bool {
    term.any(&|t| matches!(t.top_label(), Some(labels::ISTREAM) | Some(labels::OSTREAM)))
}

fn attach_stream(cell: Cell, stream: &str) -> PassResult<Term> {
    if has_stream_item(&cell.body) {
        return Ok(Term::Cell(cell));
    }
    let item = stream_item(&cell, stream)?;
    let body = if is_empty_list(&cell.body) {
        item
    } else {
        Term::apply(labels::LIST_CONCAT, vec![*cell.body, item])
    };
    Ok(Term::Cell(Cell {
        body: Box::new(body),
        ..cell
    }))
}

fn stream_productions() -> Vec<Production> {
    let list = || Sort::new(sorts::LIST);
    vec![
        Production::new(sorts::STREAM, labels::ISTREAM, vec![Sort::int()]),
        Production::new(sorts::STREAM, labels::OSTREAM, vec![Sort::int()]),
        Production::new(sorts::LIST, ".List", Vec::new()),
        Production::new(sorts::LIST, labels::LIST_ITEM, vec![Sort::k()]),
        Production::new(sorts::LIST, labels::LIST_CONCAT, vec![list(), list()]),
    ]
}

impl Pass for ResolveIoStreams {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&self, definition: &Definition) -> PassResult<Definition> {
        let mut streams = 0;
        let resolved = transform_sentences(definition, |_, _, sentence| {
            let Sentence::Configuration(configuration) = sentence else {
                return Ok(vec![sentence.clone()]);
            };
            let body = configuration.body.clone().try_transform(
                &mut |term: Term| -> PassResult<Term> {
                    let Term::Cell(cell) = term else {
                        return Ok(term);
                    };
                    let stream = cell.attributes.get_str(keys::STREAM)?.map(str::to_string);
                    match stream {
                        Some(stream) => {
                            streams += 1;
                            attach_stream(cell, &stream)
                        }
                        None => Ok(Term::Cell(cell)),
                    }
                },
            )?;
            Ok(vec![Sentence::Configuration(Configuration {
                body,
                attributes: configuration.attributes.clone(),
            })])
        })?;

        if streams == 0 {
            return Ok(resolved);
        }

        let main = resolved.main_module_name();
        let missing: Vec<Sentence> = stream_productions()
            .into_iter()
            .filter(|p| {
                !resolved
                    .visible_productions(main)
                    .any(|visible| visible.klabel == p.klabel)
            })
            .map(Sentence::Production)
            .collect();
        debug!(
            "{} stream cells, {} stream productions added to {}",
            streams,
            missing.len(),
            main
        );
        if missing.is_empty() {
            return Ok(resolved);
        }
        let main_module = resolved.main_module().with_sentences(missing);
        Ok(resolved.with_module(main_module)?)
    }
}
