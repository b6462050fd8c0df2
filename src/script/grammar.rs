//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::hierarchy::NodeId;

use super::ast::*;
use super::error::ParseError;
use super::lexer::Token;

/// Parse script source into commands
pub fn parse(input: &str) -> Result<Script, Vec<ParseError>> {
    let len = input.len();

    let token_iter = super::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Split (Token, SimpleSpan) into token and span parts
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    script_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn script_parser<'a, I>() -> impl Parser<'a, I, Script, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let node_ref = select! {
        Token::Ident(s) => NodeId::new(s),
        Token::String(s) => NodeId::new(s),
    }
    .labelled("id")
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let boolean = choice((just(Token::True).to(true), just(Token::False).to(false)))
        .labelled("true or false");

    let option = select! {
        Token::Ident(s) => s,
    }
    .map_with(|key, e| Spanned::new(key, span_range(&e.span())))
    .then_ignore(just(Token::Colon))
    .then(boolean);

    let options = option
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose));

    let move_cmd = just(Token::Move)
        .ignore_then(node_ref.clone())
        .then_ignore(just(Token::Arrow))
        .then(node_ref.clone())
        .then(options.or_not())
        .try_map(|((node, target), options), _| {
            let mut with_children = true;
            for (key, value) in options.unwrap_or_default() {
                match key.node.as_str() {
                    "with_children" => with_children = value,
                    other => {
                        return Err(Rich::custom(
                            SimpleSpan::from(key.span.clone()),
                            format!("unknown option '{other}'"),
                        ))
                    }
                }
            }
            Ok(Command::Move {
                node,
                target,
                with_children,
            })
        });

    let bulk = just(Token::Bulk)
        .ignore_then(
            node_ref
                .clone()
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then_ignore(just(Token::Arrow))
        .then(node_ref.clone())
        .map(|(nodes, target)| Command::Bulk { nodes, target });

    let swap = just(Token::Swap)
        .ignore_then(node_ref.clone())
        .then_ignore(just(Token::ArrowBoth))
        .then(node_ref.clone())
        .map(|(manager1, manager2)| Command::Swap { manager1, manager2 });

    let assign = just(Token::Assign).ignore_then(choice((
        just(Token::Team)
            .ignore_then(node_ref.clone())
            .then_ignore(just(Token::Arrow))
            .then(node_ref.clone())
            .map(|(old_manager, new_manager)| Command::AssignTeam {
                old_manager,
                new_manager,
            }),
        just(Token::Person)
            .ignore_then(node_ref.clone())
            .then_ignore(just(Token::Arrow))
            .then(node_ref.clone())
            .map(|(person, manager)| Command::AssignPerson { person, manager }),
    )));

    let select_cmd = just(Token::Select)
        .ignore_then(node_ref.clone())
        .map(Command::Select);

    let focus = just(Token::Focus)
        .ignore_then(choice((
            just(Token::Root).to(None),
            node_ref.clone().map(Some),
        )))
        .map(Command::Focus);

    let zoom = just(Token::Zoom).ignore_then(choice((
        just(Token::In).to(Command::ZoomIn),
        just(Token::Out).to(Command::ZoomOut),
    )));

    let simple = choice((
        just(Token::Clear).to(Command::Clear),
        just(Token::Undo).to(Command::Undo),
        just(Token::Redo).to(Command::Redo),
        just(Token::Save).to(Command::Save),
        just(Token::Reset).to(Command::Reset),
    ));

    let command = choice((move_cmd, bulk, swap, assign, select_cmd, focus, zoom, simple))
        .map_with(|command, e| Spanned::new(command, span_range(&e.span())));

    command
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|commands| Script { commands })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    #[test]
    fn test_parse_move_defaults_to_children() {
        let script = parse("move C -> Root").expect("Should parse");
        assert_eq!(script.commands.len(), 1);
        match &script.commands[0].node {
            Command::Move {
                node,
                target,
                with_children,
            } => {
                assert_eq!(node.node, id("C"));
                assert_eq!(node.span, 5..6);
                assert_eq!(target.node, id("Root"));
                assert!(*with_children);
            }
            other => panic!("Expected Move, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_move_without_children() {
        let script = parse("move B -> Root [with_children: false]").expect("Should parse");
        assert!(matches!(
            script.commands[0].node,
            Command::Move {
                with_children: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unknown_option() {
        assert!(parse("move B -> Root [keep: true]").is_err());
        assert!(parse("move B -> Root [with_children: true]").is_ok());
    }

    #[test]
    fn test_parse_bulk_and_server_ops() {
        let script = parse(
            r#"bulk X, "Y Z" -> T
               swap M1 <-> M2
               assign team OLD -> NEW
               assign person P -> M"#,
        )
        .expect("Should parse");
        assert_eq!(script.commands.len(), 4);
        match &script.commands[0].node {
            Command::Bulk { nodes, target } => {
                assert_eq!(nodes.len(), 2);
                assert_eq!(nodes[1].node, id("Y Z"));
                assert_eq!(target.node, id("T"));
            }
            other => panic!("Expected Bulk, got {:?}", other),
        }
        assert!(matches!(script.commands[1].node, Command::Swap { .. }));
        assert!(matches!(script.commands[2].node, Command::AssignTeam { .. }));
        assert!(matches!(script.commands[3].node, Command::AssignPerson { .. }));
    }

    #[test]
    fn test_parse_viewport_and_history() {
        let script = parse("focus root focus A zoom in zoom out reset undo redo save select A clear")
            .expect("Should parse");
        let names: Vec<_> = script.commands.iter().map(|c| c.node.name()).collect();
        assert_eq!(
            names,
            vec![
                "focus", "focus", "zoom in", "zoom out", "reset", "undo", "redo", "save",
                "select", "clear"
            ]
        );
        assert_eq!(script.commands[0].node, Command::Focus(None));
    }

    #[test]
    fn test_parse_error_has_span() {
        let errs = parse("move A B").unwrap_err();
        let ParseError::Syntax { span, .. } = &errs[0];
        assert_eq!(span.clone(), 7..8);
    }

    #[test]
    fn test_keyword_as_id_is_rejected() {
        let errs = parse("select undo").unwrap_err();
        let ParseError::Syntax { message, .. } = &errs[0];
        assert!(message.contains("keyword"), "{message}");
    }
}
