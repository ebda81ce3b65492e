use bumpalo::collections::Vec as ArenaVec;

use crate::arena::Arena;
use crate::error::{Error, ErrorCode};
use crate::node::{Node, NodeKind};
use crate::token::{Token, TokenKind};

const TRUE: &str = "true";
const FALSE: &str = "false";
const NIL: &str = "nil";

/// Parses one top-level form out of `tokens`.
///
/// `offset` is left on the last token of the parsed form; `depth` tracks
/// open parentheses so unbalanced input is caught once the form ends.
/// An empty token stream parses to `None`.
pub fn parse<'a>(
    arena: &'a Arena,
    tokens: &[Token<'a>],
    offset: &mut usize,
    depth: &mut usize,
) -> Result<Option<Node<'a>>, Error> {
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_form(arena, tokens, offset, depth).map(Some)
}

fn parse_form<'a>(
    arena: &'a Arena,
    tokens: &[Token<'a>],
    offset: &mut usize,
    depth: &mut usize,
) -> Result<Node<'a>, Error> {
    let first = tokens[*offset];
    let initial_depth = *depth;

    let node = match first.kind {
        TokenKind::LParen => parse_list(arena, tokens, offset, depth)?,
        TokenKind::RParen => {
            return Err(Error::at(
                ErrorCode::SyntaxUnbalancedParentheses,
                first.position,
                "Unbalanced parentheses".to_string(),
            ));
        }
        _ => parse_atom(first),
    };

    if initial_depth == 0 {
        // Open parens that never closed.
        if *depth != initial_depth {
            return Err(Error::at(
                ErrorCode::SyntaxUnbalancedParentheses,
                first.position,
                "Unbalanced parentheses".to_string(),
            ));
        }

        // Dangling tokens after the top-level form.
        if *offset + 1 < tokens.len() {
            let next = tokens[*offset + 1];
            if next.kind == TokenKind::RParen {
                return Err(Error::at(
                    ErrorCode::SyntaxUnbalancedParentheses,
                    first.position,
                    "Unbalanced parentheses".to_string(),
                ));
            }
            return Err(Error::at(
                ErrorCode::SyntaxUnexpectedToken,
                next.position,
                "Unexpected token at the end of input".to_string(),
            ));
        }
    }

    Ok(node)
}

fn parse_list<'a>(
    arena: &'a Arena,
    tokens: &[Token<'a>],
    offset: &mut usize,
    depth: &mut usize,
) -> Result<Node<'a>, Error> {
    let first = tokens[*offset];
    let mut children = ArenaVec::new_in(arena.bump());

    *depth += 1;
    *offset += 1;

    while *offset < tokens.len() {
        if tokens[*offset].kind == TokenKind::RParen {
            *depth -= 1;
            break;
        }

        let child = parse_form(arena, tokens, offset, depth)?;
        children.push(child);
        *offset += 1;
    }

    Ok(Node::new(
        NodeKind::List(children.into_bump_slice()),
        first.position,
    ))
}

fn parse_atom<'a>(token: Token<'a>) -> Node<'a> {
    let kind = match token.kind {
        TokenKind::Number(number) => NodeKind::Number(number),
        TokenKind::Str(text) => NodeKind::Str(text),
        TokenKind::Symbol(TRUE) => NodeKind::Boolean(true),
        TokenKind::Symbol(FALSE) => NodeKind::Boolean(false),
        TokenKind::Symbol(NIL) => NodeKind::Nil,
        TokenKind::Symbol(name) => NodeKind::Symbol(name),
        TokenKind::LParen | TokenKind::RParen => unreachable!(),
    };
    Node::new(kind, token.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::position::Position;

    fn parse_source<'a>(arena: &'a Arena, source: &str) -> Result<Option<Node<'a>>, Error> {
        let tokens = tokenize(arena, source)?;
        let mut offset = 0;
        let mut depth = 0;
        parse(arena, &tokens, &mut offset, &mut depth)
    }

    #[test]
    fn empty_token_stream_parses_to_none() {
        let arena = Arena::new();
        assert!(parse_source(&arena, "").unwrap().is_none());
    }

    #[test]
    fn parses_number_atom() {
        let arena = Arena::new();
        let node = parse_source(&arena, "42").unwrap().unwrap();
        assert_eq!(node.kind, NodeKind::Number(42.0));
        assert_eq!(node.position, Position::new(1, 1));
    }

    #[test]
    fn promotes_reserved_symbols() {
        let arena = Arena::new();
        assert_eq!(
            parse_source(&arena, "true").unwrap().unwrap().kind,
            NodeKind::Boolean(true)
        );
        assert_eq!(
            parse_source(&arena, "false").unwrap().unwrap().kind,
            NodeKind::Boolean(false)
        );
        assert_eq!(parse_source(&arena, "nil").unwrap().unwrap().kind, NodeKind::Nil);
    }

    #[test]
    fn promotion_requires_exact_match() {
        let arena = Arena::new();
        assert_eq!(
            parse_source(&arena, "truex").unwrap().unwrap().kind,
            NodeKind::Symbol("truex")
        );
    }

    #[test]
    fn parses_string_atom() {
        let arena = Arena::new();
        let node = parse_source(&arena, "\"hi\"").unwrap().unwrap();
        assert_eq!(node.kind, NodeKind::Str("hi"));
    }

    #[test]
    fn parses_empty_list() {
        let arena = Arena::new();
        let node = parse_source(&arena, "()").unwrap().unwrap();
        match node.kind {
            NodeKind::List(children) => assert!(children.is_empty()),
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn parses_nested_list_with_inherited_positions() {
        let arena = Arena::new();
        let node = parse_source(&arena, "(+ 1 (+ 2 3))").unwrap().unwrap();
        assert_eq!(node.position, Position::new(1, 1));
        match node.kind {
            NodeKind::List(children) => {
                assert_eq!(children.len(), 3);
                assert_eq!(children[0].kind, NodeKind::Symbol("+"));
                assert_eq!(children[2].position, Position::new(1, 6));
                match children[2].kind {
                    NodeKind::List(inner) => assert_eq!(inner.len(), 3),
                    other => panic!("expected a list, got {:?}", other),
                }
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn unclosed_list_is_unbalanced() {
        let arena = Arena::new();
        let error = parse_source(&arena, "((1 2)").unwrap_err();
        assert_eq!(error.code, ErrorCode::SyntaxUnbalancedParentheses);
    }

    #[test]
    fn trailing_rparen_is_unbalanced() {
        let arena = Arena::new();
        let error = parse_source(&arena, "(1 2))").unwrap_err();
        assert_eq!(error.code, ErrorCode::SyntaxUnbalancedParentheses);
    }

    #[test]
    fn lone_rparen_is_unbalanced() {
        let arena = Arena::new();
        let error = parse_source(&arena, ")").unwrap_err();
        assert_eq!(error.code, ErrorCode::SyntaxUnbalancedParentheses);
    }

    #[test]
    fn dangling_token_is_unexpected_at_its_position() {
        let arena = Arena::new();
        let error = parse_source(&arena, "(1) 2").unwrap_err();
        assert_eq!(error.code, ErrorCode::SyntaxUnexpectedToken);
        assert_eq!(error.position, Some(Position::new(1, 5)));
    }

    #[test]
    fn all_node_positions_are_at_least_one_one() {
        let arena = Arena::new();
        let node = parse_source(&arena, "(def! x\n  (+ 1 2))").unwrap().unwrap();

        fn check(node: &Node<'_>) {
            assert!(node.position.line >= 1);
            assert!(node.position.column >= 1);
            if let NodeKind::List(children) = node.kind {
                for child in children {
                    check(child);
                }
            }
        }
        check(&node);
    }
}
