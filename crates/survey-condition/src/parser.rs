//! Condition sentence parser.
//!
//! Parsing runs in two passes. A nom lexer splits the sentence into
//! parentheses, comparator symbols and words. The words are then classified
//! (conjunction keyword, no-response marker, number, prompt id) into
//! [`FragmentBuilder`]s and folded left to right with the merge protocol.
//! Every parenthetical is folded on its own and re-enters the outer fold as
//! a finished sub-tree.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{all_consuming, map, opt, recognize, value},
    sequence::{pair, tuple},
    IResult,
};

use crate::ast::{Comparator, Fragment, NoResponse, NumberLiteral, Terminal};
use crate::builder::FragmentBuilder;
use crate::error::{ConditionError, ConditionResult};
use crate::grammar::Grammar;

/// Parse a condition sentence with the default [`Grammar`].
///
/// # Examples
///
/// ```rust
/// use survey_condition::{parse, Fragment};
///
/// let tree = parse("mood == 3 AND (sleep < 6 OR energy <= 2)").unwrap();
/// assert!(matches!(tree, Fragment::And(_, _)));
/// assert_eq!(tree.to_string(), "mood == 3 AND (sleep < 6 OR energy <= 2)");
///
/// assert!(parse("mood ==").is_err());
/// ```
pub fn parse(input: &str) -> ConditionResult<Fragment> {
    parse_with(input, &Grammar::default())
}

/// Parse a condition sentence with a custom [`Grammar`].
pub fn parse_with(input: &str, grammar: &Grammar) -> ConditionResult<Fragment> {
    if input.trim().is_empty() {
        return Err(ConditionError::EmptyCondition);
    }

    let opens = input.matches('(').count();
    if opens != input.matches(')').count() {
        return Err(ConditionError::UnbalancedParentheses(input.to_string()));
    }

    let tokens = tokenize(input)?;

    // Each conjunction and each parenthetical can add at most one level.
    let conjunctions = tokens
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Word(w) if grammar.is_conjunction(w)))
        .count();
    if conjunctions + opens + 1 > grammar.max_depth() {
        return Err(ConditionError::TooDeep {
            limit: grammar.max_depth(),
        });
    }

    let mut cursor = 0;
    let fragment = assemble(input, &tokens, &mut cursor, grammar, false)?;
    tracing::debug!(
        sentence = input,
        depth = fragment.depth(),
        "parsed condition"
    );
    Ok(fragment)
}

// ============================================================================
// Lexing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind<'a> {
    Open,
    Close,
    Comparator(Comparator),
    Word(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Token<'a> {
    position: usize,
    kind: TokenKind<'a>,
}

fn tokenize(input: &str) -> ConditionResult<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = input;

    loop {
        let (after_ws, _) = ws(rest).map_err(|_| lex_error(input, rest))?;
        if after_ws.is_empty() {
            break;
        }
        let position = input.len() - after_ws.len();
        match token(after_ws) {
            Ok((remaining, kind)) => {
                tokens.push(Token { position, kind });
                rest = remaining;
            }
            Err(_) => return Err(lex_error(input, after_ws)),
        }
    }

    Ok(tokens)
}

fn lex_error(input: &str, rest: &str) -> ConditionError {
    ConditionError::ParseError {
        position: input.len() - rest.len(),
        message: format!("unexpected input at: '{}'", truncate(rest, 20)),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn token(input: &str) -> IResult<&str, TokenKind<'_>> {
    alt((
        value(TokenKind::Open, char('(')),
        value(TokenKind::Close, char(')')),
        map(comparator, TokenKind::Comparator),
        map(word, TokenKind::Word),
    ))(input)
}

fn comparator(input: &str) -> IResult<&str, Comparator> {
    alt((
        value(Comparator::Equals, tag("==")),
        value(Comparator::NotEquals, tag("!=")),
        value(Comparator::LessThanEquals, tag("<=")),
        value(Comparator::GreaterThanEquals, tag(">=")),
        value(Comparator::LessThan, char('<')),
        value(Comparator::GreaterThan, char('>')),
    ))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"()<>=!".contains(c))(input)
}

/// Optional whitespace
fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

// ============================================================================
// Word classification
// ============================================================================

fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        opt(take_while1(|c: char| c.is_alphanumeric() || c == '_')),
    ))(input)
}

fn classify(input: &str, token: &Token<'_>, word: &str, grammar: &Grammar) -> ConditionResult<FragmentBuilder> {
    if let Some(builder) = grammar.conjunction_builder(word) {
        return Ok(builder);
    }
    if let Some(marker) = NoResponse::from_word(word) {
        return Ok(FragmentBuilder::terminal(Terminal::NoResponse(marker)));
    }
    if all_consuming(number)(word).is_ok() {
        if let Some(literal) = NumberLiteral::parse(word) {
            return Ok(FragmentBuilder::terminal(Terminal::Number(literal)));
        }
    }
    if all_consuming(identifier)(word).is_ok() {
        return Ok(FragmentBuilder::terminal(Terminal::prompt_id(word)));
    }
    Err(ConditionError::ParseError {
        position: token.position,
        message: format!(
            "'{}' is not a prompt id, number, marker or conjunction in: {}",
            word,
            truncate(input, 60)
        ),
    })
}

// ============================================================================
// Assembly
// ============================================================================

/// Folds tokens from `cursor` until the end of input or the `)` that closes
/// the current parenthetical.
fn assemble(
    input: &str,
    tokens: &[Token<'_>],
    cursor: &mut usize,
    grammar: &Grammar,
    nested: bool,
) -> ConditionResult<Fragment> {
    let mut root: Option<FragmentBuilder> = None;
    let mut closed = false;

    while let Some(token) = tokens.get(*cursor) {
        *cursor += 1;
        let builder = match token.kind {
            TokenKind::Open => {
                let inner = assemble(input, tokens, cursor, grammar, true)?;
                FragmentBuilder::nested(inner)
            }
            TokenKind::Close => {
                if !nested {
                    return Err(ConditionError::UnbalancedParentheses(input.to_string()));
                }
                closed = true;
                break;
            }
            TokenKind::Comparator(c) => FragmentBuilder::comparison(c),
            TokenKind::Word(w) => classify(input, token, w, grammar)?,
        };

        root = Some(match root {
            None => builder,
            Some(acc) => acc.merge(builder)?,
        });
    }

    if nested && !closed {
        return Err(ConditionError::UnbalancedParentheses(input.to_string()));
    }

    root.ok_or(ConditionError::EmptyCondition)?.build()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConjunctionKind, Leaf};
    use crate::error::Side;

    mod lexing {
        use super::*;

        #[test]
        fn test_tokens_without_spaces() {
            let tokens = tokenize("q1>=3").unwrap();
            let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    TokenKind::Word("q1"),
                    TokenKind::Comparator(Comparator::GreaterThanEquals),
                    TokenKind::Word("3"),
                ]
            );
        }

        #[test]
        fn test_token_positions() {
            let tokens = tokenize("  (a == 1)").unwrap();
            let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
            assert_eq!(positions, vec![2, 3, 5, 8, 9]);
        }

        #[test]
        fn test_lone_equals_is_error() {
            let err = tokenize("a = 1").unwrap_err();
            assert!(matches!(err, ConditionError::ParseError { position: 2, .. }));
        }

        #[test]
        fn test_whitespace_variants() {
            let tokens = tokenize("a\t==\r\n1").unwrap();
            assert_eq!(tokens.len(), 3);
        }
    }

    mod simple_conditions {
        use super::*;

        #[test]
        fn test_single_comparison() {
            let tree = parse("q1 == 5").unwrap();
            match tree {
                Fragment::Leaf(Leaf::Comparison(c)) => {
                    assert_eq!(c.left, Terminal::prompt_id("q1"));
                    assert_eq!(c.comparator, Comparator::Equals);
                    assert_eq!(c.right, Terminal::number(5));
                }
                other => panic!("Expected comparison, got {:?}", other),
            }
        }

        #[test]
        fn test_bare_prompt_id() {
            let tree = parse("q1").unwrap();
            assert_eq!(tree, Fragment::terminal(Terminal::prompt_id("q1")));
        }

        #[test]
        fn test_skip_marker() {
            let tree = parse("q1 == SKIPPED").unwrap();
            assert_eq!(
                tree,
                Fragment::comparison(
                    Terminal::prompt_id("q1"),
                    Comparator::Equals,
                    Terminal::NoResponse(NoResponse::Skipped)
                )
            );
        }

        #[test]
        fn test_decimal_and_negative_literals() {
            let tree = parse("q1 > -2.5").unwrap();
            assert_eq!(tree.to_string(), "q1 > -2.5");
        }

        #[test]
        fn test_all_comparators() {
            for c in Comparator::ALL {
                let sentence = format!("q1 {} 1", c);
                let tree = parse(&sentence).unwrap();
                assert_eq!(tree.to_string(), sentence);
            }
        }
    }

    mod compound_conditions {
        use super::*;

        #[test]
        fn test_and_of_two() {
            let tree = parse("a == 1 AND b == 2").unwrap();
            assert!(matches!(tree, Fragment::And(_, _)));
        }

        #[test]
        fn test_chain_nests_right() {
            let tree = parse("a AND b AND c").unwrap();
            match tree {
                Fragment::And(left, right) => {
                    assert_eq!(*left, Fragment::terminal(Terminal::prompt_id("a")));
                    assert!(matches!(*right, Fragment::And(_, _)));
                }
                other => panic!("Expected And, got {:?}", other),
            }
        }

        #[test]
        fn test_mixed_conjunctions_nest_right() {
            let tree = parse("a OR b AND c").unwrap();
            match tree {
                Fragment::Or(_, right) => assert!(matches!(*right, Fragment::And(_, _))),
                other => panic!("Expected Or, got {:?}", other),
            }
        }

        #[test]
        fn test_parenthetical_groups_left() {
            let tree = parse("(a OR b) AND c").unwrap();
            match tree {
                Fragment::And(left, _) => match *left {
                    Fragment::Nested(inner) => assert!(matches!(*inner, Fragment::Or(_, _))),
                    other => panic!("Expected Nested, got {:?}", other),
                },
                other => panic!("Expected And, got {:?}", other),
            }
        }

        #[test]
        fn test_nested_parentheticals() {
            let tree = parse("((a == 1))").unwrap();
            assert_eq!(tree.to_string(), "((a == 1))");
            assert_eq!(tree.depth(), 3);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_empty() {
            assert_eq!(parse("").unwrap_err(), ConditionError::EmptyCondition);
            assert_eq!(parse("   ").unwrap_err(), ConditionError::EmptyCondition);
            assert_eq!(parse("()").unwrap_err(), ConditionError::EmptyCondition);
        }

        #[test]
        fn test_unbalanced() {
            assert!(matches!(
                parse("(a == 1").unwrap_err(),
                ConditionError::UnbalancedParentheses(_)
            ));
            assert!(matches!(
                parse("a == 1)").unwrap_err(),
                ConditionError::UnbalancedParentheses(_)
            ));
            assert!(matches!(
                parse(")a == 1(").unwrap_err(),
                ConditionError::UnbalancedParentheses(_)
            ));
        }

        #[test]
        fn test_missing_right_operand() {
            assert_eq!(
                parse("a == 1 AND").unwrap_err(),
                ConditionError::MissingOperand {
                    construct: "and",
                    side: Side::Right
                }
            );
        }

        #[test]
        fn test_missing_comparison_operand() {
            assert_eq!(
                parse("== 1").unwrap_err(),
                ConditionError::MissingOperand {
                    construct: "equals",
                    side: Side::Right
                }
            );
        }

        #[test]
        fn test_two_terminals() {
            assert!(matches!(
                parse("a b").unwrap_err(),
                ConditionError::ConsecutiveTerminals(_)
            ));
        }

        #[test]
        fn test_invalid_word() {
            let err = parse("a == 1 AND 3x").unwrap_err();
            assert!(matches!(err, ConditionError::ParseError { position: 11, .. }));
        }

        #[test]
        fn test_too_deep() {
            let sentence = vec!["a"; 300].join(" AND ");
            assert_eq!(
                parse(&sentence).unwrap_err(),
                ConditionError::TooDeep {
                    limit: crate::grammar::DEFAULT_MAX_DEPTH
                }
            );

            let grammar = Grammar::default().with_max_depth(1_000);
            assert!(parse_with(&sentence, &grammar).is_ok());
        }
    }

    #[test]
    fn test_custom_grammar_keyword() {
        let grammar = Grammar::default().with_conjunction("ALSO", ConjunctionKind::And);
        let tree = parse_with("a ALSO b", &grammar).unwrap();
        assert_eq!(tree.to_string(), "a AND b");
    }
}
