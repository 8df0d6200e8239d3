//! Stylesheet rule tree
//!
//! Parses stylesheet text into a generic tagged tree and serializes it
//! back. The tree deliberately has one shape for everything: a rule is a
//! prelude plus a body of child items, whether it is a style rule, an
//! `@media` block nesting further rules, or an `@font-face` block nesting
//! declarations. Consumers walk it with a single recursive visitor instead
//! of assuming a fixed schema, because nesting depth varies with the
//! stylesheet.
//!
//! Parsing is strict about structure (a declaration without a `:`, a bad
//! string/url token, trailing garbage all fail); a failed parse is the
//! signal for the stylesheet embedder to fall back to inlining the raw
//! text verbatim.

pub mod background;

use cssparser::{ParseError, Parser, ParserInput, Token};

use crate::error::CssParseError;

/// One node of the rule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CssItem {
    /// A rule with a block body: style rules and at-rules alike.
    Rule(CssRule),
    /// A `property: value` declaration.
    Declaration(CssDeclaration),
    /// A block-less at-rule kept as raw text, e.g. `@import "a.css"`.
    Statement(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    /// Everything before the opening brace: a selector list or an at-rule
    /// name with its prelude.
    pub prelude: String,
    pub body: Vec<CssItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CssDeclaration {
    pub property: String,
    pub value: String,
}

/// Parse stylesheet text into a rule tree.
pub fn parse_stylesheet(css: &str) -> Result<Vec<CssItem>, CssParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    parse_rule_list(&mut parser).map_err(|_| CssParseError)
}

/// Serialize a rule tree back to stylesheet text.
pub fn serialize(items: &[CssItem]) -> String {
    let mut out = String::new();
    write_items(&mut out, items, 0);
    out
}

/// Apply `f` to every declaration in the tree, depth-first in document
/// order. This is the one traversal every declaration-level operation is
/// built on.
pub fn for_each_declaration_mut<F>(items: &mut [CssItem], f: &mut F)
where
    F: FnMut(&mut CssDeclaration),
{
    for item in items.iter_mut() {
        match item {
            CssItem::Declaration(declaration) => f(declaration),
            CssItem::Rule(rule) => for_each_declaration_mut(&mut rule.body, f),
            CssItem::Statement(_) => {}
        }
    }
}

fn write_items(out: &mut String, items: &[CssItem], depth: usize) {
    for item in items {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match item {
            CssItem::Statement(text) => {
                out.push_str(text);
                out.push_str(";\n");
            }
            CssItem::Declaration(declaration) => {
                out.push_str(&declaration.property);
                out.push_str(": ");
                out.push_str(&declaration.value);
                out.push_str(";\n");
            }
            CssItem::Rule(rule) => {
                out.push_str(&rule.prelude);
                out.push_str(" {\n");
                write_items(out, &rule.body, depth + 1);
                for _ in 0..depth {
                    out.push_str("  ");
                }
                out.push_str("}\n");
            }
        }
    }
}

/// Whether a rule with this prelude nests further rules rather than
/// declarations.
fn block_holds_rules(prelude: &str) -> bool {
    match prelude.strip_prefix('@') {
        // Style rule bodies hold declarations.
        None => false,
        Some(rest) => {
            let name = rest
                .split(|c: char| c.is_whitespace() || c == '(')
                .next()
                .unwrap_or("")
                .to_ascii_lowercase();
            matches!(
                name.as_str(),
                "media" | "supports" | "document" | "layer" | "container" | "scope"
            ) || name.ends_with("keyframes")
        }
    }
}

fn parse_rule_list<'i>(parser: &mut Parser<'i, '_>) -> Result<Vec<CssItem>, ParseError<'i, ()>> {
    let mut items = Vec::new();
    let mut prelude_start = parser.position();

    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) | Token::Comment(_) => {
                // Skip leading trivia so preludes start at real content.
                if parser.slice(prelude_start..before).trim().is_empty() {
                    prelude_start = parser.position();
                }
            }
            Token::CurlyBracketBlock => {
                let prelude = parser.slice(prelude_start..before).trim().to_string();
                if prelude.is_empty() {
                    return Err(parser.new_custom_error(()));
                }
                let body = if block_holds_rules(&prelude) {
                    parser.parse_nested_block(|parser| parse_rule_list(parser))?
                } else {
                    parser.parse_nested_block(|parser| parse_declaration_list(parser))?
                };
                items.push(CssItem::Rule(CssRule { prelude, body }));
                prelude_start = parser.position();
            }
            Token::Semicolon => {
                let prelude = parser.slice(prelude_start..before).trim().to_string();
                if !prelude.is_empty() {
                    items.push(CssItem::Statement(prelude));
                }
                prelude_start = parser.position();
            }
            Token::BadString(_) | Token::BadUrl(_) => {
                return Err(parser.new_custom_error(()));
            }
            // Any other token accumulates into the prelude via slicing.
            _ => {}
        }
    }

    // A prelude that never reached a block or semicolon is trailing garbage.
    if !parser.slice_from(prelude_start).trim().is_empty() {
        return Err(parser.new_custom_error(()));
    }

    Ok(items)
}

fn parse_declaration_list<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<CssItem>, ParseError<'i, ()>> {
    let mut items = Vec::new();

    'declarations: loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        let property = match token {
            Token::WhiteSpace(_) | Token::Comment(_) | Token::Semicolon => continue,
            Token::Ident(name) => name.to_string(),
            _ => return Err(parser.new_custom_error(())),
        };

        let saw_colon = matches!(parser.next(), Ok(&Token::Colon));
        if !saw_colon {
            return Err(parser.new_custom_error(()));
        }

        let value_start = parser.position();
        loop {
            let before = parser.position();
            let next = match parser.next_including_whitespace() {
                Ok(token) => Some(token.clone()),
                Err(_) => None,
            };
            match next {
                None => {
                    // Block ended: the declaration runs to the end of it.
                    let value = parser.slice_from(value_start).trim().to_string();
                    if value.is_empty() {
                        return Err(parser.new_custom_error(()));
                    }
                    items.push(CssItem::Declaration(CssDeclaration { property, value }));
                    break 'declarations;
                }
                Some(Token::Semicolon) => {
                    let value = parser.slice(value_start..before).trim().to_string();
                    if value.is_empty() {
                        return Err(parser.new_custom_error(()));
                    }
                    items.push(CssItem::Declaration(CssDeclaration { property, value }));
                    break;
                }
                Some(Token::CurlyBracketBlock) | Some(Token::BadString(_))
                | Some(Token::BadUrl(_)) => {
                    return Err(parser.new_custom_error(()));
                }
                // Function and bracket tokens are skipped whole; the value
                // is reconstructed from the source slice.
                Some(_) => {}
            }
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_style_rules() {
        let tree = parse_stylesheet("body { color: red; margin: 0 }").unwrap();
        assert_eq!(tree.len(), 1);
        match &tree[0] {
            CssItem::Rule(rule) => {
                assert_eq!(rule.prelude, "body");
                assert_eq!(
                    rule.body,
                    vec![
                        CssItem::Declaration(CssDeclaration {
                            property: "color".into(),
                            value: "red".into(),
                        }),
                        CssItem::Declaration(CssDeclaration {
                            property: "margin".into(),
                            value: "0".into(),
                        }),
                    ]
                );
            }
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn media_blocks_nest_rules() {
        let css = "@media (min-width: 600px) { .hero { background: url(a.png); } }";
        let tree = parse_stylesheet(css).unwrap();
        let media = match &tree[0] {
            CssItem::Rule(rule) => rule,
            other => panic!("expected rule, got {other:?}"),
        };
        assert_eq!(media.prelude, "@media (min-width: 600px)");
        let hero = match &media.body[0] {
            CssItem::Rule(rule) => rule,
            other => panic!("expected nested rule, got {other:?}"),
        };
        assert_eq!(hero.prelude, ".hero");
        assert!(matches!(&hero.body[0], CssItem::Declaration(d) if d.property == "background"));
    }

    #[test]
    fn import_is_preserved_as_statement() {
        let tree = parse_stylesheet("@import \"reset.css\";\nbody { color: blue; }").unwrap();
        assert_eq!(tree[0], CssItem::Statement("@import \"reset.css\"".into()));
    }

    #[test]
    fn font_face_body_holds_declarations() {
        let tree = parse_stylesheet("@font-face { font-family: X; src: url(x.woff2); }").unwrap();
        let rule = match &tree[0] {
            CssItem::Rule(rule) => rule,
            other => panic!("expected rule, got {other:?}"),
        };
        assert!(matches!(&rule.body[1], CssItem::Declaration(d) if d.property == "src"));
    }

    #[test]
    fn declaration_values_keep_functions_whole() {
        let tree =
            parse_stylesheet(".a { background: #fff url(\"x.png\") no-repeat; }").unwrap();
        let rule = match &tree[0] {
            CssItem::Rule(rule) => rule,
            other => panic!("expected rule, got {other:?}"),
        };
        match &rule.body[0] {
            CssItem::Declaration(d) => {
                assert_eq!(d.value, "#fff url(\"x.png\") no-repeat");
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn missing_colon_is_a_parse_error() {
        assert!(parse_stylesheet("body { color red }").is_err());
    }

    #[test]
    fn trailing_garbage_is_a_parse_error() {
        assert!(parse_stylesheet("body { color: red; } stray-selector").is_err());
    }

    #[test]
    fn visitor_reaches_nested_declarations() {
        let css = "a { color: red; } @media screen { b { color: blue; } }";
        let mut tree = parse_stylesheet(css).unwrap();
        let mut seen = Vec::new();
        for_each_declaration_mut(&mut tree, &mut |decl| seen.push(decl.value.clone()));
        assert_eq!(seen, vec!["red", "blue"]);
    }

    #[test]
    fn serialized_tree_reparses_to_the_same_tree() {
        let css = "@media screen { .a { background: url(a.png); } }\n.b { color: #123456; }";
        let tree = parse_stylesheet(css).unwrap();
        let reparsed = parse_stylesheet(&serialize(&tree)).unwrap();
        assert_eq!(tree, reparsed);
    }
}
