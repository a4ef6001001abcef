//! Tokenizer and parser phase tests over whole programs.

use lumen_ir::{NodeKind, TokenKind};
use lumen_types::Project;
use lumenc::render::{render_tokens, render_tree};
use pretty_assertions::assert_eq;

const COUNTER: &str = "\
¶Counts presses¶
clicks•#: 0 … ∆ Button() … . + 1
label: clicks → ''
[clicks label]";

#[test]
fn printing_reproduces_the_source() {
    let project = Project::parse(COUNTER);
    assert_eq!(project.main().program.print(), COUNTER);
    assert_eq!(lumen_lexer::lex(COUNTER).source(), COUNTER);
}

#[test]
fn tokens_end_with_end() {
    let tokens = lumen_lexer::lex("x: 1");
    let last = tokens.iter().last().unwrap();
    assert_eq!(last.kind, TokenKind::End);
    assert_eq!(render_tokens(&tokens).lines().count(), tokens.len());
}

#[test]
fn statements_are_top_level_children() {
    let project = Project::parse(COUNTER);
    let statements = project.main().statements();
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[1].kind(), NodeKind::Bind(_)));
    assert!(matches!(statements[2].kind(), NodeKind::ListLiteral(_)));
}

#[test]
fn unparsable_input_is_kept() {
    let source = "x: )\nx";
    let project = Project::parse(source);
    assert_eq!(project.main().program.print(), source);
    let tree = render_tree(&project.main().program);
    assert!(tree.contains("Unparsable"), "{tree}");
}

#[test]
fn deep_nesting_parses() {
    let depth = 500;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let project = Project::parse(&source);
    assert_eq!(project.main().program.print(), source);
}
