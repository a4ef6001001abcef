//! Inspection commands: `lex`, `parse` and `steps`.

use std::path::Path;

use lumen_eval::{Evaluator, PlanKind};
use lumen_types::Project;

use super::{load_project, read_file};
use crate::render::{plan_owners, render_plan, render_tokens, render_tree};

/// Tokenize a file and display the token stream.
pub fn lex_file(path: &str) {
    let content = read_file(path);
    let tokens = lumen_lexer::lex(&content);
    println!("Tokens for '{}' ({} tokens):", path, tokens.len());
    print!("{}", render_tokens(&tokens));
}

/// Parse a file and display its tree.
pub fn parse_file(path: &str) {
    let content = read_file(path);
    let project = Project::parse(&content);
    print!("{}", render_tree(&project.main().program));
}

/// The step plans of a project's main program and of every definition in
/// it, in source order.
pub fn steps_source(project: Project) -> String {
    let mut evaluator = Evaluator::new(project);
    let program = evaluator.context().program().clone();
    let mut out = render_plan(&evaluator.plan(&program, PlanKind::Expression));
    for (node, kind) in plan_owners(&program) {
        out.push('\n');
        out.push_str(&render_plan(&evaluator.plan(&node, kind)));
    }
    out
}

pub fn steps_file(path: &str) {
    let content = read_file(path);
    print!("{}", steps_source(load_project(Path::new(path), &content)));
}
