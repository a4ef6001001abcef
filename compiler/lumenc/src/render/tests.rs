use std::sync::Arc;

use lumen_eval::compile;
use lumen_types::{Context, Project};
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn tokens_show_kind_text_and_span() {
    let tokens = lumen_lexer::lex("a + 1");
    let rendered = render_tokens(&tokens);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), tokens.len());
    assert!(lines[0].ends_with("@ 0..1"), "{}", lines[0]);
    assert!(lines[2].ends_with("@ 4..5"), "{}", lines[2]);
}

#[test]
fn tree_outline_indents_children() {
    let ctx = Context::for_project(Arc::new(Project::parse("1")));
    let rendered = render_tree(ctx.program());
    let first = rendered.lines().next().unwrap_or_default();
    assert_eq!(first, ctx.program().label());
    assert!(rendered.lines().skip(1).all(|line| line.starts_with("  ")));
}

#[test]
fn plan_owners_are_definitions() {
    let ctx = Context::for_project(Arc::new(Project::parse(
        "→ #km #m . · 1000m/km\nƒ double(n•#) n · 2\n•Point(x•#)",
    )));
    let kinds: Vec<PlanKind> = plan_owners(ctx.program())
        .into_iter()
        .map(|(_, kind)| kind)
        .collect();
    assert_eq!(
        kinds,
        vec![PlanKind::Conversion, PlanKind::Function, PlanKind::Structure]
    );
}

#[test]
fn plans_are_titled() {
    let ctx = Context::for_project(Arc::new(Project::parse("ƒ double(n•#) n · 2")));
    let owners = plan_owners(ctx.program());
    let plan = compile(&owners[0].0, owners[0].1, &ctx);
    let rendered = render_plan(&plan);
    assert!(rendered.starts_with("ƒ double ("), "{rendered}");
}
