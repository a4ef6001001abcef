use std::sync::Arc;

use lumen_types::Project;
use pretty_assertions::assert_eq;

use super::*;

fn context(source: &str) -> Context {
    Context::for_project(Arc::new(Project::parse(source)))
}

fn statement(ctx: &Context, index: usize) -> Node {
    let NodeKind::Program(program) = ctx.program().kind() else {
        panic!("not a program");
    };
    let NodeKind::Block(block) = program.block.kind() else {
        panic!("program without a block");
    };
    block.statements[index].clone()
}

/// Steps as text, with starts and finishes reduced to their kind.
fn shape(plan: &Plan) -> Vec<String> {
    plan.steps
        .iter()
        .map(|step| match step {
            Step::Start(_) => "start".to_string(),
            Step::Finish { .. } => "finish".to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[test]
fn expressions_start_evaluate_children_then_finish() {
    let ctx = context("1 + 2");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    assert_eq!(
        shape(&plan),
        vec![
            "start", "start", "start", "constant 1", "finish", "start", "constant 2", "finish",
            "binary +", "finish", "finish",
        ]
    );
    assert!(plan.steps[0].node().same(ctx.program()));
}

#[test]
fn statements_discard_all_but_the_last_value() {
    let ctx = context("a: 1\na");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    assert_eq!(
        shape(&plan),
        vec![
            "start", "start", "start", "constant 1", "finish", "bind a", "finish", "discard",
            "start", "lookup a", "finish", "finish",
        ]
    );
}

#[test]
fn empty_program_is_none() {
    let ctx = context("");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    assert_eq!(shape(&plan), vec!["start", "constant ø", "finish"]);
}

#[test]
fn conditionals_jump_to_absolute_targets() {
    let ctx = context("⊤ ? 1 2");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    let shape = shape(&plan);
    assert_eq!(shape[5], "jump-if ⊥ 10");
    assert_eq!(shape[9], "jump 13");
    assert_eq!(shape[10], "start");
    assert_eq!(shape[13], "finish");
    assert_eq!(plan.len(), 15);
}

#[test]
fn stream_positions_keep_the_stream() {
    let latest = |source: &str| -> Vec<bool> {
        let ctx = context(source);
        let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
        plan.steps
            .iter()
            .filter_map(|step| match step {
                Step::Finish { node, latest } if matches!(node.kind(), NodeKind::Evaluate(_)) => {
                    Some(*latest)
                }
                _ => None,
            })
            .collect()
    };
    assert_eq!(latest("Mic()"), vec![true]);
    assert_eq!(latest("← Mic()"), vec![false]);
    assert_eq!(latest("∆ Key()"), vec![false]);
}

#[test]
fn this_in_a_reaction_names_the_reaction() {
    let ctx = context("0 … ∆ Button() … . + 1");
    let reaction = statement(&ctx, 0);
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    let owners: Vec<Option<NodeId>> = plan
        .steps
        .iter()
        .filter_map(|step| match step {
            Step::Native {
                op: Op::This(owner),
                ..
            } => Some(*owner),
            _ => None,
        })
        .collect();
    assert_eq!(owners, vec![Some(reaction.id())]);
    assert!(shape(&plan).contains(&"remember".to_string()));
}

#[test]
fn this_in_a_conversion_has_no_reaction() {
    let ctx = context("→ #km #m . · 1000m/km");
    let conversion = statement(&ctx, 0);
    let plan = compile(&conversion, PlanKind::Conversion, &ctx);
    assert!(plan
        .steps
        .iter()
        .any(|step| matches!(step, Step::Native { op: Op::This(None), .. })));
}

#[test]
fn functions_fill_defaults_before_the_body() {
    let ctx = context("ƒ inc(a•# b•#: 1) a + b");
    let function = statement(&ctx, 0);
    let plan = compile(&function, PlanKind::Function, &ctx);
    assert_eq!(
        shape(&plan)[..8],
        [
            "is-bound b",
            "jump-if ⊤ 7",
            "start",
            "constant 1",
            "finish",
            "bind b",
            "discard",
            "start",
        ]
    );
    assert_eq!(shape(&plan).last().map(String::as_str), Some("finish"));
}

#[test]
fn structures_end_in_an_instance() {
    let ctx = context("•Point(x•# y•#) (ƒ sum() x + y)");
    let structure = statement(&ctx, 0);
    let plan = compile(&structure, PlanKind::Structure, &ctx);
    assert_eq!(
        shape(&plan),
        vec!["start", "closure", "bind sum", "finish", "discard", "instance"]
    );
}

#[test]
fn loop_driver_shape() {
    let ctx = context("[1 2]");
    let plan = compile(ctx.program(), PlanKind::Loop, &ctx);
    assert_eq!(
        shape(&plan),
        vec!["loop-next", "jump-if ⊥ 5", "loop-body", "loop-accept", "jump 0", "loop-finish"]
    );
}

#[test]
fn placeholders_halt() {
    let ctx = context("_");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    assert!(plan
        .steps
        .iter()
        .any(|step| matches!(step, Step::Halt { kind: ExceptionKind::Placeholder, .. })));
}

#[test]
fn plans_print_one_line_per_step() {
    let ctx = context("1 + 2");
    let plan = compile(ctx.program(), PlanKind::Expression, &ctx);
    let printed = plan.to_string();
    assert_eq!(printed.lines().count(), plan.len());
    let binary = printed.lines().nth(8).unwrap_or_default();
    assert!(binary.starts_with("   8  binary +"), "{binary}");
    assert!(binary.ends_with("1 + 2"), "{binary}");
}
