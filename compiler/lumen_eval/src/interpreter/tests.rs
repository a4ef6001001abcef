#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use lumen_types::Unit;
use pretty_assertions::assert_eq;

fn run(source: &str) -> Value {
    Evaluator::new(Project::parse(source)).run()
}

fn exception_kind(source: &str) -> Option<ExceptionKind> {
    let mut evaluator = Evaluator::new(Project::parse(source));
    evaluator.run();
    evaluator.exception().map(|exception| exception.kind)
}

fn number(source: &str) -> f64 {
    match run(source) {
        Value::Number(number) => number.magnitude,
        other => panic!("{source:?} evaluated to {other}"),
    }
}

// Arithmetic and evaluation order

#[test]
fn operators_group_left_to_right() {
    assert_eq!(run("2 - 3 - 1"), Value::unitless(-2.0));
    assert_eq!(run("1 + 2 · 3"), Value::unitless(9.0));
    assert_eq!(run("2 · (1 + 3)"), Value::unitless(8.0));
}

#[test]
fn overflowing_unit_exponents_raise_mismatches() {
    assert_eq!(exception_kind("(1m ^ 999999) ^ 999999"), Some(ExceptionKind::TypeMismatch));
    assert_eq!(exception_kind("1m^2147483647 · 1m"), Some(ExceptionKind::TypeMismatch));
    assert_eq!(exception_kind("1m^2147483647·m"), Some(ExceptionKind::TypeMismatch));
    assert_eq!(exception_kind("1m^2147483647"), None);
}

#[test]
fn left_operand_starts_before_right() {
    let mut evaluator = Evaluator::new(Project::parse("a: 1\nb: 2\na + b"));
    evaluator.start();
    let mut started = Vec::new();
    while !evaluator.is_done() {
        if let Some(Step::Start(node)) = evaluator.current_step() {
            started.push(node.print().trim().to_string());
        }
        evaluator.step();
    }
    let a = started.iter().rposition(|text| text == "a");
    let b = started.iter().rposition(|text| text == "b");
    assert!(a < b, "started in order {started:?}");
    assert_eq!(evaluator.current_value(), Some(&Value::unitless(3.0)));
}

#[test]
fn units_flow_through_arithmetic() {
    assert_eq!(run("2m · 3m"), Value::number(6.0, Unit::base("m").power(2).unwrap()));
    assert_eq!(run("1m + 2m"), Value::number(3.0, Unit::base("m")));
    assert_eq!(exception_kind("1m + 2s"), Some(ExceptionKind::TypeMismatch));
}

#[test]
fn division_by_zero_ends_the_pass() {
    assert_eq!(exception_kind("1 ÷ 0"), Some(ExceptionKind::DivisionByZero));
}

#[test]
fn conditionals_take_one_branch() {
    assert_eq!(run("1 < 2 ? 'yes' 'no'"), Value::text("yes"));
    assert_eq!(run("1 > 2 ? 'yes' 'no'"), Value::text("no"));
    assert_eq!(exception_kind("1 ? 2 3"), Some(ExceptionKind::TypeMismatch));
}

// Names and blocks

#[test]
fn undefined_names_are_exceptions() {
    let mut evaluator = Evaluator::new(Project::parse("x + 1"));
    let result = evaluator.run();
    assert_eq!(evaluator.state(), State::Exception);
    let exception = result.as_exception().map(|exception| exception.kind);
    assert_eq!(exception, Some(ExceptionKind::UnknownName));
    assert_eq!(
        evaluator.exception().map(|exception| exception.args.clone()),
        Some(vec!["x".to_string()])
    );
}

#[test]
fn binds_are_visible_after_them() {
    assert_eq!(number("x: 2\ny: x · 3\ny + 1"), 7.0);
    assert_eq!(exception_kind("y: x\nx: 1\ny"), Some(ExceptionKind::UnknownName));
}

#[test]
fn aliases_share_one_value() {
    assert_eq!(number("a, b: 4\na + b"), 8.0);
}

#[test]
fn blocks_have_their_own_scope() {
    assert_eq!(number("(a: 2 a · 3)"), 6.0);
    assert_eq!(exception_kind("(a: 2 a)\na"), Some(ExceptionKind::UnknownName));
}

#[test]
fn programs_ending_in_binds_yield_the_bound_value() {
    assert_eq!(run("x: 5"), Value::unitless(5.0));
    assert_eq!(run(""), Value::None);
}

#[test]
fn placeholders_and_unparsable_code_are_exceptions() {
    assert_eq!(exception_kind("_ + 1"), Some(ExceptionKind::Placeholder));
    assert_eq!(exception_kind("0 … ⊤"), Some(ExceptionKind::Unparsable));
}

// Functions and structures

#[test]
fn functions_bind_inputs_by_position() {
    assert_eq!(number("ƒ add(a•# b•#) a + b\nadd(1 2)"), 3.0);
    assert_eq!(number("ƒ inc(a•# b•#: 1) a + b\ninc(5)"), 6.0);
    assert_eq!(number("ƒ inc(a•# b•#: 1) a + b\ninc(5 10)"), 15.0);
}

#[test]
fn call_errors() {
    assert_eq!(
        exception_kind("ƒ add(a•# b•#) a + b\nadd(1)"),
        Some(ExceptionKind::MissingInput)
    );
    assert_eq!(
        exception_kind("ƒ add(a•# b•#) a + b\nadd(1 2 3)"),
        Some(ExceptionKind::ArityMismatch)
    );
    assert_eq!(exception_kind("x: 1\nx()"), Some(ExceptionKind::NotAFunction));
    assert_eq!(exception_kind("Time(1)"), Some(ExceptionKind::ArityMismatch));
}

#[test]
fn recursion() {
    assert_eq!(number("ƒ fact(n•#) n < 2 ? 1 n · fact(n - 1)\nfact(5)"), 120.0);
}

#[test]
fn closures_see_later_binds_of_their_scope() {
    assert_eq!(number("ƒ f() x\nx: 4\nf()"), 4.0);
}

#[test]
fn call_depth_is_limited() {
    let source = "ƒ forever(n•#) forever(n + 1)\nforever(1)";
    let mut evaluator = Evaluator::builder(Project::parse(source)).max_depth(16).build();
    evaluator.run();
    let exception = evaluator.exception().map(|exception| exception.kind);
    assert_eq!(exception, Some(ExceptionKind::CallDepthLimit));
}

#[test]
fn steps_are_limited() {
    let source = "ƒ forever(n•#) forever(n + 1)\nforever(1)";
    let mut evaluator = Evaluator::builder(Project::parse(source))
        .max_depth(1_000_000)
        .max_steps(50)
        .build();
    evaluator.run();
    assert_eq!(evaluator.steps_taken(), 50);
    let exception = evaluator.exception().map(|exception| exception.kind);
    assert_eq!(exception, Some(ExceptionKind::StepLimit));
}

#[test]
fn structures_expose_inputs_and_methods() {
    let point = "•Point(x•# y•#) (ƒ sum() x + y)\n";
    assert_eq!(number(&format!("{point}Point(1 2).sum()")), 3.0);
    assert_eq!(number(&format!("{point}Point(3 4).x")), 3.0);
    assert_eq!(
        exception_kind(&format!("{point}Point(3 4).z")),
        Some(ExceptionKind::UnknownProperty)
    );
    assert_eq!(
        run(&format!("{point}Point(3 4)")).to_string(),
        "Point(x:3 y:4)"
    );
}

#[test]
fn structure_equality_is_by_inputs() {
    let point = "•Point(x•# y•#)\n";
    assert_eq!(run(&format!("{point}Point(1 2) = Point(1 2)")), Value::Boolean(true));
    assert_eq!(run(&format!("{point}Point(1 2) = Point(2 1)")), Value::Boolean(false));
}

// Builtin members

#[test]
fn first_order_members() {
    assert_eq!(number("[1 2 3].length()"), 3.0);
    assert_eq!(number("[4 5 6].get(1)"), 4.0);
    assert_eq!(run("[4 5 6].get(4)"), Value::None);
    assert_eq!(run("'ab'.repeat(2)"), Value::text("abab"));
    assert_eq!(run("{1: 'one' 2: 'two'}.get(2)"), Value::text("two"));
    assert_eq!(run("{1 2 2}").to_string(), "{1 2}");
    assert_eq!(exception_kind("[1 2].size()"), Some(ExceptionKind::UnknownProperty));
}

#[test]
fn higher_order_members() {
    assert_eq!(
        run("[1 2 3].translate(ƒ(n) n · 2)").to_string(),
        "[2 4 6]"
    );
    assert_eq!(run("[1 2 3 4].filter(ƒ(n) n > 2)").to_string(), "[3 4]");
    assert_eq!(run("[1 2 3].all(ƒ(n) n > 0)"), Value::Boolean(true));
    assert_eq!(run("[1 2 3].all(ƒ(n) n > 1)"), Value::Boolean(false));
    assert_eq!(number("[1 2 3].find(ƒ(n) n > 1)"), 2.0);
    assert_eq!(run("[1 2 3].find(ƒ(n) n > 5)"), Value::None);
    assert_eq!(run("[1 2 3 1].until(ƒ(n) n > 2)").to_string(), "[1 2]");
    assert_eq!(number("[1 2 3].combine(0 ƒ(sum n) sum + n)"), 6.0);
}

#[test]
fn predicates_must_answer_booleans() {
    assert_eq!(
        exception_kind("[1 2].filter(ƒ(n) n)"),
        Some(ExceptionKind::TypeMismatch)
    );
}

// Conversions and type tests

#[test]
fn builtin_conversions() {
    assert_eq!(run("1 → ''"), Value::text("1"));
    assert_eq!(run("⊤ → ''"), Value::text("⊤"));
    assert_eq!(run("2km → #m"), Value::number(2000.0, Unit::base("m")));
    assert_eq!(run("'12' → #"), Value::unitless(12.0));
    assert_eq!(run("[1 1 2] → {}").to_string(), "{1 2}");
}

#[test]
fn defined_conversions_take_priority() {
    let source = "→ #km #m . · 999m/km\n2km → #m";
    assert_eq!(run(source), Value::number(1998.0, Unit::base("m")));
}

#[test]
fn structure_conversions_see_the_instance() {
    let source = "•Box(size•#) (→ Box '' size → '')\nBox(3) → ''";
    assert_eq!(run(source), Value::text("3"));
}

#[test]
fn missing_conversions() {
    assert_eq!(
        exception_kind("'a' → [#]"),
        Some(ExceptionKind::MissingConversion)
    );
}

#[test]
fn type_tests() {
    assert_eq!(run("1•#"), Value::Boolean(true));
    assert_eq!(run("'a'•#"), Value::Boolean(false));
    assert_eq!(run("[1 2]•[#]"), Value::Boolean(true));
}

// Tables

const PEOPLE: &str = "people: ⎡name•'' age•#⎦\n⎡'ann' 3⎦\n⎡'bo' 5⎦\n";

#[test]
fn table_literals() {
    assert_eq!(
        run(&format!("{PEOPLE}people")).to_string(),
        "⎡name age⎦⎡'ann' 3⎦⎡'bo' 5⎦"
    );
    assert_eq!(
        run("⎡a•# b•#: 0⎦\n⎡1⎦").to_string(),
        "⎡a b⎦⎡1 0⎦"
    );
}

#[test]
fn select_projects_matching_rows() {
    assert_eq!(
        run(&format!("{PEOPLE}people⎡? name⎦ age > 4")).to_string(),
        "⎡name⎦⎡'bo'⎦"
    );
    assert_eq!(
        run(&format!("{PEOPLE}people⎡? name age⎦ age > 0")).to_string(),
        "⎡name age⎦⎡'ann' 3⎦⎡'bo' 5⎦"
    );
}

#[test]
fn insert_update_delete() {
    assert_eq!(number(&format!("{PEOPLE}more: people⎡+ 'cy' 9⎦\nmore.size()")), 3.0);
    assert_eq!(number(&format!("{PEOPLE}left: people⎡-⎦ age < 4\nleft.size()")), 1.0);
    assert_eq!(
        run(&format!("{PEOPLE}people⎡: age: 1⎦ name = 'bo'")).to_string(),
        "⎡name age⎦⎡'ann' 3⎦⎡'bo' 1⎦"
    );
}

#[test]
fn queries_must_answer_booleans() {
    assert_eq!(
        exception_kind(&format!("{PEOPLE}people⎡-⎦ age")),
        Some(ExceptionKind::TypeMismatch)
    );
}

// Borrows

#[test]
fn borrowed_names_are_evaluated_first() {
    let project = Project::parse("↓ shapes.area\narea(2)")
        .with_source_text("shapes", "ƒ area(r•#) r · r");
    assert_eq!(Evaluator::new(project).run(), Value::unitless(4.0));
}

#[test]
fn borrowing_a_whole_source() {
    let project = Project::parse("↓ sizes\nsmall + large")
        .with_source_text("sizes", "small: 1\nlarge: 10");
    assert_eq!(Evaluator::new(project).run(), Value::unitless(11.0));
}

#[test]
fn borrow_cycles_are_skipped() {
    let project = Project::parse("↓ a\nx").with_source_text("a", "↓ main\nx: 1");
    assert_eq!(Evaluator::new(project).run(), Value::unitless(1.0));
}

// Streams and reactions

#[test]
fn streams_start_at_their_initial_values() {
    assert_eq!(run("Time()"), Value::number(0.0, Unit::base("ms")));
    assert_eq!(run("t: Time()\nt + 1ms"), Value::number(1.0, Unit::base("ms")));
    assert_eq!(run("Key()"), Value::text(""));
}

#[test]
fn previous_reads_history() {
    let mut evaluator = Evaluator::new(Project::parse("[← Mic() Mic()]"));
    assert_eq!(evaluator.run().to_string(), "[ø 0]");
    evaluator.produce("Mic", Value::unitless(1.0)).unwrap();
    evaluator.tick();
    evaluator.produce("Mic", Value::unitless(2.0)).unwrap();
    let value = evaluator.tick().unwrap();
    assert_eq!(value, Value::list(vec![Value::unitless(1.0), Value::unitless(2.0)]));
    assert_eq!(
        evaluator.stream_history(StreamKind::Mic),
        vec![Value::unitless(0.0), Value::unitless(1.0), Value::unitless(2.0)]
    );
}

#[test]
fn reactions_keep_state_between_passes() {
    let mut evaluator = Evaluator::new(Project::parse("clicks: 0 … ∆ Button() … . + 1\nclicks"));
    assert_eq!(evaluator.run(), Value::unitless(0.0));
    evaluator.produce("Button", Value::Boolean(true)).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::unitless(1.0)));
    assert_eq!(evaluator.tick(), None);
    evaluator.produce("Mic", Value::unitless(3.0)).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::unitless(1.0)));
    evaluator.produce("Button", Value::Boolean(false)).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::unitless(2.0)));
}

#[test]
fn changed_is_true_only_in_the_pass_after_a_value() {
    let mut evaluator = Evaluator::new(Project::parse("∆ Key()"));
    assert_eq!(evaluator.run(), Value::Boolean(false));
    evaluator.produce("Key", Value::text("a")).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::Boolean(true)));
    evaluator.produce("Mic", Value::unitless(1.0)).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::Boolean(false)));
}

#[test]
fn ticks_coalesce_queued_values() {
    let mut evaluator = Evaluator::new(Project::parse("Mic()"));
    evaluator.run();
    let sender = evaluator.sender();
    sender.produce("Mic", Value::unitless(1.0)).unwrap();
    sender.produce("Mic", Value::unitless(2.0)).unwrap();
    assert_eq!(sender.pending(), 2);
    assert_eq!(evaluator.tick(), Some(Value::unitless(2.0)));
    assert_eq!(evaluator.pass(), 2);
    assert_eq!(sender.pending(), 0);
}

#[test]
fn produced_times_arrive_in_milliseconds() {
    let mut evaluator = Evaluator::new(Project::parse("Time() + 1ms"));
    assert_eq!(evaluator.run(), Value::number(1.0, Unit::base("ms")));
    evaluator.produce("Time", Value::number(2.0, Unit::base("s"))).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::number(2001.0, Unit::base("ms"))));
    assert_eq!(
        evaluator.produce("Time", Value::number(5.0, Unit::base("kg"))),
        Err(ProduceError::WrongValue {
            stream: "Time".to_string(),
            expected: "#ms".to_string(),
        })
    );
    assert_eq!(evaluator.tick(), None);
    assert_eq!(evaluator.exception(), None);
}

#[test]
fn producing_into_unknown_streams_is_a_host_error() {
    let evaluator = Evaluator::new(Project::parse("1"));
    assert_eq!(
        evaluator.produce("Radio", Value::unitless(1.0)),
        Err(ProduceError::UnknownStream("Radio".to_string()))
    );
}

#[test]
fn seeded_streams() {
    let mut evaluator = Evaluator::builder(Project::parse("Key()"))
        .initial(StreamKind::Key, Value::text("q"))
        .build();
    assert_eq!(evaluator.run(), Value::text("q"));
}

// Stepping

#[test]
fn stepping_matches_playing() {
    let source = "ƒ add(a•# b•#) a + b\nadd(1 2) · 2";
    let mut evaluator = Evaluator::new(Project::parse(source));
    assert_eq!(evaluator.state(), State::Idle);
    evaluator.start();
    while evaluator.step() == State::Stepping {}
    assert_eq!(evaluator.state(), State::Done);
    assert_eq!(evaluator.current_value(), Some(&Value::unitless(6.0)));
    let steps = evaluator.steps_taken();
    assert_eq!(evaluator.run(), Value::unitless(6.0));
    assert_eq!(evaluator.steps_taken(), steps);
}

#[test]
fn step_back_restores_binds() {
    let mut evaluator = Evaluator::new(Project::parse("x: 1\nx + 1"));
    evaluator.start();
    while evaluator.step() == State::Stepping {}
    let steps = evaluator.steps_taken();
    assert!(evaluator.step_back());
    assert!(!evaluator.is_done());
    assert_eq!(evaluator.steps_taken(), steps - 1);
    while evaluator.step_back() {}
    assert_eq!(evaluator.steps_taken(), 0);
    assert_eq!(evaluator.current_value(), None);
    assert_eq!(evaluator.play(), Value::unitless(2.0));
}

#[test]
fn step_back_restores_reactions() {
    let mut evaluator = Evaluator::new(Project::parse("0 … ∆ Button() … . + 1"));
    evaluator.run();
    evaluator.produce("Button", Value::Boolean(true)).unwrap();
    assert_eq!(evaluator.tick(), Some(Value::unitless(1.0)));
    while evaluator.step_back() {}
    assert_eq!(evaluator.play(), Value::unitless(1.0));
}

#[test]
fn history_limit_bounds_step_back() {
    let mut evaluator = Evaluator::builder(Project::parse("1 + 2"))
        .history_limit(2)
        .build();
    evaluator.run();
    assert!(evaluator.step_back());
    assert!(evaluator.step_back());
    assert!(!evaluator.step_back());
}

#[test]
fn stepping_does_nothing_when_idle_or_done() {
    let mut evaluator = Evaluator::new(Project::parse("1"));
    assert_eq!(evaluator.step(), State::Idle);
    evaluator.run();
    let steps = evaluator.steps_taken();
    assert_eq!(evaluator.step(), State::Done);
    assert_eq!(evaluator.steps_taken(), steps);
}
