use crate::{parse, parse_source};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const PROGRAMS: &[&str] = &[
    "",
    "  \n",
    "x: 1 + 2\n",
    "¶Counts clicks¶\n\n↓ shared.total\nclicks: 0 … ∆ Button() … . + 1\nclicks",
    "ƒ area(w•#m h•#m) w · h\narea(2m 3m)",
    "•Point(x•# y•#) (ƒ sum() x + y)\nPoint(1 2).sum()",
    "people: ⎡name•'' age•#⎦\n⎡'ann' 3⎦\n⎡'bo' 5⎦\npeople⎡? name⎦ age > 4",
    "{1: 'one'}.get(1) → ''",
    "broken: ) ( ] 'unterminated",
    "a, b•#|ø: ←Time() ? 1 2",
];

#[test]
fn known_programs_print_exactly() {
    for source in PROGRAMS {
        assert_eq!(parse_source(source).print(), *source);
    }
}

#[test]
fn reparse_has_same_shape_but_new_identity() {
    for source in PROGRAMS {
        let tokens = lumen_lexer::lex(source);
        let first = parse(&tokens);
        let second = parse(&tokens);
        assert!(first.same_shape(&second), "shape differs for {source:?}");
        assert!(!first.same(&second));
    }
}

proptest! {
    #[test]
    fn any_text_round_trips(
        source in "[a-z0-9 \n+\\-·×()\\[\\]{}:,.?…←→•ƒ∆↓⎡⎦#'_¶⊤ø|]{0,40}"
    ) {
        prop_assert_eq!(parse_source(&source).print(), source);
    }
}
