use super::*;
use pretty_assertions::assert_eq;

#[test]
fn navigation() {
    let tokens = lumen_lexer::lex("x: 42");
    let mut cursor = Cursor::new(&tokens);

    assert!(cursor.check(TokenKind::Name));
    assert_eq!(cursor.peek_kind(1), TokenKind::Colon);
    assert_eq!(cursor.advance().text(), "x");
    assert!(cursor.eat(TokenKind::Number).is_none());
    assert!(cursor.eat(TokenKind::Colon).is_some());
    assert!(!cursor.is_attached());
    assert_eq!(cursor.advance().text(), "42");
    assert!(cursor.is_at_end());
}

#[test]
fn advance_at_end_stays_put() {
    let tokens = lumen_lexer::lex("");
    let mut cursor = Cursor::new(&tokens);
    let end = cursor.advance();
    assert!(end.is_token(TokenKind::End));
    assert_eq!(cursor.position(), 0);
}

#[test]
fn missing_end_is_synthesized() {
    let tokens = TokenList::new(Vec::new());
    let cursor = Cursor::new(&tokens);
    assert!(cursor.is_at_end());
    assert_eq!(cursor.peek_kind(3), TokenKind::End);
}

#[test]
fn operators_by_role() {
    let tokens = lumen_lexer::lex("- ¬ ≤");
    let mut cursor = Cursor::new(&tokens);
    assert_eq!(cursor.binary_op(), Some(BinaryOp::Sub));
    assert_eq!(cursor.unary_op(), Some(UnaryOp::Negate));
    cursor.advance();
    assert_eq!(cursor.binary_op(), None);
    assert_eq!(cursor.unary_op(), Some(UnaryOp::Not));
    cursor.advance();
    assert!(cursor.check_operator("≤"));
    assert_eq!(cursor.binary_op(), Some(BinaryOp::LtEq));
}

#[test]
fn attachment_and_lines() {
    let tokens = lumen_lexer::lex("f(x)\ny");
    let mut cursor = Cursor::new(&tokens);
    cursor.advance();
    assert!(cursor.is_attached());
    cursor.advance();
    cursor.advance();
    cursor.advance();
    assert!(cursor.on_new_line());
}
