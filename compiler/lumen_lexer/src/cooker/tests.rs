use super::*;
use pretty_assertions::assert_eq;

#[test]
fn whitespace_becomes_trivia_of_next_token() {
    let mut cooker = TokenCooker::new();
    cooker.cook(Some(RawToken::Name), "a");
    cooker.cook(Some(RawToken::Whitespace), "  ");
    cooker.cook(Some(RawToken::Whitespace), "\n");
    cooker.cook(Some(RawToken::Number), "1");
    let tokens = cooker.finish();

    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1], Token::new(TokenKind::Number, "1", "  \n"));
    assert_eq!(tokens[2], Token::bare(TokenKind::End, ""));
}

#[test]
fn trailing_trivia_goes_to_end() {
    let mut cooker = TokenCooker::new();
    cooker.cook(Some(RawToken::Name), "a");
    cooker.cook(Some(RawToken::Whitespace), " \n");
    let tokens = cooker.finish();
    assert_eq!(tokens[1], Token::new(TokenKind::End, "", " \n"));
}

#[test]
fn errors_are_counted() {
    let mut cooker = TokenCooker::new();
    cooker.cook(None, "@");
    cooker.cook(Some(RawToken::UnterminatedText), "'abc");
    cooker.cook(Some(RawToken::Name), "ok");
    assert_eq!(cooker.error_count(), 2);
    let tokens = cooker.finish();
    assert_eq!(tokens[0].kind, TokenKind::Unknown);
    assert_eq!(tokens[1].kind, TokenKind::Unknown);
    assert_eq!(tokens[2].kind, TokenKind::Name);
}

#[test]
fn glyph_aliases_share_kinds() {
    assert_eq!(kind_of(RawToken::Convert), TokenKind::Convert);
    assert_eq!(kind_of(RawToken::Stream), TokenKind::Stream);
    assert_eq!(kind_of(RawToken::UnterminatedDocs), TokenKind::Unknown);
}
