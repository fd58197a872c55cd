use shale_lang::literal::Literal;
use shale_lang::scan;
use shale_lang::token::{Token, Type};

/// Scans the code and drops the trailing EOF token.
fn tokens(code: &str) -> Vec<Token> {
    let mut tokens = scan(code).expect("code should scan");
    tokens.pop();
    tokens
}

fn token(r#type: Type, lexeme: &str, line: usize) -> Token {
    Token::new(r#type, lexeme.to_string(), None, line)
}

#[test]
fn includes_eof() {
    assert_eq!(scan("").unwrap(), vec![Token::new(Type::EOF, String::new(), None, 1)]);
}

#[test]
fn scans_single_char_tokens() {
    assert_eq!(tokens("( ) { } , . - + ; * / ! = < > ? : \\"), vec![
        token(Type::LeftParen, "(", 1),
        token(Type::RightParen, ")", 1),
        token(Type::LeftBrace, "{", 1),
        token(Type::RightBrace, "}", 1),
        token(Type::Comma, ",", 1),
        token(Type::Dot, ".", 1),
        token(Type::Minus, "-", 1),
        token(Type::Plus, "+", 1),
        token(Type::Semicolon, ";", 1),
        token(Type::Star, "*", 1),
        token(Type::Slash, "/", 1),
        token(Type::Bang, "!", 1),
        token(Type::Equal, "=", 1),
        token(Type::Less, "<", 1),
        token(Type::Greater, ">", 1),
        token(Type::QuestionMark, "?", 1),
        token(Type::Colon, ":", 1),
        token(Type::Backslash, "\\", 1),
    ]);
}

#[test]
fn scans_double_char_tokens() {
    assert_eq!(tokens("!= == <= >= ->"), vec![
        token(Type::BangEqual, "!=", 1),
        token(Type::EqualEqual, "==", 1),
        token(Type::LessEqual, "<=", 1),
        token(Type::GreaterEqual, ">=", 1),
        token(Type::Arrow, "->", 1),
    ]);
}

#[test]
fn handles_multiline_source() {
    assert_eq!(tokens("=\n!=\n+"), vec![
        token(Type::Equal, "=", 1),
        token(Type::BangEqual, "!=", 2),
        token(Type::Plus, "+", 3),
    ]);
}

#[test]
fn scans_strings() {
    assert_eq!(tokens("\"hello\""), vec![
        Token::new(Type::String, String::from("\"hello\""), Some(Literal::from("hello")), 1),
    ]);
}

#[test]
fn scans_single_quoted_strings() {
    assert_eq!(tokens("'hello'"), vec![
        Token::new(Type::String, String::from("'hello'"), Some(Literal::from("hello")), 1),
    ]);
}

#[test]
fn strings_may_span_lines() {
    assert_eq!(tokens("\"a\nb\""), vec![
        Token::new(Type::String, String::from("\"a\nb\""), Some(Literal::from("a\nb")), 2),
    ]);
}

#[test]
fn scans_numbers() {
    assert_eq!(tokens("42 69.96"), vec![
        Token::new(Type::Number, String::from("42"), Some(Literal::Integer(42)), 1),
        Token::new(Type::Number, String::from("69.96"), Some(Literal::Float(69.96)), 1),
    ]);
}

#[test]
fn trailing_dot_is_not_part_of_a_number() {
    assert_eq!(tokens("1."), vec![
        Token::new(Type::Number, String::from("1"), Some(Literal::Integer(1)), 1),
        token(Type::Dot, ".", 1),
    ]);
}

#[test]
fn scans_identifiers() {
    assert_eq!(tokens("foo _bar"), vec![
        Token::new(Type::Identifier, String::from("foo"), Some(Literal::from("foo")), 1),
        Token::new(Type::Identifier, String::from("_bar"), Some(Literal::from("_bar")), 1),
    ]);
}

#[test]
fn scans_keywords() {
    let source = "and class else false for fun if nil or print return super this true var while";

    assert_eq!(tokens(source), vec![
        token(Type::And, "and", 1),
        token(Type::Class, "class", 1),
        token(Type::Else, "else", 1),
        token(Type::False, "false", 1),
        token(Type::For, "for", 1),
        token(Type::Fun, "fun", 1),
        token(Type::If, "if", 1),
        token(Type::Nil, "nil", 1),
        token(Type::Or, "or", 1),
        token(Type::Print, "print", 1),
        token(Type::Return, "return", 1),
        token(Type::Super, "super", 1),
        token(Type::This, "this", 1),
        token(Type::True, "true", 1),
        token(Type::Var, "var", 1),
        token(Type::While, "while", 1),
    ]);
}

#[test]
fn reports_unterminated_string() {
    let errors = scan("\"hello").unwrap_err();

    assert_eq!(errors.messages(), vec!["Unterminated string"]);
}

#[test]
fn reports_unrecognized_character() {
    let errors = scan("@").unwrap_err();

    assert_eq!(errors.messages(), vec!["Unrecognized character [@]"]);
    assert_eq!(errors.to_string(), "scan error on line 1: Unrecognized character [@]");
}

#[test]
fn keeps_scanning_after_an_error() {
    let errors = scan("@ # 1 + 2").unwrap_err();

    assert_eq!(errors.messages(), vec![
        "Unrecognized character [@]",
        "Unrecognized character [#]",
    ]);
}
