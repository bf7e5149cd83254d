//! Token types for the OneShot lexer.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

/// The kind of token. Literal payloads travel inside the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    LParen,
    RParen,
    Colon,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,

    // One or two character operators
    Eq,        // =
    EqEq,      // ==
    Bang,      // !
    NotEq,     // <>
    Less,      // <
    LessEq,    // <=
    Greater,   // >
    GreaterEq, // >=

    // Literals
    Ident(String),
    Str(String),
    Number(f64),

    // Keywords
    And,
    Or,
    True,
    False,
    If,
    Else,
    For,
    While,
    End,
    Then,
    Let,
    Fun,
    Null,
    All,
    MouseX,
    MouseY,

    // Builtin expressions
    Random,
    Input,
    Int,
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Lerp,

    // Builtin statements
    Debug,
    Print,
    Window,
    Color,
    Fill,
    Text,
    Sleep,
    Size,
    Draw,
    ColorData,
    PixelData,
    Bar,
    Gain,
    Bpm,
    Loop,
    Type,
    Play,
    Stop,
    Sprite,
    Frame,
    Song,
    Sheet,

    Eof,
}

/// Look up a case-sensitive keyword.
pub fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "TRUE" => TokenKind::True,
        "FALSE" => TokenKind::False,
        "IF" => TokenKind::If,
        "ELSE" => TokenKind::Else,
        "FOR" => TokenKind::For,
        "WHILE" => TokenKind::While,
        "END" => TokenKind::End,
        "THEN" => TokenKind::Then,
        "LET" => TokenKind::Let,
        "FUN" => TokenKind::Fun,
        "NULL" => TokenKind::Null,
        "ALL" => TokenKind::All,
        "MOUSEX" => TokenKind::MouseX,
        "MOUSEY" => TokenKind::MouseY,
        "RANDOM" => TokenKind::Random,
        "INPUT" => TokenKind::Input,
        "INT" => TokenKind::Int,
        "MIN" => TokenKind::Min,
        "MAX" => TokenKind::Max,
        "ABS" => TokenKind::Abs,
        "FLOOR" => TokenKind::Floor,
        "CEIL" => TokenKind::Ceil,
        "LERP" => TokenKind::Lerp,
        "DEBUG" => TokenKind::Debug,
        "PRINT" => TokenKind::Print,
        "WINDOW" => TokenKind::Window,
        "COLOR" => TokenKind::Color,
        "FILL" => TokenKind::Fill,
        "TEXT" => TokenKind::Text,
        "SLEEP" => TokenKind::Sleep,
        "SIZE" => TokenKind::Size,
        "DRAW" => TokenKind::Draw,
        "COLORDATA" => TokenKind::ColorData,
        "PIXELDATA" => TokenKind::PixelData,
        "BAR" => TokenKind::Bar,
        "GAIN" => TokenKind::Gain,
        "BPM" => TokenKind::Bpm,
        "LOOP" => TokenKind::Loop,
        "TYPE" => TokenKind::Type,
        "PLAY" => TokenKind::Play,
        "STOP" => TokenKind::Stop,
        "SPRITE" => TokenKind::Sprite,
        "FRAME" => TokenKind::Frame,
        "SONG" => TokenKind::Song,
        "SHEET" => TokenKind::Sheet,
        _ => return None,
    };
    Some(kind)
}
