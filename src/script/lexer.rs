//! Lexer for edit scripts using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Structural edits
    #[token("move")]
    Move,
    #[token("bulk")]
    Bulk,
    #[token("swap")]
    Swap,
    #[token("assign")]
    Assign,
    #[token("team")]
    Team,
    #[token("person")]
    Person,

    // Selection
    #[token("select")]
    Select,
    #[token("clear")]
    Clear,

    // History
    #[token("undo")]
    Undo,
    #[token("redo")]
    Redo,
    #[token("save")]
    Save,

    // Viewport
    #[token("focus")]
    Focus,
    #[token("root")]
    Root,
    #[token("zoom")]
    Zoom,
    #[token("in")]
    In,
    #[token("out")]
    Out,
    #[token("reset")]
    Reset,

    #[token("true")]
    True,
    #[token("false")]
    False,

    // Operators (longer first)
    #[token("<->")]
    ArrowBoth,
    #[token("->")]
    Arrow,

    // Delimiters
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Ids such as `E1042`, `ops.lead`, `SEAT_1700000000_1`. Keywords win.
    #[regex(r"[A-Za-z0-9_.]+", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

impl Token {
    /// The source text of a keyword token
    pub fn keyword(&self) -> Option<&'static str> {
        let word = match self {
            Token::Move => "move",
            Token::Bulk => "bulk",
            Token::Swap => "swap",
            Token::Assign => "assign",
            Token::Team => "team",
            Token::Person => "person",
            Token::Select => "select",
            Token::Clear => "clear",
            Token::Undo => "undo",
            Token::Redo => "redo",
            Token::Save => "save",
            Token::Focus => "focus",
            Token::Root => "root",
            Token::Zoom => "zoom",
            Token::In => "in",
            Token::Out => "out",
            Token::Reset => "reset",
            Token::True => "true",
            Token::False => "false",
            _ => return None,
        };
        Some(word)
    }
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
