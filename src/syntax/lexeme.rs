/// All lexemes of the C-family subset accepted by the front end.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Keywords the parser dispatches on
    Struct,
    Class,
    If,
    Else,
    Return,
    For,
    While,
    Do,
    Switch,
    Typedef,
    Using,
    Operator,
    Public,
    Private,
    Protected,

    // Symbols
    LParen,       // (
    RParen,       // )
    LBrace,       // {
    RBrace,       // }
    LBracket,     // [
    RBracket,     // ]
    Comma,        // ,
    Semicolon,    // ;
    Colon,        // :
    ColonColon,   // ::
    Question,     // ?
    Dot,          // .
    Arrow,        // ->
    Eq,           // =
    EqEq,         // ==
    Bang,         // !
    BangEq,       // !=
    Lt,           // <
    LtEq,         // <=
    Shl,          // <<
    Gt,           // >
    GtEq,         // >=
    Shr,          // >>
    Plus,         // +
    PlusEq,       // +=
    PlusPlus,     // ++
    Minus,        // -
    MinusEq,      // -=
    MinusMinus,   // --
    Star,         // *
    StarEq,       // *=
    Slash,        // /
    SlashEq,      // /=
    Percent,      // %
    Amp,          // &
    AmpAmp,       // &&
    AmpEq,        // &=
    Pipe,         // |
    PipePipe,     // ||
    PipeEq,       // |=
    Caret,        // ^
    Tilde,        // ~

    // Literals and names
    Ident(String),
    Number(String),
    Str(String),
    Char(String),

    /// A whole preprocessor line, e.g. `#include <graphlab.hpp>`.
    Directive(String),

    Eof,
}

impl Lexeme {
    /// Try to match an identifier string to a keyword lexeme.
    pub fn from_keyword(s: &str) -> Option<Lexeme> {
        match s {
            "struct" => Some(Lexeme::Struct),
            "class" => Some(Lexeme::Class),
            "if" => Some(Lexeme::If),
            "else" => Some(Lexeme::Else),
            "return" => Some(Lexeme::Return),
            "for" => Some(Lexeme::For),
            "while" => Some(Lexeme::While),
            "do" => Some(Lexeme::Do),
            "switch" => Some(Lexeme::Switch),
            "typedef" => Some(Lexeme::Typedef),
            "using" => Some(Lexeme::Using),
            "operator" => Some(Lexeme::Operator),
            "public" => Some(Lexeme::Public),
            "private" => Some(Lexeme::Private),
            "protected" => Some(Lexeme::Protected),
            _ => None,
        }
    }

    /// The exact source spelling of this lexeme.
    pub fn spelling(&self) -> &str {
        match self {
            Lexeme::Struct => "struct",
            Lexeme::Class => "class",
            Lexeme::If => "if",
            Lexeme::Else => "else",
            Lexeme::Return => "return",
            Lexeme::For => "for",
            Lexeme::While => "while",
            Lexeme::Do => "do",
            Lexeme::Switch => "switch",
            Lexeme::Typedef => "typedef",
            Lexeme::Using => "using",
            Lexeme::Operator => "operator",
            Lexeme::Public => "public",
            Lexeme::Private => "private",
            Lexeme::Protected => "protected",
            Lexeme::LParen => "(",
            Lexeme::RParen => ")",
            Lexeme::LBrace => "{",
            Lexeme::RBrace => "}",
            Lexeme::LBracket => "[",
            Lexeme::RBracket => "]",
            Lexeme::Comma => ",",
            Lexeme::Semicolon => ";",
            Lexeme::Colon => ":",
            Lexeme::ColonColon => "::",
            Lexeme::Question => "?",
            Lexeme::Dot => ".",
            Lexeme::Arrow => "->",
            Lexeme::Eq => "=",
            Lexeme::EqEq => "==",
            Lexeme::Bang => "!",
            Lexeme::BangEq => "!=",
            Lexeme::Lt => "<",
            Lexeme::LtEq => "<=",
            Lexeme::Shl => "<<",
            Lexeme::Gt => ">",
            Lexeme::GtEq => ">=",
            Lexeme::Shr => ">>",
            Lexeme::Plus => "+",
            Lexeme::PlusEq => "+=",
            Lexeme::PlusPlus => "++",
            Lexeme::Minus => "-",
            Lexeme::MinusEq => "-=",
            Lexeme::MinusMinus => "--",
            Lexeme::Star => "*",
            Lexeme::StarEq => "*=",
            Lexeme::Slash => "/",
            Lexeme::SlashEq => "/=",
            Lexeme::Percent => "%",
            Lexeme::Amp => "&",
            Lexeme::AmpAmp => "&&",
            Lexeme::AmpEq => "&=",
            Lexeme::Pipe => "|",
            Lexeme::PipePipe => "||",
            Lexeme::PipeEq => "|=",
            Lexeme::Caret => "^",
            Lexeme::Tilde => "~",
            Lexeme::Ident(s) | Lexeme::Number(s) | Lexeme::Str(s) | Lexeme::Char(s) => s,
            Lexeme::Directive(s) => s,
            Lexeme::Eof => "",
        }
    }

    /// Human-readable description for error messages.
    pub fn description(&self) -> String {
        match self {
            Lexeme::Ident(s) => format!("identifier '{}'", s),
            Lexeme::Number(s) => format!("number '{}'", s),
            Lexeme::Str(_) => "string literal".to_string(),
            Lexeme::Char(_) => "character literal".to_string(),
            Lexeme::Directive(_) => "preprocessor directive".to_string(),
            Lexeme::Eof => "end of file".to_string(),
            other => format!("'{}'", other.spelling()),
        }
    }

    /// True for tokens that can end a type name and precede a declared name.
    pub fn is_name_like(&self) -> bool {
        matches!(self, Lexeme::Ident(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_roundtrip() {
        for kw in ["struct", "class", "if", "else", "return", "operator"] {
            let lex = Lexeme::from_keyword(kw).unwrap();
            assert_eq!(lex.spelling(), kw);
        }
        assert_eq!(Lexeme::from_keyword("vertex_data"), None);
    }

    #[test]
    fn test_description() {
        assert_eq!(Lexeme::LtEq.description(), "'<='");
        assert_eq!(
            Lexeme::Ident("msg".to_string()).description(),
            "identifier 'msg'"
        );
        assert_eq!(Lexeme::Eof.description(), "end of file");
    }
}
