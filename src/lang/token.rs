/// ## Lexical tokens
///
/// Every token remembers enough of its source text to be printed back,
/// which is what lets RENUM edit a line without disturbing its layout.

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Literal(Literal),
    Word(Word),
    Operator(Operator),
    Ident(String),
    Remark(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(String),
    String(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Word {
    Else,
    End,
    For,
    Gosub,
    Goto,
    If,
    Let,
    Next,
    Print,
    Rem,
    Return,
    Step,
    Then,
    To,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Caret,
    Multiply,
    Divide,
    Modulus,
    Plus,
    Minus,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Not,
    And,
    Or,
}

impl Token {
    pub fn is_word(&self, word: Word) -> bool {
        matches!(self, Token::Word(w) if *w == word)
    }

    /// Keywords and alphabetic operators, matched after upper-casing.
    pub fn from_word(s: &str) -> Option<Token> {
        use Operator::*;
        use Word::*;
        let token = match s {
            "ELSE" => Token::Word(Else),
            "END" => Token::Word(End),
            "FOR" => Token::Word(For),
            "GOSUB" => Token::Word(Gosub),
            "GOTO" => Token::Word(Goto),
            "IF" => Token::Word(If),
            "LET" => Token::Word(Let),
            "NEXT" => Token::Word(Next),
            "PRINT" => Token::Word(Print),
            "REM" => Token::Word(Rem),
            "RETURN" => Token::Word(Return),
            "STEP" => Token::Word(Step),
            "THEN" => Token::Word(Then),
            "TO" => Token::Word(To),
            "MOD" => Token::Operator(Modulus),
            "NOT" => Token::Operator(Not),
            "AND" => Token::Operator(And),
            "OR" => Token::Operator(Or),
            _ => return None,
        };
        Some(token)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Literal(lit) => write!(f, "{}", lit),
            Word(word) => write!(f, "{}", word),
            Operator(op) => write!(f, "{}", op),
            Ident(s) => write!(f, "{}", s),
            Remark(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Literal::Number(s) => write!(f, "{}", s),
            Literal::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        let s = match self {
            Else => "ELSE",
            End => "END",
            For => "FOR",
            Gosub => "GOSUB",
            Goto => "GOTO",
            If => "IF",
            Let => "LET",
            Next => "NEXT",
            Print => "PRINT",
            Rem => "REM",
            Return => "RETURN",
            Step => "STEP",
            Then => "THEN",
            To => "TO",
        };
        write!(f, "{}", s)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        let s = match self {
            Caret => "^",
            Multiply => "*",
            Divide => "/",
            Modulus => "MOD",
            Plus => "+",
            Minus => "-",
            Equal => "=",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Not => "NOT",
            And => "AND",
            Or => "OR",
        };
        write!(f, "{}", s)
    }
}
