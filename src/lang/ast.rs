//! Abstract syntax tree for OneShot programs.

use super::value::Value;

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Grouping(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        line: usize,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        line: usize,
    },
    /// `AND` / `OR` with short-circuit evaluation.
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    Assign {
        name: String,
        value: Box<Expr>,
        line: usize,
    },
    Variable {
        name: String,
        line: usize,
    },
    Call {
        builtin: Builtin,
        args: Vec<Expr>,
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Builtin expression functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Random,
    Input,
    Int,
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Lerp,
    MouseX,
    MouseY,
}

impl Builtin {
    /// Exact number of arguments the call takes.
    pub fn arity(self) -> usize {
        match self {
            Builtin::Random | Builtin::MouseX | Builtin::MouseY => 0,
            Builtin::Input | Builtin::Int | Builtin::Abs | Builtin::Floor | Builtin::Ceil => 1,
            Builtin::Min | Builtin::Max => 2,
            Builtin::Lerp => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Random => "RANDOM",
            Builtin::Input => "INPUT",
            Builtin::Int => "INT",
            Builtin::Min => "MIN",
            Builtin::Max => "MAX",
            Builtin::Abs => "ABS",
            Builtin::Floor => "FLOOR",
            Builtin::Ceil => "CEIL",
            Builtin::Lerp => "LERP",
            Builtin::MouseX => "MOUSEX",
            Builtin::MouseY => "MOUSEY",
        }
    }
}

/// A statement with the line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let {
        name: String,
        init: Option<Expr>,
    },
    Expression(Expr),
    Debug(Expr),
    Print(Expr),
    Window {
        width: Expr,
        height: Expr,
    },
    Color(Expr),
    Fill(FillArea),
    Text {
        x: Expr,
        y: Expr,
        text: Expr,
    },
    Sleep(Expr),
    Size {
        width: Expr,
        height: Expr,
    },
    Draw {
        x: Expr,
        y: Expr,
        sprite: String,
        frame: Expr,
    },
    ColorData {
        key: Expr,
        color: Expr,
    },
    PixelData(Vec<Expr>),
    Bar(Expr),
    Gain(Expr),
    Bpm(Expr),
    Loop(Expr),
    Type(Expr),
    Play(String),
    Stop(String),
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        init: Box<Stmt>,
        condition: Expr,
        increment: Expr,
        body: Vec<Stmt>,
    },
    Sprite {
        name: String,
        body: Vec<Stmt>,
    },
    Frame {
        name: Option<String>,
        body: Vec<Stmt>,
    },
    Song {
        name: String,
        body: Vec<Stmt>,
    },
    Sheet {
        body: Vec<Stmt>,
    },
}

/// Target of a FILL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum FillArea {
    All,
    Rect {
        x: Expr,
        y: Expr,
        width: Expr,
        height: Expr,
    },
}
