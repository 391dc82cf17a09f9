//! Traza de instrucciones tal como la declara el builder (con nombres de
//! fuente) y sus operadores / literales.

use crate::heap::ObjectId;
use crate::model::Value;

/// Literal constante embebido en la traza o usado como default.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Unit,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Literal>),
}

impl Literal {
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Unit => Value::Unit,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::Str(s.clone()),
            Literal::Bytes(b) => Value::Bytes(b.clone()),
            Literal::Tuple(items) => Value::Tuple(items.iter().map(Literal::to_value).collect()),
        }
    }
}

impl From<()> for Literal {
    fn from(_: ()) -> Self {
        Literal::Unit
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i128)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v as i128)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Str(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Add => 0,
            Self::Sub => 1,
            Self::Mul => 2,
            Self::Div => 3,
            Self::FloorDiv => 4,
            Self::Mod => 5,
            Self::Pow => 6,
            Self::And => 7,
            Self::Or => 8,
            Self::BitAnd => 9,
            Self::BitOr => 10,
            Self::BitXor => 11,
            Self::Shl => 12,
            Self::Shr => 13,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
    Not,
    Invert,
}

impl UnOp {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Neg => 0,
            Self::Not => 1,
            Self::Invert => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Is,
    IsNot,
}

impl CmpOp {
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Eq => 0,
            Self::Ne => 1,
            Self::Lt => 2,
            Self::Le => 3,
            Self::Gt => 4,
            Self::Ge => 5,
            Self::In => 6,
            Self::NotIn => 7,
            Self::Is => 8,
            Self::IsNot => 9,
        }
    }
}

/// Instrucción de la traza declarada. Los nombres son los de la fuente; la
/// canonicalización los reemplaza por posiciones.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    LoadConst(Literal),
    /// Parámetro o variable local.
    LoadLocal(String),
    StoreLocal(String),
    /// Variable capturada del scope envolvente (closure).
    LoadDeref(String),
    /// Global del módulo o builtin.
    LoadGlobal(String),
    LoadAttr(String),
    StoreAttr(String),
    Index,
    Binary(BinOp),
    Unary(UnOp),
    Compare(CmpOp),
    /// Llamada con `n` argumentos posicionales.
    Call(u32),
    /// Crea un callable anidado (lambda / función interna) ya registrado en el heap.
    MakeFunction(ObjectId),
    Import(String),
    BuildList(u32),
    BuildTuple(u32),
    BuildMap(u32),
    /// Saltos a índice absoluto de instrucción.
    JumpIfFalse(u32),
    Jump(u32),
    Pop,
    Return,
}
