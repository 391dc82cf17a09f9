//! Descriptor canónico de callables: traza declarada (`Instr`) y su forma
//! invariante a renombrado (`CallableDescriptor`).

pub mod canonical;
pub mod instr;

pub use canonical::{CallableDescriptor, ExternalRead, ExternalRoot, Op};
pub use instr::{BinOp, CmpOp, Instr, Literal, UnOp};
