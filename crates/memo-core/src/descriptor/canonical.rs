//! Canonicalización de la traza de un callable.
//!
//! ```text
//! // fuente                  // canónico
//! f(x, y): return x + y      Local(0) Local(1) Add Return
//! h(y, x): return y + x      Local(0) Local(1) Add Return
//! g(x, y): return y + x      Local(1) Local(0) Add Return
//! ```
//!
//! - Locales: parámetros primero (en orden), luego el resto por orden de
//!   primera aparición.
//! - Raíces externas (closure, global, callable anidado): también por
//!   posición de descubrimiento (`External(n)`). Su identidad real la aporta
//!   el `ReferenceEnvironment`, no el nombre: `f(x): f(x)` y `h(x): h(x)`
//!   quedan con la misma traza.
//! - Nombres de atributo, operadores y literales se conservan tal cual.
//! - Una raíz seguida de `LoadAttr` consecutivos forma un *path* de lectura
//!   (`o.get_x`, `alt.api.concat`). Los paths leídos desde el primer
//!   parámetro se guardan aparte como lecturas del receptor (`self.x`).

use indexmap::{IndexMap, IndexSet};

use super::instr::{BinOp, CmpOp, Instr, Literal, UnOp};
use crate::hashing::hasher::literal_fingerprint;
use crate::hashing::{tags, DigestWriter};
use crate::heap::ObjectId;
use crate::model::Fingerprint;

/// Operación canónica (sin nombres de bindings).
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Const(Literal),
    Local(u32),
    StoreLocal(u32),
    External(u32),
    Attr(String),
    StoreAttr(String),
    Index,
    Binary(BinOp),
    Unary(UnOp),
    Compare(CmpOp),
    Call(u32),
    MakeFunction(u32),
    Import(String),
    BuildList(u32),
    BuildTuple(u32),
    BuildMap(u32),
    JumpIfFalse(u32),
    Jump(u32),
    Pop,
    Return,
}

/// Origen de una raíz externa.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalRoot {
    Deref(String),
    Global(String),
    Nested(ObjectId),
}

impl ExternalRoot {
    /// Nombre de fuente (para logs y fallback sólo-nombre).
    pub fn source_name(&self) -> String {
        match self {
            ExternalRoot::Deref(n) | ExternalRoot::Global(n) => n.clone(),
            ExternalRoot::Nested(id) => format!("<nested {id}>"),
        }
    }
}

/// Lectura externa: raíz (slot) + path de atributos leído desde ella.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalRead {
    pub slot: u32,
    pub path: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CallableDescriptor {
    arity: u32,
    defaults: Vec<Literal>,
    ops: Vec<Op>,
    local_count: u32,
    externals: Vec<ExternalRoot>,
    reads: Vec<ExternalRead>,
    receiver_reads: Vec<Vec<String>>,
    digest: Fingerprint,
}

impl CallableDescriptor {
    /// Canonicaliza parámetros + defaults + traza. Nunca ejecuta nada.
    pub fn canonicalize(params: &[String], defaults: Vec<Literal>, body: &[Instr]) -> Self {
        let mut locals: IndexMap<String, u32> = IndexMap::new();
        for p in params {
            let next = locals.len() as u32;
            locals.entry(p.clone()).or_insert(next);
        }
        let mut externals: IndexMap<ExternalRoot, u32> = IndexMap::new();
        let mut reads: IndexSet<ExternalRead> = IndexSet::new();
        let mut receiver_reads: IndexSet<Vec<String>> = IndexSet::new();
        let mut ops = Vec::with_capacity(body.len());

        for (i, instr) in body.iter().enumerate() {
            let op = match instr {
                Instr::LoadConst(lit) => Op::Const(lit.clone()),
                Instr::LoadLocal(name) => {
                    let slot = local_slot(&mut locals, name);
                    if slot == 0 && !params.is_empty() {
                        let path = attr_path(body, i);
                        if !path.is_empty() {
                            receiver_reads.insert(path);
                        }
                    }
                    Op::Local(slot)
                }
                Instr::StoreLocal(name) => Op::StoreLocal(local_slot(&mut locals, name)),
                Instr::LoadDeref(name) => {
                    let slot = external_slot(&mut externals, ExternalRoot::Deref(name.clone()));
                    reads.insert(ExternalRead { slot, path: attr_path(body, i) });
                    Op::External(slot)
                }
                Instr::LoadGlobal(name) => {
                    let slot = external_slot(&mut externals, ExternalRoot::Global(name.clone()));
                    reads.insert(ExternalRead { slot, path: attr_path(body, i) });
                    Op::External(slot)
                }
                Instr::MakeFunction(id) => {
                    let slot = external_slot(&mut externals, ExternalRoot::Nested(*id));
                    reads.insert(ExternalRead { slot, path: Vec::new() });
                    Op::MakeFunction(slot)
                }
                Instr::LoadAttr(a) => Op::Attr(a.clone()),
                Instr::StoreAttr(a) => Op::StoreAttr(a.clone()),
                Instr::Index => Op::Index,
                Instr::Binary(op) => Op::Binary(*op),
                Instr::Unary(op) => Op::Unary(*op),
                Instr::Compare(op) => Op::Compare(*op),
                Instr::Call(n) => Op::Call(*n),
                Instr::Import(m) => Op::Import(m.clone()),
                Instr::BuildList(n) => Op::BuildList(*n),
                Instr::BuildTuple(n) => Op::BuildTuple(*n),
                Instr::BuildMap(n) => Op::BuildMap(*n),
                Instr::JumpIfFalse(t) => Op::JumpIfFalse(*t),
                Instr::Jump(t) => Op::Jump(*t),
                Instr::Pop => Op::Pop,
                Instr::Return => Op::Return,
            };
            ops.push(op);
        }

        let arity = params.len() as u32;
        let local_count = locals.len() as u32;
        let digest = digest_of(arity, local_count, &defaults, &ops);
        Self { arity,
               defaults,
               ops,
               local_count,
               externals: externals.into_keys().collect(),
               reads: reads.into_iter().collect(),
               receiver_reads: receiver_reads.into_iter().collect(),
               digest }
    }

    pub fn arity(&self) -> u32 {
        self.arity
    }

    pub fn defaults(&self) -> &[Literal] {
        &self.defaults
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn local_count(&self) -> u32 {
        self.local_count
    }

    /// Raíces externas; el índice es el slot.
    pub fn externals(&self) -> &[ExternalRoot] {
        &self.externals
    }

    /// Lecturas externas en orden de descubrimiento, sin duplicados.
    pub fn reads(&self) -> &[ExternalRead] {
        &self.reads
    }

    /// Paths leídos desde el primer parámetro (`self.<path>`).
    pub fn receiver_reads(&self) -> &[Vec<String>] {
        &self.receiver_reads
    }

    /// Digest de la lógica (traza + defaults), sin referencias externas.
    pub fn digest(&self) -> Fingerprint {
        self.digest
    }
}

fn local_slot(locals: &mut IndexMap<String, u32>, name: &str) -> u32 {
    if let Some(slot) = locals.get(name) {
        return *slot;
    }
    let slot = locals.len() as u32;
    locals.insert(name.to_string(), slot);
    slot
}

fn external_slot(externals: &mut IndexMap<ExternalRoot, u32>, root: ExternalRoot) -> u32 {
    let next = externals.len() as u32;
    *externals.entry(root).or_insert(next)
}

/// `LoadAttr` consecutivos inmediatamente después de `body[at]`.
fn attr_path(body: &[Instr], at: usize) -> Vec<String> {
    body[at + 1..].iter()
                  .map_while(|i| match i {
                      Instr::LoadAttr(a) => Some(a.clone()),
                      _ => None,
                  })
                  .collect()
}

fn digest_of(arity: u32, local_count: u32, defaults: &[Literal], ops: &[Op]) -> Fingerprint {
    let mut w = DigestWriter::new(tags::DESCRIPTOR);
    w.u32(arity).u32(local_count).count(defaults.len());
    for d in defaults {
        w.fingerprint(&literal_fingerprint(d));
    }
    w.count(ops.len());
    for op in ops {
        match op {
            Op::Const(lit) => {
                w.u8(0x01).fingerprint(&literal_fingerprint(lit));
            }
            Op::Local(s) => {
                w.u8(0x02).u32(*s);
            }
            Op::StoreLocal(s) => {
                w.u8(0x03).u32(*s);
            }
            Op::External(s) => {
                w.u8(0x04).u32(*s);
            }
            Op::Attr(a) => {
                w.u8(0x05).str(a);
            }
            Op::StoreAttr(a) => {
                w.u8(0x06).str(a);
            }
            Op::Index => {
                w.u8(0x07);
            }
            Op::Binary(b) => {
                w.u8(0x08).u8(b.tag());
            }
            Op::Unary(u) => {
                w.u8(0x09).u8(u.tag());
            }
            Op::Compare(c) => {
                w.u8(0x0a).u8(c.tag());
            }
            Op::Call(n) => {
                w.u8(0x0b).u32(*n);
            }
            Op::MakeFunction(s) => {
                w.u8(0x0c).u32(*s);
            }
            Op::Import(m) => {
                w.u8(0x0d).str(m);
            }
            Op::BuildList(n) => {
                w.u8(0x0e).u32(*n);
            }
            Op::BuildTuple(n) => {
                w.u8(0x0f).u32(*n);
            }
            Op::BuildMap(n) => {
                w.u8(0x10).u32(*n);
            }
            Op::JumpIfFalse(t) => {
                w.u8(0x11).u32(*t);
            }
            Op::Jump(t) => {
                w.u8(0x12).u32(*t);
            }
            Op::Pop => {
                w.u8(0x13);
            }
            Op::Return => {
                w.u8(0x14);
            }
        }
    }
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn locals_renamed_by_first_appearance() {
        let f = CallableDescriptor::canonicalize(&params(&["x", "y"]),
                                                 vec![],
                                                 &[Instr::LoadLocal("x".into()),
                                                   Instr::LoadLocal("y".into()),
                                                   Instr::Binary(BinOp::Add),
                                                   Instr::Return]);
        let h = CallableDescriptor::canonicalize(&params(&["y", "x"]),
                                                 vec![],
                                                 &[Instr::LoadLocal("y".into()),
                                                   Instr::LoadLocal("x".into()),
                                                   Instr::Binary(BinOp::Add),
                                                   Instr::Return]);
        assert_eq!(f.ops(), h.ops());
        assert_eq!(f.digest(), h.digest());
    }

    #[test]
    fn external_paths_are_collected_and_deduplicated() {
        let d = CallableDescriptor::canonicalize(&[],
                                                 vec![],
                                                 &[Instr::LoadGlobal("o".into()),
                                                   Instr::LoadAttr("get_x".into()),
                                                   Instr::Call(0),
                                                   Instr::LoadGlobal("o".into()),
                                                   Instr::LoadAttr("get_x".into()),
                                                   Instr::Call(0),
                                                   Instr::LoadGlobal("print".into()),
                                                   Instr::Return]);
        assert_eq!(d.externals().len(), 2);
        assert_eq!(d.reads(),
                   &[ExternalRead { slot: 0, path: vec!["get_x".into()] },
                     ExternalRead { slot: 1, path: vec![] }]);
    }

    #[test]
    fn receiver_reads_follow_first_param() {
        let d = CallableDescriptor::canonicalize(&params(&["self"]),
                                                 vec![],
                                                 &[Instr::LoadLocal("self".into()),
                                                   Instr::LoadAttr("x".into()),
                                                   Instr::Return]);
        assert_eq!(d.receiver_reads(), &[vec!["x".to_string()]]);
        assert!(d.reads().is_empty());
    }

    #[test]
    fn defaults_enter_the_digest() {
        let body = [Instr::LoadLocal("x".into()), Instr::Return];
        let a = CallableDescriptor::canonicalize(&params(&["x"]), vec![Literal::Int(42)], &body);
        let b = CallableDescriptor::canonicalize(&params(&["x"]), vec![Literal::Int(12)], &body);
        assert_ne!(a.digest(), b.digest());
    }
}
