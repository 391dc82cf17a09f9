//! `ContentHasher`: fingerprint determinista de cualquier `Value`.
//!
//! Contrato:
//! - Nunca falla. Lo no clasificable cae en identidad (`Opaque`), lo no
//!   resolvible en un fingerprint sólo-nombre; ambos casos se registran con
//!   `debug!`.
//! - Ningún dato dependiente de memoria, tiempo o hilo entra al digest
//!   (`ObjectId` sólo se usa para el `VisitSet`).
//! - Un `VisitSet` nuevo por cada `hash()` de nivel superior.
//!
//! Callables: digest(descriptor) + (slot, path, fingerprint) de cada lectura
//! externa en orden de descubrimiento. Instancias alcanzadas vía path: tipo +
//! sólo los miembros leídos.

use std::collections::HashSet;

use log::{debug, warn};

use super::visit::{sentinel, VisitSet};
use super::{tags, DigestWriter};
use crate::descriptor::Literal;
use crate::environment::{dotted, walk_modules, Binding, ReferenceEnvironment};
use crate::errors::HashError;
use crate::heap::{Heap, ObjectId};
use crate::model::{FileRef, Fingerprint, Opaque, Table, Value};

/// Atajo: fingerprint de `value` con un `VisitSet` nuevo.
pub fn hash(heap: &Heap, value: &Value) -> Fingerprint {
    ContentHasher::new(heap).hash(value)
}

pub struct ContentHasher<'h> {
    heap: &'h Heap,
    visiting: VisitSet,
}

impl<'h> ContentHasher<'h> {
    pub fn new(heap: &'h Heap) -> Self {
        Self { heap,
               visiting: VisitSet::new() }
    }

    pub fn hash(&mut self, value: &Value) -> Fingerprint {
        match value {
            Value::Unit => fp_unit(),
            Value::Bool(b) => fp_bool(*b),
            Value::Int(i) => fp_int(*i),
            Value::Float(f) => fp_float(*f),
            Value::Str(s) => fp_str(s),
            Value::Bytes(b) => fp_bytes(b),
            Value::List(items) => self.hash_sequence(tags::LIST, items),
            Value::Tuple(items) => self.hash_sequence(tags::TUPLE, items),
            Value::Set(items) => self.hash_set(items),
            Value::Map(pairs) => self.hash_map(pairs),
            Value::Table(t) => self.hash_table(t),
            Value::File(f) => hash_file(f),
            Value::Builtin(name) => DigestWriter::new(tags::BUILTIN).str(name).finish(),
            Value::Module(id) => self.hash_module(*id),
            Value::Class(id) => self.hash_class(*id),
            Value::Instance(id) => self.hash_instance(*id),
            Value::Callable(id) => self.hash_callable(*id),
            Value::Opaque(o) => hash_opaque(o),
        }
    }

    fn hash_sequence(&mut self, tag: u8, items: &[Value]) -> Fingerprint {
        let fps: Vec<Fingerprint> = items.iter().map(|v| self.hash(v)).collect();
        fp_sequence(tag, &fps)
    }

    fn hash_set(&mut self, items: &[Value]) -> Fingerprint {
        let mut fps: Vec<Fingerprint> = items.iter().map(|v| self.hash(v)).collect();
        fps.sort_unstable();
        fps.dedup();
        fp_sequence(tags::SET, &fps)
    }

    fn hash_map(&mut self, pairs: &[(Value, Value)]) -> Fingerprint {
        let mut fps: Vec<(Fingerprint, Fingerprint)> = pairs.iter().map(|(k, v)| (self.hash(k), self.hash(v))).collect();
        fps.sort_unstable();
        let mut w = DigestWriter::new(tags::MAP);
        w.count(fps.len());
        for (k, v) in &fps {
            w.fingerprint(k).fingerprint(v);
        }
        w.finish()
    }

    fn hash_table(&mut self, table: &Table) -> Fingerprint {
        let mut w = DigestWriter::new(tags::TABLE);
        w.count(table.n_cols());
        for col in table.columns() {
            w.str(&col.name).u8(col.kind.tag());
        }
        w.count(table.n_rows());
        for row in table.rows() {
            for cell in row {
                let fp = self.hash(cell);
                w.fingerprint(&fp);
            }
        }
        w.finish()
    }

    fn hash_module(&mut self, id: ObjectId) -> Fingerprint {
        match self.heap.module(id) {
            Some(m) => DigestWriter::new(tags::MODULE).str(&m.name).finish(),
            None => unresolved(&id.to_string()),
        }
    }

    /// Clase completa: identidad + atributos ordenados por nombre.
    fn hash_class(&mut self, id: ObjectId) -> Fingerprint {
        let heap = self.heap;
        let Some(class) = heap.class(id) else {
            return unresolved(&id.to_string());
        };
        if !self.visiting.enter(id) {
            return sentinel();
        }
        let mut attrs: Vec<(&String, &Value)> = class.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        let mut w = DigestWriter::new(tags::CLASS);
        w.str(&class.qualname()).count(attrs.len());
        for (name, value) in attrs {
            let fp = self.hash(value);
            w.str(name).fingerprint(&fp);
        }
        self.visiting.leave(id);
        w.finish()
    }

    /// Instancia completa: tipo + todos los campos ordenados por nombre.
    fn hash_instance(&mut self, id: ObjectId) -> Fingerprint {
        let heap = self.heap;
        let Some(inst) = heap.instance(id) else {
            return unresolved(&id.to_string());
        };
        if !self.visiting.enter(id) {
            return sentinel();
        }
        let mut fields: Vec<(&String, &Value)> = inst.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let mut w = DigestWriter::new(tags::INSTANCE);
        w.str(&self.type_identity(inst.class)).count(fields.len());
        for (name, value) in fields {
            let fp = self.hash(value);
            w.str(name).fingerprint(&fp);
        }
        self.visiting.leave(id);
        w.finish()
    }

    pub fn hash_callable(&mut self, id: ObjectId) -> Fingerprint {
        let target = self.unwrap_callable(id);
        if self.heap.callable(target).is_none() {
            return unresolved(&target.to_string());
        }
        if !self.visiting.enter(target) {
            return sentinel();
        }
        let fp = self.callable_digest(target);
        self.visiting.leave(target);
        fp
    }

    /// Sigue la cadena `wrapped` hasta el callable original.
    fn unwrap_callable(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        let mut seen = HashSet::new();
        while let Some(inner) = self.heap.callable(current).and_then(|c| c.wrapped) {
            if !seen.insert(current) {
                break;
            }
            current = inner;
        }
        current
    }

    /// Requiere `target` ya marcado en el `VisitSet`.
    fn callable_digest(&mut self, target: ObjectId) -> Fingerprint {
        let heap = self.heap;
        let Some(callable) = heap.callable(target) else {
            return unresolved(&target.to_string());
        };
        let env = ReferenceEnvironment::resolve(heap, callable);
        let mut w = DigestWriter::new(tags::CALLABLE);
        w.fingerprint(&callable.descriptor.digest()).count(env.len());
        for entry in env.entries() {
            w.u32(entry.slot).count(entry.path.len());
            for attr in &entry.path {
                w.str(attr);
            }
            let fp = match &entry.binding {
                Binding::Resolved { value, pending } => self.hash_path(value, pending, &entry.dotted()),
                Binding::Unresolved { name } => unresolved(name),
            };
            w.fingerprint(&fp);
        }
        w.finish()
    }

    /// Fingerprint de lo que se lee al recorrer `path` desde `value`.
    fn hash_path(&mut self, value: &Value, path: &[String], name: &str) -> Fingerprint {
        if path.is_empty() {
            return self.hash(value);
        }
        match value {
            Value::Instance(id) => self.hash_instance_view(*id, path, name),
            Value::Class(id) => self.hash_class_view(*id, path, name),
            Value::Module(_) => match walk_modules(self.heap, value.clone(), path, name) {
                Binding::Resolved { value, pending } => self.hash_path(&value, &pending, name),
                Binding::Unresolved { name } => unresolved(&name),
            },
            // atributos sobre valores planos: ya están en la traza
            other => self.hash(other),
        }
    }

    /// Instancia vista a través de un path: tipo + miembro leído.
    fn hash_instance_view(&mut self, id: ObjectId, path: &[String], name: &str) -> Fingerprint {
        let heap = self.heap;
        let (Some(inst), Some((attr, rest))) = (heap.instance(id), path.split_first()) else {
            return unresolved(name);
        };
        let type_name = self.type_identity(inst.class);
        let member = match inst.fields.get(attr) {
            Some(v) => self.hash_path(v, rest, name),
            None => match heap.class(inst.class).and_then(|c| c.attributes.get(attr)) {
                Some(Value::Callable(m)) => self.hash_bound_method(*m, id, rest),
                Some(v) => self.hash_path(v, rest, name),
                None => unresolved(&format!("{type_name}.{attr}")),
            },
        };
        DigestWriter::new(tags::INSTANCE_VIEW).str(&type_name)
                                              .str(attr)
                                              .fingerprint(&member)
                                              .finish()
    }

    fn hash_class_view(&mut self, id: ObjectId, path: &[String], name: &str) -> Fingerprint {
        let heap = self.heap;
        let (Some(class), Some((attr, rest))) = (heap.class(id), path.split_first()) else {
            return unresolved(name);
        };
        let member = match class.attributes.get(attr) {
            Some(v) => self.hash_path(v, rest, name),
            None => unresolved(&format!("{}.{attr}", class.qualname())),
        };
        DigestWriter::new(tags::CLASS_VIEW).str(&class.qualname())
                                           .str(attr)
                                           .fingerprint(&member)
                                           .finish()
    }

    /// Método ligado: lógica del método + miembros del receptor que lee vía
    /// `self.<path>`.
    fn hash_bound_method(&mut self, method: ObjectId, receiver: ObjectId, rest: &[String]) -> Fingerprint {
        let heap = self.heap;
        let target = self.unwrap_callable(method);
        let Some(callable) = heap.callable(target) else {
            return unresolved(&target.to_string());
        };
        if !self.visiting.enter_bound(target, receiver) {
            return sentinel();
        }
        let logic = self.hash_callable(target);
        let receiver_reads = callable.descriptor.receiver_reads();
        let mut w = DigestWriter::new(tags::BOUND_METHOD);
        w.fingerprint(&logic).count(receiver_reads.len());
        for path in receiver_reads {
            let fp = self.hash_instance_view(receiver, path, &dotted("self", path));
            w.count(path.len());
            for attr in path {
                w.str(attr);
            }
            w.fingerprint(&fp);
        }
        w.count(rest.len());
        for attr in rest {
            w.str(attr);
        }
        self.visiting.leave_bound(target, receiver);
        w.finish()
    }

    fn type_identity(&self, class: ObjectId) -> String {
        self.heap
            .class(class)
            .map(|c| c.qualname())
            .unwrap_or_else(|| format!("<unknown class {class}>"))
    }
}

fn hash_file(file: &FileRef) -> Fingerprint {
    let path = file.path().to_string_lossy();
    match file.offset() {
        Ok(offset) => DigestWriter::new(tags::FILE).str(&path).u64(offset).finish(),
        Err(e) => {
            warn!("{}", HashError::FileOffset { path: path.to_string(),
                                                reason: e.to_string() });
            DigestWriter::new(tags::FILE_PATH_ONLY).str(&path).finish()
        }
    }
}

fn hash_opaque(o: &Opaque) -> Fingerprint {
    debug!("{}", HashError::UnsupportedValue { type_name: o.type_name().to_string() });
    DigestWriter::new(tags::OPAQUE).bytes(o.id().as_bytes())
                                   .str(o.type_name())
                                   .finish()
}

fn unresolved(name: &str) -> Fingerprint {
    debug!("{}", HashError::UnresolvableReference { name: name.to_string() });
    DigestWriter::new(tags::UNRESOLVED).str(name).finish()
}

fn fp_unit() -> Fingerprint {
    DigestWriter::new(tags::UNIT).finish()
}

fn fp_bool(b: bool) -> Fingerprint {
    DigestWriter::new(tags::BOOL).u8(b as u8).finish()
}

fn fp_int(i: i128) -> Fingerprint {
    DigestWriter::new(tags::INT).int(i).finish()
}

fn fp_float(f: f64) -> Fingerprint {
    DigestWriter::new(tags::FLOAT).u64(f.to_bits()).finish()
}

fn fp_str(s: &str) -> Fingerprint {
    DigestWriter::new(tags::STR).str(s).finish()
}

fn fp_bytes(b: &[u8]) -> Fingerprint {
    DigestWriter::new(tags::BYTES).bytes(b).finish()
}

fn fp_sequence(tag: u8, fps: &[Fingerprint]) -> Fingerprint {
    let mut w = DigestWriter::new(tag);
    w.count(fps.len());
    for fp in fps {
        w.fingerprint(fp);
    }
    w.finish()
}

/// Fingerprint de un literal; coincide con el del `Value` equivalente.
pub(crate) fn literal_fingerprint(lit: &Literal) -> Fingerprint {
    match lit {
        Literal::Unit => fp_unit(),
        Literal::Bool(b) => fp_bool(*b),
        Literal::Int(i) => fp_int(*i),
        Literal::Float(f) => fp_float(*f),
        Literal::Str(s) => fp_str(s),
        Literal::Bytes(b) => fp_bytes(b),
        Literal::Tuple(items) => {
            let fps: Vec<Fingerprint> = items.iter().map(literal_fingerprint).collect();
            fp_sequence(tags::TUPLE, &fps)
        }
    }
}
