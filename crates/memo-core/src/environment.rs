//! `ReferenceEnvironment`: valor actual de cada referencia externa de un
//! callable, resuelto por inspección estática (nunca ejecutando nada).
//!
//! Orden de resolución de la raíz:
//! - `LoadDeref`: celdas de la closure.
//! - `LoadGlobal`: globals del módulo, luego builtins registrados.
//! - `MakeFunction`: el callable anidado mismo.
//!
//! Los paths de atributos se recorren a través de módulos. Al llegar a una
//! instancia, clase u otro valor el resto del path queda pendiente para el
//! hasher, que sólo sigue los miembros desreferenciados.

use crate::descriptor::ExternalRoot;
use crate::heap::{Callable, Heap};
use crate::model::Value;

#[derive(Debug, Clone)]
pub enum Binding {
    Resolved { value: Value, pending: Vec<String> },
    Unresolved { name: String },
}

#[derive(Debug, Clone)]
pub struct EnvEntry {
    pub slot: u32,
    pub name: String,
    pub path: Vec<String>,
    pub binding: Binding,
}

impl EnvEntry {
    /// `raiz.attr1.attr2`
    pub fn dotted(&self) -> String {
        dotted(&self.name, &self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceEnvironment {
    entries: Vec<EnvEntry>,
}

impl ReferenceEnvironment {
    pub fn resolve(heap: &Heap, callable: &Callable) -> Self {
        let descriptor = &callable.descriptor;
        let entries = descriptor.reads()
                                .iter()
                                .filter_map(|read| {
                                    let root = descriptor.externals().get(read.slot as usize)?;
                                    let name = root.source_name();
                                    let binding = resolve_read(heap, callable, root, &read.path);
                                    Some(EnvEntry { slot: read.slot,
                                                    name,
                                                    path: read.path.clone(),
                                                    binding })
                                })
                                .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[EnvEntry] {
        &self.entries
    }

    /// Primera entrada cuyo nombre de fuente es `name`.
    pub fn get(&self, name: &str) -> Option<&EnvEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn resolve_read(heap: &Heap, callable: &Callable, root: &ExternalRoot, path: &[String]) -> Binding {
    let root_value = match root {
        ExternalRoot::Deref(name) => callable.closure.get(name).cloned(),
        ExternalRoot::Global(name) => callable.module
                                              .and_then(|m| heap.module(m))
                                              .and_then(|m| m.globals.get(name).cloned())
                                              .or_else(|| heap.builtin_value(name)),
        ExternalRoot::Nested(id) => heap.callable(*id).map(|_| Value::Callable(*id)),
    };
    let Some(value) = root_value else {
        return Binding::Unresolved { name: dotted(&root.source_name(), path) };
    };
    walk_modules(heap, value, path, &root.source_name())
}

/// Avanza por el path mientras el valor actual sea un módulo.
pub(crate) fn walk_modules(heap: &Heap, mut value: Value, path: &[String], root_name: &str) -> Binding {
    let mut rest = path;
    loop {
        let Value::Module(id) = value else { break };
        let Some((attr, tail)) = rest.split_first() else { break };
        match heap.module(id).and_then(|m| m.globals.get(attr)) {
            Some(next) => {
                value = next.clone();
                rest = tail;
            }
            None => return Binding::Unresolved { name: dotted(root_name, path) },
        }
    }
    Binding::Resolved { value,
                        pending: rest.to_vec() }
}

pub(crate) fn dotted(root: &str, path: &[String]) -> String {
    let mut out = root.to_string();
    for p in path {
        out.push('.');
        out.push_str(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Instr;
    use crate::heap::CallableBuilder;

    #[test]
    fn resolves_closure_global_builtin_and_module_paths() {
        let mut heap = Heap::new();
        let lib = heap.add_module("lib");
        let api = heap.add_module("lib.api");
        heap.set_global(lib, "api", Value::Module(api)).unwrap();
        heap.set_global(api, "version", 3).unwrap();
        let app = heap.add_module("app");
        heap.set_global(app, "lib", Value::Module(lib)).unwrap();
        heap.set_global(app, "x", 42).unwrap();

        let f = CallableBuilder::new("app.f").in_module(app)
                                             .capture("c", 7)
                                             .instrs([Instr::LoadDeref("c".into()),
                                                      Instr::LoadGlobal("x".into()),
                                                      Instr::LoadGlobal("print".into()),
                                                      Instr::LoadGlobal("lib".into()),
                                                      Instr::LoadAttr("api".into()),
                                                      Instr::LoadAttr("version".into()),
                                                      Instr::LoadGlobal("lib".into()),
                                                      Instr::LoadAttr("missing".into()),
                                                      Instr::LoadGlobal("nowhere".into())])
                                             .build();
        let env = ReferenceEnvironment::resolve(&heap, &f);
        assert_eq!(env.len(), 6);
        assert!(matches!(env.get("c").unwrap().binding, Binding::Resolved { value: Value::Int(7), .. }));
        assert!(matches!(env.get("x").unwrap().binding, Binding::Resolved { value: Value::Int(42), .. }));
        assert!(matches!(env.get("print").unwrap().binding,
                         Binding::Resolved { value: Value::Builtin(ref n), .. } if n == "builtins.print"));
        assert!(matches!(env.entries()[3].binding, Binding::Resolved { value: Value::Int(3), ref pending } if pending.is_empty()));
        assert!(matches!(env.entries()[4].binding, Binding::Unresolved { ref name } if name == "lib.missing"));
        assert!(matches!(env.get("nowhere").unwrap().binding, Binding::Unresolved { .. }));
    }

    #[test]
    fn instance_paths_stay_pending() {
        let mut heap = Heap::new();
        let app = heap.add_module("app");
        let cls = heap.add_class("app", "Foo");
        let o = heap.add_instance(cls).unwrap();
        heap.set_global(app, "o", Value::Instance(o)).unwrap();
        let f = CallableBuilder::new("app.f").in_module(app)
                                             .instrs([Instr::LoadGlobal("o".into()),
                                                      Instr::LoadAttr("get_x".into()),
                                                      Instr::Call(0)])
                                             .build();
        let env = ReferenceEnvironment::resolve(&heap, &f);
        assert!(matches!(env.entries()[0].binding,
                         Binding::Resolved { value: Value::Instance(id), ref pending } if id == o && pending == &vec!["get_x".to_string()]));
    }
}
