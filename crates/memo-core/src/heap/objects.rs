//! Objetos del heap: módulos, clases, instancias y callables.

use indexmap::IndexMap;

use super::ObjectId;
use crate::descriptor::CallableDescriptor;
use crate::model::Value;

#[derive(Debug, Clone)]
pub enum Object {
    Module(Module),
    Class(Class),
    Instance(Instance),
    Callable(Callable),
}

impl Object {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Object::Module(_) => "module",
            Object::Class(_) => "class",
            Object::Instance(_) => "instance",
            Object::Callable(_) => "callable",
        }
    }
}

/// Namespace de globals. Se hashea por nombre cualificado.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub globals: IndexMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub module: String,
    pub name: String,
    /// Métodos y variables de clase.
    pub attributes: IndexMap<String, Value>,
}

impl Class {
    /// Identidad del tipo declarante (`modulo.Clase`).
    pub fn qualname(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub class: ObjectId,
    pub fields: IndexMap<String, Value>,
}

/// Callable declarado: lógica canónica + entorno desde el que se resuelven
/// sus referencias externas.
#[derive(Debug, Clone)]
pub struct Callable {
    /// Sólo informativo; no entra en el fingerprint.
    pub qualname: String,
    /// Módulo cuyos globals ve la traza.
    pub module: Option<ObjectId>,
    pub descriptor: CallableDescriptor,
    /// Celdas capturadas (`LoadDeref`).
    pub closure: IndexMap<String, Value>,
    /// Callable original si éste es un wrapper/decorador transparente.
    pub wrapped: Option<ObjectId>,
}
