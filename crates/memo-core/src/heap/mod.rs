//! Arena de objetos que pueden formar ciclos.
//!
//! Los enlaces entre objetos son siempre `ObjectId` (nunca referencias Rust),
//! y el hasher los recorre pasando por un `VisitSet`. El heap es de sólo
//! lectura durante el hashing (`&Heap`); los mutadores (`set_global`,
//! `set_closure`, ...) modelan el re-binding del estado referenciado entre
//! llamadas.

pub mod builder;
pub mod objects;

use std::collections::BTreeSet;
use std::fmt;

use crate::errors::CoreError;
use crate::model::Value;

pub use builder::CallableBuilder;
pub use objects::{Callable, Class, Instance, Module, Object};

/// Índice estable dentro de un `Heap`. No entra nunca en un digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Builtins registrados por `Heap::new`.
pub const DEFAULT_BUILTINS: &[&str] = &["abs", "all", "any", "bool", "dict", "enumerate", "filter", "float", "int", "isinstance", "len", "list", "map", "max", "min", "open", "print", "range", "repr", "round", "set", "sorted", "str", "sum", "tuple", "type", "zip"];

#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: Vec<Object>,
    builtins: BTreeSet<String>,
}

impl Heap {
    /// Heap con los builtins por defecto.
    pub fn new() -> Self {
        let mut heap = Self::empty();
        for name in DEFAULT_BUILTINS {
            heap.register_builtin(*name);
        }
        heap
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register_builtin(&mut self, name: impl Into<String>) {
        self.builtins.insert(name.into());
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name)
    }

    /// Nombre cualificado estable de un builtin.
    pub fn builtin_value(&self, name: &str) -> Option<Value> {
        self.is_builtin(name).then(|| Value::Builtin(format!("builtins.{name}")))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn push(&mut self, obj: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(obj);
        id
    }

    pub fn add_module(&mut self, name: impl Into<String>) -> ObjectId {
        self.push(Object::Module(Module { name: name.into(),
                                          globals: Default::default() }))
    }

    pub fn add_class(&mut self, module: impl Into<String>, name: impl Into<String>) -> ObjectId {
        self.push(Object::Class(Class { module: module.into(),
                                        name: name.into(),
                                        attributes: Default::default() }))
    }

    pub fn add_instance(&mut self, class: ObjectId) -> Result<ObjectId, CoreError> {
        self.class(class).ok_or_else(|| self.kind_error(class, "class"))?;
        Ok(self.push(Object::Instance(Instance { class,
                                                 fields: Default::default() })))
    }

    pub fn add_callable(&mut self, callable: Callable) -> ObjectId {
        self.push(Object::Callable(callable))
    }

    /// Construye el callable dentro de `module` y lo enlaza como global
    /// `name` (habilita la auto-referencia por nombre).
    pub fn define(&mut self, module: ObjectId, name: &str, builder: CallableBuilder) -> Result<ObjectId, CoreError> {
        self.module(module).ok_or_else(|| self.kind_error(module, "module"))?;
        let id = self.add_callable(builder.in_module(module).build());
        self.set_global(module, name, Value::Callable(id))?;
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    pub fn module(&self, id: ObjectId) -> Option<&Module> {
        match self.get(id) {
            Some(Object::Module(m)) => Some(m),
            _ => None,
        }
    }

    pub fn class(&self, id: ObjectId) -> Option<&Class> {
        match self.get(id) {
            Some(Object::Class(c)) => Some(c),
            _ => None,
        }
    }

    pub fn instance(&self, id: ObjectId) -> Option<&Instance> {
        match self.get(id) {
            Some(Object::Instance(i)) => Some(i),
            _ => None,
        }
    }

    pub fn callable(&self, id: ObjectId) -> Option<&Callable> {
        match self.get(id) {
            Some(Object::Callable(c)) => Some(c),
            _ => None,
        }
    }

    pub fn set_global(&mut self, module: ObjectId, name: impl Into<String>, value: impl Into<Value>) -> Result<(), CoreError> {
        if let Some(Object::Module(m)) = self.objects.get_mut(module.index()) {
            m.globals.insert(name.into(), value.into());
            return Ok(());
        }
        Err(self.kind_error(module, "module"))
    }

    pub fn set_class_attr(&mut self, class: ObjectId, name: impl Into<String>, value: impl Into<Value>) -> Result<(), CoreError> {
        if let Some(Object::Class(c)) = self.objects.get_mut(class.index()) {
            c.attributes.insert(name.into(), value.into());
            return Ok(());
        }
        Err(self.kind_error(class, "class"))
    }

    pub fn set_field(&mut self, instance: ObjectId, name: impl Into<String>, value: impl Into<Value>) -> Result<(), CoreError> {
        if let Some(Object::Instance(i)) = self.objects.get_mut(instance.index()) {
            i.fields.insert(name.into(), value.into());
            return Ok(());
        }
        Err(self.kind_error(instance, "instance"))
    }

    pub fn set_closure(&mut self, callable: ObjectId, name: impl Into<String>, value: impl Into<Value>) -> Result<(), CoreError> {
        if let Some(Object::Callable(c)) = self.objects.get_mut(callable.index()) {
            c.closure.insert(name.into(), value.into());
            return Ok(());
        }
        Err(self.kind_error(callable, "callable"))
    }

    fn kind_error(&self, id: ObjectId, expected: &'static str) -> CoreError {
        match self.get(id) {
            None => CoreError::UnknownObject(id),
            Some(_) => CoreError::WrongKind { id, expected },
        }
    }
}
