//! Builder explícito de callables.
//!
//! Rust no ofrece introspección de closures, así que la lógica y el estado
//! referenciado se declaran por adelantado: parámetros, defaults, traza,
//! módulo, capturas y (opcionalmente) el callable envuelto.

use indexmap::IndexMap;

use super::objects::Callable;
use super::ObjectId;
use crate::descriptor::{CallableDescriptor, Instr, Literal};
use crate::model::Value;

#[derive(Debug, Clone)]
pub struct CallableBuilder {
    qualname: String,
    params: Vec<String>,
    defaults: Vec<Literal>,
    body: Vec<Instr>,
    module: Option<ObjectId>,
    closure: IndexMap<String, Value>,
    wrapped: Option<ObjectId>,
}

impl CallableBuilder {
    pub fn new(qualname: impl Into<String>) -> Self {
        Self { qualname: qualname.into(),
               params: Vec::new(),
               defaults: Vec::new(),
               body: Vec::new(),
               module: None,
               closure: IndexMap::new(),
               wrapped: None }
    }

    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    pub fn params<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.params.extend(names.into_iter().map(Into::into));
        self
    }

    /// Default de los últimos parámetros, en orden.
    pub fn default_value(mut self, lit: impl Into<Literal>) -> Self {
        self.defaults.push(lit.into());
        self
    }

    pub fn instr(mut self, instr: Instr) -> Self {
        self.body.push(instr);
        self
    }

    pub fn instrs(mut self, instrs: impl IntoIterator<Item = Instr>) -> Self {
        self.body.extend(instrs);
        self
    }

    pub fn in_module(mut self, module: ObjectId) -> Self {
        self.module = Some(module);
        self
    }

    /// Captura de closure visible vía `Instr::LoadDeref(name)`.
    pub fn capture(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.closure.insert(name.into(), value.into());
        self
    }

    /// Marca este callable como wrapper transparente de `inner`.
    pub fn wraps(mut self, inner: ObjectId) -> Self {
        self.wrapped = Some(inner);
        self
    }

    pub fn qualname(&self) -> &str {
        &self.qualname
    }

    pub fn build(self) -> Callable {
        let descriptor = CallableDescriptor::canonicalize(&self.params, self.defaults, &self.body);
        Callable { qualname: self.qualname,
                   module: self.module,
                   descriptor,
                   closure: self.closure,
                   wrapped: self.wrapped }
    }
}
