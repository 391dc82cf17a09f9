//! `Value`: unión etiquetada de todo lo que el hasher sabe fingerprintear.
//!
//! Los valores "planos" (primitivos, contenedores, tablas, ficheros) forman
//! un árbol. Los objetos que pueden formar ciclos (módulos, clases,
//! instancias, callables) viven en el `Heap` y aquí sólo aparecen como
//! `ObjectId`.

use serde_json::Value as Json;

use super::{FileRef, Opaque, Table};
use crate::heap::ObjectId;

#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Secuencia ordenada mutable (sensible al orden).
    List(Vec<Value>),
    /// Secuencia ordenada inmutable; nunca colisiona con `List`.
    Tuple(Vec<Value>),
    /// Conjunto: el orden de los elementos no influye.
    Set(Vec<Value>),
    /// Mapping: el orden de inserción de los pares no influye.
    Map(Vec<(Value, Value)>),
    Table(Table),
    File(FileRef),
    /// Builtin identificado por su nombre cualificado estable.
    Builtin(String),
    Module(ObjectId),
    Class(ObjectId),
    Instance(ObjectId),
    Callable(ObjectId),
    /// Último recurso: identidad sin garantías entre ejecuciones.
    Opaque(Opaque),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(b.into())
    }

    pub fn list<I, V>(items: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<I, V>(items: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn set<I, V>(items: I) -> Self
        where I: IntoIterator<Item = V>,
              V: Into<Value>
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(pairs: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<Value>,
              V: Into<Value>
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Value::Builtin(name.into())
    }

    /// Nombre del tipo de valor (logs y mensajes de error).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Table(_) => "table",
            Value::File(_) => "file",
            Value::Builtin(_) => "builtin",
            Value::Module(_) => "module",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Callable(_) => "callable",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! int_into_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self { Value::Int(v as i128) }
        })*
    };
}

int_into_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Table> for Value {
    fn from(v: Table) -> Self {
        Value::Table(v)
    }
}

impl From<FileRef> for Value {
    fn from(v: FileRef) -> Self {
        Value::File(v)
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Value::Opaque(v)
    }
}

/// JSON -> `Value`: objetos a `Map`, arrays a `List`, `null` a `Unit`.
/// Números enteros que caben en i64/u64 se mantienen como `Int`.
impl From<Json> for Value {
    fn from(v: Json) -> Self {
        match v {
            Json::Null => Value::Unit,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i as i128)
                } else if let Some(u) = n.as_u64() {
                    Value::Int(u as i128)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (Value::Str(k), Value::from(v))).collect()),
        }
    }
}
