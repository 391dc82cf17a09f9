//! Valor no clasificable. Su fingerprint es su identidad: un uuid asignado al
//! crearlo. Los clones comparten identidad; dos `Opaque` distintos nunca
//! colisionan, tampoco entre ejecuciones.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    id: Uuid,
    type_name: String,
}

impl Opaque {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(),
               type_name: type_name.into() }
    }

    /// Atajo que usa el nombre de tipo Rust de `value`.
    pub fn of<T: ?Sized>(_value: &T) -> Self {
        Self::new(std::any::type_name::<T>())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}
