//! Tags de tipo. Cada digest empieza por versión + tag, así `true` y `1`,
//! o una tupla y una lista, nunca comparten input.

pub const UNIT: u8 = 0x01;
pub const BOOL: u8 = 0x02;
pub const INT: u8 = 0x03;
pub const FLOAT: u8 = 0x04;
pub const STR: u8 = 0x05;
pub const BYTES: u8 = 0x06;
pub const LIST: u8 = 0x07;
pub const TUPLE: u8 = 0x08;
pub const SET: u8 = 0x09;
pub const MAP: u8 = 0x0a;
pub const TABLE: u8 = 0x0b;
pub const FILE: u8 = 0x0c;
pub const FILE_PATH_ONLY: u8 = 0x0d;
pub const BUILTIN: u8 = 0x0e;
pub const MODULE: u8 = 0x0f;
pub const CLASS: u8 = 0x10;
pub const CLASS_VIEW: u8 = 0x11;
pub const INSTANCE: u8 = 0x12;
pub const INSTANCE_VIEW: u8 = 0x13;
pub const CALLABLE: u8 = 0x14;
pub const BOUND_METHOD: u8 = 0x15;
pub const OPAQUE: u8 = 0x16;
pub const UNRESOLVED: u8 = 0x17;
pub const CYCLE: u8 = 0x18;
pub const DESCRIPTOR: u8 = 0x20;
pub const MEMO_KEY: u8 = 0x30;
