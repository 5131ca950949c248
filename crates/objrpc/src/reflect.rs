//! Type descriptors for declared receiver methods.
//!
//! Rust has no runtime method reflection, so every receiver describes its
//! method surface explicitly. A [`Signature`] lists the method's inputs and
//! outputs as data, which is what the registry validates. The typed helpers on
//! [`MethodTable`](crate::receiver::MethodTable) build signatures from Rust
//! types; hand-written declarations can describe any shape.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;

use crate::error::MethodError;

/// Identity and printable name of a Rust type.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Descriptor of the conventional error output.
    pub fn error() -> Self {
        Self::of::<MethodError>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this is the conventional error type (by identity).
    pub fn is_error(&self) -> bool {
        self.id == TypeId::of::<MethodError>()
    }

    pub(crate) fn is_unit(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a decoded argument reaches the method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Passing {
    /// Decoded into a temporary and moved into the call.
    Value,
    /// Decoded into a freshly allocated instance; the method gets `&mut T`.
    Reference,
}

type DecodeFn = fn(&[u8]) -> serde_json::Result<Box<dyn Any + Send>>;

fn decode_as<T: DeserializeOwned + Send + 'static>(
    raw: &[u8],
) -> serde_json::Result<Box<dyn Any + Send>> {
    let value: T = serde_json::from_slice(raw)?;
    Ok(Box::new(value))
}

/// One declared input parameter.
#[derive(Clone, Copy)]
pub struct ParamType {
    ty: TypeInfo,
    passing: Passing,
    decode: DecodeFn,
}

impl ParamType {
    /// Parameter passed by value.
    pub fn value<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            passing: Passing::Value,
            decode: decode_as::<T>,
        }
    }

    /// Parameter decoded into an owned instance and passed as `&mut T`.
    pub fn reference<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            ty: TypeInfo::of::<T>(),
            passing: Passing::Reference,
            decode: decode_as::<T>,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    pub fn passing(&self) -> Passing {
        self.passing
    }

    /// Decode a raw JSON payload into an argument for this parameter.
    pub fn decode(&self, raw: &[u8]) -> serde_json::Result<Argument> {
        let value = (self.decode)(raw)?;
        Ok(Argument {
            passing: self.passing,
            value,
        })
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamType")
            .field("ty", &self.ty.name)
            .field("passing", &self.passing)
            .finish()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.passing {
            Passing::Value => write!(f, "{}", self.ty),
            Passing::Reference => write!(f, "&mut {}", self.ty),
        }
    }
}

/// Declared inputs and outputs of a method.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    inputs: Vec<ParamType>,
    outputs: Vec<TypeInfo>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a by-value input.
    pub fn input<T: DeserializeOwned + Send + 'static>(mut self) -> Self {
        self.inputs.push(ParamType::value::<T>());
        self
    }

    /// Append a by-reference input.
    pub fn input_ref<T: DeserializeOwned + Send + 'static>(mut self) -> Self {
        self.inputs.push(ParamType::reference::<T>());
        self
    }

    /// Append an output of type `T`. Use [`MethodError`] for the error output.
    pub fn output<T: ?Sized + 'static>(mut self) -> Self {
        self.outputs.push(TypeInfo::of::<T>());
        self
    }

    pub(crate) fn with_outputs(mut self, outputs: Vec<TypeInfo>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn inputs(&self) -> &[ParamType] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TypeInfo] {
        &self.outputs
    }
}

/// A decoded argument handed to a method body.
pub struct Argument {
    passing: Passing,
    value: Box<dyn Any + Send>,
}

impl Argument {
    pub fn passing(&self) -> Passing {
        self.passing
    }

    /// Take the argument by value. Returns the argument back on a type mismatch.
    pub fn into_value<T: 'static>(self) -> Result<T, Self> {
        let passing = self.passing;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { passing, value }),
        }
    }

    /// Borrow the owned instance mutably.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("passing", &self.passing)
            .finish_non_exhaustive()
    }
}

/// A value output that is encoded lazily, only when it is actually returned.
pub trait EncodeJson: Send {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + Send> EncodeJson for T {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// One runtime output of an invoked method body.
pub enum Slot {
    /// A value output.
    Value(Box<dyn EncodeJson>),
    /// An error output; `None` is the nil error.
    Error(Option<MethodError>),
    /// Placeholder for a value output that was not produced because the
    /// method failed.
    Zero,
}

impl Slot {
    pub fn value<T: Serialize + Send + 'static>(value: T) -> Self {
        Slot::Value(Box::new(value))
    }

    pub fn ok() -> Self {
        Slot::Error(None)
    }

    pub fn err(error: impl fmt::Display) -> Self {
        Slot::Error(Some(MethodError::new(error)))
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(_) => f.write_str("Slot::Value(..)"),
            Slot::Error(err) => f.debug_tuple("Slot::Error").field(err).finish(),
            Slot::Zero => f.write_str("Slot::Zero"),
        }
    }
}
