//! Declaring a receiver's method surface.
//!
//! A receiver implements [`Receiver`] and lists its methods into a
//! [`MethodTable`]. The typed helpers cover the usual shapes:
//!
//! ```rust,ignore
//! struct Api;
//!
//! impl Receiver for Api {
//!     fn declare(methods: &mut MethodTable<Self>) {
//!         methods
//!             .method("Version", |_: &Api| "1.2.0")
//!             .method_with("Half", |_: &Api, i: i64| i / 2)
//!             .method_with("Open", |_: &Api, path: String| std::fs::read_to_string(path));
//!     }
//! }
//! ```
//!
//! Output shapes are read from the closure's return type through [`Returns`]:
//! `()` has no outputs, `Result<(), E>` has only an error output,
//! `Result<T, E>` has a value and an error, and plain serializable values
//! have only a value output.
//!
//! [`MethodDecl::new`] takes an explicit [`Signature`] for methods whose shape
//! is only known at runtime. Those are validated when the registry is built.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::CallError;
use crate::reflect::{Argument, Signature, Slot, TypeInfo};

/// What a method body produces: one slot per declared output.
pub type BodyResult = std::result::Result<Vec<Slot>, CallError>;

/// Type-erased method body. Receives the receiver and the decoded arguments.
pub type MethodBody<R> = Arc<dyn Fn(&R, Vec<Argument>) -> BodyResult + Send + Sync>;

/// An object whose methods are exposed over RPC.
pub trait Receiver: Send + Sync + Sized + 'static {
    /// List every method of the receiver.
    fn declare(methods: &mut MethodTable<Self>);
}

/// Whether a declared method is callable over RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    /// Listed for completeness but never registered or validated.
    Private,
}

/// One declared method.
pub struct MethodDecl<R> {
    name: String,
    visibility: Visibility,
    signature: Signature,
    body: MethodBody<R>,
}

impl<R> MethodDecl<R> {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&R, Vec<Argument>) -> BodyResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            signature,
            body: Arc::new(body),
        }
    }

    /// Mark the method private.
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn into_parts(self) -> (String, Signature, MethodBody<R>) {
        (self.name, self.signature, self.body)
    }
}

impl<R> fmt::Debug for MethodDecl<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Collects the method declarations of one receiver.
pub struct MethodTable<R> {
    decls: Vec<MethodDecl<R>>,
}

impl<R> Default for MethodTable<R> {
    fn default() -> Self {
        Self { decls: Vec::new() }
    }
}

impl<R: 'static> MethodTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a method without input.
    pub fn method<O, F>(&mut self, name: &str, f: F) -> &mut Self
    where
        O: Returns,
        F: Fn(&R) -> O + Send + Sync + 'static,
    {
        let signature = Signature::new().with_outputs(O::outputs());
        let owned = name.to_string();
        let body = move |recv: &R, args: Vec<Argument>| -> BodyResult {
            if !args.is_empty() {
                return Err(CallError::SignatureMismatch(owned.clone()));
            }
            Ok(f(recv).into_slots())
        };
        self.declare(MethodDecl::new(name, signature, body))
    }

    /// Declare a method taking one argument by value.
    pub fn method_with<T, O, F>(&mut self, name: &str, f: F) -> &mut Self
    where
        T: DeserializeOwned + Send + 'static,
        O: Returns,
        F: Fn(&R, T) -> O + Send + Sync + 'static,
    {
        let signature = Signature::new().input::<T>().with_outputs(O::outputs());
        let owned = name.to_string();
        let body = move |recv: &R, args: Vec<Argument>| -> BodyResult {
            let arg = single(&owned, args)?
                .into_value::<T>()
                .map_err(|_| CallError::SignatureMismatch(owned.clone()))?;
            Ok(f(recv, arg).into_slots())
        };
        self.declare(MethodDecl::new(name, signature, body))
    }

    /// Declare a method taking one argument by mutable reference. The
    /// argument is decoded into a fresh owned instance for every call.
    pub fn method_with_ref<T, O, F>(&mut self, name: &str, f: F) -> &mut Self
    where
        T: DeserializeOwned + Send + 'static,
        O: Returns,
        F: Fn(&R, &mut T) -> O + Send + Sync + 'static,
    {
        let signature = Signature::new()
            .input_ref::<T>()
            .with_outputs(O::outputs());
        let owned = name.to_string();
        let body = move |recv: &R, args: Vec<Argument>| -> BodyResult {
            let mut arg = single(&owned, args)?;
            let slot = arg
                .get_mut::<T>()
                .ok_or_else(|| CallError::SignatureMismatch(owned.clone()))?;
            Ok(f(recv, slot).into_slots())
        };
        self.declare(MethodDecl::new(name, signature, body))
    }

    /// Add a prepared declaration.
    pub fn declare(&mut self, decl: MethodDecl<R>) -> &mut Self {
        self.decls.push(decl);
        self
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodDecl<R>> {
        self.decls.iter()
    }

    pub(crate) fn into_decls(self) -> Vec<MethodDecl<R>> {
        self.decls
    }
}

fn single(name: &str, mut args: Vec<Argument>) -> std::result::Result<Argument, CallError> {
    match (args.pop(), args.is_empty()) {
        (Some(arg), true) => Ok(arg),
        _ => Err(CallError::SignatureMismatch(name.to_string())),
    }
}

/// Return types a typed method may have.
pub trait Returns: Send + 'static {
    /// Declared output types.
    fn outputs() -> Vec<TypeInfo>;

    /// Runtime outputs, one slot per declared output.
    fn into_slots(self) -> Vec<Slot>;
}

impl Returns for () {
    fn outputs() -> Vec<TypeInfo> {
        Vec::new()
    }

    fn into_slots(self) -> Vec<Slot> {
        Vec::new()
    }
}

impl<T, E> Returns for Result<T, E>
where
    T: Serialize + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    fn outputs() -> Vec<TypeInfo> {
        let value = TypeInfo::of::<T>();
        if value.is_unit() {
            vec![TypeInfo::error()]
        } else {
            vec![value, TypeInfo::error()]
        }
    }

    fn into_slots(self) -> Vec<Slot> {
        let unit = TypeInfo::of::<T>().is_unit();
        match self {
            Ok(_) if unit => vec![Slot::ok()],
            Ok(value) => vec![Slot::value(value), Slot::ok()],
            Err(err) if unit => vec![Slot::err(err)],
            Err(err) => vec![Slot::Zero, Slot::err(err)],
        }
    }
}

macro_rules! value_returns {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Returns for $ty {
                fn outputs() -> Vec<TypeInfo> {
                    vec![TypeInfo::of::<$ty>()]
                }

                fn into_slots(self) -> Vec<Slot> {
                    vec![Slot::value(self)]
                }
            }
        )*
    };
}

value_returns!(
    bool,
    char,
    String,
    &'static str,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    serde_json::Value,
);

impl<T: Serialize + Send + 'static> Returns for Vec<T> {
    fn outputs() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<Vec<T>>()]
    }

    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::value(self)]
    }
}

impl<T: Serialize + Send + 'static> Returns for Option<T> {
    fn outputs() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<Option<T>>()]
    }

    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::value(self)]
    }
}

impl<K, V> Returns for BTreeMap<K, V>
where
    K: Serialize + Send + 'static,
    V: Serialize + Send + 'static,
{
    fn outputs() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<BTreeMap<K, V>>()]
    }

    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::value(self)]
    }
}

impl<K, V> Returns for HashMap<K, V>
where
    K: Serialize + Send + 'static,
    V: Serialize + Send + 'static,
{
    fn outputs() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<HashMap<K, V>>()]
    }

    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::value(self)]
    }
}

/// Marks any serializable value as a value-only return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Serialize for Json<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<T: Serialize + Send + 'static> Returns for Json<T> {
    fn outputs() -> Vec<TypeInfo> {
        vec![TypeInfo::of::<T>()]
    }

    fn into_slots(self) -> Vec<Slot> {
        vec![Slot::value(self.0)]
    }
}
