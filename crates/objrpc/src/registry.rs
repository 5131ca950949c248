//! Registry construction and method handles.
//!
//! [`Registry::build`] collects the receiver's declarations, validates every
//! public one against the calling convention and binds it to the shared
//! receiver. Validation is fail-fast: the first bad signature aborts the build
//! and no partial registry is returned.
//!
//! Calling convention:
//! - at most one input, passed by value or by reference;
//! - at most two outputs; with two, the error comes second;
//! - a single output is an error output if its type is
//!   [`MethodError`](crate::error::MethodError), a value output otherwise.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RpcConfig;
use crate::error::{ObjRpcError, Result};
use crate::receiver::{BodyResult, MethodTable, Receiver, Visibility};
use crate::reflect::{Argument, ParamType, Signature, TypeInfo};

type Invoke = Arc<dyn Fn(Vec<Argument>) -> BodyResult + Send + Sync>;

/// Output contract of a method, decided once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultContract {
    /// No outputs.
    Void,
    /// A single value output. The method cannot report errors.
    Value,
    /// A single error output. The method returns no data but may fail.
    Error,
    /// A value output followed by an error output.
    ValueAndError,
}

impl ResultContract {
    fn classify(method: &str, outputs: &[TypeInfo]) -> Result<Self> {
        match outputs {
            [] => Ok(ResultContract::Void),
            [only] if only.is_error() => Ok(ResultContract::Error),
            [_] => Ok(ResultContract::Value),
            [first, second] => {
                if !second.is_error() {
                    Err(ObjRpcError::SecondOutputNotError {
                        method: method.to_string(),
                        found: second.name().to_string(),
                    })
                } else if first.is_error() {
                    Err(ObjRpcError::FirstOutputIsError {
                        method: method.to_string(),
                    })
                } else {
                    Ok(ResultContract::ValueAndError)
                }
            }
            _ => Err(ObjRpcError::TooManyOutputs {
                method: method.to_string(),
                count: outputs.len(),
            }),
        }
    }

    /// Number of outputs.
    pub fn arity(&self) -> usize {
        match self {
            ResultContract::Void => 0,
            ResultContract::Value | ResultContract::Error => 1,
            ResultContract::ValueAndError => 2,
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self, ResultContract::Value | ResultContract::ValueAndError)
    }

    pub fn has_error(&self) -> bool {
        matches!(self, ResultContract::Error | ResultContract::ValueAndError)
    }
}

/// A validated, callable method bound to its receiver.
#[derive(Clone)]
pub struct MethodHandle {
    name: String,
    input: Option<ParamType>,
    contract: ResultContract,
    invoke: Invoke,
}

impl MethodHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Expected input, including its passing convention.
    pub fn input(&self) -> Option<&ParamType> {
        self.input.as_ref()
    }

    pub fn contract(&self) -> ResultContract {
        self.contract
    }

    pub fn output_arity(&self) -> usize {
        self.contract.arity()
    }

    pub(crate) fn invoke(&self, args: Vec<Argument>) -> BodyResult {
        (self.invoke)(args)
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("name", &self.name)
            .field("input", &self.input)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from function name to method handle.
///
/// Cloning is cheap and clones share the same handles.
#[derive(Clone)]
pub struct Registry {
    methods: Arc<BTreeMap<String, MethodHandle>>,
}

impl Registry {
    /// Build a registry from a receiver's declared methods.
    pub fn build<R: Receiver>(receiver: R) -> Result<Self> {
        let mut table = MethodTable::new();
        R::declare(&mut table);
        Self::from_table(receiver, table)
    }

    /// Build a registry from an explicit method table.
    pub fn from_table<R>(receiver: R, table: MethodTable<R>) -> Result<Self>
    where
        R: Send + Sync + 'static,
    {
        let receiver = Arc::new(receiver);
        let mut methods = BTreeMap::new();

        for decl in table.into_decls() {
            if decl.visibility() == Visibility::Private {
                debug!("Skipping private method '{}'", decl.name());
                continue;
            }

            let (name, signature, body) = decl.into_parts();
            let (input, contract) = validate(&name, &signature)?;

            if methods.contains_key(&name) {
                return Err(ObjRpcError::DuplicateMethod { method: name });
            }
            if name == RpcConfig::FUNCS_METHOD {
                warn!(
                    "Function '{}' is shadowed by the built-in function list and cannot be called",
                    name
                );
            }

            debug!("Registered function '{}' ({:?})", name, contract);

            let receiver = Arc::clone(&receiver);
            let invoke: Invoke = Arc::new(move |args: Vec<Argument>| body(&*receiver, args));
            methods.insert(
                name.clone(),
                MethodHandle {
                    name,
                    input,
                    contract,
                    invoke,
                },
            );
        }

        info!("Registered {} RPC functions", methods.len());

        Ok(Self {
            methods: Arc::new(methods),
        })
    }

    /// Case-sensitive exact lookup.
    pub fn get(&self, name: &str) -> Option<&MethodHandle> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}

fn validate(name: &str, signature: &Signature) -> Result<(Option<ParamType>, ResultContract)> {
    let input = match signature.inputs() {
        [] => None,
        [param] => Some(*param),
        params => {
            return Err(ObjRpcError::TooManyInputs {
                method: name.to_string(),
                count: params.len(),
                types: params.iter().map(ToString::to_string).collect(),
            })
        }
    };
    let contract = ResultContract::classify(name, signature.outputs())?;
    Ok((input, contract))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MethodError;
    use crate::reflect::{Passing, Slot};
    use crate::receiver::MethodDecl;

    struct Api;

    impl Receiver for Api {
        fn declare(methods: &mut MethodTable<Self>) {
            methods
                .method("Ping", |_: &Api| "pong")
                .method("Nothing", |_: &Api| ())
                .method("MayFail", |_: &Api| -> std::result::Result<(), MethodError> {
                    Ok(())
                })
                .method_with("Half", |_: &Api, i: i64| -> std::result::Result<i64, String> {
                    Ok(i / 2)
                })
                .method_with_ref("Fill", |_: &Api, v: &mut Vec<u8>| v.len())
                .declare(MethodDecl::new(
                    "sum",
                    Signature::new().input::<i32>().input::<i32>(),
                    |_: &Api, _| Ok(Vec::new()),
                )
                .private());
        }
    }

    fn noop(_: &Api, _: Vec<Argument>) -> BodyResult {
        Ok(vec![Slot::ok()])
    }

    fn build_one(signature: Signature) -> Result<Registry> {
        let mut table = MethodTable::new();
        table.declare(MethodDecl::new("Bad", signature, noop));
        Registry::from_table(Api, table)
    }

    #[test]
    fn test_build_registers_public_methods() {
        let registry = Registry::build(Api).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["Fill", "Half", "MayFail", "Nothing", "Ping"]);
        assert!(!registry.contains("sum"));
        assert!(!registry.contains("ping"));
    }

    #[test]
    fn test_contracts() {
        let registry = Registry::build(Api).unwrap();
        assert_eq!(registry.get("Ping").unwrap().contract(), ResultContract::Value);
        assert_eq!(registry.get("Nothing").unwrap().contract(), ResultContract::Void);
        assert_eq!(registry.get("MayFail").unwrap().contract(), ResultContract::Error);
        assert_eq!(
            registry.get("Half").unwrap().contract(),
            ResultContract::ValueAndError
        );
        assert_eq!(registry.get("Half").unwrap().output_arity(), 2);
    }

    #[test]
    fn test_input_passing_recorded() {
        let registry = Registry::build(Api).unwrap();
        let half = registry.get("Half").unwrap();
        assert_eq!(half.input().unwrap().passing(), Passing::Value);
        let fill = registry.get("Fill").unwrap();
        assert_eq!(fill.input().unwrap().passing(), Passing::Reference);
        assert!(!registry.get("Ping").unwrap().has_input());
    }

    #[test]
    fn test_too_many_inputs() {
        let err = build_one(Signature::new().input::<i32>().input_ref::<String>()).unwrap_err();
        assert!(matches!(err, ObjRpcError::TooManyInputs { count: 2, .. }));
        let message = err.to_string();
        assert!(message.contains("'Bad'"));
        assert!(message.contains("i32"));
        assert!(message.contains("&mut alloc::string::String"));
    }

    #[test]
    fn test_too_many_outputs() {
        let err = build_one(
            Signature::new()
                .output::<i32>()
                .output::<i32>()
                .output::<MethodError>(),
        )
        .unwrap_err();
        assert!(matches!(err, ObjRpcError::TooManyOutputs { count: 3, .. }));
    }

    #[test]
    fn test_error_must_come_second() {
        let err = build_one(Signature::new().output::<i32>().output::<String>()).unwrap_err();
        assert!(matches!(err, ObjRpcError::SecondOutputNotError { .. }));

        let err = build_one(Signature::new().output::<MethodError>().output::<MethodError>())
            .unwrap_err();
        assert!(matches!(err, ObjRpcError::FirstOutputIsError { .. }));

        let err = build_one(Signature::new().output::<MethodError>().output::<i32>()).unwrap_err();
        assert!(matches!(err, ObjRpcError::SecondOutputNotError { .. }));
    }

    #[test]
    fn test_private_methods_skip_validation() {
        let mut table = MethodTable::new();
        let broken = Signature::new().output::<u8>().output::<u8>().output::<u8>();
        table
            .method("Ok", |_: &Api| true)
            .declare(MethodDecl::new("broken", broken, noop).private());
        let registry = Registry::from_table(Api, table).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut table = MethodTable::new();
        table.method("Twice", |_: &Api| 1u8).method("Twice", |_: &Api| 2u8);
        let err = Registry::from_table(Api, table).unwrap_err();
        assert_eq!(err.method(), "Twice");
    }

    #[test]
    fn test_empty_receiver() {
        let registry = Registry::from_table(Api, MethodTable::new()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_funcs_name_is_registered() {
        let mut table = MethodTable::new();
        table.method("funcs", |_: &Api| 0u8);
        let registry = Registry::from_table(Api, table).unwrap();
        assert!(registry.contains("funcs"));
    }
}
