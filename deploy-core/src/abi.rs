//! Encoding & decoding of constructor and method calls against a JSON ABI

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, Specifier},
    json_abi::{Function, JsonAbi, Param},
    primitives::{Bytes, B256},
};
use deploy_common::{errors::DeployError, types::ArgValue};

/// Convert an argument into a Solidity value of the given type
pub fn to_sol_value(arg: &ArgValue, ty: &DynSolType) -> Result<DynSolValue, DeployError> {
    let value = match (arg, ty) {
        (ArgValue::Address(a), DynSolType::Address) => DynSolValue::Address(*a),
        (ArgValue::Uint(u), DynSolType::Uint(bits)) => {
            if u.bit_len() > *bits {
                return Err(DeployError::Abi(format!("{u} does not fit in uint{bits}")));
            }
            DynSolValue::Uint(*u, *bits)
        }
        (ArgValue::Int(i), DynSolType::Int(bits)) => {
            // The bits below the sign bit must hold the magnitude, less one if negative
            let magnitude = if i.is_negative() { !i.into_raw() } else { i.into_raw() };
            if magnitude.bit_len() >= *bits {
                return Err(DeployError::Abi(format!("{i} does not fit in int{bits}")));
            }
            DynSolValue::Int(*i, *bits)
        }
        (ArgValue::Bool(b), DynSolType::Bool) => DynSolValue::Bool(*b),
        (ArgValue::String(s), DynSolType::String) => DynSolValue::String(s.clone()),
        (ArgValue::Bytes(b), DynSolType::Bytes) => DynSolValue::Bytes(b.to_vec()),
        (ArgValue::Bytes(b), DynSolType::FixedBytes(size)) => {
            if b.len() != *size {
                return Err(DeployError::Abi(format!(
                    "expected {size} bytes, got {}",
                    b.len()
                )));
            }
            let mut word = B256::ZERO;
            word[..*size].copy_from_slice(b);
            DynSolValue::FixedBytes(word, *size)
        }
        (ArgValue::Array(items), DynSolType::Array(inner)) => DynSolValue::Array(
            items
                .iter()
                .map(|item| to_sol_value(item, inner))
                .collect::<Result<_, _>>()?,
        ),
        (ArgValue::Array(items), DynSolType::FixedArray(inner, len)) => {
            check_len(items.len(), *len)?;
            DynSolValue::FixedArray(
                items
                    .iter()
                    .map(|item| to_sol_value(item, inner))
                    .collect::<Result<_, _>>()?,
            )
        }
        (ArgValue::Array(items), DynSolType::Tuple(types)) => {
            check_len(items.len(), types.len())?;
            DynSolValue::Tuple(
                items
                    .iter()
                    .zip(types)
                    .map(|(item, ty)| to_sol_value(item, ty))
                    .collect::<Result<_, _>>()?,
            )
        }
        (arg, ty) => {
            return Err(DeployError::Abi(format!(
                "cannot encode {arg} as {}",
                ty.sol_type_name()
            )))
        }
    };

    Ok(value)
}

/// Convert a decoded Solidity value back into an argument
pub fn from_sol_value(value: DynSolValue) -> Result<ArgValue, DeployError> {
    let arg = match value {
        DynSolValue::Address(a) => ArgValue::Address(a),
        DynSolValue::Uint(u, _) => ArgValue::Uint(u),
        DynSolValue::Int(i, _) => ArgValue::Int(i),
        DynSolValue::Bool(b) => ArgValue::Bool(b),
        DynSolValue::String(s) => ArgValue::String(s),
        DynSolValue::Bytes(b) => ArgValue::Bytes(b.into()),
        DynSolValue::FixedBytes(word, size) => {
            ArgValue::Bytes(Bytes::copy_from_slice(&word[..size]))
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            ArgValue::Array(
                items
                    .into_iter()
                    .map(from_sol_value)
                    .collect::<Result<_, _>>()?,
            )
        }
        other => return Err(DeployError::Abi(format!("unsupported value {other:?}"))),
    };

    Ok(arg)
}

/// Find the method with the given name & arity in a contract's ABI
pub fn find_function<'a>(
    abi: &'a JsonAbi,
    contract: &str,
    method: &str,
    arity: usize,
) -> Result<&'a Function, DeployError> {
    abi.function(method)
        .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
        .ok_or_else(|| DeployError::UnknownMethod {
            contract: contract.to_string(),
            method: method.to_string(),
            arity,
        })
}

/// ABI-encode a call of the given function, selector included
pub fn encode_call(function: &Function, args: &[ArgValue]) -> Result<Bytes, DeployError> {
    let params = encode_params(&function.inputs, args)?;
    Ok([function.selector().as_slice(), &params].concat().into())
}

/// Decode the return data of a call to the given function
pub fn decode_output(function: &Function, data: &[u8]) -> Result<Vec<ArgValue>, DeployError> {
    let ty = DynSolType::Tuple(resolve_params(&function.outputs)?);
    let decoded = ty
        .abi_decode_params(data)
        .map_err(|e| DeployError::Abi(e.to_string()))?;

    match from_sol_value(decoded)? {
        ArgValue::Array(values) => Ok(values),
        value => Ok(vec![value]),
    }
}

/// ABI-encode constructor arguments, to be appended to a contract's creation bytecode
pub fn encode_constructor(abi: &JsonAbi, args: &[ArgValue]) -> Result<Bytes, DeployError> {
    let inputs = abi
        .constructor
        .as_ref()
        .map(|c| c.inputs.as_slice())
        .unwrap_or_default();

    encode_params(inputs, args).map(Into::into)
}

/// ABI-encode a list of arguments against their parameter declarations
fn encode_params(params: &[Param], args: &[ArgValue]) -> Result<Vec<u8>, DeployError> {
    check_len(args.len(), params.len())?;
    let types = resolve_params(params)?;
    let values = args
        .iter()
        .zip(types.iter())
        .map(|(arg, ty)| to_sol_value(arg, ty))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Resolve parameter declarations into Solidity types
fn resolve_params(params: &[Param]) -> Result<Vec<DynSolType>, DeployError> {
    params
        .iter()
        .map(|p| p.resolve().map_err(|e| DeployError::Abi(e.to_string())))
        .collect()
}

/// Check that the number of supplied values matches the number expected
fn check_len(actual: usize, expected: usize) -> Result<(), DeployError> {
    if actual != expected {
        return Err(DeployError::Abi(format!(
            "expected {expected} value(s), got {actual}"
        )));
    }

    Ok(())
}
