//! C type mapping and literal rendering for the generic printer.

use dlc_dtype::{DType, ScalarDType};

/// C spelling of a scalar type. Handles and void are target-owned and have
/// no spelling here.
pub fn c_scalar(s: ScalarDType) -> Option<&'static str> {
    let name = match s {
        ScalarDType::Bool => "bool",
        ScalarDType::Int8 => "int8_t",
        ScalarDType::Int16 => "int16_t",
        ScalarDType::Int32 => "int32_t",
        ScalarDType::Int64 => "int64_t",
        ScalarDType::UInt8 => "uint8_t",
        ScalarDType::UInt16 => "uint16_t",
        ScalarDType::UInt32 => "uint32_t",
        ScalarDType::UInt64 => "uint64_t",
        ScalarDType::Float16 => "half",
        ScalarDType::BFloat16 => "bfloat16_t",
        ScalarDType::Float32 => "float",
        ScalarDType::Float64 => "double",
        ScalarDType::Void | ScalarDType::Handle => return None,
    };
    Some(name)
}

/// Render an integer literal. `int32` prints bare, everything else carries a
/// cast to its C type.
pub fn c_int(value: i64, dtype: DType, type_name: &str) -> String {
    if dtype.base() == ScalarDType::Int32 && dtype.is_scalar() {
        value.to_string()
    } else {
        format!("(({type_name}){value})")
    }
}

/// Render a float literal.
pub fn c_float(f: f64, dtype: DType) -> String {
    let base = dtype.base();

    if f.is_nan() {
        return match base {
            ScalarDType::Float64 => "__builtin_nan(\"\")".to_string(),
            _ => "__builtin_nanf(\"\")".to_string(),
        };
    }

    if f.is_infinite() {
        let sign = if f.is_sign_negative() { "-" } else { "" };
        return match base {
            ScalarDType::Float64 => format!("{sign}__builtin_inf()"),
            _ => format!("{sign}__builtin_inff()"),
        };
    }

    match base {
        ScalarDType::Float64 => format_literal(f, ""),
        ScalarDType::Float16 => format!("((half){})", format_literal(f64::from(f as f32), "f")),
        ScalarDType::BFloat16 => format!("((bfloat16_t){})", format_literal(f64::from(f as f32), "f")),
        _ => format_literal(f64::from(f as f32), "f"),
    }
}

fn format_literal(f: f64, suffix: &str) -> String {
    if f == 0.0 && f.is_sign_negative() {
        format!("-0.0{suffix}")
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}{suffix}")
    } else {
        format!("{f:e}{suffix}")
    }
}

/// Render a C string literal.
pub fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
