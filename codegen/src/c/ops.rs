//! C expression rendering for operator nodes.

use dlc_dtype::{DType, ScalarDType};
use dlc_ir::BinaryOp;

/// Render a binary operation as a C expression.
pub fn render_binary(op: BinaryOp, l: &str, r: &str, dtype: DType) -> String {
    match op {
        BinaryOp::Add => format!("({l} + {r})"),
        BinaryOp::Sub => format!("({l} - {r})"),
        BinaryOp::Mul => format!("({l} * {r})"),
        BinaryOp::Div => format!("({l} / {r})"),
        BinaryOp::Mod if dtype.is_float() => format!("{}({l}, {r})", float_fn("fmod", dtype)),
        BinaryOp::Mod => format!("({l} % {r})"),
        BinaryOp::FloorDiv => render_floor_div(l, r, dtype),
        BinaryOp::FloorMod => render_floor_mod(l, r, dtype),
        BinaryOp::Min => format!("min({l}, {r})"),
        BinaryOp::Max => format!("max({l}, {r})"),
        BinaryOp::Eq => format!("({l} == {r})"),
        BinaryOp::Ne => format!("({l} != {r})"),
        BinaryOp::Lt => format!("({l} < {r})"),
        BinaryOp::Le => format!("({l} <= {r})"),
        BinaryOp::Gt => format!("({l} > {r})"),
        BinaryOp::Ge => format!("({l} >= {r})"),
        BinaryOp::And => format!("({l} && {r})"),
        BinaryOp::Or => format!("({l} || {r})"),
    }
}

/// Division rounding toward negative infinity. C `/` truncates, so signed
/// operands with a non-zero remainder and differing signs are adjusted down
/// by one.
pub fn render_floor_div(l: &str, r: &str, dtype: DType) -> String {
    if dtype.is_float() {
        format!("{}(({l}) / ({r}))", float_fn("floor", dtype))
    } else if dtype.is_int() {
        format!("((({l}) / ({r})) - (((({l}) % ({r})) != 0) && ((({l}) < 0) != (({r}) < 0))))")
    } else {
        format!("({l} / {r})")
    }
}

/// Remainder with the sign of the divisor. The adjustment only applies when
/// remainder and divisor differ in sign, so adding the divisor cannot
/// overflow.
pub fn render_floor_mod(l: &str, r: &str, dtype: DType) -> String {
    if dtype.is_float() {
        format!("(({l}) - {}(({l}) / ({r})) * ({r}))", float_fn("floor", dtype))
    } else if dtype.is_int() {
        let m = format!("(({l}) % ({r}))");
        format!("({m} + ((({m} != 0) && (({m} < 0) != (({r}) < 0))) ? ({r}) : 0))")
    } else {
        format!("({l} % {r})")
    }
}

/// libm name for the operand width: `name` for double, `namef` otherwise.
fn float_fn(name: &str, dtype: DType) -> String {
    if dtype.base() == ScalarDType::Float64 { name.to_string() } else { format!("{name}f") }
}

/// Render a call to a plain function.
pub fn render_call(name: &str, args: &[String]) -> String {
    format!("{name}({})", args.join(", "))
}

/// Wrap a condition for `if`, without doubling parentheses that are already
/// there.
pub fn render_condition(cond: &str) -> String {
    if cond.starts_with('(') && cond.ends_with(')') && balanced_outer(cond) {
        cond.to_string()
    } else {
        format!("({cond})")
    }
}

/// True when the first `(` closes at the final character.
fn balanced_outer(s: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != s.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
