//! Vector operation emitters.
//!
//! Each emitter turns an elementwise DLC operation into a self-contained C
//! block that walks the operands in vector tiles. The text depends only on the
//! operation name, the rendered operands, the fresh identifier prefix and the
//! indentation of the enclosing statement. Every line after the opening brace
//! starts with that indentation; the block ends with `}` and no newline so the
//! caller can terminate the statement.

use std::fmt::Write;

/// Register type holding one vector tile.
pub const VECTOR_TYPE: &str = "float8_128";

/// Elements processed per loop iteration of the masked emitters.
pub const TILE_ELEMS: usize = 1024;

/// Elements covered by one mask bit.
pub const MASK_UNIT: usize = 128;

/// Divisor turning an element offset into a tensor address.
pub const ADDR_DIV: usize = 32;

/// Address step of one unary loop iteration.
pub const UNARY_STEP: usize = 32;

/// Suffixes the emitters append to a block prefix. Every derived name is
/// declared inside the block, so all of them must be free in the function.
pub const REGISTER_SUFFIXES: &[&str] = &["x", "y", "o", "i", "len", "mask", "scalar", "size128b", "vs"];

/// Operands of a two-input vector operation, already rendered to C.
#[derive(Debug, Clone, Copy)]
pub struct BinaryOperands<'a> {
    pub dst: &'a str,
    pub lhs: &'a str,
    pub rhs: &'a str,
    pub size: &'a str,
}

/// Operands of a vector-by-scalar operation.
#[derive(Debug, Clone, Copy)]
pub struct ScalarOperands<'a> {
    pub dst: &'a str,
    pub src: &'a str,
    pub scalar: &'a str,
    pub size: &'a str,
}

/// Operands of a one-input vector operation.
#[derive(Debug, Clone, Copy)]
pub struct UnaryOperands<'a> {
    pub dst: &'a str,
    pub src: &'a str,
    pub size: &'a str,
}

/// Line writer for one emitted block.
struct Block<'a> {
    out: String,
    indent: &'a str,
}

impl<'a> Block<'a> {
    fn open(indent: &'a str) -> Self {
        Self { out: String::from("{\n"), indent }
    }

    /// Line at the enclosing indentation plus `depth` extra levels.
    fn line(&mut self, depth: usize, text: &str) {
        let _ = writeln!(self.out, "{}{}{text}", self.indent, "  ".repeat(depth));
    }

    fn close(mut self) -> String {
        self.out.push_str(self.indent);
        self.out.push('}');
        self.out
    }
}

/// Masked tile loop header shared by the binary and scalar emitters.
fn tile_loop_header(b: &mut Block<'_>, p: &str, size: &str) {
    b.line(1, &format!("for (int {p}_i = 0; {p}_i < {size}; {p}_i += {TILE_ELEMS}) {{"));
    b.line(2, &format!("int {p}_len = min({size} - {p}_i, {TILE_ELEMS});"));
    b.line(2, &format!("int {p}_mask = pre_exp2({p}_len/{MASK_UNIT});"));
}

fn masked_load(p: &str, reg: &str, src: &str) -> String {
    format!("{p}_{reg} = v_f32_ld_tnsr_st_msk({p}_i/{ADDR_DIV}, {src}, 1, {p}_mask);")
}

fn masked_store(p: &str, dst: &str) -> String {
    format!("v_f32_st_tnsr_st_msk({p}_i/{ADDR_DIV}, {dst}, 1, {p}_mask, {p}_o);")
}

/// `dst[i] = op(lhs[i], rhs[i])` over `size` elements in masked tiles.
pub fn emit_binary(op: &str, prefix: &str, indent: &str, args: BinaryOperands<'_>) -> String {
    let p = prefix;
    let mut b = Block::open(indent);
    b.line(1, &format!("{VECTOR_TYPE} {p}_x, {p}_y, {p}_o;"));
    tile_loop_header(&mut b, p, args.size);
    b.line(2, &masked_load(p, "x", args.lhs));
    b.line(2, &masked_load(p, "y", args.rhs));
    b.line(2, &format!("{p}_o = {op}({p}_x, {p}_y);"));
    b.line(2, &masked_store(p, args.dst));
    b.line(1, "}");
    b.close()
}

/// `dst[i] = op(src[i], scalar)` with the scalar materialized once before the
/// loop.
pub fn emit_scalar(op: &str, prefix: &str, indent: &str, args: ScalarOperands<'_>) -> String {
    let p = prefix;
    let mut b = Block::open(indent);
    b.line(1, &format!("{VECTOR_TYPE} {p}_x, {p}_o;"));
    b.line(1, &format!("{VECTOR_TYPE} {p}_scalar = {};", args.scalar));
    tile_loop_header(&mut b, p, args.size);
    b.line(2, &masked_load(p, "x", args.src));
    b.line(2, &format!("{p}_o = {op}({p}_x, {p}_scalar);"));
    b.line(2, &masked_store(p, args.dst));
    b.line(1, "}");
    b.close()
}

/// `dst[i] = op(src[i])`, unmasked, with a partial-unroll hint of `unroll`.
pub fn emit_unary(op: &str, prefix: &str, indent: &str, unroll: usize, args: UnaryOperands<'_>) -> String {
    let p = prefix;
    let mut b = Block::open(indent);
    b.line(1, &format!("int {p}_size128b = {} / {ADDR_DIV};", args.size));
    b.line(0, &format!("#pragma clang loop unroll_count({unroll})"));
    b.line(1, &format!("for (int {p}_vs = 0; {p}_vs < {p}_size128b; {p}_vs += {UNARY_STEP}) {{"));
    b.line(2, &format!("{VECTOR_TYPE} {p}_x = v_f32_ld_tnsr_b({p}_vs, {});", args.src));
    b.line(2, &format!("{p}_x = {op}({p}_x);"));
    b.line(2, &format!("v_f32_st_tnsr_b({p}_vs, {}, {p}_x);", args.dst));
    b.line(1, "}");
    b.close()
}

// =============================================================================
// Host-side model of the emitted loops
// =============================================================================

/// One iteration of a masked tile loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Element offset of the tile.
    pub offset: usize,
    /// Elements covered, at most [`TILE_ELEMS`].
    pub len: usize,
    /// Mask exponent passed to `pre_exp2`: one bit per full [`MASK_UNIT`].
    pub mask_units: usize,
}

/// Iterations the masked emitters perform for a literal `size`.
pub fn tiles(size: usize) -> impl Iterator<Item = Tile> {
    (0..size).step_by(TILE_ELEMS).map(move |offset| {
        let len = (size - offset).min(TILE_ELEMS);
        Tile { offset, len, mask_units: len / MASK_UNIT }
    })
}

/// Iterations of the unary loop for a literal `size`.
pub fn unary_iterations(size: usize) -> usize {
    (size / ADDR_DIV).div_ceil(UNARY_STEP)
}
