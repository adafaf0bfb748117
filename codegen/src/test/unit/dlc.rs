//! DLC lowering tests: exact emitted text for kernels and the fatal paths.

use dlc_ir::prelude::*;
use dlc_ir::scope;
use test_case::test_case;

use crate::dlc::lower::{MemoryQualifier, device_symbol, is_semaphore_name, print_type};
use strum::IntoEnumIterator;
use crate::{CodegenOptions, Error, Target, build_dlc_with, c::CFallback};

fn options() -> CodegenOptions {
    CodegenOptions::builder().emit_header(false).build()
}

fn single(func: PrimFunc) -> IRModule {
    let mut module = IRModule::new();
    module.add_prim("kernel", func).expect("fresh module");
    module
}

fn lower(module: &IRModule) -> String {
    build_dlc_with(module, &Target::dlc(), &ScopeTable::new(), options()).expect("dlc codegen failed").code
}

fn lower_err(module: &IRModule) -> Error {
    build_dlc_with(module, &Target::dlc(), &ScopeTable::new(), options()).expect_err("lowering should fail")
}

fn f32_ptr(name: &str) -> std::sync::Arc<Var> {
    Var::pointer(name, DType::float32(), scope::GLOBAL)
}

#[test]
fn test_binary_add_kernel() {
    let (a, b, c) = (f32_ptr("A"), f32_ptr("B"), f32_ptr("C"));
    let n = Var::new("n", DType::int32());
    let add = Expr::builtin(Builtin::Add, [Expr::string("float"), Expr::var(&c), Expr::var(&a), Expr::var(&b), Expr::int(2048)]);
    let func = PrimFunc::new(vec![a, b, c, n], Stmt::evaluate(add)).with_no_alias(true);

    let expected = "\
void kernel(float* restrict A, float* restrict B, float* restrict C, int n) {
  {
    float8_128 _dlc_vec0_x, _dlc_vec0_y, _dlc_vec0_o;
    for (int _dlc_vec0_i = 0; _dlc_vec0_i < 2048; _dlc_vec0_i += 1024) {
      int _dlc_vec0_len = min(2048 - _dlc_vec0_i, 1024);
      int _dlc_vec0_mask = pre_exp2(_dlc_vec0_len/128);
      _dlc_vec0_x = v_f32_ld_tnsr_st_msk(_dlc_vec0_i/32, A, 1, _dlc_vec0_mask);
      _dlc_vec0_y = v_f32_ld_tnsr_st_msk(_dlc_vec0_i/32, B, 1, _dlc_vec0_mask);
      _dlc_vec0_o = v_f32_add_b(_dlc_vec0_x, _dlc_vec0_y);
      v_f32_st_tnsr_st_msk(_dlc_vec0_i/32, C, 1, _dlc_vec0_mask, _dlc_vec0_o);
    }
  };
}

";
    assert_eq!(lower(&single(func)), expected);
}

#[test]
fn test_scalar_mul_kernel() {
    let (x, y) = (f32_ptr("x"), f32_ptr("y"));
    let op = Expr::builtin(
        Builtin::MulScalar,
        [Expr::string("float"), Expr::var(&y), Expr::var(&x), Expr::float(2.0), Expr::int(1024)],
    );
    let code = lower(&single(PrimFunc::new(vec![x, y], Stmt::evaluate(op))));

    assert!(code.contains("    float8_128 _dlc_vec0_x, _dlc_vec0_o;\n"), "Missing registers:\n{code}");
    assert!(code.contains("    float8_128 _dlc_vec0_scalar = 2.0f;\n"), "Missing scalar broadcast:\n{code}");
    assert!(code.contains("_dlc_vec0_o = v_f32_mul_b(_dlc_vec0_x, _dlc_vec0_scalar);"), "Missing op:\n{code}");
    assert!(code.contains("v_f32_st_tnsr_st_msk(_dlc_vec0_i/32, y, 1, _dlc_vec0_mask, _dlc_vec0_o);"));
}

#[test]
fn test_abs_skips_template_marker() {
    let (x, y) = (f32_ptr("x"), f32_ptr("y"));
    let op = Expr::builtin(Builtin::Abs, [Expr::string("float"), Expr::var(&y), Expr::var(&x), Expr::int(4096)]);
    let code = lower(&single(PrimFunc::new(vec![x, y], Stmt::evaluate(op))));

    let expected = "\
  {
    int _dlc_vec0_size128b = 4096 / 32;
  #pragma clang loop unroll_count(2)
    for (int _dlc_vec0_vs = 0; _dlc_vec0_vs < _dlc_vec0_size128b; _dlc_vec0_vs += 32) {
      float8_128 _dlc_vec0_x = v_f32_ld_tnsr_b(_dlc_vec0_vs, x);
      _dlc_vec0_x = v_f32_abs(_dlc_vec0_x);
      v_f32_st_tnsr_b(_dlc_vec0_vs, y, _dlc_vec0_x);
    }
  };
";
    assert!(code.contains(expected), "Unexpected unary block:\n{code}");
}

#[test_case(Builtin::Exp, "v_f32_exp"; "exp")]
#[test_case(Builtin::Log, "v_f32_log"; "log")]
#[test_case(Builtin::Sqrt, "v_f32_sqrt"; "sqrt")]
#[test_case(Builtin::Rsqrt, "v_f32_rsqrt"; "rsqrt")]
#[test_case(Builtin::Relu, "v_f32_relu"; "relu")]
fn test_unary_primitives(op: Builtin, primitive: &str) {
    let (x, y) = (f32_ptr("x"), f32_ptr("y"));
    let call = Expr::builtin(op, [Expr::var(&y), Expr::var(&x), Expr::int(256)]);
    let code = lower(&single(PrimFunc::new(vec![x, y], Stmt::evaluate(call))));

    assert!(code.contains(&format!("_dlc_vec0_x = {primitive}(_dlc_vec0_x);")), "Missing {primitive}:\n{code}");
}

#[test]
fn test_every_builtin_lowers_to_its_device_symbol() {
    for op in Builtin::iter() {
        let call = Expr::builtin(op, (0..op.arity()).map(|_| Expr::int(64)));
        let code = lower(&single(PrimFunc::new(vec![], Stmt::evaluate(call))));
        let symbol = device_symbol(op);

        match op.family() {
            OpFamily::Binary | OpFamily::Scalar => {
                assert!(code.contains(&format!("_dlc_vec0_o = {symbol}(")), "{op}:\n{code}")
            }
            OpFamily::Unary => assert!(code.contains(&format!("_dlc_vec0_x = {symbol}(")), "{op}:\n{code}"),
            OpFamily::Memory | OpFamily::Dma | OpFamily::Sync => {
                assert!(code.contains(&format!("  {symbol}(")), "{op}:\n{code}")
            }
        }
    }
}

#[test]
fn test_dma_address_spaces_and_flags() {
    let (src, dst) = (f32_ptr("src"), f32_ptr("dst"));
    let dma = Expr::builtin(
        Builtin::Dma,
        [
            Expr::var(&src),
            Expr::int(1),
            Expr::var(&dst),
            Expr::int(2),
            Expr::int(256),
            Expr::int(1),
            Expr::int(1),
            Expr::int(0),
            Expr::int(7),
        ],
    );
    let code = lower(&single(PrimFunc::new(vec![src, dst], Stmt::evaluate(dma))));

    assert!(
        code.contains("  dlc_dma_new(src, HBM, dst, VMEM, 256, 1, 1, NULL_SEMAPHORE, 7, 128, 2);\n"),
        "Unexpected DMA call:\n{code}"
    );
}

#[test]
fn test_dma_unknown_and_symbolic_spaces() {
    let (src, dst) = (f32_ptr("src"), f32_ptr("dst"));
    let space = Var::new("space", DType::int32());
    let flag = Var::new("f", DType::int32());
    let dma = Expr::builtin(
        Builtin::Dma,
        [
            Expr::var(&src),
            Expr::int(9),
            Expr::var(&dst),
            Expr::var(&space),
            Expr::int(64),
            Expr::int(1),
            Expr::int(1),
            Expr::var(&flag),
            Expr::int(0),
        ],
    );
    let code = lower(&single(PrimFunc::new(vec![src, dst, space, flag], Stmt::evaluate(dma))));

    assert!(code.contains("dlc_dma_new(src, 9, dst, space, 64, 1, 1, f, NULL_SEMAPHORE, 128, 2);"), "{code}");
}

#[test]
fn test_sync_and_memory_calls() {
    let (a, b) = (f32_ptr("a"), f32_ptr("b"));
    let t = Var::new("t", DType::int32());
    let body = Stmt::seq([
        Stmt::evaluate(Expr::builtin(Builtin::Copy, [Expr::var(&b), Expr::var(&a), Expr::int(512)])),
        Stmt::evaluate(Expr::builtin(Builtin::Fill, [Expr::var(&b), Expr::float(0.0), Expr::int(512)])),
        Stmt::evaluate(Expr::builtin(Builtin::Sync, [Expr::var(&t)])),
        Stmt::evaluate(Expr::builtin(Builtin::SyncDone, [Expr::var(&t)])),
        Stmt::evaluate(Expr::builtin(Builtin::SyncGte, [Expr::var(&t), Expr::int(3)])),
        Stmt::evaluate(Expr::builtin(Builtin::SyncClear, [Expr::var(&t)])),
        Stmt::evaluate(Expr::builtin(Builtin::Barrier, [])),
    ]);
    let code = lower(&single(PrimFunc::new(vec![a, b, t], body)));

    let expected = "\
void kernel(float* a, float* b, int t) {
  vmem_copy(b, a, 512);
  vmem_fill(b, 0.0f, 512);
  dlc_sync_new(t);
  dlc_sync_done_new(t);
  dlc_sync_gte_new(t, 3);
  dlc_sync_clear_new(t);
  barrier();
}

";
    assert_eq!(code, expected);
}

#[test]
fn test_allocation_qualifiers() {
    let buf = Var::new("buf", DType::handle());
    let flag = Var::new("sync_flag", DType::handle());
    let shared = Var::new("tile", DType::handle());
    let body = Stmt::allocate(
        &buf,
        DType::float32(),
        vec![Expr::int(256)],
        Stmt::allocate(
            &flag,
            DType::int32(),
            vec![Expr::int(1)],
            Stmt::allocate(&shared, DType::float32(), vec![Expr::int(4), Expr::int(32)], Stmt::evaluate(Expr::builtin(Builtin::Barrier, []))),
        ),
    );
    let func = PrimFunc::new(vec![], body);

    let mut scopes = ScopeTable::new();
    scopes.insert(&shared, scope::SHARED);
    let code = build_dlc_with(&single(func), &Target::dlc(), &scopes, options()).expect("dlc codegen failed").code;

    let expected = "\
void kernel() {
  float VMEM_SPACE buf[256];
  int SEMAPHORE_SPACE sync_flag[1];
  float tile[128];
  barrier();
}

";
    assert_eq!(code, expected);
}

#[test]
fn test_allocation_scope_from_annotation() {
    let sem = Var::pointer("counter", DType::int32(), scope::SEMAPHORE);
    let body = Stmt::allocate(&sem, DType::int32(), vec![Expr::int(2)], Stmt::evaluate(Expr::int(0)));
    let code = lower(&single(PrimFunc::new(vec![], body)));

    assert!(code.contains("  int SEMAPHORE_SPACE counter[2];\n"), "{code}");
}

#[test]
fn test_name_heuristic_overrides_declared_scope() {
    let buf = Var::new("flag_buf", DType::handle());
    let body = Stmt::allocate(&buf, DType::int32(), vec![Expr::int(8)], Stmt::evaluate(Expr::int(0)));
    let mut scopes = ScopeTable::new();
    scopes.insert(&buf, scope::VMEM);

    let module = single(PrimFunc::new(vec![], body));
    let code = build_dlc_with(&module, &Target::dlc(), &scopes, options()).expect("dlc codegen failed").code;

    assert!(code.contains("int SEMAPHORE_SPACE flag_buf[8];"), "{code}");
}

#[test]
fn test_thread_extent_declares_zeroed_local() {
    let tx = Var::new("tx", DType::int32());
    let unbound = Var::new("ux", DType::int32());
    let body = Stmt::thread_extent(
        IterVar::new(tx, "threadIdx.x"),
        Expr::int(4),
        Stmt::thread_extent(IterVar::new(unbound, ""), Expr::int(2), Stmt::evaluate(Expr::builtin(Builtin::Barrier, []))),
    );
    let code = lower(&single(PrimFunc::new(vec![], body)));

    let expected = "\
void kernel() {
  int tx = 0;  // Thread variable (extent: 4)
  barrier();
}

";
    assert_eq!(code, expected);
}

#[test]
fn test_scope_markers_are_transparent() {
    let body = Stmt::attr(
        AttrKey::StorageScope,
        AttrNode::None,
        Expr::string("local"),
        Stmt::attr(
            AttrKey::parse("pragma_custom"),
            AttrNode::None,
            Expr::int(1),
            Stmt::evaluate(Expr::builtin(Builtin::Barrier, [])),
        ),
    );
    let code = lower(&single(PrimFunc::new(vec![], body)));

    assert_eq!(code, "void kernel() {\n  barrier();\n}\n\n");
}

#[test]
fn test_vector_op_inside_loop_is_indented() {
    let (a, b) = (f32_ptr("a"), f32_ptr("b"));
    let i = Var::new("i", DType::int32());
    let relu = Expr::builtin(Builtin::Relu, [Expr::var(&b), Expr::var(&a), Expr::int(1024)]);
    let body = Stmt::serial_for(&i, Expr::int(0), Expr::int(2), Stmt::evaluate(relu));
    let code = lower(&single(PrimFunc::new(vec![a, b], body)));

    assert!(code.contains("  for (int i = 0; i < 2; ++i) {\n    {\n      int _dlc_vec0_size128b"), "{code}");
    assert!(code.contains("    #pragma clang loop unroll_count(2)\n"), "{code}");
    assert!(code.contains("\n    };\n  }\n"), "{code}");
}

#[test]
fn test_fresh_prefixes_are_distinct() {
    let (a, b) = (f32_ptr("a"), f32_ptr("b"));
    let call = || Expr::builtin(Builtin::Exp, [Expr::var(&b), Expr::var(&a), Expr::int(256)]);
    let body = Stmt::seq([Stmt::evaluate(call()), Stmt::evaluate(call())]);
    let code = lower(&single(PrimFunc::new(vec![a.clone(), b.clone()], body)));

    assert!(code.contains("_dlc_vec0_x = v_f32_exp(_dlc_vec0_x);"), "{code}");
    assert!(code.contains("_dlc_vec1_x = v_f32_exp(_dlc_vec1_x);"), "{code}");
}

#[test]
fn test_prefix_skips_names_taken_by_kernel_vars() {
    let (lhs, rhs, out) = (f32_ptr("_dlc_vec0_x"), f32_ptr("B"), f32_ptr("C"));
    let add = Expr::builtin(
        Builtin::Add,
        [Expr::string("float"), Expr::var(&out), Expr::var(&lhs), Expr::var(&rhs), Expr::int(1024)],
    );
    let code = lower(&single(PrimFunc::new(vec![lhs, rhs, out], Stmt::evaluate(add))));

    assert!(code.contains("    float8_128 _dlc_vec1_x, _dlc_vec1_y, _dlc_vec1_o;\n"), "{code}");
    assert!(code.contains("_dlc_vec1_x = v_f32_ld_tnsr_st_msk(_dlc_vec1_i/32, _dlc_vec0_x, 1, _dlc_vec1_mask);"), "{code}");
    assert!(!code.contains("float8_128 _dlc_vec0_x"), "{code}");
}

#[test]
fn test_registers_are_reserved_for_later_vars() {
    let (a, b) = (f32_ptr("a"), f32_ptr("b"));
    let late = Var::new("_dlc_vec0_len", DType::int32());
    let body = Stmt::seq([
        Stmt::evaluate(Expr::builtin(Builtin::Exp, [Expr::var(&b), Expr::var(&a), Expr::int(256)])),
        Stmt::let_stmt(&late, Expr::int(3), Stmt::evaluate(Expr::call_extern("use", DType::void_(), [Expr::var(&late)]))),
    ]);
    let code = lower(&single(PrimFunc::new(vec![a, b], body)));

    assert!(code.contains("  int _dlc_vec0_len_1 = 3;\n  use(_dlc_vec0_len_1);\n"), "{code}");
}

#[test]
fn test_parameter_decoration() {
    let a = f32_ptr("A");
    let b = f32_ptr("B");
    let params = Var::pointer("params", DType::int32(), scope::GRID_CONSTANT);
    let raw = Var::new("raw", DType::handle());
    let n = Var::new("n", DType::int64());
    let func = PrimFunc::new(vec![a, b.clone(), params, raw, n], Stmt::evaluate(Expr::int(0)))
        .with_no_alias(true)
        .with_non_restrict(vec![b]);
    let code = lower(&single(func));

    assert_eq!(
        code,
        "void kernel(float* restrict A, float* B, const int* params, void* restrict raw, int64_t n) {\n}\n\n"
    );
}

#[test]
fn test_restrict_keyword_option() {
    let a = f32_ptr("A");
    let func = PrimFunc::new(vec![a], Stmt::evaluate(Expr::int(0))).with_no_alias(true);
    let options = CodegenOptions::builder().emit_header(false).restrict_keyword("__restrict__").build();
    let code = build_dlc_with(&single(func), &Target::dlc(), &ScopeTable::new(), options).expect("codegen").code;

    assert!(code.starts_with("void kernel(float* __restrict__ A) {"), "{code}");
}

#[test]
fn test_global_symbol_overrides_name() {
    let func = PrimFunc::new(vec![], Stmt::evaluate(Expr::int(0))).with_global_symbol("main_kernel");
    let module = single(func);
    let source = build_dlc_with(&module, &Target::dlc(), &ScopeTable::new(), options()).expect("codegen");

    assert_eq!(source.function_names, vec!["main_kernel".to_string()]);
    assert!(source.code.starts_with("void main_kernel() {"));
}

#[test]
fn test_names_reset_between_functions() {
    let mut module = IRModule::new();
    for name in ["first", "second"] {
        let x = f32_ptr("x");
        let x_again = f32_ptr("x");
        let func = PrimFunc::new(vec![x, x_again], Stmt::evaluate(Expr::int(0)));
        module.add_prim(name, func).expect("unique");
    }
    let code = lower(&module);

    assert_eq!(code, "void first(float* x, float* x_1) {\n}\n\nvoid second(float* x, float* x_1) {\n}\n\n");
}

#[test]
fn test_vector_counter_spans_functions() {
    let mut module = IRModule::new();
    for name in ["f0", "f1"] {
        let (a, b) = (f32_ptr("a"), f32_ptr("b"));
        let call = Expr::builtin(Builtin::Sqrt, [Expr::var(&b), Expr::var(&a), Expr::int(128)]);
        module.add_prim(name, PrimFunc::new(vec![a, b], Stmt::evaluate(call))).expect("unique");
    }
    let code = lower(&module);

    assert!(code.contains("_dlc_vec0_size128b"), "{code}");
    assert!(code.contains("_dlc_vec1_size128b"), "{code}");
}

#[test]
fn test_arity_mismatch_is_fatal() {
    let a = f32_ptr("a");
    let call = Expr::builtin(Builtin::Add, [Expr::string("float"), Expr::var(&a), Expr::var(&a), Expr::int(16)]);
    let err = lower_err(&single(PrimFunc::new(vec![a], Stmt::evaluate(call))));

    assert!(
        matches!(err, Error::InvalidCall { op: "tl.dlc_add", source: dlc_ir::Error::ArityMismatch { expected: 5, actual: 4, .. } }),
        "{err}"
    );
}

#[test]
fn test_non_constant_allocation_is_fatal() {
    let n = Var::new("n", DType::int32());
    let buf = Var::new("buf", DType::handle());
    let body = Stmt::allocate(&buf, DType::float32(), vec![Expr::var(&n)], Stmt::evaluate(Expr::int(0)));
    let err = lower_err(&single(PrimFunc::new(vec![n], body)));

    assert!(matches!(err, Error::NonConstantAllocation { ref buffer } if buffer == "buf"), "{err}");
}

#[test_case(&[0], 0; "zero")]
#[test_case(&[-4], -4; "negative")]
#[test_case(&[-2, -3], -2; "negative_pair_with_positive_product")]
#[test_case(&[8, 0], 0; "zero_inner_extent")]
fn test_non_positive_allocation_is_fatal(extents: &[i64], bad: i64) {
    let buf = Var::new("buf", DType::handle());
    let extents = extents.iter().copied().map(Expr::int).collect();
    let body = Stmt::allocate(&buf, DType::float32(), extents, Stmt::evaluate(Expr::int(0)));
    let err = lower_err(&single(PrimFunc::new(vec![], body)));

    assert!(matches!(err, Error::NonPositiveAllocation { size, .. } if size == bad), "{err}");
}

#[test]
fn test_overflowing_allocation_is_fatal() {
    let buf = Var::new("buf", DType::handle());
    let body = Stmt::allocate(
        &buf,
        DType::float32(),
        vec![Expr::int(i64::MAX), Expr::int(2)],
        Stmt::evaluate(Expr::int(0)),
    );
    let err = lower_err(&single(PrimFunc::new(vec![], body)));

    assert!(matches!(err, Error::AllocationOverflow { ref buffer } if buffer == "buf"), "{err}");
}

#[test]
fn test_false_allocation_condition_is_fatal() {
    let buf = Var::new("buf", DType::handle());
    let body = Stmt::Allocate {
        buffer: buf,
        dtype: DType::float32(),
        extents: vec![Expr::int(16)],
        condition: Expr::bool_(false),
        body: Box::new(Stmt::evaluate(Expr::int(0))),
    };
    let err = lower_err(&single(PrimFunc::new(vec![], body)));

    assert!(matches!(err, Error::FalseAllocationCondition { .. }), "{err}");
}

#[test]
fn test_lowering_is_deterministic() {
    let build = || {
        let (a, b, c) = (f32_ptr("A"), f32_ptr("B"), f32_ptr("C"));
        let add = Expr::builtin(Builtin::Sub, [Expr::string("float"), Expr::var(&c), Expr::var(&a), Expr::var(&b), Expr::int(3000)]);
        single(PrimFunc::new(vec![a, b, c], Stmt::evaluate(add)).with_no_alias(true))
    };
    let module = build();

    assert_eq!(lower(&module), lower(&module));
    assert_eq!(lower(&module), lower(&build()));
}

#[test_case(DType::handle(), "void*"; "handle")]
#[test_case(DType::void_(), "void"; "void")]
#[test_case(DType::int32(), "int"; "int32")]
#[test_case(DType::int64(), "int64_t"; "int64")]
#[test_case(DType::uint8(), "uint8_t"; "uint8")]
#[test_case(DType::bool_(), "bool"; "bool")]
#[test_case(DType::float16(), "half"; "float16")]
#[test_case(DType::bfloat16(), "bfloat16_t"; "bfloat16")]
#[test_case(DType::float32(), "float"; "float32")]
#[test_case(DType::float32().with_lanes(4), "float4"; "float32x4")]
#[test_case(DType::int32().with_lanes(8), "int32_t8"; "int32x8")]
fn test_print_type(dtype: DType, expected: &str) {
    assert_eq!(print_type(&CFallback, dtype).expect("printable"), expected);
}

#[test_case("local", Some(MemoryQualifier::Vmem); "local")]
#[test_case("vmem", Some(MemoryQualifier::Vmem); "vmem")]
#[test_case("semaphore", Some(MemoryQualifier::Semaphore); "semaphore")]
#[test_case("shared", None; "shared")]
#[test_case("global", None; "global")]
fn test_memory_qualifier_for_scope(scope: &str, expected: Option<MemoryQualifier>) {
    assert_eq!(MemoryQualifier::for_scope(scope), expected);
}

#[test]
fn test_semaphore_names() {
    assert!(is_semaphore_name("sync_flag"));
    assert!(is_semaphore_name("dma_sync"));
    assert!(is_semaphore_name("flag"));
    assert!(!is_semaphore_name("buf"));
    assert!(!is_semaphore_name("Sync"));
}
