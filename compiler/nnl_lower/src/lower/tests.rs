#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use nnl_diagnostic::ErrorCode;
use nnl_graph::{BoolOperator, GraphId, Instruction, LoopStyle, NodeKind, Relation, WellKnown};
use nnl_ir::{
    BinaryOp, BindingKind, ConditionalStyle, DeclScope, NodeId, QueryStyle, SplitReaction,
    TypeDecl, UnaryOp,
};
use pretty_assertions::assert_eq;

use crate::test_helpers::{args_of, body_of, instruction_of, Fixture};
use crate::{LowerResult, Role};

fn codes(result: &LowerResult) -> Vec<ErrorCode> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

fn link(fx: &Fixture, node: GraphId, relation: Relation) -> GraphId {
    fx.graph.link_target(node, relation).unwrap()
}

fn instructions(fx: &Fixture, items: &[GraphId]) -> Vec<Option<Instruction>> {
    items.iter().map(|s| instruction_of(&fx.graph, *s)).collect()
}

/// Conditional expressions of a conditional statement.
fn expressions(fx: &Fixture, statement: GraphId) -> Vec<GraphId> {
    fx.graph.children(link(fx, statement, Relation::Condition))
}

// Expressions

#[test]
fn assignment_of_int_sum() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let x = b.var(DeclScope::Var, TypeDecl::Int, "x", None);
    let r = b.ident("x");
    let one = b.int(1);
    let two = b.int(2);
    let sum = b.binary(BinaryOp::Add, one, two);
    let assign = b.assign(r, sum);
    let root = b.block(&[x, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(items.len(), 1);
    let statement = items[0];
    assert_eq!(fx.graph.kind(statement), Some(NodeKind::Assignment));

    let var = link(&fx, statement, Relation::LeftPart);
    assert_eq!(
        fx.graph.kind(var),
        Some(NodeKind::Variable {
            scope: DeclScope::Var,
            ty: TypeDecl::Int
        })
    );
    assert_eq!(fx.graph.name(var), Some(fx.name("x")));

    let value = link(&fx, statement, Relation::RightPart);
    assert_eq!(fx.graph.kind(value), Some(NodeKind::ResultStatement));
    assert_eq!(instruction_of(&fx.graph, value), Some(Instruction::AddInt));
    assert_eq!(args_of(&fx.graph, value), vec![fx.graph.int(1), fx.graph.int(2)]);
    assert!(fx.module.is_externally_referenced(var));
}

#[test]
fn arithmetic_is_specialized_by_operand_types() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let half = b.double(0.5);
    let two = b.int(2);
    let doubles = b.binary(BinaryOp::Mul, half, two);
    let s = b.text("a");
    let one = b.int(1);
    let generic = b.binary(BinaryOp::Add, s, one);
    let three = b.int(3);
    let neg = b.unary(UnaryOp::Negate, three);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let doubles = c.render(doubles);
    let generic = c.render(generic);
    let neg = c.render(neg);
    assert_eq!(instruction_of(c.graph, doubles), Some(Instruction::MultiplyDouble));
    assert_eq!(instruction_of(c.graph, generic), Some(Instruction::Add));
    assert_eq!(instruction_of(c.graph, neg), Some(Instruction::MinusInt));
}

#[test]
fn literals_are_shared_values() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let a = b.int(7);
    let again = b.int(7);
    let word = b.symbol("colour");
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    assert_eq!(c.render(a), c.render(again));
    let neuron = c.render(word);
    assert_eq!(c.graph.find_static_name(fx_name(&c, "colour")), Some(neuron));
}

fn fx_name(c: &crate::ModuleCompiler<'_>, s: &str) -> nnl_ir::Name {
    c.interner.intern(s)
}

#[test]
fn increment_and_compound_assignment() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let x = b.local(TypeDecl::Int, "x", None);
    let r1 = b.ident("x");
    let inc = b.unary(UnaryOp::Increment, r1);
    let r2 = b.ident("x");
    let two = b.int(2);
    let add = b.binary(BinaryOp::AddAssign, r2, two);
    let s = b.local(TypeDecl::Var, "s", None);
    let r3 = b.ident("s");
    let t = b.symbol("t");
    let and = b.binary(BinaryOp::AndAssign, r3, t);
    let root = b.block(&[x, inc, add, s, and]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(items.len(), 3);

    let x = link(&fx, items[0], Relation::LeftPart);
    let step = link(&fx, items[0], Relation::RightPart);
    assert_eq!(instruction_of(&fx.graph, step), Some(Instruction::AddInt));
    assert_eq!(args_of(&fx.graph, step), vec![x, fx.graph.int(1)]);

    let sum = link(&fx, items[1], Relation::RightPart);
    assert_eq!(args_of(&fx.graph, sum), vec![x, fx.graph.int(2)]);

    let intersect = link(&fx, items[2], Relation::RightPart);
    assert_eq!(instruction_of(&fx.graph, intersect), Some(Instruction::Intersect));
}

#[test]
fn comparisons_are_bool_expressions() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let one = b.int(1);
    let two = b.int(2);
    let lt = b.binary(BinaryOp::Lt, one, two);
    let three = b.int(3);
    let four = b.int(4);
    let and = b.binary(BinaryOp::And, three, four);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let lt = c.render(lt);
    assert_eq!(c.graph.kind(lt), Some(NodeKind::BoolExpression));
    assert_eq!(c.graph.link_target(lt, Relation::LeftPart), Some(c.graph.int(1)));
    assert_eq!(
        c.graph.link_target(lt, Relation::Operator),
        Some(c.graph.well_known(WellKnown::Operator(BoolOperator::Smaller)))
    );
    assert_eq!(c.graph.link_target(lt, Relation::RightPart), Some(c.graph.int(2)));

    // Without calls `&&` does not short-circuit.
    let and = c.render(and);
    assert_eq!(
        c.graph.link_target(and, Relation::Operator),
        Some(c.graph.well_known(WellKnown::Operator(BoolOperator::And)))
    );
    assert_eq!(c.target_len(), 0);
}

#[test]
fn bindings_resolve_through_the_resolver() {
    let mut fx = Fixture::new();
    let depth = fx.graph.int(3);
    let path = [fx.name("settings"), fx.name("depth")];
    fx.bindings
        .insert(BindingKind::Variable, &path, depth, TypeDecl::Int);
    let mut b = fx.builder();
    let y = b.local(TypeDecl::Int, "y", None);
    let r = b.ident("y");
    let read = b.binding(BindingKind::Variable, &["settings", "depth"]);
    let assign = b.assign(r, read);
    let root = b.block(&[y, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(link(&fx, items[0], Relation::RightPart), depth);
    assert!(fx.module.is_used(depth));
}

#[test]
fn split_reaction_is_linked_to_the_variable() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let v = b.var_full(
        DeclScope::Var,
        TypeDecl::Var,
        "v",
        None,
        &[],
        Some(SplitReaction::Copy),
    );
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let var = c.render(v);
    assert_eq!(
        c.graph.link_target(var, Relation::SplitReaction),
        Some(c.graph.well_known(WellKnown::Split(SplitReaction::Copy)))
    );
}

#[test]
fn sub_declarations_share_the_initializer() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let sub = b.local(TypeDecl::Int, "y", None);
    let five = b.int(5);
    let x = b.var_full(DeclScope::Local, TypeDecl::Int, "x", Some(five), &[sub], None);
    let root = b.block(&[x]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    let items = fx.graph.children(result.root);
    assert_eq!(items.len(), 1);
    let left = link(&fx, items[0], Relation::LeftPart);
    assert_eq!(fx.graph.kind(left), Some(NodeKind::Cluster(Relation::List)));
    let names: Vec<_> = fx
        .graph
        .children(left)
        .into_iter()
        .map(|v| fx.graph.name(v))
        .collect();
    assert_eq!(names, vec![Some(fx.name("x")), Some(fx.name("y"))]);
}

// Calls

#[test]
fn arguments_are_pushed_last_to_first() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let pa = b.local(TypeDecl::Int, "a", None);
    let pb = b.local(TypeDecl::Int, "b", None);
    let f = b.function("f", &[pa, pb], &[], &[]);
    let one = b.int(1);
    let two = b.int(2);
    let call = b.call("f", &[one, two]);
    let root = b.block(&[f, call]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(
        instructions(&fx, &items),
        vec![
            Some(Instruction::PushValue),
            Some(Instruction::PushValue),
            Some(Instruction::Call)
        ]
    );
    assert_eq!(args_of(&fx.graph, items[0]), vec![fx.graph.int(2)]);
    assert_eq!(args_of(&fx.graph, items[1]), vec![fx.graph.int(1)]);

    // The callee pops its parameters in declaration order.
    let function = args_of(&fx.graph, items[2])[0];
    assert_eq!(fx.graph.kind(function), Some(NodeKind::Cluster(Relation::Code)));
    assert_eq!(fx.graph.name(function), Some(fx.name("f")));
    let params = fx.graph.children(link(&fx, function, Relation::Parameters));
    let body = fx.graph.children(function);
    assert_eq!(body.len(), 2);
    for (statement, param) in body.iter().zip(&params) {
        assert_eq!(link(&fx, *statement, Relation::LeftPart), *param);
        let pop = link(&fx, *statement, Relation::RightPart);
        assert_eq!(instruction_of(&fx.graph, pop), Some(Instruction::PopValue));
    }
    assert!(fx.module.is_externally_referenced(function));
}

#[test]
fn blocked_call_and_by_ref_argument() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let p = b.local(TypeDecl::Int, "p", None);
    let f = b.function("f", &[p], &[], &[]);
    let x = b.local(TypeDecl::Int, "x", None);
    let callee = b.ident("f");
    let r = b.ident("x");
    let by_ref = b.unary(UnaryOp::ByRef, r);
    let call = b.call_node(callee, &[by_ref], true);
    let root = b.block(&[f, x, call]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    let pushed = args_of(&fx.graph, items[0])[0];
    assert_eq!(fx.graph.kind(pushed), Some(NodeKind::ByRef));
    let var = link(&fx, pushed, Relation::Value);
    assert_eq!(fx.graph.name(var), Some(fx.name("x")));
    assert_eq!(instruction_of(&fx.graph, items[1]), Some(Instruction::BlockedCall));
}

#[test]
fn both_operands_calling_saves_the_right_value() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let f = b.function("f", &[], &[TypeDecl::Int], &[]);
    let g = b.function("g", &[], &[TypeDecl::Int], &[]);
    let x = b.local(TypeDecl::Int, "x", None);
    let r = b.ident("x");
    let call_f = b.call("f", &[]);
    let call_g = b.call("g", &[]);
    let sum = b.binary(BinaryOp::Add, call_f, call_g);
    let assign = b.assign(r, sum);
    let root = b.block(&[f, g, x, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(
        instructions(&fx, &items[..3]),
        vec![
            Some(Instruction::Call),
            Some(Instruction::PushValue),
            Some(Instruction::Call)
        ]
    );
    let rv = fx.graph.well_known(WellKnown::ReturnValue);
    assert_eq!(fx.graph.name(args_of(&fx.graph, items[0])[0]), Some(fx.name("g")));
    assert_eq!(args_of(&fx.graph, items[1]), vec![rv]);
    assert_eq!(fx.graph.name(args_of(&fx.graph, items[2])[0]), Some(fx.name("f")));

    let value = link(&fx, items[3], Relation::RightPart);
    let args = args_of(&fx.graph, value);
    assert_eq!(args[0], rv);
    assert_eq!(instruction_of(&fx.graph, args[1]), Some(Instruction::PopValue));
}

#[test]
fn inline_call_is_spliced_in_place() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let v = b.local(TypeDecl::Int, "v", None);
    let rv = b.ident("v");
    let one = b.int(1);
    let plus = b.binary(BinaryOp::Add, rv, one);
    let ret = b.ret(&[plus]);
    let add1 = b.function_full("add1", &[v], &[TypeDecl::Int], &[ret], true);
    let y = b.local(TypeDecl::Int, "y", None);
    let ry = b.ident("y");
    let two = b.int(2);
    let call = b.call("add1", &[two]);
    let assign = b.assign(ry, call);
    let root = b.block(&[add1, y, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let items = fx.graph.children(result.root);
    assert_eq!(
        instructions(&fx, &items),
        vec![
            None,
            Some(Instruction::ReturnValue),
            Some(Instruction::Return),
            None
        ]
    );
    // Parameter assigned directly, no value stack.
    assert_eq!(link(&fx, items[0], Relation::RightPart), fx.graph.int(2));
    assert_eq!(fx.graph.name(link(&fx, items[0], Relation::LeftPart)), Some(fx.name("v")));
    assert_eq!(
        link(&fx, items[3], Relation::RightPart),
        fx.graph.well_known(WellKnown::ReturnValue)
    );
}

#[test]
fn recursive_function_calls_itself() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let inner = b.call("f", &[]);
    let f = b.function("f", &[], &[], &[inner]);
    let _root = b.block(&[f]);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let node = c.render(f);
    assert!(c.graph.is_finalized(node));
    let body = c.graph.children(node);
    assert_eq!(body.len(), 1);
    assert_eq!(args_of(c.graph, body[0]), vec![node]);
}

#[test]
fn identical_unnamed_functions_share_a_cluster() {
    let mut fx = Fixture::new();
    fx.config.name_clusters = false;
    let mut b = fx.builder();
    let x = b.var(DeclScope::Var, TypeDecl::Int, "x", None);
    let r1 = b.ident("x");
    let one = b.int(1);
    let body_f = b.assign(r1, one);
    let f = b.function("f", &[], &[], &[body_f]);
    let r2 = b.ident("x");
    let one_again = b.int(1);
    let body_g = b.assign(r2, one_again);
    let g = b.function("g", &[], &[], &[body_g]);
    let _root = b.block(&[x, f, g]);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let f = c.render(f);
    let len_before = c.graph.len();
    let g = c.render(g);
    assert_eq!(f, g);
    assert_eq!(c.graph.len(), len_before);
}

#[test]
fn named_functions_stay_apart() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let f = b.function("f", &[], &[], &[]);
    let g = b.function("g", &[], &[], &[]);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    assert!(c.render(f) != c.render(g));
}

#[test]
fn return_emits_value_then_return() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let seven = b.int(7);
    let eight = b.int(8);
    let ret = b.ret(&[seven, eight]);
    let f = b.function("f", &[], &[TypeDecl::Int, TypeDecl::Int], &[ret]);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let node = c.render(f);
    let body = c.graph.children(node);
    assert_eq!(body.len(), 3);
    assert_eq!(args_of(c.graph, body[0]), vec![c.graph.int(7)]);
    assert_eq!(args_of(c.graph, body[1]), vec![c.graph.int(8)]);
    assert_eq!(instruction_of(c.graph, body[2]), Some(Instruction::Return));
}

// Short-circuit booleans

/// `a`, `b`, `c` returning bool, plus `local bool r`.
fn bool_functions(b: &mut nnl_ir::AstBuilder<'_>) -> Vec<NodeId> {
    let mut items: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .map(|name| b.function(name, &[], &[TypeDecl::Bool], &[]))
        .collect();
    items.push(b.local(TypeDecl::Bool, "r", None));
    items
}

#[test]
fn and_with_calls_jumps_on_false() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let r = b.ident("r");
    let a = b.call("a", &[]);
    let bb = b.call("b", &[]);
    let and = b.binary(BinaryOp::And, a, bb);
    let assign = b.assign(r, and);
    items.push(assign);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let code = fx.graph.children(result.root);
    assert_eq!(
        instructions(&fx, &code),
        vec![
            Some(Instruction::Call),
            Some(Instruction::JumpIfFalse),
            Some(Instruction::Call),
            Some(Instruction::ReturnValue),
            Some(Instruction::Jump),
            Some(Instruction::ReturnValue),
            None,
        ]
    );
    let rv = fx.graph.well_known(WellKnown::ReturnValue);
    assert_eq!(args_of(&fx.graph, code[1]), vec![rv, fx.graph.jump_target(4)]);
    assert_eq!(args_of(&fx.graph, code[4]), vec![fx.graph.jump_target(2)]);
    assert_eq!(
        args_of(&fx.graph, code[5]),
        vec![fx.graph.well_known(WellKnown::False)]
    );
    assert_eq!(link(&fx, code[6], Relation::RightPart), rv);
}

#[test]
fn mixed_chain_resumes_at_the_or_operand() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let r = b.ident("r");
    let a = b.call("a", &[]);
    let bb = b.call("b", &[]);
    let and = b.binary(BinaryOp::And, a, bb);
    let c = b.call("c", &[]);
    let or = b.binary(BinaryOp::Or, and, c);
    let assign = b.assign(r, or);
    items.push(assign);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let code = fx.graph.children(result.root);
    assert_eq!(
        instructions(&fx, &code),
        vec![
            Some(Instruction::Call),
            Some(Instruction::JumpIfFalse),
            Some(Instruction::Call),
            Some(Instruction::JumpIfTrue),
            Some(Instruction::Call),
            Some(Instruction::ReturnValue),
            Some(Instruction::Jump),
            Some(Instruction::ReturnValue),
            None,
        ]
    );
    let rv = fx.graph.well_known(WellKnown::ReturnValue);
    assert_eq!(args_of(&fx.graph, code[1]), vec![rv, fx.graph.jump_target(3)]);
    assert_eq!(args_of(&fx.graph, code[3]), vec![rv, fx.graph.jump_target(4)]);
    assert_eq!(args_of(&fx.graph, code[6]), vec![fx.graph.jump_target(2)]);
    assert_eq!(
        args_of(&fx.graph, code[7]),
        vec![fx.graph.well_known(WellKnown::True)]
    );
}

#[test]
fn chain_inside_call_argument_starts_its_own_accumulator() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let p = b.local(TypeDecl::Bool, "p", None);
    let f = b.function("f", &[p], &[TypeDecl::Bool], &[]);
    items.push(f);
    let a = b.call("a", &[]);
    let bb = b.call("b", &[]);
    let c = b.call("c", &[]);
    let inner = b.binary(BinaryOp::Or, bb, c);
    let call_f = b.call("f", &[inner]);
    let outer = b.binary(BinaryOp::And, a, call_f);
    let r = b.ident("r");
    let assign = b.assign(r, outer);
    items.push(assign);
    let root = b.block(&items);
    let ast = b.finish();
    let mut compiler = fx.compiler(&ast);

    compiler.render(root);
    assert!(compiler.jumps.is_empty());
    let inner_code = compiler.extra_items(inner).to_vec();
    let outer_code = compiler.extra_items(outer).to_vec();
    assert_eq!(inner_code.len(), 6);
    // The inner chain is spliced whole between the outer jump and the call.
    assert_eq!(&outer_code[2..8], inner_code.as_slice());
    assert_eq!(
        instruction_of(compiler.graph, outer_code[8]),
        Some(Instruction::PushValue)
    );
    assert_eq!(
        instruction_of(compiler.graph, outer_code[9]),
        Some(Instruction::Call)
    );
    let result = compiler.finish(GraphId::INVALID);
    assert!(codes(&result).is_empty());
}

#[test]
fn chain_in_condition_stores_into_bool_result() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let y = b.local(TypeDecl::Int, "y", None);
    items.push(y);
    let a = b.call("a", &[]);
    let bb = b.call("b", &[]);
    let and = b.binary(BinaryOp::And, a, bb);
    let ry = b.ident("y");
    let one = b.int(1);
    let then = b.assign(ry, one);
    let then = b.block(&[then]);
    let stmt = b.if_else(and, then, None);
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let bool_result = fx.module.role(Role::BoolResult).unwrap();
    let selector = fx.module.role(Role::CaseSelector).unwrap();
    assert_eq!(fx.graph.name(bool_result), Some(fx.name("BoolResult")));

    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 8);
    assert_eq!(link(&fx, code[3], Relation::LeftPart), bool_result);
    assert_eq!(link(&fx, code[5], Relation::LeftPart), bool_result);
    assert_eq!(
        link(&fx, code[5], Relation::RightPart),
        fx.graph.well_known(WellKnown::False)
    );

    // if (BoolResult) sel = 0 else sel = -1
    let test = code[6];
    let branches = expressions(&fx, test);
    assert_eq!(link(&fx, branches[0], Relation::Condition), bool_result);
    let chosen = body_of(&fx.graph, branches[0]);
    assert_eq!(link(&fx, chosen[0], Relation::LeftPart), selector);
    assert_eq!(link(&fx, chosen[0], Relation::RightPart), fx.graph.int(0));
    let fallback = body_of(&fx.graph, branches[1]);
    assert_eq!(link(&fx, fallback[0], Relation::RightPart), fx.graph.int(-1));

    let case = code[7];
    assert_eq!(link(&fx, case, Relation::CaseItem), selector);
    assert_eq!(
        link(&fx, case, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::Case))
    );
    let parts = expressions(&fx, case);
    assert_eq!(parts.len(), 1);
    assert_eq!(link(&fx, parts[0], Relation::Condition), fx.graph.int(0));
    assert_eq!(body_of(&fx.graph, parts[0]).len(), 1);
}

// Conditionals and loops

#[test]
fn plain_if_else_is_a_conditional_statement() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let x = b.local(TypeDecl::Int, "x", None);
    let rx = b.ident("x");
    let one = b.int(1);
    let cond = b.binary(BinaryOp::Lt, rx, one);
    let rx2 = b.ident("x");
    let two = b.int(2);
    let then = b.assign(rx2, two);
    let rx3 = b.ident("x");
    let three = b.int(3);
    let otherwise = b.assign(rx3, three);
    let stmt = b.if_else(cond, then, Some(otherwise));
    let root = b.block(&[x, stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 1);
    let stmt = code[0];
    assert_eq!(fx.graph.kind(stmt), Some(NodeKind::ConditionalStatement));
    assert_eq!(
        link(&fx, stmt, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::Normal))
    );
    let parts = expressions(&fx, stmt);
    assert_eq!(parts.len(), 2);
    let condition = link(&fx, parts[0], Relation::Condition);
    assert_eq!(fx.graph.kind(condition), Some(NodeKind::BoolExpression));
    assert_eq!(fx.graph.link_target(parts[1], Relation::Condition), None);
    assert_eq!(body_of(&fx.graph, parts[1]).len(), 1);
    assert_eq!(fx.module.role(Role::CaseSelector), None);
}

#[test]
fn else_part_becomes_the_default_case() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let a = b.call("a", &[]);
    let then = b.block(&[]);
    let otherwise = b.block(&[]);
    let stmt = b.if_else(a, then, Some(otherwise));
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let code = fx.graph.children(result.root);
    // Call a, the selector test, the case.
    assert_eq!(code.len(), 3);
    let test = expressions(&fx, code[1]);
    let fallback = body_of(&fx.graph, test[1]);
    assert_eq!(link(&fx, fallback[0], Relation::RightPart), fx.graph.int(1));
    let parts = expressions(&fx, code[2]);
    assert_eq!(link(&fx, parts[0], Relation::Condition), fx.graph.int(0));
    assert_eq!(fx.graph.link_target(parts[1], Relation::Condition), None);
}

/// `{ name = value; }`
fn assign_block(b: &mut nnl_ir::AstBuilder<'_>, name: &str, value: i64) -> NodeId {
    let target = b.ident(name);
    let v = b.int(value);
    let assign = b.assign(target, v);
    b.block(&[assign])
}

/// `if (a()) x = 10; else if (x < 1) x = 20; else x = 30;`
#[test]
fn restructured_parts_keep_their_order() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let x = b.local(TypeDecl::Int, "x", None);
    items.push(x);

    let first = assign_block(&mut b, "x", 10);
    let second = assign_block(&mut b, "x", 20);
    let third = assign_block(&mut b, "x", 30);
    let a = b.call("a", &[]);
    let rx = b.ident("x");
    let one = b.int(1);
    let below = b.binary(BinaryOp::Lt, rx, one);
    let parts = [
        b.part(Some(a), first),
        b.part(Some(below), second),
        b.part(None, third),
    ];
    let stmt = b.conditional(ConditionalStyle::If, None, &parts);
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let selector = fx.module.role(Role::CaseSelector).unwrap();
    let code = fx.graph.children(result.root);
    // Call a, the selector test, the case.
    assert_eq!(code.len(), 3);
    assert_eq!(instruction_of(&fx.graph, code[0]), Some(Instruction::Call));

    // Part 0 tests the call's result; part 1 is only tested when it fails.
    let outer = expressions(&fx, code[1]);
    assert_eq!(outer.len(), 2);
    assert_eq!(
        link(&fx, outer[0], Relation::Condition),
        fx.graph.well_known(WellKnown::ReturnValue)
    );
    let chosen = body_of(&fx.graph, outer[0]);
    assert_eq!(link(&fx, chosen[0], Relation::LeftPart), selector);
    assert_eq!(link(&fx, chosen[0], Relation::RightPart), fx.graph.int(0));
    assert_eq!(fx.graph.link_target(outer[1], Relation::Condition), None);
    let nested = body_of(&fx.graph, outer[1]);
    assert_eq!(nested.len(), 1);
    assert_eq!(fx.graph.kind(nested[0]), Some(NodeKind::ConditionalStatement));

    let inner = expressions(&fx, nested[0]);
    assert_eq!(inner.len(), 2);
    let below = link(&fx, inner[0], Relation::Condition);
    assert_eq!(fx.graph.kind(below), Some(NodeKind::BoolExpression));
    let chosen = body_of(&fx.graph, inner[0]);
    assert_eq!(link(&fx, chosen[0], Relation::RightPart), fx.graph.int(1));
    let fallback = body_of(&fx.graph, inner[1]);
    assert_eq!(link(&fx, fallback[0], Relation::RightPart), fx.graph.int(2));

    let case = code[2];
    assert_eq!(link(&fx, case, Relation::CaseItem), selector);
    let cases = expressions(&fx, case);
    let keys: Vec<_> = cases
        .iter()
        .map(|part| fx.graph.link_target(*part, Relation::Condition))
        .collect();
    assert_eq!(keys, vec![Some(fx.graph.int(0)), Some(fx.graph.int(1)), None]);
    let values: Vec<_> = cases
        .iter()
        .map(|part| link(&fx, body_of(&fx.graph, *part)[0], Relation::RightPart))
        .collect();
    assert_eq!(
        values,
        vec![fx.graph.int(10), fx.graph.int(20), fx.graph.int(30)]
    );
}

#[test]
fn while_with_call_reevaluates_at_end_of_body() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let a = b.call("a", &[]);
    let inner = b.call("b", &[]);
    let body = b.block(&[inner]);
    let part = b.part(Some(a), body);
    let stmt = b.conditional(ConditionalStyle::While, None, &[part]);
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let code = fx.graph.children(result.root);
    let case = *code.last().unwrap();
    assert_eq!(
        link(&fx, case, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::CaseLooped))
    );
    let parts = expressions(&fx, case);
    let body = body_of(&fx.graph, parts[0]);
    // call b, then the selector code again: call a and the test.
    assert_eq!(body.len(), 3);
    assert_eq!(&body[1..], &code[..2]);
}

#[test]
fn do_runs_first_part_before_testing() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let a = b.call("a", &[]);
    let body = b.block(&[]);
    let part = b.part(Some(a), body);
    let stmt = b.conditional(ConditionalStyle::Do, None, &[part]);
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let selector = fx.module.role(Role::CaseSelector).unwrap();
    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 2);
    assert_eq!(link(&fx, code[0], Relation::LeftPart), selector);
    assert_eq!(link(&fx, code[0], Relation::RightPart), fx.graph.int(0));
    let parts = expressions(&fx, code[1]);
    assert_eq!(body_of(&fx.graph, parts[0]).len(), 2);
}

#[test]
fn switch_links_its_case_value() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let x = b.local(TypeDecl::Int, "x", None);
    let rx = b.ident("x");
    let one = b.int(1);
    let first = b.block(&[]);
    let other = b.block(&[]);
    let parts = [b.part(Some(one), first), b.part(None, other)];
    let stmt = b.conditional(ConditionalStyle::Switch, Some(rx), &parts);
    let root = b.block(&[x, stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let stmt = fx.graph.children(result.root)[0];
    let var = link(&fx, stmt, Relation::CaseItem);
    assert_eq!(fx.graph.name(var), Some(fx.name("x")));
    assert_eq!(
        link(&fx, stmt, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::Case))
    );
    let parts = expressions(&fx, stmt);
    assert_eq!(link(&fx, parts[0], Relation::Condition), fx.graph.int(1));
}

#[test]
fn for_loop_appends_the_increment() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let y = b.local(TypeDecl::Int, "y", None);
    let zero = b.int(0);
    let i = b.local(TypeDecl::Int, "i", Some(zero));
    let ri = b.ident("i");
    let ten = b.int(10);
    let cond = b.binary(BinaryOp::Lt, ri, ten);
    let ri2 = b.ident("i");
    let step = b.unary(UnaryOp::Increment, ri2);
    let ry = b.ident("y");
    let ri3 = b.ident("i");
    let copy = b.assign(ry, ri3);
    let body = b.block(&[copy]);
    let stmt = b.for_loop(Some(i), Some(cond), Some(step), body);
    let root = b.block(&[y, stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 2);
    assert_eq!(link(&fx, code[0], Relation::RightPart), fx.graph.int(0));
    let stmt = code[1];
    assert_eq!(
        link(&fx, stmt, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::For))
    );
    assert_eq!(fx.graph.link_target(stmt, Relation::Statements), None);
    let parts = expressions(&fx, stmt);
    let body = body_of(&fx.graph, parts[0]);
    assert_eq!(body.len(), 2);
    let increment = link(&fx, body[1], Relation::RightPart);
    assert_eq!(instruction_of(&fx.graph, increment), Some(Instruction::AddInt));
}

#[test]
fn for_condition_with_call_keeps_its_code() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let mut items = bool_functions(&mut b);
    let a = b.call("a", &[]);
    let body = b.block(&[]);
    let stmt = b.for_loop(None, Some(a), None, body);
    items.push(stmt);
    let root = b.block(&items);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(codes(&result).is_empty());
    let stmt = fx.graph.children(result.root)[0];
    let pre = body_of(&fx.graph, stmt);
    assert_eq!(instructions(&fx, &pre), vec![Some(Instruction::Call)]);
    let parts = expressions(&fx, stmt);
    assert_eq!(
        link(&fx, parts[0], Relation::Condition),
        fx.graph.well_known(WellKnown::ReturnValue)
    );
}

#[test]
fn foreach_links_its_loop_item() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let item = b.local(TypeDecl::Var, "item", None);
    let source = b.symbol("colours");
    let body = b.block(&[]);
    let stmt = b.foreach(item, source, body);
    let root = b.block(&[stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let stmt = fx.graph.children(result.root)[0];
    let var = link(&fx, stmt, Relation::LoopItem);
    assert_eq!(fx.graph.name(var), Some(fx.name("item")));
    assert_eq!(
        link(&fx, stmt, Relation::LoopStyle),
        fx.graph.well_known(WellKnown::Style(LoopStyle::ForEach))
    );
    let parts = expressions(&fx, stmt);
    assert_eq!(
        link(&fx, parts[0], Relation::Condition),
        fx.graph.symbol(fx.name("colours"))
    );
}

#[test]
fn select_passes_variables_by_reference() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let a = b.local(TypeDecl::Var, "a", None);
    let bb = b.local(TypeDecl::Var, "b", None);
    let source = b.symbol("colours");
    let body = b.block(&[]);
    let stmt = b.select(&[a, bb], source, QueryStyle::Children, body);
    let root = b.block(&[stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let stmt = fx.graph.children(result.root)[0];
    let item = link(&fx, stmt, Relation::LoopItem);
    assert_eq!(fx.graph.kind(item), Some(NodeKind::Cluster(Relation::Union)));
    let refs = fx.graph.children(item);
    assert_eq!(refs.len(), 2);
    assert!(refs
        .iter()
        .all(|r| fx.graph.kind(*r) == Some(NodeKind::ByRef)));
    assert_eq!(
        link(&fx, stmt, Relation::LoopStyle),
        fx.graph
            .well_known(WellKnown::Style(LoopStyle::QueryLoop(QueryStyle::Children)))
    );
}

#[test]
fn lock_links_targets_and_body() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let target = b.symbol("door");
    let link_target = b.symbol("key");
    let x = b.local(TypeDecl::Int, "x", None);
    let rx = b.ident("x");
    let one = b.int(1);
    let assign = b.assign(rx, one);
    let body = b.block(&[assign]);
    let stmt = b.lock(&[target], &[link_target], body);
    let root = b.block(&[x, stmt]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let stmt = fx.graph.children(result.root)[0];
    assert_eq!(fx.graph.kind(stmt), Some(NodeKind::Lock));
    assert_eq!(
        fx.graph.children(link(&fx, stmt, Relation::LockTargets)),
        vec![fx.graph.symbol(fx.name("door"))]
    );
    assert_eq!(
        fx.graph.children(link(&fx, stmt, Relation::LinkTargets)),
        vec![fx.graph.symbol(fx.name("key"))]
    );
    assert_eq!(body_of(&fx.graph, stmt).len(), 1);
}

// Aggregates

#[test]
fn class_members_and_initializers() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let one = b.int(1);
    let a = b.local(TypeDecl::Int, "a", Some(one));
    let m = b.function("m", &[], &[], &[]);
    let class = b.class("C", None, &[a, m]);
    let thing = b.class("D", Some("thing"), &[]);
    let root = b.block(&[class, thing]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 1);
    assert_eq!(link(&fx, code[0], Relation::RightPart), fx.graph.int(1));

    let mut c_node = None;
    let mut d_node = None;
    for id in fx.module.externally_referenced() {
        match fx.graph.name(id) {
            Some(name) if name == fx.name("C") => c_node = Some(id),
            Some(name) if name == fx.name("D") => d_node = Some(id),
            _ => {}
        }
    }
    let c_node = c_node.unwrap();
    assert_eq!(fx.graph.kind(c_node), Some(NodeKind::Cluster(Relation::Class)));
    let members = fx.graph.children(c_node);
    assert_eq!(members.len(), 2);
    assert_eq!(members[0], link(&fx, code[0], Relation::LeftPart));
    assert_eq!(fx.graph.name(members[1]), Some(fx.name("m")));
    assert_eq!(
        fx.graph.kind(d_node.unwrap()),
        Some(NodeKind::Cluster(Relation::Custom(fx.name("thing"))))
    );
}

#[test]
fn list_union_and_link() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let one = b.int(1);
    let two = b.int(2);
    let list = b.list_expr(&[one, two]);
    let x = b.symbol("x");
    let y = b.symbol("y");
    let union = b.union(&[x, y]);
    let from = b.symbol("cat");
    let meaning = b.symbol("is");
    let to = b.symbol("animal");
    let link_decl = b.link(from, meaning, to);
    let ast = b.finish();
    let mut c = fx.compiler(&ast);

    let list = c.render(list);
    assert_eq!(c.graph.kind(list), Some(NodeKind::Cluster(Relation::List)));
    assert_eq!(c.graph.children(list), vec![c.graph.int(1), c.graph.int(2)]);
    let union = c.render(union);
    assert_eq!(instruction_of(c.graph, union), Some(Instruction::Union));
    let added = c.render(link_decl);
    assert_eq!(instruction_of(c.graph, added), Some(Instruction::AddLink));
    let names: Vec<_> = args_of(c.graph, added)
        .into_iter()
        .map(|n| c.graph.kind(n))
        .collect();
    assert_eq!(
        names,
        vec![
            Some(NodeKind::Symbol(c.interner.intern("cat"))),
            Some(NodeKind::Symbol(c.interner.intern("animal"))),
            Some(NodeKind::Symbol(c.interner.intern("is"))),
        ]
    );
}

#[test]
fn using_alias_reaches_declaration() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let total = b.local(TypeDecl::Int, "total", None);
    let alias = b.using("t", "total");
    let rt = b.ident("t");
    let one = b.int(1);
    let assign = b.assign(rt, one);
    let root = b.block(&[total, alias, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert!(!result.has_errors());
    let code = fx.graph.children(result.root);
    assert_eq!(code.len(), 1);
    let var = link(&fx, code[0], Relation::LeftPart);
    assert_eq!(fx.graph.name(var), Some(fx.name("total")));
}

// Errors

fn compile_errors(build: impl FnOnce(&mut nnl_ir::AstBuilder<'_>) -> NodeId) -> Vec<ErrorCode> {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let root = build(&mut b);
    let ast = b.finish();
    let result = fx.compile(&ast, root);
    assert!(fx.graph.is_finalized(result.root));
    codes(&result)
}

#[test]
fn unknown_identifier() {
    let errors = compile_errors(|b| {
        let y = b.local(TypeDecl::Int, "y", None);
        let ry = b.ident("y");
        let nope = b.ident("nope");
        let assign = b.assign(ry, nope);
        b.block(&[y, assign])
    });
    assert_eq!(errors, vec![ErrorCode::E1001]);
}

#[test]
fn unknown_binding() {
    let errors = compile_errors(|b| {
        let y = b.local(TypeDecl::Var, "y", None);
        let ry = b.ident("y");
        let read = b.binding(BindingKind::Asset, &["missing", "path"]);
        let assign = b.assign(ry, read);
        b.block(&[y, assign])
    });
    assert_eq!(errors, vec![ErrorCode::E1002]);
}

#[test]
fn unknown_binding_names_its_path_and_file() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let y = b.local(TypeDecl::Var, "y", None);
    let ry = b.ident("y");
    let read = b.binding(BindingKind::Asset, &["missing", "path"]);
    let assign = b.assign(ry, read);
    let root = b.block(&[y, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.message, "unknown binding `#missing.path`");
    assert_eq!(diagnostic.file, Some(fx.name("test.nnl")));
}

#[test]
fn calling_a_variable() {
    let errors = compile_errors(|b| {
        let x = b.local(TypeDecl::Int, "x", None);
        let call = b.call("x", &[]);
        b.block(&[x, call])
    });
    assert_eq!(errors, vec![ErrorCode::E1003]);
}

#[test]
fn unknown_function() {
    let errors = compile_errors(|b| {
        let call = b.call("missing", &[]);
        b.block(&[call])
    });
    assert_eq!(errors, vec![ErrorCode::E1001]);
}

#[test]
fn value_of_a_procedure() {
    let errors = compile_errors(|b| {
        let g = b.function("g", &[], &[], &[]);
        let x = b.local(TypeDecl::Int, "x", None);
        let rx = b.ident("x");
        let call = b.call("g", &[]);
        let assign = b.assign(rx, call);
        b.block(&[g, x, assign])
    });
    assert_eq!(errors, vec![ErrorCode::E2002]);
}

#[test]
fn wrong_argument_count() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let p = b.local(TypeDecl::Int, "p", None);
    let q = b.local(TypeDecl::Int, "q", None);
    let f = b.function("f", &[p, q], &[], &[]);
    let one = b.int(1);
    let call = b.call("f", &[one]);
    let root = b.block(&[f, call]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert_eq!(codes(&result), vec![ErrorCode::E2003]);
    assert_eq!(result.diagnostics[0].message, "`f` expects 2 arguments, found 1");
    // Nothing pushed for the rejected call.
    assert!(fx.graph.children(result.root).is_empty());
}

#[test]
fn assignment_without_left_part() {
    let errors = compile_errors(|b| {
        let one = b.int(1);
        let assign = b.assign(NodeId::INVALID, one);
        b.block(&[assign])
    });
    assert_eq!(errors, vec![ErrorCode::E3001]);
}

#[test]
fn assignment_to_a_literal_or_function() {
    let errors = compile_errors(|b| {
        let one = b.int(1);
        let two = b.int(2);
        let bad = b.assign(one, two);
        let f = b.function("f", &[], &[], &[]);
        let rf = b.ident("f");
        let three = b.int(3);
        let also_bad = b.assign(rf, three);
        b.block(&[bad, f, also_bad])
    });
    assert_eq!(errors, vec![ErrorCode::E3002, ErrorCode::E3002]);
}

#[test]
fn missing_condition_before_last_part() {
    let errors = compile_errors(|b| {
        let first = b.block(&[]);
        let second = b.block(&[]);
        let one = b.int(1);
        let parts = [b.part(None, first), b.part(Some(one), second)];
        let stmt = b.conditional(ConditionalStyle::If, None, &parts);
        b.block(&[stmt])
    });
    assert_eq!(errors, vec![ErrorCode::E3003]);
}

#[test]
fn switch_without_case_value() {
    let errors = compile_errors(|b| {
        let body = b.block(&[]);
        let one = b.int(1);
        let part = b.part(Some(one), body);
        let stmt = b.conditional(ConditionalStyle::Switch, None, &[part]);
        b.block(&[stmt])
    });
    assert_eq!(errors, vec![ErrorCode::E3003]);
}

#[test]
fn switch_default_before_last_case() {
    let errors = compile_errors(|b| {
        let x = b.local(TypeDecl::Int, "x", None);
        let rx = b.ident("x");
        let first = b.block(&[]);
        let second = b.block(&[]);
        let two = b.int(2);
        let parts = [b.part(None, first), b.part(Some(two), second)];
        let stmt = b.conditional(ConditionalStyle::Switch, Some(rx), &parts);
        b.block(&[x, stmt])
    });
    assert_eq!(errors, vec![ErrorCode::E3004]);
}

#[test]
fn call_in_case_condition() {
    let errors = compile_errors(|b| {
        let g = b.function("g", &[], &[TypeDecl::Int], &[]);
        let x = b.local(TypeDecl::Int, "x", None);
        let rx = b.ident("x");
        let call = b.call("g", &[]);
        let body = b.block(&[]);
        let part = b.part(Some(call), body);
        let stmt = b.conditional(ConditionalStyle::Switch, Some(rx), &[part]);
        b.block(&[g, x, stmt])
    });
    assert_eq!(errors, vec![ErrorCode::E3005]);
}

#[test]
fn reference_outside_arguments() {
    let errors = compile_errors(|b| {
        let x = b.local(TypeDecl::Int, "x", None);
        let y = b.local(TypeDecl::Int, "y", None);
        let ry = b.ident("y");
        let rx = b.ident("x");
        let by_ref = b.unary(UnaryOp::ByRef, rx);
        let assign = b.assign(ry, by_ref);
        b.block(&[x, y, assign])
    });
    assert_eq!(errors, vec![ErrorCode::E3006]);
}

#[test]
fn loop_headers_missing_parts() {
    let errors = compile_errors(|b| {
        let body = b.block(&[]);
        let for_stmt = b.for_loop(None, None, None, body);
        let source = b.symbol("s");
        let body = b.block(&[]);
        let select = b.select(&[], source, QueryStyle::Children, body);
        b.block(&[for_stmt, select])
    });
    assert_eq!(errors, vec![ErrorCode::E3007, ErrorCode::E3007]);
}

#[test]
fn errors_do_not_stop_lowering() {
    let mut fx = Fixture::new();
    let mut b = fx.builder();
    let nope = b.ident("nope");
    let x = b.local(TypeDecl::Int, "x", None);
    let rx = b.ident("x");
    let one = b.int(1);
    let assign = b.assign(rx, one);
    let root = b.block(&[nope, x, assign]);
    let ast = b.finish();

    let result = fx.compile(&ast, root);
    assert_eq!(codes(&result), vec![ErrorCode::E1001]);
    assert_eq!(fx.graph.children(result.root).len(), 1);
}
