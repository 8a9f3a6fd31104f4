//! Expression nodes and the reverse-Polish expression evaluator.
//!
//! An `Expr` is not a recursive tree: it is an [`ExprNodeList`], a flat
//! postfix (RPN) sequence of [`NodeID`]s. Structure is implicit in each
//! node's arity, not in parent/child edges — every expr node's
//! `children()` is empty. [`evaluate_list`] is the single place that walks
//! the sequence; name resolution, type checking, and code generation all
//! instantiate it with a different `T` and [`ExprEvaluator`].

use std::cell::Cell;

use joosc_source::SourceRange;
use thiserror::Error;

use crate::ast::Ast;
use crate::nodes::{AnyNode, NodeID};

/// Failure modes the evaluator itself detects, independent of what a
/// concrete [`ExprEvaluator`] does with a node's value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// An operator needed an operand but the stack was empty.
    #[error("expression stack underflow")]
    StackUnderflow,
    /// Evaluation finished with a stack size other than one.
    #[error("expression did not reduce to a single value ({remaining} left on stack)")]
    NotASingleResult { remaining: usize },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    BitAnd,
    BitOr,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

/// A literal value as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i32),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

/// The outcome of classifying an ambiguous name (JLS §6.5.2): either still
/// unresolved, or bound to a declaration, or identified as a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Unresolved,
    ExpressionName(NodeID),
    TypeName(NodeID),
    PackageName(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct LiteralNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub value: LiteralValue,
}

impl LiteralNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// A (possibly qualified) name appearing in expression position. `prev`
/// links to the qualifier `Q` of a `Q.Id` access, forming the chain the
/// expression resolver walks and reduces.
#[derive(Debug, Clone)]
pub struct MemberName {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub prev: Option<NodeID>,
    pub resolution: NameResolution,
}

impl MemberName {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// A name classified as a `MethodName` (JLS §6.5.2): deferred until the
/// enclosing `MethodInvocation` reduces it.
#[derive(Debug, Clone)]
pub struct MethodNameNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub name: String,
    pub prev: Option<NodeID>,
    pub resolution: NameResolution,
}

impl MethodNameNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

#[derive(Debug, Clone)]
pub struct ThisNode {
    pub id: NodeID,
    pub span: SourceRange,
}

impl ThisNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

#[derive(Debug, Clone)]
pub struct BinaryOpNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub op: BinOp,
}

impl BinaryOpNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

#[derive(Debug, Clone)]
pub struct UnaryOpNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub op: UnOp,
}

impl UnaryOpNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// Pops a field-name operand then a receiver operand.
#[derive(Debug, Clone)]
pub struct MemberAccessNode {
    pub id: NodeID,
    pub span: SourceRange,
}

impl MemberAccessNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// A method call. `nargs` counts total pops including the method token
/// itself, so a zero-argument call has `nargs == 1` (see
/// [`MethodInvocationNode::arg_count`]).
#[derive(Debug, Clone)]
pub struct MethodInvocationNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub nargs: u32,
}

impl MethodInvocationNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }

    /// Number of actual argument operands (excludes the method token).
    #[must_use]
    pub const fn arg_count(&self) -> u32 { self.nargs.saturating_sub(1) }
}

/// `new Type(args...)`. Same `nargs` convention as `MethodInvocationNode`:
/// the type token is always popped, so `nargs == 1` means no constructor
/// arguments.
#[derive(Debug, Clone)]
pub struct ClassInstanceCreationNode {
    pub id: NodeID,
    pub span: SourceRange,
    pub nargs: u32,
}

impl ClassInstanceCreationNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }

    #[must_use]
    pub const fn arg_count(&self) -> u32 { self.nargs.saturating_sub(1) }
}

/// `new ElementType[size]`. Pops size, then element type.
#[derive(Debug, Clone)]
pub struct ArrayInstanceCreationNode {
    pub id: NodeID,
    pub span: SourceRange,
}

impl ArrayInstanceCreationNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// `array[index]`. Pops index, then array.
#[derive(Debug, Clone)]
pub struct ArrayAccessNode {
    pub id: NodeID,
    pub span: SourceRange,
}

impl ArrayAccessNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// `(Type) value`. Pops value, then type.
#[derive(Debug, Clone)]
pub struct CastNode {
    pub id: NodeID,
    pub span: SourceRange,
}

impl CastNode {
    #[must_use]
    pub fn children(&self) -> Vec<NodeID> { vec![] }
}

/// A flat postfix sequence of expression node ids, plus the const-lock
/// counter that detects re-entrant or unfinished evaluation.
#[derive(Debug, Clone)]
pub struct ExprNodeList {
    pub nodes: Vec<NodeID>,
    lock: Cell<u32>,
}

impl ExprNodeList {
    #[must_use]
    pub fn new(nodes: Vec<NodeID>) -> Self { Self { nodes, lock: Cell::new(0) } }

    /// Locks every node for the duration of one evaluation pass.
    fn lock_all(&self) { self.lock.set(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX)); }

    /// Unlocks one node as it is visited by the evaluator's traversal, once
    /// per node regardless of how many operands it pops.
    fn unlock_one(&self) { self.lock.set(self.lock.get().saturating_sub(1)); }

    /// True once every node has been unlocked (evaluation fully consumed the list).
    #[must_use]
    pub fn is_unlocked(&self) -> bool { self.lock.get() == 0 }
}

/// Parameterises [`evaluate_list`] over a result type `T`. Each hook
/// corresponds to one `ExprNode` variant's reduction rule.
pub trait ExprEvaluator<T> {
    type Error: From<EvalError>;

    fn map_value(&mut self, ast: &Ast, node: &AnyNode) -> Result<T, Self::Error>;
    fn eval_unary(&mut self, op: UnOp, x: T) -> Result<T, Self::Error>;
    fn eval_binary(&mut self, op: BinOp, lhs: T, rhs: T) -> Result<T, Self::Error>;
    fn eval_member_access(&mut self, recv: T, field: T) -> Result<T, Self::Error>;
    fn eval_method_call(&mut self, method: T, args: Vec<T>) -> Result<T, Self::Error>;
    fn eval_new_object(&mut self, ty: T, args: Vec<T>) -> Result<T, Self::Error>;
    fn eval_new_array(&mut self, elem_ty: T, size: T) -> Result<T, Self::Error>;
    fn eval_array_access(&mut self, array: T, index: T) -> Result<T, Self::Error>;
    fn eval_cast(&mut self, ty: T, value: T) -> Result<T, Self::Error>;
}

fn pop_safe<T, E: From<EvalError>>(stack: &mut Vec<T>) -> Result<T, E> {
    stack.pop().ok_or_else(|| EvalError::StackUnderflow.into())
}

/// Walks `list` left to right, dispatching each node to the matching
/// [`ExprEvaluator`] hook, and returns the single resulting value.
///
/// ## Errors
///
/// Returns `E::from(EvalError::StackUnderflow)` if an operator is missing
/// operands, `E::from(EvalError::NotASingleResult)` if evaluation does not
/// leave exactly one value on the stack, or whatever domain error a hook
/// itself reports.
pub fn evaluate_list<T, Ev, E>(ast: &Ast, list: &ExprNodeList, evaluator: &mut Ev) -> Result<T, E>
where
    Ev: ExprEvaluator<T, Error = E>,
    E: From<EvalError>,
{
    list.lock_all();
    let mut stack: Vec<T> = Vec::with_capacity(list.nodes.len());

    for &id in &list.nodes {
        let node = ast.node(id).map(|n| &n.data).expect("expr node ids are always populated");
        list.unlock_one();
        let value = match node {
            AnyNode::BinaryOpNode(n) => {
                let rhs = pop_safe(&mut stack)?;
                let lhs = pop_safe(&mut stack)?;
                evaluator.eval_binary(n.op, lhs, rhs)?
            }
            AnyNode::UnaryOpNode(n) => {
                let x = pop_safe(&mut stack)?;
                evaluator.eval_unary(n.op, x)?
            }
            AnyNode::MemberAccessNode(_) => {
                let field = pop_safe(&mut stack)?;
                let recv = pop_safe(&mut stack)?;
                evaluator.eval_member_access(recv, field)?
            }
            AnyNode::MethodInvocationNode(n) => {
                let mut args = Vec::with_capacity(n.arg_count() as usize);
                for _ in 0..n.arg_count() {
                    args.push(pop_safe(&mut stack)?);
                }
                args.reverse();
                let method = pop_safe(&mut stack)?;
                evaluator.eval_method_call(method, args)?
            }
            AnyNode::ClassInstanceCreationNode(n) => {
                let mut args = Vec::with_capacity(n.arg_count() as usize);
                for _ in 0..n.arg_count() {
                    args.push(pop_safe(&mut stack)?);
                }
                args.reverse();
                let ty = pop_safe(&mut stack)?;
                evaluator.eval_new_object(ty, args)?
            }
            AnyNode::ArrayInstanceCreationNode(_) => {
                let size = pop_safe(&mut stack)?;
                let elem_ty = pop_safe(&mut stack)?;
                evaluator.eval_new_array(elem_ty, size)?
            }
            AnyNode::ArrayAccessNode(_) => {
                let index = pop_safe(&mut stack)?;
                let array = pop_safe(&mut stack)?;
                evaluator.eval_array_access(array, index)?
            }
            AnyNode::CastNode(_) => {
                let value = pop_safe(&mut stack)?;
                let ty = pop_safe(&mut stack)?;
                evaluator.eval_cast(ty, value)?
            }
            // Literal/identifier/this tokens are values in their own right.
            _ => evaluator.map_value(ast, node)?,
        };
        stack.push(value);
    }

    if stack.len() != 1 {
        return Err(EvalError::NotASingleResult { remaining: stack.len() }.into());
    }
    debug_assert!(list.is_unlocked(), "evaluate_list must consume every node exactly once");
    Ok(stack.pop().expect("length checked above"))
}

#[cfg(test)]
mod tests {
    use joosc_source::{FileId, Position};

    use super::*;
    use crate::ast::Ast;

    fn dummy_span() -> SourceRange {
        SourceRange::new(Position::start_of_file(), Position::start_of_file(), FileId::new(1))
    }

    /// Folds integer literals through `+`/`-`/unary `-`; any other node kind
    /// is an error, since these tests only ever build arithmetic RPN.
    struct IntFolder;

    impl ExprEvaluator<i32> for IntFolder {
        type Error = EvalError;

        fn map_value(&mut self, _ast: &Ast, node: &AnyNode) -> Result<i32, EvalError> {
            match node {
                AnyNode::LiteralNode(n) => match n.value {
                    LiteralValue::Int(v) => Ok(v),
                    _ => panic!("unexpected literal in test"),
                },
                _ => panic!("unexpected node in test"),
            }
        }

        fn eval_unary(&mut self, op: UnOp, x: i32) -> Result<i32, EvalError> {
            Ok(match op {
                UnOp::Neg => -x,
                UnOp::Not => panic!("not tested"),
            })
        }

        fn eval_binary(&mut self, op: BinOp, lhs: i32, rhs: i32) -> Result<i32, EvalError> {
            Ok(match op {
                BinOp::Add => lhs + rhs,
                BinOp::Sub => lhs - rhs,
                _ => panic!("not tested"),
            })
        }

        fn eval_member_access(&mut self, _recv: i32, _field: i32) -> Result<i32, EvalError> { unreachable!() }
        fn eval_method_call(&mut self, _method: i32, _args: Vec<i32>) -> Result<i32, EvalError> { unreachable!() }
        fn eval_new_object(&mut self, _ty: i32, _args: Vec<i32>) -> Result<i32, EvalError> { unreachable!() }
        fn eval_new_array(&mut self, _elem_ty: i32, _size: i32) -> Result<i32, EvalError> { unreachable!() }
        fn eval_array_access(&mut self, _array: i32, _index: i32) -> Result<i32, EvalError> { unreachable!() }
        fn eval_cast(&mut self, _ty: i32, _value: i32) -> Result<i32, EvalError> { unreachable!() }
    }

    fn int_lit(ast: &mut Ast, v: i32) -> NodeID {
        ast.alloc(AnyNode::LiteralNode(LiteralNode { id: NodeID::new(0, 0), span: dummy_span(), value: LiteralValue::Int(v) }))
    }

    fn bin_op(ast: &mut Ast, op: BinOp) -> NodeID {
        ast.alloc(AnyNode::BinaryOpNode(BinaryOpNode { id: NodeID::new(0, 0), span: dummy_span(), op }))
    }

    #[test]
    fn evaluates_simple_postfix_arithmetic() {
        // 1 2 + 3 -  ==  (1 + 2) - 3
        let mut ast = Ast::new();
        let one = int_lit(&mut ast, 1);
        let two = int_lit(&mut ast, 2);
        let plus = bin_op(&mut ast, BinOp::Add);
        let three = int_lit(&mut ast, 3);
        let minus = bin_op(&mut ast, BinOp::Sub);
        let list = ExprNodeList::new(vec![one, two, plus, three, minus]);

        let result: i32 = evaluate_list(&ast, &list, &mut IntFolder).unwrap();
        assert_eq!(result, 0);
        assert!(list.is_unlocked());
    }

    #[test]
    fn stack_underflow_on_missing_operand() {
        let mut ast = Ast::new();
        let one = int_lit(&mut ast, 1);
        let plus = bin_op(&mut ast, BinOp::Add);
        let list = ExprNodeList::new(vec![one, plus]);

        let err = evaluate_list::<i32, _, EvalError>(&ast, &list, &mut IntFolder).unwrap_err();
        assert_eq!(err, EvalError::StackUnderflow);
    }

    #[test]
    fn leftover_operands_report_not_a_single_result() {
        let mut ast = Ast::new();
        let one = int_lit(&mut ast, 1);
        let two = int_lit(&mut ast, 2);
        let list = ExprNodeList::new(vec![one, two]);

        let err = evaluate_list::<i32, _, EvalError>(&ast, &list, &mut IntFolder).unwrap_err();
        assert_eq!(err, EvalError::NotASingleResult { remaining: 2 });
    }

    #[test]
    fn zero_arg_call_has_nargs_one() {
        let call = MethodInvocationNode { id: NodeID::new(0, 0), span: dummy_span(), nargs: 1 };
        assert_eq!(call.arg_count(), 0);
    }

    #[derive(Debug, Clone)]
    enum ArithExpr {
        Lit(i32),
        Add(Box<ArithExpr>, Box<ArithExpr>),
        Sub(Box<ArithExpr>, Box<ArithExpr>),
        Neg(Box<ArithExpr>),
    }

    fn arith_expr() -> impl proptest::strategy::Strategy<Value = ArithExpr> {
        use proptest::prelude::*;
        let leaf = any::<i16>().prop_map(|v| ArithExpr::Lit(i32::from(v)));
        leaf.prop_recursive(4, 64, 4, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| ArithExpr::Add(Box::new(l), Box::new(r))),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| ArithExpr::Sub(Box::new(l), Box::new(r))),
                inner.prop_map(|e| ArithExpr::Neg(Box::new(e))),
            ]
        })
    }

    /// Lowers `expr` onto `ast` as a well-formed RPN sequence: every operator
    /// node appears after both (or its one) operand, matching how the parser
    /// builds `ExprNodeList` from a parse tree.
    fn lower_rpn(ast: &mut Ast, expr: &ArithExpr, nodes: &mut Vec<NodeID>) {
        match expr {
            ArithExpr::Lit(v) => {
                nodes.push(int_lit(ast, *v));
            }
            ArithExpr::Add(l, r) => {
                lower_rpn(ast, l, nodes);
                lower_rpn(ast, r, nodes);
                nodes.push(bin_op(ast, BinOp::Add));
            }
            ArithExpr::Sub(l, r) => {
                lower_rpn(ast, l, nodes);
                lower_rpn(ast, r, nodes);
                nodes.push(bin_op(ast, BinOp::Sub));
            }
            ArithExpr::Neg(e) => {
                lower_rpn(ast, e, nodes);
                nodes.push(ast.alloc(AnyNode::UnaryOpNode(UnaryOpNode {
                    id: NodeID::new(0, 0),
                    span: dummy_span(),
                    op: UnOp::Neg,
                })));
            }
        }
    }

    proptest::proptest! {
        /// Any RPN sequence built from a well-formed arithmetic tree
        /// evaluates to completion with exactly one value left on the
        /// stack, and leaves the node list fully unlocked.
        #[test]
        fn well_formed_rpn_always_terminates_with_one_value(expr in arith_expr()) {
            let mut ast = Ast::new();
            let mut nodes = Vec::new();
            lower_rpn(&mut ast, &expr, &mut nodes);
            let list = ExprNodeList::new(nodes);
            let result: Result<i32, EvalError> = evaluate_list(&ast, &list, &mut IntFolder);
            proptest::prop_assert!(result.is_ok());
            proptest::prop_assert!(list.is_unlocked());
        }
    }
}
