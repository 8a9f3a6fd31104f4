//! Exercises the scheduling contract: transitive enablement, topological
//! ordering, and cyclic-dependency detection.

use std::sync::{Arc, Mutex};

use joosc_pass::{DependencyContext, Pass, PassError, PassManager, RunContext};

#[derive(Default)]
struct PassA { order: Option<Arc<Mutex<Vec<&'static str>>>> }
#[derive(Default)]
struct PassB { order: Option<Arc<Mutex<Vec<&'static str>>>> }
#[derive(Default)]
struct PassC { order: Option<Arc<Mutex<Vec<&'static str>>>> }

macro_rules! impl_recording_pass {
    ($ty:ident, $name:literal) => {
        impl Pass for $ty {
            fn name(&self) -> &'static str { $name }

            fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), PassError> {
                if let Some(order) = &self.order {
                    order.lock().unwrap().push($name);
                }
                Ok(())
            }

            fn as_any(&self) -> &dyn std::any::Any { self }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
        }
    };
}

impl_recording_pass!(PassA, "A");
impl_recording_pass!(PassC, "C");

impl Pass for PassB {
    fn name(&self) -> &'static str { "B" }

    fn compute_dependencies(&self, ctx: &mut DependencyContext) { ctx.require::<PassA>(); }

    fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), PassError> {
        if let Some(order) = &self.order {
            order.lock().unwrap().push("B");
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[test]
fn enabling_b_transitively_enables_and_orders_a_before_b() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut manager = PassManager::new();
    manager.add_pass(PassA { order: Some(order.clone()) }, false);
    manager.add_pass(PassB { order: Some(order.clone()) }, true);

    manager.run().expect("acyclic schedule runs");

    let recorded = order.lock().unwrap().clone();
    assert_eq!(recorded, vec!["A", "B"]);
}

#[test]
fn pass_not_enabled_and_not_required_never_runs() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut manager = PassManager::new();
    manager.add_pass(PassA { order: Some(order.clone()) }, false);
    manager.add_pass(PassC { order: Some(order.clone()) }, false);

    manager.run().expect("empty schedule runs");

    assert!(order.lock().unwrap().is_empty());
}

struct CyclicA;
struct CyclicB;

impl Pass for CyclicA {
    fn name(&self) -> &'static str { "CyclicA" }
    fn compute_dependencies(&self, ctx: &mut DependencyContext) { ctx.require::<CyclicB>(); }
    fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), PassError> { Ok(()) }
    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

impl Pass for CyclicB {
    fn name(&self) -> &'static str { "CyclicB" }
    fn compute_dependencies(&self, ctx: &mut DependencyContext) { ctx.require::<CyclicA>(); }
    fn run(&mut self, _ctx: &mut RunContext<'_>) -> Result<(), PassError> { Ok(()) }
    fn as_any(&self) -> &dyn std::any::Any { self }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any { self }
}

#[test]
fn cyclic_dependency_is_reported_as_a_fatal_error() {
    let mut manager = PassManager::new();
    manager.add_pass(CyclicA, true);
    manager.add_pass(CyclicB, true);

    let err = manager.run().expect_err("cycle must be rejected");
    assert!(matches!(err, PassError::CyclicDependency { .. }));
}
