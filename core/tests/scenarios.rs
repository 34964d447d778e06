//! End-to-end scenarios exercising the whole stack: variables, a reference
//! constraint, search, and assignment snapshots together, one test per
//! concrete scenario plus the cross-cutting testable properties.

use std::cell::Cell;
use std::rc::Rc;

use cpkernel::assignment::{Assignment, InMemoryProto};
use cpkernel::constraints::{AllDifferent, Gcc, GccArgs, SoftGcc, SoftGccArgs, SumEquals};
use cpkernel::search::{first_unbound, min_value, DecisionBuilder, Limits, SearchMonitor};
use cpkernel::{Solver, SolverConfig};

fn labeling(vars: Vec<cpkernel::domain::IntVar>) -> DecisionBuilder {
    DecisionBuilder::Assign { vars, var_select: first_unbound, val_select: min_value }
}

/// S1 — all-different over three variables enumerates exactly the six
/// permutations of `{1,2,3}`.
#[test]
fn s1_all_different_enumerates_six_permutations() {
    let mut s = Solver::new(SolverConfig::default());
    let vars: Vec<_> = (0..3).map(|_| s.new_int_var(1, 3)).collect();
    s.post(AllDifferent::new(vars.clone())).unwrap();

    let db = labeling(vars.clone());
    let mut search = s.new_search(db, vec![]);
    let mut solutions = Vec::new();
    while s.next_solution(&mut search) {
        solutions.push(vars.iter().map(|&v| s.min(v)).collect::<Vec<_>>());
    }
    s.end_search(search);

    assert_eq!(solutions.len(), 6);
    let mut uniq = solutions.clone();
    uniq.sort();
    uniq.dedup();
    assert_eq!(uniq.len(), 6, "all six permutations must be distinct");
    for sol in &solutions {
        let mut sorted = sol.clone();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3]);
    }
}

/// S2 — Bounds-Consistent GCC over five variables in `{1,2,3}` with
/// `card_min = [1,1,1]`, `card_max = [2,2,2]`: every accepted solution must
/// use each value between one and two times (soundness, property 6), and
/// since five variables split over three values bounded to `[1,2]` each
/// forces exactly one value used twice... no: with three values capped at 2
/// and five slots, exactly two values are used twice and one value once, so
/// the reachable solution count is `3 * 5!/(2!2!1!) = 90`.
#[test]
fn s2_bounds_consistent_gcc_is_sound_and_complete() {
    let mut s = Solver::new(SolverConfig::default());
    let vars: Vec<_> = (0..5).map(|_| s.new_int_var(1, 3)).collect();
    let args = GccArgs { vars: vars.clone(), values: vec![1, 2, 3], card_min: vec![1, 1, 1], card_max: vec![2, 2, 2] };
    args.validate().unwrap();
    s.post(Gcc::new(args)).unwrap();

    let db = labeling(vars.clone());
    let mut search = s.new_search(db, vec![]);
    let mut count = 0u64;
    while s.next_solution(&mut search) {
        count += 1;
        let mut counts = [0u32; 3];
        for &v in &vars {
            counts[(s.min(v) - 1) as usize] += 1;
        }
        for c in counts {
            assert!((1..=2).contains(&c), "every value must be used once or twice, got counts {counts:?}");
        }
    }
    s.end_search(search);

    assert_eq!(count, 90);
}

/// S3 — Soft-GCC's violation variable is pruned to its true lower bound
/// before any search takes place: five variables in `{1,2}` each needing a
/// minimum count of 3 cannot both be satisfied (3+3 > 5), so the unavoidable
/// shortage is exactly 1.
#[test]
fn s3_soft_gcc_prunes_violation_lower_bound_before_search() {
    let mut s = Solver::new(SolverConfig::default());
    let vars: Vec<_> = (0..5).map(|_| s.new_int_var(1, 2)).collect();
    let viol = s.new_int_var(0, 100);
    let args = SoftGccArgs { vars: vars.clone(), values: vec![1, 2], card_min: vec![3, 3], card_max: vec![5, 5], violation: viol };
    args.validate().unwrap();
    s.post(SoftGcc::new(args)).unwrap();

    assert_eq!(s.min(viol), 1);

    let db = labeling(vars);
    let mut search = s.new_search(db, vec![]);
    assert!(s.next_solution(&mut search), "a feasible assignment must exist");
    s.end_search(search);
}

/// S4 — unwinding a choice point restores a variable's domain exactly,
/// holes included.
#[test]
fn s4_trail_unwind_preserves_domain() {
    let mut s = Solver::new(SolverConfig::default());
    let x = s.new_int_var(0, 9);
    let marker = s.mark();
    s.set_range(x, 3, 7).unwrap();
    s.remove_value(x, 5).unwrap();
    assert_eq!(s.iter_domain(x).collect::<Vec<_>>(), vec![3, 4, 6, 7]);

    s.restore_to(marker);
    assert_eq!(s.iter_domain(x).collect::<Vec<_>>(), (0..=9).collect::<Vec<_>>());
}

/// S5 — an `Assignment` saved through the serialization collaborator and
/// loaded into a freshly tracked (but isomorphic) assignment round-trips to
/// an equal value, objective included.
#[test]
fn s5_assignment_save_load_round_trips() {
    let mut s = Solver::new(SolverConfig::default());
    let a_var = s.new_named_int_var(0, 10, "a");
    let b_var = s.new_named_int_var(0, 10, "b");
    let c_var = s.new_named_int_var(0, 10, "c");
    let objective = s.new_named_int_var(0, 100, "cost");
    let marker = s.mark();
    s.set_value(a_var, 1).unwrap();
    s.set_value(b_var, 2).unwrap();
    s.set_value(c_var, 3).unwrap();
    s.set_value(objective, 7).unwrap();

    let mut saved = Assignment::new();
    saved.add_all(&s, &[a_var, b_var, c_var]);
    saved.set_objective(&s, objective);
    saved.store(&s);

    let mut proto = InMemoryProto::new("s5-model");
    saved.save(&mut proto);

    let mut loaded = Assignment::new();
    loaded.add_all(&s, &[a_var, b_var, c_var]);
    loaded.set_objective(&s, objective);
    loaded.load(&proto);

    assert_eq!(saved, loaded);

    // Widen the domains back out before perturbing, so the perturbed value
    // is reachable and `restore` has something to actually undo.
    s.restore_to(marker);
    s.set_value(a_var, 9).unwrap();
    loaded.restore(&mut s).unwrap();
    assert_eq!(s.min(a_var), 1);
    assert_eq!(s.min(b_var), 2);
    assert_eq!(s.min(c_var), 3);
}

/// S6 — a fail-count limit of 10 stops the search after exactly 10 fails,
/// never silently skipping past it.
#[test]
fn s6_limit_monitor_stops_after_exactly_ten_fails() {
    struct CountingLimit {
        inner: Limits,
        fails: Rc<Cell<u64>>,
    }
    impl SearchMonitor for CountingLimit {
        fn begin_fail(&mut self, solver: &cpkernel::Solver) {
            self.inner.begin_fail(solver);
            self.fails.set(self.fails.get() + 1);
        }
        fn apply_decision(&mut self, solver: &cpkernel::Solver, decision: &cpkernel::search::Decision) {
            self.inner.apply_decision(solver, decision);
        }
        fn should_stop(&self, solver: &cpkernel::Solver) -> bool {
            self.inner.should_stop(solver)
        }
    }

    let mut s = Solver::new(SolverConfig::default());
    // Six variables over {1..6} under all-different: every complete leaf is
    // some permutation of {1,2,3,4,5,6}, which always sums to 21. Capping
    // the sum variable's domain at 20 makes every single leaf fail, so the
    // tree is fail-dense without collapsing after one or two decisions the
    // way a tight all-different over a small domain would.
    let vars: Vec<_> = (0..6).map(|_| s.new_int_var(1, 6)).collect();
    s.post(AllDifferent::new(vars.clone())).unwrap();
    let total = s.new_int_var(0, 20);
    s.post(SumEquals::new(vars.clone(), total)).unwrap();

    let fails = Rc::new(Cell::new(0u64));
    let monitor = CountingLimit { inner: Limits::new().with_max_fails(10), fails: fails.clone() };

    let db = labeling(vars);
    let status = s.solve(db, vec![Box::new(monitor)]);

    assert_eq!(status, cpkernel::Status::Limit);
    assert_eq!(fails.get(), 10);
}
