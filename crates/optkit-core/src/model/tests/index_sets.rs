use super::*;

#[test]
fn test_index_set_rejects_empty_and_duplicates() {
    let empty: Vec<i64> = Vec::new();
    assert_eq!(
        IndexSet::new("t", empty),
        Err(ModelError::EmptyIndexSet {
            name: "t".to_string()
        })
    );
    let err = IndexSet::new("t", [0, 1, 1]).unwrap_err();
    assert_eq!(
        err,
        ModelError::DuplicateIndexKey {
            set: "t".to_string(),
            key: "1".to_string()
        }
    );
    assert!(IndexSet::range("t", 0..0).is_err());
}

#[test]
fn test_index_set_keeps_order() {
    let set = IndexSet::new("site", ["north", "south", "east"]).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.keys()[2], IndexKey::from("east"));
    assert_eq!(set.position(&IndexKey::from("south")), Some(1));
    assert_eq!(set.name(), "site");
}

#[test]
fn test_add_variables_registers_members() {
    let mut problem = Problem::new();
    let time = IndexSet::range("time", 0..4).unwrap();
    let level = problem
        .add_variables("level", &time, Domain::bounded(0.0, 10.0))
        .unwrap();

    assert_eq!(level.len(), 4);
    assert_eq!(level.name(), "level");
    assert_eq!(problem.num_variables(), 4);
    assert_eq!(problem.variable_by_name("level[2]"), level.get(2));
    assert_eq!(problem.variable_name(level.at(3).unwrap()), Ok("level[3]"));
    assert!(level.get(7).is_none());
    // The base name is reserved but is not itself a variable.
    assert!(problem.is_name_taken("level"));
    assert!(problem.variable_by_name("level").is_none());
}

#[test]
fn test_family_name_collisions() {
    let mut problem = Problem::new();
    let time = IndexSet::range("time", 0..2).unwrap();
    problem.add_variable("flow[1]", Domain::free()).unwrap();
    let err = problem
        .add_variables("flow", &time, Domain::free())
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::NameCollision {
            name: "flow[1]".to_string()
        }
    );
    assert_eq!(problem.num_variables(), 1);
    assert!(!problem.is_name_taken("flow"));

    problem.add_variables("stock", &time, Domain::free()).unwrap();
    assert!(
        problem
            .add_variables("stock", &time, Domain::free())
            .is_err()
    );
}

#[test]
fn test_mixed_keys_with_same_rendering_collide() {
    let mut problem = Problem::new();
    let set = IndexSet::new("k", [IndexKey::Int(1), IndexKey::from("1")]).unwrap();
    let err = problem.add_variables("v", &set, Domain::free()).unwrap_err();
    assert!(matches!(err, ModelError::NameCollision { .. }));
    assert_eq!(problem.num_variables(), 0);
}

#[test]
fn test_add_constraints_builds_one_row_per_key() {
    let mut problem = Problem::new();
    let time = IndexSet::range("time", 0..3).unwrap();
    let level = problem
        .add_variables("level", &time, Domain::non_negative())
        .unwrap();
    let inflow = problem.add_variable("inflow", Domain::bounded(0.0, 2.0)).unwrap();

    // level[t] - level[t-1] - inflow == 0, level[0] == 1
    let balance = problem
        .add_constraints("balance", &time, |key| {
            let IndexKey::Int(t) = key else {
                unreachable!("integer keys");
            };
            let current = level.get(*t).unwrap();
            match level.get(*t - 1) {
                Some(previous) => (current - previous - inflow).equals(0.0),
                None => Expr::var(current).equals(1.0),
            }
        })
        .unwrap();

    assert_eq!(balance.len(), 3);
    assert_eq!(problem.num_constraints(), 3);
    assert_eq!(problem.constraint_by_name("balance[1]"), balance.get(1));
    let first = problem.get_constraint(balance.at(0).unwrap()).unwrap();
    assert_eq!((first.bounds.lower, first.bounds.upper), (1.0, 1.0));
    assert_eq!(problem.get_column(inflow).unwrap().len(), 2);
}

#[test]
fn test_add_constraints_is_atomic() {
    let mut problem = Problem::new();
    let time = IndexSet::range("time", 0..3).unwrap();
    let x = problem.add_variable("x", Domain::free()).unwrap();
    let result = problem.add_constraints("cap", &time, |key| {
        let coeff = if *key == IndexKey::Int(2) { f64::NAN } else { 1.0 };
        (x * coeff).leq(1.0)
    });
    assert!(matches!(result, Err(ModelError::InvalidCoefficient { .. })));
    assert_eq!(problem.num_constraints(), 0);
    assert!(!problem.is_name_taken("cap"));
    assert!(!problem.is_name_taken("cap[0]"));
}

#[test]
fn test_family_sums() {
    let mut problem = Problem::new();
    let set = IndexSet::new("s", ["a", "b"]).unwrap();
    let x = problem.add_variables("x", &set, Domain::free()).unwrap();
    let total = x.sum();
    assert_eq!(total.normalized_terms().len(), 2);
    let weighted = x.weighted_sum(|key| if *key == IndexKey::from("a") { 2.0 } else { 3.0 });
    assert_eq!(
        weighted.normalized_terms(),
        vec![(x.get("a").unwrap(), 2.0), (x.get("b").unwrap(), 3.0)]
    );
}
