//! Integration tests: z-order and lock properties of the scene store.
//!
//! Random operation sequences are replayed against the store and against a
//! plain `Vec` model of the expected bottom-to-top order.

use proptest::prelude::*;
use std::collections::HashSet;
use tk_core::*;

#[derive(Debug, Clone)]
enum Op {
    Add,
    Duplicate(usize),
    Up(usize),
    Down(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Add),
        1 => (0usize..16).prop_map(Op::Duplicate),
        2 => (0usize..16).prop_map(Op::Up),
        2 => (0usize..16).prop_map(Op::Down),
        1 => (0usize..16).prop_map(Op::Remove),
    ]
}

fn ellipse() -> NewElement {
    NewElement::new(ElementKind::Ellipse(EllipseShape {
        radius_x: 60.0,
        radius_y: 40.0,
        fill: Color::BLACK,
    }))
}

fn order(store: &SceneStore) -> Vec<ElementId> {
    store.iterate().map(Element::id).collect()
}

fn check_order_matches_model(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut store = SceneStore::new(&EditorConfig::default());
    let mut model: Vec<ElementId> = Vec::new();

    for op in ops {
        match op {
            Op::Add => model.push(store.add(ellipse())),
            Op::Duplicate(i) if !model.is_empty() => {
                let id = model[i % model.len()];
                model.push(store.duplicate(id, 20.0).map_err(|e| {
                    TestCaseError::fail(format!("duplicate failed: {e}"))
                })?);
            }
            Op::Up(i) if !model.is_empty() => {
                let idx = i % model.len();
                let result = store.move_up(model[idx]);
                if idx + 1 < model.len() {
                    prop_assert_eq!(result, Ok(idx + 1));
                    model.swap(idx, idx + 1);
                } else {
                    prop_assert_eq!(
                        result,
                        Err(EditError::AtBoundary(model[idx], ReorderDirection::Up))
                    );
                }
            }
            Op::Down(i) if !model.is_empty() => {
                let idx = i % model.len();
                let result = store.move_down(model[idx]);
                if idx > 0 {
                    prop_assert_eq!(result, Ok(idx - 1));
                    model.swap(idx, idx - 1);
                } else {
                    prop_assert!(result.is_err());
                }
            }
            Op::Remove(i) if !model.is_empty() => {
                let id = model.remove(i % model.len());
                prop_assert!(store.remove(id)?.is_some());
            }
            _ => {}
        }
        prop_assert_eq!(order(&store), model.clone());
    }

    let unique: HashSet<_> = model.iter().copied().collect();
    prop_assert_eq!(unique.len(), model.len());
    Ok(())
}

fn check_locked_element_is_frozen(
    count: usize,
    target: usize,
    dx: f32,
) -> Result<(), TestCaseError> {
    let limits = Limits::default();
    let mut store = SceneStore::new(&EditorConfig::default());
    let ids: Vec<_> = (0..count).map(|_| store.add(ellipse())).collect();
    let id = ids[target % count];
    store.set_locked(id, true)?;

    let before = store.get(id).cloned();
    let order_before = order(&store);

    prop_assert_eq!(store.remove(id), Err(EditError::Locked(id)));
    prop_assert_eq!(store.duplicate(id, 20.0), Err(EditError::Locked(id)));
    prop_assert_eq!(store.move_up(id), Err(EditError::Locked(id)));
    prop_assert_eq!(store.move_down(id), Err(EditError::Locked(id)));
    prop_assert_eq!(store.translate(id, dx, dx), Err(EditError::Locked(id)));
    prop_assert_eq!(
        store.apply_attribute(id, &Attribute::RadiusX(dx.abs()), &limits),
        Err(EditError::Locked(id))
    );
    prop_assert_eq!(store.get(id).cloned(), before);
    prop_assert_eq!(order(&store), order_before);

    store.set_locked(id, false)?;
    prop_assert!(store.translate(id, dx, dx).is_ok());
    Ok(())
}

proptest! {
    #[test]
    fn order_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        check_order_matches_model(ops)?;
    }

    #[test]
    fn locked_element_is_frozen(count in 1usize..6, target in 0usize..6, dx in -50.0f32..50.0) {
        check_locked_element_is_frozen(count, target, dx)?;
    }
}
