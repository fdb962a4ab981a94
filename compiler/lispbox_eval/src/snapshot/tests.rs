use super::*;
use crate::test_helpers::{read, run, session};
use pretty_assertions::assert_eq;

fn round_trip(interp: &Interpreter) -> Interpreter {
    let bytes = interp.snapshot().to_bytes().unwrap();
    Snapshot::from_bytes(&bytes)
        .unwrap()
        .restore(Interpreter::builder())
        .unwrap()
}

#[test]
fn restored_session_evaluates_identically() {
    let mut original = session();
    run(&mut original, "(set n 'old)");
    run(&mut original, "(set f (lambda () n))");
    run(&mut original, "(set xs (cons 'a (cons n ())))");

    let mut restored = round_trip(&original);

    for src in ["(f)", "xs", "(set n 'new)", "(f)", "(cons (f) xs)"] {
        assert_eq!(run(&mut restored, src), run(&mut original, src), "{src}");
    }
}

#[test]
fn shared_frames_stay_shared() {
    let mut original = session();
    run(
        &mut original,
        "(set pair ((lambda (n) (cons (lambda () n) (cons (lambda (v) (set n v)) ()))) 'x))",
    );
    let snapshot = original.snapshot();
    // session frame plus the one argument frame both closures captured
    assert_eq!(snapshot.frames.len(), 2);

    let mut restored = snapshot.restore(Interpreter::builder()).unwrap();
    let pair = restored.env().lookup("pair").unwrap();
    let closures = pair.as_list().unwrap();
    let getter = closures[0].as_closure().unwrap();
    let setter = closures[1].as_closure().unwrap();
    assert!(LocalScope::ptr_eq(
        &getter.scopes().frames()[1],
        &setter.scopes().frames()[1]
    ));
    assert!(LocalScope::ptr_eq(
        &getter.scopes().frames()[0],
        &restored.env().scopes().frames()[0]
    ));

    run(&mut restored, "(set get (apply (lambda (g s) g) pair))");
    assert_eq!(run(&mut restored, "(get)"), Value::symbol("x"));
}

#[test]
fn closure_argument_frame_survives() {
    let mut original = session();
    run(&mut original, "(set make (lambda (n) (lambda () n)))");
    run(&mut original, "(set k (make 'captured))");

    let mut restored = round_trip(&original);
    assert_eq!(run(&mut restored, "(k)"), Value::symbol("captured"));
}

#[test]
fn builtins_resolve_against_new_globals() {
    let mut original = session();
    run(&mut original, "(set c cons)");
    let snapshot = original.snapshot();

    let restored = snapshot.restore(Interpreter::builder()).unwrap();
    let c = restored.env().lookup("c").unwrap();
    let cons = restored.env().global().borrow().get("cons").unwrap();
    assert!(c.ptr_eq(&cons));
}

#[test]
fn unknown_builtin_is_an_error() {
    let mut original = session();
    run(&mut original, "(set c cons)");
    let err = original
        .snapshot()
        .restore(Interpreter::builder().without_core_builtins())
        .unwrap_err();
    assert!(matches!(err, SnapshotError::UnknownBuiltin(ref name) if name == "cons"));
    assert_eq!(err.to_string(), "snapshot refers to unknown builtin 'cons'");
}

#[test]
fn missing_frame_is_an_error() {
    let snapshot = Snapshot {
        limits: Limits::default(),
        values: Vec::new(),
        frames: Vec::new(),
        scopes: vec![3],
    };
    let err = snapshot.restore(Interpreter::builder()).unwrap_err();
    assert!(matches!(err, SnapshotError::MissingFrame(3)));
}

#[test]
fn restore_registers_values() {
    let mut original = session();
    run(&mut original, "(set xs '(a b c))");
    let restored = round_trip(&original);
    // the list and its three symbols
    assert_eq!(restored.env().tracked_count(), 4);
}

#[test]
fn restore_enforces_recorded_quota() {
    let mut original = session();
    run(&mut original, "(set xs '(a b c))");
    let mut snapshot = original.snapshot();
    snapshot.limits.max_things = 2;
    let err = snapshot.restore(Interpreter::builder()).unwrap_err();
    assert!(matches!(err, SnapshotError::Limit(_)));
}

#[test]
fn recorded_limits_apply() {
    let original = Interpreter::builder().max_depth(7).max_steps(70).build();
    let restored = original
        .snapshot()
        .restore(Interpreter::builder())
        .unwrap();
    assert_eq!(restored.limits(), original.limits());
}

#[test]
fn self_capturing_closure_terminates() {
    let mut original = session();
    run(&mut original, "(set loop (lambda () (loop)))");
    let snapshot = original.snapshot();
    assert_eq!(snapshot.frames.len(), 1);
    let id = snapshot.frames[0].bindings[0].1;
    let ValueData::Closure { scopes, .. } = &snapshot.values[id] else {
        panic!("expected a closure binding");
    };
    assert_eq!(scopes, &vec![0]);
}

#[test]
fn aliased_values_are_stored_once() {
    let mut original = session();
    run(&mut original, "(set xs '(a b c d e f g h i j))");
    run(&mut original, "(set y xs)");
    run(&mut original, "(set z xs)");
    let snapshot = original.snapshot();

    let ids: Vec<usize> = snapshot.frames[0].bindings.iter().map(|(_, id)| *id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|id| *id == ids[0]));
    // the list and its ten symbols
    assert_eq!(snapshot.values.len(), 11);
}

#[test]
fn aliased_values_fit_the_same_quota() {
    let mut original = Interpreter::builder().max_things(30).build();
    run(&mut original, "(set xs '(a b c d e f g h i j))");
    run(&mut original, "(set y xs)");
    run(&mut original, "(set z xs)");
    let before = original.env().tracked_count();

    let mut restored = round_trip(&original);
    assert_eq!(restored.env().tracked_count(), before);

    let y = restored.env().lookup("y").unwrap();
    let z = restored.env().lookup("z").unwrap();
    assert!(y.ptr_eq(&z));
    assert_eq!(run(&mut restored, "(cons 'k y)"), read("(k a b c d e f g h i j)"));
}

#[test]
fn shared_closure_stays_one_closure() {
    let mut original = session();
    run(&mut original, "(set f (lambda (x) x))");
    run(&mut original, "(set g f)");
    let restored = round_trip(&original);
    let f = restored.env().lookup("f").unwrap();
    let g = restored.env().lookup("g").unwrap();
    assert!(f.ptr_eq(&g));
}

#[test]
fn missing_value_is_an_error() {
    let snapshot = Snapshot {
        limits: Limits::default(),
        values: vec![ValueData::List(vec![0])],
        frames: vec![FrameData::default()],
        scopes: vec![0],
    };
    // an entry may only refer to earlier entries
    let err = snapshot.restore(Interpreter::builder()).unwrap_err();
    assert!(matches!(err, SnapshotError::MissingValue(0)));
    assert_eq!(err.to_string(), "snapshot refers to missing value 0");
}

#[test]
fn dropping_restored_session_frees_its_frames() {
    let mut original = session();
    run(&mut original, "(set loop (lambda () (loop)))");
    let restored = round_trip(&original);
    let weak = restored.env().lookup("loop").unwrap().downgrade();
    assert!(weak.is_alive());

    drop(restored);
    assert!(!weak.is_alive());
}

#[test]
fn bytes_round_trip() {
    let mut original = session();
    run(&mut original, "(set f (lambda (x) (cons x ())))");
    let snapshot = original.snapshot();
    let decoded = Snapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, snapshot);
}

#[test]
fn garbage_bytes_are_a_codec_error() {
    let err = Snapshot::from_bytes(&[0xff, 0xff, 0xff]).unwrap_err();
    assert!(matches!(err, SnapshotError::Codec(_)));
}

#[test]
fn read_and_restore_use_the_same_tree_shape() {
    let mut original = session();
    run(&mut original, "(set code '(cons 'a ()))");
    let mut restored = round_trip(&original);
    assert_eq!(run(&mut restored, "code"), read("(cons 'a ())"));
    assert_eq!(run(&mut restored, "(eval code)"), read("(a)"));
}
