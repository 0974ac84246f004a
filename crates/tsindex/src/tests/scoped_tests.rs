use crate::Scoped;
use std::cell::{Cell, RefCell};

#[test]
fn release_runs_on_drop() {
    let released = Cell::new(0);
    {
        let guard = Scoped::new(5u32, |v| released.set(v));
        assert_eq!(*guard, 5);
    }
    assert_eq!(released.get(), 5);
}

#[test]
fn dismiss_skips_release() {
    let released = Cell::new(false);
    let guard = Scoped::new(String::from("keep"), |_| released.set(true));
    let value = guard.dismiss();
    assert_eq!(value, "keep");
    assert!(!released.get());
}

#[test]
fn release_runs_on_early_return() {
    let log = RefCell::new(Vec::new());

    let run = |fail: bool| -> Result<(), ()> {
        let _guard = Scoped::new("tmp", |name| log.borrow_mut().push(name));
        if fail {
            return Err(());
        }
        Ok(())
    };

    assert!(run(true).is_err());
    assert!(run(false).is_ok());
    assert_eq!(*log.borrow(), vec!["tmp", "tmp"]);
}

#[test]
fn get_mut_updates_value_seen_by_release() {
    let seen = Cell::new(0);
    {
        let mut guard = Scoped::new(1, |v| seen.set(v));
        *guard.get_mut() += 41;
    }
    assert_eq!(seen.get(), 42);
}
