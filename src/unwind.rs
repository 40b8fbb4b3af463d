//! Panic interception for hooks run by the engine.
//!
//! A process-wide panic hook is installed the first time a hook runs. While a
//! thread is inside [`catch`], panics on that thread are recorded (message,
//! location, backtrace) instead of being printed; everywhere else the
//! previously installed hook runs as usual.

use crate::fault::{Fault, FaultKind, Location, TestResult};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

struct PanicRecord {
    message: String,
    location: Option<Location>,
    backtrace: Backtrace,
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let record = PanicRecord {
                message: payload_message(info.payload()),
                location: info.location().map(Location::from),
                backtrace: Backtrace::capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(record));
        }));
    });
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Runs `f`, turning a panic into a [`Panicked`](crate::Panicked) fault, or
/// into a fault of the payload's type for `panic_any` payloads.
pub(crate) fn catch<F>(f: F) -> TestResult
where
    F: FnOnce() -> TestResult,
{
    install_hook();
    LAST_PANIC.with(|slot| slot.borrow_mut().take());
    DEPTH.with(|d| d.set(d.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    DEPTH.with(|d| d.set(d.get() - 1));

    let payload = match result {
        Ok(result) => return result,
        Err(payload) => payload,
    };

    let message = payload_message(&*payload);
    // `resume_unwind` skips the hook, so a leftover record may belong to a
    // panic the hook caught itself.
    let record = LAST_PANIC
        .with(|slot| slot.borrow_mut().take())
        .filter(|r| r.message == message);
    let fault = match record {
        Some(r) => Fault::from_panic(r.message, r.location, r.backtrace),
        None => Fault::from_panic(message, None, Backtrace::disabled()),
    };
    Err(match payload_kind(&*payload) {
        Some(kind) => fault.with_kind(kind),
        None => fault,
    })
}

/// `None` for the string payloads of `panic!`.
fn payload_kind(payload: &(dyn Any + Send)) -> Option<FaultKind> {
    if payload.is::<&str>() || payload.is::<String>() {
        return None;
    }
    Some(FaultKind::of_payload((*payload).type_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Panicked;

    #[test]
    fn panics_become_faults_with_location() {
        let fault = catch(|| panic!("boom {}", 7)).unwrap_err();
        assert!(fault.is::<Panicked>());
        assert_eq!(fault.message(), "panicked: boom 7");
        assert!(fault.location().expect("location").file.ends_with("unwind.rs"));
    }

    #[test]
    fn normal_results_pass_through() {
        assert!(catch(|| Ok(())).is_ok());
    }

    #[test]
    fn nested_catches_each_see_their_own_panic() {
        let outer = catch(|| {
            let inner = catch(|| panic!("inner"));
            assert!(inner.is_err());
            panic!("outer")
        })
        .unwrap_err();
        assert_eq!(outer.message(), "panicked: outer");
        assert_eq!(DEPTH.with(Cell::get), 0);
    }

    #[test]
    fn resumed_unwinds_do_not_reuse_a_stale_record() {
        let fault = catch(|| {
            let first = panic::catch_unwind(|| panic!("first"));
            assert!(first.is_err());
            panic::resume_unwind(Box::new("second"))
        })
        .unwrap_err();
        assert_eq!(fault.message(), "panicked: second");
        assert!(fault.location().is_none());
    }

    #[derive(Debug)]
    struct Typed;

    #[test]
    fn typed_payloads_keep_their_kind() {
        let fault = catch(|| panic::panic_any(Typed)).unwrap_err();
        assert!(fault.kind().is::<Typed>());
        assert!(!fault.is::<Panicked>());
        assert!(fault.location().unwrap().file.ends_with("unwind.rs"));
    }
}
