//! Value-capturing assertions.
//!
//! `check!` and `check_eq!` return early with an [`AssertionFailed`] fault
//! instead of panicking. The identifiers listed after the condition are
//! recorded with their `Debug` values so the failure report can show the
//! failing line with those values substituted in.
//!
//! ```
//! use swallow::{check, check_eq, TestResult};
//!
//! fn answer() -> TestResult {
//!     let expected = 42;
//!     let actual = 6 * 7;
//!     check!(actual == expected, actual, expected);
//!     check_eq!(actual, expected);
//!     Ok(())
//! }
//! # assert!(answer().is_ok());
//! ```
//!
//! [`AssertionFailed`]: crate::AssertionFailed

/// Returns an `AssertionFailed` fault when the condition is false.
#[macro_export]
macro_rules! check {
    ($cond:expr $(, $name:ident)* $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err(
                $crate::Fault::assertion(
                    ::std::format!("check failed: {}", ::core::stringify!($cond)),
                    ::std::vec![$($crate::Binding::capture(::core::stringify!($name), &$name)),*],
                )
                .into(),
            );
        }
    };
}

/// Returns an `AssertionFailed` fault when `left != right`.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(, $name:ident)* $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return ::core::result::Result::Err(
                        $crate::Fault::assertion(
                            ::std::format!(
                                "assertion `left == right` failed\n  left: {:?}\n right: {:?}",
                                left, right
                            ),
                            ::std::vec![$($crate::Binding::capture(::core::stringify!($name), &$name)),*],
                        )
                        .into(),
                    );
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{AssertionFailed, TestResult};

    fn compare(a: i32, b: i32) -> TestResult {
        check!(a == b, a, b);
        Ok(())
    }

    fn compare_eq(a: &str, b: &str) -> TestResult {
        check_eq!(a, b, a);
        Ok(())
    }

    #[test]
    fn passing_checks_fall_through() {
        assert!(compare(3, 3).is_ok());
        assert!(compare_eq("x", "x").is_ok());
    }

    #[test]
    fn failing_check_captures_listed_values() {
        let fault = compare(1, 2).unwrap_err();
        assert!(fault.is::<AssertionFailed>());
        assert_eq!(fault.message(), "check failed: a == b");
        let names: Vec<_> = fault.bindings().iter().map(|b| (b.name.as_str(), b.value.as_str())).collect();
        assert_eq!(names, [("a", "1"), ("b", "2")]);
        assert!(fault.location().unwrap().file.ends_with("check.rs"));
    }

    #[test]
    fn failing_check_eq_reports_both_sides() {
        let fault = compare_eq("x", "y").unwrap_err();
        assert!(fault.message().contains("left: \"x\""));
        assert!(fault.message().contains("right: \"y\""));
        assert_eq!(fault.bindings()[0].value, "\"x\"");
    }
}
