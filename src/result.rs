//! Uniform pass/fail envelope returned by every facade operation.

/// Error code carried by failures that were not given an explicit one.
pub const UNSPECIFIED_ERROR_CODE: i32 = -1;

/// Outcome of one backend round trip.
///
/// `T` defaults to `()` for operations that only report pass/fail. A success
/// normally carries a payload; it is absent when a benign fault or an empty
/// location was reported as success.
#[derive(Clone, Debug, PartialEq)]
pub struct FirebaseResult<T = ()> {
    completed_successfully: bool,
    error_code: i32,
    value: Option<T>,
}

impl<T> FirebaseResult<T> {
    /// Pass/fail without payload. `new(false)` is a failure with the default code.
    pub fn new(completed_successfully: bool) -> Self {
        Self {
            completed_successfully,
            error_code: UNSPECIFIED_ERROR_CODE,
            value: None,
        }
    }

    pub fn failure() -> Self {
        Self::new(false)
    }

    /// Failure with an explicit error code.
    pub fn with_error_code(error_code: i32) -> Self {
        Self {
            completed_successfully: false,
            error_code,
            value: None,
        }
    }

    pub fn success(value: T) -> Self {
        Self {
            completed_successfully: true,
            error_code: UNSPECIFIED_ERROR_CODE,
            value: Some(value),
        }
    }

    /// Attaches `value` whatever the flag says.
    pub fn with_value(completed_successfully: bool, value: T) -> Self {
        Self {
            completed_successfully,
            error_code: UNSPECIFIED_ERROR_CODE,
            value: Some(value),
        }
    }

    pub fn completed_successfully(&self) -> bool {
        self.completed_successfully
    }

    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn map<U, F>(self, f: F) -> FirebaseResult<U>
    where
        F: FnOnce(T) -> U,
    {
        FirebaseResult {
            completed_successfully: self.completed_successfully,
            error_code: self.error_code,
            value: self.value.map(f),
        }
    }

    /// Converts into a std `Result`, yielding the error code on failure.
    pub fn into_result(self) -> Result<Option<T>, i32> {
        if self.completed_successfully {
            Ok(self.value)
        } else {
            Err(self.error_code)
        }
    }
}

impl<T> From<FirebaseResult<T>> for Result<Option<T>, i32> {
    fn from(result: FirebaseResult<T>) -> Self {
        result.into_result()
    }
}
