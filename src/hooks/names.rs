// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Well-known hook names fired by the toolkit
//!
//! These strings are part of the external contract: subscribers written
//! against the original toolkit register against the same names. Every
//! request-lifecycle hook also fires a scoped variant `<name>_<hooksID>`
//! when the request instance carries a hooks ID.

/// Another `send()` on the same instance is already in flight
pub const AJAX_REQUEST_IS_BUSY: &str = "ajaxRequestIsBusy";
/// Connectivity was lost and the request is waiting for it to return
pub const AJAX_REQUEST_IS_INTERRUPTED: &str = "ajaxRequestIsInterrupted";
/// Connectivity returned after an interruption
pub const AJAX_REQUEST_RESUMED: &str = "ajaxRequestResumed";
/// The request failed because the runtime is offline
pub const AJAX_REQUEST_FAILED_ON_OFFLINE: &str = "ajaxRequestFailedOnOffline";
/// The request completed with a 2xx status
pub const AJAX_REQUEST_SUCCEEDED: &str = "ajaxRequestSucceeded";
/// The request failed with a transport or server error
pub const AJAX_REQUEST_FAILED_ON_ERROR: &str = "ajaxRequestFailedOnError";
/// The request exceeded its timeout
pub const AJAX_REQUEST_FAILED_ON_TIMEOUT: &str = "ajaxRequestFailedOnTimeout";
/// The server rejected the request model (HTTP 400/422)
pub const AJAX_REQUEST_FAILED_ON_INVALID_MODEL: &str = "ajaxRequestFailedOnInvalidModel";
/// Fires unconditionally after success or failure, once the busy state clears
pub const AJAX_REQUEST_COMPLETED: &str = "ajaxRequestCompleted";

/// A form passed validation and its data map was built
pub const FORM_SUBMITTED: &str = "formSubmitted";

/// Build the instance-scoped variant of a hook name
pub fn scoped(name: &str, hooks_id: &str) -> String {
    format!("{}_{}", name, hooks_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_name() {
        assert_eq!(
            scoped(AJAX_REQUEST_SUCCEEDED, "login"),
            "ajaxRequestSucceeded_login"
        );
    }
}
