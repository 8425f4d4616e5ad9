//! Error codes returned by the remote service in `header.code`.

/// Describe a remote error code, or `None` for codes outside the documented table.
pub fn describe(code: i64) -> Option<&'static str> {
    let text = match code {
        0 => "Success",
        10000 => "Upgrading the connection to WebSocket failed",
        10001 => "Reading the user message from the WebSocket failed",
        10002 => "Sending a message to the user over the WebSocket failed",
        10003 => "The user message is malformed",
        10004 => "The user data does not match the schema",
        10005 => "A user parameter value is invalid",
        10006 => "Concurrent connection: the same user may only connect from one place at a time",
        10007 => "Rate limited: the service is still answering the previous question; wait for the reply to finish before sending a new one",
        10008 => "Insufficient service capacity, contact support",
        10009 => "Connecting to the engine failed",
        10010 => "Receiving data from the engine failed",
        10011 => "Sending data to the engine failed",
        10012 => "Internal engine error",
        10013 => "The input was rejected by content moderation; rephrase it and try again",
        10014 => "The output contains sensitive content and cannot be shown",
        10015 => "The app id is blacklisted",
        10016 => "App id authorization error: feature or version not enabled, tokens exhausted, or concurrency over the authorized limit",
        10017 => "Clearing the history failed",
        10019 => "The conversation tends toward prohibited content",
        10110 => "Service busy, try again later",
        10163 => "Engine request parameters are invalid: engine schema check failed",
        10222 => "Engine network error",
        10907 => "Token limit exceeded: history plus question is too long, shorten the input",
        11200 => "Authorization error: the app id is not authorized for this feature or the quota is exceeded",
        11201 => "Authorization error: daily request limit exceeded",
        11202 => "Authorization error: per-second request limit exceeded",
        11203 => "Authorization error: concurrent connection limit exceeded",
        _ => return None,
    };
    Some(text)
}

/// Human readable form of a code, falling back to the bare number.
pub fn render(code: i64) -> String {
    match describe(code) {
        Some(text) => format!("{code}: {text}"),
        None => format!("{code}: unknown error code"),
    }
}
