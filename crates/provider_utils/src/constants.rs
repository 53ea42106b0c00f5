use std::time::Duration;

/// Fragments of transport errors that mean "try the next endpoint".
pub const CONNECTION_ERROR_MSGS: [&str; 4] = [
    "error trying to connect",
    "failed to lookup address information",
    "connection refused",
    "operation timed out",
];

pub const PROVIDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn is_connection_error(err: &str) -> bool {
    let err = err.to_lowercase();
    CONNECTION_ERROR_MSGS.iter().any(|msg| err.contains(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_connection_errors_case_insensitively() {
        assert!(is_connection_error(
            "Rpc(Transport(error trying to connect: tcp connect error))"
        ));
        assert!(is_connection_error("Connection Refused (os error 111)"));
        assert!(!is_connection_error("Invalid params"));
    }
}
