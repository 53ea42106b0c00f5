use std::{fmt::Debug, str::FromStr};

pub fn get_env(key: &str, default_value: Option<String>) -> String {
    match default_value {
        Some(value) => std::env::var(key).unwrap_or(value),
        None => std::env::var(key).unwrap_or_else(|_| panic!("expect env {}", key)),
    }
}

/// Unset and blank values are both `None`.
pub fn get_env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn get_env_parsed<T>(key: &str, default_value: Option<T>) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match (get_env_opt(key), default_value) {
        (Some(value), _) => value
            .parse()
            .unwrap_or_else(|err| panic!("env {} invalid: {:?} ({:?})", key, value, err)),
        (None, Some(default_value)) => default_value,
        (None, None) => panic!("expect env {}", key),
    }
}
