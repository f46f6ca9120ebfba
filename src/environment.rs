//! Read-only view of process environment variables.
//!
//! Every environment lookup in this crate goes through [`Environment`] rather than calling
//! `std::env::var` directly, mirroring the indirection the teacher's `ConfigLoader` provides
//! over `std::env`.

/// Names of the environment variables this crate reads. See spec §6 for their purpose.
pub mod vars {
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
    pub const AWS_PROFILE: &str = "AWS_PROFILE";
    pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
    pub const AWS_CONTAINER_CREDENTIALS_RELATIVE_URI: &str =
        "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
}

/// Read-only environment variable lookup, performed fresh on every call (no caching), per
/// spec §4.B.
#[derive(Debug, Default, Clone, Copy)]
pub struct Environment;

impl Environment {
    /// Create a new environment reader.
    pub fn new() -> Self {
        Environment
    }

    /// Look up `name`, returning `None` if it is unset or not valid UTF-8.
    pub fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_none_for_unset_var() {
        let _ = env_logger::builder().is_test(true).try_init();

        temp_env::with_var_unset("AWS_CREDENTIAL_CORE_TEST_VAR_NOT_SET", || {
            let env = Environment::new();
            assert_eq!(env.lookup("AWS_CREDENTIAL_CORE_TEST_VAR_NOT_SET"), None);
        });
    }

    #[test]
    fn lookup_returns_value_for_set_var() {
        let _ = env_logger::builder().is_test(true).try_init();

        temp_env::with_var(
            "AWS_CREDENTIAL_CORE_TEST_VAR_SET",
            Some("value"),
            || {
                let env = Environment::new();
                assert_eq!(
                    env.lookup("AWS_CREDENTIAL_CORE_TEST_VAR_SET"),
                    Some("value".to_string())
                );
            },
        );
    }
}
