use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use stager_registry::Credentials;

use crate::config::CredentialsConfig;

pub const USERNAME_ENV: &str = "STAGER_REPOSITORY_USERNAME";
pub const PASSWORD_ENV: &str = "STAGER_REPOSITORY_PASSWORD";

/// Resolve a secret reference.
///
/// - `env:NAME` reads the environment variable `NAME`
/// - `file:/path` reads the file and trims trailing whitespace
/// - anything else is taken literally
pub fn resolve_secret(reference: &str) -> Result<String> {
    if let Some(name) = reference.strip_prefix("env:") {
        let value = env::var(name)
            .with_context(|| format!("environment variable {name} is not set"))?;
        return Ok(value.trim().to_string());
    }

    if let Some(path) = reference.strip_prefix("file:") {
        let path = Path::new(path);
        let value = fs::read_to_string(path)
            .with_context(|| format!("failed to read secret file {}", path.display()))?;
        return Ok(value.trim_end().to_string());
    }

    Ok(reference.to_string())
}

/// Repository credentials from the `[credentials]` section, or from
/// `STAGER_REPOSITORY_USERNAME` / `STAGER_REPOSITORY_PASSWORD` when the
/// section is absent.
///
/// Returns `Ok(None)` if nothing is configured.
pub fn resolve_credentials(config: Option<&CredentialsConfig>) -> Result<Option<Credentials>> {
    if let Some(config) = config {
        let username = resolve_secret(&config.username).context("failed to resolve username")?;
        let password = resolve_secret(&config.password).context("failed to resolve password")?;
        if username.is_empty() {
            bail!("[credentials] username resolved to an empty value");
        }
        return Ok(Some(Credentials::new(username, password)));
    }

    Ok(credentials_from_env())
}

fn credentials_from_env() -> Option<Credentials> {
    let username = non_empty_env(USERNAME_ENV)?;
    let password = non_empty_env(PASSWORD_ENV).unwrap_or_default();
    Some(Credentials::new(username, password))
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn literal_secret_is_returned_as_is() {
        assert_eq!(resolve_secret("hunter2").expect("resolve"), "hunter2");
    }

    #[test]
    #[serial]
    fn env_secret_is_read_and_trimmed() {
        temp_env::with_var("STAGER_TEST_SECRET", Some("  s3cret \n"), || {
            assert_eq!(resolve_secret("env:STAGER_TEST_SECRET").expect("resolve"), "s3cret");
        });
    }

    #[test]
    #[serial]
    fn missing_env_secret_fails() {
        temp_env::with_var("STAGER_TEST_SECRET", None::<String>, || {
            let err = resolve_secret("env:STAGER_TEST_SECRET").expect_err("must fail");
            assert!(err.to_string().contains("STAGER_TEST_SECRET"));
        });
    }

    #[test]
    fn file_secret_is_read() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("password");
        std::fs::write(&path, "from-file\n").expect("write");
        let reference = format!("file:{}", path.display());
        assert_eq!(resolve_secret(&reference).expect("resolve"), "from-file");
    }

    #[test]
    fn missing_file_secret_fails() {
        let td = tempdir().expect("tempdir");
        let reference = format!("file:{}", td.path().join("absent").display());
        assert!(resolve_secret(&reference).is_err());
    }

    #[test]
    #[serial]
    fn config_section_wins_over_env() {
        temp_env::with_vars(
            [
                (USERNAME_ENV, Some("env-user")),
                (PASSWORD_ENV, Some("env-pass")),
            ],
            || {
                let config = CredentialsConfig {
                    username: "cfg-user".to_string(),
                    password: "cfg-pass".to_string(),
                };
                let creds = resolve_credentials(Some(&config))
                    .expect("resolve")
                    .expect("credentials");
                assert_eq!(creds, Credentials::new("cfg-user", "cfg-pass"));
            },
        );
    }

    #[test]
    #[serial]
    fn env_fallback_when_section_absent() {
        temp_env::with_vars(
            [
                (USERNAME_ENV, Some("env-user")),
                (PASSWORD_ENV, Some("env-pass")),
            ],
            || {
                let creds = resolve_credentials(None).expect("resolve").expect("credentials");
                assert_eq!(creds, Credentials::new("env-user", "env-pass"));
            },
        );
    }

    #[test]
    #[serial]
    fn nothing_configured_is_none() {
        temp_env::with_vars(
            [(USERNAME_ENV, None::<String>), (PASSWORD_ENV, None::<String>)],
            || {
                assert_eq!(resolve_credentials(None).expect("resolve"), None);
            },
        );
    }

    #[test]
    fn empty_username_is_rejected() {
        let config = CredentialsConfig {
            username: String::new(),
            password: "p".to_string(),
        };
        assert!(resolve_credentials(Some(&config)).is_err());
    }
}
