//! Password hashing using bcrypt
//!
//! Hashes are salted and use bcrypt's default work factor. bcrypt is
//! CPU-intensive, so async callers go through `hash_async`/`verify_or_decoy_async`
//! which run on the blocking thread pool.

use anyhow::{Context, Result};
use bcrypt::DEFAULT_COST;
use bookshelf_shared::validation::MAX_PASSWORD_BYTES;

/// Stateless bcrypt hasher
pub struct PasswordService;

impl PasswordService {
    /// Salted bcrypt digest of `password`. Blocks the calling thread.
    ///
    /// Passwords longer than bcrypt's 72-byte input are refused rather than
    /// truncated.
    pub fn hash(password: &str) -> Result<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            anyhow::bail!("password exceeds {} bytes", MAX_PASSWORD_BYTES);
        }
        bcrypt::hash(password, DEFAULT_COST).context("bcrypt hashing failed")
    }

    pub async fn hash_async(password: String) -> Result<String> {
        on_blocking_pool(move || Self::hash(&password)).await
    }

    /// Check `password` against a stored digest. Blocks the calling thread.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable digest is an error.
    /// An over-long password can never have been hashed, so it never matches.
    pub fn verify(password: &str, digest: &str) -> Result<bool> {
        let matched =
            bcrypt::verify(password, digest).context("stored password digest is unreadable")?;
        Ok(matched && password.len() <= MAX_PASSWORD_BYTES)
    }

    /// Like [`verify`](Self::verify), but with no stored digest it still
    /// spends one bcrypt round at the default cost and returns `false`.
    pub fn verify_or_decoy(password: &str, digest: Option<&str>) -> Result<bool> {
        match digest {
            Some(digest) => Self::verify(password, digest),
            None => {
                let _ = bcrypt::hash(password, DEFAULT_COST);
                Ok(false)
            }
        }
    }

    pub async fn verify_or_decoy_async(password: String, digest: Option<String>) -> Result<bool> {
        on_blocking_pool(move || Self::verify_or_decoy(&password, digest.as_deref())).await
    }
}

async fn on_blocking_pool<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("password hashing task was cancelled")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Instant;

    // Keeps the property tests fast; production always uses DEFAULT_COST.
    fn cheap_hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn test_verify_matches_only_the_hashed_password() {
        let digest = PasswordService::hash("password1").unwrap();

        assert!(PasswordService::verify("password1", &digest).unwrap());
        assert!(!PasswordService::verify("wrongpass", &digest).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let password = "password1";
        let hash = PasswordService::hash(password).unwrap();

        assert!(!hash.contains(password));
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = PasswordService::hash("hunter22").unwrap();
        let second = PasswordService::hash("hunter22").unwrap();

        assert_ne!(first, second);
        for digest in [&first, &second] {
            assert!(PasswordService::verify("hunter22", digest).unwrap());
        }
    }

    #[test]
    fn test_hash_refuses_password_longer_than_72_bytes() {
        let long = format!("{}correct-suffix", "a".repeat(72));
        assert!(PasswordService::hash(&long).is_err());
        assert!(PasswordService::hash(&"a".repeat(72)).is_ok());
    }

    #[test]
    fn test_verify_rejects_password_sharing_first_72_bytes() {
        let prefix = "a".repeat(72);
        let digest = cheap_hash(&prefix);

        assert!(PasswordService::verify(&prefix, &digest).unwrap());
        let longer = format!("{}WRONG", prefix);
        assert!(!PasswordService::verify(&longer, &digest).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(PasswordService::verify("password1", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test]
    async fn test_blocking_pool_variants_agree() {
        let digest = PasswordService::hash_async("password1".to_string()).await.unwrap();

        let ok = PasswordService::verify_or_decoy_async("password1".into(), Some(digest.clone()));
        let bad = PasswordService::verify_or_decoy_async("password2".into(), Some(digest));
        let absent = PasswordService::verify_or_decoy_async("password1".into(), None);
        assert!(ok.await.unwrap());
        assert!(!bad.await.unwrap());
        assert!(!absent.await.unwrap());
    }

    #[test]
    fn test_decoy_never_matches() {
        assert!(!PasswordService::verify_or_decoy("password1", None).unwrap());
    }

    #[test]
    fn test_decoy_costs_as_much_as_a_real_verify() {
        let digest = PasswordService::hash("password1").unwrap();

        let started = Instant::now();
        PasswordService::verify_or_decoy("password1", Some(&digest)).unwrap();
        let real = started.elapsed();

        let started = Instant::now();
        PasswordService::verify_or_decoy("password1", None).unwrap();
        let decoy = started.elapsed();

        assert!(decoy * 2 >= real, "decoy {:?} vs real {:?}", decoy, real);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_verify_accepts_original(password in "[ -~]{1,72}") {
            let hash = cheap_hash(&password);
            prop_assert!(PasswordService::verify(&password, &hash).unwrap());
        }

        #[test]
        fn prop_verify_rejects_other(password in "[ -~]{1,72}", other in "[ -~]{1,100}") {
            prop_assume!(password != other);
            let hash = cheap_hash(&password);
            prop_assert!(!PasswordService::verify(&other, &hash).unwrap());
        }
    }
}
