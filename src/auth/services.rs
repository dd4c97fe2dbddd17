use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{password, repo_types::User},
    error::AppError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Hashes the password and inserts the user. A taken email surfaces from the store
/// as a uniqueness conflict and becomes [`AppError::DuplicateEmail`].
pub async fn register(state: &AppState, email: String, plain: String) -> Result<User, AppError> {
    if !is_valid_email(&email) {
        return Err(AppError::MalformedInput("Invalid email".into()));
    }
    if plain.is_empty() {
        return Err(AppError::MalformedInput("Password must not be empty".into()));
    }

    let hash = password::hash_password_blocking(plain).await?;
    let user = state.users.insert(&email, &hash).await.map_err(|e| {
        warn!(error = %e, "user insert rejected");
        AppError::from(e)
    })?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Checks credentials and issues an access token.
///
/// Unknown email and wrong password both end in [`AppError::InvalidCredentials`], and
/// both run one Argon2 verification (against the decoy hash when there is no user).
pub async fn login(state: &AppState, email: String, plain: String) -> Result<String, AppError> {
    let user = state.users.find_by_email(&email).await?;

    let hash = match &user {
        Some(u) => u.password_hash.clone(),
        None => state.decoy_hash.to_string(),
    };
    let matched = password::verify_password_blocking(plain, hash).await?;

    let user = match user {
        Some(u) if matched => u,
        Some(u) => {
            warn!(user_id = %u.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.keys.issue_access(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("User.Name+tag@sub.example.org"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_returns_record_with_hash_not_plaintext() {
        let state = AppState::fake();
        let user = register(&state, "a@example.com".into(), "pw123".into())
            .await
            .unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_ne!(user.password_hash, "pw123");
        assert!(password::verify_password("pw123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_malformed_input() {
        let state = AppState::fake();
        let bad_email = register(&state, "nope".into(), "pw123".into()).await;
        assert!(matches!(bad_email, Err(AppError::MalformedInput(_))));
        let empty_pw = register(&state, "a@example.com".into(), String::new()).await;
        assert!(matches!(empty_pw, Err(AppError::MalformedInput(_))));
    }

    #[tokio::test]
    async fn second_registration_is_duplicate() {
        let state = AppState::fake();
        register(&state, "dup@example.com".into(), "pw123".into())
            .await
            .unwrap();
        let err = register(&state, "dup@example.com".into(), "other".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_registrations_admit_exactly_one() {
        let state = AppState::fake();
        let (a, b) = tokio::join!(
            register(&state, "race@example.com".into(), "pw-a".into()),
            register(&state, "race@example.com".into(), "pw-b".into()),
        );
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::DuplicateEmail))));
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let state = AppState::fake();
        let user = register(&state, "a@example.com".into(), "pw123".into())
            .await
            .unwrap();
        let token = login(&state, "a@example.com".into(), "pw123".into())
            .await
            .unwrap();
        assert_eq!(state.keys.verify(&token), Ok(user.id));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let state = AppState::fake();
        register(&state, "a@example.com".into(), "pw123".into())
            .await
            .unwrap();

        let wrong_pw = login(&state, "a@example.com".into(), "wrongpw".into())
            .await
            .unwrap_err();
        let unknown = login(&state, "ghost@example.com".into(), "pw123".into())
            .await
            .unwrap_err();

        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());
        assert_eq!(wrong_pw.status(), unknown.status());
    }

    #[tokio::test]
    async fn unknown_email_is_verified_against_the_decoy_hash() {
        let mut state = AppState::fake();
        // Verifying against an empty hash errors, so only a real decoy check can fail this way.
        state.decoy_hash = "".into();
        let err = login(&state, "ghost@example.com".into(), "pw123".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let mut state = AppState::fake();
        let known = password::hash_password("decoy-pw").unwrap();
        state.decoy_hash = known.into();
        let err = login(&state, "ghost@example.com".into(), "decoy-pw".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_email_match_is_exact() {
        let state = AppState::fake();
        register(&state, "a@example.com".into(), "pw123".into())
            .await
            .unwrap();
        let err = login(&state, "A@example.com".into(), "pw123".into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
