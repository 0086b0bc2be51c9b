//! Resolve the signed-in user's profile.
//!
//! The backend exposes a `get_my_profile` function that reads the caller's
//! row under their own token. Some deployments lack it or reject it, so
//! resolution falls back to a plain table read and finally to a profile
//! built from the auth user itself. Every fallback is logged at WARN.

use std::future::Future;

use aurelia_core::{Profile, UserId, UserRole};
use serde_json::Value;
use tracing::warn;

use crate::auth::{AccessToken, AuthUser};
use crate::client::{Auth, BackendClient};
use crate::error::BackendError;
use crate::repos::ProfileRepository;

const PROFILE_RPC: &str = "get_my_profile";

/// Where profile data can be read from.
pub trait ProfileSource {
    /// The caller's profile via the dedicated RPC.
    fn profile_via_rpc(
        &self,
        token: &AccessToken,
    ) -> impl Future<Output = Result<Option<Profile>, BackendError>> + Send;

    /// The caller's profile straight from the profiles table.
    fn profile_via_table(
        &self,
        token: &AccessToken,
        id: UserId,
    ) -> impl Future<Output = Result<Option<Profile>, BackendError>> + Send;
}

impl ProfileSource for BackendClient {
    async fn profile_via_rpc(&self, token: &AccessToken) -> Result<Option<Profile>, BackendError> {
        let value: Value = self
            .rpc(Auth::User(token), PROFILE_RPC, &serde_json::json!({}))
            .await?;
        profile_from_rpc(value)
    }

    async fn profile_via_table(
        &self,
        token: &AccessToken,
        id: UserId,
    ) -> Result<Option<Profile>, BackendError> {
        ProfileRepository::new(self).get(Auth::User(token), id).await
    }
}

/// The function may return a row, a one-row set or null.
fn profile_from_rpc(value: Value) -> Result<Option<Profile>, BackendError> {
    let row = match value {
        Value::Null => return Ok(None),
        Value::Array(rows) => match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(None),
        },
        row => row,
    };
    Ok(Some(serde_json::from_value(row)?))
}

/// Which step produced the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Rpc,
    Table,
    AuthUser,
}

/// A resolved profile and its origin.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub profile: Profile,
    pub from: ResolvedFrom,
}

/// Resolve the profile of `user`, never failing.
pub async fn resolve_profile<S: ProfileSource + Sync>(
    source: &S,
    token: &AccessToken,
    user: &AuthUser,
) -> ResolvedProfile {
    match source.profile_via_rpc(token).await {
        Ok(Some(profile)) => {
            return ResolvedProfile {
                profile,
                from: ResolvedFrom::Rpc,
            };
        }
        Ok(None) => warn!(user_id = %user.id, "profile RPC returned nothing, reading profiles table"),
        Err(e) => warn!(user_id = %user.id, error = %e, "profile RPC failed, reading profiles table"),
    }

    match source.profile_via_table(token, user.id).await {
        Ok(Some(profile)) => {
            return ResolvedProfile {
                profile,
                from: ResolvedFrom::Table,
            };
        }
        Ok(None) => warn!(user_id = %user.id, "no profile row, using auth user"),
        Err(e) => warn!(user_id = %user.id, error = %e, "profile table read failed, using auth user"),
    }

    ResolvedProfile {
        profile: profile_from_auth_user(user),
        from: ResolvedFrom::AuthUser,
    }
}

fn profile_from_auth_user(user: &AuthUser) -> Profile {
    Profile {
        id: user.id,
        email: user.email.clone().unwrap_or_default(),
        full_name: user.full_name().map(str::to_string),
        phone: None,
        role: UserRole::Customer,
        created_at: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    enum Step {
        Found(UserRole),
        Empty,
        Fails,
    }

    struct StubSource {
        rpc: Step,
        table: Step,
    }

    fn profile(id: UserId, role: UserRole) -> Profile {
        Profile {
            id,
            email: "ana@example.mx".to_string(),
            full_name: Some("Ana López".to_string()),
            phone: Some("5512345678".to_string()),
            role,
            created_at: None,
        }
    }

    fn answer(step: Step, id: UserId) -> Result<Option<Profile>, BackendError> {
        match step {
            Step::Found(role) => Ok(Some(profile(id, role))),
            Step::Empty => Ok(None),
            Step::Fails => Err(BackendError::NotFound("function get_my_profile".to_string())),
        }
    }

    impl ProfileSource for StubSource {
        async fn profile_via_rpc(
            &self,
            _token: &AccessToken,
        ) -> Result<Option<Profile>, BackendError> {
            answer(self.rpc, user().id)
        }

        async fn profile_via_table(
            &self,
            _token: &AccessToken,
            id: UserId,
        ) -> Result<Option<Profile>, BackendError> {
            answer(self.table, id)
        }
    }

    fn user() -> AuthUser {
        serde_json::from_value(serde_json::json!({
            "id": "6f1c2f0e-8a39-4c3e-9f55-1f0f8f5d2a11",
            "email": "ana@example.mx",
            "user_metadata": {"full_name": "Ana López"}
        }))
        .unwrap()
    }

    async fn resolve(rpc: Step, table: Step) -> ResolvedProfile {
        let source = StubSource { rpc, table };
        resolve_profile(&source, &AccessToken::new("jwt"), &user()).await
    }

    #[tokio::test]
    async fn test_rpc_result_wins() {
        let resolved = resolve(Step::Found(UserRole::Admin), Step::Fails).await;
        assert_eq!(resolved.from, ResolvedFrom::Rpc);
        assert_eq!(resolved.profile.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_rpc_failure_falls_back_to_table() {
        let resolved = resolve(Step::Fails, Step::Found(UserRole::Admin)).await;
        assert_eq!(resolved.from, ResolvedFrom::Table);
        assert_eq!(resolved.profile.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_empty_rpc_falls_back_to_table() {
        let resolved = resolve(Step::Empty, Step::Found(UserRole::Customer)).await;
        assert_eq!(resolved.from, ResolvedFrom::Table);
    }

    #[tokio::test]
    async fn test_everything_missing_synthesizes_customer() {
        let resolved = resolve(Step::Fails, Step::Empty).await;
        assert_eq!(resolved.from, ResolvedFrom::AuthUser);
        assert_eq!(resolved.profile.role, UserRole::Customer);
        assert_eq!(resolved.profile.email, "ana@example.mx");
        assert_eq!(resolved.profile.full_name.as_deref(), Some("Ana López"));
        assert_eq!(resolved.profile.id, user().id);
    }

    #[test]
    fn test_rpc_shapes() {
        let row = serde_json::json!({
            "id": "6f1c2f0e-8a39-4c3e-9f55-1f0f8f5d2a11",
            "email": "ana@example.mx",
            "role": "admin"
        });
        let single = profile_from_rpc(row.clone()).unwrap().unwrap();
        assert_eq!(single.role, UserRole::Admin);

        let set = profile_from_rpc(Value::Array(vec![row])).unwrap().unwrap();
        assert_eq!(set.id, single.id);

        assert!(profile_from_rpc(Value::Null).unwrap().is_none());
        assert!(profile_from_rpc(Value::Array(Vec::new())).unwrap().is_none());
        assert!(profile_from_rpc(serde_json::json!({"unexpected": true})).is_err());
    }
}
