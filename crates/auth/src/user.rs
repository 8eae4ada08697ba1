//! User account record and its rules.
//!
//! Registration, profile edits, password changes and password recovery are
//! validated here. Lifecycle flag flips are not: those belong to the
//! lifecycle manager so that they cascade to the user's store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    limits, validate, DomainError, DomainResult, Entity, HasLifecycle, LifecycleFlags, UserId,
};

use crate::password::{hash_password, verify_password};
use crate::Role;

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Lowercased, trimmed login name.
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub email: String,
    /// argon2 PHC string. Never exposed by the HTTP layer.
    pub password_hash: String,
    pub role: Role,
    pub image_url: Option<String>,
    pub recover_token: Option<String>,
    pub recover_token_exp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub lifecycle: LifecycleFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Profile edit request; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfile {
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn validate_password(password: &str) -> DomainResult<()> {
    validate::length(
        "password",
        password,
        limits::PASSWORD_MIN_LEN,
        limits::PASSWORD_MAX_LEN,
    )
}

fn hash(password: &str) -> DomainResult<String> {
    hash_password(password).map_err(|e| DomainError::invariant(e.to_string()))
}

impl User {
    /// Validate a registration and build a client account.
    ///
    /// Uniqueness of username/email is checked by the caller against storage.
    pub fn register(cmd: RegisterUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let username = validate::trimmed("username", &cmd.username)?.to_lowercase();
        validate::username(&username)?;

        let fname = validate::trimmed("fname", &cmd.fname)?;
        validate::person_name("fname", &fname)?;
        let lname = validate::trimmed("lname", &cmd.lname)?;
        validate::person_name("lname", &lname)?;

        let email = validate::trimmed("email", &cmd.email)?.to_lowercase();
        validate::email(&email)?;

        let password = cmd.password.trim();
        validate_password(password)?;

        let image_url = validate::optional(cmd.image_url.as_deref());
        if let Some(url) = &image_url {
            validate::http_url("image_url", url)?;
        }

        Ok(Self {
            id: UserId::new(),
            username,
            fname,
            lname,
            email,
            password_hash: hash(password)?,
            role: Role::Client,
            image_url,
            recover_token: None,
            recover_token_exp: None,
            lifecycle: LifecycleFlags::live(),
            created_at: now,
            updated_at: None,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.fname, self.lname)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn check_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash)
    }

    /// Apply a profile edit in place.
    pub fn apply_profile(&mut self, update: UpdateProfile, now: DateTime<Utc>) -> DomainResult<()> {
        let fname = validate::optional(update.fname.as_deref());
        let lname = validate::optional(update.lname.as_deref());
        let email = validate::optional(update.email.as_deref()).map(|e| e.to_lowercase());
        let image_url = validate::optional(update.image_url.as_deref());

        if fname.is_none() && lname.is_none() && email.is_none() && image_url.is_none() {
            return Err(DomainError::validation("no profile fields to update"));
        }

        if let Some(v) = &fname {
            validate::person_name("fname", v)?;
        }
        if let Some(v) = &lname {
            validate::person_name("lname", v)?;
        }
        if let Some(v) = &email {
            validate::email(v)?;
        }
        if let Some(v) = &image_url {
            validate::http_url("image_url", v)?;
        }

        if let Some(v) = fname {
            self.fname = v;
        }
        if let Some(v) = lname {
            self.lname = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = image_url {
            self.image_url = Some(v);
        }
        self.updated_at = Some(now);
        Ok(())
    }

    pub fn change_password(&mut self, password: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let password = password.trim();
        validate_password(password)?;
        self.password_hash = hash(password)?;
        self.updated_at = Some(now);
        Ok(())
    }

    /// Attach a recovery token valid for `ttl`.
    pub fn begin_recovery(&mut self, token: String, now: DateTime<Utc>, ttl: Duration) {
        self.recover_token = Some(token);
        self.recover_token_exp = Some(now + ttl);
        self.updated_at = Some(now);
    }

    /// Consume a recovery token and set a new password.
    pub fn complete_recovery(
        &mut self,
        token: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let token_matches = self.recover_token.as_deref() == Some(token.trim());
        let still_valid = self.recover_token_exp.is_some_and(|exp| now <= exp);
        if !token_matches || !still_valid {
            return Err(DomainError::Unauthorized);
        }

        self.change_password(password, now)?;
        self.recover_token = None;
        self.recover_token_exp = None;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl HasLifecycle for User {
    fn lifecycle(&self) -> &LifecycleFlags {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut LifecycleFlags {
        &mut self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterUser {
        RegisterUser {
            username: "  Ana.Perez_01 ".to_string(),
            fname: "Ana".to_string(),
            lname: "Pérez".to_string(),
            password: "s3cret-pass".to_string(),
            email: "Ana@Example.cl".to_string(),
            image_url: Some("   ".to_string()),
        }
    }

    #[test]
    fn register_normalizes_and_hashes() {
        let user = User::register(registration(), Utc::now()).unwrap();
        assert_eq!(user.username, "ana.perez_01");
        assert_eq!(user.email, "ana@example.cl");
        assert_eq!(user.role, Role::Client);
        assert_eq!(user.image_url, None);
        assert!(user.lifecycle.is_live());
        assert_ne!(user.password_hash, "s3cret-pass");
        assert!(user.check_password("s3cret-pass"));
    }

    #[test]
    fn register_rejects_short_password() {
        let mut cmd = registration();
        cmd.password = "short".to_string();
        assert!(matches!(
            User::register(cmd, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn register_rejects_bad_email() {
        let mut cmd = registration();
        cmd.email = "not-an-email".to_string();
        assert!(matches!(
            User::register(cmd, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn profile_update_requires_a_field() {
        let mut user = User::register(registration(), Utc::now()).unwrap();
        let err = user.apply_profile(UpdateProfile::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn profile_update_is_all_or_nothing() {
        let mut user = User::register(registration(), Utc::now()).unwrap();
        let update = UpdateProfile {
            fname: Some("Beatriz".to_string()),
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert!(user.apply_profile(update, Utc::now()).is_err());
        assert_eq!(user.fname, "Ana");
    }

    #[test]
    fn recovery_token_is_single_use_and_expires() {
        let now = Utc::now();
        let mut user = User::register(registration(), now).unwrap();
        user.begin_recovery("tok".to_string(), now, Duration::hours(24));

        assert_eq!(
            user.complete_recovery("wrong", "new-password", now),
            Err(DomainError::Unauthorized)
        );
        user.complete_recovery("tok", "new-password", now).unwrap();
        assert!(user.check_password("new-password"));
        assert_eq!(user.recover_token, None);
        assert_eq!(
            user.complete_recovery("tok", "another-pass", now),
            Err(DomainError::Unauthorized)
        );
    }

    #[test]
    fn expired_recovery_token_is_rejected() {
        let now = Utc::now();
        let mut user = User::register(registration(), now).unwrap();
        user.begin_recovery("tok".to_string(), now, Duration::hours(1));
        assert_eq!(
            user.complete_recovery("tok", "new-password", now + Duration::hours(2)),
            Err(DomainError::Unauthorized)
        );
    }
}
