use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Identity, Profile};
use super::flash::{paths, Outcome};
use super::forms::{FormErrors, LoginForm, ProfileForm, RegisterForm};
use super::password::{hash_password, new_session_token, verify_password, verify_unknown_user};
use super::repository::{BoardRepository, NewIdentity, ProfileDetails, RepositoryError};
use super::service::{BoardError, JobBoardService};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Bearer token plus the identity it authenticates.
#[derive(Debug, Clone, Serialize)]
pub struct SessionGrant {
    pub token: String,
    pub identity: Identity,
    pub profile: Profile,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub identity: Identity,
    pub profile: Profile,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    /// Register an identity. Its profile is written in the same transaction.
    pub fn register(&self, form: RegisterForm) -> Result<SessionGrant, BoardError> {
        let registration = form.clean()?;

        if self.repository.username_taken(&registration.username)? {
            return Err(username_taken().into());
        }

        let password_hash = hash_password(&registration.password)?;
        let identity = match self.repository.create_identity(NewIdentity {
            username: registration.username,
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
            is_staff: false,
            role: registration.role,
            profile: ProfileDetails::default(),
        }) {
            Ok(identity) => identity,
            Err(RepositoryError::Conflict) => return Err(username_taken().into()),
            Err(other) => return Err(other.into()),
        };

        info!(identity = identity.id.0, role = registration.role.label(), "identity registered");

        let grant = self.open_session(identity)?;
        Ok(SessionGrant {
            outcome: Outcome::redirect(paths::home()).success("Registration successful"),
            ..grant
        })
    }

    pub fn login(&self, form: LoginForm) -> Result<SessionGrant, BoardError> {
        let Some(credentials) = self.repository.credentials(form.username.trim())? else {
            verify_unknown_user(&form.password);
            return Err(BoardError::InvalidCredentials);
        };

        if !verify_password(&form.password, &credentials.password_hash)? {
            warn!(username = %credentials.identity.username, "rejected login attempt");
            return Err(BoardError::InvalidCredentials);
        }

        self.open_session(credentials.identity)
    }

    /// Resolve a bearer token. Unknown tokens resolve to `None`.
    pub fn authenticate(&self, token: &str) -> Result<Option<Identity>, BoardError> {
        Ok(self.repository.identity_for_token(token)?)
    }

    pub fn account(&self, identity: &Identity) -> Result<AccountView, BoardError> {
        let profile = self
            .repository
            .profile(identity.id)?
            .ok_or(BoardError::NotFound("profile"))?;
        Ok(AccountView {
            identity: identity.clone(),
            profile,
        })
    }

    pub fn update_profile(
        &self,
        identity: &Identity,
        form: ProfileForm,
    ) -> Result<Outcome, BoardError> {
        let details = form.clean()?;
        self.repository.update_profile(identity.id, &details)?;
        Ok(Outcome::redirect(paths::profile()).success("Profile updated"))
    }

    fn open_session(&self, identity: Identity) -> Result<SessionGrant, BoardError> {
        let profile = self
            .repository
            .profile(identity.id)?
            .ok_or(BoardError::NotFound("profile"))?;
        let token = new_session_token();
        self.repository.create_session(identity.id, &token)?;

        Ok(SessionGrant {
            token,
            identity,
            profile,
            outcome: Outcome::redirect(paths::home()),
        })
    }
}

fn username_taken() -> FormErrors {
    let mut errors = FormErrors::default();
    errors.add("username", USERNAME_TAKEN);
    errors
}
