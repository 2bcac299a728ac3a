use reqwest::Method;
use tokio::sync::watch;

use super::{ApiClient, ClientError, TaskService};
use crate::entities::{AuthResponse, LoginRequest, ProfileRequest, RegisterRequest};

/// The signed-in user as the front end sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&AuthResponse> for Profile {
    fn from(response: &AuthResponse) -> Self {
        Self {
            id: response.id,
            name: response.name.clone(),
            email: response.email.clone(),
        }
    }
}

pub fn validate_display_name(name: &str) -> Result<(), ClientError> {
    if name.trim().chars().count() < 2 {
        return Err(ClientError::Invalid("Name is too short!"));
    }
    Ok(())
}

pub struct AuthService {
    api: ApiClient,
    current_user: watch::Sender<Option<Profile>>,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        let (current_user, _) = watch::channel(None);
        Self { api, current_user }
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.current_user.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.borrow().is_some()
    }

    /// Views hold a receiver and re-render on every change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.current_user.subscribe()
    }

    fn sign_in(&self, response: &AuthResponse) -> Result<Profile, ClientError> {
        self.api.tokens().save(&response.token)?;

        let profile = Profile::from(response);
        self.current_user.send_replace(Some(profile.clone()));
        Ok(profile)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Profile, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .api
            .send(Method::POST, "/api/users/login", &request)
            .await?;

        tracing::debug!(user_id = response.id, "signed in");
        self.sign_in(&response)
    }

    /// Creates the account and signs straight in with the returned token.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Profile, ClientError> {
        let request = RegisterRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let response: AuthResponse = self
            .api
            .send(Method::POST, "/api/users/register", &request)
            .await?;

        self.sign_in(&response)
    }

    pub async fn update_profile(
        &self,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<Profile, ClientError> {
        if let Some(name) = name {
            validate_display_name(name)?;
        }

        let request = ProfileRequest {
            name: name.map(str::to_string),
            password: password.map(str::to_string),
        };
        let response: AuthResponse = self
            .api
            .send(Method::PUT, "/api/users/profile", &request)
            .await?;

        self.sign_in(&response)
    }

    /// Signs out and drops the cached task list so the next account starts empty.
    pub fn logout(&self, tasks: &TaskService) -> Result<(), ClientError> {
        self.current_user.send_replace(None);
        tasks.clear();
        self.api.tokens().clear()?;
        Ok(())
    }
}
