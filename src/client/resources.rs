// Typed calls for each backend resource

use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    filter_by_organization, scope_to_organization, Department, DraftMode, Organization, Risk, RiskDraft, User,
    UserDraft,
};
use crate::pipeline::RequestDescriptor;
use crate::region::{Region, RegionSelection};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// What a successful login leaves behind on the session
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub user: Option<User>,
    pub region: Option<Region>,
}

// Authentication

impl ApiClient {
    /// Sign in. The session is reset to carry `selection` before the login
    /// request goes out, so that request resolves the session region.
    pub async fn login(&self, email: &str, password: &str, selection: RegionSelection) -> ClientResult<LoginOutcome> {
        self.session.begin_login(selection).await;

        match self.send_login(email, password).await {
            Ok((token, user)) => {
                self.session.establish(token, user.clone()).await;
                Ok(LoginOutcome {
                    user,
                    region: self.session.region().await,
                })
            }
            Err(e) => {
                self.session.clear().await;
                Err(e)
            }
        }
    }

    async fn send_login(&self, email: &str, password: &str) -> ClientResult<(String, Option<User>)> {
        let request = RequestDescriptor::post("/users/login", json!({ "email": email, "password": password }));
        let response: LoginResponse = self.call(request).await?;

        match response.token {
            Some(token) if !token.is_empty() => Ok((token, response.user)),
            _ => Err(ClientError::Validation("Login response did not include a token".to_string())),
        }
    }

    pub async fn logout(&self) {
        self.session.clear().await;
    }

    /// Change the signed-in user's password. Nothing is sent unless the new
    /// password and its confirmation match.
    pub async fn change_password(&self, old_password: &str, new_password: &str, confirm: &str) -> ClientResult<Value> {
        if new_password != confirm {
            return Err(ClientError::Validation("New passwords do not match".to_string()));
        }
        if new_password.is_empty() {
            return Err(ClientError::Validation("New password must not be empty".to_string()));
        }

        self.execute(RequestDescriptor::post(
            "/users/change-password",
            json!({ "oldPassword": old_password, "newPassword": new_password }),
        ))
        .await
    }
}

// Users

impl ApiClient {
    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.call_list(RequestDescriptor::get("/users")).await
    }

    /// Users visible to the signed-in user
    pub async fn visible_users(&self) -> ClientResult<Vec<User>> {
        let users = self.list_users().await?;
        Ok(self.scope(users).await)
    }

    pub async fn create_user(&self, draft: &UserDraft) -> ClientResult<Value> {
        if draft.password.as_deref().map_or(true, str::is_empty) {
            return Err(ClientError::Validation("A password is required for new users".to_string()));
        }
        self.execute(RequestDescriptor::post("/users", draft.payload(DraftMode::Create)))
            .await
    }

    pub async fn update_user(&self, id: &str, draft: &UserDraft) -> ClientResult<Value> {
        self.execute(RequestDescriptor::put(
            format!("/users/{}", id),
            draft.payload(DraftMode::Update),
        ))
        .await
    }

    /// Save a user row edited in place
    pub async fn update_user_row(&self, user: &User) -> ClientResult<Value> {
        self.execute(RequestDescriptor::put(
            format!("/users/{}", user.id),
            user.list_update_payload(),
        ))
        .await
    }

    pub async fn delete_user(&self, id: &str) -> ClientResult<Value> {
        self.execute(RequestDescriptor::delete(format!("/users/{}", id)))
            .await
    }
}

// Departments

impl ApiClient {
    pub async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        self.call_list(RequestDescriptor::get("/users/departments"))
            .await
    }

    /// Departments offered by pickers: only those of the signed-in organization
    pub async fn session_departments(&self) -> ClientResult<Vec<Department>> {
        let departments = self.list_departments().await?;
        Ok(match self.session.organization().await {
            Some(org) => filter_by_organization(departments, &org),
            None => departments,
        })
    }

    pub async fn create_department(&self, name: &str) -> ClientResult<Value> {
        let name = required_name(name, "Department")?;
        self.execute(RequestDescriptor::post("/users/departments", json!({ "name": name })))
            .await
    }

    pub async fn update_department(&self, id: &str, name: &str) -> ClientResult<Value> {
        let name = required_name(name, "Department")?;
        self.execute(RequestDescriptor::put(
            format!("/users/departments/{}", id),
            json!({ "name": name }),
        ))
        .await
    }

    pub async fn delete_department(&self, id: &str) -> ClientResult<Value> {
        self.execute(RequestDescriptor::delete(format!("/users/departments/{}", id)))
            .await
    }
}

// Organizations

impl ApiClient {
    pub async fn list_organizations(&self) -> ClientResult<Vec<Organization>> {
        self.call_list(RequestDescriptor::get("/users/organizations"))
            .await
    }

    pub async fn create_organization(&self, name: &str) -> ClientResult<Value> {
        let name = required_name(name, "Organization")?;
        self.execute(RequestDescriptor::post("/users/organizations", json!({ "name": name })))
            .await
    }

    pub async fn delete_organization(&self, id: &str) -> ClientResult<Value> {
        self.execute(RequestDescriptor::delete(format!("/users/organizations/{}", id)))
            .await
    }
}

// Risks

impl ApiClient {
    pub async fn list_risks(&self) -> ClientResult<Vec<Risk>> {
        self.call_list(RequestDescriptor::get("/risks")).await
    }

    /// Risks visible to the signed-in user
    pub async fn visible_risks(&self) -> ClientResult<Vec<Risk>> {
        let risks = self.list_risks().await?;
        Ok(self.scope(risks).await)
    }

    pub async fn get_risk(&self, id: &str) -> ClientResult<Risk> {
        self.call(RequestDescriptor::get(format!("/risks/{}", id)))
            .await
    }

    /// Submit a new risk. Derived fields are recomputed into the payload.
    pub async fn create_risk(&self, draft: &mut RiskDraft) -> ClientResult<Value> {
        check_risk(draft)?;
        self.execute(RequestDescriptor::post("/risks", draft.payload()))
            .await
    }

    pub async fn update_risk(&self, id: &str, draft: &mut RiskDraft) -> ClientResult<Value> {
        check_risk(draft)?;
        self.execute(RequestDescriptor::put(format!("/risks/{}", id), draft.payload()))
            .await
    }

    pub async fn delete_risk(&self, id: &str) -> ClientResult<Value> {
        self.execute(RequestDescriptor::delete(format!("/risks/{}", id)))
            .await
    }
}

impl ApiClient {
    async fn scope<T: crate::models::OrganizationScoped>(&self, items: Vec<T>) -> Vec<T> {
        let ctx = self.session.snapshot().await;
        match ctx.user {
            Some(user) => scope_to_organization(items, user.role, ctx.organization.as_deref()),
            None => items,
        }
    }
}

fn required_name<'a>(name: &'a str, what: &str) -> ClientResult<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(format!("{} name is required", what)));
    }
    Ok(trimmed)
}

fn check_risk(draft: &RiskDraft) -> ClientResult<()> {
    let missing = draft.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(format!("Missing required fields: {}", missing.join(", "))))
    }
}
