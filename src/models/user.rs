use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::{null_as_default, DraftMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Root,
    RiskOwner,
    RiskManager,
    #[default]
    RiskIdentifier,
    #[serde(other)]
    Unknown,
}

/// Areas of the console a signed-in user can reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Users,
    Departments,
    Organizations,
    Risks,
    ChangePassword,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::Root,
        Role::RiskOwner,
        Role::RiskManager,
        Role::RiskIdentifier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Root => "root",
            Role::RiskOwner => "risk_owner",
            Role::RiskManager => "risk_manager",
            Role::RiskIdentifier => "risk_identifier",
            Role::Unknown => "unknown",
        }
    }

    /// Risk owners only manage their own password; super admins also see organizations
    pub fn sections(&self) -> Vec<Section> {
        match self {
            Role::RiskOwner => vec![Section::ChangePassword],
            Role::SuperAdmin => vec![
                Section::Dashboard,
                Section::Users,
                Section::Departments,
                Section::Organizations,
                Section::Risks,
                Section::ChangePassword,
            ],
            _ => vec![
                Section::Dashboard,
                Section::Users,
                Section::Departments,
                Section::Risks,
                Section::ChangePassword,
            ],
        }
    }

    pub fn can_access(&self, section: Section) -> bool {
        self.sections().contains(&section)
    }

    /// Roles that are bound to a department
    pub fn requires_department(&self) -> bool {
        matches!(self, Role::RiskOwner | Role::RiskIdentifier)
    }

    /// Roles that are bound to an organization
    pub fn requires_organization(&self) -> bool {
        matches!(self, Role::Root)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown role '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_auditor: bool,
}

impl User {
    /// Payload sent when a user row is edited in place from the user list
    pub fn list_update_payload(&self) -> Value {
        let department_id = if self.role == Role::SuperAdmin {
            Value::Null
        } else {
            self.department_id.clone().map(Value::String).unwrap_or(Value::Null)
        };

        json!({
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "departmentId": department_id,
            "isAuditor": self.is_auditor,
        })
    }

    pub fn department_label(&self) -> &str {
        self.department_name.as_deref().unwrap_or("-")
    }
}

/// The create/edit user form
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub role: Role,
    pub department_id: Option<String>,
    pub organization: Option<String>,
}

impl UserDraft {
    /// Build the request body. Department and organization are only sent for
    /// the roles bound to them, and the password only on create.
    pub fn payload(&self, mode: DraftMode) -> Value {
        let mut body = Map::new();
        body.insert("name".to_string(), json!(self.name));
        body.insert("email".to_string(), json!(self.email.to_lowercase()));
        body.insert("role".to_string(), json!(self.role));

        if self.role.requires_department() {
            body.insert("departmentId".to_string(), json!(self.department_id));
        }
        if self.role.requires_organization() {
            body.insert("organization".to_string(), json!(self.organization));
        }
        if mode == DraftMode::Create {
            if let Some(password) = &self.password {
                body.insert("password".to_string(), json!(password));
            }
        }

        Value::Object(body)
    }
}
