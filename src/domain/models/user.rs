use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(json)]
    pub roles: Vec<Role>,
    pub active: bool,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub teacher_name: Option<String>,
    pub description: Option<String>,
    pub university: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub specialization: Option<String>,
    #[serde(rename = "group")]
    pub group_name: Option<String>,
    pub level: Option<String>,
    pub scale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional profile attributes shared by the signup and account creation flows.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserProfile {
    pub email: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(alias = "teacherName")]
    pub teacher_name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "University")]
    pub university: Option<String>,
    #[serde(alias = "College")]
    pub college: Option<String>,
    #[serde(alias = "Department")]
    pub department: Option<String>,
    #[serde(alias = "Specialization")]
    pub specialization: Option<String>,
    #[serde(rename = "group", alias = "groop")]
    pub group_name: Option<String>,
    pub level: Option<String>,
    #[serde(alias = "Scale")]
    pub scale: Option<String>,
}

impl User {
    pub fn new(username: String, password_hash: String, roles: Vec<Role>, profile: UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            roles,
            active: true,
            email: profile.email,
            phone_number: profile.phone_number,
            teacher_name: profile.teacher_name,
            description: profile.description,
            university: profile.university,
            college: profile.college,
            department: profile.department,
            specialization: profile.specialization,
            group_name: profile.group_name,
            level: profile.level,
            scale: profile.scale,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Conjunctive classification filter over students. `None` fields are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClassFilter {
    #[serde(alias = "University")]
    pub university: Option<String>,
    #[serde(alias = "College")]
    pub college: Option<String>,
    #[serde(alias = "Department")]
    pub department: Option<String>,
    #[serde(alias = "Specialization")]
    pub specialization: Option<String>,
    pub level: Option<String>,
    #[serde(rename = "group", alias = "groop")]
    pub group_name: Option<String>,
    #[serde(alias = "Scale")]
    pub scale: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new("amira".into(), "$argon2id$secret".into(), vec![Role::Student], UserProfile::default());
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["roles"], serde_json::json!(["Student"]));
        assert_eq!(value["active"], true);
    }

    #[test]
    fn group_attribute_uses_public_name() {
        let filter: ClassFilter = serde_json::from_value(serde_json::json!({
            "department": "Architecture",
            "group": "B"
        })).unwrap();
        assert_eq!(filter.group_name.as_deref(), Some("B"));
        assert!(filter.university.is_none());
    }

    #[test]
    fn legacy_attribute_keys_are_accepted() {
        let filter: ClassFilter = serde_json::from_value(serde_json::json!({
            "University": "Cairo",
            "Department": "Architecture",
            "groop": "B",
            "Scale": "1:50"
        })).unwrap();
        assert_eq!(filter.university.as_deref(), Some("Cairo"));
        assert_eq!(filter.department.as_deref(), Some("Architecture"));
        assert_eq!(filter.group_name.as_deref(), Some("B"));
        assert_eq!(filter.scale.as_deref(), Some("1:50"));

        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "College": "Engineering",
            "Specialization": "Urban",
            "groop": "A"
        })).unwrap();
        assert_eq!(profile.college.as_deref(), Some("Engineering"));
        assert_eq!(profile.specialization.as_deref(), Some("Urban"));
        assert_eq!(profile.group_name.as_deref(), Some("A"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed: Result<Vec<Role>, _> = serde_json::from_value(serde_json::json!(["Student", "Janitor"]));
        assert!(parsed.is_err());
    }
}
