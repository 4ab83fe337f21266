use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::sql::{ColumnMap, FilterSpec, UpdateSpec};

// Distinguishes an absent field (outer None) from an explicit null (Some(None))
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Company Models
// ============================================================================

/// Field names whose column differs from the field
pub const COMPANY_COLUMNS: ColumnMap = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];

/// Company row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Payload for creating a company
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Partial update of a company; the handle never changes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyPatch {
    pub fn to_update_spec(&self) -> UpdateSpec {
        let mut spec = UpdateSpec::new();
        if let Some(name) = &self.name {
            spec.push("name", name.as_str());
        }
        if let Some(description) = &self.description {
            spec.push("description", description.as_str());
        }
        if let Some(num_employees) = self.num_employees {
            spec.push("numEmployees", num_employees);
        }
        if let Some(logo_url) = &self.logo_url {
            spec.push("logoUrl", logo_url.clone());
        }
        spec
    }
}

/// Search criteria for listing companies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn to_filter_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(name) = &self.name {
            spec.push("name", name.as_str());
        }
        if let Some(min) = self.min_employees {
            spec.push("minEmployees", min);
        }
        if let Some(max) = self.max_employees {
            spec.push("maxEmployees", max);
        }
        spec
    }
}

/// Company together with the jobs it posts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

// ============================================================================
// Job Models
// ============================================================================

/// Job fields map one-to-one onto columns
pub const JOB_COLUMNS: ColumnMap = &[];

/// Job row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// Job as listed under its company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
}

/// Payload for creating a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// Partial update of a job; id and company are fixed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub equity: Option<Option<f64>>,
}

impl JobPatch {
    pub fn to_update_spec(&self) -> UpdateSpec {
        let mut spec = UpdateSpec::new();
        if let Some(title) = &self.title {
            spec.push("title", title.as_str());
        }
        if let Some(salary) = self.salary {
            spec.push("salary", salary);
        }
        if let Some(equity) = self.equity {
            spec.push("equity", equity);
        }
        spec
    }
}

/// Search criteria for listing jobs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn to_filter_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(title) = &self.title {
            spec.push("title", title.as_str());
        }
        if let Some(min_salary) = self.min_salary {
            spec.push("minSalary", min_salary);
        }
        if let Some(has_equity) = self.has_equity {
            spec.push("hasEquity", has_equity);
        }
        spec
    }
}

/// Job together with the company that posted it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company: Company,
}

// ============================================================================
// User Models
// ============================================================================

pub const USER_COLUMNS: ColumnMap = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

/// User row; the password hash is never selected into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Payload for registering a user
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

/// Partial update of a user; the username never changes
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

impl std::fmt::Debug for UserPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPatch")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

impl UserPatch {
    /// Update spec for every field except the password, which has to be
    /// hashed before it is stored
    pub fn to_update_spec(&self) -> UpdateSpec {
        let mut spec = UpdateSpec::new();
        if let Some(first_name) = &self.first_name {
            spec.push("firstName", first_name.as_str());
        }
        if let Some(last_name) = &self.last_name {
            spec.push("lastName", last_name.as_str());
        }
        if let Some(email) = &self.email {
            spec.push("email", email.as_str());
        }
        if let Some(is_admin) = self.is_admin {
            spec.push("isAdmin", is_admin);
        }
        spec
    }
}

/// User together with the ids of the jobs they applied to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}
