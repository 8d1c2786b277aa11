//! Site state persisted under `~/.obras/`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use obras_core::{CertificationProvider, Project, Role};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn obras_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".obras"))
}

pub fn ensure_obras_home() -> Result<PathBuf> {
    let dir = obras_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn site_path() -> Result<PathBuf> {
    Ok(ensure_obras_home()?.join("site.json"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub prl_course: String,
    pub prl_expires: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub full_name: String,
    pub role: Role,
}

/// Everything the CLI persists: one project plus the registries the core
/// treats as external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteState {
    pub project: Project,
    pub employees: Vec<Employee>,
    pub users: Vec<UserAccount>,
}

impl SiteState {
    pub fn user(&self, id: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Certification lookups against the persisted employee registry.
pub struct EmployeeRegistry(pub Vec<Employee>);

impl CertificationProvider for EmployeeRegistry {
    fn is_certification_valid(&self, employee_id: &str, as_of: DateTime<Utc>) -> bool {
        self.0
            .iter()
            .find(|e| e.id == employee_id)
            .map(|e| e.prl_expires > as_of)
            .unwrap_or(false)
    }
}

pub fn write_site(path: &PathBuf, site: &SiteState) -> Result<()> {
    let json = serde_json::to_string_pretty(site)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn read_site(path: &PathBuf) -> Result<SiteState> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(serde_json::from_str(&s)?)
}
