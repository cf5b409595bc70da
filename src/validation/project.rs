use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::ValidationErrors;
use crate::database::models::{NewProject, Project, ProjectChanges, ProjectStatus};

pub const MAX_TEAM_MEMBERS: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub team_members: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub team_members: Option<Vec<String>>,
}

impl CreateProjectRequest {
    pub fn validate(self, owner_id: Uuid) -> Result<NewProject, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.text("name", self.name, 1, 200, true);
        let description = errors.text("description", self.description, 0, 2000, false);
        let status = match self.status.as_deref() {
            None => Some(ProjectStatus::Active),
            Some(raw) => project_status(&mut errors, raw),
        };
        let start_date = errors.date("startDate", self.start_date.as_deref(), true);
        let end_date = errors.date("endDate", self.end_date.as_deref(), true);
        check_date_order(&mut errors, start_date, end_date);
        let location = errors.geolocation(self.latitude, self.longitude);
        let address = errors.text("address", self.address, 0, 500, false);
        let team_members = team_members(&mut errors, self.team_members.unwrap_or_default());

        let project = match (name, status, start_date, end_date, team_members) {
            (Some(name), Some(status), Some(start_date), Some(end_date), Some(team_members)) => NewProject {
                name,
                description,
                status,
                start_date,
                end_date,
                latitude: location.map(|l| l.0),
                longitude: location.map(|l| l.1),
                address,
                team_members,
                owner_id,
            },
            _ => return Err(errors),
        };
        errors.finish(project)
    }
}

impl UpdateProjectRequest {
    /// Cross-field rules are checked against the merged result
    pub fn validate(self, existing: &Project) -> Result<ProjectChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name {
            Some(n) => errors.text("name", Some(n), 1, 200, true),
            None => None,
        };
        let description = errors.text("description", self.description, 0, 2000, false);
        let status = self.status.as_deref().and_then(|raw| project_status(&mut errors, raw));
        let start_date = errors.date("startDate", self.start_date.as_deref(), false);
        let end_date = errors.date("endDate", self.end_date.as_deref(), false);
        if start_date.is_some() || end_date.is_some() {
            check_date_order(
                &mut errors,
                start_date.or(Some(existing.start_date)),
                end_date.or(Some(existing.end_date)),
            );
        }
        let location = errors.geolocation(self.latitude, self.longitude);
        let address = errors.text("address", self.address, 0, 500, false);
        let team_members = match self.team_members {
            Some(members) => team_members(&mut errors, members),
            None => None,
        };

        errors.finish(ProjectChanges {
            name,
            description,
            status,
            start_date,
            end_date,
            latitude: location.map(|l| l.0),
            longitude: location.map(|l| l.1),
            address,
            team_members,
        })
    }
}

fn project_status(errors: &mut ValidationErrors, raw: &str) -> Option<ProjectStatus> {
    let status = ProjectStatus::parse(raw);
    if status.is_none() {
        let allowed: Vec<&str> = ProjectStatus::ALL.iter().map(|s| s.as_str()).collect();
        errors.add("status", format!("status must be one of: {}", allowed.join(", ")));
    }
    status
}

fn check_date_order(errors: &mut ValidationErrors, start: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            errors.add("endDate", "End date must be after start date");
        }
    }
}

fn team_members(errors: &mut ValidationErrors, raw: Vec<String>) -> Option<Vec<Uuid>> {
    if raw.len() > MAX_TEAM_MEMBERS {
        errors.add(
            "teamMembers",
            format!("A project can have at most {} team members", MAX_TEAM_MEMBERS),
        );
        return None;
    }

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(raw.len());
    let mut ok = true;
    for (i, value) in raw.iter().enumerate() {
        let field = format!("teamMembers[{}]", i);
        match errors.uuid(&field, Some(value), true) {
            Some(id) if !seen.insert(id) => {
                errors.add(&field, "duplicate team member");
                ok = false;
            }
            Some(id) => members.push(id),
            None => ok = false,
        }
    }
    ok.then_some(members)
}
