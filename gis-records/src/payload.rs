//! Write payloads for the station and incident forms.
//!
//! Forms hand over raw strings; these are checked before anything is sent so
//! the server only ever sees well-formed writes.

use crate::records::{Incident, Station};
use crate::timestamp;
use serde::{Deserialize, Serialize};

pub const STATION_STATUSES: [&str; 2] = ["ACTIVE", "PASSIVE"];

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid station status '{0}'")]
    InvalidStatus(String),
    #[error("invalid date '{value}' for {field}")]
    InvalidDate { field: &'static str, value: String },
    #[error("end date precedes start date")]
    EndBeforeStart,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationInput {
    pub nom: String,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub axe: String,
    pub ville: String,
    pub etat: String,
    pub codeoperationnel: String,
    pub codereseau: String,
}

impl StationInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.nom.trim().is_empty() {
            return Err(ValidationError::Missing("nom"));
        }
        if self.code.trim().is_empty() {
            return Err(ValidationError::Missing("code"));
        }
        if !STATION_STATUSES.contains(&self.etat.as_str()) {
            return Err(ValidationError::InvalidStatus(self.etat.clone()));
        }
        Ok(())
    }
}

impl From<&Station> for StationInput {
    /// Prefills the edit form; a station without status edits as ACTIVE.
    fn from(station: &Station) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            nom: text(&station.name),
            code: text(&station.code),
            kind: text(&station.kind),
            axe: text(&station.axis),
            ville: text(&station.city),
            etat: station.status.clone().unwrap_or_else(|| "ACTIVE".into()),
            codeoperationnel: text(&station.operational_code),
            codereseau: text(&station.network_code),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentInput {
    pub type_id: Option<i64>,
    pub localisation_id: Option<i64>,
    pub date_debut: String,
    pub date_fin: Option<String>,
    pub description: String,
    pub statut: String,
}

impl IncidentInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.type_id.is_none() {
            return Err(ValidationError::Missing("type_id"));
        }
        if self.localisation_id.is_none() {
            return Err(ValidationError::Missing("localisation_id"));
        }
        if self.date_debut.trim().is_empty() {
            return Err(ValidationError::Missing("date_debut"));
        }
        let start =
            timestamp::parse(&self.date_debut).ok_or_else(|| ValidationError::InvalidDate {
                field: "date_debut",
                value: self.date_debut.clone(),
            })?;
        if let Some(end) = self.date_fin.as_deref().filter(|v| !v.trim().is_empty()) {
            let end = timestamp::parse(end).ok_or_else(|| ValidationError::InvalidDate {
                field: "date_fin",
                value: end.to_string(),
            })?;
            if end < start {
                return Err(ValidationError::EndBeforeStart);
            }
        }
        if self.statut.trim().is_empty() {
            return Err(ValidationError::Missing("statut"));
        }
        Ok(())
    }

    fn end_date(&self) -> Option<&str> {
        self.date_fin.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn create_body(&self) -> serde_json::Value {
        serde_json::json!({
            "type_id": self.type_id,
            "localisation_id": self.localisation_id,
            "date_debut": self.date_debut,
            "date_fin": self.end_date(),
            "description": self.description,
            "statut": self.statut,
        })
    }

    /// The update endpoint names the text and status columns after the table.
    pub fn update_body(&self) -> serde_json::Value {
        serde_json::json!({
            "type_id": self.type_id,
            "localisation_id": self.localisation_id,
            "date_debut": self.date_debut,
            "date_fin": self.end_date(),
            "resume": self.description,
            "etat": self.statut,
        })
    }
}

impl From<&Incident> for IncidentInput {
    /// Prefills the edit form; API timestamps become `datetime-local` values.
    fn from(incident: &Incident) -> Self {
        let as_input = |v: &Option<String>| v.as_ref().map(|s| s.replacen(' ', "T", 1));
        Self {
            type_id: incident.type_id,
            localisation_id: incident.location_id,
            date_debut: as_input(&incident.start_date).unwrap_or_default(),
            date_fin: as_input(&incident.end_date),
            description: incident.description.clone().unwrap_or_default(),
            statut: incident.status.clone().unwrap_or_else(|| "Ouvert".into()),
        }
    }
}
