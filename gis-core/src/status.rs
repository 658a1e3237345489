use serde::{Deserialize, Serialize};

/// Bootstrap contextual colour used for badges and card accents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
    Info,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Primary => "primary",
            Tone::Secondary => "secondary",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
            Tone::Info => "info",
        }
    }

    pub fn badge_class(self) -> String {
        format!("badge bg-{}", self.as_str())
    }
}

pub fn station_tone(status: Option<&str>) -> Tone {
    match status {
        Some("ACTIVE") => Tone::Success,
        _ => Tone::Secondary,
    }
}

pub fn station_status_label(status: Option<&str>) -> &'static str {
    match status {
        Some("ACTIVE") => "Active",
        Some("PASSIVE") => "Passive",
        _ => "Non défini",
    }
}

/// Incident statuses are free text; they are bucketed by keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    Open,
    InProgress,
    Resolved,
    Unknown,
}

impl IncidentStatus {
    pub fn classify(status: Option<&str>) -> Self {
        let Some(status) = status else {
            return IncidentStatus::Unknown;
        };
        let lowered = status.to_lowercase();
        if lowered.contains("ouvert") {
            IncidentStatus::Open
        } else if lowered.contains("cours") {
            IncidentStatus::InProgress
        } else if lowered.contains("résolu") || lowered.contains("fermé") {
            IncidentStatus::Resolved
        } else {
            IncidentStatus::Unknown
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            IncidentStatus::Open => Tone::Danger,
            IncidentStatus::InProgress => Tone::Warning,
            IncidentStatus::Resolved => Tone::Success,
            IncidentStatus::Unknown => Tone::Secondary,
        }
    }

    /// Modifier class on incident cards.
    pub fn card_class(self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::InProgress => "in-progress",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_status_maps_to_fixed_tones() {
        assert_eq!(station_tone(Some("ACTIVE")), Tone::Success);
        assert_eq!(station_tone(Some("PASSIVE")), Tone::Secondary);
        assert_eq!(station_tone(None), Tone::Secondary);
        assert_eq!(station_tone(Some("active")), Tone::Secondary);
    }

    #[test]
    fn incident_status_keywords() {
        let cases = [
            (Some("Ouvert"), IncidentStatus::Open, Tone::Danger),
            (Some("En cours"), IncidentStatus::InProgress, Tone::Warning),
            (Some("Résolu"), IncidentStatus::Resolved, Tone::Success),
            (Some("FERMÉ"), IncidentStatus::Resolved, Tone::Success),
            (Some("Annulé"), IncidentStatus::Unknown, Tone::Secondary),
            (None, IncidentStatus::Unknown, Tone::Secondary),
        ];
        for (raw, status, tone) in cases {
            assert_eq!(IncidentStatus::classify(raw), status, "{raw:?}");
            assert_eq!(status.tone(), tone);
        }
    }
}
