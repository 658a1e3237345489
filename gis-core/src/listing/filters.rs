use chrono::{Datelike, Duration, NaiveDateTime};
use gis_records::{timestamp, Incident, Station};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A filter over one collection, evaluated at a given wall-clock time.
pub trait Criteria<T> {
    fn matches(&self, item: &T, now: NaiveDateTime) -> bool;
}

/// Case-insensitive substring test. An absent haystack never matches.
fn contains_text(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|text| text.to_lowercase().contains(needle))
}

fn normalized(search: &str) -> Option<String> {
    let trimmed = search.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn equals(selected: &Option<String>, value: Option<&str>) -> bool {
    match selected {
        Some(wanted) => value == Some(wanted.as_str()),
        None => true,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationFilter {
    pub search: String,
    pub axis: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl StationFilter {
    pub fn is_empty(&self) -> bool {
        normalized(&self.search).is_none()
            && self.axis.is_none()
            && self.kind.is_none()
            && self.status.is_none()
    }

    /// Query parameters understood by the station endpoint; unset fields are
    /// left out.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let search = normalized(&self.search).map(|_| self.search.trim().to_string());
        [
            ("search", search.as_ref()),
            ("axe", self.axis.as_ref()),
            ("type", self.kind.as_ref()),
            ("etat", self.status.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

impl Criteria<Station> for StationFilter {
    fn matches(&self, station: &Station, _now: NaiveDateTime) -> bool {
        if let Some(needle) = normalized(&self.search) {
            let hit = [&station.name, &station.code, &station.city]
                .into_iter()
                .any(|field| contains_text(field.as_deref(), &needle));
            if !hit {
                return false;
            }
        }
        equals(&self.axis, station.axis.as_deref())
            && equals(&self.kind, station.kind.as_deref())
            && equals(&self.status, station.status.as_deref())
    }
}

/// Date bucket relative to "now".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    /// The last seven days.
    Week,
    Month,
    Year,
}

impl Period {
    pub fn contains(self, at: NaiveDateTime, now: NaiveDateTime) -> bool {
        match self {
            Period::Today => at.date() == now.date(),
            Period::Week => at >= now - Duration::days(7),
            Period::Month => at.year() == now.year() && at.month() == now.month(),
            Period::Year => at.year() == now.year(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown period `{0}`")]
pub struct UnknownPeriod(pub String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFilter {
    pub search: String,
    pub status: Option<String>,
    /// Any-of; empty means every type.
    pub types: BTreeSet<i64>,
    pub period: Option<Period>,
}

impl IncidentFilter {
    pub fn is_empty(&self) -> bool {
        normalized(&self.search).is_none()
            && self.status.is_none()
            && self.types.is_empty()
            && self.period.is_none()
    }
}

impl Criteria<Incident> for IncidentFilter {
    fn matches(&self, incident: &Incident, now: NaiveDateTime) -> bool {
        if let Some(needle) = normalized(&self.search) {
            if !contains_text(incident.description.as_deref(), &needle) {
                return false;
            }
        }
        if !equals(&self.status, incident.status.as_deref()) {
            return false;
        }
        if !self.types.is_empty()
            && !incident
                .type_id
                .is_some_and(|type_id| self.types.contains(&type_id))
        {
            return false;
        }
        match self.period {
            Some(period) => incident
                .start_date
                .as_deref()
                .and_then(timestamp::parse)
                .is_some_and(|at| period.contains(at, now)),
            None => true,
        }
    }
}

/// Indices of the items `filter` keeps, in collection order.
pub fn apply<T, F: Criteria<T>>(items: &[T], filter: &F, now: NaiveDateTime) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.matches(item, now))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date")
    }

    fn station(name: &str, city: Option<&str>) -> Station {
        Station {
            name: Some(name.into()),
            city: city.map(str::to_string),
            ..Station::default()
        }
    }

    fn incident(description: Option<&str>, start: Option<&str>) -> Incident {
        Incident {
            description: description.map(str::to_string),
            start_date: start.map(str::to_string),
            ..Incident::default()
        }
    }

    #[test]
    fn station_search_is_case_insensitive_substring() {
        let stations = vec![
            station("Casablanca Voyageurs", None),
            station("Fes", None),
        ];
        let filter = StationFilter {
            search: "casa".into(),
            ..StationFilter::default()
        };
        assert_eq!(apply(&stations, &filter, now()), vec![0]);

        let by_city = StationFilter {
            search: "MEKN".into(),
            ..StationFilter::default()
        };
        assert_eq!(
            apply(&[station("Gare X", Some("Meknès"))], &by_city, now()),
            vec![0]
        );
    }

    #[test]
    fn station_fields_combine_as_conjunction() {
        let mut rabat = station("Rabat Agdal", None);
        rabat.axis = Some("RABAT".into());
        rabat.status = Some("ACTIVE".into());
        let mut passive = rabat.clone();
        passive.status = Some("PASSIVE".into());

        let filter = StationFilter {
            search: "agdal".into(),
            axis: Some("RABAT".into()),
            status: Some("ACTIVE".into()),
            ..StationFilter::default()
        };
        assert_eq!(apply(&[rabat, passive], &filter, now()), vec![0]);
    }

    #[test]
    fn query_params_skip_unset_fields() {
        let filter = StationFilter {
            search: "  oujda ".into(),
            kind: Some("PRINCIPALE".into()),
            ..StationFilter::default()
        };
        assert_eq!(
            filter.query_params(),
            vec![
                ("search".to_string(), "oujda".to_string()),
                ("type".to_string(), "PRINCIPALE".to_string()),
            ]
        );
        assert!(StationFilter::default().query_params().is_empty());
    }

    #[test]
    fn missing_description_never_matches_search() {
        let items = vec![
            incident(None, None),
            incident(Some("Panne caténaire"), None),
        ];
        let filter = IncidentFilter {
            search: "CATÉNAIRE".into(),
            ..IncidentFilter::default()
        };
        assert_eq!(apply(&items, &filter, now()), vec![1]);
    }

    #[test]
    fn type_filter_is_any_of() {
        let mut a = incident(None, None);
        a.type_id = Some(1);
        let mut b = incident(None, None);
        b.type_id = Some(2);
        let untyped = incident(None, None);

        let filter = IncidentFilter {
            types: BTreeSet::from([2, 3]),
            ..IncidentFilter::default()
        };
        assert_eq!(apply(&[a, b, untyped], &filter, now()), vec![1]);
    }

    #[test]
    fn periods_follow_the_supplied_clock() {
        let items = vec![
            incident(None, Some("2024-05-15T08:00:00")),
            incident(None, Some("2024-05-10 08:00")),
            incident(None, Some("2024-05-01")),
            incident(None, Some("2024-01-03")),
            incident(None, Some("2023-12-31")),
            incident(None, None),
        ];
        let with = |period| IncidentFilter {
            period: Some(period),
            ..IncidentFilter::default()
        };

        assert_eq!(apply(&items, &with(Period::Today), now()), vec![0]);
        assert_eq!(apply(&items, &with(Period::Week), now()), vec![0, 1]);
        assert_eq!(apply(&items, &with(Period::Month), now()), vec![0, 1, 2]);
        assert_eq!(apply(&items, &with(Period::Year), now()), vec![0, 1, 2, 3]);
        assert_eq!(apply(&items, &IncidentFilter::default(), now()).len(), 6);
    }

    #[test]
    fn period_parses_select_values() {
        assert_eq!("week".parse::<Period>(), Ok(Period::Week));
        assert!("fortnight".parse::<Period>().is_err());
    }
}
