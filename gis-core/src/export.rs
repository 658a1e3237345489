use chrono::NaiveDate;
use gis_records::Station;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv: {0}")]
    Flush(String),
    #[error("csv output is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

const STATION_HEADERS: [&str; 9] = [
    "ID",
    "Nom",
    "Code",
    "Type",
    "Axe",
    "Ville",
    "État",
    "Code opérationnel",
    "Code réseau",
];

/// `gares_oncf_<date>.csv`
pub fn station_export_name(date: NaiveDate) -> String {
    format!("gares_oncf_{}.csv", date.format("%Y-%m-%d"))
}

/// Stations as CSV, one row each, missing values left empty.
pub fn stations_csv<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(STATION_HEADERS)?;
    for station in stations {
        let cell = |value: &Option<String>| value.clone().unwrap_or_default();
        writer.write_record([
            station.id.to_string(),
            cell(&station.name),
            cell(&station.code),
            cell(&station.kind),
            cell(&station.axis),
            cell(&station.city),
            cell(&station.status),
            cell(&station.operational_code),
            cell(&station.network_code),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_fields_with_commas() {
        let stations = vec![Station {
            id: 7,
            name: Some("Rabat, Ville".into()),
            code: Some("RBV".into()),
            status: Some("ACTIVE".into()),
            ..Station::default()
        }];

        let csv = stations_csv(&stations).expect("csv export");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("ID,Nom,Code,Type,Axe,Ville,État,Code opérationnel,Code réseau")
        );
        assert_eq!(lines.next(), Some("7,\"Rabat, Ville\",RBV,,,,ACTIVE,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        assert_eq!(station_export_name(date), "gares_oncf_2024-05-01.csv");
    }
}
