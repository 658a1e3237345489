//! Typed access to the dashboard API.
//!
//! Reads never fail from the caller's point of view: a transport error, a
//! `success: false` envelope or an undecodable body is logged, raised as one
//! notification and degraded to an empty value. Writes return `Result` and
//! notify on both outcomes.

use crate::error::ApiError;
use crate::listing::StationFilter;
use crate::notify::{Notification, Notifier};
use crate::transport::{ApiRequest, Method, RawResponse, Transport};
use gis_records::{
    Envelope, FilterOptions, Incident, IncidentInput, IncidentType, Location, Pagination, Segment,
    Station, StationInput, Statistics,
};
use serde::de::DeserializeOwned;

/// One server-side page of stations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StationPage {
    pub stations: Vec<Station>,
    pub pagination: Option<Pagination>,
}

/// Everything the map draws, fetched together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapData {
    pub stations: Vec<Station>,
    pub segments: Vec<Segment>,
    pub incidents: Vec<Incident>,
}

pub struct GisApi<T, N> {
    transport: T,
    notifier: N,
}

impl<T: Transport, N: Notifier> GisApi<T, N> {
    pub fn new(transport: T, notifier: N) -> Self {
        Self {
            transport,
            notifier,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    async fn envelope<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Envelope<R>, ApiError> {
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        decode(&path, response)
    }

    async fn fetch<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<(R, Option<Pagination>), ApiError> {
        let path = request.path.clone();
        self.envelope::<R>(request)
            .await?
            .into_page()
            .map_err(|source| ApiError::Envelope { path, source })
    }

    /// Runs a read, degrading any failure to `R::default()`.
    async fn read<R: DeserializeOwned + Default>(
        &self,
        what: &str,
        request: ApiRequest,
    ) -> (R, Option<Pagination>) {
        match self.fetch::<R>(request).await {
            Ok(found) => found,
            Err(err) => {
                tracing::error!(error = %err, "failed to load {what}");
                self.notifier.notify(Notification::error(format!(
                    "Erreur lors du chargement des {what}"
                )));
                (R::default(), None)
            }
        }
    }

    async fn write(
        &self,
        request: ApiRequest,
        done: &str,
        failed: &str,
    ) -> Result<(), ApiError> {
        let path = request.path.clone();
        let outcome = match self.envelope::<serde_json::Value>(request).await {
            Ok(envelope) => envelope
                .into_ack()
                .map_err(|source| ApiError::Envelope { path, source }),
            Err(err) => Err(err),
        };
        match &outcome {
            Ok(()) => self.notifier.notify(Notification::success(done)),
            Err(err) => {
                tracing::error!(error = %err, "{failed}");
                self.notifier.notify(Notification::error(format!(
                    "{failed}: {}",
                    err.user_message()
                )));
            }
        }
        outcome
    }

    fn rejected(&self, err: ApiError) -> Result<(), ApiError> {
        self.notifier.notify(Notification::error(err.user_message()));
        Err(err)
    }

    pub async fn all_stations(&self) -> Vec<Station> {
        let request = ApiRequest::get("/gares").with_query(vec![("all".into(), "true".into())]);
        let (stations, _) = self.read::<Vec<Station>>("gares", request).await;
        tracing::debug!(count = stations.len(), "stations loaded");
        stations
    }

    pub async fn station_page(
        &self,
        page: usize,
        per_page: usize,
        filter: &StationFilter,
    ) -> StationPage {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        query.extend(filter.query_params());
        let request = ApiRequest::get("/gares").with_query(query);
        let (stations, pagination) = self.read::<Vec<Station>>("gares", request).await;
        StationPage {
            stations,
            pagination,
        }
    }

    pub async fn station_filters(&self) -> FilterOptions {
        let request = ApiRequest::get("/gares/filters");
        self.read::<FilterOptions>("filtres", request).await.0
    }

    pub async fn station(&self, id: i64) -> Option<Station> {
        let request = ApiRequest::get(format!("/gares/{id}"));
        self.read::<Option<Station>>("détails de la gare", request)
            .await
            .0
    }

    pub async fn segments(&self) -> Vec<Segment> {
        let (segments, _) = self
            .read::<Vec<Segment>>("arcs", ApiRequest::get("/arcs"))
            .await;
        tracing::debug!(count = segments.len(), "segments loaded");
        segments
    }

    /// Loads up to `per_page` incidents; filtering and paging happen locally.
    pub async fn incidents(&self, per_page: usize, filters: &[(String, String)]) -> Vec<Incident> {
        let mut query = vec![("per_page".to_string(), per_page.to_string())];
        query.extend(filters.iter().cloned());
        let request = ApiRequest::get("/evenements").with_query(query);
        let (incidents, _) = self.read::<Vec<Incident>>("incidents", request).await;
        tracing::debug!(count = incidents.len(), "incidents loaded");
        incidents
    }

    pub async fn incident_types(&self) -> Vec<IncidentType> {
        self.read::<Vec<IncidentType>>("types d'incidents", ApiRequest::get("/types-incidents"))
            .await
            .0
    }

    pub async fn locations(&self) -> Vec<Location> {
        self.read::<Vec<Location>>("localisations", ApiRequest::get("/localisations"))
            .await
            .0
    }

    pub async fn statistics(&self) -> Option<Statistics> {
        self.read::<Option<Statistics>>("statistiques", ApiRequest::get("/statistiques"))
            .await
            .0
    }

    /// Stations, segments and incidents in flight at once; each one degrades
    /// on its own.
    pub async fn load_map(&self, incident_limit: usize) -> MapData {
        let (stations, segments, incidents) = futures::join!(
            self.all_stations(),
            self.segments(),
            self.incidents(incident_limit, &[])
        );
        MapData {
            stations,
            segments,
            incidents,
        }
    }

    pub async fn create_station(&self, input: &StationInput) -> Result<(), ApiError> {
        if let Err(err) = input.validate() {
            return self.rejected(err.into());
        }
        let body = serde_json::to_value(input).map_err(|source| ApiError::Decode {
            path: "/gares".into(),
            source,
        })?;
        let request = ApiRequest::new(Method::Post, "/gares")
            .with_body(body);
        self.write(request, "Gare créée avec succès", "Erreur lors de la création de la gare")
            .await
    }

    pub async fn update_station(&self, id: i64, input: &StationInput) -> Result<(), ApiError> {
        if let Err(err) = input.validate() {
            return self.rejected(err.into());
        }
        let path = format!("/gares/{id}");
        let body = serde_json::to_value(input).map_err(|source| ApiError::Decode {
            path: path.clone(),
            source,
        })?;
        let request = ApiRequest::new(Method::Put, path)
            .with_body(body);
        self.write(
            request,
            "Gare mise à jour avec succès",
            "Erreur lors de la mise à jour de la gare",
        )
        .await
    }

    pub async fn delete_station(&self, id: i64) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Delete, format!("/gares/{id}"));
        self.write(
            request,
            "Gare supprimée avec succès",
            "Erreur lors de la suppression de la gare",
        )
        .await
    }

    pub async fn create_incident(&self, input: &IncidentInput) -> Result<(), ApiError> {
        if let Err(err) = input.validate() {
            return self.rejected(err.into());
        }
        let request = ApiRequest::new(Method::Post, "/evenements")
            .with_body(input.create_body());
        self.write(
            request,
            "Incident créé avec succès",
            "Erreur lors de la création de l'incident",
        )
        .await
    }

    pub async fn update_incident(&self, id: i64, input: &IncidentInput) -> Result<(), ApiError> {
        if let Err(err) = input.validate() {
            return self.rejected(err.into());
        }
        let request = ApiRequest::new(Method::Put, format!("/evenements/{id}"))
            .with_body(input.update_body());
        self.write(
            request,
            "Incident mis à jour avec succès",
            "Erreur lors de la mise à jour de l'incident",
        )
        .await
    }
}

/// Error statuses only count when the body is not an envelope: the server
/// reports most failures as `success: false` with a 4xx/5xx code.
fn decode<R: DeserializeOwned>(path: &str, response: RawResponse) -> Result<Envelope<R>, ApiError> {
    match serde_json::from_str::<Envelope<R>>(&response.body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !response.is_success() => Err(ApiError::Status {
            path: path.to_string(),
            status: response.status,
        }),
        Err(source) => Err(ApiError::Decode {
            path: path.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{CollectingNotifier, Level};
    use crate::transport::MemoryTransport;
    use futures::executor::block_on;
    use serde_json::json;

    fn api() -> (GisApi<MemoryTransport, CollectingNotifier>, MemoryTransport, CollectingNotifier) {
        let transport = MemoryTransport::new();
        let notifier = CollectingNotifier::new();
        (
            GisApi::new(transport.clone(), notifier.clone()),
            transport,
            notifier,
        )
    }

    #[test]
    fn station_page_sends_filters_and_keeps_pagination() {
        let (api, transport, notifier) = api();
        transport.respond_json(
            Method::Get,
            "/gares",
            &json!({
                "success": true,
                "data": [{"id": 1, "nom": "Rabat Ville", "axe": "RABAT"}],
                "pagination": {"page": 2, "pages": 4, "total": 80, "per_page": 25}
            }),
        );
        let filter = StationFilter {
            axis: Some("RABAT".into()),
            ..StationFilter::default()
        };

        let page = block_on(api.station_page(2, 25, &filter));

        assert_eq!(page.stations.len(), 1);
        assert_eq!(page.pagination.map(|p| p.pages), Some(4));
        assert!(notifier.is_empty());
        let sent = transport.requests();
        assert_eq!(
            sent[0].query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "25".to_string()),
                ("axe".to_string(), "RABAT".to_string()),
            ]
        );
    }

    #[test]
    fn http_error_without_envelope_degrades_once() {
        let (api, transport, notifier) = api();
        transport.respond(Method::Get, "/arcs", 502, "<html>bad gateway</html>");

        assert!(block_on(api.segments()).is_empty());
        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, Level::Error);
    }

    #[test]
    fn error_status_with_envelope_uses_server_message() {
        let (api, transport, notifier) = api();
        transport.respond(
            Method::Delete,
            "/gares/9",
            404,
            json!({"success": false, "error": "Gare introuvable"}).to_string(),
        );

        let err = block_on(api.delete_station(9)).expect_err("delete must fail");
        assert_eq!(err.user_message(), "Gare introuvable");
        let seen = notifier.take();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].message.ends_with("Gare introuvable"));
    }

    #[test]
    fn invalid_payload_is_never_sent() {
        let (api, transport, notifier) = api();
        let input = StationInput::default();

        let err = block_on(api.create_station(&input)).expect_err("missing fields");
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn incident_update_uses_update_keys() {
        let (api, transport, notifier) = api();
        transport.respond_json(Method::Put, "/evenements/4", &json!({"success": true}));
        let input = IncidentInput {
            type_id: Some(2),
            localisation_id: Some(7),
            date_debut: "2024-03-01T08:00".into(),
            date_fin: None,
            description: "Signal en panne".into(),
            statut: "En cours".into(),
        };

        block_on(api.update_incident(4, &input)).expect("update succeeds");
        let body = transport.requests()[0].body.clone().expect("body sent");
        assert_eq!(body["resume"], "Signal en panne");
        assert_eq!(body["etat"], "En cours");
        assert_eq!(notifier.take()[0].level, Level::Success);
    }

    #[test]
    fn map_load_fails_per_collection() {
        let (api, transport, notifier) = api();
        transport.respond_json(
            Method::Get,
            "/gares",
            &json!({"success": true, "data": [{"id": 1, "nom": "Fes"}]}),
        );
        transport.fail(Method::Get, "/arcs", "connection reset");
        transport.respond_json(
            Method::Get,
            "/evenements",
            &json!({"success": true, "data": [{"id": 3}, {"id": 4}]}),
        );

        let data = block_on(api.load_map(348));
        assert_eq!(data.stations.len(), 1);
        assert!(data.segments.is_empty());
        assert_eq!(data.incidents.len(), 2);
        assert_eq!(notifier.len(), 1);
    }
}
