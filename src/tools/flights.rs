use super::{serpapi::SerpApiClient, tool::ToolFuture, Tool};
use crate::{
    schemas::{decode_arguments, params_schema},
    AgentError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ORIGIN: &str = "JFK";
pub const DEFAULT_MAX_RESULTS: usize = 5;
const CURRENCY: &str = "USD";

/// Parameters for one-way flight searches
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct FlightSearchParams {
    /// Destination airport IATA code, e.g. "CDG"
    pub destination: String,
    /// Departure date as YYYY-MM-DD
    pub date: String,
    /// Origin airport IATA code
    #[serde(default)]
    pub origin: Option<String>,
}

/// One bookable itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub airline: String,
    pub flight_number: String,
    pub departure_airport: String,
    pub departure_time: String,
    pub arrival_airport: String,
    pub arrival_time: String,
    pub stops: usize,
    pub duration_minutes: Option<u64>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FlightsResponse {
    #[serde(default)]
    best_flights: Vec<Itinerary>,
    #[serde(default)]
    other_flights: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    flights: Vec<FlightLeg>,
    total_duration: Option<u64>,
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FlightLeg {
    departure_airport: AirportTime,
    arrival_airport: AirportTime,
    #[serde(default)]
    airline: String,
    #[serde(default)]
    flight_number: String,
}

#[derive(Debug, Deserialize)]
struct AirportTime {
    #[serde(default)]
    id: String,
    #[serde(default)]
    time: String,
}

impl Itinerary {
    fn into_record(self) -> Option<FlightRecord> {
        let stops = self.flights.len().checked_sub(1)?;
        let mut legs = self.flights.into_iter();
        let first = legs.next()?;
        let last = legs.last();

        let (arrival_airport, arrival_time) = match &last {
            Some(leg) => (leg.arrival_airport.id.clone(), leg.arrival_airport.time.clone()),
            None => (first.arrival_airport.id.clone(), first.arrival_airport.time.clone()),
        };

        Some(FlightRecord {
            airline: first.airline,
            flight_number: first.flight_number,
            departure_airport: first.departure_airport.id,
            departure_time: first.departure_airport.time,
            arrival_airport,
            arrival_time,
            stops,
            duration_minutes: self.total_duration,
            price: self.price,
        })
    }
}

/// One-way flight search through SerpApi's Google Flights engine
#[derive(Debug, Clone)]
pub struct FlightSearchTool {
    serpapi: SerpApiClient,
    default_origin: String,
    max_results: usize,
}

impl FlightSearchTool {
    pub fn new(serpapi: SerpApiClient) -> Self {
        Self {
            serpapi,
            default_origin: DEFAULT_ORIGIN.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_default_origin(mut self, origin: impl Into<String>) -> Self {
        self.default_origin = origin.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    async fn search(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
    ) -> Result<Vec<FlightRecord>, AgentError> {
        let body = self
            .serpapi
            .search(
                "google_flights",
                &[
                    ("departure_id", origin.to_string()),
                    ("arrival_id", destination.to_string()),
                    ("outbound_date", date.format("%Y-%m-%d").to_string()),
                    // one-way
                    ("type", "2".to_string()),
                    ("currency", CURRENCY.to_string()),
                    ("hl", "en".to_string()),
                ],
            )
            .await?;

        let response: FlightsResponse = serde_json::from_value(body).map_err(|err| {
            AgentError::ToolExecution(format!("Unexpected flights payload: {}", err))
        })?;

        Ok(response
            .best_flights
            .into_iter()
            .chain(response.other_flights)
            .filter_map(Itinerary::into_record)
            .take(self.max_results)
            .collect())
    }
}

impl Tool for FlightSearchTool {
    fn name(&self) -> &'static str {
        "search_flights"
    }

    fn description(&self) -> &'static str {
        "Searches one-way flights to a destination airport on a given date. Airports are IATA codes; the origin is optional."
    }

    fn return_format(&self) -> &'static str {
        "Optional[List[Dict[str, Any]]]: Flight options with airline, flight_number, departure/arrival airport and time, stops, duration_minutes and price, or None if the search failed"
    }

    fn parameters_schema(&self) -> Value {
        params_schema::<FlightSearchParams>()
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: FlightSearchParams = decode_arguments(self.name(), parameters)?;

            let date = NaiveDate::parse_from_str(params.date.trim(), "%Y-%m-%d").map_err(|err| {
                AgentError::ToolExecution(format!(
                    "Invalid date {:?}, expected YYYY-MM-DD: {}",
                    params.date, err
                ))
            })?;
            let destination = params.destination.trim().to_uppercase();
            let origin = params
                .origin
                .as_deref()
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .unwrap_or(self.default_origin.as_str())
                .to_uppercase();

            let flights = self.search(&origin, &destination, date).await?;
            serde_json::to_value(flights).map_err(|e| {
                AgentError::ToolExecution(format!("Failed to serialize result: {}", e))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_itinerary_with_connection() {
        let itinerary: Itinerary = serde_json::from_value(json!({
            "flights": [
                {
                    "departure_airport": {"name": "JFK", "id": "JFK", "time": "2025-06-01 08:00"},
                    "arrival_airport": {"name": "Dublin", "id": "DUB", "time": "2025-06-01 19:40"},
                    "airline": "Aer Lingus",
                    "flight_number": "EI 104"
                },
                {
                    "departure_airport": {"name": "Dublin", "id": "DUB", "time": "2025-06-01 21:00"},
                    "arrival_airport": {"name": "Paris", "id": "CDG", "time": "2025-06-01 23:35"},
                    "airline": "Aer Lingus",
                    "flight_number": "EI 526"
                }
            ],
            "total_duration": 755,
            "price": 612
        }))
        .unwrap();

        let record = itinerary.into_record().unwrap();
        assert_eq!(record.flight_number, "EI 104");
        assert_eq!(record.departure_airport, "JFK");
        assert_eq!(record.arrival_airport, "CDG");
        assert_eq!(record.arrival_time, "2025-06-01 23:35");
        assert_eq!(record.stops, 1);
        assert_eq!(record.duration_minutes, Some(755));
        assert_eq!(record.price, Some(612.0));
    }

    #[test]
    fn test_itinerary_without_legs_is_skipped() {
        let itinerary = Itinerary {
            flights: Vec::new(),
            total_duration: None,
            price: None,
        };
        assert!(itinerary.into_record().is_none());
    }
}
