//! Route Catalog
//!
//! Source of `RouteProfile`s. Ships with the five demo routes; a JSON
//! array of profiles can replace them at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{RouteProfile, RouteStatus, TransportType};

#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    routes: BTreeMap<String, RouteProfile>,
}

impl RouteCatalog {
    /// Build from profiles. Later duplicates replace earlier ones.
    pub fn from_routes(routes: impl IntoIterator<Item = RouteProfile>) -> Self {
        Self {
            routes: routes.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Parse a JSON array of profiles
    pub fn from_json(json: &str) -> AppResult<Self> {
        let routes: Vec<RouteProfile> = serde_json::from_str(json)?;
        for route in &routes {
            validate_route(route)?;
        }
        Ok(Self::from_routes(routes))
    }

    pub fn from_json_file(path: &Path) -> AppResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::CatalogLoadFailed,
                format!("Cannot read route catalog {}", path.display()),
                e,
            )
        })?;
        let catalog = Self::from_json(&json)?;
        info!("🗺️ Loaded {} routes from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The built-in demo catalog (RT001-RT005)
    pub fn demo() -> Self {
        Self::from_routes([
            demo_route(
                "RT001",
                "Seattle, WA",
                "Portland, OR",
                TransportType::Truck,
                280.0,
                "Fresh Produce",
                RouteStatus::InTransit,
                4.5,
            ),
            demo_route(
                "RT002",
                "Los Angeles, CA",
                "San Francisco, CA",
                TransportType::Truck,
                615.0,
                "Organic Grains",
                RouteStatus::Completed,
                8.2,
            ),
            demo_route(
                "RT003",
                "Miami, FL",
                "Atlanta, GA",
                TransportType::Truck,
                660.0,
                "Dairy Products",
                RouteStatus::Delayed,
                9.5,
            ),
            demo_route(
                "RT004",
                "Long Beach, CA",
                "Seattle, WA",
                TransportType::Ship,
                1850.0,
                "Import Goods",
                RouteStatus::InTransit,
                32.0,
            ),
            demo_route(
                "RT005",
                "Chicago, IL",
                "New York, NY",
                TransportType::Rail,
                1280.0,
                "Packaged Foods",
                RouteStatus::Scheduled,
                18.5,
            ),
        ])
    }

    pub fn get(&self, route_id: &str) -> Option<&RouteProfile> {
        self.routes.get(route_id)
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.routes.contains_key(route_id)
    }

    /// Profiles in id order
    pub fn routes(&self) -> impl Iterator<Item = &RouteProfile> {
        self.routes.values()
    }

    pub fn ids(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn validate_route(route: &RouteProfile) -> AppResult<()> {
    if route.id.trim().is_empty() {
        return Err(AppError::new(
            ErrorCode::CatalogLoadFailed,
            "Route with empty id",
        ));
    }
    let distance_ok = route.distance_km.is_finite() && route.distance_km >= 0.0;
    let duration_ok =
        route.estimated_duration_hours.is_finite() && route.estimated_duration_hours >= 0.0;
    if !distance_ok || !duration_ok {
        return Err(AppError::new(
            ErrorCode::CatalogLoadFailed,
            format!("Route {} has negative or non-finite distance/duration", route.id),
        ));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn demo_route(
    id: &str,
    source: &str,
    destination: &str,
    transport_type: TransportType,
    distance_km: f64,
    cargo_category: &str,
    status: RouteStatus,
    estimated_duration_hours: f64,
) -> RouteProfile {
    RouteProfile {
        id: id.to_string(),
        source: source.to_string(),
        destination: destination.to_string(),
        transport_type,
        distance_km,
        cargo_category: cargo_category.to_string(),
        status,
        estimated_duration_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog() {
        let catalog = RouteCatalog::demo();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.ids(), ["RT001", "RT002", "RT003", "RT004", "RT005"]);
        let rt004 = catalog.get("RT004").unwrap();
        assert_eq!(rt004.transport_type, TransportType::Ship);
        assert_eq!(rt004.distance_km, 1850.0);
        assert!(catalog.get("RT999").is_none());
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{
            "id": "CUSTOM-1",
            "source": "Oslo",
            "destination": "Bergen",
            "transport_type": "rail",
            "distance_km": 463.0,
            "cargo_category": "Fresh Produce",
            "status": "in-transit",
            "estimated_duration_hours": 7.0
        }]"#;
        let catalog = RouteCatalog::from_json(json).unwrap();
        assert!(catalog.contains("CUSTOM-1"));
        assert_eq!(catalog.get("CUSTOM-1").unwrap().status, RouteStatus::InTransit);
    }

    #[test]
    fn test_from_json_rejects_negative_distance() {
        let json = r#"[{
            "id": "BAD",
            "source": "A",
            "destination": "B",
            "transport_type": "truck",
            "distance_km": -1.0,
            "cargo_category": "Goods",
            "status": "scheduled",
            "estimated_duration_hours": 1.0
        }]"#;
        let err = RouteCatalog::from_json(json).unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogLoadFailed);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = RouteCatalog::from_json("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::CatalogLoadFailed);
    }
}
