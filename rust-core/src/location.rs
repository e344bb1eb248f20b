//! Map centre resolution from an external location capability.
//!
//! The location fix is only used to centre the session map. Failures are
//! reported once through a blocking notice and the map falls back to a fixed
//! default region. Nothing here retries.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LocationError;
use crate::types::{Coordinate, PermissionStatus};

/// Centre used when no user position is available.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 37.78825,
    longitude: -122.4324,
};

/// Span of the visible map in degrees.
pub const DEFAULT_SPAN_DEG: f64 = 0.01;

/// External geolocation capability.
pub trait LocationProvider {
    /// Ask for foreground location permission.
    fn request_permission(&self) -> Result<PermissionStatus, LocationError>;

    /// Fetch the current high-accuracy position.
    fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Visible map area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn around(center: Coordinate) -> Self {
        Self {
            center,
            latitude_delta: DEFAULT_SPAN_DEG,
            longitude_delta: DEFAULT_SPAN_DEG,
        }
    }
}

impl Default for MapRegion {
    fn default() -> Self {
        Self::around(DEFAULT_CENTER)
    }
}

/// Blocking notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub title: String,
    pub message: String,
}

impl UserNotice {
    fn permission_required() -> Self {
        Self {
            title: "Location Permission Required".into(),
            message: "This app needs location access to show your position on the map.".into(),
        }
    }

    fn location_error() -> Self {
        Self {
            title: "Location Error".into(),
            message: "Unable to get your location. Please check your location settings.".into(),
        }
    }
}

/// Everything the map view needs to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub region: MapRegion,
    /// Whether the user location dot is drawn. Follows the permission grant,
    /// so it stays on when the fix itself failed.
    pub shows_user_location: bool,
    pub notice: Option<UserNotice>,
}

impl MapView {
    fn fallback(region: MapRegion, granted: bool, notice: UserNotice) -> Self {
        Self {
            region,
            shows_user_location: granted,
            notice: Some(notice),
        }
    }
}

/// Resolve the map view using the built-in default centre as fallback.
pub fn resolve_map_view<P: LocationProvider + ?Sized>(provider: &P) -> MapView {
    resolve_map_view_with_default(provider, MapRegion::default())
}

/// Resolve the map view, falling back to `default_region` on any failure.
pub fn resolve_map_view_with_default<P: LocationProvider + ?Sized>(
    provider: &P,
    default_region: MapRegion,
) -> MapView {
    let status = match provider.request_permission() {
        Ok(status) => status,
        Err(err) => {
            warn!(error = %err, "location permission request failed");
            return MapView::fallback(default_region, false, UserNotice::location_error());
        }
    };

    if !status.is_granted() {
        info!(?status, "location permission not granted");
        return MapView::fallback(default_region, false, UserNotice::permission_required());
    }

    match provider.current_position() {
        Ok(center) => MapView {
            region: MapRegion::around(center),
            shows_user_location: true,
            notice: None,
        },
        Err(err) => {
            warn!(error = %err, "error getting location");
            MapView::fallback(default_region, true, UserNotice::location_error())
        }
    }
}
