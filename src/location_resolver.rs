//! Location Resolution Module
//!
//! Turns the device positioning capability into a single coordinate per
//! pipeline run. Resolution never fails: permission denial, missing fixes and
//! timeouts all fall back to [`Coordinates::FALLBACK`] with a warning.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LocationConfig;
use crate::error::LocationError;
use crate::models::Coordinates;

/// Parameters for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRequest {
    /// Upper bound on the wait for a fix
    pub timeout: Duration,
    /// A cached fix younger than this is acceptable
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for PositionRequest {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            maximum_age: Duration::from_secs(10),
            high_accuracy: true,
        }
    }
}

impl From<&LocationConfig> for PositionRequest {
    fn from(config: &LocationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds.into()),
            maximum_age: Duration::from_secs(config.maximum_age_seconds.into()),
            high_accuracy: config.high_accuracy,
        }
    }
}

/// Device positioning capability
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Ask for permission to read the position. `false` means denied.
    async fn request_permission(&self) -> bool;

    /// Obtain a fix. The resolver bounds this call by `request.timeout`.
    async fn current_position(
        &self,
        request: &PositionRequest,
    ) -> Result<Coordinates, LocationError>;
}

/// A position known up front, e.g. from the command line or the config file
#[derive(Debug, Clone, Copy)]
pub struct StaticPosition(pub Coordinates);

#[async_trait]
impl PositionProvider for StaticPosition {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        _request: &PositionRequest,
    ) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// No positioning hardware available
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePosition;

#[async_trait]
impl PositionProvider for UnavailablePosition {
    async fn request_permission(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        _request: &PositionRequest,
    ) -> Result<Coordinates, LocationError> {
        Err(LocationError::PositionUnavailable)
    }
}

/// Outcome of a resolution: always coordinates, plus a warning when they are the fallback
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub warning: Option<String>,
}

impl ResolvedLocation {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Service for resolving the device position
#[derive(Clone)]
pub struct LocationResolver {
    provider: Arc<dyn PositionProvider>,
    request: PositionRequest,
}

impl LocationResolver {
    pub fn new(provider: Arc<dyn PositionProvider>, request: PositionRequest) -> Self {
        Self { provider, request }
    }

    /// Resolve the device position, falling back to New York on any failure
    pub async fn resolve(&self) -> ResolvedLocation {
        debug!("Requesting position with {:?}", self.request);

        match self.try_resolve().await {
            Ok(coordinates) => {
                debug!("Resolved position {}", coordinates.format_coordinates());
                ResolvedLocation {
                    coordinates,
                    warning: None,
                }
            }
            Err(err) => {
                let warning = format!("Unable to get location: {err}");
                warn!(
                    "{}. Using fallback location {}",
                    warning,
                    Coordinates::FALLBACK.format_coordinates()
                );
                ResolvedLocation {
                    coordinates: Coordinates::FALLBACK,
                    warning: Some(warning),
                }
            }
        }
    }

    async fn try_resolve(&self) -> Result<Coordinates, LocationError> {
        if !self.provider.request_permission().await {
            return Err(LocationError::PermissionDenied);
        }

        let fix = tokio::time::timeout(
            self.request.timeout,
            self.provider.current_position(&self.request),
        )
        .await
        .map_err(|_| LocationError::PositionTimeout)??;

        if fix.is_valid() {
            Ok(fix)
        } else {
            debug!("Discarding invalid fix ({}, {})", fix.latitude, fix.longitude);
            Err(LocationError::PositionUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DeniedPosition {
        fix_requests: AtomicUsize,
    }

    #[async_trait]
    impl PositionProvider for DeniedPosition {
        async fn request_permission(&self) -> bool {
            false
        }

        async fn current_position(
            &self,
            _request: &PositionRequest,
        ) -> Result<Coordinates, LocationError> {
            self.fix_requests.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinates::new(1.0, 1.0))
        }
    }

    struct HangingPosition;

    #[async_trait]
    impl PositionProvider for HangingPosition {
        async fn request_permission(&self) -> bool {
            true
        }

        async fn current_position(
            &self,
            _request: &PositionRequest,
        ) -> Result<Coordinates, LocationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Coordinates::new(1.0, 1.0))
        }
    }

    fn resolver(provider: impl PositionProvider + 'static) -> LocationResolver {
        LocationResolver::new(
            Arc::new(provider),
            PositionRequest {
                timeout: Duration::from_millis(50),
                ..PositionRequest::default()
            },
        )
    }

    #[tokio::test]
    async fn test_static_position() {
        let coords = Coordinates::new(48.1374, 11.5755);
        let resolved = resolver(StaticPosition(coords)).resolve().await;
        assert_eq!(resolved.coordinates, coords);
        assert!(!resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_permission_denied_falls_back_to_new_york() {
        let provider = Arc::new(DeniedPosition {
            fix_requests: AtomicUsize::new(0),
        });
        let resolved = LocationResolver::new(provider.clone(), PositionRequest::default())
            .resolve()
            .await;

        assert_eq!(resolved.coordinates.latitude, 40.7128);
        assert_eq!(resolved.coordinates.longitude, -74.0060);
        assert_eq!(
            resolved.warning.as_deref(),
            Some("Unable to get location: Location permission denied")
        );
        assert_eq!(provider.fix_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_falls_back() {
        let resolved = resolver(UnavailablePosition).resolve().await;
        assert_eq!(resolved.coordinates, Coordinates::FALLBACK);
        assert_eq!(
            resolved.warning.as_deref(),
            Some("Unable to get location: Location unavailable")
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let resolved = resolver(HangingPosition).resolve().await;
        assert_eq!(resolved.coordinates, Coordinates::FALLBACK);
        assert_eq!(
            resolved.warning.as_deref(),
            Some("Unable to get location: Location request timeout")
        );
    }

    #[tokio::test]
    async fn test_invalid_fix_falls_back() {
        let resolved = resolver(StaticPosition(Coordinates::new(f64::NAN, 2.0)))
            .resolve()
            .await;
        assert!(resolved.is_fallback());
        assert_eq!(resolved.coordinates, Coordinates::FALLBACK);
    }

    #[test]
    fn test_request_from_config() {
        let request = PositionRequest::from(&LocationConfig::default());
        assert_eq!(request, PositionRequest::default());
    }
}
