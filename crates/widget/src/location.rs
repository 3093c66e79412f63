//! Device location acquisition.
//!
//! A request is a single suspension point: the host either produces a fix
//! or rejects with a numeric code. Requests are never cancelled. Each one
//! takes a [`LocationTicket`] instead, and its result is only applied while
//! that ticket is still current. Starting a newer request, switching
//! location method or submitting moves the generation on, so a stale
//! request that resolves late is dropped.

use crate::error::LocationError;
use fixmap_core::config::GeolocationConfig;
use fixmap_geo::Coordinate;
use std::time::Duration;

/// Options forwarded to the host with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    /// Ask for the most accurate fix the device can give
    pub high_accuracy: bool,
    /// Upper bound on the request
    pub timeout: Duration,
    /// Oldest cached fix the host may return
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::from(&GeolocationConfig::default())
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: config.timeout(),
            maximum_age: config.maximum_age(),
        }
    }
}

/// Rejection reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionError {
    /// 1 = permission denied, 2 = position unavailable, 3 = timeout
    pub code: u16,
    /// Host-provided detail, for logs only
    pub message: String,
}

impl PositionError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<PositionError> for LocationError {
    fn from(err: PositionError) -> Self {
        LocationError::from_code(err.code)
    }
}

/// Host geolocation capability.
#[allow(async_fn_in_trait)]
pub trait GeolocationProvider {
    /// Whether the host can locate the device at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Resolves once with a fix or a rejection.
    ///
    /// Implementors must enforce `options.timeout` and reject with code 3
    /// once it elapses. [`LocationAcquirer`] adds no timer of its own, so
    /// this is the only bound on how long a request stays pending.
    async fn request_current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, PositionError>;
}

/// Snapshot of the request generation taken when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationTicket {
    generation: u64,
}

/// Wraps a provider with configured options and the generation counter.
#[derive(Debug, Clone)]
pub struct LocationAcquirer<G> {
    provider: G,
    options: PositionOptions,
    generation: u64,
}

impl<G: GeolocationProvider> LocationAcquirer<G> {
    pub fn new(provider: G, options: PositionOptions) -> Self {
        Self {
            provider,
            options,
            generation: 0,
        }
    }

    /// Starts a request, superseding any request still in flight.
    pub fn begin(&mut self) -> LocationTicket {
        self.generation += 1;
        LocationTicket {
            generation: self.generation,
        }
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Whether a result for `ticket` may still be applied.
    pub fn is_current(&self, ticket: LocationTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Consumes `ticket` if it is current; later calls with it return false.
    pub fn settle(&mut self, ticket: LocationTicket) -> bool {
        if self.is_current(ticket) {
            self.invalidate();
            true
        } else {
            false
        }
    }

    /// Asks the host for a fresh fix with the configured options.
    pub async fn acquire(&self) -> Result<Coordinate, LocationError> {
        if !self.provider.is_supported() {
            return Err(LocationError::Unsupported);
        }
        self.provider
            .request_current_position(&self.options)
            .await
            .map_err(|err| {
                tracing::debug!(code = err.code, message = %err.message, "Geolocation rejected");
                LocationError::from(err)
            })
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    pub fn provider(&self) -> &G {
        &self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Coordinate, PositionError>);

    impl GeolocationProvider for Fixed {
        async fn request_current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, PositionError> {
            self.0.clone()
        }
    }

    struct Absent;

    impl GeolocationProvider for Absent {
        fn is_supported(&self) -> bool {
            false
        }

        async fn request_current_position(
            &self,
            _options: &PositionOptions,
        ) -> Result<Coordinate, PositionError> {
            unreachable!("unsupported hosts are never asked")
        }
    }

    /// Host that needs `fix_after` to find the device and gives up at the
    /// requested timeout.
    struct Slow {
        fix_after: Duration,
    }

    impl GeolocationProvider for Slow {
        async fn request_current_position(
            &self,
            options: &PositionOptions,
        ) -> Result<Coordinate, PositionError> {
            if self.fix_after > options.timeout {
                Err(PositionError::new(3, "timeout expired"))
            } else {
                Ok(Coordinate::new(1.0, 2.0))
            }
        }
    }

    #[test]
    fn test_provider_enforces_configured_timeout() {
        let slow = || Slow {
            fix_after: Duration::from_secs(30),
        };

        let acquirer = LocationAcquirer::new(slow(), PositionOptions::default());
        assert_eq!(tokio_test::block_on(acquirer.acquire()), Err(LocationError::Timeout));

        let patient = PositionOptions {
            timeout: Duration::from_secs(60),
            ..PositionOptions::default()
        };
        let acquirer = LocationAcquirer::new(slow(), patient);
        assert_eq!(
            tokio_test::block_on(acquirer.acquire()),
            Ok(Coordinate::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_default_options_force_fresh_fix() {
        let options = PositionOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert_eq!(options.maximum_age, Duration::ZERO);
    }

    #[test]
    fn test_acquire_success() {
        let acquirer = LocationAcquirer::new(
            Fixed(Ok(Coordinate::new(8.36, 124.86))),
            PositionOptions::default(),
        );
        let coord = tokio_test::block_on(acquirer.acquire()).unwrap();
        assert_eq!(coord, Coordinate::new(8.36, 124.86));
    }

    #[test]
    fn test_acquire_maps_host_codes() {
        for (code, expected) in [
            (1, LocationError::PermissionDenied),
            (2, LocationError::PositionUnavailable),
            (3, LocationError::Timeout),
        ] {
            let acquirer = LocationAcquirer::new(
                Fixed(Err(PositionError::new(code, "host"))),
                PositionOptions::default(),
            );
            assert_eq!(tokio_test::block_on(acquirer.acquire()), Err(expected));
        }
    }

    #[test]
    fn test_unsupported_host() {
        let acquirer = LocationAcquirer::new(Absent, PositionOptions::default());
        assert_eq!(
            tokio_test::block_on(acquirer.acquire()),
            Err(LocationError::Unsupported)
        );
    }

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let mut acquirer = LocationAcquirer::new(Absent, PositionOptions::default());
        let first = acquirer.begin();
        let second = acquirer.begin();
        assert!(!acquirer.is_current(first));
        assert!(acquirer.is_current(second));
    }

    #[test]
    fn test_settle_consumes_ticket() {
        let mut acquirer = LocationAcquirer::new(Absent, PositionOptions::default());
        let ticket = acquirer.begin();
        assert!(acquirer.settle(ticket));
        assert!(!acquirer.settle(ticket));
    }

    #[test]
    fn test_invalidate_drops_in_flight() {
        let mut acquirer = LocationAcquirer::new(Absent, PositionOptions::default());
        let ticket = acquirer.begin();
        acquirer.invalidate();
        assert!(!acquirer.settle(ticket));
    }
}
