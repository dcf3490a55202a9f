//! Domain ports and supporting types.
//!
//! Adapters implement these traits; services depend only on them.

mod api_gateway;
mod health_probe;
mod navigator;
mod session_store;

#[cfg(test)]
pub use api_gateway::MockApiGateway;
pub use api_gateway::{
    ApiGateway, ApiGatewayExt, HttpMethod, RequestOptions, UnsupportedMethodError,
};
#[cfg(test)]
pub use health_probe::MockHealthProbe;
pub use health_probe::{FixtureHealthProbe, HealthProbe, HealthReport};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::{Navigator, RecordingNavigator};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{
    DetachedSessionStore, InMemorySessionStore, SessionStore, SessionStoreError,
};
