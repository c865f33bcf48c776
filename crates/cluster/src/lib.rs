//! # odactk-cluster
//!
//! 테스트 대상 Component가 실제로 배정받은 API 주소를 찾고,
//! 의존 API를 대신 제공하는 스텁 Helm 릴리스를 고릅니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`DiscoveryError`)
//! - [`resolver`]: Endpoint resolution over spec/status lists
//! - [`k8s`]: Component custom-resource access (`ComponentApi` trait, `KubeComponentApi`)
//! - [`helm`]: Rendered manifest access (`ReleaseManifests` trait, `HelmCli`)
//! - [`discovery`]: Snapshot-then-cluster endpoint discovery (`EndpointSource`)
//! - [`stub`]: First-match stub release matcher (`StubMatcher`)
//!
//! # Architecture
//!
//! ```text
//! deployment.json ──┐
//!                   ├─> EndpointDiscovery ─> resolver ─> ResolvedEndpoints
//! ComponentApi ─────┘                                        │ dependent url
//!                                                            ▼
//! ReleaseManifests ─────────────────────────────────> StubMatcher ─> ResolvedStub
//! ```

pub mod discovery;
pub mod error;
pub mod helm;
pub mod k8s;
pub mod resolver;
pub mod stub;

// --- Public API Re-exports ---

// Error
pub use error::DiscoveryError;

// Resolution
pub use resolver::{ResolvedEndpoints, resolve_dependent, resolve_endpoints, resolve_exposed};

// Collaborator seams
pub use helm::{HelmCli, ReleaseManifests};
pub use k8s::{ComponentApi, KubeComponentApi};

// Discovery
pub use discovery::{DiscoverySettings, EndpointDiscovery, EndpointSource, load_snapshot};

// Stub matching
pub use stub::{StubMatcher, StubQuery};
