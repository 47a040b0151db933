//! Connector selection by server type.

use super::{
    ARTIFACTORY_ID, ArtifactoryConnector, Connector, ConnectorContext, FallbackConnector,
    NEXUS_ID, NexusConnector,
};

/// Server types with a real connector
pub const KNOWN_SERVER_TYPES: &[&str] = &[ARTIFACTORY_ID, NEXUS_ID];

/// Server type as matched against connector ids: trimmed and lowercased.
pub fn canonical_server_type(server_type: &str) -> String {
    server_type.trim().to_ascii_lowercase()
}

/// Get the connector for a server type.
///
/// Matching is case-insensitive after trimming. Unknown types get the
/// [`FallbackConnector`], which yields no entries.
pub fn select_connector(server_type: &str, context: ConnectorContext) -> Box<dyn Connector> {
    let server_type = canonical_server_type(server_type);
    match server_type.as_str() {
        ARTIFACTORY_ID => Box::new(ArtifactoryConnector::new(context)),
        NEXUS_ID => Box::new(NexusConnector::new(context)),
        other => {
            tracing::warn!(server_type = %other, "Unknown server type, no results will be returned");
            Box::new(FallbackConnector::new())
        }
    }
}
