//! Import helpers for simplifying resource import implementations

use crate::context::Context;
use crate::error::{Result, TfplugError};
use crate::resource::{ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource};
use crate::types::{AttributePath, Diagnostic, DynamicValue};

/// Sets the import ID to a specific attribute in state
///
/// Useful when the import ID maps directly to a single attribute, for
/// example a mesh imported by name: ID "demo" -> state.id = "demo".
pub fn import_state_passthrough_id(
    _ctx: &Context,
    attr_path: AttributePath,
    request: &ImportResourceStateRequest,
    response: &mut ImportResourceStateResponse,
) {
    let mut state = DynamicValue::null();

    if let Err(e) = state.set_string(&attr_path, request.id.clone()) {
        response.diagnostics.push(
            Diagnostic::error(
                format!("Failed to set import ID: {}", e),
                format!(
                    "Could not set attribute '{}' to value '{}'",
                    attr_path, request.id
                ),
            )
            .with_attribute(attr_path),
        );
        return;
    }

    response.imported_resources.push(ImportedResource {
        type_name: request.type_name.clone(),
        state,
        private: Vec::new(),
        identity: request.identity.clone(),
    });
}

/// Splits a composite import ID such as `mesh-name/virtual-node-name`
///
/// `format` is echoed back in the error so users see the expected shape.
pub fn parse_import_id(id: &str, parts: usize, format: &str) -> Result<Vec<String>> {
    let segments: Vec<&str> = id.split('/').collect();

    if segments.len() != parts || segments.iter().any(|s| s.is_empty()) {
        return Err(TfplugError::ImportFailed(format!(
            "wrong format of import ID ({}), use: '{}'",
            id, format
        )));
    }

    Ok(segments.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientCapabilities;

    fn import_request(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "aws_appmesh_mesh".to_string(),
            id: id.to_string(),
            client_capabilities: ClientCapabilities {
                deferral_allowed: false,
                write_only_attributes_allowed: false,
            },
            identity: None,
        }
    }

    #[test]
    fn passthrough_sets_attribute() {
        let request = import_request("demo");
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };

        import_state_passthrough_id(&Context::new(), AttributePath::new("id"), &request, &mut response);

        assert!(response.diagnostics.is_empty());
        assert_eq!(response.imported_resources.len(), 1);
        assert_eq!(
            response.imported_resources[0]
                .state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "demo"
        );
    }

    #[test]
    fn parse_import_id_splits_parts() {
        let parts = parse_import_id("mesh/router/route", 3, "mesh/router/route").unwrap();
        assert_eq!(parts, vec!["mesh", "router", "route"]);
    }

    #[test]
    fn parse_import_id_rejects_wrong_shape() {
        let err = parse_import_id("mesh-only", 2, "mesh-name/virtual-node-name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid import ID: wrong format of import ID (mesh-only), use: 'mesh-name/virtual-node-name'"
        );

        assert!(parse_import_id("mesh/", 2, "mesh-name/name").is_err());
    }
}
