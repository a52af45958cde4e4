//! Identity binding: token → user → workspace.

use si_protocol::{WhoamiResponse, WorkspaceId};
use std::fmt;

use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, Transport};

pub const WHOAMI_PATH: &str = "/whoami";

/// Who the token belongs to and which workspace it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub user_email: String,
    pub workspace_id: WorkspaceId,
    pub role: String,
}

impl From<WhoamiResponse> for Session {
    fn from(whoami: WhoamiResponse) -> Self {
        Self {
            user_id: whoami.user_id,
            user_email: whoami.user_email,
            workspace_id: whoami.workspace_id,
            role: whoami.token.role,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "User ID: {}", self.user_id)?;
        writeln!(f, "User Email: {}", self.user_email)?;
        writeln!(f, "Workspace ID: {}", self.workspace_id)?;
        write!(f, "Role: {}", self.role)
    }
}

/// Call the identity endpoint and build a [`Session`].
///
/// Any non-success status is an [`ClientError::Authentication`] carrying the
/// status code and body text.
pub fn create_session<T: Transport + ?Sized>(transport: &T) -> Result<Session> {
    tracing::debug!("Checking identity via {}", WHOAMI_PATH);
    let response = transport.send(&ApiRequest::get(WHOAMI_PATH))?;
    if !response.is_success() {
        return Err(ClientError::Authentication {
            status: response.status,
            body: response.body,
        });
    }
    let whoami: WhoamiResponse = response.decode("check identity")?;
    let session = Session::from(whoami);
    tracing::info!(
        workspace = %session.workspace_id,
        user = %session.user_email,
        "Session established"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::ApiResponse;

    #[test]
    fn test_session_from_whoami() {
        let mock = MockTransport::authenticated("ws-42");
        let session = create_session(&mock).unwrap();
        assert_eq!(session.workspace_id.as_str(), "ws-42");
        assert_eq!(session.role, "owner");
        assert_eq!(mock.requests()[0].path, "/whoami");

        let text = session.to_string();
        assert!(text.contains("User Email: dev@example.test"));
        assert!(text.contains("Workspace ID: ws-42"));
    }

    #[test]
    fn test_rejected_token_carries_status_and_body() {
        let mock = MockTransport::new();
        mock.queue_response(ApiResponse::new(401, "invalid token"));
        let err = create_session(&mock).unwrap_err();
        match err {
            ClientError::Authentication { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_whoami_is_decode_error() {
        let mock = MockTransport::new();
        mock.queue_response(ApiResponse::new(200, r#"{"userId":"u"}"#));
        assert!(matches!(
            create_session(&mock),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn test_empty_workspace_id_is_decode_error() {
        let mock = MockTransport::authenticated("");
        assert!(matches!(
            create_session(&mock),
            Err(ClientError::Decode { .. })
        ));
    }
}
