//! `SiClient`: session-bound operations against one workspace.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use si_ids::{ChangeSetId, ComponentId, FuncId, JobStateId, SchemaId, SchemaVariantId};
use si_protocol::{
    ChangeSetSummary, ClientConfig, CreateChangeSetRequest, CreateChangeSetResponse,
    CreateSchemaRequest, CreateSchemaResponse, CreateVariantFuncRequest,
    CreateVariantFuncResponse, ExecuteManagementFunctionRequest,
    ExecuteManagementFunctionResponse, FuncDetail, FuncRole, ListChangeSetsResponse,
    SchemaDetail, SchemaVariantDefault, SearchSchemasRequest, SearchSchemasResponse,
    UpdateSchemaVariantRequest,
};

use crate::error::{ClientError, Result};
use crate::session::{create_session, Session};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// HTTP status the service uses while schema data is still being generated.
const SCHEMA_GENERATING_STATUS_CODE: u16 = 202;

/// API client bound to a session and at most one active change set.
pub struct SiClient<T: Transport = HttpTransport> {
    transport: T,
    session: Session,
    change_set_id: Option<ChangeSetId>,
}

impl SiClient<HttpTransport> {
    /// Connect over HTTP and establish a session.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        tracing::info!("Connecting to {}", config.base_url());
        let transport = HttpTransport::new(config)?;
        Self::with_transport(transport)
    }
}

impl<T: Transport> SiClient<T> {
    /// Establish a session over `transport`; fails if identity cannot be
    /// confirmed.
    pub fn with_transport(transport: T) -> Result<Self> {
        let session = create_session(&transport)?;
        Ok(Self {
            transport,
            session,
            change_set_id: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The active change set, if one has been created or selected.
    pub fn change_set_id(&self) -> Option<&ChangeSetId> {
        self.change_set_id.as_ref()
    }

    /// Select an existing change set without looking it up.
    pub fn use_change_set(&mut self, id: ChangeSetId) {
        tracing::debug!(change_set = %id, "Using change set");
        self.change_set_id = Some(id);
    }

    // ------------------------------------------------------------------
    // Change sets
    // ------------------------------------------------------------------

    /// Create a change set and make it the active one.
    pub fn create_change_set(&mut self, name: &str) -> Result<ChangeSetId> {
        let body = to_body(&CreateChangeSetRequest {
            change_set_name: name.to_string(),
        })?;
        let created: CreateChangeSetResponse = self.execute(
            "create change set",
            ApiRequest::post(self.workspace_path("change-sets"), body),
        )?;
        let id = created.change_set.id;
        tracing::info!(change_set = %id, "Created change set '{}'", name);
        self.change_set_id = Some(id.clone());
        Ok(id)
    }

    pub fn list_change_sets(&self) -> Result<Vec<ChangeSetSummary>> {
        let list: ListChangeSetsResponse = self.execute(
            "list change sets",
            ApiRequest::get(self.workspace_path("change-sets")),
        )?;
        Ok(list.change_sets)
    }

    /// First change set whose name matches exactly (case-sensitive).
    pub fn find_change_set_by_name(&self, name: &str) -> Result<Option<ChangeSetId>> {
        let list = ListChangeSetsResponse {
            change_sets: self.list_change_sets()?,
        };
        Ok(list.find_by_name(name).map(|cs| cs.id.clone()))
    }

    /// Reuse the change set called `name` or create it; either way it
    /// becomes the active one.
    pub fn create_or_use_change_set(&mut self, name: &str) -> Result<ChangeSetId> {
        match self.find_change_set_by_name(name)? {
            Some(existing) => {
                tracing::info!(change_set = %existing, "Using existing change set '{}'", name);
                self.change_set_id = Some(existing.clone());
                Ok(existing)
            }
            None => self.create_change_set(name),
        }
    }

    pub fn delete_change_set(&mut self, id: &ChangeSetId) -> Result<()> {
        self.execute_unit(
            "delete change set",
            ApiRequest::delete(self.workspace_path(&format!("change-sets/{}", id))),
        )?;
        if self.change_set_id.as_ref() == Some(id) {
            self.change_set_id = None;
        }
        tracing::info!(change_set = %id, "Deleted change set");
        Ok(())
    }

    /// Delete the active change set, or the one called `name` when none is
    /// active. Returns the id that was deleted, `None` if `name` matched
    /// nothing.
    pub fn abandon_change_set(&mut self, name: Option<&str>) -> Result<Option<ChangeSetId>> {
        let target = match (&self.change_set_id, name) {
            (Some(active), _) => Some(active.clone()),
            (None, Some(name)) => self.find_change_set_by_name(name)?,
            (None, None) => {
                return Err(ClientError::Precondition {
                    operation: "abandon change set",
                    reason: "no change set created and also no name provided",
                })
            }
        };
        if let Some(id) = &target {
            self.delete_change_set(id)?;
        }
        Ok(target)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub fn create_component(&self, component_data: &Value) -> Result<Value> {
        let path = self.scoped_path("create component", "components")?;
        self.execute(
            "create component",
            ApiRequest::post(path, component_data.clone()),
        )
    }

    /// Start a management function; returns the job-state id without
    /// waiting for the job.
    pub fn execute_management_function(
        &self,
        component_id: &ComponentId,
        management_function_name: &str,
    ) -> Result<JobStateId> {
        let path = self.scoped_path(
            "execute management function",
            &format!("components/{}/execute-management-function", component_id),
        )?;
        let body = to_body(&ExecuteManagementFunctionRequest::named(
            management_function_name,
        ))?;
        let started: ExecuteManagementFunctionResponse =
            self.execute("execute management function", ApiRequest::post(path, body))?;
        Ok(started.management_func_job_state_id)
    }

    /// One-shot fetch of a management job's current state and logs.
    pub fn get_logs(&self, job_state_id: &JobStateId) -> Result<Value> {
        let path = self.scoped_path("get logs", &format!("management-funcs/{}", job_state_id))?;
        self.execute("get logs", ApiRequest::get(path))
    }

    // ------------------------------------------------------------------
    // Schemas and funcs
    // ------------------------------------------------------------------

    pub fn search_schemas(&self, category: Option<&str>) -> Result<SearchSchemasResponse> {
        let path = self.scoped_path("search schemas", "schemas/search")?;
        let body = to_body(&SearchSchemasRequest {
            category: category.map(str::to_string),
        })?;
        self.execute("search schemas", ApiRequest::post(path, body))
    }

    pub fn get_schema(&self, schema_id: &SchemaId) -> Result<SchemaDetail> {
        let path = self.scoped_path("get schema", &format!("schemas/{}", schema_id))?;
        let response = self.send(&ApiRequest::get(path))?;
        if response.status == SCHEMA_GENERATING_STATUS_CODE {
            tracing::info!(schema = %schema_id, "Schema data is still being generated");
            return Ok(SchemaDetail::generating());
        }
        let value = check(response, "get schema")?.decode("get schema")?;
        Ok(SchemaDetail::Ready(value))
    }

    pub fn get_schema_variant_default(&self, schema_id: &SchemaId) -> Result<SchemaVariantDefault> {
        let path = self.scoped_path(
            "get schema variant default",
            &format!("schemas/{}/variant/default", schema_id),
        )?;
        self.execute("get schema variant default", ApiRequest::get(path))
    }

    pub fn get_func(&self, func_id: &FuncId) -> Result<FuncDetail> {
        let path = self.scoped_path("get func", &format!("funcs/{}", func_id))?;
        self.execute("get func", ApiRequest::get(path))
    }

    pub fn create_schema(&self, schema: &CreateSchemaRequest) -> Result<CreateSchemaResponse> {
        let path = self.scoped_path("create schema", "schemas")?;
        tracing::debug!(name = %schema.name, category = %schema.category, "Creating schema");
        let created: CreateSchemaResponse =
            self.execute("create schema", ApiRequest::post(path, to_body(schema)?))?;
        tracing::info!(
            schema = %created.schema_id,
            variant = %created.default_variant_id,
            "Created schema '{}'",
            schema.name
        );
        Ok(created)
    }

    /// Full replace of a variant's descriptive fields and code.
    pub fn update_schema_variant(
        &self,
        schema_id: &SchemaId,
        schema_variant_id: &SchemaVariantId,
        update: &UpdateSchemaVariantRequest,
    ) -> Result<Value> {
        let path = self.scoped_path(
            "update schema variant",
            &format!("schemas/{}/variant/{}", schema_id, schema_variant_id),
        )?;
        self.execute(
            "update schema variant",
            ApiRequest::put(path, to_body(update)?),
        )
    }

    pub fn create_schema_variant_authentication_func(
        &self,
        schema_id: &SchemaId,
        schema_variant_id: &SchemaVariantId,
        func: &CreateVariantFuncRequest,
    ) -> Result<CreateVariantFuncResponse> {
        self.create_schema_variant_func(FuncRole::Authentication, schema_id, schema_variant_id, func)
    }

    pub fn create_schema_variant_qualification_func(
        &self,
        schema_id: &SchemaId,
        schema_variant_id: &SchemaVariantId,
        func: &CreateVariantFuncRequest,
    ) -> Result<CreateVariantFuncResponse> {
        self.create_schema_variant_func(FuncRole::Qualification, schema_id, schema_variant_id, func)
    }

    /// Attach function code to a variant in the given role.
    pub fn create_schema_variant_func(
        &self,
        role: FuncRole,
        schema_id: &SchemaId,
        schema_variant_id: &SchemaVariantId,
        func: &CreateVariantFuncRequest,
    ) -> Result<CreateVariantFuncResponse> {
        let operation = match role {
            FuncRole::Authentication => "create authentication func",
            FuncRole::Qualification => "create qualification func",
        };
        let path = self.scoped_path(
            operation,
            &format!(
                "schemas/{}/variant/{}/funcs/{}",
                schema_id,
                schema_variant_id,
                role.path_segment()
            ),
        )?;
        let response = self.send(&ApiRequest::post(path, to_body(func)?))?;
        let response = check(response, operation)?;
        tracing::info!(variant = %schema_variant_id, "Attached {} func '{}'", role, func.name);
        if response.body.trim().is_empty() {
            return Ok(CreateVariantFuncResponse::default());
        }
        response.decode(operation)
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn workspace_path(&self, rest: &str) -> String {
        format!("/v1/w/{}/{}", self.session.workspace_id, rest)
    }

    fn scoped_path(&self, operation: &'static str, rest: &str) -> Result<String> {
        let change_set_id = self
            .change_set_id
            .as_ref()
            .ok_or_else(|| ClientError::no_change_set(operation))?;
        Ok(format!(
            "/v1/w/{}/change-sets/{}/{}",
            self.session.workspace_id, change_set_id, rest
        ))
    }

    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        tracing::debug!("{} {}", request.method, request.path);
        let response = self.transport.send(request)?;
        tracing::debug!(status = response.status, "{} {}", request.method, request.path);
        tracing::trace!(body = %response.body, "response body");
        Ok(response)
    }

    fn execute<R: DeserializeOwned>(&self, operation: &'static str, request: ApiRequest) -> Result<R> {
        let response = self.send(&request)?;
        check(response, operation)?.decode(operation)
    }

    fn execute_unit(&self, operation: &'static str, request: ApiRequest) -> Result<()> {
        let response = self.send(&request)?;
        check(response, operation).map(|_| ())
    }
}

fn check(response: ApiResponse, operation: &'static str) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ClientError::Request {
            operation,
            status: response.status,
            body: response.body,
        })
    }
}

fn to_body<S: Serialize>(value: &S) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ClientError::Decode {
        operation: "encode request",
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::Method;
    use serde_json::json;

    fn client(mock: &MockTransport) -> SiClient<MockTransport> {
        SiClient::with_transport(mock.clone()).unwrap()
    }

    fn with_change_set(mock: &MockTransport) -> SiClient<MockTransport> {
        let mut client = client(mock);
        client.use_change_set(ChangeSetId::parse("cs-1").unwrap());
        client
    }

    #[test]
    fn test_scoped_operations_need_a_change_set() {
        let mock = MockTransport::authenticated("ws-1");
        let client = client(&mock);
        let schema_id = SchemaId::parse("s-1").unwrap();
        let func_id = FuncId::parse("f-1").unwrap();

        assert!(client.search_schemas(None).unwrap_err().is_precondition());
        assert!(client.get_schema(&schema_id).unwrap_err().is_precondition());
        assert!(client
            .get_schema_variant_default(&schema_id)
            .unwrap_err()
            .is_precondition());
        assert!(client.get_func(&func_id).unwrap_err().is_precondition());
        assert!(client
            .create_schema(&CreateSchemaRequest::new("c", "code", "n", "d"))
            .unwrap_err()
            .is_precondition());
        assert!(client.create_component(&json!({})).unwrap_err().is_precondition());
        assert!(client
            .get_logs(&JobStateId::parse("j-1").unwrap())
            .unwrap_err()
            .is_precondition());
        assert!(client
            .execute_management_function(&ComponentId::parse("c-1").unwrap(), "import")
            .unwrap_err()
            .is_precondition());

        let variant_id = SchemaVariantId::parse("v-1").unwrap();
        let update = UpdateSchemaVariantRequest {
            name: "n".to_string(),
            description: "d".to_string(),
            link: "l".to_string(),
            category: "c".to_string(),
            color: "#000000".to_string(),
            code: "code".to_string(),
        };
        assert!(client
            .update_schema_variant(&schema_id, &variant_id, &update)
            .unwrap_err()
            .is_precondition());

        let func = CreateVariantFuncRequest {
            name: "auth".to_string(),
            display_name: "Auth".to_string(),
            description: "d".to_string(),
            code: "code".to_string(),
        };
        assert!(client
            .create_schema_variant_authentication_func(&schema_id, &variant_id, &func)
            .unwrap_err()
            .is_precondition());
        assert!(client
            .create_schema_variant_qualification_func(&schema_id, &variant_id, &func)
            .unwrap_err()
            .is_precondition());
        assert!(client
            .create_schema_variant_func(FuncRole::Authentication, &schema_id, &variant_id, &func)
            .unwrap_err()
            .is_precondition());

        // Only the identity check went out.
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_create_or_use_change_set_is_idempotent_by_name() {
        let mock = MockTransport::authenticated("ws-1");
        let mut client = client(&mock);

        mock.queue_new_change_set("cs-new", "Add schema");
        let first = client.create_or_use_change_set("Add schema").unwrap();

        mock.queue_existing_change_set("cs-new", "Add schema");
        let second = client.create_or_use_change_set("Add schema").unwrap();

        assert_eq!(first, second);
        assert_eq!(client.change_set_id(), Some(&first));
        assert_eq!(mock.requests_to(Method::Post, "/change-sets").len(), 1);

        let create = &mock.requests_to(Method::Post, "/change-sets")[0];
        assert_eq!(create.path, "/v1/w/ws-1/change-sets");
        assert_eq!(create.body, Some(json!({"changeSetName": "Add schema"})));
    }

    #[test]
    fn test_different_names_get_distinct_change_sets() {
        let mock = MockTransport::authenticated("ws-1");
        let mut client = client(&mock);

        mock.queue_new_change_set("cs-a", "alpha");
        let a = client.create_or_use_change_set("alpha").unwrap();

        mock.queue_json(200, json!({"changeSets": [{"id": "cs-a", "name": "alpha"}]}));
        mock.queue_json(200, json!({"changeSet": {"id": "cs-b", "name": "beta"}}));
        let b = client.create_or_use_change_set("beta").unwrap();

        assert_ne!(a, b);
        assert_eq!(client.change_set_id().unwrap().as_str(), "cs-b");
    }

    #[test]
    fn test_get_schema_distinguishes_generating() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);
        let schema_id = SchemaId::parse("s-1").unwrap();

        mock.queue_json(202, json!({}));
        assert!(client.get_schema(&schema_id).unwrap().is_generating());

        mock.queue_json(200, json!({"schemaId": "s-1", "name": "Droplet"}));
        match client.get_schema(&schema_id).unwrap() {
            SchemaDetail::Ready(value) => assert_eq!(value["name"], "Droplet"),
            other => panic!("expected ready schema, got {other:?}"),
        }

        mock.queue_response(ApiResponse::new(404, "no such schema"));
        let err = client.get_schema(&schema_id).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("no such schema"));

        assert_eq!(
            mock.requests()[1].path,
            "/v1/w/ws-1/change-sets/cs-1/schemas/s-1"
        );
    }

    #[test]
    fn test_search_schemas_sends_optional_category() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);

        mock.queue_json(
            200,
            json!({"schemas": [{"schemaId": "s-1", "schemaName": "AWS::EC2::Instance"}]}),
        );
        let found = client.search_schemas(Some("AWS::EC2")).unwrap();
        assert_eq!(found.schemas.len(), 1);

        mock.queue_json(200, json!({"schemas": []}));
        client.search_schemas(None).unwrap();

        let searches = mock.requests_to(Method::Post, "/schemas/search");
        assert_eq!(searches[0].body, Some(json!({"category": "AWS::EC2"})));
        assert_eq!(searches[1].body, Some(json!({})));
    }

    #[test]
    fn test_create_schema_and_attach_funcs() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);

        mock.queue_json(200, json!({"schemaId": "s-9", "defaultVariantId": "v-9"}));
        let created = client
            .create_schema(
                &CreateSchemaRequest::new("Digital Ocean", "code()", "Foo", "d").with_link("l"),
            )
            .unwrap();
        assert_eq!(created.default_variant_id.as_str(), "v-9");

        let func = CreateVariantFuncRequest {
            name: "digitalOceanStoreCreds".to_string(),
            display_name: "Store".to_string(),
            description: "d".to_string(),
            code: "auth()".to_string(),
        };
        mock.queue_json(200, json!({"funcId": "f-1"}));
        let attached = client
            .create_schema_variant_authentication_func(
                &created.schema_id,
                &created.default_variant_id,
                &func,
            )
            .unwrap();
        assert_eq!(attached.func_id.unwrap().as_str(), "f-1");

        mock.queue_response(ApiResponse::new(200, ""));
        client
            .create_schema_variant_qualification_func(
                &created.schema_id,
                &created.default_variant_id,
                &func,
            )
            .unwrap();

        let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths[1], "/v1/w/ws-1/change-sets/cs-1/schemas");
        assert_eq!(
            paths[2],
            "/v1/w/ws-1/change-sets/cs-1/schemas/s-9/variant/v-9/funcs/authentication"
        );
        assert_eq!(
            paths[3],
            "/v1/w/ws-1/change-sets/cs-1/schemas/s-9/variant/v-9/funcs/qualification"
        );
        let schema_body = mock.requests()[1].body.clone().unwrap();
        assert_eq!(schema_body["color"], "#3B82F6");
        assert_eq!(schema_body["link"], "l");
    }

    #[test]
    fn test_request_error_carries_operation() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);
        mock.queue_response(ApiResponse::new(500, "kaboom"));

        let err = client
            .create_schema(&CreateSchemaRequest::new("c", "code", "n", "d"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create schema: 500 - kaboom");
    }

    #[test]
    fn test_management_function_round_trip() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);
        let component = ComponentId::parse("c-1").unwrap();

        mock.queue_json(200, json!({"managementFuncJobStateId": "job-7"}));
        let job = client
            .execute_management_function(&component, "Import from AWS")
            .unwrap();
        assert_eq!(job.as_str(), "job-7");

        mock.queue_json(200, json!({"state": "running", "logs": []}));
        let logs = client.get_logs(&job).unwrap();
        assert_eq!(logs["state"], "running");

        let requests = mock.requests();
        assert_eq!(
            requests[1].path,
            "/v1/w/ws-1/change-sets/cs-1/components/c-1/execute-management-function"
        );
        assert_eq!(
            requests[1].body,
            Some(json!({"managementFunction": {"function": "Import from AWS"}}))
        );
        assert_eq!(
            requests[2].path,
            "/v1/w/ws-1/change-sets/cs-1/management-funcs/job-7"
        );
    }

    #[test]
    fn test_abandon_change_set() {
        let mock = MockTransport::authenticated("ws-1");
        let mut client = client(&mock);

        assert!(client.abandon_change_set(None).unwrap_err().is_precondition());

        client.use_change_set(ChangeSetId::parse("cs-1").unwrap());
        mock.queue_response(ApiResponse::new(204, ""));
        let deleted = client.abandon_change_set(None).unwrap();
        assert_eq!(deleted.unwrap().as_str(), "cs-1");
        assert!(client.change_set_id().is_none());

        mock.queue_existing_change_set("cs-2", "old work");
        mock.queue_response(ApiResponse::new(200, "{}"));
        let deleted = client.abandon_change_set(Some("old work")).unwrap();
        assert_eq!(deleted.unwrap().as_str(), "cs-2");

        mock.queue_json(200, json!({"changeSets": []}));
        assert!(client.abandon_change_set(Some("missing")).unwrap().is_none());

        assert_eq!(mock.requests_to(Method::Delete, "/change-sets/cs-2").len(), 1);
    }

    #[test]
    fn test_update_schema_variant_uses_put() {
        let mock = MockTransport::authenticated("ws-1");
        let client = with_change_set(&mock);
        mock.queue_json(200, json!({"schemaVariantId": "v-1"}));

        let update = UpdateSchemaVariantRequest {
            name: "Foo".to_string(),
            description: "d".to_string(),
            link: "l".to_string(),
            category: "c".to_string(),
            color: "#000000".to_string(),
            code: "code".to_string(),
        };
        client
            .update_schema_variant(
                &SchemaId::parse("s-1").unwrap(),
                &SchemaVariantId::parse("v-1").unwrap(),
                &update,
            )
            .unwrap();

        let put = &mock.requests_to(Method::Put, "/variant/v-1")[0];
        assert_eq!(put.path, "/v1/w/ws-1/change-sets/cs-1/schemas/s-1/variant/v-1");
        assert_eq!(put.body.as_ref().unwrap()["color"], "#000000");
    }

    #[test]
    fn test_failed_session_prevents_client() {
        let mock = MockTransport::new();
        mock.queue_response(ApiResponse::new(403, "forbidden"));
        let err = SiClient::with_transport(mock).err().unwrap();
        assert!(matches!(err, ClientError::Authentication { status: 403, .. }));
    }
}
