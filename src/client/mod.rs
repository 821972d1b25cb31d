pub mod error;

pub use error::ClientError;

use crate::config::ConnectionConfig;
use crate::progress::ProgressSnapshot;
use crate::work_package::{CalibrationRequest, WorkPackageConfig};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const RUN_WORK_PACKAGE_QUERY: &str = "\
mutation runWorkPackage($input: WorkPackageConfigInput!) {
  runWorkPackage(input: $input)
}";

const CANCEL_WORK_PACKAGE_QUERY: &str = "\
mutation cancelWorkPackage($workPackageId: ID!) {
  cancelWorkPackage(workPackageId: $workPackageId)
}";

const WORK_PACKAGE_PROGRESS_QUERY: &str = "\
query getWorkPackageProgress {
  getWorkPackageProgress {
    pending
    inProgress { id progressPercent pendingCount generationCount executionCount resultProcessingCount failureCount completeCount }
    finished
  }
}";

const RUN_CALIBRATION_QUERY: &str = "\
mutation runCalibration($input: CalibrationRequestInput!) {
  runCalibration(input: $input)
}";

const CALIBRATION_RUN_QUERY: &str = "\
query getCalibrationRun($id: ID!) {
  getCalibrationRun(id: $id) { id calibrationName calibrationTimeLocal feeders status }
}";

const CALIBRATION_SETS_QUERY: &str = "\
query getCalibrationSets {
  getCalibrationSets { id calibrationName calibrationTimeLocal feeders }
}";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Anything the bridge can poll for progress. Lets the monitor loop be tested
/// against a scripted source instead of a live server.
pub trait ProgressSource: Send + Sync {
    fn query_progress(&self) -> Result<ProgressSnapshot, ClientError>;
}

/// GraphQL-over-HTTP client for the hosting-capacity service.
pub struct EasClient {
    base_url: String,
    access_token: String,
    agent: ureq::Agent,
}

impl EasClient {
    pub fn new(config: &ConnectionConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            base_url: config.base_url(),
            access_token: config.access_token.clone(),
            agent,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/graphql", self.base_url)
    }

    fn execute(&self, query: &str, variables: Value) -> Result<Value, ClientError> {
        let url = self.endpoint();
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .send_json(body)
            .map_err(|err| match err {
                ureq::Error::Status(status, response) => {
                    let detail = response
                        .into_string()
                        .unwrap_or_else(|_| "unreadable response body".to_string());
                    ClientError::Http {
                        url: url.clone(),
                        status,
                        detail,
                    }
                }
                ureq::Error::Transport(transport) => ClientError::Transport {
                    url: url.clone(),
                    detail: transport.to_string(),
                },
            })?;
        let envelope: GraphQlResponse = response
            .into_json()
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        decode_envelope(envelope)
    }

    /// Submits a work package run and returns the server-assigned id.
    pub fn run_work_package(&self, config: &WorkPackageConfig) -> Result<String, ClientError> {
        let input = serde_json::to_value(config)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        let data = self.execute(RUN_WORK_PACKAGE_QUERY, json!({ "input": input }))?;
        require_string(&data, "runWorkPackage")
    }

    pub fn cancel_work_package(&self, work_package_id: &str) -> Result<String, ClientError> {
        let result = self.execute(
            CANCEL_WORK_PACKAGE_QUERY,
            json!({ "workPackageId": work_package_id }),
        );
        match result {
            Err(ClientError::Http { status: 404, .. }) => Err(ClientError::NoSuchWorkPackage),
            Ok(data) => require_string(&data, "cancelWorkPackage"),
            Err(other) => Err(other),
        }
    }

    pub fn work_packages_progress(&self) -> Result<ProgressSnapshot, ClientError> {
        let data = self.execute(WORK_PACKAGE_PROGRESS_QUERY, json!({}))?;
        let payload = data
            .get("getWorkPackageProgress")
            .cloned()
            .ok_or_else(|| missing_field("getWorkPackageProgress"))?;
        Ok(ProgressSnapshot::new(payload))
    }

    pub fn run_calibration(&self, request: &CalibrationRequest) -> Result<String, ClientError> {
        let input = serde_json::to_value(request)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        let data = self.execute(RUN_CALIBRATION_QUERY, json!({ "input": input }))?;
        require_string(&data, "runCalibration")
    }

    pub fn calibration_run(&self, id: &str) -> Result<Value, ClientError> {
        let data = self.execute(CALIBRATION_RUN_QUERY, json!({ "id": id }))?;
        data.get("getCalibrationRun")
            .cloned()
            .ok_or_else(|| missing_field("getCalibrationRun"))
    }

    pub fn calibration_sets(&self) -> Result<Value, ClientError> {
        let data = self.execute(CALIBRATION_SETS_QUERY, json!({}))?;
        data.get("getCalibrationSets")
            .cloned()
            .ok_or_else(|| missing_field("getCalibrationSets"))
    }

    /// Releases the client at deliberate shutdown. Connections are pooled per
    /// agent, so dropping it is the whole teardown.
    pub fn close(self) {}
}

impl ProgressSource for EasClient {
    fn query_progress(&self) -> Result<ProgressSnapshot, ClientError> {
        self.work_packages_progress()
    }
}

/// GraphQL responses may carry both partial data and errors. Data wins when
/// present; errors are surfaced only when the server returned nothing usable.
fn decode_envelope(envelope: GraphQlResponse) -> Result<Value, ClientError> {
    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ if !envelope.errors.is_empty() => {
            let messages: Vec<String> =
                envelope.errors.into_iter().map(|e| e.message).collect();
            Err(ClientError::Api(messages.join("; ")))
        }
        _ => Err(ClientError::Decode(
            "response carried neither data nor errors".to_string(),
        )),
    }
}

fn require_string(data: &Value, field: &str) -> Result<String, ClientError> {
    data.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing_field(field))
}

fn missing_field(field: &str) -> ClientError {
    ClientError::Decode(format!("response data is missing `{field}`"))
}
