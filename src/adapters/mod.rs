//! Endpoint adapters: one per HICD patient resource.
//!
//! Each adapter turns a `PatientRequest` into a resource GET on the session, checks the
//! backend payload, runs the matching transform over every item and wraps the result
//! in an `Envelope`. Transport and backend failures become an error envelope with no
//! partial data; malformed items are dropped one by one.

pub mod evolutions;
pub mod exams;
pub mod prescriptions;

pub use evolutions::*;
pub use exams::*;
pub use prescriptions::*;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::envelope::Envelope;
use crate::extraction::fields::{optional_text, type_name};
use crate::extraction::{extract_batch, ExtractionContext, ExtractionError};
use crate::session::{mask_patient_id, HttpTransport, SessionClient, SessionError};

/// Fallback text when a failed payload carries no message.
const UNKNOWN_BACKEND_ERROR: &str = "Erro desconhecido";

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Backend answered `success: false`.
    #[error("API retornou falha - {0}")]
    Backend(String),
}

/// Patient resources exposed under `pacientes/{id}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Evolutions,
    Exams,
    Prescriptions,
}

impl Resource {
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Evolutions => "evolucoes",
            Resource::Exams => "exames",
            Resource::Prescriptions => "prescricoes",
        }
    }

    /// Lookback window used when the caller gives none.
    pub fn default_days(self) -> Option<u32> {
        match self {
            Resource::Evolutions => Some(7),
            Resource::Exams => Some(3),
            Resource::Prescriptions => None,
        }
    }

    /// Path segments under the API base; the session encodes each one.
    pub fn segments(self, patient_id: &str) -> [&str; 3] {
        ["pacientes", patient_id, self.segment()]
    }
}

/// Patient identifier plus optional lookback window in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRequest {
    pub prontuario: String,
    pub dias: Option<u32>,
}

impl PatientRequest {
    pub fn new(prontuario: impl Into<String>) -> Self {
        Self {
            prontuario: prontuario.into(),
            dias: None,
        }
    }

    pub fn with_days(mut self, dias: u32) -> Self {
        self.dias = Some(dias);
        self
    }

    /// Requested window, or the resource default.
    pub fn days_or_default(&self, resource: Resource) -> Option<u32> {
        self.dias.or(resource.default_days())
    }
}

/// One backend resource and the transform that normalizes its items.
pub trait ResourceAdapter {
    type Record: Serialize;

    fn resource(&self) -> Resource;

    /// Query parameters sent with the resource GET.
    fn query(&self, request: &PatientRequest) -> Vec<(&'static str, String)>;

    fn transform(
        &self,
        ctx: &ExtractionContext,
        index: usize,
        raw: &Value,
    ) -> Result<Self::Record, ExtractionError>;
}

/// Fetch and normalize one resource for one patient. Never fails: every error is
/// folded into the returned envelope.
pub fn run_adapter<A, T>(
    adapter: &A,
    session: &mut SessionClient<T>,
    request: &PatientRequest,
) -> Envelope<A::Record>
where
    A: ResourceAdapter,
    T: HttpTransport,
{
    let resource = adapter.resource().segment();
    let patient = mask_patient_id(&request.prontuario);

    match fetch_records(adapter, session, request) {
        Ok(records) => {
            info!(patient = %patient, resource, count = records.len(), "Records extracted");
            Envelope::success(request.prontuario.clone(), records)
        }
        Err(e) => {
            warn!(patient = %patient, resource, error = %e, "Resource fetch failed");
            Envelope::failure(request.prontuario.clone(), e.to_string())
        }
    }
}

/// Same as `run_adapter` but keeps the error typed for callers that branch on it.
pub fn fetch_records<A, T>(
    adapter: &A,
    session: &mut SessionClient<T>,
    request: &PatientRequest,
) -> Result<Vec<A::Record>, AdapterError>
where
    A: ResourceAdapter,
    T: HttpTransport,
{
    let resource = adapter.resource();
    session.ensure_authenticated()?;

    let query = adapter.query(request);
    let params: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let payload = session.get_json(&resource.segments(&request.prontuario), &params)?;
    let items = payload_items(&payload)?;
    debug!(
        patient = %mask_patient_id(&request.prontuario),
        resource = resource.segment(),
        items = items.len(),
        "Payload received"
    );

    let ctx = ExtractionContext::new(request.prontuario.clone());
    Ok(extract_batch(resource.segment(), items, |index, raw| {
        adapter.transform(&ctx, index, raw)
    }))
}

/// Unwrap `{success, data, message}`. A missing `success` flag is accepted only when
/// `data` is present; `success: true` without `data` means no records.
fn payload_items(payload: &Value) -> Result<&[Value], AdapterError> {
    let object = payload.as_object().ok_or_else(|| {
        SessionError::InvalidPayload(format!("expected JSON object, found {}", type_name(payload)))
    })?;

    let success = object.get("success");
    if matches!(success, Some(Value::Bool(false))) {
        let message = optional_text(payload, "message")
            .or_else(|| optional_text(payload, "error"))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| UNKNOWN_BACKEND_ERROR.to_string());
        return Err(AdapterError::Backend(message));
    }

    match (success, object.get("data")) {
        (_, Some(Value::Array(items))) => Ok(items.as_slice()),
        (Some(Value::Bool(true)), None | Some(Value::Null)) => Ok(&[]),
        (_, Some(other)) if !other.is_null() => Err(SessionError::InvalidPayload(format!(
            "data must be an array, found {}",
            type_name(other)
        ))
        .into()),
        _ => Err(SessionError::InvalidPayload("payload has no data array".to_string()).into()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::HicdConfig;
    use crate::session::{Credentials, MockTransport, SessionClient};

    pub const LANDING: &str = "http://hicd.test/index.php";
    pub const LOGIN: &str = "http://hicd.test/loginController.php";
    pub const API: &str = "http://api.test/api";

    pub fn config() -> HicdConfig {
        HicdConfig {
            landing_url: LANDING.into(),
            login_url: LOGIN.into(),
            api_base_url: API.into(),
            ..HicdConfig::default()
        }
    }

    /// Mock already primed with a working login.
    pub fn backend() -> MockTransport {
        MockTransport::new()
            .on_get(LANDING, 200, "<html>login</html>")
            .on_post(LOGIN, 200, "ok")
    }

    pub fn logged_in(mock: MockTransport) -> SessionClient<MockTransport> {
        let mut session = SessionClient::with_transport(mock, config());
        session
            .login(Credentials::new("medico", "senha"))
            .expect("login");
        session
    }

    pub fn resource_url(patient: &str, segment: &str) -> String {
        format!("{API}/pacientes/{patient}/{segment}")
    }
}
