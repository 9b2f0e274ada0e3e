use serde_json::Value;

use super::{run_adapter, PatientRequest, Resource, ResourceAdapter};
use crate::envelope::Envelope;
use crate::extraction::{transform_exam, ExtractionContext, ExtractionError};
use crate::models::ExamResult;
use crate::session::{HttpTransport, SessionClient};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExamsAdapter;

impl ResourceAdapter for ExamsAdapter {
    type Record = ExamResult;

    fn resource(&self) -> Resource {
        Resource::Exams
    }

    fn query(&self, request: &PatientRequest) -> Vec<(&'static str, String)> {
        request
            .days_or_default(self.resource())
            .map(|dias| vec![("dias", dias.to_string())])
            .unwrap_or_default()
    }

    fn transform(
        &self,
        ctx: &ExtractionContext,
        index: usize,
        raw: &Value,
    ) -> Result<ExamResult, ExtractionError> {
        transform_exam(ctx, index, raw)
    }
}

/// Lab and imaging requests with their processing status.
pub fn fetch_exams<T: HttpTransport>(
    session: &mut SessionClient<T>,
    request: &PatientRequest,
) -> Envelope<ExamResult> {
    run_adapter(&ExamsAdapter, session, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::*;
    use serde_json::json;

    #[test]
    fn malformed_exam_dropped_from_envelope() {
        let body = json!({
            "success": true,
            "data": [
                {"requisicaoId": "1", "status": {"liberado": true}},
                {"requisicaoId": "2"},
                {"requisicaoId": "3", "status": {}}
            ]
        })
        .to_string();
        let url = resource_url("40380", "exames");
        let mut session = logged_in(backend().on_get(&url, 200, &body));

        let envelope = fetch_exams(&mut session, &PatientRequest::new("40380"));
        let ids: Vec<_> = envelope
            .records()
            .iter()
            .filter_map(|e| e.requisicao_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(envelope.records()[0].status.liberado);
        assert_eq!(
            session.transport().requests().pop().unwrap().param("dias"),
            Some("3")
        );
    }

    #[test]
    fn http_failure_yields_error_envelope() {
        let url = resource_url("40380", "exames");
        let mut session = logged_in(backend().on_get(&url, 502, "Bad Gateway"));

        let envelope = fetch_exams(&mut session, &PatientRequest::new("40380").with_days(10));
        assert!(!envelope.is_success());
        assert_eq!(
            envelope.error.as_deref(),
            Some("HTTP error (status 502): Bad Gateway")
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("data").is_none());
    }
}
