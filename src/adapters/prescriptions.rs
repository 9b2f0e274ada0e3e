use serde_json::Value;
use tracing::debug;

use super::{run_adapter, PatientRequest, Resource, ResourceAdapter};
use crate::envelope::Envelope;
use crate::extraction::{transform_prescription, ExtractionContext, ExtractionError};
use crate::models::Prescription;
use crate::session::{HttpTransport, SessionClient};

/// Prescriptions. The backend does not filter them by date, so the lookback window
/// is accepted and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrescriptionsAdapter;

impl ResourceAdapter for PrescriptionsAdapter {
    type Record = Prescription;

    fn resource(&self) -> Resource {
        Resource::Prescriptions
    }

    fn query(&self, request: &PatientRequest) -> Vec<(&'static str, String)> {
        if let Some(dias) = request.dias {
            debug!(dias, "Lookback window not supported for prescriptions, ignoring");
        }
        Vec::new()
    }

    fn transform(
        &self,
        ctx: &ExtractionContext,
        index: usize,
        raw: &Value,
    ) -> Result<Prescription, ExtractionError> {
        transform_prescription(ctx, index, raw)
    }
}

pub fn fetch_prescriptions<T: HttpTransport>(
    session: &mut SessionClient<T>,
    request: &PatientRequest,
) -> Envelope<Prescription> {
    run_adapter(&PrescriptionsAdapter, session, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::*;
    use serde_json::json;

    #[test]
    fn prescriptions_fetched_without_days() {
        let body = json!({
            "success": true,
            "data": [{
                "id": "P-1",
                "detalhes": {
                    "medicamentos": [
                        {"nome": "DIPIRONA", "dose": "1"},
                        {"nome": "MELATONINA", "naoPadronizado": true, "posologia": "1x ao dia"}
                    ]
                }
            }]
        })
        .to_string();
        let url = resource_url("40380", "prescricoes");
        let mut session = logged_in(backend().on_get(&url, 200, &body));

        let envelope = fetch_prescriptions(&mut session, &PatientRequest::new("40380").with_days(5));
        assert!(envelope.is_success());

        let prescription = &envelope.records()[0];
        assert_eq!(prescription.prontuario, "40380");
        assert_eq!(prescription.codigo.as_deref(), Some("P-1"));
        assert!(prescription.detalhes.medicamentos[1].is_non_standard());

        let request = session.transport().requests().pop().unwrap();
        assert!(request.params.is_empty());
    }

    #[test]
    fn backend_failure_message_surfaces() {
        let body = json!({"success": false, "error": "Sessão inválida"}).to_string();
        let url = resource_url("40380", "prescricoes");
        let mut session = logged_in(backend().on_get(&url, 200, &body));

        let envelope = fetch_prescriptions(&mut session, &PatientRequest::new("40380"));
        assert_eq!(envelope.error.as_deref(), Some("API retornou falha - Sessão inválida"));
    }
}
