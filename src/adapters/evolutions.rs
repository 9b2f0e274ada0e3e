use serde_json::Value;

use super::{run_adapter, PatientRequest, Resource, ResourceAdapter};
use crate::envelope::Envelope;
use crate::extraction::{transform_evolution, ExtractionContext, ExtractionError};
use crate::models::ClinicalEvolution;
use crate::session::{HttpTransport, SessionClient};

/// Clinical evolutions (progress notes), requested in detailed format.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvolutionsAdapter;

impl ResourceAdapter for EvolutionsAdapter {
    type Record = ClinicalEvolution;

    fn resource(&self) -> Resource {
        Resource::Evolutions
    }

    fn query(&self, request: &PatientRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![("formato", "detalhado".to_string())];
        if let Some(dias) = request.days_or_default(self.resource()) {
            query.push(("dias", dias.to_string()));
        }
        query
    }

    fn transform(
        &self,
        ctx: &ExtractionContext,
        index: usize,
        raw: &Value,
    ) -> Result<ClinicalEvolution, ExtractionError> {
        transform_evolution(ctx, index, raw)
    }
}

pub fn fetch_evolutions<T: HttpTransport>(
    session: &mut SessionClient<T>,
    request: &PatientRequest,
) -> Envelope<ClinicalEvolution> {
    run_adapter(&EvolutionsAdapter, session, request)
}
