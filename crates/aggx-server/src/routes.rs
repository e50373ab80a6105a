//! # HTTP Route Handlers
//!
//! JSON endpoints for a coordinator that plans in another process:
//!
//! - `POST /aggregate/satisfy`: ask whether a group aggregate can deliver a required
//!   distribution and collation. Returns the rewritten plan (with the enforcer planned
//!   below it) and the requirement placed on its input, or `satisfied: false`.
//! - `POST /aggregate/translate`: lower a finalized aggregate into its pipeline descriptor.
//!
//! ## Error Handling
//!
//! Plans arriving over the wire are validated before they reach the planner. A malformed
//! aggregate (keys out of range, duplicate or overlapping keys) is answered with
//! `400 Bad Request`. An unsatisfiable requirement is a normal `200` answer.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use aggx_core::config::TableConfig;
use aggx_core::expr::AggregateCall;
use aggx_core::plan::{PlanNode, SourceNode};
use aggx_core::satisfy::{classify_requirement, derive_input_distribution};
use aggx_core::{
    attempt_satisfy, AggregatePlanNode, Distribution, OptContext, PhysicalPropertySet, PlanError,
};
use aggx_exec::{translate_aggregate, PipelineDescriptor};

use crate::state::AppState;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// An aggregate node as sent by the coordinator.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateDef {
    pub input: SourceNode,
    #[serde(default)]
    pub grouping: Vec<usize>,
    #[serde(default)]
    pub aux_grouping: Vec<usize>,
    #[serde(default)]
    pub agg_calls: Vec<AggregateCall>,
    /// Traits the node currently carries.
    #[serde(default)]
    pub traits: PhysicalPropertySet,
}

impl AggregateDef {
    pub fn build(self) -> Result<AggregatePlanNode, PlanError> {
        AggregatePlanNode::try_new(
            Arc::new(PlanNode::Source(self.input)),
            self.grouping,
            self.aux_grouping,
            self.agg_calls,
            self.traits,
        )
    }
}

/// Request body for `POST /aggregate/satisfy`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfyRequest {
    pub aggregate: AggregateDef,
    pub required: PhysicalPropertySet,
    /// Per-request table configuration, layered over the server defaults.
    #[serde(default)]
    pub table_config: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfyResponse {
    pub satisfied: bool,
    /// The rewritten aggregate, including the converted input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanNode>,
    /// What the aggregate requires from its input, in input-column space.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_requirement: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<String>,
}

/// POST /aggregate/satisfy
pub async fn satisfy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SatisfyRequest>,
) -> Result<Json<SatisfyResponse>, (StatusCode, String)> {
    let node = req.aggregate.build().map_err(bad_request)?;
    let config = state.config.table_config.merged(&req.table_config);
    let ctx = OptContext {
        config: &config,
        converter: state.converter.as_ref(),
    };

    let Some(rewritten) = attempt_satisfy(&node, &req.required, &ctx) else {
        return Ok(Json(SatisfyResponse {
            satisfied: false,
            plan: None,
            input_requirement: None,
            explain: None,
        }));
    };

    let input_requirement = classify_requirement(
        &node,
        &req.required.distribution,
        config.shuffle_by_partial_key_enabled(),
    )
    .map(|matched| derive_input_distribution(&node, &matched));
    let plan = PlanNode::Aggregate(rewritten);
    let explain = plan.display(0);

    Ok(Json(SatisfyResponse {
        satisfied: true,
        plan: Some(plan),
        input_requirement,
        explain: Some(explain),
    }))
}

/// POST /aggregate/translate
pub async fn translate(
    Json(def): Json<AggregateDef>,
) -> Result<Json<PipelineDescriptor>, (StatusCode, String)> {
    let node = def.build().map_err(bad_request)?;
    Ok(Json(translate_aggregate(&node)))
}

fn bad_request(err: PlanError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Invalid aggregate: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aggregate_json() -> serde_json::Value {
        json!({
            "input": {
                "description": "TableSourceScan(table=[sales])",
                "schema": [
                    {"name": "store", "dataType": "Int64"},
                    {"name": "sku", "dataType": "Utf8"},
                    {"name": "amount", "dataType": "Float64"}
                ]
            },
            "grouping": [0, 1],
            "aggCalls": [
                {"function": "p95", "args": [2], "resultType": "Float64", "name": "p95_amount"}
            ]
        })
    }

    fn satisfy_request(required: serde_json::Value, partial_key: bool) -> SatisfyRequest {
        serde_json::from_value(json!({
            "aggregate": aggregate_json(),
            "required": required,
            "tableConfig": {
                "table.optimizer.shuffle-by-partial-key-enabled": partial_key.to_string()
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_satisfy_partial_key() {
        let state = Arc::new(AppState::default());
        let required = json!({"distribution": {"type": "hash", "keys": [1], "strict": false}});

        let Json(rejected) = satisfy(State(state.clone()), Json(satisfy_request(required.clone(), false)))
            .await
            .unwrap();
        assert!(!rejected.satisfied);
        assert!(rejected.plan.is_none());

        let Json(accepted) = satisfy(State(state), Json(satisfy_request(required, true)))
            .await
            .unwrap();
        assert!(accepted.satisfied);
        assert_eq!(accepted.input_requirement, Some(Distribution::hash(vec![1], false)));
        let explain = accepted.explain.unwrap();
        assert!(explain.starts_with("GroupAggregate(groupBy=[store, sku]"));
        assert!(explain.contains("Exchange(distribution=[hash[1]])"));
    }

    #[tokio::test]
    async fn test_satisfy_rejects_malformed_aggregate() {
        let mut aggregate = aggregate_json();
        aggregate["grouping"] = json!([0, 0]);
        let req: SatisfyRequest = serde_json::from_value(json!({
            "aggregate": aggregate,
            "required": {"distribution": {"type": "singleton"}}
        }))
        .unwrap();

        let (status, message) = satisfy(State(Arc::new(AppState::default())), Json(req))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("Grouping key 0 appears more than once"));
    }

    #[tokio::test]
    async fn test_translate() {
        let def: AggregateDef = serde_json::from_value(aggregate_json()).unwrap();
        let Json(descriptor) = translate(Json(def)).await.unwrap();
        assert_eq!(descriptor.key_columns, vec![0, 1]);
        assert!(descriptor.blocking);
        assert_eq!(descriptor.output_schema.fields[2].name, "p95_amount");
    }
}
