//! Read-only scenario data queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::runtime::{
    GetBalanceResponse, GetContactsResponse, GetConversationsResponse, GetRecentUpdatesResponse,
    GetTransactionsResponse, ListEventsResponse, ToolResponse,
};
use crate::models::scenario::ScenarioPackage;
use crate::runner::router::ToolHandler;

const HANDLED_TOOLS: [&str; 8] = [
    "query_wearable",
    "get_recent_updates",
    "get_contacts",
    "get_conversations",
    "list_events",
    "get_forecast",
    "get_balance",
    "get_transactions",
];

/// Serves every read-only scenario query. The orchestrator advances
/// `current_index` before dispatching each heartbeat's tool calls; the
/// heartbeat in view is always `scenario.heartbeats[current_index]`.
pub struct ScenarioDataHandler {
    scenario: Arc<ScenarioPackage>,
    current_index: AtomicUsize,
}

impl ScenarioDataHandler {
    pub fn new(scenario: Arc<ScenarioPackage>) -> Self {
        Self {
            scenario,
            current_index: AtomicUsize::new(0),
        }
    }

    /// Point the handler at the heartbeat about to be executed.
    pub fn set_current_index(&self, index: usize) {
        self.current_index.store(index, Ordering::Relaxed);
    }

    fn current(&self) -> &crate::models::scenario::HeartbeatPayload {
        let idx = self
            .current_index
            .load(Ordering::Relaxed)
            .min(self.scenario.heartbeats.len().saturating_sub(1));
        &self.scenario.heartbeats[idx]
    }

    fn recent_updates(&self, args: &serde_json::Map<String, Value>) -> ToolResponse {
        let Some(count) = args.get("count").and_then(Value::as_u64) else {
            return ToolResponse::error("count parameter required");
        };
        let end = self.current_index.load(Ordering::Relaxed) + 1;
        let end = end.min(self.scenario.heartbeats.len());
        let start = end.saturating_sub(count as usize);
        ToolResponse::RecentUpdates(GetRecentUpdatesResponse {
            status: "ok".into(),
            heartbeats: self.scenario.heartbeats[start..end].to_vec(),
        })
    }

    fn list_events(&self) -> ToolResponse {
        let events = self
            .current()
            .calendar
            .as_ref()
            .map(|c| c.next_3_events.clone())
            .unwrap_or_default();
        ToolResponse::ListEvents(ListEventsResponse {
            status: "ok".into(),
            events,
        })
    }

    fn balance(&self) -> ToolResponse {
        match self.current().financial.as_ref() {
            Some(fin) => ToolResponse::Balance(GetBalanceResponse {
                status: "ok".into(),
                account_balance: fin.account_balance,
                pending_charges: fin.pending_charges.clone(),
            }),
            None => ToolResponse::error("Financial data not available at this tier"),
        }
    }

    fn transactions(&self, args: &serde_json::Map<String, Value>) -> ToolResponse {
        let Some(fin) = self.current().financial.as_ref() else {
            return ToolResponse::error("Financial data not available at this tier");
        };
        let Some(count) = args.get("count").and_then(Value::as_u64) else {
            return ToolResponse::error("count parameter required");
        };
        let take = (count as usize).min(fin.last_3_transactions.len());
        ToolResponse::Transactions(GetTransactionsResponse {
            status: "ok".into(),
            transactions: fin.last_3_transactions[..take].to_vec(),
        })
    }
}

#[async_trait]
impl ToolHandler for ScenarioDataHandler {
    fn handler_name(&self) -> &'static str {
        "ScenarioDataHandler"
    }

    fn can_handle(&self, tool_name: &str) -> bool {
        HANDLED_TOOLS.contains(&tool_name)
    }

    async fn handle(&self, tool_name: &str, args: &serde_json::Map<String, Value>) -> ToolResponse {
        match tool_name {
            "query_wearable" => ToolResponse::query_wearable(self.current().wearable.as_ref()),
            "get_recent_updates" => self.recent_updates(args),
            "get_contacts" => ToolResponse::Contacts(GetContactsResponse {
                status: "ok".into(),
                contacts: self.scenario.contacts.clone(),
            }),
            // Conversation tracking is a future increment.
            "get_conversations" => ToolResponse::Conversations(GetConversationsResponse {
                status: "ok".into(),
                conversations: vec![],
            }),
            "list_events" => self.list_events(),
            "get_forecast" => ToolResponse::forecast(self.current().weather.as_ref()),
            "get_balance" => self.balance(),
            "get_transactions" => self.transactions(args),
            other => ToolResponse::error(format!("Unhandled tool {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_scenario, GenerateParams};
    use crate::models::scenario::NoiseTier;

    fn package(tier: NoiseTier) -> Arc<ScenarioPackage> {
        Arc::new(generate_scenario(GenerateParams::new("cardiac_arrest", tier, 7)).unwrap())
    }

    fn no_args() -> serde_json::Map<String, Value> {
        serde_json::Map::new()
    }

    #[tokio::test]
    async fn query_wearable_serves_the_current_heartbeat() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(Arc::clone(&pkg));
        handler.set_current_index(10);
        let response = handler.handle("query_wearable", &no_args()).await;
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(
            value["data"]["heart_rate"].as_u64().unwrap(),
            u64::from(pkg.heartbeats[10].wearable.as_ref().unwrap().heart_rate)
        );
    }

    #[tokio::test]
    async fn recent_updates_windows_backwards_from_current() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(pkg);
        handler.set_current_index(5);
        let mut args = no_args();
        args.insert("count".into(), serde_json::json!(3));
        let response = handler.handle("get_recent_updates", &args).await;
        match response {
            ToolResponse::RecentUpdates(r) => {
                let ids: Vec<u32> = r.heartbeats.iter().map(|h| h.heartbeat_id).collect();
                assert_eq!(ids, vec![3, 4, 5]);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn recent_updates_requires_count() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(pkg);
        let response = handler.handle("get_recent_updates", &no_args()).await;
        assert_eq!(response.status(), "error");
    }

    #[tokio::test]
    async fn forecast_is_empty_shape_when_tier_lacks_weather() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(pkg);
        let response = handler.handle("get_forecast", &no_args()).await;
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, serde_json::json!({"status": "ok", "forecast": {}}));
    }

    #[tokio::test]
    async fn transactions_error_when_tier_lacks_financial() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(pkg);
        let mut args = no_args();
        args.insert("count".into(), serde_json::json!(3));
        let response = handler.handle("get_transactions", &args).await;
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("tier"));
    }

    #[tokio::test]
    async fn transactions_served_at_t4() {
        let pkg = package(NoiseTier::T4);
        let handler = ScenarioDataHandler::new(pkg);
        handler.set_current_index(30);
        let mut args = no_args();
        args.insert("count".into(), serde_json::json!(2));
        let response = handler.handle("get_transactions", &args).await;
        match response {
            ToolResponse::Transactions(r) => assert_eq!(r.transactions.len(), 2),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn contacts_come_from_the_package() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(Arc::clone(&pkg));
        let response = handler.handle("get_contacts", &no_args()).await;
        match response {
            ToolResponse::Contacts(r) => assert_eq!(r.contacts.len(), pkg.contacts.len()),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn conversations_are_empty_in_this_version() {
        let pkg = package(NoiseTier::T1);
        let handler = ScenarioDataHandler::new(pkg);
        let response = handler.handle("get_conversations", &no_args()).await;
        match response {
            ToolResponse::Conversations(r) => assert!(r.conversations.is_empty()),
            other => panic!("unexpected response {other:?}"),
        }
    }
}
