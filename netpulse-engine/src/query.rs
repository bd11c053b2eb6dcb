//! Keyword-matched responses to operator questions.
//!
//! Matching is ordered: the first rule whose keywords appear in the
//! lowercased question wins, and anything unrecognized falls through
//! to a fixed apology line.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use netpulse_core::QueryMessage;
use netpulse_metrics::MetricsEngine;
use netpulse_store::SharedPacketStore;

use crate::PipelineError;

static PACKET_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"packet\s+(\d+)").expect("packet index regex"));

/// Answers operator questions.
pub trait QueryHandler: Send + Sync {
    fn respond(&self, query: &QueryMessage) -> Result<String, PipelineError>;
}

/// Default responder backed by the live metrics snapshot and the
/// shared packet store.
pub struct QueryResponder {
    engine: Arc<MetricsEngine>,
    store: Arc<SharedPacketStore>,
}

impl QueryResponder {
    pub fn new(engine: Arc<MetricsEngine>, store: Arc<SharedPacketStore>) -> Self {
        Self { engine, store }
    }

    fn describe_packet(&self, text: &str) -> String {
        let index = PACKET_INDEX_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<usize>().ok());
        match index {
            Some(index) => {
                let store = self.store.lock();
                match store.get(index) {
                    Some(record) => format!("Packet #{}:\n{}", index, record),
                    None => format!(
                        "Packet #{} not found. Storage has {} packets.",
                        index,
                        store.len()
                    ),
                }
            }
            None => "Please specify a packet number, e.g., 'show packet 5'.".to_string(),
        }
    }
}

impl QueryHandler for QueryResponder {
    fn respond(&self, query: &QueryMessage) -> Result<String, PipelineError> {
        let text = query.text.to_lowercase();
        let snapshot = self.engine.get();

        let answer = if text.contains("latency") {
            format!("The average latency is {:.2} ms.", snapshot.avg_latency_ms)
        } else if text.contains("alert") {
            let active = snapshot.active_anomalies();
            if active.is_empty() {
                "No active alerts at the moment.".to_string()
            } else {
                format!("Yes, there are active anomalies: {}.", active.join(", "))
            }
        } else if text.contains("packet") && text.contains("rate") {
            format!(
                "Current packet rate is {:.2} packets/sec.",
                snapshot.packet_rate
            )
        } else if text.contains("total") && text.contains("packet") {
            format!("Total packets captured: {}.", snapshot.total_packets)
        } else if text.contains("throughput") {
            format!(
                "Current throughput is {:.2} Mbps.",
                snapshot.throughput_bps / 1_000_000.0
            )
        } else if text.contains("show packet") || text.contains("get packet") {
            self.describe_packet(&text)
        } else {
            "I'm not sure how to answer that.".to_string()
        };
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_config::MetricsConfig;
    use netpulse_core::{EventBus, PacketRecord};

    fn responder_with(config: MetricsConfig) -> (QueryResponder, Arc<MetricsEngine>) {
        let engine = Arc::new(MetricsEngine::new(config, Arc::new(EventBus::new())));
        let store = Arc::new(SharedPacketStore::with_capacity(None));
        (
            QueryResponder::new(Arc::clone(&engine), store),
            engine,
        )
    }

    fn packet(len: u32) -> PacketRecord {
        PacketRecord {
            timestamp: Some(1000.0),
            length: Some(len),
            protocol: "tcp".to_string(),
            ..Default::default()
        }
    }

    fn ask(responder: &QueryResponder, text: &str) -> String {
        responder.respond(&QueryMessage::new(text)).unwrap()
    }

    #[test]
    fn answers_latency_questions() {
        let (responder, _) = responder_with(MetricsConfig::default());
        assert_eq!(
            ask(&responder, "What is the current latency?"),
            "The average latency is 0.00 ms."
        );
    }

    #[test]
    fn answers_rate_and_total_questions() {
        let (responder, engine) = responder_with(MetricsConfig::default());
        for _ in 0..3 {
            engine.ingest(&packet(100));
        }
        assert_eq!(
            ask(&responder, "what's the packet rate?"),
            "Current packet rate is 0.30 packets/sec."
        );
        assert_eq!(
            ask(&responder, "How many total packets so far?"),
            "Total packets captured: 3."
        );
    }

    #[test]
    fn answers_throughput_in_mbps() {
        let (responder, engine) = responder_with(MetricsConfig::default());
        engine.ingest(&packet(1_250_000));
        assert_eq!(
            ask(&responder, "current throughput please"),
            "Current throughput is 1.00 Mbps."
        );
    }

    #[test]
    fn reports_quiet_when_no_anomalies() {
        let (responder, _) = responder_with(MetricsConfig::default());
        assert_eq!(
            ask(&responder, "any alerts right now?"),
            "No active alerts at the moment."
        );
    }

    #[test]
    fn lists_active_anomalies() {
        let config = MetricsConfig {
            high_packet_rate: 0.1,
            ..Default::default()
        };
        let (responder, engine) = responder_with(config);
        engine.ingest(&packet(100));
        engine.ingest(&packet(100));
        let answer = ask(&responder, "any alerts?");
        assert!(answer.starts_with("Yes, there are active anomalies:"));
        assert!(answer.contains("high_packet_rate"));
    }

    #[test]
    fn shows_a_stored_packet_by_index() {
        let (responder, _) = responder_with(MetricsConfig::default());
        responder.store.lock().ingest(&packet(100)).unwrap();
        let answer = ask(&responder, "show packet 0");
        assert!(answer.starts_with("Packet #0:\n"));
        assert!(answer.contains("Proto: TCP | Len: 100"));
    }

    #[test]
    fn get_packet_is_an_alias_for_show_packet() {
        let (responder, _) = responder_with(MetricsConfig::default());
        responder.store.lock().ingest(&packet(64)).unwrap();
        assert!(ask(&responder, "get packet 0").starts_with("Packet #0:\n"));
    }

    #[test]
    fn reports_missing_packet_indices() {
        let (responder, _) = responder_with(MetricsConfig::default());
        assert_eq!(
            ask(&responder, "show packet 7"),
            "Packet #7 not found. Storage has 0 packets."
        );
    }

    #[test]
    fn prompts_for_a_packet_number() {
        let (responder, _) = responder_with(MetricsConfig::default());
        assert_eq!(
            ask(&responder, "show packet"),
            "Please specify a packet number, e.g., 'show packet 5'."
        );
    }

    #[test]
    fn falls_back_on_unrecognized_questions() {
        let (responder, _) = responder_with(MetricsConfig::default());
        assert_eq!(
            ask(&responder, "tell me a joke"),
            "I'm not sure how to answer that."
        );
    }
}
