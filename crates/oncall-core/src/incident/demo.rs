//! Demo data set: five alerts, three runbooks, canned tool results.

use chrono::{Duration, Utc};
use serde_json::json;

use super::types::{Alert, AlertSeverity, Runbook, Telemetry};
use crate::tools::StaticToolTable;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn runbooks() -> Vec<Runbook> {
    vec![
        Runbook {
            id: "RB-A".to_string(),
            name: "API 5xx Spikes".to_string(),
            symptoms: strings(&[
                "Elevated HTTP 500/502/503 rates",
                "Increased latency in edge nodes",
            ]),
            checks: strings(&[
                "Check upstream service health",
                "Verify recent deployment stability",
                "Inspect for timeout patterns in logs",
            ]),
            likely_causes: strings(&[
                "Downstream dependency failure",
                "Bad code deploy",
                "Resource exhaustion",
            ]),
            remediation: strings(&[
                "Rollback last deploy",
                "Scale API instances",
                "Circuit break failing downstream",
            ]),
        },
        Runbook {
            id: "RB-B".to_string(),
            name: "DB Connection Pool Exhaustion".to_string(),
            symptoms: strings(&[
                "DB connection timeouts",
                "App service thread pool saturation",
                "High DB CPU",
            ]),
            checks: strings(&[
                "Count active connections vs max",
                "Check slow query logs",
                "Identify connection leaks",
            ]),
            likely_causes: strings(&[
                "Missing connection closing",
                "Burst in traffic",
                "Degraded DB performance",
            ]),
            remediation: strings(&[
                "Kill long-running queries",
                "Increase pool size",
                "Scale DB read replicas",
            ]),
        },
        Runbook {
            id: "RB-C".to_string(),
            name: "Redis Latency / Cache Saturation".to_string(),
            symptoms: strings(&[
                "Increased Redis response time",
                "High cache miss rate",
                "Application latency spikes",
            ]),
            checks: strings(&[
                "Check Redis CPU and Memory",
                "Verify network throughput",
                "Inspect keyspace eviction rate",
            ]),
            likely_causes: strings(&[
                "Hot key access",
                "Memory fragmentation",
                "Network congestion",
            ]),
            remediation: strings(&[
                "Flush non-critical keys",
                "Scale Redis cluster",
                "Implement client-side caching",
            ]),
        },
    ]
}

pub fn alerts() -> Vec<Alert> {
    let now = Utc::now();
    vec![
        Alert {
            id: "ALRT-001".to_string(),
            title: "API 5xx rate > 5% in us-east-1".to_string(),
            service: "API".to_string(),
            severity: AlertSeverity::Critical,
            region: "us-east-1".to_string(),
            timestamp: now - Duration::minutes(4),
            telemetry: Telemetry {
                cpu_usage: 45.0,
                db_connections: 42.0,
                redis_latency: 12.0,
                thread_pool_usage: 25.0,
                recent_deploy: "API v2.4.1 (12 mins ago)".to_string(),
                error_rate: 6.2,
                memory_usage: 58.0,
            },
            logs: strings(&[
                "14:02:01 INFO [API] Request processed in 45ms",
                "14:02:05 ERROR [API] Upstream 'PaymentSvc' timed out after 2000ms",
                "14:02:05 WARN [API] Retrying PaymentSvc call (attempt 1/3)",
                "14:02:07 ERROR [API] 502 Bad Gateway: PaymentSvc unreachable",
                "14:02:08 ERROR [API] Stacktrace: java.net.ConnectException: Connection refused",
            ]),
        },
        Alert {
            id: "ALRT-002".to_string(),
            title: "PaymentSvc latency > 2s".to_string(),
            service: "PaymentSvc".to_string(),
            severity: AlertSeverity::Critical,
            region: "us-west-2".to_string(),
            timestamp: now - Duration::minutes(2),
            telemetry: Telemetry {
                cpu_usage: 32.0,
                db_connections: 88.0,
                redis_latency: 450.0,
                thread_pool_usage: 92.0,
                recent_deploy: "PaymentSvc v1.2.4 (15 mins ago)".to_string(),
                error_rate: 1.1,
                memory_usage: 74.0,
            },
            logs: strings(&[
                "13:58:10 INFO [PaymentSvc] Executing transaction TX-992",
                "13:58:12 WARN [PaymentSvc] Redis command GET 'session_992' took 420ms",
                "13:58:15 ERROR [PaymentSvc] Cache access degraded; falling back to DB",
                "13:58:20 INFO [PaymentSvc] Thread pool 'Worker-1' saturated; queue length > 1000",
                "13:58:22 WARN [PaymentSvc] High latency detected on Redis cluster node 04",
            ]),
        },
        Alert {
            id: "ALRT-003".to_string(),
            title: "DB CPU > 85%".to_string(),
            service: "DB".to_string(),
            severity: AlertSeverity::Warning,
            region: "us-east-1".to_string(),
            timestamp: now - Duration::minutes(15),
            telemetry: Telemetry {
                cpu_usage: 89.0,
                db_connections: 120.0,
                redis_latency: 8.0,
                thread_pool_usage: 10.0,
                recent_deploy: "N/A".to_string(),
                error_rate: 0.2,
                memory_usage: 92.0,
            },
            logs: strings(&[
                "13:45:00 INFO [DB] Vacuuming system catalogs",
                "13:46:12 WARN [DB] Slow query detected (12.4s): SELECT * FROM large_audit_trail...",
                "13:47:05 ERROR [DB] Out of memory condition imminent in shared_buffers",
                "13:48:00 INFO [DB] Checkpoint starting: forced by time",
            ]),
        },
        Alert {
            id: "ALRT-004".to_string(),
            title: "Cache miss rate spiking".to_string(),
            service: "Cache".to_string(),
            severity: AlertSeverity::Warning,
            region: "eu-central-1".to_string(),
            timestamp: now - Duration::minutes(8),
            telemetry: Telemetry {
                cpu_usage: 12.0,
                db_connections: 5.0,
                redis_latency: 22.0,
                thread_pool_usage: 5.0,
                recent_deploy: "N/A".to_string(),
                error_rate: 0.1,
                memory_usage: 98.0,
            },
            logs: strings(&[
                "13:52:00 INFO [Cache] Maxmemory limit hit (2GB)",
                "13:52:05 WARN [Cache] Evicting keys using allkeys-lru policy",
                "13:53:10 INFO [Cache] Miss rate increased to 42% (Normal: 4%)",
                "13:54:01 WARN [Cache] Hot key 'global_config_v2' detected",
            ]),
        },
        Alert {
            id: "ALRT-005".to_string(),
            title: "Auth timeouts increasing".to_string(),
            service: "Auth".to_string(),
            severity: AlertSeverity::Critical,
            region: "us-east-1".to_string(),
            timestamp: now - Duration::minutes(3),
            telemetry: Telemetry {
                cpu_usage: 18.0,
                db_connections: 15.0,
                redis_latency: 5.0,
                thread_pool_usage: 85.0,
                recent_deploy: "Auth v3.0.1 (2 days ago)".to_string(),
                error_rate: 3.4,
                memory_usage: 42.0,
            },
            logs: strings(&[
                "14:00:05 ERROR [Auth] LDAP sync failed: Connection timeout",
                "14:01:12 INFO [Auth] Authenticating user 'admin' via backup DB",
                "14:01:45 WARN [Auth] Internal session pool nearly full",
                "14:02:10 ERROR [Auth] JWT validation failure for kid 'rsa-1'",
            ]),
        },
    ]
}

pub fn find_alert(id: &str) -> Option<Alert> {
    alerts().into_iter().find(|a| a.id.eq_ignore_ascii_case(id))
}

/// Canned tool results keyed by alert ID and tool name.
pub fn tool_table() -> StaticToolTable {
    let mut table = StaticToolTable::new();

    table.insert(
        "ALRT-001",
        "get_dependency_health",
        json!({"PaymentSvc": "Degraded", "AuthSvc": "Healthy", "Redis": "Healthy"}),
    );
    table.insert(
        "ALRT-001",
        "get_recent_deploys",
        json!({"deploys": [
            {"service": "API", "version": "v2.4.1", "minutesAgo": 12},
            {"service": "PaymentSvc", "version": "v1.8.0", "minutesAgo": 14}
        ]}),
    );
    table.insert(
        "ALRT-001",
        "search_logs",
        json!({"matches": 214, "topMessage": "Upstream 'PaymentSvc' timed out after 2000ms"}),
    );

    table.insert(
        "ALRT-002",
        "query_metrics",
        json!({"metric": "redis_p99_ms", "series": [18, 35, 120, 410, 450]}),
    );
    table.insert(
        "ALRT-002",
        "get_dependency_health",
        json!({"Redis": "Degraded (node 04)", "PostgreSQL": "Healthy"}),
    );

    table.insert(
        "ALRT-003",
        "search_logs",
        json!({"matches": 37, "topMessage": "Slow query detected: SELECT * FROM large_audit_trail"}),
    );
    table.insert(
        "ALRT-003",
        "query_metrics",
        json!({"metric": "db_active_connections", "series": [80, 95, 110, 120]}),
    );

    table.insert(
        "ALRT-004",
        "query_metrics",
        json!({"metric": "cache_evictions_per_sec", "series": [40, 900, 2200, 2600]}),
    );

    table.insert(
        "ALRT-005",
        "get_dependency_health",
        json!({"LDAP": "Unreachable", "AuthDB": "Healthy", "JWKS": "Stale key rsa-1"}),
    );
    table.insert(
        "ALRT-005",
        "get_recent_deploys",
        json!({"deploys": [{"service": "Auth", "version": "v3.0.1", "minutesAgo": 2880}]}),
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_alert_has_logs_and_unique_id() {
        let alerts = alerts();
        assert_eq!(alerts.len(), 5);
        let ids: HashSet<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        assert!(alerts.iter().all(|a| !a.logs.is_empty()));
    }

    #[test]
    fn find_alert_is_case_insensitive() {
        assert!(find_alert("alrt-002").is_some());
        assert!(find_alert("ALRT-999").is_none());
    }
}
