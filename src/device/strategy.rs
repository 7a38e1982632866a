use super::dispatch::{CollectionSpec, Strategy};
use crate::error::{ProbeError, Result};
use crate::query_engine::QueryEngine;
use crate::snmp::{in_subtree, Exchange, Method, Sample};
use tracing::{debug, warn};

/// Runs the strategy named in `spec` and returns the raw CPU figure.
pub async fn collect<E: Exchange>(
    engine: &QueryEngine<'_, E>,
    spec: &CollectionSpec,
    max_chain_steps: usize,
) -> Result<i64> {
    debug!(
        "{}: collecting {} via {:?}",
        engine.target(),
        spec.oid,
        spec.strategy
    );
    match spec.strategy {
        Strategy::SingleGet => single(engine, spec.oid, Method::Get).await,
        Strategy::GetNextSingle => single(engine, spec.oid, Method::GetNext).await,
        Strategy::ChainWalkThreshold => chain_walk(engine, spec.oid, max_chain_steps).await,
        Strategy::WalkAverage => walk_average(engine, spec.oid).await,
        Strategy::LinuxComplement => linux_complement(engine, spec.oid).await,
        Strategy::MasterIndexLookup { probes } => {
            master_index_lookup(engine, spec.oid, probes).await
        }
    }
}

fn first<'s>(samples: &'s [Sample], oid: &str) -> Result<&'s Sample> {
    samples.first().ok_or_else(|| ProbeError::EmptyResponse {
        oid: oid.to_string(),
    })
}

/// One GET or GETNEXT; the first sample's value is the answer.
pub async fn single<E: Exchange>(engine: &QueryEngine<'_, E>, oid: &str, method: Method) -> Result<i64> {
    let samples = engine.query(oid, method).await?;
    first(&samples, oid)?.as_int()
}

/// Steps through a per-module table with GETNEXT and returns the first
/// nonzero reading. If the subtree runs out first, the last reading seen
/// (zero) is returned.
pub async fn chain_walk<E: Exchange>(
    engine: &QueryEngine<'_, E>,
    base: &str,
    max_steps: usize,
) -> Result<i64> {
    let mut cursor = base.to_string();
    let mut value = 0;

    for _ in 0..max_steps {
        let samples = engine.query(&cursor, Method::GetNext).await?;
        let sample = first(&samples, &cursor)?;
        // Arc-boundary match: `...1.8` does not cover `...1.80`.
        if !in_subtree(&sample.name, base) {
            return Ok(value);
        }
        value = sample.as_int()?;
        if value != 0 {
            return Ok(value);
        }
        cursor = sample.name.clone();
    }

    warn!(
        "{}: chained walk of {base} stopped after {max_steps} steps",
        engine.target()
    );
    Ok(value)
}

/// Walks the subtree and averages every value, rounding down.
pub async fn walk_average<E: Exchange>(engine: &QueryEngine<'_, E>, oid: &str) -> Result<i64> {
    let samples = engine.query(oid, Method::Walk).await?;
    if samples.is_empty() {
        return Ok(0);
    }
    let mut sum = 0i64;
    for sample in &samples {
        let value = sample.as_int()?;
        sum = sum.checked_add(value).ok_or_else(|| ProbeError::OutOfRange {
            oid: sample.name.clone(),
            value,
        })?;
    }
    Ok(sum / samples.len() as i64)
}

/// The OID reports idle time; utilization is the remainder.
pub async fn linux_complement<E: Exchange>(engine: &QueryEngine<'_, E>, oid: &str) -> Result<i64> {
    let idle = single(engine, oid, Method::Get).await?;
    100i64.checked_sub(idle).ok_or_else(|| ProbeError::OutOfRange {
        oid: oid.to_string(),
        value: idle,
    })
}

/// Finds the active master engine, then reads CPU for that engine.
///
/// Each probe OID is read in turn; the first one whose value is 0 marks the
/// active engine, and the last character of its returned name is the engine
/// index. The final OID is `base.0.0.<index>.0`. A probe that fails is
/// skipped; its error is only reported if no probe finds the engine.
pub async fn master_index_lookup<E: Exchange>(
    engine: &QueryEngine<'_, E>,
    base: &str,
    probes: &[&str],
) -> Result<i64> {
    let mut index = None;
    let mut probe_error = None;
    for probe in probes {
        let samples = match engine.query(probe, Method::Get).await {
            Ok(samples) => samples,
            Err(e) => {
                debug!("{}: master probe {probe} failed: {e}", engine.target());
                probe_error = Some(e);
                continue;
            }
        };
        let Some(sample) = samples.first() else {
            continue;
        };
        if sample.as_int()? == 0 {
            index = sample.name.chars().last();
            break;
        }
    }

    let Some(index) = index else {
        if let Some(e) = probe_error {
            return Err(e);
        }
        return Err(ProbeError::NoMasterEngine {
            oid: base.to_string(),
        });
    };
    debug!("{}: master engine index {index}", engine.target());

    let oid = format!("{base}.0.0.{index}.0");
    single(engine, &oid, Method::Get).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::device::Connection;
    use crate::query_engine::RetryPolicy;
    use crate::snmp::fake::ScriptedExchange;
    use std::time::Duration;

    const BASE: &str = "1.3.6.1.4.1.25506.2.6.1.1.1.1.6";

    fn policy() -> RetryPolicy {
        RetryPolicy::new(1, Duration::from_secs(1)).with_delay(Duration::ZERO)
    }

    fn connection() -> Connection {
        Connection::new("192.0.2.10", "public")
    }

    #[tokio::test]
    async fn chain_walk_stops_at_first_nonzero() {
        let exchange = ScriptedExchange::new(vec![
            Ok(vec![Sample::int(format!("{BASE}.1"), 0)]),
            Ok(vec![Sample::int(format!("{BASE}.2"), 0)]),
            Ok(vec![Sample::int(format!("{BASE}.3"), 7)]),
            Ok(vec![Sample::int("1.3.6.1.4.1.25506.2.6.1.1.1.1.7.1", 99)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        assert_eq!(chain_walk(&engine, BASE, 256).await.unwrap(), 7);

        let cursors: Vec<String> = exchange.requests().into_iter().map(|(oid, _)| oid).collect();
        assert_eq!(
            cursors,
            vec![BASE.to_string(), format!("{BASE}.1"), format!("{BASE}.2")]
        );
    }

    #[tokio::test]
    async fn chain_walk_returns_last_value_when_subtree_ends() {
        let exchange = ScriptedExchange::new(vec![
            Ok(vec![Sample::int(format!("{BASE}.1"), 0)]),
            Ok(vec![Sample::int(format!("{BASE}.2"), 0)]),
            Ok(vec![Sample::int("1.3.6.1.4.1.25506.2.6.1.1.1.1.7.1", 42)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        assert_eq!(chain_walk(&engine, BASE, 256).await.unwrap(), 0);
        assert_eq!(exchange.requests().len(), 3);
    }

    #[tokio::test]
    async fn chain_walk_stops_at_sibling_sharing_text_prefix() {
        let exchange = ScriptedExchange::new(vec![
            Ok(vec![Sample::int(format!("{BASE}.1"), 0)]),
            Ok(vec![Sample::int(format!("{BASE}0.1"), 5)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        assert_eq!(chain_walk(&engine, BASE, 256).await.unwrap(), 0);
        assert_eq!(exchange.requests().len(), 2);
    }

    #[tokio::test]
    async fn chain_walk_is_bounded() {
        let replies = (0..10)
            .map(|i| Ok(vec![Sample::int(format!("{BASE}.{i}"), 0)]))
            .collect();
        let exchange = ScriptedExchange::new(replies);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        assert_eq!(chain_walk(&engine, BASE, 4).await.unwrap(), 0);
        assert_eq!(exchange.requests().len(), 4);
    }

    #[tokio::test]
    async fn chain_walk_without_samples_is_a_data_fault() {
        let exchange = ScriptedExchange::new(vec![]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let err = chain_walk(&engine, BASE, 256).await.unwrap_err();
        assert!(matches!(err, ProbeError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn walk_average_uses_integer_division() {
        let exchange = ScriptedExchange::new(vec![Ok(vec![
            Sample::int("1.3.6.1.4.1.9.9.109.1.1.1.1.7.1", 10),
            Sample::int("1.3.6.1.4.1.9.9.109.1.1.1.1.7.2", 20),
            Sample::int("1.3.6.1.4.1.9.9.109.1.1.1.1.7.3", 30),
        ])]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        assert_eq!(
            walk_average(&engine, "1.3.6.1.4.1.9.9.109.1.1.1.1.7").await.unwrap(),
            20
        );

        let exchange = ScriptedExchange::new(vec![Ok(vec![Sample::int("1.3.1", 3), Sample::int("1.3.2", 4)])]);
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        assert_eq!(walk_average(&engine, "1.3").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn walk_average_of_nothing_is_zero() {
        let exchange = ScriptedExchange::new(vec![]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        assert_eq!(walk_average(&engine, "1.3.6.1.4.1.2011.6.3.4.1.2").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn walk_average_overflow_is_a_data_fault() {
        let exchange = ScriptedExchange::new(vec![Ok(vec![
            Sample::int("1.3.1", i64::MAX),
            Sample::int("1.3.2", 1),
        ])]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let err = walk_average(&engine, "1.3").await.unwrap_err();
        assert!(matches!(err, ProbeError::OutOfRange { value: 1, .. }));
        assert!(err.is_contained());
    }

    #[tokio::test]
    async fn linux_complement_overflow_is_a_data_fault() {
        let exchange = ScriptedExchange::new(vec![Ok(vec![Sample::int(
            "1.3.6.1.4.1.2021.11.11.0",
            i64::MIN,
        )])]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let err = linux_complement(&engine, "1.3.6.1.4.1.2021.11.11.0")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::OutOfRange { value: i64::MIN, .. }));
        assert!(err.is_contained());
    }

    #[tokio::test]
    async fn linux_reports_complement_of_idle() {
        let exchange = ScriptedExchange::new(vec![Ok(vec![Sample::int(
            "1.3.6.1.4.1.2021.11.11.0",
            63,
        )])]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        assert_eq!(
            linux_complement(&engine, "1.3.6.1.4.1.2021.11.11.0").await.unwrap(),
            37
        );
    }

    #[tokio::test]
    async fn single_rejects_text_values() {
        let exchange = ScriptedExchange::new(vec![Ok(vec![Sample::text("1.3.6.1", "busy")])]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        let err = single(&engine, "1.3.6.1", Method::GetNext).await.unwrap_err();
        assert!(matches!(err, ProbeError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn master_lookup_builds_final_oid_from_probe_name() {
        let base = "1.3.6.1.4.1.3902.3.6002.2.1.1.7";
        let exchange = ScriptedExchange::new(vec![
            Ok(vec![Sample::int("1.3.6.1.4.1.3902.3.6002.1.3.1.6.0.0.3", 1)]),
            Ok(vec![Sample::int("1.3.6.1.4.1.3902.3.6002.1.3.1.6.0.0.5", 0)]),
            Ok(vec![Sample::int(format!("{base}.0.0.5.0"), 23)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let value = master_index_lookup(&engine, base, &["probe.a", "probe.b"])
            .await
            .unwrap();
        assert_eq!(value, 23);
        assert_eq!(
            exchange.requests(),
            vec![
                ("probe.a".to_string(), Method::Get),
                ("probe.b".to_string(), Method::Get),
                (format!("{base}.0.0.5.0"), Method::Get),
            ]
        );
    }

    #[tokio::test]
    async fn master_lookup_skips_failing_probe() {
        let base = "1.3.6.1.4.1.3902.3.6002.2.1.1.7";
        let exchange = ScriptedExchange::new(vec![
            Err(ProbeError::Transport("genErr".into())),
            Ok(vec![Sample::int("1.3.6.1.4.1.3902.3.6002.1.3.1.6.0.0.4", 0)]),
            Ok(vec![Sample::int(format!("{base}.0.0.4.0"), 23)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let value = master_index_lookup(&engine, base, &["probe.a", "probe.b"])
            .await
            .unwrap();
        assert_eq!(value, 23);
        assert_eq!(exchange.requests()[2], (format!("{base}.0.0.4.0"), Method::Get));
    }

    #[tokio::test]
    async fn master_lookup_reports_probe_error_when_no_engine_found() {
        let exchange = ScriptedExchange::new(vec![
            Err(ProbeError::Transport("genErr".into())),
            Ok(vec![Sample::int("probe.b.4", 2)]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let err = master_index_lookup(&engine, "1.3.6", &["probe.a", "probe.b"])
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
        assert_eq!(exchange.requests().len(), 2);
    }

    #[tokio::test]
    async fn master_lookup_without_active_engine_is_a_data_fault() {
        let exchange = ScriptedExchange::new(vec![
            Ok(vec![Sample::int("probe.a.3", 1)]),
            Ok(vec![]),
        ]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);

        let err = master_index_lookup(&engine, "1.3.6", &["probe.a", "probe.b"])
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::NoMasterEngine { .. }));
        assert_eq!(exchange.requests().len(), 2);
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let exchange = ScriptedExchange::new(vec![Err(ProbeError::Transport("unreachable".into()))]);
        let (connection, policy) = (connection(), policy());
        let engine = QueryEngine::new(&exchange, &connection, &policy);
        let err = walk_average(&engine, "1.3").await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
    }
}
