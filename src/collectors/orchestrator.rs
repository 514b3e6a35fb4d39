use crate::{
    collectors::{
        endpoint_poller::SnapshotClient,
        Collector,
        SnapshotCollector,
    },
    metrics::{
        Accumulator,
        MemoryAccumulator,
        Metric,
        Role,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use comfy_table::{
    presets,
    Attribute,
    Cell,
    Color,
    ContentArrangement,
    Table,
};
use eyre::{
    eyre,
    Result,
};
use futures::future::join_all;
use serde::{
    Deserialize,
    Serialize,
};
use snapshot_gatherer_config::Config;
use std::sync::Arc;

/// Outcome of one gather cycle across all roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub metrics: Vec<Metric>,
    pub errors: Vec<RoleError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleError {
    pub role: Role,
    pub endpoint: String,
    pub message: String,
}

/// Drives one [`SnapshotCollector`] per enabled role over a shared client
/// and accumulator.
pub struct Orchestrator {
    collectors: Vec<SnapshotCollector>,
    accumulator: Arc<MemoryAccumulator>,
    report: Option<CycleReport>,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Result<Self> {
        // Create shared client once
        let client = SnapshotClient::new()?;

        let collectors = Role::all()
            .filter_map(|role| {
                let role_config = config.role(&role.to_string())?;
                role_config
                    .enabled
                    .then(|| SnapshotCollector::new(role, role_config.clone(), client.clone()))
            })
            .collect::<Vec<_>>();

        if collectors.is_empty() {
            return Err(eyre!("No role is enabled, nothing to gather"));
        }

        Ok(Self::with_collectors(collectors))
    }

    pub fn with_collectors(collectors: Vec<SnapshotCollector>) -> Self {
        Self {
            collectors,
            accumulator: Arc::new(MemoryAccumulator::new()),
            report: None,
        }
    }

    pub fn collectors(&self) -> &[SnapshotCollector] {
        &self.collectors
    }

    pub fn report(&self) -> Option<&CycleReport> {
        self.report.as_ref()
    }

    /// Runs one gather cycle for every role concurrently.
    ///
    /// The report is stored even when some endpoints failed; the returned
    /// error then lists every failure.
    pub async fn collect(&mut self) -> Result<()> {
        let started_at = Utc::now();
        let acc: Arc<dyn Accumulator> = self.accumulator.clone();

        let outcomes = join_all(self.collectors.iter_mut().map(|collector| {
            let role = collector.role();
            let acc = acc.clone();
            async move { (role, collector.collect(acc).await) }
        }))
        .await;

        let mut errors = Vec::new();
        for (role, outcome) in outcomes {
            if let Err(err) = outcome {
                errors.extend(err.into_failures().into_iter().map(|failure| RoleError {
                    role,
                    endpoint: failure.endpoint,
                    message: failure.error.to_string(),
                }));
            }
        }

        let report = CycleReport {
            started_at,
            finished_at: Utc::now(),
            metrics: self.accumulator.drain(),
            errors,
        };
        info!(
            metrics = report.metrics.len(),
            errors = report.errors.len(),
            "Gather cycle finished"
        );

        let failed = !report.errors.is_empty();
        let message = report
            .errors
            .iter()
            .map(|err| format!("{} {}: {}", err.role, err.endpoint, err.message))
            .collect::<Vec<_>>()
            .join("\n");
        self.report = Some(report);

        if failed {
            return Err(eyre!(message));
        }
        Ok(())
    }

    pub fn format(&self) -> String {
        let Some(report) = &self.report else {
            return "No gather cycle has run yet.\n".to_string();
        };

        let mut output = String::new();
        output.push_str(&format!(
            "\nGather cycle {} ({} ms)\n",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            (report.finished_at - report.started_at).num_milliseconds()
        ));

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Measurement").add_attribute(Attribute::Bold),
                Cell::new("Server").add_attribute(Attribute::Bold),
                Cell::new("Fields").add_attribute(Attribute::Bold),
                Cell::new("Status").add_attribute(Attribute::Bold),
            ]);

        for metric in &report.metrics {
            table.add_row(vec![
                Cell::new(&metric.measurement),
                Cell::new(metric.tag("server").unwrap_or("-")),
                Cell::new(metric.fields.len()),
                Cell::new("ok").fg(Color::Green),
            ]);
        }

        for err in &report.errors {
            table.add_row(vec![
                Cell::new(err.role.descriptor().measurement),
                Cell::new(&err.endpoint),
                Cell::new("-"),
                Cell::new(&err.message).fg(Color::Red),
            ]);
        }

        output.push_str(&format!("{table}\n"));
        output
    }

    pub fn summary(&self) -> serde_json::Value {
        match &self.report {
            Some(report) => serde_json::json!({
                "collection_info": {
                    "started_at": report.started_at,
                    "finished_at": report.finished_at,
                    "roles": self.collectors.iter().map(|c| c.role()).collect::<Vec<_>>(),
                },
                "metrics": report.metrics,
                "errors": report.errors,
            }),
            None => serde_json::Value::Null,
        }
    }
}
