//! Static registry of metric groups per role.
//!
//! Every role carries a [`RoleDescriptor`] with its default port, the
//! measurement name results are emitted under and the ordered list of
//! [`MetricGroup`]s that make up its snapshot schema. The registry is plain
//! data: the collector is parameterized by the descriptor instead of being
//! specialized per role.

use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
    IntoEnumIterator as _,
};

/// The daemon role a snapshot endpoint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    #[strum(to_string = "slave", serialize = "agent")]
    Slave,
}

impl Role {
    pub fn descriptor(&self) -> &'static RoleDescriptor {
        match self {
            Role::Master => &MASTER,
            Role::Slave => &SLAVE,
        }
    }

    pub fn all() -> impl Iterator<Item = Role> {
        Role::iter()
    }
}

/// A named set of fully-qualified snapshot keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricGroup {
    pub name: &'static str,
    pub metrics: &'static [&'static str],
}

#[derive(Debug)]
pub struct RoleDescriptor {
    pub role: Role,
    pub default_port: u16,
    pub measurement: &'static str,
    pub groups: &'static [MetricGroup],
    pub description: &'static str,
    pub sample_config: &'static str,
}

impl RoleDescriptor {
    /// Group names in registry order. Requesting all of them is the same as
    /// requesting none.
    pub fn default_metrics(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().map(|group| group.name)
    }

    pub fn group(&self, name: &str) -> Option<&'static MetricGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Keys belonging to `name`. Unknown groups yield an empty slice.
    pub fn group_members(&self, name: &str) -> &'static [&'static str] {
        match self.group(name) {
            Some(group) => group.metrics,
            None => {
                warn!(role = %self.role, group = name, "Unknown metrics group");
                &[]
            }
        }
    }

    /// Whether `key` is listed in any group of this role.
    pub fn is_known_metric(&self, key: &str) -> bool {
        self.groups.iter().any(|group| group.metrics.contains(&key))
    }

    pub fn default_endpoint(&self) -> String {
        format!("localhost:{}", self.default_port)
    }
}

pub fn group_members(role: Role, group: &str) -> &'static [&'static str] {
    role.descriptor().group_members(group)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// master

const MASTER_RESOURCES: &[&str] = &[
    "master/cpus_percent",
    "master/cpus_used",
    "master/cpus_total",
    "master/cpus_revocable_percent",
    "master/cpus_revocable_total",
    "master/cpus_revocable_used",
    "master/disk_percent",
    "master/disk_used",
    "master/disk_total",
    "master/disk_revocable_percent",
    "master/disk_revocable_total",
    "master/disk_revocable_used",
    "master/mem_percent",
    "master/mem_used",
    "master/mem_total",
    "master/mem_revocable_percent",
    "master/mem_revocable_total",
    "master/mem_revocable_used",
];

const MASTER_MASTER: &[&str] = &["master/elected", "master/uptime_secs"];

const SYSTEM: &[&str] = &[
    "system/cpus_total",
    "system/load_15min",
    "system/load_5min",
    "system/load_1min",
    "system/mem_free_bytes",
    "system/mem_total_bytes",
];

const MASTER_SLAVES: &[&str] = &[
    "master/slave_registrations",
    "master/slave_removals",
    "master/slave_reregistrations",
    "master/slave_shutdowns_scheduled",
    "master/slave_shutdowns_canceled",
    "master/slave_shutdowns_completed",
    "master/slaves_active",
    "master/slaves_connected",
    "master/slaves_disconnected",
    "master/slaves_inactive",
];

const MASTER_FRAMEWORKS: &[&str] = &[
    "master/frameworks_active",
    "master/frameworks_connected",
    "master/frameworks_disconnected",
    "master/frameworks_inactive",
    "master/outstanding_offers",
];

const MASTER_TASKS: &[&str] = &[
    "master/tasks_error",
    "master/tasks_failed",
    "master/tasks_finished",
    "master/tasks_killed",
    "master/tasks_lost",
    "master/tasks_running",
    "master/tasks_staging",
    "master/tasks_starting",
];

const MASTER_MESSAGES: &[&str] = &[
    "master/invalid_executor_to_framework_messages",
    "master/invalid_framework_to_executor_messages",
    "master/invalid_status_update_acknowledgements",
    "master/invalid_status_updates",
    "master/dropped_messages",
    "master/messages_authenticate",
    "master/messages_deactivate_framework",
    "master/messages_decline_offers",
    "master/messages_executor_to_framework",
    "master/messages_exited_executor",
    "master/messages_framework_to_executor",
    "master/messages_kill_task",
    "master/messages_launch_tasks",
    "master/messages_reconcile_tasks",
    "master/messages_register_framework",
    "master/messages_register_slave",
    "master/messages_reregister_framework",
    "master/messages_reregister_slave",
    "master/messages_resource_request",
    "master/messages_revive_offers",
    "master/messages_status_update",
    "master/messages_status_update_acknowledgement",
    "master/messages_unregister_framework",
    "master/messages_unregister_slave",
    "master/messages_update_slave",
    "master/recovery_slave_removals",
    "master/slave_removals/reason_registered",
    "master/slave_removals/reason_unhealthy",
    "master/slave_removals/reason_unregistered",
    "master/valid_framework_to_executor_messages",
    "master/valid_status_update_acknowledgements",
    "master/valid_status_updates",
    "master/task_lost/source_master/reason_invalid_offers",
    "master/task_lost/source_master/reason_slave_removed",
    "master/task_lost/source_slave/reason_executor_terminated",
    "master/valid_executor_to_framework_messages",
];

const MASTER_EVQUEUE: &[&str] = &[
    "master/event_queue_dispatches",
    "master/event_queue_http_requests",
    "master/event_queue_messages",
];

const MASTER_REGISTRAR: &[&str] = &[
    "registrar/state_fetch_ms",
    "registrar/state_store_ms",
    "registrar/state_store_ms/max",
    "registrar/state_store_ms/min",
    "registrar/state_store_ms/p50",
    "registrar/state_store_ms/p90",
    "registrar/state_store_ms/p95",
    "registrar/state_store_ms/p99",
    "registrar/state_store_ms/p999",
    "registrar/state_store_ms/p9999",
];

static MASTER: RoleDescriptor = RoleDescriptor {
    role: Role::Master,
    default_port: 5050,
    measurement: "mesos_master",
    groups: &[
        MetricGroup {
            name: "resources",
            metrics: MASTER_RESOURCES,
        },
        MetricGroup {
            name: "master",
            metrics: MASTER_MASTER,
        },
        MetricGroup {
            name: "system",
            metrics: SYSTEM,
        },
        MetricGroup {
            name: "slaves",
            metrics: MASTER_SLAVES,
        },
        MetricGroup {
            name: "frameworks",
            metrics: MASTER_FRAMEWORKS,
        },
        MetricGroup {
            name: "tasks",
            metrics: MASTER_TASKS,
        },
        MetricGroup {
            name: "messages",
            metrics: MASTER_MESSAGES,
        },
        MetricGroup {
            name: "evqueue",
            metrics: MASTER_EVQUEUE,
        },
        MetricGroup {
            name: "registrar",
            metrics: MASTER_REGISTRAR,
        },
    ],
    description: "Gathers metrics snapshots from N Mesos masters",
    sample_config: r#"master:
  enabled: true
  # Timeout hint passed to the master, in ms.
  timeout: 100
  # A list of Mesos masters, default value is localhost:5050.
  endpoints: ["localhost:5050"]
  # Metrics groups to be collected, by default, all enabled.
  collections:
    - resources
    - master
    - system
    - slaves
    - frameworks
    - tasks
    - messages
    - evqueue
    - registrar
"#,
};

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// slave

const SLAVE_RESOURCES: &[&str] = &[
    "slave/cpus_percent",
    "slave/cpus_used",
    "slave/cpus_total",
    "slave/cpus_revocable_percent",
    "slave/cpus_revocable_total",
    "slave/cpus_revocable_used",
    "slave/disk_percent",
    "slave/disk_used",
    "slave/disk_total",
    "slave/disk_revocable_percent",
    "slave/disk_revocable_total",
    "slave/disk_revocable_used",
    "slave/mem_percent",
    "slave/mem_used",
    "slave/mem_total",
    "slave/mem_revocable_percent",
    "slave/mem_revocable_total",
    "slave/mem_revocable_used",
];

const SLAVE_SLAVE: &[&str] = &["slave/registered", "slave/uptime_secs"];

const SLAVE_EXECUTORS: &[&str] = &[
    "containerizer/mesos/container_destroy_errors",
    "slave/container_launch_errors",
    "slave/executors_preempted",
    "slave/frameworks_active",
    "slave/executor_directory_max_allowed_age_secs",
    "slave/executors_registering",
    "slave/executors_running",
    "slave/executors_terminated",
    "slave/executors_terminating",
    "slave/recovery_errors",
];

const SLAVE_TASKS: &[&str] = &[
    "slave/tasks_failed",
    "slave/tasks_finished",
    "slave/tasks_killed",
    "slave/tasks_lost",
    "slave/tasks_running",
    "slave/tasks_staging",
    "slave/tasks_starting",
];

const SLAVE_MESSAGES: &[&str] = &[
    "slave/invalid_framework_messages",
    "slave/invalid_status_updates",
    "slave/valid_framework_messages",
    "slave/valid_status_updates",
];

static SLAVE: RoleDescriptor = RoleDescriptor {
    role: Role::Slave,
    default_port: 5051,
    measurement: "mesos_slave",
    groups: &[
        MetricGroup {
            name: "resources",
            metrics: SLAVE_RESOURCES,
        },
        MetricGroup {
            name: "slave",
            metrics: SLAVE_SLAVE,
        },
        MetricGroup {
            name: "system",
            metrics: SYSTEM,
        },
        MetricGroup {
            name: "executors",
            metrics: SLAVE_EXECUTORS,
        },
        MetricGroup {
            name: "tasks",
            metrics: SLAVE_TASKS,
        },
        MetricGroup {
            name: "messages",
            metrics: SLAVE_MESSAGES,
        },
    ],
    description: "Gathers metrics snapshots from N Mesos slaves",
    sample_config: r#"slave:
  enabled: true
  # Timeout hint passed to the slave, in ms.
  timeout: 100
  # A list of Mesos slaves, default value is localhost:5051.
  endpoints: ["localhost:5051"]
  # Metrics groups to be collected, by default, all enabled.
  collections:
    - resources
    - slave
    - system
    - executors
    - tasks
    - messages
"#,
};
