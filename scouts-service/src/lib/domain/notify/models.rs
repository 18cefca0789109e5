use std::fmt;

/// Identifier of a message in the status chat, as assigned by the bot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Notification loudness. Anything but `Error` is delivered silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Error,
    Info,
}

impl NotifyLevel {
    pub fn is_silent(self) -> bool {
        self != NotifyLevel::Error
    }
}

/// Outcome of a single health-check probe.
///
/// The rendered strings are a contract: they appear verbatim in status
/// notifications and must stay deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    Successful,
    FailedStatus { code: u16 },
    FailedTransport { url: String, error: String },
}

impl ProbeStatus {
    pub fn is_successful(&self) -> bool {
        matches!(self, ProbeStatus::Successful)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Successful => write!(f, "Successful"),
            ProbeStatus::FailedStatus { code } => {
                write!(f, "Failed (status code: {code})")
            }
            ProbeStatus::FailedTransport { url, error } => {
                write!(f, "Failed (url \"{url}\"): {error}")
            }
        }
    }
}

/// Per-tick aggregation of probe outcomes, host -> endpoint -> status.
///
/// Hosts and endpoints keep first-seen insertion order so the rendered
/// report is deterministic regardless of how probes completed.
#[derive(Debug, Default)]
pub struct PingReport {
    hosts: Vec<HostChecks>,
}

#[derive(Debug)]
pub struct HostChecks {
    pub host: String,
    pub checks: Vec<(String, ProbeStatus)>,
}

impl PingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one probe outcome, creating the host group on first sight.
    pub fn record(&mut self, host: &str, endpoint: &str, status: ProbeStatus) {
        match self.hosts.iter_mut().find(|h| h.host == host) {
            Some(entry) => entry.checks.push((endpoint.to_string(), status)),
            None => self.hosts.push(HostChecks {
                host: host.to_string(),
                checks: vec![(endpoint.to_string(), status)],
            }),
        }
    }

    pub fn hosts(&self) -> &[HostChecks] {
        &self.hosts
    }

    /// True iff every recorded check is `Successful`.
    pub fn all_ok(&self) -> bool {
        self.hosts
            .iter()
            .flat_map(|h| h.checks.iter())
            .all(|(_, status)| status.is_successful())
    }
}
