//! Per-request structured logging.
//!
//! Lines go to stderr, which Spin forwards to the host's log sink.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use edge_core::{LogFormat, RequestContext, RequestId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Upper-case tag used by the human format.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One rendered log line before formatting.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Event fields, flattened into the JSON object.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    pub elapsed_us: u64,
}

impl LogEntry {
    /// Single-line JSON object.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// `[LEVEL] message METHOD /route (Nus) | key=value ...`
    pub fn to_human(&self) -> String {
        let mut line = format!("[{}] {}", self.level, self.message);
        if let (Some(method), Some(route)) = (&self.method, &self.route) {
            line += &format!(" {} {}", method, route);
        }
        line += &format!(" ({}us)", self.elapsed_us);

        let mut sep = " | ";
        for (key, value) in &self.fields {
            line += &format!("{}{}={}", sep, key, value);
            sep = " ";
        }
        line
    }

    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Json => self.to_json(),
            LogFormat::Human => self.to_human(),
        }
    }
}

/// Logger bound to one request.
///
/// Every entry carries the request ID, the workload name and the time since
/// the logger was created.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    request_id: RequestId,
    workload: Option<String>,
    method: Option<String>,
    route: Option<String>,
    started: Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl StructuredLogger {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            workload: None,
            method: None,
            route: None,
            started: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::default(),
        }
    }

    /// Logger tagged with the request's ID, method and path.
    pub fn for_request(ctx: &RequestContext) -> Self {
        Self {
            method: Some(ctx.method.to_string()),
            route: Some(ctx.path.clone()),
            ..Self::new(ctx.request_id.clone())
        }
    }

    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = Some(workload.into());
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Microseconds since the logger was created.
    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Start an entry at `level`. Nothing is written until `emit`.
    pub fn event(&self, level: LogLevel, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder {
            logger: self,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        self.event(LogLevel::Debug, message)
    }

    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        self.event(LogLevel::Info, message)
    }

    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        self.event(LogLevel::Warn, message)
    }

    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        self.event(LogLevel::Error, message)
    }

    /// Field-less debug line.
    pub fn debug(&self, message: &str) {
        self.debug_builder(message).emit();
    }

    fn entry(
        &self,
        level: LogLevel,
        message: String,
        fields: BTreeMap<String, Value>,
    ) -> Option<LogEntry> {
        (level >= self.min_level).then(|| LogEntry {
            level,
            message,
            request_id: self.request_id.to_string(),
            workload: self.workload.clone(),
            method: self.method.clone(),
            route: self.route.clone(),
            fields,
            elapsed_us: self.elapsed_us(),
        })
    }
}

/// Pending log entry with typed fields.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, Value>,
}

impl LogBuilder<'_> {
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.into()));
        self
    }

    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), Value::Bool(value));
        self
    }

    /// The entry that `emit` would write, or `None` below the minimum level.
    pub fn build(self) -> Option<LogEntry> {
        self.logger.entry(self.level, self.message, self.fields)
    }

    pub fn emit(self) {
        let format = self.logger.format;
        if let Some(entry) = self.build() {
            eprintln!("{}", entry.render(format));
        }
    }
}
