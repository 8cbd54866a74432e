use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::{WorkerError, WorkerResult};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const WHITE: &str = "\x1b[97m";

/// Message and key/value fields of an event or span
#[derive(Debug, Clone, Default)]
struct FieldMap {
    message: Option<String>,
    values: Map<String, Value>,
}

impl FieldMap {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(text) => text,
                other => other.to_string(),
            });
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }

    /// `key=value, key=value` for the console
    fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.values {
            if !out.is_empty() {
                out.push_str(", ");
            }
            let _ = match value {
                Value::String(text) => write!(out, "{DIM}{name}={text}{RESET}"),
                other => write!(out, "{DIM}{name}={other}{RESET}"),
            };
        }
        out
    }
}

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        self.insert(field, Value::String(text.trim_matches('"').to_string()));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }
}

/// Fields recorded on a span, stored in its extensions
#[derive(Debug, Clone, Default)]
struct SpanFields(FieldMap);

/// Records span fields so the formatters can attach `job_id` and friends to every event
pub struct SpanFieldsLayer;

impl<S> Layer<S> for SpanFieldsLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut fields = FieldMap::default();
            attrs.record(&mut fields);
            span.extensions_mut().insert(SpanFields(fields));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            let mut extensions = span.extensions_mut();
            match extensions.get_mut::<SpanFields>() {
                Some(SpanFields(fields)) => values.record(fields),
                None => {
                    let mut fields = FieldMap::default();
                    values.record(&mut fields);
                    extensions.insert(SpanFields(fields));
                }
            }
        }
    }
}

/// Span fields visible from the event, innermost span winning
fn scoped_fields<S, N>(ctx: &FmtContext<'_, S, N>) -> Map<String, Value>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let mut merged = Map::new();
    let Some(scope) = ctx.event_scope() else {
        return merged;
    };
    for span in scope {
        if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
            for (name, value) in &fields.values {
                merged.entry(name.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    merged
}

/// One coloured line per event: time | level | job | service | message (fields)
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = FieldMap::default();
        event.record(&mut fields);

        let job = match scoped_fields(ctx).get("job_id") {
            Some(Value::String(job_id)) => short_job_id(job_id),
            _ => "-".to_string(),
        };

        write!(writer, "{CYAN}{}{RESET} {DIM}|{RESET} ", Utc::now().format("%y-%m-%d %H:%M:%S"))?;
        write!(writer, "{}{:<5}{RESET} {DIM}|{RESET} ", level_color(meta.level()), meta.level())?;
        write!(writer, "{GREEN}{:<8}{RESET} {DIM}|{RESET} ", job)?;
        write!(writer, "{GREEN}{:<8}{RESET} {DIM}|{RESET} ", service_name(meta.target()))?;
        write!(writer, "{WHITE}{}{RESET}", fields.message.as_deref().unwrap_or_default())?;
        if !fields.values.is_empty() {
            write!(writer, " ({})", fields.render())?;
        }
        writeln!(writer)
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => DIM,
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    }
}

/// One JSON object per event with `timestamp`, `level`, `service`, `message` and `fields`.
///
/// `fields` merges the event's own fields with those of its enclosing spans; event fields win.
pub struct JsonEventFormatter;

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut event_fields = FieldMap::default();
        event.record(&mut event_fields);

        let mut fields = event_fields.values;
        for (name, value) in scoped_fields(ctx) {
            fields.entry(name).or_insert(value);
        }

        let mut line = Map::new();
        line.insert("timestamp".into(), Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into());
        line.insert("level".into(), meta.level().to_string().into());
        line.insert("service".into(), service_name(meta.target()).into());
        if let Some(message) = event_fields.message {
            line.insert("message".into(), message.into());
        }
        if !fields.is_empty() {
            line.insert("fields".into(), Value::Object(fields));
        }

        let encoded = serde_json::to_string(&line).map_err(|_| fmt::Error)?;
        writeln!(writer, "{}", encoded)
    }
}

/// Installs color_eyre and the global subscriber.
///
/// `LOG_FORMAT=json` selects [JsonEventFormatter], anything else [PrettyFormatter]. The filter comes
/// from `RUST_LOG` and defaults to `downloader=info`.
pub fn init_logging() -> WorkerResult<()> {
    color_eyre::install().map_err(|e| WorkerError::LoggingError(e.to_string()))?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse("downloader=info")
            .map_err(|e| WorkerError::LoggingError(e.to_string()))?,
    };

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().event_format(JsonEventFormatter).boxed()
    } else {
        tracing_subscriber::fmt::layer().event_format(PrettyFormatter).boxed()
    };

    let subscriber =
        Registry::default().with(env_filter).with(SpanFieldsLayer).with(fmt_layer).with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).map_err(|e| WorkerError::LoggingError(e.to_string()))
}

/// Short name of the component that emitted the event
fn service_name(target: &str) -> &'static str {
    let component = target.split("::").next().unwrap_or(target);
    match component {
        "downloader" => "-",
        "mongodb" => "MONGODB",
        "reqwest" | "hyper" | "axum" => "HTTP",
        aws if aws.starts_with("aws") => "AWS",
        _ => "EXTERNAL",
    }
}

/// First block of a hyphenated uuid
fn short_job_id(job_id: &str) -> String {
    job_id.split('-').next().unwrap_or(job_id).chars().take(8).collect()
}
