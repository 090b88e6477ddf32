//! Summaries of recorded bot activity.
//!
//! A report is one terms aggregation over the usage index, scoped to this
//! instance and a time window, rendered either as text or as a chart card
//! on adapters that can show one.

use super::consumer::ActivityConsumer;
use super::messages::MessageCatalog;
use super::metrics::record_report;
use super::store::{StoreError, USAGE_INDEX_NAME};
use crate::config::ChartConfig;
use crate::host::{BotHost, Conversation};
use crate::models::{ActivityBucket, Attachment, FormattedOutput, Timeframe};
use chrono::{DateTime, Duration, Local, TimeZone};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

pub const AGGREGATION_NAME: &str = "bot_activity";
const SEVEN_DAYS_MS: i64 = 1000 * 60 * 60 * 24 * 7;
/// Offset changes happen on quarter-hour boundaries and skip at most two hours.
const DST_GAP_STEP_MINUTES: i64 = 15;
const DST_GAP_STEPS: i64 = 8;

/// Failures here are for logs only and are not translated.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Usage query failed: {0}")]
    Store(#[from] StoreError),

    #[error("Unexpected query result from Elasticsearch on host. Result: {0}")]
    UnexpectedResponse(String),
}

pub struct ReportGenerator {
    consumer: Arc<ActivityConsumer>,
    catalog: Arc<MessageCatalog>,
    chart: ChartConfig,
}

impl ReportGenerator {
    pub fn new(
        consumer: Arc<ActivityConsumer>,
        catalog: Arc<MessageCatalog>,
        chart: ChartConfig,
    ) -> Self {
        Self {
            consumer,
            catalog,
            chart,
        }
    }

    /// Build the activity report for `timeframe` (`today` or `this week`).
    ///
    /// Resolves to `None` when the report went out as a chart attachment
    /// through `host` instead of text.
    pub async fn get_usage_report(
        &self,
        host: &dyn BotHost,
        conversation: &Conversation,
        timeframe: &str,
    ) -> Result<Option<String>, ReportError> {
        let Some(client) = self.consumer.client() else {
            record_report(timeframe, "unavailable");
            return Ok(Some(self.catalog.text("usage.info.unavailable")));
        };

        let Some(frame) = Timeframe::parse(timeframe) else {
            record_report(timeframe, "unsupported");
            return Ok(Some(
                self.catalog
                    .format("usage.not.supported", &[("timeframe", timeframe)]),
            ));
        };

        let (start_time, end_time) = time_window(frame, &Local::now());
        let query = build_query(start_time, end_time, self.consumer.container_uuid());

        tracing::info!(
            index = USAGE_INDEX_NAME,
            body = %query,
            "Searching usage index for bot activity report"
        );

        let result = client.search(USAGE_INDEX_NAME, &query).await.map_err(|e| {
            record_report(frame.as_str(), "error");
            ReportError::from(e)
        })?;
        let buckets = parse_buckets(&result).inspect_err(|_| {
            record_report(frame.as_str(), "error");
        })?;

        let lines: Vec<String> = buckets
            .iter()
            .filter_map(|bucket| self.display_string(&bucket.key, bucket.doc_count))
            .collect();

        if lines.is_empty() {
            record_report(frame.as_str(), "empty");
            return Ok(Some(
                self.catalog
                    .format("usage.done.nothing", &[("timeframe", timeframe)]),
            ));
        }

        if self.charting_enabled(host) {
            let text_key = match frame {
                Timeframe::Today => "usage.summary.day.text",
                Timeframe::ThisWeek => "usage.summary.week.text",
            };
            host.emit(
                conversation,
                FormattedOutput::Attachments(vec![Attachment {
                    title: self.catalog.text("usage.bot.activity.title"),
                    text: self.catalog.text(text_key),
                    title_link: self.chart_doc_link(start_time, end_time),
                    image_url: self.chart_preview_link(start_time, end_time),
                }]),
            );
            record_report(frame.as_str(), "chart");
            return Ok(None);
        }

        let header_key = match frame {
            Timeframe::Today => "usage.summary.day",
            Timeframe::ThisWeek => "usage.summary.week",
        };
        let mut report = self.catalog.text(header_key);
        for line in lines {
            report.push('\n');
            report.push_str(&line);
        }

        record_report(frame.as_str(), "text");
        Ok(Some(report))
    }

    pub fn chart_doc_link(&self, start_time: i64, end_time: i64) -> String {
        format!(
            "{}?startTime={}&endTime={}&uuid={}",
            self.chart_base(),
            start_time,
            end_time,
            self.consumer.container_uuid()
        )
    }

    pub fn chart_preview_link(&self, start_time: i64, end_time: i64) -> String {
        format!(
            "{}/preview?startTime={}&endTime={}&uuid={}",
            self.chart_base(),
            start_time,
            end_time,
            self.consumer.container_uuid()
        )
    }

    fn chart_base(&self) -> &str {
        self.chart.base_url.trim_end_matches('/')
    }

    fn charting_enabled(&self, host: &dyn BotHost) -> bool {
        !self.chart.disabled && host.supports_charts()
    }

    /// "Performed X once" / "Performed X N times", or `None` for activity
    /// ids the catalog cannot name.
    fn display_string(&self, activity_id: &str, count: u64) -> Option<String> {
        let Some(activity) = self
            .catalog
            .translate(activity_id)
            .filter(|translated| *translated != activity_id)
        else {
            tracing::error!(
                activity_id = %activity_id,
                "Detected untranslated bot activity_id while generating bot activity report"
            );
            return None;
        };

        if count == 1 {
            Some(
                self.catalog
                    .format("usage.performed.activity.once", &[("activity", activity)]),
            )
        } else {
            let count = count.to_string();
            Some(self.catalog.format(
                "usage.performed.activity.multiple",
                &[("activity", activity), ("count", count.as_str())],
            ))
        }
    }
}

/// `[start, end]` in epoch milliseconds. Today starts at midnight in `now`'s
/// timezone; the week is the trailing seven days.
pub fn time_window<Tz: TimeZone>(timeframe: Timeframe, now: &DateTime<Tz>) -> (i64, i64) {
    let end_time = now.timestamp_millis();
    let start_time = match timeframe {
        Timeframe::Today => start_of_day(now)
            .map(|start| start.timestamp_millis())
            .unwrap_or(end_time),
        Timeframe::ThisWeek => end_time - SEVEN_DAYS_MS,
    };
    (start_time, end_time)
}

/// First valid local instant of `now`'s day. When a DST change skips
/// midnight, that is the end of the gap.
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
    (0..=DST_GAP_STEPS).find_map(|step| {
        (midnight + Duration::minutes(DST_GAP_STEP_MINUTES * step))
            .and_local_timezone(now.timezone())
            .earliest()
    })
}

pub fn build_query(start_time: i64, end_time: i64, container_uuid: &str) -> Value {
    json!({
        "size": 0,
        "query": {
            "query_string": {
                "query": format!(
                    "timestamp:[{} TO {}] AND container_uuid:{}",
                    start_time, end_time, container_uuid
                ),
                "lowercase_expanded_terms": false
            }
        },
        "aggs": {
            "bot_activity": {
                "terms": {
                    "field": "activity_id",
                    "order": { "_term": "asc" }
                }
            }
        }
    })
}

fn parse_buckets(result: &Value) -> Result<Vec<ActivityBucket>, ReportError> {
    result
        .get("aggregations")
        .and_then(|aggs| aggs.get(AGGREGATION_NAME))
        .and_then(|agg| agg.get("buckets"))
        .filter(|buckets| buckets.is_array())
        .and_then(|buckets| serde_json::from_value(buckets.clone()).ok())
        .ok_or_else(|| {
            ReportError::UnexpectedResponse(
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string()),
            )
        })
}
