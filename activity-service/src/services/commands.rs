//! Chat commands for the activity category.
//!
//!   <bot> activity help
//!   <bot> activity today
//!   <bot> activity this week

use super::messages::MessageCatalog;
use super::report::ReportGenerator;
use crate::host::{BotHost, Conversation};
use crate::models::FormattedOutput;
use regex::Regex;
use std::sync::Arc;

const COMMAND_USAGE_HELP: &str = r"activity\s+help";
const COMMAND_USAGE_REPORT: &str = r"activity\s+(today|this week)";

pub struct CommandRouter {
    help: Regex,
    report: Regex,
    reports: Arc<ReportGenerator>,
    catalog: Arc<MessageCatalog>,
}

impl CommandRouter {
    pub fn new(
        bot_name: &str,
        reports: Arc<ReportGenerator>,
        catalog: Arc<MessageCatalog>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            help: respond_pattern(bot_name, COMMAND_USAGE_HELP)?,
            report: respond_pattern(bot_name, COMMAND_USAGE_REPORT)?,
            reports,
            catalog,
        })
    }

    /// Run the command addressed in `conversation`, if any. Returns whether
    /// one matched.
    pub async fn dispatch(&self, host: &dyn BotHost, conversation: &Conversation) -> bool {
        let timeframe = self
            .report
            .captures(&conversation.text)
            .map(|captures| captures[1].to_lowercase());

        if let Some(timeframe) = timeframe {
            self.handle_report(host, conversation, &timeframe).await;
            return true;
        }

        if self.help.is_match(&conversation.text) {
            self.handle_help(host, conversation);
            return true;
        }

        false
    }

    async fn handle_report(
        &self,
        host: &dyn BotHost,
        conversation: &Conversation,
        timeframe: &str,
    ) {
        tracing::debug!(text = %conversation.text, "COMMAND_USAGE_REPORT");
        tracing::info!(timeframe = %timeframe, "Getting activity report...");

        match self
            .reports
            .get_usage_report(host, conversation, timeframe)
            .await
        {
            Ok(Some(report)) => {
                tracing::info!(result = %report, "Activity report generated");
                host.emit(conversation, FormattedOutput::Message(report));
            }
            Ok(None) => tracing::info!("Activity report sent as chart attachment"),
            Err(e) => tracing::error!(error = %e, "Error while getting the bot usage report"),
        }
    }

    fn handle_help(&self, host: &dyn BotHost, conversation: &Conversation) {
        tracing::debug!(text = %conversation.text, "COMMAND_USAGE_HELP");
        tracing::info!("Listing help activity...");

        let name = host.name();
        let help = format!(
            "\n{name} activity today - {day}\n{name} activity this week - {week}\n",
            name = name,
            day = self.catalog.text("help.activity.day"),
            week = self.catalog.text("help.activity.week"),
        );
        host.emit(conversation, FormattedOutput::Message(help));
    }
}

/// Anchored, case-insensitive pattern that only fires when the bot is
/// addressed: `@bot pattern`, `bot: pattern`, `bot, pattern`.
fn respond_pattern(bot_name: &str, pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)^\s*@?{}[:,]?\s*(?:{})",
        regex::escape(bot_name),
        pattern
    ))
}
