//! AI commentary for trade ideas.

use std::fmt::Write as _;

use async_trait::async_trait;
use db::models::trade_idea::{TradeIdeaDetails, TradeSummary};
use serde::Deserialize;
use thiserror::Error;

use super::llm_client::{LlmClient, LlmError};

pub const DISCLAIMER: &str = "For educational purposes only. Not financial advice.";
pub const SUMMARY_BULLET_COUNT: usize = 3;

pub const ALPHABOT_SYSTEM_PROMPT: &str = "You are AlphaBot. You provide concise research-style market commentary and risk-aware explanations.
You do NOT provide financial advice. You focus on probability, risk management, and scenario analysis.
For options, explain bullish/bearish/neutral, defined vs undefined risk (if inferable), and mention key risks like time decay, volatility, assignment when relevant.
Tone: professional, research-note style. Output: short paragraphs + bullet points.
If user requests guaranteed profits or extreme leverage, warn about risks.";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("expected 3 summary bullets, got {0}")]
    TooFewBullets(usize),
    #[error("summary is missing its {0}")]
    MissingField(&'static str),
}

#[async_trait]
pub trait TradeSummarizer: Send + Sync {
    async fn summarize(
        &self,
        note: &str,
        details: &TradeIdeaDetails,
    ) -> Result<TradeSummary, SummaryError>;
}

/// Shape the model is asked to reply with
#[derive(Debug, Deserialize)]
pub struct DraftSummary {
    pub summary_bullets: Vec<String>,
    pub risk_line: String,
    pub payoff_hint: String,
}

impl DraftSummary {
    /// Trim everything, keep the first three non-empty bullets and stamp the
    /// fixed disclaimer whatever the model wrote.
    pub fn finalize(self) -> Result<TradeSummary, SummaryError> {
        let bullets: Vec<String> = self
            .summary_bullets
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if bullets.len() < SUMMARY_BULLET_COUNT {
            return Err(SummaryError::TooFewBullets(bullets.len()));
        }

        let risk_line = self.risk_line.trim();
        if risk_line.is_empty() {
            return Err(SummaryError::MissingField("risk line"));
        }
        let payoff_hint = self.payoff_hint.trim();
        if payoff_hint.is_empty() {
            return Err(SummaryError::MissingField("payoff hint"));
        }

        Ok(TradeSummary {
            summary_bullets: bullets.into_iter().take(SUMMARY_BULLET_COUNT).collect(),
            risk_line: risk_line.to_string(),
            payoff_hint: payoff_hint.to_string(),
            disclaimer_line: DISCLAIMER.to_string(),
        })
    }
}

pub fn render_prompt(note: &str, details: &TradeIdeaDetails) -> String {
    let mut prompt = String::from(
        "Summarize the following trade idea. Provide exactly 3 bullet points for the summary, \
         a single risk line, and a single payoff hint.\n\
         Reply with only a JSON object of the form \
         {\"summary_bullets\": [\"...\", \"...\", \"...\"], \"risk_line\": \"...\", \"payoff_hint\": \"...\"}.\n\n\
         Trade Idea:\n",
    );
    let _ = writeln!(prompt, "Instrument Type: {}", details.instrument_type());
    let _ = writeln!(prompt, "Note: {}", note);

    match details {
        TradeIdeaDetails::Stock(stock) => {
            let _ = writeln!(prompt, "Stock Ticker: {}", stock.ticker);
            let _ = writeln!(prompt, "Direction: {}", stock.direction);
            let _ = writeln!(prompt, "Action: {}", stock.action);
            let _ = writeln!(prompt, "Timeframe: {}", stock.timeframe);
            for (label, value) in [
                ("Entry Plan", &stock.entry_plan),
                ("Stop Loss", &stock.stop_loss),
                ("Invalidation", &stock.invalidation),
            ] {
                if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    let _ = writeln!(prompt, "{}: {}", label, value);
                }
            }
        }
        TradeIdeaDetails::Options(options) => {
            let _ = writeln!(prompt, "Underlying: {}", options.underlying);
            let _ = writeln!(prompt, "Strategy Type: {}", options.strategy_type);
            prompt.push_str("Option Legs:\n");
            for leg in &options.legs {
                let _ = writeln!(
                    prompt,
                    "- Side: {}, Type: {}, Strike: {}, Expiration: {}, Contracts: {}",
                    leg.side, leg.kind, leg.strike, leg.expiration, leg.contracts
                );
            }
        }
    }

    prompt
}

pub struct LlmTradeSummarizer {
    client: LlmClient,
}

impl LlmTradeSummarizer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TradeSummarizer for LlmTradeSummarizer {
    async fn summarize(
        &self,
        note: &str,
        details: &TradeIdeaDetails,
    ) -> Result<TradeSummary, SummaryError> {
        let draft: DraftSummary = self
            .client
            .ask_json(Some(ALPHABOT_SYSTEM_PROMPT), &render_prompt(note, details))
            .await?;
        draft.finalize()
    }
}
