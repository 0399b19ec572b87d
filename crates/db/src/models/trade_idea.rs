use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "instrument_type", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum InstrumentType {
    Stock,
    Options,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Timeframe {
    Scalp,
    Swing,
    Long,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    Single,
    VerticalSpread,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LegSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum OptionKind {
    Call,
    Put,
}

/// One leg of an options strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct OptionLeg {
    pub side: LegSide,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub strike: f64,
    pub expiration: String, // YYYY-MM-DD
    pub contracts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct StockIdea {
    pub ticker: String,
    pub direction: Direction,
    pub action: TradeAction,
    pub timeframe: Timeframe,
    pub entry_plan: Option<String>,
    pub stop_loss: Option<String>,
    pub invalidation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct OptionsIdea {
    pub underlying: String,
    pub strategy_type: StrategyType,
    pub legs: Vec<OptionLeg>,
}

/// Instrument-specific fields of a trade idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "instrument_type", rename_all = "UPPERCASE")]
pub enum TradeIdeaDetails {
    Stock(StockIdea),
    Options(OptionsIdea),
}

impl TradeIdeaDetails {
    pub fn instrument_type(&self) -> InstrumentType {
        match self {
            TradeIdeaDetails::Stock(_) => InstrumentType::Stock,
            TradeIdeaDetails::Options(_) => InstrumentType::Options,
        }
    }

    /// Ticker for stocks, underlying for options
    pub fn symbol(&self) -> &str {
        match self {
            TradeIdeaDetails::Stock(stock) => &stock.ticker,
            TradeIdeaDetails::Options(options) => &options.underlying,
        }
    }

    /// Stocks carry their direction; options read it off the first leg
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TradeIdeaDetails::Stock(stock) => Some(stock.direction),
            TradeIdeaDetails::Options(options) => options.legs.first().map(|leg| match leg.kind {
                OptionKind::Call => Direction::Long,
                OptionKind::Put => Direction::Short,
            }),
        }
    }
}

/// AI-written commentary attached to a trade idea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct TradeSummary {
    pub summary_bullets: Vec<String>,
    pub risk_line: String,
    pub payoff_hint: String,
    pub disclaimer_line: String,
}

/// A published research note
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TradeIdea {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_by: String,
    pub instrument_type: InstrumentType,
    pub symbol: String,
    pub note: String,
    pub details: String,         // JSON-serialized TradeIdeaDetails
    pub summary_bullets: String, // JSON array
    pub risk_line: String,
    pub payoff_hint: String,
    pub disclaimer_line: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

impl TradeIdea {
    pub fn parsed_details(&self) -> Option<TradeIdeaDetails> {
        serde_json::from_str(&self.details).ok()
    }

    pub fn parsed_bullets(&self) -> Vec<String> {
        serde_json::from_str(&self.summary_bullets).unwrap_or_default()
    }
}

/// Request body for posting a trade idea
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTradeIdea {
    pub note: String,
    pub details: TradeIdeaDetails,
}

/// Trade idea as returned by the API, with JSON columns expanded
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TradeIdeaView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub created_by: String,
    pub note: String,
    pub details: Option<TradeIdeaDetails>,
    pub direction: Option<Direction>,
    pub summary: TradeSummary,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<TradeIdea> for TradeIdeaView {
    fn from(idea: TradeIdea) -> Self {
        let details = idea.parsed_details();
        let summary_bullets = idea.parsed_bullets();
        Self {
            id: idea.id,
            author_id: idea.author_id,
            created_by: idea.created_by,
            note: idea.note,
            direction: details.as_ref().and_then(TradeIdeaDetails::direction),
            details,
            summary: TradeSummary {
                summary_bullets,
                risk_line: idea.risk_line,
                payoff_hint: idea.payoff_hint,
                disclaimer_line: idea.disclaimer_line,
            },
            like_count: idea.like_count,
            created_at: idea.created_at,
        }
    }
}

impl TradeIdea {
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        author_id: Uuid,
        created_by: &str,
        data: &CreateTradeIdea,
        summary: &TradeSummary,
    ) -> Result<Self, sqlx::Error> {
        let details = serde_json::to_string(&data.details)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        let bullets = serde_json::to_string(&summary.summary_bullets)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        sqlx::query_as::<_, TradeIdea>(
            r#"INSERT INTO trade_ideas (id, author_id, created_by, instrument_type, symbol, note,
                details, summary_bullets, risk_line, payoff_hint, disclaimer_line)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, author_id, created_by, instrument_type, symbol, note, details,
                summary_bullets, risk_line, payoff_hint, disclaimer_line, like_count, created_at"#,
        )
        .bind(id)
        .bind(author_id)
        .bind(created_by)
        .bind(data.details.instrument_type())
        .bind(data.details.symbol())
        .bind(&data.note)
        .bind(details)
        .bind(bullets)
        .bind(&summary.risk_line)
        .bind(&summary.payoff_hint)
        .bind(&summary.disclaimer_line)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TradeIdea>(
            r#"SELECT id, author_id, created_by, instrument_type, symbol, note, details,
                summary_bullets, risk_line, payoff_hint, disclaimer_line, like_count, created_at
            FROM trade_ideas
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Feed order: newest first
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TradeIdea>(
            r#"SELECT id, author_id, created_by, instrument_type, symbol, note, details,
                summary_bullets, risk_line, payoff_hint, disclaimer_line, like_count, created_at
            FROM trade_ideas
            ORDER BY created_at DESC, rowid DESC"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Atomic increment; returns the new count, or None if the idea is gone
    pub async fn increment_likes(pool: &SqlitePool, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE trade_ideas SET like_count = like_count + 1 WHERE id = $1 RETURNING like_count",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trade_ideas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trade_ideas").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
