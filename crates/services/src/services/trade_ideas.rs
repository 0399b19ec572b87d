use std::sync::Arc;

use chrono::NaiveDate;
use db::models::trade_idea::{CreateTradeIdea, TradeIdea, TradeIdeaDetails, TradeIdeaView};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    access::Actor,
    trade_summary::{SummaryError, TradeSummarizer},
};

const MAX_OPTION_LEGS: usize = 2;

#[derive(Debug, Error)]
pub enum TradeIdeaError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("summary generation failed: {0}")]
    Summary(#[from] SummaryError),
    #[error("AI summaries are not configured")]
    SummaryUnavailable,
    #[error("{0}")]
    Validation(String),
    #[error("only admins can do that")]
    Forbidden,
    #[error("trade idea not found")]
    NotFound,
}

fn invalid(message: impl Into<String>) -> TradeIdeaError {
    TradeIdeaError::Validation(message.into())
}

/// Strict `YYYY-MM-DD`
pub(crate) fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Trim text fields, uppercase symbols and reject incomplete ideas
pub fn normalize_trade_idea(mut data: CreateTradeIdea) -> Result<CreateTradeIdea, TradeIdeaError> {
    data.note = data.note.trim().to_string();
    if data.note.is_empty() {
        return Err(invalid("A note is required"));
    }

    match &mut data.details {
        TradeIdeaDetails::Stock(stock) => {
            stock.ticker = stock.ticker.trim().to_uppercase();
            if stock.ticker.is_empty() {
                return Err(invalid("Ticker is required"));
            }
            for field in [
                &mut stock.entry_plan,
                &mut stock.stop_loss,
                &mut stock.invalidation,
            ] {
                *field = field
                    .take()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
            }
        }
        TradeIdeaDetails::Options(options) => {
            options.underlying = options.underlying.trim().to_uppercase();
            if options.underlying.is_empty() {
                return Err(invalid("Underlying is required"));
            }
            if options.legs.is_empty() || options.legs.len() > MAX_OPTION_LEGS {
                return Err(invalid("An options idea needs one or two legs"));
            }
            for leg in &mut options.legs {
                if !(leg.strike.is_finite() && leg.strike > 0.0) {
                    return Err(invalid("Strike must be greater than zero"));
                }
                leg.expiration = leg.expiration.trim().to_string();
                if !is_iso_date(&leg.expiration) {
                    return Err(invalid("Expiration must be a YYYY-MM-DD date"));
                }
                if leg.contracts == 0 {
                    return Err(invalid("Contracts must be at least one"));
                }
            }
        }
    }

    Ok(data)
}

#[derive(Clone)]
pub struct TradeIdeaService {
    pool: SqlitePool,
    summarizer: Option<Arc<dyn TradeSummarizer>>,
}

impl TradeIdeaService {
    pub fn new(pool: SqlitePool, summarizer: Option<Arc<dyn TradeSummarizer>>) -> Self {
        Self { pool, summarizer }
    }

    /// Admin-only. The summary is generated before anything is stored.
    pub async fn post(
        &self,
        actor: &Actor,
        data: CreateTradeIdea,
    ) -> Result<TradeIdeaView, TradeIdeaError> {
        if !actor.is_admin() {
            return Err(TradeIdeaError::Forbidden);
        }
        let data = normalize_trade_idea(data)?;
        let summarizer = self
            .summarizer
            .as_ref()
            .ok_or(TradeIdeaError::SummaryUnavailable)?;

        let summary = summarizer
            .summarize(&data.note, &data.details)
            .await
            .inspect_err(|e| warn!(error = %e, "Trade idea summary failed"))?;

        let idea = TradeIdea::create(
            &self.pool,
            Uuid::new_v4(),
            actor.identity_id,
            &actor.display_name,
            &data,
            &summary,
        )
        .await?;

        info!(
            trade_idea_id = %idea.id,
            symbol = %idea.symbol,
            instrument_type = %idea.instrument_type,
            "Trade idea posted"
        );
        Ok(idea.into())
    }

    pub async fn list(&self) -> Result<Vec<TradeIdeaView>, TradeIdeaError> {
        let ideas = TradeIdea::find_all(&self.pool).await?;
        Ok(ideas.into_iter().map(TradeIdeaView::from).collect())
    }

    /// Returns the new like count
    pub async fn like(&self, id: Uuid) -> Result<i64, TradeIdeaError> {
        TradeIdea::increment_likes(&self.pool, id)
            .await?
            .ok_or(TradeIdeaError::NotFound)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), TradeIdeaError> {
        let idea = TradeIdea::find_by_id(&self.pool, id)
            .await?
            .ok_or(TradeIdeaError::NotFound)?;
        if !actor.can_manage(idea.author_id) {
            return Err(TradeIdeaError::Forbidden);
        }
        TradeIdea::delete(&self.pool, id).await?;
        info!(trade_idea_id = %id, "Trade idea deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use db::{
        DBService,
        models::{
            role::Role,
            trade_idea::{
                Direction, LegSide, OptionKind, OptionLeg, OptionsIdea, StockIdea, StrategyType,
                Timeframe, TradeAction, TradeSummary,
            },
        },
    };

    use super::*;
    use crate::services::{llm_client::LlmError, trade_summary::DISCLAIMER};

    #[derive(Default)]
    struct CannedSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TradeSummarizer for CannedSummarizer {
        async fn summarize(
            &self,
            _note: &str,
            details: &TradeIdeaDetails,
        ) -> Result<TradeSummary, SummaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TradeSummary {
                summary_bullets: vec![
                    format!("{} setup", details.symbol()),
                    "Momentum".to_string(),
                    "Volume".to_string(),
                ],
                risk_line: "Gap risk".to_string(),
                payoff_hint: "Trend continuation".to_string(),
                disclaimer_line: DISCLAIMER.to_string(),
            })
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl TradeSummarizer for FailingSummarizer {
        async fn summarize(
            &self,
            _note: &str,
            _details: &TradeIdeaDetails,
        ) -> Result<TradeSummary, SummaryError> {
            Err(SummaryError::Llm(LlmError::Timeout))
        }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            session_id: Uuid::new_v4(),
            identity_id: Uuid::new_v4(),
            role,
            display_name: "Jane".to_string(),
        }
    }

    fn stock_idea() -> CreateTradeIdea {
        CreateTradeIdea {
            note: "  Breakout over resistance ".to_string(),
            details: TradeIdeaDetails::Stock(StockIdea {
                ticker: " aapl ".to_string(),
                direction: Direction::Long,
                action: TradeAction::Buy,
                timeframe: Timeframe::Swing,
                entry_plan: Some("  ".to_string()),
                stop_loss: Some("175".to_string()),
                invalidation: None,
            }),
        }
    }

    fn options_idea(legs: Vec<OptionLeg>) -> CreateTradeIdea {
        CreateTradeIdea {
            note: "Hedge".to_string(),
            details: TradeIdeaDetails::Options(OptionsIdea {
                underlying: "spy".to_string(),
                strategy_type: StrategyType::Single,
                legs,
            }),
        }
    }

    fn leg(strike: f64, expiration: &str, contracts: u32) -> OptionLeg {
        OptionLeg {
            side: LegSide::Buy,
            kind: OptionKind::Put,
            strike,
            expiration: expiration.to_string(),
            contracts,
        }
    }

    async fn setup(summarizer: Option<Arc<dyn TradeSummarizer>>) -> (DBService, TradeIdeaService) {
        let db = DBService::new_in_memory().await.unwrap();
        let service = TradeIdeaService::new(db.pool.clone(), summarizer);
        (db, service)
    }

    #[test]
    fn iso_dates_are_strict() {
        assert!(is_iso_date("2026-11-20"));
        assert!(!is_iso_date("2026-2-1"));
        assert!(!is_iso_date("2026-02-30"));
        assert!(!is_iso_date("11/20/2026"));
    }

    #[test]
    fn stock_fields_are_normalized() {
        let data = normalize_trade_idea(stock_idea()).unwrap();
        assert_eq!(data.note, "Breakout over resistance");
        match data.details {
            TradeIdeaDetails::Stock(stock) => {
                assert_eq!(stock.ticker, "AAPL");
                assert_eq!(stock.entry_plan, None);
                assert_eq!(stock.stop_loss.as_deref(), Some("175"));
            }
            TradeIdeaDetails::Options(_) => panic!("expected a stock idea"),
        }
    }

    #[test]
    fn option_legs_are_validated() {
        let good = leg(100.0, "2026-12-18", 1);
        assert!(normalize_trade_idea(options_idea(vec![good.clone()])).is_ok());
        assert!(normalize_trade_idea(options_idea(vec![])).is_err());
        assert!(
            normalize_trade_idea(options_idea(vec![good.clone(), good.clone(), good])).is_err()
        );
        assert!(normalize_trade_idea(options_idea(vec![leg(0.0, "2026-12-18", 1)])).is_err());
        assert!(normalize_trade_idea(options_idea(vec![leg(100.0, "Dec 18", 1)])).is_err());
        assert!(normalize_trade_idea(options_idea(vec![leg(100.0, "2026-12-18", 0)])).is_err());
    }

    #[tokio::test]
    async fn admin_posts_idea_with_summary() {
        let summarizer = Arc::new(CannedSummarizer::default());
        let (_db, service) = setup(Some(summarizer.clone())).await;

        let view = service.post(&actor(Role::Admin), stock_idea()).await.unwrap();

        assert_eq!(view.created_by, "Jane");
        assert_eq!(view.direction, Some(Direction::Long));
        assert_eq!(view.summary.summary_bullets[0], "AAPL setup");
        assert_eq!(view.summary.disclaimer_line, DISCLAIMER);
        assert_eq!(view.like_count, 0);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn members_cannot_post() {
        let summarizer = Arc::new(CannedSummarizer::default());
        let (db, service) = setup(Some(summarizer.clone())).await;

        let err = service.post(&actor(Role::Member), stock_idea()).await.unwrap_err();

        assert!(matches!(err, TradeIdeaError::Forbidden));
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
        assert!(TradeIdea::find_all(&db.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_failure_stores_nothing() {
        let (db, service) = setup(Some(Arc::new(FailingSummarizer))).await;

        let err = service.post(&actor(Role::Admin), stock_idea()).await.unwrap_err();
        assert!(matches!(err, TradeIdeaError::Summary(_)));
        assert!(TradeIdea::find_all(&db.pool).await.unwrap().is_empty());

        let (_db, unconfigured) = setup(None).await;
        assert!(matches!(
            unconfigured.post(&actor(Role::Admin), stock_idea()).await,
            Err(TradeIdeaError::SummaryUnavailable)
        ));
    }

    #[tokio::test]
    async fn like_and_delete_permissions() {
        let (_db, service) = setup(Some(Arc::new(CannedSummarizer::default()))).await;
        let author = actor(Role::Admin);
        let idea = service.post(&author, stock_idea()).await.unwrap();

        assert_eq!(service.like(idea.id).await.unwrap(), 1);
        assert_eq!(service.like(idea.id).await.unwrap(), 2);
        assert!(matches!(
            service.like(Uuid::new_v4()).await,
            Err(TradeIdeaError::NotFound)
        ));

        assert!(matches!(
            service.delete(&actor(Role::Member), idea.id).await,
            Err(TradeIdeaError::Forbidden)
        ));
        service.delete(&actor(Role::Admin), idea.id).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn feed_is_newest_first() {
        let (_db, service) = setup(Some(Arc::new(CannedSummarizer::default()))).await;
        let admin = actor(Role::Admin);
        service.post(&admin, stock_idea()).await.unwrap();
        let second = service
            .post(&admin, options_idea(vec![leg(420.0, "2026-12-18", 3)]))
            .await
            .unwrap();

        let feed = service.list().await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, second.id);
        assert_eq!(feed[0].direction, Some(Direction::Short));
    }
}
