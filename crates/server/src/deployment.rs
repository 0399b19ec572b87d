use std::sync::Arc;

use db::DBService;
use services::services::{
    access::AccessService,
    assistant::AssistantService,
    highlights::HighlightService,
    identity::{IdentityProvider, SqliteIdentityProvider},
    invites::InviteService,
    llm_client::LlmClient,
    trade_ideas::TradeIdeaService,
    trade_summary::{LlmTradeSummarizer, TradeSummarizer},
};

/// Everything a request handler needs, cheap to clone into each request
#[derive(Clone)]
pub struct LocalDeployment {
    db: DBService,
    access: AccessService,
    invites: InviteService,
    trade_ideas: TradeIdeaService,
    highlights: HighlightService,
    assistant: AssistantService,
}

impl LocalDeployment {
    pub fn new(db: DBService, llm: Option<LlmClient>) -> Self {
        let identity = Arc::new(SqliteIdentityProvider::new(db.pool.clone()));
        let summarizer = llm
            .clone()
            .map(|client| Arc::new(LlmTradeSummarizer::new(client)) as Arc<dyn TradeSummarizer>);
        Self::with_parts(db, identity, summarizer, llm)
    }

    /// Wire in alternative collaborators, e.g. fakes in tests
    pub fn with_parts(
        db: DBService,
        identity: Arc<dyn IdentityProvider>,
        summarizer: Option<Arc<dyn TradeSummarizer>>,
        llm: Option<LlmClient>,
    ) -> Self {
        let pool = db.pool.clone();
        Self {
            access: AccessService::new(pool.clone(), identity),
            invites: InviteService::new(pool.clone()),
            trade_ideas: TradeIdeaService::new(pool.clone(), summarizer),
            highlights: HighlightService::new(pool),
            assistant: AssistantService::new(llm),
            db,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn access(&self) -> &AccessService {
        &self.access
    }

    pub fn invites(&self) -> &InviteService {
        &self.invites
    }

    pub fn trade_ideas(&self) -> &TradeIdeaService {
        &self.trade_ideas
    }

    pub fn highlights(&self) -> &HighlightService {
        &self.highlights
    }

    pub fn assistant(&self) -> &AssistantService {
        &self.assistant
    }
}
