pub mod access;
pub mod assistant;
pub mod community_wipe;
pub mod credential;
pub mod highlights;
pub mod identity;
pub mod invites;
pub mod llm_client;
pub mod trade_ideas;
pub mod trade_summary;
