pub mod access_grant;
pub mod highlight;
pub mod invite;
pub mod role;
pub mod session;
pub mod trade_idea;
pub mod user_profile;
