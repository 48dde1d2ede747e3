pub mod auth;
pub mod dashboard;
pub mod meetings;
pub mod members;
pub mod referrals;
pub mod tyfcb;
