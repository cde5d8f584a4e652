pub mod dispatch;
pub mod health;
pub mod root;
pub mod workers;
pub mod ws;
