// HTTP handlers; route wiring lives in `app`

pub mod auth;
pub mod contact;
pub mod health;
pub mod payments;
