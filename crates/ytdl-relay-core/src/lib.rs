pub mod config;
pub mod logging;

// Page side
pub mod dom;
pub mod notify;
pub mod observer;
pub mod outcome;
pub mod page;

// Background side
pub mod browser;
pub mod cookies;
pub mod coordinator;
pub mod router;

pub mod video_ref;
