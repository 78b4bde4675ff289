pub mod app;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod journey;
pub mod lexicon;
pub mod models;
pub mod remote;
pub mod response;
pub mod state;
pub mod stats;
pub mod storage;
pub mod support;
pub mod ui;

pub use app::router;
pub use classifier::{ClassificationInput, ClassificationResult, MoodClassifier, classify};
pub use config::Config;
pub use models::MoodCategory;
pub use response::{MoodResponse, generate_response};
pub use state::AppState;
pub use storage::load_data;
pub use support::{ChatTurn, Conversation, send_support_message};
