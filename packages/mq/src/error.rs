use thiserror::Error;

#[derive(Debug, Error)]
pub enum MqError {
    #[error("Broker error: {0}")]
    Broker(#[from] broccoli_queue::error::BroccoliError),

    #[error("Configuration error: {0}")]
    Config(String),
}
