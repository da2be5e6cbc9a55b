use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

/// Core trait for messages exchanged with the inference workers.
pub trait Message: Serialize + DeserializeOwned + Debug + Send + Sync + Clone {
    fn message_type(&self) -> &'static str;

    fn message_id(&self) -> &str;
}
