//! Notifier port trait
//!
//! Where workflow results are announced (a chat channel).

use async_trait::async_trait;

use crate::error::NotifyError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a plain-text message
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}
