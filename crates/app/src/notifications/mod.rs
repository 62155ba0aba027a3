//! Outbound delivery of claimed codes

pub mod errors;
pub mod message;
pub mod smtp;

use async_trait::async_trait;
use mockall::automock;

pub use errors::NotifierError;
pub use message::{CodeDelivery, DeliveryKind};
pub use smtp::{SmtpNotifier, SmtpSettings};

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `delivery` to its recipient. Resolves only once the transport has accepted it.
    async fn deliver(&self, delivery: CodeDelivery) -> Result<(), NotifierError>;
}
