use crate::domain::model::{DispatchReceipt, VerifiedImage};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

#[async_trait]
pub trait ImageVerifier: Send + Sync {
    async fn verify(&self, image_ref: &str) -> Result<VerifiedImage>;
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn compose_and_send(&self, title: &str, image_url: &str) -> Result<DispatchReceipt>;
}
