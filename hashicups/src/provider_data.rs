//! Provider data handed to resources and data sources after configure

use crate::api::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct HashiCupsProviderData {
    pub client: Arc<Client>,
}

impl HashiCupsProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}
