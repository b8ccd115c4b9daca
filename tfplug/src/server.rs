//! Server module for running Terraform providers
//!
//! This module starts the provider's gRPC server, performs the go-plugin
//! handshake on stdout and optionally serves over TLS.

use crate::error::{Result, TfplugError};
use crate::grpc::GrpcProviderServer;
use crate::proto::ProviderServer;
use crate::provider::Provider;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Identity, Server, ServerTlsConfig};

/// Environment variable Terraform sets when it launches a plugin
pub const MAGIC_COOKIE_KEY: &str = "TF_PLUGIN_MAGIC_COOKIE";

pub const MAGIC_COOKIE_VALUE: &str =
    "d602bf8f470bc67ca7faa0386276bbdd4330efaf76d1a219cb4d6991ca9872b2";

const CORE_PROTOCOL_VERSION: u32 = 1;
const APP_PROTOCOL_VERSION: u32 = 6;

/// Certificate and key used when serving over TLS
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Server configuration for running a Terraform provider
///
/// The default server is plaintext and the handshake line carries no
/// server certificate, so go-plugin AutoMTLS is not negotiated. Stock
/// Terraform dials such a plugin only when `TF_DISABLE_PLUGIN_TLS=1` is set
/// or the plugin is attached through `TF_REATTACH_PROVIDERS`. Certificates
/// given through [`ServerConfig::with_tls`] secure the listener but are not
/// advertised in the handshake either.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Serve over TLS when set, plaintext otherwise
    pub tls: Option<TlsPaths>,
    /// Maximum message size in bytes
    pub max_message_size: usize,
    /// Whether to log server lifecycle events
    pub enable_logging: bool,
    /// Refuse to start unless launched by Terraform
    pub require_magic_cookie: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tls: None,
            max_message_size: 256 << 20, // 256MB
            enable_logging: true,
            require_magic_cookie: true,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve over TLS using the given PEM files
    pub fn with_tls(mut self, cert_path: PathBuf, key_path: PathBuf) -> Self {
        self.tls = Some(TlsPaths {
            cert_path,
            key_path,
        });
        self
    }

    /// Set the maximum message size
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    /// Skip the magic cookie check, for running the server by hand
    pub fn without_magic_cookie(mut self) -> Self {
        self.require_magic_cookie = false;
        self
    }
}

/// Verify the plugin was launched by Terraform
pub fn check_magic_cookie(value: Option<&str>) -> Result<()> {
    match value {
        Some(MAGIC_COOKIE_VALUE) => Ok(()),
        _ => Err(TfplugError::HandshakeError(
            "This binary is a plugin. These are not meant to be executed directly. \
             Please execute the program that consumes these plugins, which will load \
             any plugins automatically"
                .to_string(),
        )),
    }
}

/// The go-plugin handshake line printed on stdout
pub fn handshake_line(addr: SocketAddr) -> String {
    format!(
        "{}|{}|tcp|{}|grpc",
        CORE_PROTOCOL_VERSION, APP_PROTOCOL_VERSION, addr
    )
}

async fn load_tls_config(paths: &TlsPaths) -> Result<ServerTlsConfig> {
    // tonic is built without a bundled crypto backend
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cert = tokio::fs::read(&paths.cert_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read certificate: {}", e)))?;

    let key = tokio::fs::read(&paths.key_path)
        .await
        .map_err(|e| TfplugError::TlsError(format!("Failed to read key: {}", e)))?;

    Ok(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
}

/// Main entry point for running a provider
pub async fn serve<P: Provider + 'static>(provider: P, config: ServerConfig) -> Result<()> {
    if config.require_magic_cookie {
        check_magic_cookie(std::env::var(MAGIC_COOKIE_KEY).ok().as_deref())?;
    }

    let grpc_server = GrpcProviderServer::new(provider);
    let provider_service = ProviderServer::new(grpc_server)
        .max_decoding_message_size(config.max_message_size)
        .max_encoding_message_size(config.max_message_size);

    let mut builder = Server::builder();
    if let Some(paths) = &config.tls {
        builder = builder.tls_config(load_tls_config(paths).await?)?;
    }

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    // Terraform reads exactly one line from stdout
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", handshake_line(addr))?;
    stdout.flush()?;

    if config.enable_logging {
        tracing::info!(%addr, tls = config.tls.is_some(), "Provider server started");
    }

    builder
        .add_service(provider_service)
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await?;

    Ok(())
}

/// Convenience function to run a provider with default configuration
pub async fn serve_default<P: Provider + 'static>(provider: P) -> Result<()> {
    serve(provider, ServerConfig::default()).await
}
