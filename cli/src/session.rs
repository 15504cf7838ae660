//! A connected client of either transport kind.

use log::debug;
use sky_core::{AsyncClient, BlockingClient, ClientConfig, TransportKind};
use sky_transport::{connect, connect_async, ReqwestTransport, UreqTransport};
use tokio::runtime::Runtime;

use crate::error::{Error, Result};

pub enum Session {
    Blocking(BlockingClient<UreqTransport>),
    Cooperative {
        client: AsyncClient<ReqwestTransport>,
        runtime: Runtime,
    },
}

impl Session {
    pub fn open(config: &ClientConfig) -> Result<Self> {
        debug!("opening {} session", config.transport);
        Ok(match config.transport {
            TransportKind::Blocking => Session::Blocking(connect(config)),
            TransportKind::Cooperative => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(Error::Runtime)?;
                let client = {
                    let _guard = runtime.enter();
                    connect_async(config)
                };
                Session::Cooperative { client, runtime }
            }
        })
    }

    pub fn url(&self) -> String {
        match self {
            Session::Blocking(client) => client.endpoint().url(""),
            Session::Cooperative { client, .. } => client.endpoint().url(""),
        }
    }
}

/// Invoke the same client method on whichever transport the session holds.
macro_rules! call {
    ($session:expr, $method:ident($($arg:expr),* $(,)?)) => {
        match $session {
            $crate::session::Session::Blocking(client) => client.$method($($arg),*),
            $crate::session::Session::Cooperative { client, runtime } => {
                runtime.block_on(client.$method($($arg),*))
            }
        }
    };
}

pub(crate) use call;
