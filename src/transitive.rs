//! In-process clients, served over an in-memory pipe instead of a socket.

use crate::backend::Sqlite;
use crate::driver::Connector;
use crate::handler::DatabaseHandler;
use crate::{DatabaseClient, Location, Result};
use hyper_util::rt::TokioIo;
use std::ops::{Deref, DerefMut};
use tokio::task::JoinHandle;
use tonic::transport::{Channel, Endpoint, Server};

/// Capacity of the in-memory pipe, in bytes.
const DUPLEX_SIZE: usize = 1024;

/// A client paired with the server task it talks to. Dropping it shuts the server down.
#[derive(Debug)]
pub struct Transitive<T> {
    /// The client half.
    client: T,
    /// The server half.
    server: JoinHandle<Result<(), tonic::transport::Error>>,
}

impl<T> Deref for Transitive<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl<T> DerefMut for Transitive<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.client
    }
}

impl<T> Drop for Transitive<T> {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Serve `handler` on one end of an in-memory pipe, returning a channel to the other end.
async fn serve_in_process(
    handler: DatabaseHandler<Sqlite>,
) -> Result<(Channel, JoinHandle<Result<(), tonic::transport::Error>>)> {
    let (client, server) = tokio::io::duplex(DUPLEX_SIZE);

    let server = tokio::spawn(async move {
        Server::builder()
            .add_service(handler.into_server())
            .serve_with_incoming(tokio_stream::once(Ok::<_, std::io::Error>(server)))
            .await
    });

    let mut client = Some(client);
    let channel = Endpoint::try_from("http://[::]:50051")?
        .connect_with_connector(tower::service_fn(move |_| {
            let client = client.take();
            async move {
                client
                    .map(TokioIo::new)
                    .ok_or_else(|| std::io::Error::other("in-process pipe already taken"))
            }
        }))
        .await?;

    Ok((channel, server))
}

/// A raw gRPC client for a server over the database at `location`.
pub async fn database_client<L>(location: L) -> Result<Transitive<DatabaseClient<Channel>>>
where
    L: Into<Location> + Send,
{
    let handler = DatabaseHandler::at_location(location.into())?;
    let (channel, server) = serve_in_process(handler).await?;
    Ok(Transitive {
        client: DatabaseClient::new(channel),
        server,
    })
}

/// A driver [`Connector`] for a server over the database at `location`.
pub async fn connector<L>(location: L) -> Result<Transitive<Connector>>
where
    L: Into<Location> + Send,
{
    let handler = DatabaseHandler::at_location(location.into())?;
    let (channel, server) = serve_in_process(handler).await?;
    Ok(Transitive {
        client: Connector::from_channel(channel).with_compression(true),
        server,
    })
}
