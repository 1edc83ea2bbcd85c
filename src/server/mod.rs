/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::account::{User, WriteAccount};
use crate::notify::Notifier;
use crate::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub mod state;

pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(Config::from_env()?);

    tokio::runtime::Runtime::new()?.block_on(async move {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer())
            .init();

        let (hook_sender, hook_receiver) = kanal::unbounded_async::<()>();
        let (axum_sender, axum_receiver) = kanal::unbounded_async::<()>();

        let connection = crate::database::connect(&config).await?;
        bootstrap_admin(&config, &connection).await?;

        let housekeeping_connection = connection.clone();
        let interval = *config.housekeeping_interval();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = crate::hook::housekeeping(&housekeeping_connection) => {
                        match result {
                            Ok(()) => {},
                            Err(error) => error!("Error occurred during housekeeping: {}", error),
                        }

                        tokio::time::sleep(std::time::Duration::from_millis(interval)).await;
                    },
                    _ = hook_receiver.recv() => {
                        warn!("Received shutdown signal on kanal receiver");
                        break;
                    }
                }
            }
        });

        let notifier = Notifier::new(connection.clone(), &config);
        let state = ApplicationState::new(connection, config.clone(), notifier);
        let addr: SocketAddr = config.bind_address().parse()?;

        let server = tokio::spawn(async move {
            let router = crate::routes::router(state);
            info!("Listening on {addr}");

            if let Err(error) = axum::Server::bind(&addr)
                .serve(router.into_make_service())
                .with_graceful_shutdown(async {
                    axum_receiver.recv().await.ok();
                })
                .await
            {
                error!("Server stopped unexpectedly: {}", error);
            }
        });

        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(error) => {
                error!("Unable to listen for shutdown signal: {}", error);
            }
        }

        info!("Received shutdown signal... Shutting down...");
        // shutdown
        hook_sender.send(()).await?;
        axum_sender.send(()).await?;
        server.await?;

        Ok(())
    })
}

/// Creates the configured administrator unless some administrator exists already.
#[instrument(skip_all)]
pub async fn bootstrap_admin(config: &Config, connection: &DatabaseConnection) -> Result<()> {
    let Some((username, password)) = config.admin_credentials() else {
        return Ok(());
    };
    if User::has_admin(connection).await? {
        return Ok(());
    }

    WriteAccount::from(connection)
        .set_username(Some(username.to_owned()))
        .set_full_name(Some(username.to_owned()))
        .set_password(Some(password.to_owned()))
        .set_is_admin(Some(true))
        .to_owned()
        .await?;
    info!("Created administrator {username}");

    Ok(())
}
