use std::net::IpAddr;

use axum::{extract::DefaultBodyLimit, Router};
use relay_core_contact_contracts::ContactFeatureService;
use relay_core_health_contracts::HealthFeatureService;
use relay_di::Build;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod middlewares;
mod models;
mod routes;


#[derive(Debug, Clone, Build)]
pub struct RestServer<Health, Contact> {
    config: RestServerConfig,
    health: Health,
    contact: Contact,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub max_body_size: usize,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
{
    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        axum::serve(listener, router).await.map_err(Into::into)
    }

    fn router(self) -> Router<()> {
        let router = Router::new()
            .merge(routes::health::router(self.health.into()))
            .merge(routes::contact::router(self.contact.into()))
            .layer(DefaultBodyLimit::max(self.config.max_body_size));

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);

        // The contact page is served from a different origin.
        router.layer(CorsLayer::permissive())
    }
}
