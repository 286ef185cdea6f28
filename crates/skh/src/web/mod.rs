//! HTTP interface.
//!
//! Each area registers its own scope, in the manner of
//! `letters::configure_routes()`. [`configure`] mounts them all together with
//! the uploaded files, and [`serve`] runs them on an actix-web server.

mod dashboard;
mod error;
mod letters;
mod officers;
mod settings;

use std::thread;
use std::time::Duration;

use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{App, HttpServer};
use tracing::{info, warn};

use crate::config::Config;
use crate::service::settings::UPLOADS_URL_PREFIX;
use crate::service::Services;

/// Delay before the browser is pointed at the dashboard.
const BROWSER_DELAY: Duration = Duration::from_millis(500);

/// Register every route and the uploads directory on an app.
///
/// ```no_run
/// # fn wire(services: skh::service::Services) {
/// let app = actix_web::App::new().configure(skh::web::configure(services));
/// # }
/// ```
pub fn configure(services: Services) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let uploads_dir = services.settings.uploads().dir().to_path_buf();
        cfg.app_data(Data::new(services))
            .service(Files::new(UPLOADS_URL_PREFIX, uploads_dir))
            .service(dashboard::configure_routes())
            .service(letters::configure_routes())
            .service(officers::configure_routes())
            .service(settings::configure_routes());
    }
}

/// Run the HTTP server until it is stopped.
///
/// Opens the dashboard in the default browser when `server.open_browser` is
/// set.
///
/// # Errors
///
/// Returns an error if the uploads directory cannot be created or the
/// address cannot be bound.
pub async fn serve(config: &Config, services: Services) -> std::io::Result<()> {
    tokio::fs::create_dir_all(services.settings.uploads().dir()).await?;

    let workers = config.server.workers;
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(services.clone()))
    });
    if workers > 0 {
        server = server.workers(workers);
    }
    let server = server.bind((config.server.host.as_str(), config.server.port))?;

    let url = config.base_url();
    info!("Server running at {}", url);
    if config.server.open_browser {
        open_browser(url);
    }

    server.run().await
}

fn open_browser(url: String) {
    thread::spawn(move || {
        thread::sleep(BROWSER_DELAY);
        if let Err(e) = webbrowser::open(&url) {
            warn!("Could not open browser at {}: {}", url, e);
        }
    });
}
