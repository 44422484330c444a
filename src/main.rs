mod auth;
mod config;
mod cursor;
mod database;
mod error;
mod graphql;
mod model;
mod seed;
mod tmdb;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer};
use async_graphql::http::GraphiQLSource;
use auth::Authenticator;
use config::Config;
use database::Store;
use graphql::AppSchema;
use log::{error, info};
use std::io;
use tmdb::TmdbClient;

type Schema = web::Data<AppSchema>;
type Auth = web::Data<Authenticator>;

fn startup_error<E: std::fmt::Display>(err: E) -> io::Error {
    error!("{}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

async fn graphql(
    schema: Schema,
    auth: Auth,
    req: HttpRequest,
    body: web::Json<async_graphql::Request>,
) -> HttpResponse {
    let mut request = body.into_inner();
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Some(identity) = auth.identity_from_header(bearer) {
        request = request.data(identity);
    }
    HttpResponse::Ok().json(schema.execute(request).await)
}

async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Production accepts the configured origins, development only the client.
fn cors(config: &Config) -> Cors {
    let origins = if config.is_production() {
        config.allowed_origins.clone()
    } else {
        vec![config.client_url.clone()]
    };
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .supports_credentials()
        .max_age(3600)
}

#[actix_rt::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("spotmovie=debug,actix_web=info"),
    )
    .init();

    let config = Config::from_env().map_err(startup_error)?;
    let store = Store::open(&config).map_err(startup_error)?;
    let auth = Authenticator::from_config(&config);
    if !config.is_production() {
        seed::bootstrap(&store, &auth).map_err(startup_error)?;
    }
    let schema = graphql::build_schema(
        store.clone(),
        TmdbClient::from_config(&config),
        auth.clone(),
    );

    let port = config.port;
    info!("Listening on 0.0.0.0:{}", port);
    let server_config = config.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&server_config))
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(auth.clone()))
            .route("/graphql", web::post().to(graphql))
            .route("/graphql", web::get().to(graphiql))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    info!("Flushed {} bytes", store.flush().map_err(startup_error)?);
    Ok(())
}

