use crate::api::{company, follow, profile, user};
use crate::middleware::auth;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

const DEFAULT_APP_PORT: u16 = 3000;
const DEFAULT_APP_HOST: &str = "127.0.0.1";
const APP_PORT: &str = "APP_PORT";
const APP_HOST: &str = "APP_HOST";

pub async fn start(db: DatabaseConnection) {
    let app = router(db);

    let addr = get_socket_address();
    tracing::info!("listening on {addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

/// Build the application router. Routes split in two groups: the public ones
/// (registration, login, email verification, password reset) and everything
/// else behind the token middleware.
pub fn router(db: DatabaseConnection) -> Router {
    let public_routes = Router::new()
        .route("/user/register", post(user::register_user))
        .route("/user/verify/:token", get(user::verify_user))
        .route("/user/login", post(user::login_user))
        .route("/user/password-reset", post(user::request_password_reset))
        .route("/user/password-reset/:token", post(user::reset_password))
        .route("/company/register", post(company::register_company))
        .route("/company/verify/:token", get(company::verify_company))
        .route("/company/login", post(company::login_company))
        .route(
            "/company/password-reset",
            post(company::request_company_password_reset),
        )
        .route(
            "/company/password-reset/:token",
            post(company::reset_company_password),
        );

    let protected_routes = Router::new()
        .route("/user/me", get(user::get_current_user))
        .route("/user/update", put(user::update_user))
        .route("/user/profile/:id", get(profile::get_profile))
        .route("/user/counters", get(profile::get_counters))
        .route("/user/counters/:id", get(profile::get_counters))
        .route("/company/update", put(company::update_company))
        .route("/company/profile/:id", get(company::get_company_profile))
        .route("/company/list", get(company::get_company_list))
        .route(
            "/company/sector/:sector",
            get(company::get_companies_in_sector),
        )
        .route("/company/counters/:id", get(company::get_company_counters))
        .route("/follow/save", post(follow::save_follow))
        .route("/follow/unfollow/:id", delete(follow::unfollow))
        .route("/follow/following", get(follow::following))
        .route("/follow/following/:id", get(follow::following))
        .route("/follow/following/:id/:page", get(follow::following))
        .route("/follow/followers", get(follow::followers))
        .route("/follow/followers/:id", get(follow::followers))
        .route("/follow/followers/:id/:page", get(follow::followers))
        .route_layer(middleware::from_fn(auth::auth));

    public_routes.merge(protected_routes).with_state(db)
}

/// Return APP_PORT from environment varibles or defalt port (3000)
fn get_app_port() -> u16 {
    env::var(APP_PORT).map_or(DEFAULT_APP_PORT, |port| {
        port.parse().unwrap_or(DEFAULT_APP_PORT)
    })
}

/// Return socket address from environment varibles or defalt port (3000)
fn get_socket_address() -> SocketAddr {
    let app_port = get_app_port();
    let host = env::var(APP_HOST).map_or(DEFAULT_APP_HOST.to_string(), |host| {
        if !host.is_empty() {
            host
        } else {
            DEFAULT_APP_HOST.to_string()
        }
    });

    SocketAddr::from((IpAddr::from_str(&host).unwrap(), app_port))
}

#[cfg(test)]
mod get_app_port_tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn when_env_set() {
        env::set_var(APP_PORT, "1234");
        assert_eq!(get_app_port(), 1234);
    }

    #[test]
    #[serial]
    fn when_env_set_empty() {
        env::set_var(APP_PORT, "");
        assert_eq!(get_app_port(), DEFAULT_APP_PORT);
    }

    #[test]
    #[serial]
    fn when_env_not_set() {
        env::remove_var(APP_PORT);
        assert_eq!(get_app_port(), DEFAULT_APP_PORT);
    }
}
