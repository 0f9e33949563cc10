use rocket::Route;

pub mod autorizar;
pub mod cabina;
mod common;
pub mod mesa;
pub mod observados;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(autorizar::routes());
    routes.extend(cabina::routes());
    routes.extend(observados::routes());
    routes.extend(mesa::routes());
    routes
}
