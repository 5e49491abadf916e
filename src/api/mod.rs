use rocket::Route;

mod factions;
mod jobs;
mod pilots;
mod settings;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(jobs::routes());
    routes.extend(pilots::routes());
    routes.extend(factions::routes());
    routes.extend(settings::routes());
    routes.extend(voting::routes());
    routes
}
