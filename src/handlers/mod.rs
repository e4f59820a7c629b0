pub mod employee;

use actix_web::web;

use crate::errors::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/api/v1/employees/")
            .route(web::get().to(employee::list_employees))
            .route(web::post().to(employee::create_employee)),
    )
    .service(
        web::resource("/api/v1/employees/{id}/")
            .route(web::get().to(employee::get_employee))
            .route(web::put().to(employee::replace_employee))
            .route(web::patch().to(employee::patch_employee))
            .route(web::delete().to(employee::delete_employee)),
    );
}
